//! Error types for the DD1750 generation pipeline.

use thiserror::Error;

/// Primary error type for reading, extracting and compositing.
///
/// Row- and table-level anomalies never surface here; they are absorbed
/// where they happen. Only document-level failures propagate.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("malformed content stream: {0}")]
    Content(String),

    #[error("page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("template has no page {index} to use as background (template has {available})")]
    MissingBackgroundPage { index: usize, available: usize },

    #[error("template document has no pages")]
    EmptyTemplate,

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("render error on page {page}: {msg}")]
    Render { page: usize, msg: String },
}

/// Convenience Result type alias for FormError.
pub type Result<T> = std::result::Result<T, FormError>;
