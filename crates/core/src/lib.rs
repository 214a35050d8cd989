//! dd1750 - Bill-of-materials extraction and DD Form 1750 overlay.
//!
//! The pipeline reads line items out of a BOM PDF, paginates them onto the
//! fixed 18-row grid of the packing list and stamps each page onto a copy
//! of the blank form.

pub mod config;
pub mod date;
pub mod error;
pub mod extract;
pub mod generate;
pub mod layout;
pub mod locate;
pub mod metrics;
pub mod model;
pub mod reader;
pub mod render;
pub mod workspace;

pub use config::GenerateConfig;
pub use date::format_military_date;
pub use error::{FormError, Result};
pub use extract::{ExtractSettings, extract_items};
pub use generate::{Generated, GeneratedForm, generate, generate_from_bytes, generate_with_config, suggested_filename};
pub use layout::{LayoutGeometry, PagePlan, paginate};
pub use locate::{AdminPositions, detect_admin_positions, locate_admin_fields};
pub use model::{AdminField, AdminValues, BomItem, Point};
pub use reader::{DocumentReader, PdfDocument};
pub use render::{BackgroundPolicy, Compositor, LopdfCompositor};
pub use workspace::RequestWorkspace;
