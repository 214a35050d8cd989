//! Overlay rendering and compositing onto the template.

pub mod compose;
pub mod overlay;

pub use compose::{BackgroundPolicy, Compositor, LopdfCompositor};
pub use overlay::{OVERLAY_FONT, encode_win_ansi, render_overlay};
