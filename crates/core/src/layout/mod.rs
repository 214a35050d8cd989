//! Pagination and placement on the fixed form grid.

pub mod geometry;
pub mod paginate;

pub use geometry::{ColumnSpan, FontSizes, LayoutGeometry};
pub use paginate::{AdminPages, Align, DrawText, PagePlan, admin_draws, page_indicator, paginate, row_draws};
