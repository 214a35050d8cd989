//! Page object types and reader settings.
//!
//! All geometry here is in top-left page space: `top` grows downward from
//! the top edge of the media box, matching the way tables are read.

use ordered_float::OrderedFloat;
use serde::Serialize;

pub(crate) const DEFAULT_SNAP_TOLERANCE: f64 = 3.0;
pub(crate) const DEFAULT_JOIN_TOLERANCE: f64 = 3.0;
pub(crate) const DEFAULT_X_TOLERANCE: f64 = 3.0;
pub(crate) const DEFAULT_Y_TOLERANCE: f64 = 3.0;

// Key types for ordered float maps
pub(crate) type KeyF64 = OrderedFloat<f64>;
pub(crate) type KeyPoint = (KeyF64, KeyF64);

pub(crate) fn key_f64(v: f64) -> KeyF64 {
    OrderedFloat(v)
}

pub(crate) fn key_point(x: f64, y: f64) -> KeyPoint {
    (OrderedFloat(x), OrderedFloat(y))
}

/// A table cell; `None` where a merged cell leaves no box.
pub type Cell = Option<String>;
pub type Row = Vec<Cell>;
pub type Table = Vec<Row>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// A single glyph placed on the page.
#[derive(Clone, Debug, PartialEq)]
pub struct CharObj {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    pub size: f64,
}

impl CharObj {
    pub(crate) fn h_mid(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }
    pub(crate) fn v_mid(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// A run of glyphs with no whitespace or horizontal gap between them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Word {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Word {
    pub fn bbox(&self) -> BBox {
        BBox {
            x0: self.x0,
            top: self.top,
            x1: self.x1,
            bottom: self.bottom,
        }
    }
}

/// A ruling line segment, from a stroked path or one side of a rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeObj {
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    pub orientation: Orientation,
}

impl EdgeObj {
    pub fn length(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.x1 - self.x0,
            Orientation::Vertical => self.bottom - self.top,
        }
    }
}

/// Tolerances for grouping glyphs into words and lines.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSettings {
    pub x_tolerance: f64,
    pub y_tolerance: f64,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            x_tolerance: DEFAULT_X_TOLERANCE,
            y_tolerance: DEFAULT_Y_TOLERANCE,
        }
    }
}

/// Settings for the ruled-table finder.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSettings {
    pub snap_tolerance: f64,
    pub join_tolerance: f64,
    pub edge_min_length: f64,
    pub intersection_tolerance: f64,
    pub text_settings: TextSettings,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            join_tolerance: DEFAULT_JOIN_TOLERANCE,
            edge_min_length: 3.0,
            intersection_tolerance: 3.0,
            text_settings: TextSettings::default(),
        }
    }
}
