//! Fixed form geometry.

use serde::{Deserialize, Serialize};

/// Horizontal extent of one form column, in points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpan {
    pub left: f64,
    pub right: f64,
}

impl ColumnSpan {
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn center(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

/// Font sizes per drawn element.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub box_number: f64,
    pub description: f64,
    pub identifier: f64,
    pub quantity: f64,
    pub admin: f64,
    pub caption: f64,
    pub page_indicator: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            box_number: 8.0,
            description: 7.0,
            identifier: 6.0,
            quantity: 8.0,
            admin: 10.0,
            caption: 8.0,
            page_indicator: 8.0,
        }
    }
}

/// Page and table geometry of a packing-list form. PDF space, origin at the
/// bottom-left corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub box_column: ColumnSpan,
    pub content_column: ColumnSpan,
    pub unit_of_issue_column: ColumnSpan,
    pub initial_column: ColumnSpan,
    pub spares_column: ColumnSpan,
    pub total_column: ColumnSpan,
    pub table_top: f64,
    pub table_bottom: f64,
    pub rows_per_page: usize,
    /// Gap between the table top and the first row's reference line.
    pub row_margin: f64,
    /// Reference line to text baseline.
    pub baseline_drop: f64,
    /// Reference line to the identifier sub-line baseline.
    pub sub_line_drop: f64,
    pub description_padding: f64,
    /// Characters of description drawn per row.
    pub description_max_chars: usize,
    /// Characters of the unit name drawn.
    pub unit_max_chars: usize,
    /// Drop from an admin value to its signature caption.
    pub caption_drop: f64,
    pub fonts: FontSizes,
}

impl Default for LayoutGeometry {
    fn default() -> Self {
        Self::dd1750_letter()
    }
}

impl LayoutGeometry {
    /// DD Form 1750 on US letter, 18 rows per page.
    pub fn dd1750_letter() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            box_column: ColumnSpan::new(44.0, 88.0),
            content_column: ColumnSpan::new(88.0, 365.0),
            unit_of_issue_column: ColumnSpan::new(365.0, 408.5),
            initial_column: ColumnSpan::new(408.5, 453.5),
            spares_column: ColumnSpan::new(453.5, 514.5),
            total_column: ColumnSpan::new(514.5, 566.0),
            table_top: 616.0,
            table_bottom: 89.5,
            rows_per_page: 18,
            row_margin: 5.0,
            baseline_drop: 7.0,
            sub_line_drop: 12.0,
            description_padding: 4.0,
            description_max_chars: 50,
            unit_max_chars: 30,
            caption_drop: 10.0,
            fonts: FontSizes::default(),
        }
    }

    pub fn row_height(&self) -> f64 {
        (self.table_top - self.table_bottom) / self.rows_per_page.max(1) as f64
    }

    /// Reference y of row `i` (zero-based) on any page.
    pub fn row_y(&self, i: usize) -> f64 {
        self.table_top - self.row_margin - i as f64 * self.row_height()
    }

    /// Pages needed for `n` rows.
    pub fn page_count(&self, n: usize) -> usize {
        n.div_ceil(self.rows_per_page.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_row_metrics() {
        let g = LayoutGeometry::dd1750_letter();
        assert!((g.row_height() - 29.25).abs() < 1e-9);
        assert_eq!(g.row_y(0), 611.0);
        assert!((g.row_y(17) - (611.0 - 17.0 * 29.25)).abs() < 1e-9);
        assert_eq!(g.box_column.center(), 66.0);
    }

    #[test]
    fn page_count_rounds_up() {
        let g = LayoutGeometry::dd1750_letter();
        assert_eq!(g.page_count(0), 0);
        assert_eq!(g.page_count(18), 1);
        assert_eq!(g.page_count(19), 2);
        assert_eq!(g.page_count(40), 3);
    }

    #[test]
    fn partial_toml_keeps_preset_values() {
        let g: LayoutGeometry = toml::from_str("rows_per_page = 10").unwrap();
        assert_eq!(g.rows_per_page, 10);
        assert_eq!(g.table_top, 616.0);
    }
}
