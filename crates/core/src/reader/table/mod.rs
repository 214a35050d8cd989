//! Ruled-table detection.
//!
//! The pipeline follows the "lines" strategy: edges are filtered, snapped
//! and joined; intersections of horizontal and vertical edges produce
//! candidate corners; the smallest closed rectangles become cells; cells
//! sharing corners become tables. Cell text is every glyph whose center
//! falls inside the cell.

pub mod clustering;
pub mod edges;
pub mod grid;
pub mod intersections;

pub use grid::GridTable;

use super::types::{CharObj, EdgeObj, Table, TableSettings};
use edges::{filter_edges, merge_edges};
use grid::{cells_to_tables, intersections_to_cells};
use intersections::edges_to_intersections;

/// Detect ruled tables on a page, ordered top to bottom.
pub fn find_grid_tables(edges: &[EdgeObj], settings: &TableSettings) -> Vec<GridTable> {
    let edges = filter_edges(edges.to_vec(), settings.edge_min_length);
    let edges = merge_edges(edges, settings.snap_tolerance, settings.join_tolerance);
    let edges = filter_edges(edges, settings.edge_min_length);
    let intersections = edges_to_intersections(&edges, settings.intersection_tolerance);
    let cells = intersections_to_cells(&intersections);
    cells_to_tables(cells)
        .into_iter()
        .map(|cells| GridTable { cells })
        .collect()
}

/// Detect tables and extract their cell text.
pub fn find_tables(chars: &[CharObj], edges: &[EdgeObj], settings: &TableSettings) -> Vec<Table> {
    find_grid_tables(edges, settings)
        .iter()
        .map(|t| t.extract(chars, &settings.text_settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::types::Orientation;

    fn v(x: f64, top: f64, bottom: f64) -> EdgeObj {
        EdgeObj { x0: x, x1: x, top, bottom, orientation: Orientation::Vertical }
    }

    fn h(y: f64, x0: f64, x1: f64) -> EdgeObj {
        EdgeObj { x0, x1, top: y, bottom: y, orientation: Orientation::Horizontal }
    }

    fn text(s: &str, x0: f64, top: f64) -> Vec<CharObj> {
        s.chars()
            .enumerate()
            .map(|(i, c)| CharObj {
                text: c.to_string(),
                x0: x0 + i as f64 * 5.0,
                x1: x0 + i as f64 * 5.0 + 5.0,
                top,
                bottom: top + 8.0,
                size: 8.0,
            })
            .collect()
    }

    #[test]
    fn split_borders_still_form_a_table() {
        // Each row border drawn as two slightly offset pieces.
        let edges = vec![
            h(0.0, 0.0, 60.0),
            h(0.5, 60.0, 120.0),
            h(20.0, 0.0, 120.0),
            h(40.0, 0.0, 120.0),
            v(0.0, 0.0, 40.0),
            v(60.0, 0.0, 20.0),
            v(60.5, 20.0, 40.0),
            v(120.0, 0.0, 40.0),
        ];
        let mut chars = text("LV", 5.0, 6.0);
        chars.extend(text("DESC", 65.0, 6.0));
        chars.extend(text("B", 5.0, 26.0));
        chars.extend(text("RADIO", 65.0, 26.0));

        let tables = find_tables(&chars, &edges, &TableSettings::default());
        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0],
            vec![
                vec![Some("LV".to_string()), Some("DESC".to_string())],
                vec![Some("B".to_string()), Some("RADIO".to_string())],
            ]
        );
    }

    #[test]
    fn no_edges_no_tables() {
        assert!(find_tables(&text("hello", 0.0, 0.0), &[], &TableSettings::default()).is_empty());
    }
}
