//! BOM line-item extraction.
//!
//! Tables come from a strategy, headers go through the resolver, and every
//! data row through the row rules. Line numbers are assigned here, globally
//! across tables and pages, in document order.
//!
//! The ruled-table strategy runs first. Only when it yields no records for
//! the whole document does the text-line strategy get a turn.

pub mod resolver;
pub mod row;
pub mod strategy;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::BomItem;
use crate::reader::DocumentReader;
pub use resolver::{ColumnRole, ColumnRoleMap, QuantityColumn, resolve_columns};
pub use row::{RowFields, SkipReason, parse_row};
pub use strategy::{ExtractionStrategy, TableStrategy, TextLineStrategy};

/// Knobs for the extraction heuristics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSettings {
    /// Level-indicator value that marks a packable row.
    pub target_marker: String,
    pub quantity_column: QuantityColumn,
    pub max_description_len: usize,
    /// Allow the text-line strategy when no ruled table yields records.
    pub text_fallback: bool,
    /// Largest gap (pt) between words of one header phrase.
    pub phrase_gap: f64,
    /// Slack (pt) when assigning a word to a column anchor.
    pub anchor_tolerance: f64,
    /// Vertical tolerance (pt) for grouping words into lines.
    pub line_tolerance: f64,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            target_marker: "B".to_string(),
            quantity_column: QuantityColumn::Authorized,
            max_description_len: 100,
            text_fallback: true,
            phrase_gap: 6.0,
            anchor_tolerance: 3.0,
            line_tolerance: 3.0,
        }
    }
}

/// Run one strategy over pages `start_page..`, appending records to `items`.
fn run_strategy(
    strategy: &dyn ExtractionStrategy,
    reader: &dyn DocumentReader,
    start_page: usize,
    settings: &ExtractSettings,
    items: &mut Vec<BomItem>,
) {
    for page in start_page..reader.page_count() {
        let tables = match strategy.page_tables(reader, page) {
            Ok(tables) => tables,
            Err(e) => {
                warn!(page, strategy = strategy.name(), error = %e, "skipping unreadable page");
                continue;
            }
        };
        for (t, table) in tables.iter().enumerate() {
            let Some((header, rows)) = table.split_first() else {
                continue;
            };
            if rows.is_empty() {
                continue;
            }
            let roles = resolve_columns(header, settings.quantity_column);
            if !roles.is_usable() {
                debug!(page, table = t, ?header, "table lacks level or description column");
                continue;
            }
            for (r, row) in rows.iter().enumerate() {
                match parse_row(row, &roles, settings) {
                    Ok(fields) => items.push(BomItem {
                        line_no: items.len() + 1,
                        description: fields.description,
                        nsn: fields.nsn,
                        qty: fields.qty,
                    }),
                    Err(reason) => debug!(page, table = t, row = r + 1, %reason, "row skipped"),
                }
            }
        }
    }
}

/// Extract line items with the given strategies in order; a later strategy
/// runs only while the earlier ones have produced nothing.
pub fn extract_with(
    strategies: &[&dyn ExtractionStrategy],
    reader: &dyn DocumentReader,
    start_page: usize,
    settings: &ExtractSettings,
) -> Vec<BomItem> {
    let mut items = Vec::new();
    for strategy in strategies {
        run_strategy(*strategy, reader, start_page, settings, &mut items);
        if !items.is_empty() {
            info!(strategy = strategy.name(), count = items.len(), "extracted items");
            break;
        }
        debug!(strategy = strategy.name(), "no items");
    }
    items
}

/// Extract line items from `start_page` (zero-based) to the end.
pub fn extract_items(reader: &dyn DocumentReader, start_page: usize, settings: &ExtractSettings) -> Vec<BomItem> {
    if start_page >= reader.page_count() {
        warn!(start_page, pages = reader.page_count(), "start page is past the end of the document");
        return Vec::new();
    }
    let text = TextLineStrategy::new(settings);
    if settings.text_fallback {
        extract_with(&[&TableStrategy, &text], reader, start_page, settings)
    } else {
        extract_with(&[&TableStrategy], reader, start_page, settings)
    }
}
