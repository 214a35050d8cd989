//! Candidate-table sources for the extractor.
//!
//! A strategy turns one page into zero or more tables (header row first).
//! The per-row rules are shared, so strategies differ only in how they
//! find rows and cells.

use super::ExtractSettings;
use super::resolver::resolve_columns;
use crate::error::Result;
use crate::reader::DocumentReader;
use crate::reader::text::words_to_lines;
use crate::reader::types::{Row, Table, Word};

pub trait ExtractionStrategy {
    fn name(&self) -> &'static str;

    /// Candidate tables on one page, each with its header as the first row.
    fn page_tables(&self, reader: &dyn DocumentReader, page: usize) -> Result<Vec<Table>>;
}

/// Ruled tables found by the reader.
#[derive(Clone, Copy, Debug, Default)]
pub struct TableStrategy;

impl ExtractionStrategy for TableStrategy {
    fn name(&self) -> &'static str {
        "table"
    }

    fn page_tables(&self, reader: &dyn DocumentReader, page: usize) -> Result<Vec<Table>> {
        reader.page_tables(page)
    }
}

/// Column reconstruction from word positions, for BOMs without rules.
#[derive(Clone, Debug)]
pub struct TextLineStrategy {
    settings: ExtractSettings,
}

impl TextLineStrategy {
    pub fn new(settings: &ExtractSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }
}

/// Consecutive words of a line with small gaps, e.g. `AUTH QTY`.
#[derive(Clone, Debug, PartialEq)]
struct Phrase {
    text: String,
    x0: f64,
    x1: f64,
}

fn line_phrases(line: &[Word], max_gap: f64) -> Vec<Phrase> {
    let mut phrases: Vec<Phrase> = Vec::new();
    for word in line {
        match phrases.last_mut() {
            Some(last) if word.x0 - last.x1 <= max_gap => {
                last.text.push(' ');
                last.text.push_str(&word.text);
                last.x1 = word.x1;
            }
            _ => phrases.push(Phrase {
                text: word.text.clone(),
                x0: word.x0,
                x1: word.x1,
            }),
        }
    }
    phrases
}

/// Split a line into cells: each word joins the last anchor starting at or
/// left of it.
fn split_by_anchors(line: &[Word], anchors: &[f64], tolerance: f64) -> Row {
    let mut cells: Vec<Option<String>> = vec![None; anchors.len()];
    for word in line {
        let idx = anchors
            .iter()
            .rposition(|x| *x <= word.x0 + tolerance)
            .unwrap_or(0);
        match &mut cells[idx] {
            Some(text) => {
                text.push(' ');
                text.push_str(&word.text);
            }
            slot @ None => *slot = Some(word.text.clone()),
        }
    }
    cells
}

impl ExtractionStrategy for TextLineStrategy {
    fn name(&self) -> &'static str {
        "text-line"
    }

    fn page_tables(&self, reader: &dyn DocumentReader, page: usize) -> Result<Vec<Table>> {
        let words = reader.page_words(page)?;
        let lines = words_to_lines(&words, self.settings.line_tolerance);

        let header = lines.iter().enumerate().find_map(|(i, line)| {
            let phrases = line_phrases(line, self.settings.phrase_gap);
            let cells: Row = phrases.iter().map(|p| Some(p.text.clone())).collect();
            resolve_columns(&cells, self.settings.quantity_column)
                .is_usable()
                .then_some((i, phrases, cells))
        });
        let Some((header_idx, phrases, header_row)) = header else {
            return Ok(Vec::new());
        };
        if phrases.is_empty() {
            return Ok(Vec::new());
        }

        let anchors: Vec<f64> = phrases.iter().map(|p| p.x0).collect();
        let mut table: Table = vec![header_row];
        table.extend(
            lines[header_idx + 1..]
                .iter()
                .map(|line| split_by_anchors(line, &anchors, self.settings.anchor_tolerance)),
        );
        Ok(vec![table])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x0: f64, top: f64) -> Word {
        Word {
            text: text.to_string(),
            x0,
            x1: x0 + 5.0 * text.len() as f64,
            top,
            bottom: top + 8.0,
        }
    }

    #[test]
    fn phrases_merge_close_words() {
        let line = vec![word("AUTH", 300.0, 0.0), word("QTY", 322.0, 0.0), word("LV", 10.0, 0.0)];
        let mut sorted = line.clone();
        sorted.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        let phrases = line_phrases(&sorted, 4.0);
        assert_eq!(phrases.len(), 2);
        assert_eq!(phrases[1].text, "AUTH QTY");
    }

    #[test]
    fn words_follow_their_anchor() {
        let anchors = [10.0, 50.0, 200.0];
        let line = vec![
            word("B", 12.0, 0.0),
            word("TOOL", 50.0, 0.0),
            word("KIT", 75.0, 0.0),
            word("2", 201.0, 0.0),
        ];
        assert_eq!(
            split_by_anchors(&line, &anchors, 3.0),
            vec![
                Some("B".to_string()),
                Some("TOOL KIT".to_string()),
                Some("2".to_string()),
            ]
        );
        let left_of_all = vec![word("X", 0.0, 0.0)];
        assert_eq!(split_by_anchors(&left_of_all, &anchors, 3.0)[0].as_deref(), Some("X"));
    }
}
