//! Per-row record derivation and field cleaning.

use std::fmt;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use super::ExtractSettings;
use super::resolver::ColumnRoleMap;

/// Classification codes BOM exports append to nomenclature.
static TRAILING_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s+)(?:WTY|ARC|CIIC|UI|SCMC|COEI|BII|AAL)(?::\S*)?\s*$").expect("valid regex")
});
static NINE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{9}").expect("valid regex"));
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Why a data row produced no record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    EmptyRow,
    LevelMismatch,
    EmptyDescription,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::EmptyRow => "empty row",
            SkipReason::LevelMismatch => "level marker does not match",
            SkipReason::EmptyDescription => "no description",
        })
    }
}

/// Fields of one qualifying row, before a line number is assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowFields {
    pub description: String,
    pub nsn: String,
    pub qty: u32,
}

fn cell<'r, S: AsRef<str>>(row: &'r [Option<S>], idx: Option<usize>) -> Option<&'r str> {
    row.get(idx?)?.as_ref().map(AsRef::as_ref)
}

/// Clean a description cell down to the item nomenclature.
///
/// Multi-line cells carry a part-number line first, so the second line is
/// preferred. Parenthetical notes and trailing classification codes go.
pub fn clean_description(raw: &str, max_len: usize) -> String {
    let trimmed = raw.trim();
    let mut lines = trimmed.split('\n');
    let first = lines.next().unwrap_or_default();
    let line = lines.next().unwrap_or(first).trim();

    let mut desc = match line.find('(') {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    }
    .to_string();
    loop {
        let stripped = TRAILING_CODE.replace(&desc, "").into_owned();
        if stripped == desc {
            break;
        }
        desc = stripped;
    }
    desc.split_whitespace()
        .join(" ")
        .chars()
        .take(max_len)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// First run of nine consecutive digits, or empty.
pub fn parse_nsn(raw: &str) -> String {
    NINE_DIGITS
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// First digit run as a quantity; missing, unparsable or zero gives 1.
pub fn parse_qty(raw: Option<&str>) -> u32 {
    raw.and_then(|s| DIGITS.find(s))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|q| *q > 0)
        .unwrap_or(1)
}

/// Apply the row rules to one data row.
pub fn parse_row<S: AsRef<str>>(
    row: &[Option<S>],
    roles: &ColumnRoleMap,
    settings: &ExtractSettings,
) -> Result<RowFields, SkipReason> {
    let is_blank = |c: &Option<S>| c.as_ref().is_none_or(|s| s.as_ref().trim().is_empty());
    if row.iter().all(is_blank) {
        return Err(SkipReason::EmptyRow);
    }

    let level = cell(row, roles.level).map(|s| s.trim().to_uppercase());
    if level.as_deref() != Some(settings.target_marker.trim().to_uppercase().as_str()) {
        return Err(SkipReason::LevelMismatch);
    }

    let description = cell(row, roles.description)
        .map(|s| clean_description(s, settings.max_description_len))
        .unwrap_or_default();
    if description.is_empty() {
        return Err(SkipReason::EmptyDescription);
    }

    Ok(RowFields {
        description,
        nsn: cell(row, roles.identifier).map(parse_nsn).unwrap_or_default(),
        qty: parse_qty(cell(row, roles.quantity)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::resolver::{QuantityColumn, resolve_columns};

    fn row(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect()
    }

    fn roles() -> ColumnRoleMap {
        resolve_columns(
            &row(&["LV", "DESCRIPTION", "MATERIAL", "AUTH QTY"]),
            QuantityColumn::Authorized,
        )
    }

    #[test]
    fn multi_line_cell_uses_second_line() {
        let fields = parse_row(
            &row(&["B", "RADIO SET\nAN/PRC-152", "5820011234567 EXTRA", "4"]),
            &roles(),
            &ExtractSettings::default(),
        )
        .unwrap();
        assert_eq!(
            fields,
            RowFields {
                description: "AN/PRC-152".to_string(),
                nsn: "582001123".to_string(),
                qty: 4,
            }
        );
    }

    #[test]
    fn strips_parentheticals_and_codes() {
        assert_eq!(clean_description("CABLE ASSY (W2) WTY:N", 100), "CABLE ASSY");
        assert_eq!(clean_description("BATTERY BOX  UI:EA CIIC:U ARC", 100), "BATTERY BOX");
        assert_eq!(clean_description("TOOL  KIT\tGENERAL", 100), "TOOL KIT GENERAL");
        assert_eq!(clean_description("COEI", 100), "");
        assert_eq!(clean_description("GUIDE", 100), "GUIDE");
    }

    #[test]
    fn description_is_capped() {
        let long = "X".repeat(150);
        assert_eq!(clean_description(&long, 100).len(), 100);
    }

    #[test]
    fn quantity_defaults_to_one() {
        assert_eq!(parse_qty(None), 1);
        assert_eq!(parse_qty(Some("")), 1);
        assert_eq!(parse_qty(Some("N/A")), 1);
        assert_eq!(parse_qty(Some("0")), 1);
        assert_eq!(parse_qty(Some("99999999999999")), 1);
        assert_eq!(parse_qty(Some(" 12 EA")), 12);
    }

    #[test]
    fn skip_reasons() {
        let settings = ExtractSettings::default();
        assert_eq!(parse_row(&row(&["", "", "", ""]), &roles(), &settings), Err(SkipReason::EmptyRow));
        assert_eq!(
            parse_row(&row(&["A", "RADIO", "", "1"]), &roles(), &settings),
            Err(SkipReason::LevelMismatch)
        );
        assert_eq!(
            parse_row(&row(&["b ", "(SEE NOTE)", "", "1"]), &roles(), &settings),
            Err(SkipReason::EmptyDescription)
        );
    }

    #[test]
    fn short_rows_do_not_panic() {
        let fields = parse_row(&row(&["B", "MAST"]), &roles(), &ExtractSettings::default()).unwrap();
        assert_eq!(fields.nsn, "");
        assert_eq!(fields.qty, 1);
    }
}
