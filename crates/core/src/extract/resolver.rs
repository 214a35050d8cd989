//! Header-row classification into column roles.

use serde::{Deserialize, Serialize};

/// Semantic role of a BOM column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Level,
    Description,
    Identifier,
    Quantity,
}

/// Which quantity column feeds the form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityColumn {
    /// `AUTH QTY`: the authorized quantity.
    #[default]
    Authorized,
    /// `OH QTY`: the on-hand quantity.
    OnHand,
}

/// Zero-based column index per role, built per table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnRoleMap {
    pub level: Option<usize>,
    pub description: Option<usize>,
    pub identifier: Option<usize>,
    pub quantity: Option<usize>,
}

impl ColumnRoleMap {
    /// A table is usable only with both a level and a description column.
    pub fn is_usable(&self) -> bool {
        self.level.is_some() && self.description.is_some()
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Level => self.level,
            ColumnRole::Description => self.description,
            ColumnRole::Identifier => self.identifier,
            ColumnRole::Quantity => self.quantity,
        }
    }

    fn slot(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::Level => &mut self.level,
            ColumnRole::Description => &mut self.description,
            ColumnRole::Identifier => &mut self.identifier,
            ColumnRole::Quantity => &mut self.quantity,
        }
    }
}

/// Classify one header cell. Rules are tried in order; the first hit wins.
pub fn classify_header(text: &str, quantity: QuantityColumn) -> Option<ColumnRole> {
    let upper = text.to_uppercase();
    let has = |needle: &str| upper.contains(needle);
    if has("LV") || has("LEVEL") {
        Some(ColumnRole::Level)
    } else if has("DESC") || has("NOMENCLATURE") {
        Some(ColumnRole::Description)
    } else if has("MATERIAL") || has("NSN") || has("NIIN") {
        Some(ColumnRole::Identifier)
    } else if has("QTY")
        && match quantity {
            QuantityColumn::Authorized => has("AUTH"),
            QuantityColumn::OnHand => has("OH"),
        }
    {
        Some(ColumnRole::Quantity)
    } else {
        None
    }
}

/// Build the role map for a header row, scanning left to right. The first
/// cell claiming a role keeps it.
pub fn resolve_columns<S: AsRef<str>>(header: &[Option<S>], quantity: QuantityColumn) -> ColumnRoleMap {
    let mut map = ColumnRoleMap::default();
    for (idx, cell) in header.iter().enumerate() {
        let Some(text) = cell.as_ref().map(AsRef::as_ref) else {
            continue;
        };
        if let Some(role) = classify_header(text, quantity) {
            let slot = map.slot(role);
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect()
    }

    #[test]
    fn standard_bom_header() {
        let map = resolve_columns(
            &header(&["LV", "DESCRIPTION", "MATERIAL", "OH QTY", "AUTH QTY"]),
            QuantityColumn::Authorized,
        );
        assert_eq!(
            map,
            ColumnRoleMap {
                level: Some(0),
                description: Some(1),
                identifier: Some(2),
                quantity: Some(4),
            }
        );
        assert!(map.is_usable());
    }

    #[test]
    fn on_hand_variant_picks_oh_column() {
        let map = resolve_columns(
            &header(&["LV", "DESCRIPTION", "MATERIAL", "OH QTY", "AUTH QTY"]),
            QuantityColumn::OnHand,
        );
        assert_eq!(map.quantity, Some(3));
    }

    #[test]
    fn first_cell_per_role_wins() {
        let map = resolve_columns(
            &header(&["", "Level", "Nomenclature", "Desc 2", "NIIN"]),
            QuantityColumn::Authorized,
        );
        assert_eq!(map.level, Some(1));
        assert_eq!(map.description, Some(2));
        assert_eq!(map.identifier, Some(4));
        assert_eq!(map.quantity, None);
    }

    #[test]
    fn missing_description_is_unusable() {
        let map = resolve_columns(&header(&["LV", "MATERIAL", "AUTH QTY"]), QuantityColumn::Authorized);
        assert!(!map.is_usable());
        assert_eq!(map.get(ColumnRole::Quantity), Some(2));
    }

    #[test]
    fn level_rule_shadows_later_rules() {
        // "LV DESC" classifies as level only; the cell is not a description.
        assert_eq!(classify_header("LV DESC", QuantityColumn::Authorized), Some(ColumnRole::Level));
    }
}
