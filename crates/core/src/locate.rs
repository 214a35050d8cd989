//! Admin-field label detection on the template.
//!
//! The first template page is scanned for label words ("UNIT", "DATE",
//! "PACKED BY" ...). Each recognized label yields a draw position for its
//! value, either just right of the label or at the label itself.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::model::{AdminField, Point};
use crate::reader::DocumentReader;
use crate::reader::types::Word;

/// Gap between a label's right edge and its value.
const AFTER_LABEL_GAP: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Anchor {
    /// Value starts `AFTER_LABEL_GAP` right of the label.
    AfterLabel,
    /// Value starts at the label's left edge.
    AtLabel,
}

struct LabelRule {
    matches: fn(&str) -> bool,
    field: AdminField,
    anchor: Anchor,
}

/// Ordered; the first rule matching a word wins.
const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        matches: |t| t.contains("REQUISITION") && !t.contains("NO"),
        field: AdminField::Requisition,
        anchor: Anchor::AfterLabel,
    },
    LabelRule {
        matches: |t| t.contains("ORDER") && t.contains("NO"),
        field: AdminField::Order,
        anchor: Anchor::AfterLabel,
    },
    LabelRule {
        matches: |t| t == "DATE",
        field: AdminField::Date,
        anchor: Anchor::AfterLabel,
    },
    LabelRule {
        matches: |t| t.contains("BOXES"),
        field: AdminField::Boxes,
        anchor: Anchor::AfterLabel,
    },
    LabelRule {
        matches: |t| t.contains("UNIT"),
        field: AdminField::Unit,
        anchor: Anchor::AfterLabel,
    },
    LabelRule {
        matches: |t| t.contains("PAGE"),
        field: AdminField::Page,
        anchor: Anchor::AfterLabel,
    },
    LabelRule {
        matches: |t| t.contains("PACKED") && t.contains("BY"),
        field: AdminField::PackedBy,
        anchor: Anchor::AtLabel,
    },
    LabelRule {
        matches: |t| t.contains("RECEIVED") && t.contains("BY"),
        field: AdminField::ReceivedBy,
        anchor: Anchor::AtLabel,
    },
    LabelRule {
        matches: |t| t.contains("END") && t.contains("ITEM"),
        field: AdminField::EndItem,
        anchor: Anchor::AfterLabel,
    },
    LabelRule {
        matches: |t| t.contains("MODEL"),
        field: AdminField::Model,
        anchor: Anchor::AfterLabel,
    },
];

/// Draw positions for admin fields, in PDF space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdminPositions {
    positions: BTreeMap<AdminField, Point>,
}

impl AdminPositions {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Positions for the canonical DD Form 1750 (letter).
    pub fn dd1750_defaults() -> Self {
        let mut p = Self::empty();
        p.set(AdminField::Unit, Point::new(120.0, 716.0));
        p.set(AdminField::Requisition, Point::new(375.0, 716.0));
        p.set(AdminField::Page, Point::new(535.0, 740.0));
        p.set(AdminField::Boxes, Point::new(535.0, 716.0));
        p.set(AdminField::Order, Point::new(375.0, 692.0));
        p.set(AdminField::Date, Point::new(535.0, 692.0));
        p.set(AdminField::EndItem, Point::new(120.0, 668.0));
        p.set(AdminField::Model, Point::new(375.0, 668.0));
        p.set(AdminField::PackedBy, Point::new(50.0, 60.0));
        p.set(AdminField::ReceivedBy, Point::new(320.0, 60.0));
        p
    }

    pub fn get(&self, field: AdminField) -> Option<Point> {
        self.positions.get(&field).copied()
    }

    pub fn set(&mut self, field: AdminField, at: Point) {
        self.positions.insert(field, at);
    }

    /// Overlay `other` on `self`, field by field.
    pub fn merged_with(mut self, other: &AdminPositions) -> Self {
        for (field, at) in &other.positions {
            self.positions.insert(*field, *at);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AdminField, Point)> + '_ {
        self.positions.iter().map(|(f, p)| (*f, *p))
    }
}

/// Match label words against the rule table. `page_height` converts the
/// label's top-left `bottom` into a PDF baseline.
pub fn locate_admin_fields(words: &[Word], page_height: f64) -> AdminPositions {
    let mut found = AdminPositions::empty();
    for word in words {
        let text = word.text.to_uppercase();
        let Some(rule) = LABEL_RULES.iter().find(|r| (r.matches)(&text)) else {
            continue;
        };
        if found.get(rule.field).is_some() {
            continue;
        }
        let x = match rule.anchor {
            Anchor::AfterLabel => word.x1 + AFTER_LABEL_GAP,
            Anchor::AtLabel => word.x0,
        };
        let at = Point::new(x, page_height - word.bottom);
        debug!(field = %rule.field, label = %word.text, x = at.x, y = at.y, "located admin label");
        found.set(rule.field, at);
    }
    found
}

/// Locate admin labels on the first page of a template.
pub fn detect_admin_positions(template: &dyn DocumentReader) -> Result<AdminPositions> {
    let words = template.page_words(0)?;
    let height = template.page_height(0)?;
    Ok(locate_admin_fields(&words, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x0: f64, bottom: f64) -> Word {
        Word {
            text: text.to_string(),
            x0,
            x1: x0 + 30.0,
            top: bottom - 8.0,
            bottom,
        }
    }

    #[test]
    fn rules_apply_in_order() {
        let words = vec![
            word("REQUISITION", 300.0, 80.0),
            word("ORDER NO.", 300.0, 100.0),
            word("Date", 480.0, 100.0),
            word("UPDATED", 10.0, 10.0),
            word("PACKED BY", 40.0, 720.0),
        ];
        let found = locate_admin_fields(&words, 792.0);
        assert_eq!(found.get(AdminField::Requisition), Some(Point::new(335.0, 712.0)));
        assert_eq!(found.get(AdminField::Order), Some(Point::new(335.0, 692.0)));
        assert_eq!(found.get(AdminField::Date), Some(Point::new(515.0, 692.0)));
        assert_eq!(found.get(AdminField::PackedBy), Some(Point::new(40.0, 72.0)));
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn first_label_for_a_field_wins() {
        let words = vec![word("UNIT", 10.0, 50.0), word("UNIT", 200.0, 400.0)];
        let found = locate_admin_fields(&words, 792.0);
        assert_eq!(found.get(AdminField::Unit), Some(Point::new(45.0, 742.0)));
    }

    #[test]
    fn requisition_number_label_is_not_a_requisition() {
        // Contains "NO": falls through every rule.
        let found = locate_admin_fields(&[word("REQUISITION NO", 0.0, 10.0)], 792.0);
        assert!(found.is_empty());
    }

    #[test]
    fn detected_positions_override_defaults() {
        let mut detected = AdminPositions::empty();
        detected.set(AdminField::Unit, Point::new(1.0, 2.0));
        let merged = AdminPositions::dd1750_defaults().merged_with(&detected);
        assert_eq!(merged.get(AdminField::Unit), Some(Point::new(1.0, 2.0)));
        assert_eq!(merged.len(), AdminField::ALL.len());
    }
}
