//! Domain types shared across extraction, layout and rendering.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::date::format_military_date;

/// One packing-list line item recovered from the BOM.
///
/// `line_no` is always assigned by the extractor in document order, never
/// read from the source. `description` is never empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomItem {
    pub line_no: usize,
    pub description: String,
    /// Nine-digit stock number, or empty when the row carried none.
    pub nsn: String,
    pub qty: u32,
}

impl BomItem {
    pub fn has_nsn(&self) -> bool {
        !self.nsn.is_empty()
    }
}

/// A point in PDF user space (origin bottom-left).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Administrative (non-tabular) fields of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminField {
    Unit,
    Requisition,
    Order,
    Date,
    PackedBy,
    ReceivedBy,
    Page,
    Boxes,
    EndItem,
    Model,
}

impl AdminField {
    pub const ALL: [AdminField; 10] = [
        AdminField::Unit,
        AdminField::Requisition,
        AdminField::Order,
        AdminField::Date,
        AdminField::PackedBy,
        AdminField::ReceivedBy,
        AdminField::Page,
        AdminField::Boxes,
        AdminField::EndItem,
        AdminField::Model,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AdminField::Unit => "unit",
            AdminField::Requisition => "requisition",
            AdminField::Order => "order",
            AdminField::Date => "date",
            AdminField::PackedBy => "packed_by",
            AdminField::ReceivedBy => "received_by",
            AdminField::Page => "page",
            AdminField::Boxes => "boxes",
            AdminField::EndItem => "end_item",
            AdminField::Model => "model",
        }
    }
}

impl fmt::Display for AdminField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text values for the administrative block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminValues {
    pub unit: String,
    pub packed_by: String,
    pub num_boxes: String,
    pub requisition_no: String,
    pub order_no: String,
    pub date: String,
    pub end_item: String,
    pub model: String,
}

impl AdminValues {
    /// Build from loosely keyed form input.
    ///
    /// Values are trimmed; unrecognized keys are ignored. The date is
    /// normalized to the military `DDMONYYYY` form when it parses.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let mut values = AdminValues::default();
        for (key, value) in map {
            let value = value.trim().to_string();
            match key.as_str() {
                "unit" => values.unit = value,
                "packed_by" => values.packed_by = value,
                "num_boxes" => values.num_boxes = value,
                "requisition_no" => values.requisition_no = value,
                "order_no" => values.order_no = value,
                "date" => values.date = value,
                "end_item" => values.end_item = value,
                "model" => values.model = value,
                other => debug!(key = other, "ignoring unknown admin field"),
            }
        }
        values.normalized()
    }

    /// Return a copy with the date in military format.
    pub fn normalized(mut self) -> Self {
        self.date = format_military_date(&self.date);
        self
    }

    /// The value to draw for a field, if any. Page and received-by have no
    /// user value; they are drawn by the layout engine itself.
    pub fn value(&self, field: AdminField) -> Option<&str> {
        let v = match field {
            AdminField::Unit => &self.unit,
            AdminField::Requisition => &self.requisition_no,
            AdminField::Order => &self.order_no,
            AdminField::Date => &self.date,
            AdminField::PackedBy => &self.packed_by,
            AdminField::Boxes => &self.num_boxes,
            AdminField::EndItem => &self.end_item,
            AdminField::Model => &self.model,
            AdminField::ReceivedBy | AdminField::Page => return None,
        };
        if v.is_empty() { None } else { Some(v.as_str()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_map_trims_and_formats_date() {
        let mut map = HashMap::new();
        map.insert("unit".to_string(), "  A CO 1-5 IN ".to_string());
        map.insert("date".to_string(), "2026-01-04".to_string());
        map.insert("colour".to_string(), "red".to_string());
        let values = AdminValues::from_map(&map);
        assert_eq!(values.unit, "A CO 1-5 IN");
        assert_eq!(values.date, "04JAN2026");
        assert_eq!(values.value(AdminField::Unit), Some("A CO 1-5 IN"));
        assert_eq!(values.value(AdminField::Model), None);
        assert_eq!(values.value(AdminField::Page), None);
    }
}
