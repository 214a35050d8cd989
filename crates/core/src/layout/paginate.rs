//! Record pagination and draw-instruction placement.

use serde::{Deserialize, Serialize};

use super::geometry::LayoutGeometry;
use crate::locate::AdminPositions;
use crate::model::{AdminField, AdminValues, BomItem};

const SIGNATURE_CAPTION: &str = "(Signature)";
const RECEIVED_BY_LABEL: &str = "RECEIVED BY:";
/// Unit of issue printed for every line.
const UNIT_OF_ISSUE: &str = "EA";
/// Spares are never tracked on the source BOM.
const SPARES: &str = "0";

/// Horizontal anchoring of a text draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    /// `x` is the left edge.
    Left,
    /// `x` is the center.
    Center,
}

/// One string to draw, in PDF space, Helvetica at `size`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawText {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub align: Align,
}

impl DrawText {
    fn left(text: impl Into<String>, x: f64, y: f64, size: f64) -> Self {
        Self { text: text.into(), x, y, size, align: Align::Left }
    }

    fn centered(text: impl Into<String>, x: f64, y: f64, size: f64) -> Self {
        Self { text: text.into(), x, y, size, align: Align::Center }
    }
}

/// Which output pages carry the admin block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPages {
    #[default]
    Every,
    First,
}

/// Everything drawn on one output page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PagePlan {
    /// Zero-based.
    pub page_index: usize,
    pub total_pages: usize,
    pub items: Vec<BomItem>,
    pub draws: Vec<DrawText>,
}

/// Draws for the item in row `i` of a page.
pub fn row_draws(item: &BomItem, i: usize, g: &LayoutGeometry) -> Vec<DrawText> {
    let y = g.row_y(i);
    let baseline = y - g.baseline_drop;
    let f = &g.fonts;
    let description: String = item.description.chars().take(g.description_max_chars).collect();
    let qty = item.qty.to_string();

    let mut draws = vec![
        DrawText::centered(item.line_no.to_string(), g.box_column.center(), baseline, f.box_number),
        DrawText::left(
            description,
            g.content_column.left + g.description_padding,
            baseline,
            f.description,
        ),
    ];
    if item.has_nsn() {
        draws.push(DrawText::left(
            format!("NSN: {}", item.nsn),
            g.content_column.left + g.description_padding,
            y - g.sub_line_drop,
            f.identifier,
        ));
    }
    draws.extend([
        DrawText::centered(UNIT_OF_ISSUE, g.unit_of_issue_column.center(), baseline, f.quantity),
        DrawText::centered(qty.clone(), g.initial_column.center(), baseline, f.quantity),
        DrawText::centered(SPARES, g.spares_column.center(), baseline, f.quantity),
        DrawText::centered(qty, g.total_column.center(), baseline, f.quantity),
    ]);
    draws
}

/// The `p/total` indicator, drawn on every page of a multi-page form.
pub fn page_indicator(
    page_index: usize,
    total_pages: usize,
    g: &LayoutGeometry,
    positions: &AdminPositions,
) -> Option<DrawText> {
    if total_pages < 2 {
        return None;
    }
    let at = positions.get(AdminField::Page)?;
    Some(DrawText::left(
        format!("{}/{}", page_index + 1, total_pages),
        at.x,
        at.y,
        g.fonts.page_indicator,
    ))
}

/// Admin block draws for one page.
pub fn admin_draws(
    g: &LayoutGeometry,
    positions: &AdminPositions,
    admin: &AdminValues,
) -> Vec<DrawText> {
    let f = &g.fonts;
    let mut draws = Vec::new();

    const PLAIN_FIELDS: [AdminField; 7] = [
        AdminField::Unit,
        AdminField::Requisition,
        AdminField::Date,
        AdminField::Order,
        AdminField::Boxes,
        AdminField::EndItem,
        AdminField::Model,
    ];
    for field in PLAIN_FIELDS {
        if let (Some(at), Some(value)) = (positions.get(field), admin.value(field)) {
            let text: String = match field {
                AdminField::Unit => value.chars().take(g.unit_max_chars).collect(),
                _ => value.to_string(),
            };
            draws.push(DrawText::left(text, at.x, at.y, f.admin));
        }
    }

    if let (Some(at), Some(packer)) = (positions.get(AdminField::PackedBy), admin.value(AdminField::PackedBy)) {
        draws.push(DrawText::left(packer, at.x, at.y, f.admin));
        draws.push(DrawText::left(SIGNATURE_CAPTION, at.x, at.y - g.caption_drop, f.caption));
    }

    if let Some(at) = positions.get(AdminField::ReceivedBy) {
        draws.push(DrawText::left(RECEIVED_BY_LABEL, at.x, at.y, f.admin));
        draws.push(DrawText::left(SIGNATURE_CAPTION, at.x, at.y - g.caption_drop, f.caption));
    }
    draws
}

/// Split records into pages of `rows_per_page` and place every draw.
///
/// Zero records give zero pages.
pub fn paginate(
    items: &[BomItem],
    g: &LayoutGeometry,
    positions: &AdminPositions,
    admin: &AdminValues,
    admin_pages: AdminPages,
) -> Vec<PagePlan> {
    let total_pages = g.page_count(items.len());
    items
        .chunks(g.rows_per_page.max(1))
        .enumerate()
        .map(|(page_index, chunk)| {
            let mut draws: Vec<DrawText> = chunk
                .iter()
                .enumerate()
                .flat_map(|(i, item)| row_draws(item, i, g))
                .collect();
            if admin_pages == AdminPages::Every || page_index == 0 {
                draws.extend(admin_draws(g, positions, admin));
            }
            draws.extend(page_indicator(page_index, total_pages, g, positions));
            PagePlan {
                page_index,
                total_pages,
                items: chunk.to_vec(),
                draws,
            }
        })
        .collect()
}
