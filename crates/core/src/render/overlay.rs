//! Draw instructions to PDF content-stream bytes.

use lopdf::Object;
use lopdf::content::{Content, Operation};

use crate::error::{FormError, Result};
use crate::layout::{Align, DrawText, PagePlan};
use crate::metrics::text_width;

/// Resource name the overlay registers Helvetica under. Unusual enough not
/// to collide with template fonts.
pub const OVERLAY_FONT: &str = "DD1750Helv";

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

/// Encode for a WinAnsi simple font; characters outside Latin-1 become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            cp @ (0x20..=0x7E | 0xA0..=0xFF) => cp as u8,
            _ => b'?',
        })
        .collect()
}

/// Left edge of a draw after alignment.
pub fn draw_origin_x(draw: &DrawText) -> f64 {
    match draw.align {
        Align::Left => draw.x,
        Align::Center => draw.x - text_width(&draw.text, draw.size) / 2.0,
    }
}

/// Operations for one page: black Helvetica text, wrapped in `q ... Q`.
pub fn overlay_operations(plan: &PagePlan) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("g", vec![real(0.0)]),
    ];
    for draw in plan.draws.iter().filter(|d| !d.text.is_empty()) {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(OVERLAY_FONT.as_bytes().to_vec()), real(draw.size)],
        ));
        ops.push(Operation::new(
            "Td",
            vec![real(draw_origin_x(draw)), real(draw.y)],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&draw.text))],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Encoded content stream for one page.
pub fn render_overlay(plan: &PagePlan) -> Result<Vec<u8>> {
    Content {
        operations: overlay_operations(plan),
    }
    .encode()
    .map_err(|e| FormError::Render {
        page: plan.page_index,
        msg: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_latin1_and_replaces_the_rest() {
        assert_eq!(encode_win_ansi("AN/PRC-152"), b"AN/PRC-152".to_vec());
        assert_eq!(encode_win_ansi("é→"), vec![0xE9, b'?']);
    }

    #[test]
    fn centered_text_is_shifted_by_half_width() {
        let draw = DrawText {
            text: "EA".to_string(),
            x: 386.75,
            y: 600.0,
            size: 8.0,
            align: Align::Center,
        };
        // E = 667, A = 667 at 8 pt.
        assert!((draw_origin_x(&draw) - (386.75 - 5.336)).abs() < 1e-9);
    }

    #[test]
    fn empty_plan_is_balanced() {
        let plan = PagePlan {
            page_index: 0,
            total_pages: 1,
            items: vec![],
            draws: vec![],
        };
        let ops = overlay_operations(&plan);
        let names: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(names, vec!["q", "g", "Q"]);
    }
}
