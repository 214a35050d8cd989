//! Content-stream interpreter.
//!
//! Walks a page's operators and emits positioned glyphs and ruling-line
//! edges. Only the state that affects geometry is tracked: CTM, text state
//! and the current path. Colors, clipping and images are ignored.
//!
//! Output is in top-left page space relative to the media box.

use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::font::PdfFont;
use super::objects::{number, resolve, resolve_dict};
use super::table::edges::{rect_to_edges, segment_to_edge};
use super::types::{BBox, CharObj, EdgeObj};
use crate::error::{FormError, Result};

pub(crate) type Matrix = (f64, f64, f64, f64, f64, f64);
pub(crate) const MATRIX_IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Glyph box relative to the baseline, in units of font size.
const GLYPH_ASCENT: f64 = 0.8;
const GLYPH_DESCENT: f64 = -0.2;

/// Rectangles thinner than this are drawn rules, not boxes.
const THIN_RECT: f64 = 1.0;

/// Nested form XObjects deeper than this are skipped.
const MAX_FORM_DEPTH: usize = 8;

/// Multiply `m1` by `m0` (apply `m1` first).
pub(crate) fn mult_matrix(m1: Matrix, m0: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = m1;
    let (a0, b0, c0, d0, e0, f0) = m0;
    (
        a0 * a1 + c0 * b1,
        b0 * a1 + d0 * b1,
        a0 * c1 + c0 * d1,
        b0 * c1 + d0 * d1,
        a0 * e1 + c0 * f1 + e0,
        b0 * e1 + d0 * f1 + f0,
    )
}

pub(crate) fn apply_matrix_pt(m: Matrix, (x, y): (f64, f64)) -> (f64, f64) {
    let (a, b, c, d, e, f) = m;
    (a * x + c * y + e, b * x + d * y + f)
}

fn translate_matrix(m: Matrix, (x, y): (f64, f64)) -> Matrix {
    let (a, b, c, d, e, f) = m;
    (a, b, c, d, x * a + y * c + e, x * b + y * d + f)
}

/// Text state (PDF 32000 9.3).
#[derive(Clone, Debug)]
struct TextState {
    font: Option<Arc<PdfFont>>,
    fontsize: f64,
    charspace: f64,
    wordspace: f64,
    /// Horizontal scaling, percent.
    scaling: f64,
    leading: f64,
    rise: f64,
    matrix: Matrix,
    line_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            fontsize: 0.0,
            charspace: 0.0,
            wordspace: 0.0,
            scaling: 100.0,
            leading: 0.0,
            rise: 0.0,
            matrix: MATRIX_IDENTITY,
            line_matrix: MATRIX_IDENTITY,
        }
    }
}

impl TextState {
    fn reset(&mut self) {
        self.matrix = MATRIX_IDENTITY;
        self.line_matrix = MATRIX_IDENTITY;
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = translate_matrix(self.line_matrix, (tx, ty));
        self.matrix = self.line_matrix;
    }
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    from: (f64, f64),
    to: (f64, f64),
    straight: bool,
}

/// Current path in device space.
#[derive(Debug, Default)]
struct PathBuilder {
    segments: Vec<Segment>,
    rects: Vec<[(f64, f64); 4]>,
    start: Option<(f64, f64)>,
    current: Option<(f64, f64)>,
}

impl PathBuilder {
    fn move_to(&mut self, p: (f64, f64)) {
        self.start = Some(p);
        self.current = Some(p);
    }

    fn line_to(&mut self, p: (f64, f64), straight: bool) {
        if let Some(from) = self.current {
            self.segments.push(Segment { from, to: p, straight });
        }
        self.current = Some(p);
    }

    fn close(&mut self) {
        if let (Some(start), Some(current)) = (self.start, self.current)
            && start != current
        {
            self.segments.push(Segment { from: current, to: start, straight: true });
        }
        self.current = self.start;
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Glyphs and edges of one page.
#[derive(Clone, Debug, Default)]
pub struct PageContent {
    pub chars: Vec<CharObj>,
    pub edges: Vec<EdgeObj>,
}

type FontMap = FxHashMap<Vec<u8>, Arc<PdfFont>>;

fn load_fonts(doc: &Document, resources: Option<&Dictionary>) -> FontMap {
    let mut fonts = FontMap::default();
    let Some(font_dict) = resources
        .and_then(|r| r.get(b"Font").ok())
        .and_then(|o| resolve_dict(doc, o))
    else {
        return fonts;
    };
    for (name, obj) in font_dict.iter() {
        if let Some(dict) = resolve_dict(doc, obj) {
            fonts.insert(name.clone(), Arc::new(PdfFont::from_dict(doc, dict)));
        }
    }
    fonts
}

fn operand_f64(op: &Operation, i: usize) -> f64 {
    op.operands.get(i).and_then(number).unwrap_or(0.0)
}

fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes.as_slice()),
        _ => None,
    }
}

pub(crate) struct PageInterpreter<'a> {
    doc: &'a Document,
    /// Media box `[x0, y0, x1, y1]`, for the top-left conversion.
    media: [f64; 4],
    ctm: Matrix,
    textstate: TextState,
    gstack: Vec<(Matrix, TextState)>,
    path: PathBuilder,
    out: PageContent,
}

#[allow(non_snake_case)]
impl<'a> PageInterpreter<'a> {
    pub fn new(doc: &'a Document, media: [f64; 4]) -> Self {
        Self {
            doc,
            media,
            ctm: MATRIX_IDENTITY,
            textstate: TextState::default(),
            gstack: Vec::new(),
            path: PathBuilder::default(),
            out: PageContent::default(),
        }
    }

    /// Interpret a content stream with the given resources.
    pub fn run(mut self, content: &[u8], resources: Option<&'a Dictionary>) -> Result<PageContent> {
        let content = Content::decode(content).map_err(|e| FormError::Content(e.to_string()))?;
        self.execute(&content.operations, resources, 0);
        Ok(self.out)
    }

    fn execute(&mut self, ops: &[Operation], resources: Option<&'a Dictionary>, depth: usize) {
        let fonts = load_fonts(self.doc, resources);
        for op in ops {
            self.dispatch(op, &fonts, resources, depth);
        }
    }

    fn dispatch(
        &mut self,
        op: &Operation,
        fonts: &FontMap,
        resources: Option<&'a Dictionary>,
        depth: usize,
    ) {
        let f = |i| operand_f64(op, i);
        match op.operator.as_str() {
            "q" => self.do_q(),
            "Q" => self.do_Q(),
            "cm" => self.do_cm((f(0), f(1), f(2), f(3), f(4), f(5))),

            "BT" => self.textstate.reset(),
            "ET" => {}
            "Tc" => self.textstate.charspace = f(0),
            "Tw" => self.textstate.wordspace = f(0),
            "Tz" => self.textstate.scaling = f(0),
            "TL" => self.textstate.leading = f(0),
            "Ts" => self.textstate.rise = f(0),
            "Tf" => {
                let font = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| fonts.get(name).cloned());
                if font.is_none() {
                    debug!(operands = ?op.operands, "unresolved font resource, using Helvetica");
                }
                self.textstate.font = Some(font.unwrap_or_else(|| Arc::new(PdfFont::fallback())));
                self.textstate.fontsize = f(1);
            }
            "Td" => self.textstate.move_line(f(0), f(1)),
            "TD" => {
                self.textstate.leading = -f(1);
                self.textstate.move_line(f(0), f(1));
            }
            "Tm" => {
                let m = (f(0), f(1), f(2), f(3), f(4), f(5));
                self.textstate.matrix = m;
                self.textstate.line_matrix = m;
            }
            "T*" => self.do_T_star(),
            "Tj" => {
                if let Some(bytes) = op.operands.first().and_then(string_bytes) {
                    self.show_string(bytes);
                }
            }
            "'" => {
                self.do_T_star();
                if let Some(bytes) = op.operands.first().and_then(string_bytes) {
                    self.show_string(bytes);
                }
            }
            "\"" => {
                self.textstate.wordspace = f(0);
                self.textstate.charspace = f(1);
                self.do_T_star();
                if let Some(bytes) = op.operands.get(2).and_then(string_bytes) {
                    self.show_string(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    self.do_TJ(items);
                }
            }

            "m" => {
                let p = apply_matrix_pt(self.ctm, (f(0), f(1)));
                self.path.move_to(p);
            }
            "l" => {
                let p = apply_matrix_pt(self.ctm, (f(0), f(1)));
                self.path.line_to(p, true);
            }
            "c" => {
                let p = apply_matrix_pt(self.ctm, (f(4), f(5)));
                self.path.line_to(p, false);
            }
            "v" | "y" => {
                let p = apply_matrix_pt(self.ctm, (f(2), f(3)));
                self.path.line_to(p, false);
            }
            "h" => self.path.close(),
            "re" => self.do_re(f(0), f(1), f(2), f(3)),
            "S" | "f" | "F" | "f*" | "B" | "B*" => self.paint_path(),
            "s" | "b" | "b*" => {
                self.path.close();
                self.paint_path();
            }
            "n" => self.path.clear(),

            "Do" => {
                if let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) {
                    self.do_Do(name, resources, depth);
                }
            }
            _ => {}
        }
    }

    fn do_q(&mut self) {
        self.gstack.push((self.ctm, self.textstate.clone()));
    }

    fn do_Q(&mut self) {
        if let Some((ctm, textstate)) = self.gstack.pop() {
            self.ctm = ctm;
            self.textstate = textstate;
        }
    }

    fn do_cm(&mut self, m: Matrix) {
        self.ctm = mult_matrix(m, self.ctm);
    }

    fn do_T_star(&mut self) {
        let leading = self.textstate.leading;
        self.textstate.move_line(0.0, -leading);
    }

    fn do_re(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)]
            .map(|p| apply_matrix_pt(self.ctm, p));
        self.path.rects.push(corners);
        self.path.move_to(corners[0]);
    }

    fn do_TJ(&mut self, items: &[Object]) {
        let hscale = self.textstate.scaling / 100.0;
        for item in items {
            match item {
                Object::String(bytes, _) => self.show_string(bytes),
                other => {
                    if let Some(adj) = number(other) {
                        let dx = -adj / 1000.0 * self.textstate.fontsize * hscale;
                        self.textstate.matrix = translate_matrix(self.textstate.matrix, (dx, 0.0));
                    }
                }
            }
        }
    }

    fn do_Do(&mut self, name: &[u8], resources: Option<&'a Dictionary>, depth: usize) {
        if depth >= MAX_FORM_DEPTH {
            debug!(depth, "form XObject nesting too deep, skipping");
            return;
        }
        let doc = self.doc;
        let Some(stream) = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|o| resolve_dict(doc, o))
            .and_then(|x| x.get(name).ok())
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_stream().ok())
        else {
            return;
        };
        let is_form = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Form");
        if !is_form {
            return;
        }
        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let content = match Content::decode(&data) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "skipping undecodable form XObject");
                return;
            }
        };
        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .filter(|a| a.len() == 6)
            .and_then(|a| {
                let v: Option<Vec<f64>> = a.iter().map(|o| number(resolve(doc, o))).collect();
                v.map(|v| (v[0], v[1], v[2], v[3], v[4], v[5]))
            })
            .unwrap_or(MATRIX_IDENTITY);
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve_dict(doc, o))
            .or(resources);

        self.do_q();
        self.do_cm(matrix);
        self.execute(&content.operations, form_resources, depth + 1);
        self.do_Q();
    }

    /// Convert a device-space point to top-left page space.
    fn to_page(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (x - self.media[0], self.media[3] - y)
    }

    fn paint_path(&mut self) {
        let path = std::mem::take(&mut self.path);
        for corners in &path.rects {
            let pts = corners.map(|p| self.to_page(p));
            let axis_aligned = ((pts[0].1 - pts[1].1).abs() < 1e-6 && (pts[1].0 - pts[2].0).abs() < 1e-6)
                || ((pts[0].0 - pts[1].0).abs() < 1e-6 && (pts[1].1 - pts[2].1).abs() < 1e-6);
            if axis_aligned {
                let xs = pts.map(|p| p.0);
                let ys = pts.map(|p| p.1);
                let bbox = BBox {
                    x0: xs.iter().copied().fold(f64::INFINITY, f64::min),
                    top: ys.iter().copied().fold(f64::INFINITY, f64::min),
                    x1: xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    bottom: ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                };
                self.out.edges.extend(rect_to_edges(bbox, THIN_RECT));
            }
        }
        for seg in path.segments.iter().filter(|s| s.straight) {
            if let Some(edge) = segment_to_edge(self.to_page(seg.from), self.to_page(seg.to)) {
                self.out.edges.push(edge);
            }
        }
    }

    fn show_string(&mut self, bytes: &[u8]) {
        let font = self
            .textstate
            .font
            .clone()
            .unwrap_or_else(|| Arc::new(PdfFont::fallback()));
        let ts = &self.textstate;
        let (fontsize, hscale, rise) = (ts.fontsize, ts.scaling / 100.0, ts.rise);
        let (charspace, wordspace) = (ts.charspace, ts.wordspace);

        for glyph in font.decode(bytes) {
            let advance_w = glyph.width / 1000.0 * fontsize * hscale;
            let render = mult_matrix(self.textstate.matrix, self.ctm);
            if !glyph.text.is_empty() {
                let corners = [
                    (0.0, rise + GLYPH_DESCENT * fontsize),
                    (advance_w, rise + GLYPH_DESCENT * fontsize),
                    (0.0, rise + GLYPH_ASCENT * fontsize),
                    (advance_w, rise + GLYPH_ASCENT * fontsize),
                ]
                .map(|p| self.to_page(apply_matrix_pt(render, p)));
                let xs = corners.map(|p| p.0);
                let ys = corners.map(|p| p.1);
                let (_, _, c, d, _, _) = render;
                self.out.chars.push(CharObj {
                    text: glyph.text.clone(),
                    x0: xs.iter().copied().fold(f64::INFINITY, f64::min),
                    x1: xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    top: ys.iter().copied().fold(f64::INFINITY, f64::min),
                    bottom: ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    size: fontsize * c.hypot(d),
                });
            }
            let mut advance = advance_w + charspace * hscale;
            if glyph.code == 32 && font.single_byte() {
                advance += wordspace * hscale;
            }
            self.textstate.matrix = translate_matrix(self.textstate.matrix, (advance, 0.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::types::Orientation;

    fn run(content: &str) -> PageContent {
        let doc = Document::with_version("1.5");
        PageInterpreter::new(&doc, [0.0, 0.0, 612.0, 792.0])
            .run(content.as_bytes(), None)
            .unwrap()
    }

    #[test]
    fn text_position_in_top_left_space() {
        let page = run("BT /F1 10 Tf 1 0 0 1 100 700 Tm (AB) Tj ET");
        assert_eq!(page.chars.len(), 2);
        let a = &page.chars[0];
        assert_eq!(a.text, "A");
        assert!((a.x0 - 100.0).abs() < 1e-9);
        assert!((a.x1 - 106.67).abs() < 1e-9);
        assert!((a.bottom - 94.0).abs() < 1e-9);
        assert!((a.top - 84.0).abs() < 1e-9);
        assert!((page.chars[1].x0 - 106.67).abs() < 1e-9);
    }

    #[test]
    fn td_and_leading_move_lines() {
        let page = run("BT /F1 10 Tf 12 TL 50 500 Td (X) Tj T* (Y) Tj ET");
        assert!((page.chars[0].bottom - (792.0 - 500.0 + 2.0)).abs() < 1e-9);
        assert!((page.chars[1].bottom - page.chars[0].bottom - 12.0).abs() < 1e-9);
        assert_eq!(page.chars[1].x0, 50.0);
    }

    #[test]
    fn tj_adjustment_shifts_next_glyph() {
        let page = run("BT /F1 10 Tf 0 0 Td [(A) -1000 (B)] TJ ET");
        assert!((page.chars[1].x0 - (6.67 + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn cm_and_q_scope_positions() {
        let page = run("q 1 0 0 1 100 0 cm BT /F1 10 Tf (A) Tj ET Q BT /F1 10 Tf (B) Tj ET");
        assert_eq!(page.chars[0].x0, 100.0);
        assert_eq!(page.chars[1].x0, 0.0);
    }

    #[test]
    fn rectangles_and_lines_become_edges() {
        let page = run("10 700 100 50 re S 0 100 m 200 100 l S 0 0 m 50 50 l S 20 20 100 0.5 re f");
        let horizontal = page
            .edges
            .iter()
            .filter(|e| e.orientation == Orientation::Horizontal)
            .count();
        let vertical = page
            .edges
            .iter()
            .filter(|e| e.orientation == Orientation::Vertical)
            .count();
        // box: 2 + 2, line: 1 horizontal, diagonal: none, thin rect: 1.
        assert_eq!(horizontal, 4);
        assert_eq!(vertical, 2);
        let line = page.edges.iter().find(|e| e.x1 == 200.0).unwrap();
        assert_eq!(line.top, 692.0);
    }

    #[test]
    fn malformed_content_does_not_panic() {
        let doc = Document::with_version("1.5");
        let out = PageInterpreter::new(&doc, [0.0, 0.0, 612.0, 792.0]).run(b"BT (unterminated Tj", None);
        assert!(out.is_err() || out.is_ok_and(|p| p.chars.is_empty()));
    }
}
