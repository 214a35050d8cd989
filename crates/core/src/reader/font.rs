//! Font handling for text extraction: code decoding and glyph widths.
//!
//! Fonts are resolved from page resources once per page. Decoding prefers a
//! `/ToUnicode` map, then the Identity-H two-byte convention for Type0
//! fonts, then the simple-font encoding (WinAnsi plus `/Differences`).

use lopdf::{Dictionary, Document, Object};
use rustc_hash::FxHashMap;

use super::cmap::{ToUnicodeMap, parse_tounicode};
use super::objects::{number, resolve, resolve_dict};
use crate::metrics::helvetica_width;

/// Width used when a non-standard font gives no metrics at all.
const UNKNOWN_FONT_WIDTH: f64 = 500.0;

/// Widest CID range a single `/W` entry may cover.
const MAX_WIDTH_RANGE: u32 = 0xFFFF;

/// WinAnsi code points for 0x80..=0x9F; other bytes map to Latin-1.
const WIN_ANSI_HIGH: [u16; 32] = [
    0x20AC, 0x0000, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160,
    0x2039, 0x0152, 0x0000, 0x017D, 0x0000, 0x0000, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022,
    0x2013, 0x2014, 0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x0000, 0x017E, 0x0178,
];

/// Glyph names that commonly appear in `/Differences` arrays of BOM exports.
const GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '),
    ("hyphen", '-'),
    ("minus", '-'),
    ("period", '.'),
    ("comma", ','),
    ("colon", ':'),
    ("semicolon", ';'),
    ("slash", '/'),
    ("parenleft", '('),
    ("parenright", ')'),
    ("numbersign", '#'),
    ("ampersand", '&'),
    ("quotesingle", '\''),
    ("quotedbl", '"'),
    ("underscore", '_'),
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("bullet", '\u{2022}'),
    ("endash", '\u{2013}'),
    ("emdash", '\u{2014}'),
    ("quoteright", '\u{2019}'),
    ("quoteleft", '\u{2018}'),
];

/// A character code from a PDF number; negative or oversized values are rejected.
fn char_code(n: f64) -> Option<u32> {
    (n.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&n)).then_some(n as u32)
}

fn win_ansi_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => {
            let cp = WIN_ANSI_HIGH[(byte - 0x80) as usize];
            char::from_u32(u32::from(cp)).filter(|_| cp != 0).unwrap_or('\u{FFFD}')
        }
        _ => char::from(byte),
    }
}

/// Resolve a glyph name to text: single letters, `uniXXXX`, then the table.
fn glyph_name_to_text(name: &str) -> Option<String> {
    let base = name.split('.').next().unwrap_or(name);
    let mut chars = base.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && c.is_ascii_alphabetic()
    {
        return Some(c.to_string());
    }
    if let Some(hex) = base.strip_prefix("uni")
        && hex.len() >= 4
        && hex.len() % 4 == 0
    {
        let units: Option<Vec<u16>> = hex
            .as_bytes()
            .chunks(4)
            .map(|c| std::str::from_utf8(c).ok().and_then(|s| u16::from_str_radix(s, 16).ok()))
            .collect();
        return units.map(|u| String::from_utf16_lossy(&u));
    }
    GLYPH_NAMES
        .iter()
        .find(|(n, _)| *n == base)
        .map(|(_, c)| c.to_string())
}

/// One decoded character code of a show string.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Glyph {
    pub code: u32,
    pub text: String,
    /// Advance in 1/1000 text-space units.
    pub width: f64,
}

/// The subset of a PDF font needed to place glyphs.
#[derive(Clone, Debug, Default)]
pub(crate) struct PdfFont {
    pub base_font: String,
    multibyte: bool,
    widths: FxHashMap<u32, f64>,
    default_width: Option<f64>,
    to_unicode: Option<ToUnicodeMap>,
    differences: FxHashMap<u32, String>,
}

impl PdfFont {
    /// Helvetica stand-in for a font resource that cannot be resolved.
    pub fn fallback() -> Self {
        Self {
            base_font: "Helvetica".to_string(),
            ..Self::default()
        }
    }

    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let name_of = |d: &Dictionary, key: &[u8]| {
            d.get(key)
                .ok()
                .map(|o| resolve(doc, o))
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned())
        };
        let subtype = name_of(dict, b"Subtype").unwrap_or_default();
        let mut font = Self {
            base_font: name_of(dict, b"BaseFont").unwrap_or_default(),
            multibyte: subtype == "Type0",
            ..Self::default()
        };

        font.to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_stream().ok())
            .and_then(|s| s.decompressed_content().ok().or_else(|| Some(s.content.clone())))
            .map(|data| parse_tounicode(&data))
            .filter(|m| !m.is_empty());

        if font.multibyte {
            font.load_cid_widths(doc, dict);
        } else {
            font.load_simple_widths(doc, dict);
            font.load_differences(doc, dict);
        }
        font
    }

    fn load_simple_widths(&mut self, doc: &Document, dict: &Dictionary) {
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| number(resolve(doc, o)))
            .and_then(char_code)
            .unwrap_or(0);
        if let Some(widths) = dict
            .get(b"Widths")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
        {
            for (code, w) in (first_char..=u32::MAX).zip(widths) {
                if let Some(w) = number(resolve(doc, w)) {
                    self.widths.insert(code, w);
                }
            }
            self.default_width = Some(0.0);
        }
        if let Some(missing) = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve_dict(doc, o))
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(|o| number(resolve(doc, o)))
        {
            self.default_width = Some(missing);
        }
    }

    /// `/W` arrays: `c [w1 w2 ...]` or `c_first c_last w`.
    fn load_cid_widths(&mut self, doc: &Document, dict: &Dictionary) {
        let Some(descendant) = dict
            .get(b"DescendantFonts")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .and_then(|a| a.first())
            .and_then(|o| resolve_dict(doc, o))
        else {
            return;
        };
        self.default_width = Some(
            descendant
                .get(b"DW")
                .ok()
                .and_then(|o| number(resolve(doc, o)))
                .unwrap_or(1000.0),
        );
        let Some(w) = descendant
            .get(b"W")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
        else {
            return;
        };
        let mut pending: Vec<f64> = Vec::new();
        for item in w {
            match resolve(doc, item) {
                Object::Array(arr) => {
                    if let Some(first) = pending.pop().and_then(char_code) {
                        for (cid, v) in (first..=u32::MAX).zip(arr) {
                            if let Some(width) = number(resolve(doc, v)) {
                                self.widths.insert(cid, width);
                            }
                        }
                    }
                    pending.clear();
                }
                other => {
                    if let Some(n) = number(other) {
                        pending.push(n);
                        if let [lo, hi, width] = pending[..] {
                            if let (Some(lo), Some(hi)) = (char_code(lo), char_code(hi)) {
                                let hi = hi.min(lo.saturating_add(MAX_WIDTH_RANGE));
                                for cid in lo..=hi {
                                    self.widths.insert(cid, width);
                                }
                            }
                            pending.clear();
                        }
                    }
                }
            }
        }
    }

    fn load_differences(&mut self, doc: &Document, dict: &Dictionary) {
        let Some(diffs) = dict
            .get(b"Encoding")
            .ok()
            .and_then(|o| resolve_dict(doc, o))
            .and_then(|d| d.get(b"Differences").ok())
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
        else {
            return;
        };
        let mut code = 0u32;
        for item in diffs {
            match item {
                Object::Name(name) => {
                    if let Some(text) = glyph_name_to_text(&String::from_utf8_lossy(name)) {
                        self.differences.insert(code, text);
                    }
                    code = code.saturating_add(1);
                }
                other => {
                    if let Some(n) = number(other).and_then(char_code) {
                        code = n;
                    }
                }
            }
        }
    }

    fn code_len(&self) -> usize {
        match &self.to_unicode {
            Some(map) if self.multibyte => map.code_len().max(2),
            Some(map) => map.code_len(),
            None if self.multibyte => 2,
            None => 1,
        }
    }

    /// Word spacing applies only to single-byte code 32.
    pub fn single_byte(&self) -> bool {
        self.code_len() == 1
    }

    fn code_text(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.get(code)) {
            return text.to_string();
        }
        if self.multibyte {
            // Identity-H without ToUnicode: CIDs often equal Unicode values.
            return char::from_u32(code).map(String::from).unwrap_or_default();
        }
        if let Some(text) = self.differences.get(&code) {
            return text.clone();
        }
        u8::try_from(code).map(win_ansi_char).map(String::from).unwrap_or_default()
    }

    fn code_width(&self, code: u32, text: &str) -> f64 {
        if let Some(w) = self.widths.get(&code) {
            return *w;
        }
        if let Some(w) = self.default_width {
            return w;
        }
        let name = self.base_font.to_ascii_lowercase();
        if name.contains("courier") {
            600.0
        } else if name.is_empty() || name.contains("helvetica") || name.contains("arial") {
            text.chars().next().map_or(UNKNOWN_FONT_WIDTH, helvetica_width)
        } else {
            UNKNOWN_FONT_WIDTH
        }
    }

    /// Split a show string into character codes with their text and width.
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        let len = self.code_len();
        bytes
            .chunks(len)
            .map(|chunk| {
                let code = chunk.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
                let text = self.code_text(code);
                let width = self.code_width(code, &text);
                Glyph { code, text, width }
            })
            .collect()
    }
}
