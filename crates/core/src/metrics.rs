//! Helvetica glyph widths (AFM, 1/1000 em).
//!
//! Used to center overlay text and to measure base-14 text on pages whose
//! fonts carry no `/Widths` array.

/// Widths for WinAnsi codes 32..=126.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Width used for anything outside the ASCII table.
pub const DEFAULT_GLYPH_WIDTH: f64 = 556.0;

/// Width of one character in 1/1000 em.
pub fn helvetica_width(ch: char) -> f64 {
    let code = ch as u32;
    if (32..=126).contains(&code) {
        f64::from(HELVETICA_ASCII[(code - 32) as usize])
    } else {
        DEFAULT_GLYPH_WIDTH
    }
}

/// Width of `text` set in Helvetica at `size` points.
pub fn text_width(text: &str, size: f64) -> f64 {
    text.chars().map(helvetica_width).sum::<f64>() * size / 1000.0
}
