//! ToUnicode CMap parsing.
//!
//! Only the parts needed to turn show-string bytes back into text:
//! `begincodespacerange` (code width), `beginbfchar` and `beginbfrange`.

use rustc_hash::FxHashMap;

/// Code → text mapping from a font's `/ToUnicode` stream.
#[derive(Clone, Debug, Default)]
pub struct ToUnicodeMap {
    map: FxHashMap<u32, String>,
    /// Bytes per character code, from the codespace range.
    code_len: usize,
}

impl ToUnicodeMap {
    pub fn code_len(&self) -> usize {
        self.code_len.max(1)
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Hex(&'a str),
    Word(&'a str),
    ArrayStart,
    ArrayEnd,
}

fn tokenize(content: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => {
                let start = i + 1;
                let end = content[start..].find('>').map_or(bytes.len(), |p| start + p);
                tokens.push(Token::Hex(&content[start..end]));
                i = end + 1;
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
                    i += 1;
                }
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                let start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'<' | b'[' | b']' | b'%')
                {
                    i += 1;
                }
                tokens.push(Token::Word(&content[start..i]));
            }
        }
    }
    tokens
}

fn hex_digits(hex: &str) -> String {
    hex.chars().filter(|c| c.is_ascii_hexdigit()).collect()
}

fn hex_value(hex: &str) -> Option<u32> {
    let digits = hex_digits(hex);
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok()
}

/// Decode a destination string: UTF-16BE code units.
fn hex_text(hex: &str) -> Option<String> {
    let digits = hex_digits(hex);
    if digits.is_empty() {
        return None;
    }
    let units: Vec<u16> = digits
        .as_bytes()
        .chunks(4)
        .filter_map(|c| std::str::from_utf8(c).ok())
        .filter_map(|s| u16::from_str_radix(s, 16).ok())
        .collect();
    Some(String::from_utf16_lossy(&units))
}

/// Parse a ToUnicode CMap stream.
pub fn parse_tounicode(data: &[u8]) -> ToUnicodeMap {
    let content = String::from_utf8_lossy(data);
    let tokens = tokenize(&content);
    let mut out = ToUnicodeMap::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            Token::Word("begincodespacerange") => {
                if let Some(Token::Hex(lo)) = tokens.get(i + 1) {
                    out.code_len = out.code_len.max(hex_digits(lo).len().div_ceil(2));
                }
            }
            Token::Word("beginbfchar") => {
                i += 1;
                while let (Some(Token::Hex(src)), Some(Token::Hex(dst))) =
                    (tokens.get(i), tokens.get(i + 1))
                {
                    if let (Some(code), Some(text)) = (hex_value(src), hex_text(dst)) {
                        out.map.insert(code, text);
                    }
                    i += 2;
                }
                continue;
            }
            Token::Word("beginbfrange") => {
                i += 1;
                while let (Some(Token::Hex(lo)), Some(Token::Hex(hi))) =
                    (tokens.get(i), tokens.get(i + 1))
                {
                    let (Some(lo), Some(hi)) = (hex_value(lo), hex_value(hi)) else {
                        i += 2;
                        continue;
                    };
                    match tokens.get(i + 2) {
                        Some(Token::Hex(dst)) => {
                            add_range(&mut out, lo, hi, dst);
                            i += 3;
                        }
                        Some(Token::ArrayStart) => {
                            i += 3;
                            let mut code = lo;
                            while let Some(Token::Hex(dst)) = tokens.get(i) {
                                if code <= hi
                                    && let Some(text) = hex_text(dst)
                                {
                                    out.map.insert(code, text);
                                }
                                code += 1;
                                i += 1;
                            }
                            if tokens.get(i) == Some(&Token::ArrayEnd) {
                                i += 1;
                            }
                        }
                        _ => break,
                    }
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    out
}

/// A range maps consecutive codes to consecutive values of the last UTF-16
/// unit of the destination.
fn add_range(out: &mut ToUnicodeMap, lo: u32, hi: u32, dst: &str) {
    let Some(base) = hex_text(dst) else { return };
    let mut units: Vec<u16> = base.encode_utf16().collect();
    let Some(last) = units.pop() else { return };
    // Guard against absurd ranges in broken files.
    let hi = hi.min(lo.saturating_add(0xFFFF));
    for (offset, code) in (lo..=hi).enumerate() {
        let Some(unit) = u16::try_from(u32::from(last) + offset as u32).ok() else {
            break;
        };
        let mut seq = units.clone();
        seq.push(unit);
        out.map.insert(code, String::from_utf16_lossy(&seq));
    }
}
