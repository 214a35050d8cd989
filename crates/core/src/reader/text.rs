//! Word and line formation from positioned glyphs.
//!
//! Glyphs are clustered into visual lines by their `top`, ordered left to
//! right, and split into words on whitespace glyphs or horizontal gaps
//! wider than `x_tolerance`.

use itertools::Itertools;

use super::table::clustering::{bbox_union, cluster_objects};
use super::types::{BBox, CharObj, TextSettings, Word};

/// Check if a character begins a new word.
fn char_begins_new_word(prev: &CharObj, curr: &CharObj, settings: &TextSettings) -> bool {
    curr.x0 < prev.x0
        || curr.x0 > prev.x1 + settings.x_tolerance
        || (curr.top - prev.top).abs() > settings.y_tolerance
}

/// Group glyphs into visual lines, each sorted left to right.
pub(crate) fn chars_to_lines<'a>(chars: &[&'a CharObj], settings: &TextSettings) -> Vec<Vec<&'a CharObj>> {
    let mut lines = cluster_objects(chars, |c| c.top, settings.y_tolerance);
    for line in &mut lines {
        line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
    lines
}

fn split_line_into_words<'a>(line: &[&'a CharObj], settings: &TextSettings) -> Vec<Vec<&'a CharObj>> {
    let mut words: Vec<Vec<&CharObj>> = Vec::new();
    let mut current: Vec<&CharObj> = Vec::new();
    for &ch in line {
        if ch.text.chars().all(char::is_whitespace) {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.last()
            && char_begins_new_word(prev, ch, settings)
        {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn merge_chars(chars: &[&CharObj]) -> Option<Word> {
    let bbox = bbox_union(chars.iter().map(|c| BBox {
        x0: c.x0,
        top: c.top,
        x1: c.x1,
        bottom: c.bottom,
    }))?;
    Some(Word {
        text: chars.iter().map(|c| c.text.as_str()).collect(),
        x0: bbox.x0,
        x1: bbox.x1,
        top: bbox.top,
        bottom: bbox.bottom,
    })
}

/// Extract words in reading order (top to bottom, then left to right).
pub fn extract_words(chars: &[CharObj], settings: &TextSettings) -> Vec<Word> {
    let refs: Vec<&CharObj> = chars.iter().collect();
    chars_to_lines(&refs, settings)
        .iter()
        .flat_map(|line| split_line_into_words(line, settings))
        .filter_map(|w| merge_chars(&w))
        .collect()
}

/// Render glyphs as text: words joined by single spaces, lines by `\n`.
pub(crate) fn chars_to_text(chars: &[&CharObj], settings: &TextSettings) -> String {
    chars_to_lines(chars, settings)
        .iter()
        .map(|line| {
            split_line_into_words(line, settings)
                .iter()
                .map(|w| w.iter().map(|c| c.text.as_str()).collect::<String>())
                .join(" ")
        })
        .filter(|l| !l.is_empty())
        .join("\n")
}

/// Group words into lines by `top`; each line sorted left to right.
pub fn words_to_lines(words: &[Word], y_tolerance: f64) -> Vec<Vec<Word>> {
    let mut lines = cluster_objects(words, |w| w.top, y_tolerance);
    for line in &mut lines {
        line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(text: &str, x0: f64, top: f64) -> CharObj {
        CharObj {
            text: text.to_string(),
            x0,
            x1: x0 + 5.0,
            top,
            bottom: top + 10.0,
            size: 10.0,
        }
    }

    #[test]
    fn adjacent_chars_form_one_word() {
        let chars = vec![ch("H", 0.0, 0.0), ch("i", 6.0, 0.0)];
        let words = extract_words(&chars, &TextSettings::default());
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Hi");
        assert_eq!((words[0].x0, words[0].x1), (0.0, 11.0));
    }

    #[test]
    fn gap_and_space_split_words() {
        let chars = vec![
            ch("A", 0.0, 0.0),
            ch(" ", 5.0, 0.0),
            ch("B", 10.0, 0.0),
            ch("C", 30.0, 0.0),
        ];
        let words = extract_words(&chars, &TextSettings::default());
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
    }

    #[test]
    fn text_keeps_line_breaks() {
        let chars = vec![
            ch("N", 0.0, 20.0),
            ch("O", 5.0, 20.0),
            ch("U", 0.0, 0.0),
            ch("P", 5.0, 0.0),
        ];
        let refs: Vec<&CharObj> = chars.iter().collect();
        assert_eq!(chars_to_text(&refs, &TextSettings::default()), "UP\nNO");
        assert_eq!(chars_to_text(&[], &TextSettings::default()), "");
    }
}
