//! Safe conversions over `lopdf` objects.
//!
//! Broken references resolve to `Null` and non-numbers to `None`, so the
//! interpreter can skip bad operands instead of failing the page.

use lopdf::{Dictionary, Document, Object};

static NULL: Object = Object::Null;

/// Follow a reference chain (bounded) to the target object.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    for _ in 0..8 {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(next) => current = next,
                Err(_) => return &NULL,
            },
            _ => return current,
        }
    }
    &NULL
}

/// Resolve to a dictionary; streams yield their dictionary.
pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj) {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

/// Numeric value of an integer or real object.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(n) => Some(*n as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Four numbers as `[x0, y0, x1, y1]`, normalized so x0 <= x1 and y0 <= y1.
pub(crate) fn rect(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let arr = resolve(doc, obj).as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let mut vals = [0.0; 4];
    for (slot, item) in vals.iter_mut().zip(arr) {
        *slot = number(resolve(doc, item))?;
    }
    Some([
        vals[0].min(vals[2]),
        vals[1].min(vals[3]),
        vals[0].max(vals[2]),
        vals[1].max(vals[3]),
    ])
}

/// Look up `key` on a page dictionary, walking `/Parent` for inheritable
/// attributes.
pub(crate) fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;
    for _ in 0..32 {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        current = current
            .get(b"Parent")
            .ok()
            .and_then(|p| resolve_dict(doc, p))?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn resolves_references_and_inheritance() {
        let mut doc = Document::with_version("1.5");
        let box_id = doc.add_object(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(612.0),
            Object::Integer(792),
        ]);
        let parent_id = doc.add_object(dictionary! { "MediaBox" => Object::Reference(box_id) });
        let page = dictionary! { "Parent" => Object::Reference(parent_id) };

        let media = inherited(&doc, &page, b"MediaBox").and_then(|o| rect(&doc, o));
        assert_eq!(media, Some([0.0, 0.0, 612.0, 792.0]));
        assert!(inherited(&doc, &page, b"Rotate").is_none());
        assert_eq!(number(&Object::Real(1.5)), Some(1.5));
        assert_eq!(number(&Object::Null), None);
    }
}
