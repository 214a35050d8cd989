//! Tolerance-based clustering of page objects.
//!
//! Used to snap ruling lines together and to group glyphs and words into
//! visual lines.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::reader::types::{BBox, KeyF64, key_f64};

/// Cluster a list of f64 values: sorted values closer than `tolerance`
/// to their predecessor share a group.
pub fn cluster_list(mut xs: Vec<f64>, tolerance: f64) -> Vec<Vec<f64>> {
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    if tolerance == 0.0 || xs.len() < 2 {
        return xs.into_iter().map(|x| vec![x]).collect();
    }
    let mut groups: Vec<Vec<f64>> = Vec::new();
    let mut current: Vec<f64> = vec![xs[0]];
    let mut last = xs[0];
    for x in xs.into_iter().skip(1) {
        if x <= last + tolerance {
            current.push(x);
        } else {
            groups.push(current);
            current = vec![x];
        }
        last = x;
    }
    groups.push(current);
    groups
}

fn make_cluster_dict(values: Vec<f64>, tolerance: f64) -> FxHashMap<KeyF64, usize> {
    let mut unique = values;
    unique.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    unique.dedup();
    let mut dict = FxHashMap::default();
    for (i, cluster) in cluster_list(unique, tolerance).into_iter().enumerate() {
        for val in cluster {
            dict.insert(key_f64(val), i);
        }
    }
    dict
}

/// Cluster objects by a scalar key; clusters come back in key order and
/// members keep their input order.
pub fn cluster_objects<T: Clone, F: Fn(&T) -> f64>(
    xs: &[T],
    key_fn: F,
    tolerance: f64,
) -> Vec<Vec<T>> {
    let values: Vec<f64> = xs.iter().map(&key_fn).collect();
    let dict = make_cluster_dict(values, tolerance);

    let mut tuples: Vec<(usize, &T)> = xs
        .iter()
        .map(|x| (dict.get(&key_f64(key_fn(x))).copied().unwrap_or(0), x))
        .collect();
    // Stable sort keeps input order inside a cluster.
    tuples.sort_by_key(|t| t.0);

    let mut groups: Vec<Vec<T>> = Vec::new();
    let mut last_idx: Option<usize> = None;
    for (idx, item) in tuples {
        if last_idx == Some(idx)
            && let Some(group) = groups.last_mut()
        {
            group.push(item.clone());
        } else {
            groups.push(vec![item.clone()]);
        }
        last_idx = Some(idx);
    }
    groups
}

/// Bounding box of anything that exposes one.
pub fn bbox_union(boxes: impl IntoIterator<Item = BBox>) -> Option<BBox> {
    boxes.into_iter().fold(None, |acc, b| {
        Some(match acc {
            None => b,
            Some(a) => BBox {
                x0: a.x0.min(b.x0),
                top: a.top.min(b.top),
                x1: a.x1.max(b.x1),
                bottom: a.bottom.max(b.bottom),
            },
        })
    })
}

/// Compute the overlap between two bounding boxes.
pub fn bbox_overlap(a: BBox, b: BBox) -> Option<BBox> {
    let o_left = a.x0.max(b.x0);
    let o_right = a.x1.min(b.x1);
    let o_top = a.top.max(b.top);
    let o_bottom = a.bottom.min(b.bottom);
    let o_width = o_right - o_left;
    let o_height = o_bottom - o_top;
    if o_height >= 0.0 && o_width >= 0.0 && (o_height + o_width) > 0.0 {
        Some(BBox {
            x0: o_left,
            top: o_top,
            x1: o_right,
            bottom: o_bottom,
        })
    } else {
        None
    }
}
