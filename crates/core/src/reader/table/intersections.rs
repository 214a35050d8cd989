//! Intersections between horizontal and vertical ruling lines.

use std::collections::BTreeMap;

use crate::reader::types::{EdgeObj, KeyPoint, Orientation, key_point};

/// Edges meeting at one intersection point: sorted, deduplicated indices
/// into the vertical and horizontal edges ordered by position.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct IntersectionIdx {
    pub v: Vec<usize>,
    pub h: Vec<usize>,
}

/// Find every point where a vertical edge crosses or touches a horizontal
/// edge, within `tol` in both directions.
///
/// The map is ordered by `(x, top)`, which the cell builder relies on.
pub(crate) fn edges_to_intersections(edges: &[EdgeObj], tol: f64) -> BTreeMap<KeyPoint, IntersectionIdx> {
    let mut v: Vec<EdgeObj> = edges
        .iter()
        .filter(|e| e.orientation == Orientation::Vertical)
        .cloned()
        .collect();
    let mut h: Vec<EdgeObj> = edges
        .iter()
        .filter(|e| e.orientation == Orientation::Horizontal)
        .cloned()
        .collect();
    v.sort_by(|a, b| a.x0.total_cmp(&b.x0).then(a.top.total_cmp(&b.top)));
    h.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

    let mut intersections: BTreeMap<KeyPoint, IntersectionIdx> = BTreeMap::new();
    for (hi, he) in h.iter().enumerate() {
        for (vi, ve) in v.iter().enumerate() {
            if ve.top <= he.top + tol
                && ve.bottom >= he.top - tol
                && ve.x0 >= he.x0 - tol
                && ve.x0 <= he.x1 + tol
            {
                let entry = intersections.entry(key_point(ve.x0, he.top)).or_default();
                entry.v.push(vi);
                entry.h.push(hi);
            }
        }
    }
    for idx in intersections.values_mut() {
        idx.v.sort_unstable();
        idx.v.dedup();
        idx.h.sort_unstable();
        idx.h.dedup();
    }
    intersections
}
