//! Ruling-line cleanup: snapping, joining and filtering.
//!
//! Raw edges come straight from stroked paths and rectangles; BOM exports
//! often draw each cell border separately, so collinear pieces have to be
//! aligned and joined before intersections make sense.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use super::clustering::cluster_objects;
use crate::reader::types::{BBox, EdgeObj, Orientation};

fn shift(edge: &EdgeObj, dx: f64, dy: f64) -> EdgeObj {
    EdgeObj {
        x0: edge.x0 + dx,
        x1: edge.x1 + dx,
        top: edge.top + dy,
        bottom: edge.bottom + dy,
        orientation: edge.orientation,
    }
}

/// Snap edges of the same orientation onto their cluster average.
pub fn snap_edges(edges: Vec<EdgeObj>, tolerance: f64) -> Vec<EdgeObj> {
    let (v_edges, h_edges): (Vec<EdgeObj>, Vec<EdgeObj>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Vertical);

    let mut out = Vec::with_capacity(v_edges.len() + h_edges.len());
    for cluster in cluster_objects(&v_edges, |e| e.x0, tolerance) {
        let avg = cluster.iter().map(|e| e.x0).sum::<f64>() / cluster.len() as f64;
        out.extend(cluster.iter().map(|e| shift(e, avg - e.x0, 0.0)));
    }
    for cluster in cluster_objects(&h_edges, |e| e.top, tolerance) {
        let avg = cluster.iter().map(|e| e.top).sum::<f64>() / cluster.len() as f64;
        out.extend(cluster.iter().map(|e| shift(e, 0.0, avg - e.top)));
    }
    out
}

/// Join collinear edges whose ends are within `tolerance`.
pub fn join_edge_group(
    mut edges: Vec<EdgeObj>,
    orientation: Orientation,
    tolerance: f64,
) -> Vec<EdgeObj> {
    let span = |e: &EdgeObj| match orientation {
        Orientation::Horizontal => (e.x0, e.x1),
        Orientation::Vertical => (e.top, e.bottom),
    };
    edges.sort_by(|a, b| span(a).0.partial_cmp(&span(b).0).unwrap_or(Ordering::Equal));

    let mut joined: Vec<EdgeObj> = Vec::new();
    for e in edges {
        let (e_min, e_max) = span(&e);
        let touches = joined
            .last()
            .is_some_and(|last| e_min <= span(last).1 + tolerance);
        if !touches {
            joined.push(e);
            continue;
        }
        if let Some(last) = joined.last_mut()
            && e_max > span(last).1
        {
            match orientation {
                Orientation::Horizontal => last.x1 = e.x1,
                Orientation::Vertical => last.bottom = e.bottom,
            }
        }
    }
    joined
}

/// Snap, then join collinear runs.
pub fn merge_edges(edges: Vec<EdgeObj>, snap_tolerance: f64, join_tolerance: f64) -> Vec<EdgeObj> {
    let edges = if snap_tolerance > 0.0 {
        snap_edges(edges, snap_tolerance)
    } else {
        edges
    };

    let mut grouped: BTreeMap<(Orientation, OrderedFloat<f64>), Vec<EdgeObj>> = BTreeMap::new();
    for e in edges {
        let pos = match e.orientation {
            Orientation::Horizontal => e.top,
            Orientation::Vertical => e.x0,
        };
        grouped.entry((e.orientation, OrderedFloat(pos))).or_default().push(e);
    }

    grouped
        .into_iter()
        .flat_map(|((orientation, _), group)| join_edge_group(group, orientation, join_tolerance))
        .collect()
}

/// Drop edges shorter than `min_length`.
pub fn filter_edges(edges: Vec<EdgeObj>, min_length: f64) -> Vec<EdgeObj> {
    edges.into_iter().filter(|e| e.length() >= min_length).collect()
}

/// Convert a rectangle to its four sides.
///
/// Very thin rectangles are how many generators draw rules, so a rectangle
/// whose height (or width) is below `thin` collapses into one edge.
pub fn rect_to_edges(rect: BBox, thin: f64) -> Vec<EdgeObj> {
    if rect.height() < thin {
        let y = (rect.top + rect.bottom) / 2.0;
        return vec![EdgeObj {
            x0: rect.x0,
            x1: rect.x1,
            top: y,
            bottom: y,
            orientation: Orientation::Horizontal,
        }];
    }
    if rect.width() < thin {
        let x = (rect.x0 + rect.x1) / 2.0;
        return vec![EdgeObj {
            x0: x,
            x1: x,
            top: rect.top,
            bottom: rect.bottom,
            orientation: Orientation::Vertical,
        }];
    }
    let h = |y: f64| EdgeObj {
        x0: rect.x0,
        x1: rect.x1,
        top: y,
        bottom: y,
        orientation: Orientation::Horizontal,
    };
    let v = |x: f64| EdgeObj {
        x0: x,
        x1: x,
        top: rect.top,
        bottom: rect.bottom,
        orientation: Orientation::Vertical,
    };
    vec![h(rect.top), h(rect.bottom), v(rect.x0), v(rect.x1)]
}

/// Convert a straight segment to an edge; diagonal segments yield nothing.
pub fn segment_to_edge(p0: (f64, f64), p1: (f64, f64)) -> Option<EdgeObj> {
    const AXIS_EPS: f64 = 0.5;
    let (x0, x1) = (p0.0.min(p1.0), p0.0.max(p1.0));
    let (top, bottom) = (p0.1.min(p1.1), p0.1.max(p1.1));
    if (p0.1 - p1.1).abs() < AXIS_EPS {
        Some(EdgeObj {
            x0,
            x1,
            top,
            bottom: top,
            orientation: Orientation::Horizontal,
        })
    } else if (p0.0 - p1.0).abs() < AXIS_EPS {
        Some(EdgeObj {
            x0,
            x1: x0,
            top,
            bottom,
            orientation: Orientation::Vertical,
        })
    } else {
        None
    }
}
