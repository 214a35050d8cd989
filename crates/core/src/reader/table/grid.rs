//! Cell and table construction from ruling-line intersections.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::intersections::IntersectionIdx;
use crate::reader::text::chars_to_text;
use crate::reader::types::{BBox, CharObj, KeyF64, KeyPoint, Row, TextSettings, key_f64, key_point};

fn shares_any(a: &[usize], b: &[usize]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => return true,
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    false
}

/// Build the smallest closed cell anchored at each intersection.
///
/// For every point, walk the points below it and to its right (in sorted
/// order) and take the first pair whose bottom-right corner also exists and
/// is connected by shared edges on both sides.
pub(crate) fn intersections_to_cells(intersections: &BTreeMap<KeyPoint, IntersectionIdx>) -> Vec<BBox> {
    let points: Vec<(&KeyPoint, &IntersectionIdx)> = intersections.iter().collect();

    let connects = |p1: (&KeyPoint, &IntersectionIdx), p2: (&KeyPoint, &IntersectionIdx)| {
        if p1.0.0 == p2.0.0 {
            shares_any(&p1.1.v, &p2.1.v)
        } else if p1.0.1 == p2.0.1 {
            shares_any(&p1.1.h, &p2.1.h)
        } else {
            false
        }
    };

    let mut cells = Vec::new();
    for (i, &pt) in points.iter().enumerate() {
        let rest = &points[i + 1..];
        let below = rest.iter().filter(|p| p.0.0 == pt.0.0);
        let right: Vec<_> = rest.iter().filter(|p| p.0.1 == pt.0.1).collect();

        'below: for &below_pt in below {
            if !connects(pt, below_pt) {
                continue;
            }
            for &&right_pt in &right {
                if !connects(pt, right_pt) {
                    continue;
                }
                let corner = (right_pt.0.0, below_pt.0.1);
                if let Some((corner_key, corner_idx)) = intersections.get_key_value(&corner)
                    && connects((corner_key, corner_idx), right_pt)
                    && connects((corner_key, corner_idx), below_pt)
                {
                    cells.push(BBox {
                        x0: pt.0.0.into_inner(),
                        top: pt.0.1.into_inner(),
                        x1: corner.0.into_inner(),
                        bottom: corner.1.into_inner(),
                    });
                    break 'below;
                }
            }
        }
    }
    cells
}

/// Group cells that share corners into tables, ordered top to bottom.
///
/// Single-cell groups are boxes, not tables, and are dropped.
pub(crate) fn cells_to_tables(cells: Vec<BBox>) -> Vec<Vec<BBox>> {
    fn corners(b: &BBox) -> [KeyPoint; 4] {
        [
            key_point(b.x0, b.top),
            key_point(b.x0, b.bottom),
            key_point(b.x1, b.top),
            key_point(b.x1, b.bottom),
        ]
    }

    let mut corner_map: HashMap<KeyPoint, Vec<usize>> = HashMap::new();
    for (idx, cell) in cells.iter().enumerate() {
        for corner in corners(cell) {
            corner_map.entry(corner).or_default().push(idx);
        }
    }

    let mut visited = vec![false; cells.len()];
    let mut tables: Vec<Vec<BBox>> = Vec::new();
    for start in 0..cells.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut group = Vec::new();
        while let Some(idx) = queue.pop_front() {
            group.push(cells[idx]);
            for corner in corners(&cells[idx]) {
                for &n in corner_map.get(&corner).into_iter().flatten() {
                    if !visited[n] {
                        visited[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
        tables.push(group);
    }

    let anchor = |t: &Vec<BBox>| {
        t.iter()
            .map(|c| (key_f64(c.top), key_f64(c.x0)))
            .min()
            .unwrap_or((key_f64(0.0), key_f64(0.0)))
    };
    tables.sort_by_key(anchor);
    tables.into_iter().filter(|t| t.len() > 1).collect()
}

/// A detected ruled table.
#[derive(Clone, Debug)]
pub struct GridTable {
    pub cells: Vec<BBox>,
}

impl GridTable {
    pub fn bbox(&self) -> Option<BBox> {
        super::clustering::bbox_union(self.cells.iter().copied())
    }

    /// Cells arranged in rows; each row has one slot per distinct column
    /// start, `None` where a spanning cell leaves a hole.
    pub fn rows(&self) -> Vec<Vec<Option<BBox>>> {
        let mut xs: Vec<KeyF64> = self.cells.iter().map(|c| key_f64(c.x0)).collect();
        xs.sort();
        xs.dedup();

        let mut by_top: BTreeMap<KeyF64, HashMap<KeyF64, BBox>> = BTreeMap::new();
        for cell in &self.cells {
            by_top
                .entry(key_f64(cell.top))
                .or_default()
                .insert(key_f64(cell.x0), *cell);
        }
        by_top
            .into_values()
            .map(|row| xs.iter().map(|x| row.get(x).copied()).collect())
            .collect()
    }

    /// Extract cell text. A cell receives every glyph whose center lies
    /// inside it; multi-line cells keep their line breaks.
    pub fn extract(&self, chars: &[CharObj], settings: &TextSettings) -> Vec<Row> {
        self.rows()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        cell.map(|bbox| {
                            let inside: Vec<&CharObj> =
                                chars.iter().filter(|c| char_in_bbox(c, &bbox)).collect();
                            chars_to_text(&inside, settings)
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

/// Check if a character's center is inside a bounding box.
fn char_in_bbox(c: &CharObj, bbox: &BBox) -> bool {
    let (h_mid, v_mid) = (c.h_mid(), c.v_mid());
    h_mid >= bbox.x0 && h_mid < bbox.x1 && v_mid >= bbox.top && v_mid < bbox.bottom
}
