use std::collections::HashMap;

use ndarray::Array2;

use crate::frame::BoundingBox;

/// Statistics for a single connected region of a binary mask.
#[derive(Clone, Debug)]
pub struct Component {
    pub label: u32,
    /// Number of foreground pixels.
    pub area: usize,
    pub bbox: BoundingBox,
}

impl Component {
    /// Fraction of the bounding box covered by foreground pixels.
    pub fn fill_ratio(&self) -> f32 {
        let box_area = self.bbox.width * self.bbox.height;
        if box_area == 0 {
            0.0
        } else {
            self.area as f32 / box_area as f32
        }
    }

    /// Bounding box width / height.
    pub fn aspect(&self) -> f32 {
        if self.bbox.height == 0 {
            0.0
        } else {
            self.bbox.width as f32 / self.bbox.height as f32
        }
    }
}

/// Two-pass connected component labeling with union-find, 4-connectivity.
///
/// Returns components sorted by area descending, ties broken by position so
/// the order is deterministic.
pub fn connected_components(mask: &Array2<bool>) -> Vec<Component> {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return Vec::new();
    }

    let mut labels = Array2::<u32>::zeros((h, w));
    // Index 0 is background.
    let mut parent: Vec<u32> = vec![0];

    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }
            let up = if row > 0 { labels[[row - 1, col]] } else { 0 };
            let left = if col > 0 { labels[[row, col - 1]] } else { 0 };

            labels[[row, col]] = match (up, left) {
                (0, 0) => {
                    let next = parent.len() as u32;
                    parent.push(next);
                    next
                }
                (l, 0) | (0, l) => l,
                (a, b) => {
                    union(&mut parent, a, b);
                    a.min(b)
                }
            };
        }
    }

    let mut by_root: HashMap<u32, (usize, usize, usize, usize, usize)> = HashMap::new();
    for ((row, col), &lbl) in labels.indexed_iter() {
        if lbl == 0 {
            continue;
        }
        let root = find(&parent, lbl);
        let e = by_root.entry(root).or_insert((0, row, row, col, col));
        e.0 += 1;
        e.1 = e.1.min(row);
        e.2 = e.2.max(row);
        e.3 = e.3.min(col);
        e.4 = e.4.max(col);
    }

    let mut components: Vec<Component> = by_root
        .into_iter()
        .map(|(label, (area, r0, r1, c0, c1))| Component {
            label,
            area,
            bbox: BoundingBox::new(c0, r0, c1 - c0 + 1, r1 - r0 + 1),
        })
        .collect();
    components.sort_by(|a, b| {
        b.area
            .cmp(&a.area)
            .then(a.bbox.y.cmp(&b.bbox.y))
            .then(a.bbox.x.cmp(&b.bbox.x))
    });
    components
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
