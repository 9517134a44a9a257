use ndarray::{Array2, Zip};

/// Morphological opening (erosion followed by dilation) with a square kernel
/// of side `2 * radius + 1`.
///
/// Removes small isolated foreground specks while preserving larger regions.
pub fn opening(mask: &Array2<bool>, radius: usize) -> Array2<bool> {
    dilate(&erode(mask, radius), radius)
}

/// Binary dilation: a pixel becomes true if any pixel in its square
/// neighborhood is true. Separable, so rows then columns.
pub fn dilate(mask: &Array2<bool>, radius: usize) -> Array2<bool> {
    let rows = sweep(mask, radius, true, |acc, v| acc || v);
    sweep(&rows, radius, false, |acc, v| acc || v)
}

/// Binary erosion: a pixel stays true only if its whole square neighborhood
/// is true. Out-of-bounds neighbors are ignored.
pub fn erode(mask: &Array2<bool>, radius: usize) -> Array2<bool> {
    let rows = sweep_init(mask, radius, true, true, |acc, v| acc && v);
    sweep_init(&rows, radius, false, true, |acc, v| acc && v)
}

/// Grayscale erosion (minimum filter) over a square window.
pub fn min_filter(data: &Array2<f32>, radius: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut rows = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let lo = col.saturating_sub(radius);
            let hi = (col + radius).min(w - 1);
            rows[[row, col]] = (lo..=hi)
                .map(|c| data[[row, c]])
                .fold(f32::INFINITY, f32::min);
        }
    }
    let mut out = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        let lo = row.saturating_sub(radius);
        let hi = (row + radius).min(h - 1);
        for col in 0..w {
            out[[row, col]] = (lo..=hi)
                .map(|r| rows[[r, col]])
                .fold(f32::INFINITY, f32::min);
        }
    }
    out
}

/// Convert a boolean mask to a float mask (1.0 / 0.0).
pub fn to_float(mask: &Array2<bool>) -> Array2<f32> {
    mask.mapv(|v| if v { 1.0 } else { 0.0 })
}

/// Logical AND of two masks.
pub fn and(a: &Array2<bool>, b: &Array2<bool>) -> Array2<bool> {
    Zip::from(a).and(b).map_collect(|&x, &y| x && y)
}

fn sweep(mask: &Array2<bool>, radius: usize, horizontal: bool, op: fn(bool, bool) -> bool) -> Array2<bool> {
    sweep_init(mask, radius, horizontal, false, op)
}

fn sweep_init(
    mask: &Array2<bool>,
    radius: usize,
    horizontal: bool,
    init: bool,
    op: fn(bool, bool) -> bool,
) -> Array2<bool> {
    let (h, w) = mask.dim();
    let mut out = Array2::from_elem((h, w), init);
    for row in 0..h {
        for col in 0..w {
            let (lo, hi) = if horizontal {
                (col.saturating_sub(radius), (col + radius).min(w - 1))
            } else {
                (row.saturating_sub(radius), (row + radius).min(h - 1))
            };
            let mut acc = init;
            for i in lo..=hi {
                let v = if horizontal { mask[[row, i]] } else { mask[[i, col]] };
                acc = op(acc, v);
            }
            out[[row, col]] = acc;
        }
    }
    out
}
