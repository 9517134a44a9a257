use ndarray::{Array2, Zip};

use crate::filters::convolve::convolve_separable;

const SOBEL_SMOOTH: [f32; 3] = [1.0, 2.0, 1.0];
const SOBEL_DERIV: [f32; 3] = [-1.0, 0.0, 1.0];

/// Sobel derivatives of a plane: `(gx, gy)`.
///
///   gx = [-1 0 1; -2 0 2; -1 0 1], gy = its transpose.
/// Borders replicate the nearest sample.
pub fn sobel(data: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    rayon::join(
        || convolve_separable(data, &SOBEL_DERIV, &SOBEL_SMOOTH),
        || convolve_separable(data, &SOBEL_SMOOTH, &SOBEL_DERIV),
    )
}

/// Euclidean gradient magnitude `sqrt(gx^2 + gy^2)`.
pub fn gradient_magnitude(gx: &Array2<f32>, gy: &Array2<f32>) -> Array2<f32> {
    Zip::from(gx).and(gy).map_collect(|&x, &y| (x * x + y * y).sqrt())
}

/// Gradient direction `atan2(gy, gx)` in radians, range [-pi, pi].
pub fn gradient_direction(gx: &Array2<f32>, gy: &Array2<f32>) -> Array2<f32> {
    Zip::from(gx).and(gy).map_collect(|&x, &y| y.atan2(x))
}

/// Canny edge detection with hysteresis thresholds on the L1 gradient.
pub fn canny(data: &Array2<f32>, low: f32, high: f32) -> Array2<bool> {
    let (h, w) = data.dim();
    let mut edges = Array2::from_elem((h, w), false);
    if h < 3 || w < 3 {
        return edges;
    }

    let (gx, gy) = sobel(data);
    let mag = Zip::from(&gx).and(&gy).map_collect(|&x, &y| x.abs() + y.abs());

    // Non-maximum suppression along the quantized gradient direction.
    // 0 = suppressed, 1 = weak, 2 = strong.
    let mut class = Array2::<u8>::zeros((h, w));
    let tan22 = 0.414_213_57f32;
    for row in 1..h - 1 {
        for col in 1..w - 1 {
            let m = mag[[row, col]];
            if m <= low {
                continue;
            }
            let x = gx[[row, col]];
            let y = gy[[row, col]];
            let ax = x.abs();
            let ay = y.abs();
            let (n1, n2) = if ay <= ax * tan22 {
                (mag[[row, col - 1]], mag[[row, col + 1]])
            } else if ay >= ax / tan22 {
                (mag[[row - 1, col]], mag[[row + 1, col]])
            } else if (x > 0.0) == (y > 0.0) {
                (mag[[row - 1, col - 1]], mag[[row + 1, col + 1]])
            } else {
                (mag[[row - 1, col + 1]], mag[[row + 1, col - 1]])
            };
            if m > n1 && m >= n2 {
                class[[row, col]] = if m > high { 2 } else { 1 };
            }
        }
    }

    // Hysteresis: grow strong edges through connected weak pixels.
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for ((row, col), &c) in class.indexed_iter() {
        if c == 2 {
            edges[[row, col]] = true;
            stack.push((row, col));
        }
    }
    while let Some((row, col)) = stack.pop() {
        for dr in -1..=1isize {
            for dc in -1..=1isize {
                let nr = row as isize + dr;
                let nc = col as isize + dc;
                if nr < 0 || nc < 0 || nr >= h as isize || nc >= w as isize {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if class[[nr, nc]] == 1 && !edges[[nr, nc]] {
                    edges[[nr, nc]] = true;
                    stack.push((nr, nc));
                }
            }
        }
    }

    edges
}
