use ndarray::{Array3, Zip};

use crate::filters::gaussian_blur::gaussian_blur_rgb;

/// Apply unsharp mask sharpening to an RGB image in [0, 255].
///
/// `sigma`: Gaussian blur sigma for the blurred copy.
/// `amount`: strength (0.5 = 50% of the difference added back).
///
/// Output is `img * (1 + amount) - blur * amount`, unclamped.
pub fn unsharp_mask(data: &Array3<f32>, sigma: f32, amount: f32) -> Array3<f32> {
    let blurred = gaussian_blur_rgb(data, sigma);
    Zip::from(data)
        .and(&blurred)
        .map_collect(|&orig, &blur| orig * (1.0 + amount) - blur * amount)
}
