use ndarray::{Array2, Array3};

use crate::color::process::process_channels;
use crate::filters::convolve::convolve_separable;

/// Gaussian blur with the radius derived from sigma (3 sigma).
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let radius = (sigma * 3.0).ceil().max(1.0) as usize;
    let kernel = make_gaussian_kernel(radius, sigma);
    convolve_separable(data, &kernel, &kernel)
}

/// Gaussian blur with an explicit odd window size (e.g. 5 for a 5x5 window).
pub fn gaussian_blur_sized(data: &Array2<f32>, size: usize, sigma: f32) -> Array2<f32> {
    let kernel = make_gaussian_kernel(size / 2, sigma);
    convolve_separable(data, &kernel, &kernel)
}

/// Blur each channel of an RGB image.
pub fn gaussian_blur_rgb(data: &Array3<f32>, sigma: f32) -> Array3<f32> {
    process_channels(data, |_, plane| gaussian_blur_array(plane, sigma))
}

/// Blur each channel of an RGB image with an explicit window size.
pub fn gaussian_blur_rgb_sized(data: &Array3<f32>, size: usize, sigma: f32) -> Array3<f32> {
    process_channels(data, |_, plane| gaussian_blur_sized(plane, size, sigma))
}

/// Normalized 1D Gaussian kernel of length `2 * radius + 1`.
///
/// A non-positive sigma is derived from the window size.
pub fn make_gaussian_kernel(radius: usize, sigma: f32) -> Vec<f32> {
    let size = 2 * radius + 1;
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}
