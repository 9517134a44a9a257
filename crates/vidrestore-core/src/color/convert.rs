//! Color space conversions on float RGB images in [0, 255].
//!
//! HSV follows the 8-bit video convention: H in [0, 180), S and V in [0, 255].
//! LAB is the 8-bit encoding: L scaled to [0, 255], a and b offset by 128.

use ndarray::{Array3, Axis, Zip};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

const XN: f32 = 0.950_456;
const ZN: f32 = 1.088_754;
const LAB_EPSILON: f32 = 0.008_856;
const LAB_KAPPA: f32 = 903.3;
const LAB_OFFSET: f32 = 128.0;

/// Apply a per-pixel transform to every RGB triple.
pub fn map_pixels<F>(src: &Array3<f32>, f: F) -> Array3<f32>
where
    F: Fn([f32; 3]) -> [f32; 3] + Sync + Send,
{
    let (h, w, _) = src.dim();
    let mut dst = Array3::<f32>::zeros(src.raw_dim());
    let zip = Zip::from(dst.lanes_mut(Axis(2))).and(src.lanes(Axis(2)));
    let kernel = |mut d: ndarray::ArrayViewMut1<f32>, s: ndarray::ArrayView1<f32>| {
        let out = f([s[0], s[1], s[2]]);
        d[0] = out[0];
        d[1] = out[1];
        d[2] = out[2];
    };
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_for_each(kernel);
    } else {
        zip.for_each(kernel);
    }
    dst
}

pub fn rgb_to_hsv(rgb: &Array3<f32>) -> Array3<f32> {
    map_pixels(rgb, rgb_to_hsv_pixel)
}

pub fn hsv_to_rgb(hsv: &Array3<f32>) -> Array3<f32> {
    map_pixels(hsv, hsv_to_rgb_pixel)
}

pub fn rgb_to_lab(rgb: &Array3<f32>) -> Array3<f32> {
    map_pixels(rgb, rgb_to_lab_pixel)
}

pub fn lab_to_rgb(lab: &Array3<f32>) -> Array3<f32> {
    map_pixels(lab, lab_to_rgb_pixel)
}

pub fn rgb_to_hsv_pixel([r, g, b]: [f32; 3]) -> [f32; 3] {
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;
    let s = if v > 0.0 { diff / v * 255.0 } else { 0.0 };

    let mut h = if diff <= 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }
    [h / 2.0, s, v]
}

pub fn hsv_to_rgb_pixel([h, s, v]: [f32; 3]) -> [f32; 3] {
    let s = (s / 255.0).clamp(0.0, 1.0);
    let v = v.clamp(0.0, 255.0);
    if s <= 0.0 {
        return [v, v, v];
    }
    let hue = (h * 2.0).rem_euclid(360.0) / 60.0;
    let sector = hue.floor();
    let frac = hue - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * frac);
    let t = v * (1.0 - s * (1.0 - frac));
    match sector as u32 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    let c = (c / 255.0).clamp(0.0, 1.0);
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    let s = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    s * 255.0
}

fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(f: f32) -> f32 {
    let t = f * f * f;
    if t > LAB_EPSILON {
        t
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

pub fn rgb_to_lab_pixel([r, g, b]: [f32; 3]) -> [f32; 3] {
    let (r, g, b) = (srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b));
    let x = (0.412_453 * r + 0.357_580 * g + 0.180_423 * b) / XN;
    let y = 0.212_671 * r + 0.715_160 * g + 0.072_169 * b;
    let z = (0.019_334 * r + 0.119_193 * g + 0.950_227 * b) / ZN;

    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
    let l = if y > LAB_EPSILON {
        116.0 * fy - 16.0
    } else {
        LAB_KAPPA * y
    };
    [
        l * 255.0 / 100.0,
        500.0 * (fx - fy) + LAB_OFFSET,
        200.0 * (fy - fz) + LAB_OFFSET,
    ]
}

pub fn lab_to_rgb_pixel([l, a, b]: [f32; 3]) -> [f32; 3] {
    let l = (l * 100.0 / 255.0).clamp(0.0, 100.0);
    let a = a - LAB_OFFSET;
    let b = b - LAB_OFFSET;

    let y = if l > LAB_KAPPA * LAB_EPSILON {
        ((l + 16.0) / 116.0).powi(3)
    } else {
        l / LAB_KAPPA
    };
    let fy = lab_f(y);
    let x = lab_f_inv(a / 500.0 + fy) * XN;
    let z = lab_f_inv(fy - b / 200.0) * ZN;

    let r = 3.240_479 * x - 1.537_150 * y - 0.498_535 * z;
    let g = -0.969_256 * x + 1.875_991 * y + 0.041_556 * z;
    let bl = 0.055_648 * x - 0.204_043 * y + 1.057_311 * z;
    [linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(bl)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_pure_red() {
        let hsv = rgb_to_hsv_pixel([255.0, 0.0, 0.0]);
        assert!(hsv[0].abs() < 1e-4);
        assert!((hsv[1] - 255.0).abs() < 1e-4);
        assert!((hsv[2] - 255.0).abs() < 1e-4);
    }

    #[test]
    fn lab_roundtrip_gray() {
        let lab = rgb_to_lab_pixel([128.0, 128.0, 128.0]);
        assert!((lab[1] - 128.0).abs() < 0.5, "a = {}", lab[1]);
        assert!((lab[2] - 128.0).abs() < 0.5, "b = {}", lab[2]);
        let rgb = lab_to_rgb_pixel(lab);
        for c in rgb {
            assert!((c - 128.0).abs() < 0.5, "channel = {c}");
        }
    }
}
