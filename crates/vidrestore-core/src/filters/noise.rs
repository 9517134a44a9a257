use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// RNG for one stochastic step of one frame.
///
/// With a task seed the stream is `seed + frame_index` mixed with a per-step
/// salt, so reruns reproduce exactly. Without one, it is seeded from the
/// thread RNG.
pub fn frame_rng(seed: Option<u64>, frame_index: usize, salt: u64) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(
            s.wrapping_add(frame_index as u64) ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15),
        ),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Standard normal sample (Box-Muller).
pub fn standard_normal<R: Rng>(rng: &mut R) -> f32 {
    let u1: f32 = rng.random::<f32>().max(f32::MIN_POSITIVE);
    let u2: f32 = rng.random::<f32>();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}

/// Plane of zero-mean Gaussian noise with the given sigma.
pub fn gaussian_noise<R: Rng>(rng: &mut R, height: usize, width: usize, sigma: f32) -> Array2<f32> {
    Array2::from_shape_simple_fn((height, width), || standard_normal(&mut *rng) * sigma)
}
