use ndarray::{Array2, Array3, Zip};

use crate::color::process::process_channels;
use crate::filters::box_filter::box_mean;

/// Guided filter of a single plane `input` steered by `guide`.
///
/// Both planes are expected in [0, 1]; `eps` regularizes flat regions.
pub fn guided_filter(guide: &Array2<f32>, input: &Array2<f32>, radius: usize, eps: f32) -> Array2<f32> {
    let mean_i = box_mean(guide, radius);
    let mean_p = box_mean(input, radius);
    let corr_ip = box_mean(&(guide * input), radius);
    let corr_ii = box_mean(&(guide * guide), radius);

    let a = Zip::from(&mean_i)
        .and(&mean_p)
        .and(&corr_ip)
        .and(&corr_ii)
        .map_collect(|&mi, &mp, &cip, &cii| {
            let var = cii - mi * mi;
            (cip - mi * mp) / (var + eps)
        });
    let b = Zip::from(&mean_p)
        .and(&a)
        .and(&mean_i)
        .map_collect(|&mp, &av, &mi| mp - av * mi);

    let mean_a = box_mean(&a, radius);
    let mean_b = box_mean(&b, radius);
    Zip::from(&mean_a)
        .and(guide)
        .and(&mean_b)
        .map_collect(|&ma, &g, &mb| ma * g + mb)
}

/// Guided-filter each channel of an RGB image in [0, 255] with a luma guide in [0, 255].
pub fn guided_filter_rgb(guide: &Array2<f32>, data: &Array3<f32>, radius: usize, eps: f32) -> Array3<f32> {
    let guide = guide.mapv(|v| v / 255.0);
    process_channels(data, |_, plane| {
        let p = plane.mapv(|v| v / 255.0);
        guided_filter(&guide, &p, radius, eps).mapv(|v| v * 255.0)
    })
}
