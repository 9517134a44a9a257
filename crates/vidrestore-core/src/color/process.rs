use ndarray::{Array2, Array3, Axis};

/// Split an RGB float image (shape: height x width x 3) into separate R, G, B planes.
pub fn split_channels(data: &Array3<f32>) -> [Array2<f32>; 3] {
    [
        data.index_axis(Axis(2), 0).to_owned(),
        data.index_axis(Axis(2), 1).to_owned(),
        data.index_axis(Axis(2), 2).to_owned(),
    ]
}

/// Merge separate R, G, B planes into an interleaved RGB image.
pub fn merge_channels(channels: &[Array2<f32>; 3]) -> Array3<f32> {
    let (h, w) = channels[0].dim();
    let mut data = Array3::<f32>::zeros((h, w, 3));
    for (c, plane) in channels.iter().enumerate() {
        data.index_axis_mut(Axis(2), c).assign(plane);
    }
    data
}

/// Apply a processing function to each channel independently, in parallel.
pub fn process_channels<F>(data: &Array3<f32>, process_fn: F) -> Array3<f32>
where
    F: Fn(usize, &Array2<f32>) -> Array2<f32> + Sync,
{
    let [red, green, blue] = split_channels(data);
    let (r, (g, b)) = rayon::join(
        || process_fn(0, &red),
        || rayon::join(|| process_fn(1, &green), || process_fn(2, &blue)),
    );
    merge_channels(&[r, g, b])
}
