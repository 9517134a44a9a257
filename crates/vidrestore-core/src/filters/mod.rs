pub mod bilateral;
pub mod box_filter;
pub mod convolve;
pub mod edges;
pub mod gaussian_blur;
pub mod guided;
pub mod levels;
pub mod nl_means;
pub mod noise;
pub mod unsharp_mask;
