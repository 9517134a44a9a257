pub mod analyzer;
pub mod artifacts;
pub mod laplacian;
pub mod recommend;

pub use analyzer::{analyze, QualityMetrics};
pub use recommend::{recommend, Adjustment, Recommendation, Recommendations};
