//! Color grading: basic adjustments, advanced corrections and filter presets.

pub mod advanced;
pub mod basic;
pub mod presets;
pub mod profile;

pub use advanced::apply_advanced;
pub use basic::apply_basic;
pub use presets::{apply_filters, apply_preset, FilterPreset};
pub use profile::GradingProfile;
