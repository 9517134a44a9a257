use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::debug;
use vidrestore_core::pipeline::config::{FilterConfig, Intensity, TaskConfig};

#[derive(Clone, Copy, ValueEnum)]
pub enum IntensityArg {
    Light,
    Medium,
    Heavy,
}

impl From<IntensityArg> for Intensity {
    fn from(arg: IntensityArg) -> Self {
        match arg {
            IntensityArg::Light => Intensity::Light,
            IntensityArg::Medium => Intensity::Medium,
            IntensityArg::Heavy => Intensity::Heavy,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    Sharpen,
    Grain,
    Landscape,
    Vintage,
    Cinematic,
    Anime,
}

/// Stage selection shared by `run` and `frame`.
#[derive(Args)]
pub struct StageArgs {
    /// Task config file (TOML); replaces all stage flags below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Preset strength for restoration and grading
    #[arg(long, value_enum, default_value = "medium")]
    pub intensity: IntensityArg,

    /// Skip the eight-step restoration pipeline
    #[arg(long)]
    pub no_restore: bool,

    /// Add film grain as the last restoration step
    #[arg(long)]
    pub grain: bool,

    /// Enable basic grading (brightness, contrast, saturation, temperature, highlight)
    #[arg(long)]
    pub basic: bool,

    /// Enable advanced grading (white balance, levels, shadows, highlights, denoise)
    #[arg(long)]
    pub advanced: bool,

    /// Also remove haze in advanced grading
    #[arg(long, requires = "advanced")]
    pub dehaze: bool,

    /// Apply grading adjustments even when the source already looks fine
    #[arg(long)]
    pub no_smart: bool,

    /// Stylistic filter presets, comma-separated
    #[arg(long, value_enum, value_delimiter = ',')]
    pub filter: Vec<FilterArg>,

    /// Seed for dither and grain noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of CPU cores used by the worker pool
    #[arg(long, default_value = "0.7")]
    pub resource_ratio: f32,
}

impl StageArgs {
    /// Build the task config from a file, or from the flags.
    pub fn task_config(&self, input: &Path, output: &Path) -> Result<TaskConfig> {
        if let Some(ref path) = self.config {
            let mut config = load_config(path)?;
            config.input = input.to_path_buf();
            config.output = output.to_path_buf();
            return Ok(config);
        }

        let intensity = Intensity::from(self.intensity);
        let mut config = TaskConfig::new(input, output);
        config.seed = self.seed;
        config.resource_ratio = self.resource_ratio;

        let stages = &mut config.stages;
        stages.smart_mode = !self.no_smart;

        stages.restoration.enabled = !self.no_restore;
        stages.restoration.intensity = intensity;
        stages.restoration.grain = self.grain;

        stages.basic.enabled = self.basic;
        stages.basic.intensity = intensity;

        stages.advanced.enabled = self.advanced;
        stages.advanced.intensity = intensity;
        stages.advanced.dehaze = self.dehaze;

        let has = |f: FilterArg| self.filter.contains(&f);
        stages.filters = FilterConfig {
            intensity,
            sharpen: has(FilterArg::Sharpen),
            grain: has(FilterArg::Grain),
            landscape: has(FilterArg::Landscape),
            vintage: has(FilterArg::Vintage),
            cinematic: has(FilterArg::Cinematic),
            anime: has(FilterArg::Anime),
        };
        Ok(config)
    }
}

pub fn load_config(path: &Path) -> Result<TaskConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: TaskConfig = toml::from_str(&contents).context("Invalid task config")?;
    debug!(path = %path.display(), "Loaded task config");
    Ok(config)
}
