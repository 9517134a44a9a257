use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_RESOURCE_RATIO;
use crate::io::encoder::EncoderSettings;

/// Everything needed to run one restoration task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub stages: StageConfig,
    /// Fraction of logical cores given to the per-task worker pool.
    #[serde(default = "default_resource_ratio")]
    pub resource_ratio: f32,
    /// Seed for dither and grain. Unseeded runs are not reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub encoder: EncoderSettings,
}

fn default_resource_ratio() -> f32 {
    DEFAULT_RESOURCE_RATIO
}

impl TaskConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            stages: StageConfig::default(),
            resource_ratio: DEFAULT_RESOURCE_RATIO,
            seed: None,
            encoder: EncoderSettings::default(),
        }
    }
}

/// Named preset strength shared by restoration and grading lookups.
///
/// Config files go through [`Intensity::from_name`], so an unknown name
/// loads as `Medium` instead of failing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Intensity {
    Light,
    #[default]
    Medium,
    Heavy,
}

impl Intensity {
    /// Parse a preset name, falling back to `Medium` for anything unknown.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl From<String> for Intensity {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "heavy" => Ok(Self::Heavy),
            other => Err(format!("unknown intensity '{other}'")),
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Medium => write!(f, "medium"),
            Self::Heavy => write!(f, "heavy"),
        }
    }
}

/// Which adjustments run for a task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub restoration: RestorationConfig,
    #[serde(default)]
    pub basic: BasicConfig,
    #[serde(default)]
    pub advanced: AdvancedConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    /// Consult quality recommendations before grading.
    #[serde(default = "default_true")]
    pub smart_mode: bool,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            restoration: RestorationConfig::default(),
            basic: BasicConfig::default(),
            advanced: AdvancedConfig::default(),
            filters: FilterConfig::default(),
            smart_mode: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RestorationConfig {
    pub enabled: bool,
    pub intensity: Intensity,
    pub deblock: bool,
    pub pre_sharpen: bool,
    pub anti_alias: bool,
    pub denoise: bool,
    pub face_repair: bool,
    pub hair_protect: bool,
    pub final_sharpen: bool,
    pub grain: bool,
}

impl Default for RestorationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: Intensity::Medium,
            deblock: true,
            pre_sharpen: true,
            anti_alias: true,
            denoise: true,
            face_repair: true,
            hair_protect: true,
            final_sharpen: true,
            grain: false,
        }
    }
}

impl RestorationConfig {
    /// Every step switched on, including grain.
    pub fn all_steps(intensity: Intensity) -> Self {
        Self {
            intensity,
            grain: true,
            ..Self::default()
        }
    }

    pub fn any_step(&self) -> bool {
        self.deblock
            || self.pre_sharpen
            || self.anti_alias
            || self.denoise
            || self.face_repair
            || self.hair_protect
            || self.final_sharpen
            || self.grain
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub enabled: bool,
    pub intensity: Intensity,
    pub brightness: bool,
    pub contrast: bool,
    pub saturation: bool,
    pub temperature: bool,
    pub highlight: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: Intensity::Medium,
            brightness: true,
            contrast: true,
            saturation: true,
            temperature: true,
            highlight: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    pub enabled: bool,
    pub intensity: Intensity,
    pub auto_white_balance: bool,
    pub auto_levels: bool,
    pub shadow_lift: bool,
    pub highlight_recovery: bool,
    pub denoise: bool,
    pub dehaze: bool,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: Intensity::Medium,
            auto_white_balance: true,
            auto_levels: true,
            shadow_lift: true,
            highlight_recovery: true,
            denoise: true,
            dehaze: false,
        }
    }
}

/// Stylistic presets, applied after grading whenever their flag is set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub intensity: Intensity,
    pub sharpen: bool,
    pub grain: bool,
    pub landscape: bool,
    pub vintage: bool,
    pub cinematic: bool,
    pub anime: bool,
}

impl FilterConfig {
    pub fn any(&self) -> bool {
        self.sharpen || self.grain || self.landscape || self.vintage || self.cinematic || self.anime
    }
}
