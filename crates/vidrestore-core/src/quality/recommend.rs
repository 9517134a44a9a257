use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::analyzer::QualityMetrics;

/// An adjustment the grading or restoration stages may apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Adjustment {
    Brightness,
    Contrast,
    Saturation,
    Sharpness,
    Denoise,
    Deblock,
    AntiAlias,
    WhiteBalance,
    AutoLevels,
    ShadowLift,
    HighlightRecovery,
    Dehaze,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
            Self::Sharpness => "sharpness",
            Self::Denoise => "denoise",
            Self::Deblock => "deblock",
            Self::AntiAlias => "anti-alias",
            Self::WhiteBalance => "white balance",
            Self::AutoLevels => "auto levels",
            Self::ShadowLift => "shadow lift",
            Self::HighlightRecovery => "highlight recovery",
            Self::Dehaze => "dehaze",
        };
        write!(f, "{name}")
    }
}

/// Threshold band for one metric.
#[derive(Clone, Copy, Debug)]
pub struct Band {
    pub low: f64,
    pub high: f64,
    /// Inclusive range where the metric needs no work.
    pub optimal: (f64, f64),
}

impl Band {
    fn is_optimal(&self, v: f64) -> bool {
        v >= self.optimal.0 && v <= self.optimal.1
    }
}

pub const BRIGHTNESS_BAND: Band = Band {
    low: 80.0,
    high: 180.0,
    optimal: (100.0, 160.0),
};
pub const CONTRAST_BAND: Band = Band {
    low: 30.0,
    high: 80.0,
    optimal: (40.0, 70.0),
};
pub const SATURATION_BAND: Band = Band {
    low: 40.0,
    high: 180.0,
    optimal: (90.0, 150.0),
};
pub const SHARPNESS_BAND: Band = Band {
    low: 100.0,
    high: 800.0,
    optimal: (300.0, f64::INFINITY),
};
pub const NOISE_BAND: Band = Band {
    low: 5.0,
    high: 30.0,
    optimal: (0.0, 5.0),
};
/// Scaled for the capped, edge-masked step mean of `block_artifact_score`, not a raw boundary-difference mean.
pub const BLOCK_BAND: Band = Band {
    low: 3.0,
    high: 6.0,
    optimal: (0.0, 3.0),
};
pub const ALIASING_BAND: Band = Band {
    low: 0.1,
    high: 0.4,
    optimal: (0.0, 0.2),
};

/// Smallest |R - B| mean treated as a color cast.
const COLOR_CAST: f64 = 5.0;
/// Clipped pixel fraction that warrants shadow/highlight work.
const CLIPPED_FRACTION: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub needed: bool,
    pub skip: bool,
    pub reason: String,
}

impl Recommendation {
    fn needed(reason: impl Into<String>) -> Self {
        Self {
            needed: true,
            skip: false,
            reason: reason.into(),
        }
    }

    fn skip(reason: impl Into<String>) -> Self {
        Self {
            needed: false,
            skip: true,
            reason: reason.into(),
        }
    }

    fn optional(reason: impl Into<String>) -> Self {
        Self {
            needed: false,
            skip: false,
            reason: reason.into(),
        }
    }
}

/// Advice for every [`Adjustment`], derived from one set of metrics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations(pub BTreeMap<Adjustment, Recommendation>);

impl Recommendations {
    /// True only when the metric is already in its favorable band.
    pub fn should_skip(&self, adjustment: Adjustment) -> bool {
        self.0.get(&adjustment).is_some_and(|r| r.skip)
    }

    pub fn is_needed(&self, adjustment: Adjustment) -> bool {
        self.0.get(&adjustment).is_some_and(|r| r.needed)
    }

    pub fn get(&self, adjustment: Adjustment) -> Option<&Recommendation> {
        self.0.get(&adjustment)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Adjustment, &Recommendation)> {
        self.0.iter()
    }
}

/// Brightness/contrast/saturation: low needs work, optimal or high skips.
fn level_advice(v: f64, band: &Band, what: &str) -> Recommendation {
    if v < band.low {
        Recommendation::needed(format!("{what} {v:.1} below {:.0}", band.low))
    } else if v > band.high {
        Recommendation::skip(format!("{what} {v:.1} already above {:.0}", band.high))
    } else if band.is_optimal(v) {
        Recommendation::skip(format!("{what} {v:.1} in optimal range"))
    } else {
        Recommendation::optional(format!("{what} {v:.1} acceptable"))
    }
}

/// Artifact metrics: above `high` needs work, within optimal skips.
fn artifact_advice(v: f64, band: &Band, what: &str) -> Recommendation {
    if v > band.high {
        Recommendation::needed(format!("{what} {v:.2} above {:.2}", band.high))
    } else if band.is_optimal(v) {
        Recommendation::skip(format!("{what} {v:.2} negligible"))
    } else {
        Recommendation::optional(format!("{what} {v:.2} moderate"))
    }
}

pub fn recommend(m: &QualityMetrics) -> Recommendations {
    let mut out = BTreeMap::new();

    out.insert(Adjustment::Brightness, level_advice(m.brightness, &BRIGHTNESS_BAND, "brightness"));
    out.insert(Adjustment::Contrast, level_advice(m.contrast, &CONTRAST_BAND, "contrast"));
    out.insert(Adjustment::Saturation, level_advice(m.saturation, &SATURATION_BAND, "saturation"));

    let sharpness = if m.sharpness < SHARPNESS_BAND.low {
        Recommendation::needed(format!("sharpness {:.0} below {:.0}", m.sharpness, SHARPNESS_BAND.low))
    } else if m.sharpness > SHARPNESS_BAND.high || SHARPNESS_BAND.is_optimal(m.sharpness) {
        Recommendation::skip(format!("sharpness {:.0} sufficient", m.sharpness))
    } else {
        Recommendation::optional(format!("sharpness {:.0} acceptable", m.sharpness))
    };
    out.insert(Adjustment::Sharpness, sharpness);

    out.insert(Adjustment::Denoise, artifact_advice(m.noise, &NOISE_BAND, "noise"));
    out.insert(Adjustment::Deblock, artifact_advice(m.block_artifact, &BLOCK_BAND, "block score"));
    out.insert(Adjustment::AntiAlias, artifact_advice(m.aliasing, &ALIASING_BAND, "aliasing"));

    let white_balance = if m.color_temp.abs() < COLOR_CAST {
        Recommendation::skip(format!("color bias {:.1} neutral", m.color_temp))
    } else {
        Recommendation::needed(format!("color bias {:.1}", m.color_temp))
    };
    out.insert(Adjustment::WhiteBalance, white_balance);

    let contrast_fine = m.contrast >= CONTRAST_BAND.optimal.0;
    let levels = if contrast_fine {
        Recommendation::skip(format!("contrast {:.1} already spans the range", m.contrast))
    } else if m.contrast < CONTRAST_BAND.low {
        Recommendation::needed(format!("contrast {:.1} compressed", m.contrast))
    } else {
        Recommendation::optional(format!("contrast {:.1} acceptable", m.contrast))
    };
    out.insert(Adjustment::AutoLevels, levels);

    let shadows = if m.shadow_ratio < CLIPPED_FRACTION {
        Recommendation::skip(format!("shadow ratio {:.3} small", m.shadow_ratio))
    } else {
        Recommendation::needed(format!("shadow ratio {:.3}", m.shadow_ratio))
    };
    out.insert(Adjustment::ShadowLift, shadows);

    let highlights = if m.highlight_ratio < CLIPPED_FRACTION {
        Recommendation::skip(format!("highlight ratio {:.3} small", m.highlight_ratio))
    } else {
        Recommendation::needed(format!("highlight ratio {:.3}", m.highlight_ratio))
    };
    out.insert(Adjustment::HighlightRecovery, highlights);

    let dehaze = if contrast_fine {
        Recommendation::skip(format!("contrast {:.1} shows no haze", m.contrast))
    } else {
        Recommendation::optional(format!("contrast {:.1} may indicate haze", m.contrast))
    };
    out.insert(Adjustment::Dehaze, dehaze);

    Recommendations(out)
}
