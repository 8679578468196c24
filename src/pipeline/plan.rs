use serde::{Deserialize, Serialize};

pub const MIN_SCENES: u32 = 4;
pub const MAX_SCENES: u32 = 200;

/// Quality tiers trade cost for density and rendering style. For video the
/// tier sets scenes-per-minute; for comics it sets the panel budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Fast,
    Standard,
    Premium,
    Cinematic,
}

impl QualityTier {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fast" => Some(QualityTier::Fast),
            "standard" => Some(QualityTier::Standard),
            "premium" => Some(QualityTier::Premium),
            "cinematic" => Some(QualityTier::Cinematic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Fast => "fast",
            QualityTier::Standard => "standard",
            QualityTier::Premium => "premium",
            QualityTier::Cinematic => "cinematic",
        }
    }

    pub fn scenes_per_minute(&self) -> f64 {
        match self {
            QualityTier::Fast => 1.5,
            QualityTier::Standard => 2.0,
            QualityTier::Premium => 2.5,
            QualityTier::Cinematic => 3.0,
        }
    }

    pub fn panel_budget(&self) -> u32 {
        match self {
            QualityTier::Fast => 6,
            QualityTier::Standard => 8,
            QualityTier::Premium => 10,
            QualityTier::Cinematic => 12,
        }
    }

    /// Style preamble prepended to every image prompt of a run.
    pub fn style_preamble(&self) -> &'static str {
        match self {
            QualityTier::Fast => "Clean flat illustration, bold outlines, simple shading.",
            QualityTier::Standard => "Detailed digital illustration, vibrant colors, consistent character design.",
            QualityTier::Premium => {
                "Highly detailed painterly illustration, dramatic lighting, rich textures."
            }
            QualityTier::Cinematic => {
                "Cinematic film still, volumetric lighting, shallow depth of field, ultra detailed."
            }
        }
    }
}

/// Scene count for a video run, clamped to the supported range.
pub fn video_scene_count(duration_minutes: f64, tier: QualityTier) -> u32 {
    let raw = (duration_minutes * tier.scenes_per_minute()).round() as i64;
    raw.clamp(MIN_SCENES as i64, MAX_SCENES as i64) as u32
}
