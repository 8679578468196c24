mod orchestrator;
mod plan;
mod script;

pub mod api;

pub use orchestrator::PipelineOrchestrator;
pub use plan::{video_scene_count, QualityTier, MAX_SCENES, MIN_SCENES};
pub use script::{parse_script, script_prompt, script_schema, Script, ScriptScene};

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::quota::GenerationKind;

/// What the user asked for. Ephemeral; only the assembled project persists.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub kind: GenerationKind,
    pub title: String,
    pub story: String,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub quality_tier: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub characters: Vec<CharacterSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CharacterSpec {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub voice_id: Option<String>,
}

impl GenerationRequest {
    /// Field validation, done before the quota check so a bad request never
    /// consumes quota or reaches a provider. Returns the resolved tier.
    pub fn validate(&self) -> AppResult<QualityTier> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        if self.story.trim().is_empty() {
            return Err(AppError::Validation("story must not be empty".into()));
        }
        match self.kind {
            GenerationKind::Video => {
                let duration = self.duration_minutes.ok_or_else(|| {
                    AppError::Validation("duration_minutes is required for video".into())
                })?;
                if duration <= 0.0 {
                    return Err(AppError::Validation(
                        "duration_minutes must be positive".into(),
                    ));
                }
                let raw = self.quality_tier.as_deref().ok_or_else(|| {
                    AppError::Validation("quality_tier is required for video".into())
                })?;
                QualityTier::parse(raw).ok_or_else(|| {
                    AppError::Validation(format!("unknown quality tier '{raw}'"))
                })
            }
            GenerationKind::Comic => match self.quality_tier.as_deref() {
                Some(raw) => QualityTier::parse(raw).ok_or_else(|| {
                    AppError::Validation(format!("unknown quality tier '{raw}'"))
                }),
                None => Ok(QualityTier::Standard),
            },
        }
    }

    pub fn planned_scene_count(&self, tier: QualityTier) -> u32 {
        match self.kind {
            GenerationKind::Video => {
                video_scene_count(self.duration_minutes.unwrap_or_default(), tier)
            }
            GenerationKind::Comic => tier.panel_budget(),
        }
    }

    /// Character photos double as image-generation references.
    pub fn reference_urls(&self) -> Vec<String> {
        self.characters
            .iter()
            .filter_map(|c| c.photo_url.clone())
            .collect()
    }
}
