use serde::Deserialize;
use serde_json::{json, Value};

use crate::providers::ProviderError;

use super::{GenerationRequest, QualityTier};

/// Structured script returned by the text provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub cover_prompt: String,
    pub scenes: Vec<ScriptScene>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptScene {
    #[serde(default)]
    pub scene_number: u32,
    pub visual_prompt: String,
    #[serde(default)]
    pub narrator_text: String,
    #[serde(default)]
    pub dialogue: String,
    #[serde(default)]
    pub sound_effect: String,
    #[serde(default)]
    pub camera_angle: String,
    #[serde(default)]
    pub transition: String,
    #[serde(default)]
    pub emotional_beat: String,
}

pub fn script_prompt(request: &GenerationRequest, tier: QualityTier, scene_count: u32) -> String {
    let mut prompt = format!(
        "Write a {kind} script titled \"{title}\" with exactly {scene_count} scenes.\n\
         Story premise: {story}\n",
        kind = request.kind,
        title = request.title.trim(),
        story = request.story.trim(),
    );
    if let Some(audience) = request.target_audience.as_deref().filter(|a| !a.is_empty()) {
        prompt.push_str(&format!("Target audience: {audience}\n"));
    }
    if let Some(language) = request.language.as_deref().filter(|l| !l.is_empty()) {
        prompt.push_str(&format!("Language: {language}\n"));
    }
    if !request.characters.is_empty() {
        prompt.push_str("Characters:\n");
        for character in &request.characters {
            prompt.push_str(&format!("- {}: {}\n", character.name, character.description));
        }
    }
    prompt.push_str(&format!(
        "Pacing tier: {tier}. Every scene needs a visual prompt suitable for image \
         generation, narrator text, dialogue, a sound effect, a camera angle, a \
         transition, and an emotional beat. Also return a one-paragraph synopsis \
         and a cover image prompt.",
        tier = tier.as_str(),
    ));
    prompt
}

pub fn script_schema(scene_count: u32) -> Value {
    json!({
        "type": "object",
        "required": ["synopsis", "cover_prompt", "scenes"],
        "properties": {
            "synopsis": { "type": "string" },
            "cover_prompt": { "type": "string" },
            "scenes": {
                "type": "array",
                "minItems": scene_count,
                "maxItems": scene_count,
                "items": {
                    "type": "object",
                    "required": ["scene_number", "visual_prompt"],
                    "properties": {
                        "scene_number": { "type": "integer" },
                        "visual_prompt": { "type": "string" },
                        "narrator_text": { "type": "string" },
                        "dialogue": { "type": "string" },
                        "sound_effect": { "type": "string" },
                        "camera_angle": { "type": "string" },
                        "transition": { "type": "string" },
                        "emotional_beat": { "type": "string" }
                    }
                }
            }
        }
    })
}

/// Parses the provider payload, orders scenes, and bounds the working set to
/// what was requested. A script with fewer scenes than requested is kept as
/// is; the run degrades in length instead of failing.
pub fn parse_script(raw: Value, requested: u32) -> Result<Script, ProviderError> {
    let mut script: Script = serde_json::from_value(raw)
        .map_err(|e| ProviderError::Malformed(format!("script payload: {e}")))?;
    if script.scenes.is_empty() {
        return Err(ProviderError::Malformed("script contained no scenes".into()));
    }
    script.scenes.sort_by_key(|scene| scene.scene_number);
    script.scenes.truncate(requested as usize);
    for (index, scene) in script.scenes.iter_mut().enumerate() {
        scene.scene_number = index as u32 + 1;
    }
    Ok(script)
}
