use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use crate::config;
use crate::error::{AppError, AppResult};
use crate::projects::{GeneratedProject, NewProject, ProjectStatus, ProjectStore, Scene};
use crate::providers::Providers;
use crate::quota::{UsageGate, UsageRecorder};
use crate::retry::{call_with_retry, RetryPolicy};

use super::script::{parse_script, script_prompt, script_schema, Script};
use super::{GenerationRequest, QualityTier};

/// Drives one generation request end to end: gate, script, media fan-out,
/// assembly, persistence, usage bookkeeping.
pub struct PipelineOrchestrator {
    gate: UsageGate,
    recorder: UsageRecorder,
    providers: Arc<Providers>,
    projects: Arc<dyn ProjectStore>,
    retry: RetryPolicy,
}

impl PipelineOrchestrator {
    pub fn new(
        gate: UsageGate,
        recorder: UsageRecorder,
        providers: Arc<Providers>,
        projects: Arc<dyn ProjectStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            gate,
            recorder,
            providers,
            projects,
            retry,
        }
    }

    pub async fn run(
        &self,
        user_id: i32,
        request: GenerationRequest,
        now: DateTime<Utc>,
    ) -> AppResult<GeneratedProject> {
        let tier = request.validate()?;

        let decision = self.gate.check_and_advise(user_id, request.kind, now).await?;
        if !decision.allowed {
            return Err(AppError::QuotaExceeded {
                used: decision.used,
                limit: decision.limit,
                remaining: decision.remaining,
            });
        }

        let scene_count = request.planned_scene_count(tier);
        tracing::info!(
            user_id,
            kind = %request.kind,
            scene_count,
            tier = tier.as_str(),
            "starting generation pipeline"
        );

        let prompt = script_prompt(&request, tier, scene_count);
        let schema = script_schema(scene_count);
        let raw = self.providers.text.generate(&prompt, Some(&schema)).await?;
        let script = parse_script(raw, scene_count)?;
        if (script.scenes.len() as u32) < scene_count {
            tracing::warn!(
                requested = scene_count,
                returned = script.scenes.len(),
                "script came back short; continuing with the returned scenes"
            );
        }

        let ((cover_url, scene_urls), audio) = tokio::join!(
            self.generate_images(&script, &request, tier),
            self.generate_audio(&script, &request)
        );

        let assembled = assemble(script, scene_urls, audio);
        let new_project = NewProject {
            user_id,
            kind: request.kind,
            title: request.title.trim().to_string(),
            synopsis: assembled.synopsis,
            cover_image_url: cover_url,
            status: ProjectStatus::Completed,
            scenes: assembled.scenes,
        };
        let project = self.projects.create(&new_project).await.map_err(|err| {
            tracing::error!(user_id, ?err, "assembled project could not be persisted");
            AppError::Internal("generated project could not be saved".into())
        })?;

        // Bookkeeping only; a completed project is never unwound over it.
        if let Err(err) = self.recorder.increment(user_id, request.kind, now).await {
            tracing::warn!(user_id, ?err, "usage increment failed after completed generation");
        }

        tracing::info!(user_id, project = %project.id, scenes = project.scenes.len(), "generation pipeline completed");
        Ok(project)
    }

    /// Cover plus one image per scene, all in flight at once, each behind the
    /// retry wrapper. A call that exhausts its retries yields an empty URL;
    /// the rest of the batch is unaffected.
    async fn generate_images(
        &self,
        script: &Script,
        request: &GenerationRequest,
        tier: QualityTier,
    ) -> (String, Vec<String>) {
        let preamble = tier.style_preamble();
        let refs = request.reference_urls();
        let refs = &refs;

        let cover_prompt = if script.cover_prompt.trim().is_empty() {
            format!("{preamble} Cover art for \"{}\"", request.title.trim())
        } else {
            format!("{preamble} {}", script.cover_prompt)
        };
        let cover = async {
            match call_with_retry(&self.retry, || {
                self.providers.image.generate(&cover_prompt, refs)
            })
            .await
            {
                Ok(url) => url,
                Err(error) => {
                    tracing::warn!(%error, "cover image failed after retries");
                    String::new()
                }
            }
        };

        let scenes = join_all(script.scenes.iter().map(|scene| {
            let prompt = format!("{preamble} {}", scene.visual_prompt);
            async move {
                match call_with_retry(&self.retry, || {
                    self.providers.image.generate(&prompt, refs)
                })
                .await
                {
                    Ok(url) => url,
                    Err(error) => {
                        tracing::warn!(
                            scene = scene.scene_number,
                            %error,
                            "scene image failed after retries"
                        );
                        String::new()
                    }
                }
            }
        }));

        tokio::join!(cover, scenes)
    }

    /// One synthesis per non-empty narration/dialogue text, all concurrent.
    /// Audio is an enhancement: any failure is dropped per scene.
    async fn generate_audio(
        &self,
        script: &Script,
        request: &GenerationRequest,
    ) -> Vec<(Option<String>, Option<String>)> {
        let narrator_voice = config::DEFAULT_VOICE_ID.clone();
        let dialogue_voice = request
            .characters
            .iter()
            .find_map(|c| c.voice_id.clone())
            .unwrap_or_else(|| narrator_voice.clone());
        let narrator_voice = &narrator_voice;
        let dialogue_voice = &dialogue_voice;

        join_all(script.scenes.iter().map(|scene| async move {
            tokio::join!(
                self.synthesize_track(&scene.narrator_text, narrator_voice, scene.scene_number),
                self.synthesize_track(&scene.dialogue, dialogue_voice, scene.scene_number)
            )
        }))
        .await
    }

    async fn synthesize_track(
        &self,
        text: &str,
        voice_id: &str,
        scene_number: u32,
    ) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let bytes = match self.providers.speech.synthesize(text, voice_id).await {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::debug!(scene = scene_number, %error, "speech synthesis failed; scene ships without audio");
                return None;
            }
        };
        match self.providers.blobs.upload(bytes, "audio/mpeg").await {
            Ok(url) => Some(url),
            Err(error) => {
                tracing::debug!(scene = scene_number, %error, "audio upload failed; scene ships without audio");
                None
            }
        }
    }
}

struct Assembled {
    synopsis: String,
    scenes: Vec<Scene>,
}

/// Order-preserving zip of script scenes with their media results. Missing
/// media stays missing; the project still completes.
fn assemble(
    script: Script,
    scene_urls: Vec<String>,
    audio: Vec<(Option<String>, Option<String>)>,
) -> Assembled {
    let mut scenes = Vec::with_capacity(script.scenes.len());
    for (index, scene) in script.scenes.into_iter().enumerate() {
        let (narration_audio_url, dialogue_audio_url) =
            audio.get(index).cloned().unwrap_or((None, None));
        scenes.push(Scene {
            scene_number: scene.scene_number as i32,
            image_url: scene_urls.get(index).cloned().unwrap_or_default(),
            narrator_text: scene.narrator_text,
            dialogue: scene.dialogue,
            sound_effect: scene.sound_effect,
            camera_angle: scene.camera_angle,
            transition: scene.transition,
            emotional_beat: scene.emotional_beat,
            narration_audio_url,
            dialogue_audio_url,
        });
    }
    Assembled {
        synopsis: script.synopsis,
        scenes,
    }
}
