#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use storyreel::projects::{GeneratedProject, NewProject, ProjectStore};
use storyreel::providers::{
    BlobStore, ImageGenerator, ProviderError, Providers, SpeechSynthesizer, TextGenerator,
};
use storyreel::quota::{Plan, QuotaStore, Subscription};
use storyreel::retry::RetryPolicy;
use storyreel::store::{StoreError, StoreResult};

pub fn plan(id: &str, video: i32, comic: i32) -> Plan {
    let now = Utc::now();
    Plan {
        id: id.to_string(),
        name: format!("{} plan", id),
        video_generations_per_month: video,
        comic_generations_per_month: comic,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        attempt_timeout: StdDuration::from_millis(200),
        base_delay: StdDuration::from_millis(1),
    }
}

/// In-memory quota store with read/write counters and injectable transient
/// conflicts. Writes are last-write-wins, matching the production store.
pub struct MemoryQuotaStore {
    plans: HashMap<String, Plan>,
    pub subscription: Mutex<Option<Subscription>>,
    pub subscription_reads: AtomicU32,
    pub subscription_writes: AtomicU32,
    conflicts_to_inject: AtomicU32,
}

impl MemoryQuotaStore {
    pub fn new(plans: Vec<Plan>, subscription: Option<Subscription>) -> Arc<Self> {
        Arc::new(Self {
            plans: plans.into_iter().map(|p| (p.id.clone(), p)).collect(),
            subscription: Mutex::new(subscription),
            subscription_reads: AtomicU32::new(0),
            subscription_writes: AtomicU32::new(0),
            conflicts_to_inject: AtomicU32::new(0),
        })
    }

    pub fn inject_conflicts(&self, count: u32) {
        self.conflicts_to_inject.store(count, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> Option<Subscription> {
        self.subscription.lock().await.clone()
    }

    pub fn reads(&self) -> u32 {
        self.subscription_reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> u32 {
        self.subscription_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn subscription_for_user(&self, user_id: i32) -> StoreResult<Option<Subscription>> {
        self.subscription_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .subscription
            .lock()
            .await
            .clone()
            .filter(|s| s.user_id == user_id))
    }

    async fn plan(&self, plan_id: &str) -> StoreResult<Option<Plan>> {
        Ok(self.plans.get(plan_id).cloned())
    }

    async fn create_subscription(&self, subscription: &Subscription) -> StoreResult<Subscription> {
        *self.subscription.lock().await = Some(subscription.clone());
        Ok(subscription.clone())
    }

    async fn update_subscription(&self, subscription: &Subscription) -> StoreResult<Subscription> {
        let pending = self.conflicts_to_inject.load(Ordering::SeqCst);
        if pending > 0 {
            self.conflicts_to_inject.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict);
        }
        self.subscription_writes.fetch_add(1, Ordering::SeqCst);
        *self.subscription.lock().await = Some(subscription.clone());
        Ok(subscription.clone())
    }
}

/// Script payload shaped like the text provider's structured output.
pub fn script_value(scene_count: u32) -> Value {
    let scenes: Vec<Value> = (1..=scene_count)
        .map(|n| {
            json!({
                "scene_number": n,
                "visual_prompt": format!("scene {n} visual"),
                "narrator_text": format!("narration {n}"),
                "dialogue": if n % 2 == 0 { format!("line {n}") } else { String::new() },
                "sound_effect": "wind",
                "camera_angle": "wide",
                "transition": "cut",
                "emotional_beat": "calm",
            })
        })
        .collect();
    json!({
        "synopsis": "A keeper holds the light.",
        "cover_prompt": "a lighthouse at dusk",
        "scenes": scenes,
    })
}

pub struct StubTextGenerator {
    pub calls: AtomicU32,
    scenes: u32,
    fail_terminal: bool,
}

impl StubTextGenerator {
    pub fn returning(scenes: u32) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            scenes,
            fail_terminal: false,
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            scenes: 0,
            fail_terminal: true,
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubTextGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _schema: Option<&Value>,
    ) -> Result<Value, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_terminal {
            return Err(ProviderError::Rejected("prompt refused".into()));
        }
        Ok(script_value(self.scenes))
    }
}

pub struct StubImageGenerator {
    pub calls: AtomicU32,
    fail_matching: Vec<String>,
}

impl StubImageGenerator {
    pub fn reliable() -> Arc<Self> {
        Self::failing_on(Vec::new())
    }

    /// Permanently fails (retryable error) any prompt containing one of the
    /// given fragments; everything else succeeds.
    pub fn failing_on(fail_matching: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            fail_matching,
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for StubImageGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _reference_urls: &[String],
    ) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_matching.iter().any(|m| prompt.contains(m)) {
            return Err(ProviderError::Unavailable("render farm busy".into()));
        }
        Ok(format!("https://cdn.test/img-{call}.png"))
    }
}

pub struct StubSpeechSynthesizer {
    pub calls: AtomicU32,
    fail: bool,
}

impl StubSpeechSynthesizer {
    pub fn reliable() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            fail: true,
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSpeechSynthesizer {
    async fn synthesize(&self, _text: &str, _voice_id: &str) -> Result<Bytes, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Unavailable("tts offline".into()));
        }
        Ok(Bytes::from_static(b"audio"))
    }
}

pub struct StubBlobStore {
    pub calls: AtomicU32,
}

impl StubBlobStore {
    pub fn reliable() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl BlobStore for StubBlobStore {
    async fn upload(&self, _bytes: Bytes, _mime: &str) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://cdn.test/audio-{call}.mp3"))
    }
}

pub fn providers(
    text: Arc<StubTextGenerator>,
    image: Arc<StubImageGenerator>,
    speech: Arc<StubSpeechSynthesizer>,
    blobs: Arc<StubBlobStore>,
) -> Arc<Providers> {
    Arc::new(Providers {
        text,
        image,
        speech,
        blobs,
    })
}

pub struct MemoryProjectStore {
    pub created: Mutex<Vec<GeneratedProject>>,
    fail: bool,
}

impl MemoryProjectStore {
    pub fn reliable() -> Arc<Self> {
        Arc::new(Self {
            created: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            created: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub async fn count(&self) -> usize {
        self.created.lock().await.len()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn create(&self, project: &NewProject) -> StoreResult<GeneratedProject> {
        if self.fail {
            return Err(StoreError::Db(sqlx::Error::PoolClosed));
        }
        let record = GeneratedProject {
            id: Uuid::new_v4(),
            user_id: project.user_id,
            kind: project.kind,
            title: project.title.clone(),
            synopsis: project.synopsis.clone(),
            cover_image_url: project.cover_image_url.clone(),
            status: project.status,
            scenes: project.scenes.clone(),
            created_at: Utc::now(),
        };
        self.created.lock().await.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid, user_id: i32) -> StoreResult<Option<GeneratedProject>> {
        Ok(self
            .created
            .lock()
            .await
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: i32) -> StoreResult<Vec<GeneratedProject>> {
        Ok(self
            .created
            .lock()
            .await
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

pub fn active_subscription(user_id: i32, plan_id: &str, now: DateTime<Utc>) -> Subscription {
    Subscription::trial(user_id, plan_id, now)
}
