use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use crate::config;

use super::{BlobStore, ImageGenerator, ProviderError, SpeechSynthesizer, TextGenerator};

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .expect("client build")
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Unavailable(err.to_string())
    }
}

async fn check_status(resp: Response) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status == StatusCode::BAD_REQUEST {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::Rejected(body));
    }
    if !status.is_success() {
        return Err(ProviderError::Unavailable(format!("status {status}")));
    }
    Ok(resp)
}

pub struct TextApiClient {
    base: String,
    key: Option<String>,
    client: Client,
}

impl TextApiClient {
    pub fn from_env() -> Self {
        Self::new(config::TEXT_API_BASE.clone(), config::TEXT_API_KEY.clone())
    }

    pub fn new(base: impl Into<String>, key: Option<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            key,
            client: build_client(Duration::from_secs(120)),
        }
    }
}

#[async_trait]
impl TextGenerator for TextApiClient {
    async fn generate(
        &self,
        prompt: &str,
        schema: Option<&Value>,
    ) -> Result<Value, ProviderError> {
        let url = format!("{}/v1/generate", self.base);
        let mut body = json!({ "prompt": prompt });
        if let Some(schema) = schema {
            body["response_schema"] = schema.clone();
        }
        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.map_err(map_transport_error)?;
        let resp = check_status(resp).await?;
        resp.json::<Value>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

pub struct ImageApiClient {
    base: String,
    key: Option<String>,
    client: Client,
}

impl ImageApiClient {
    pub fn from_env() -> Self {
        Self::new(config::IMAGE_API_BASE.clone(), config::IMAGE_API_KEY.clone())
    }

    pub fn new(base: impl Into<String>, key: Option<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            key,
            client: build_client(Duration::from_secs(90)),
        }
    }
}

#[async_trait]
impl ImageGenerator for ImageApiClient {
    async fn generate(
        &self,
        prompt: &str,
        reference_urls: &[String],
    ) -> Result<String, ProviderError> {
        let url = format!("{}/v1/images", self.base);
        let body = json!({
            "prompt": prompt,
            "reference_urls": reference_urls,
        });
        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.map_err(map_transport_error)?;
        let resp = check_status(resp).await?;
        let payload: Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        payload["url"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::Malformed("image response missing url".into()))
    }
}

pub struct SpeechApiClient {
    base: String,
    key: Option<String>,
    client: Client,
}

impl SpeechApiClient {
    pub fn from_env() -> Self {
        Self::new(
            config::SPEECH_API_BASE.clone(),
            config::SPEECH_API_KEY.clone(),
        )
    }

    pub fn new(base: impl Into<String>, key: Option<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            key,
            client: build_client(Duration::from_secs(60)),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechApiClient {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, ProviderError> {
        let url = format!("{}/v1/speech", self.base);
        let body = json!({ "text": text, "voice_id": voice_id });
        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.map_err(map_transport_error)?;
        let resp = check_status(resp).await?;
        let payload: Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let encoded = payload["audio"]
            .as_str()
            .ok_or_else(|| ProviderError::Malformed("speech response missing audio".into()))?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(Bytes::from(decoded))
    }
}

pub struct BlobApiClient {
    base: String,
    client: Client,
}

impl BlobApiClient {
    pub fn from_env() -> Self {
        Self::new(config::BLOB_API_BASE.clone())
    }

    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            client: build_client(Duration::from_secs(30)),
        }
    }
}

#[async_trait]
impl BlobStore for BlobApiClient {
    async fn upload(&self, bytes: Bytes, mime: &str) -> Result<String, ProviderError> {
        let url = format!("{}/v1/blobs", self.base);
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, mime)
            .body(bytes)
            .send()
            .await
            .map_err(map_transport_error)?;
        let resp = check_status(resp).await?;
        let payload: Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        payload["url"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::Malformed("blob response missing url".into()))
    }
}
