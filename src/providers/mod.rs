mod http;

pub use http::{BlobApiClient, ImageApiClient, SpeechApiClient, TextApiClient};

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider refused the request itself (400-class). Retrying the
    /// same payload cannot help.
    #[error("provider rejected request: {0}")]
    Rejected(String),
    #[error("provider call timed out")]
    Timeout,
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Rejected(_) => false,
            ProviderError::Timeout
            | ProviderError::Unavailable(_)
            | ProviderError::Malformed(_) => true,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Structured generation: when a JSON schema is given the provider is
    /// instructed to return a document conforming to it.
    async fn generate(&self, prompt: &str, schema: Option<&Value>)
        -> Result<Value, ProviderError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        reference_urls: &[String],
    ) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, ProviderError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, bytes: Bytes, mime: &str) -> Result<String, ProviderError>;
}

/// The external AI collaborators the pipeline drives.
pub struct Providers {
    pub text: Arc<dyn TextGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Providers {
    pub fn from_env() -> Self {
        Self {
            text: Arc::new(TextApiClient::from_env()),
            image: Arc::new(ImageApiClient::from_env()),
            speech: Arc::new(SpeechApiClient::from_env()),
            blobs: Arc::new(BlobApiClient::from_env()),
        }
    }
}
