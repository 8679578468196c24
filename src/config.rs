use once_cell::sync::Lazy;

/// Secret used for JWT verification. Must be set via the `JWT_SECRET` env variable.
pub static JWT_SECRET: Lazy<String> =
    Lazy::new(|| std::env::var("JWT_SECRET").expect("JWT_SECRET must be set"));

/// Address the HTTP server should bind to. Defaults to `0.0.0.0`.
pub static BIND_ADDRESS: Lazy<String> =
    Lazy::new(|| std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()));

/// Port the HTTP server should listen on. Defaults to `3000`.
pub static BIND_PORT: Lazy<u16> = Lazy::new(|| {
    std::env::var("BIND_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000)
});

/// When set to a truthy value, allows the application to continue running even if database
/// migrations fail. Defaults to `false`.
pub static ALLOW_MIGRATION_FAILURE: Lazy<bool> = Lazy::new(|| {
    std::env::var("ALLOW_MIGRATION_FAILURE")
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes")
        })
        .unwrap_or(false)
});

/// Seconds a cached usage decision stays fresh. Defaults to `300` (5 minutes).
pub static USAGE_CACHE_TTL_SECS: Lazy<i64> = Lazy::new(|| {
    std::env::var("USAGE_CACHE_TTL_SECS")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(300)
});

/// Plan assigned to users generating for the first time without a subscription.
pub static TRIAL_PLAN_ID: Lazy<String> =
    Lazy::new(|| std::env::var("TRIAL_PLAN_ID").unwrap_or_else(|_| "trial".to_string()));

/// Attempts per external image-generation call. Defaults to `3`.
pub static IMAGE_MAX_ATTEMPTS: Lazy<u32> = Lazy::new(|| {
    std::env::var("IMAGE_MAX_ATTEMPTS")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(3)
});

/// Per-attempt timeout for image generation, in seconds. Defaults to `60`.
pub static IMAGE_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
    std::env::var("IMAGE_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(60)
});

/// Base URL of the text-generation provider.
pub static TEXT_API_BASE: Lazy<String> = Lazy::new(|| {
    std::env::var("TEXT_API_BASE").unwrap_or_else(|_| "https://api.text.invalid".to_string())
});

/// API key for the text-generation provider.
pub static TEXT_API_KEY: Lazy<Option<String>> = Lazy::new(|| read_optional_env("TEXT_API_KEY"));

/// Base URL of the image-generation provider.
pub static IMAGE_API_BASE: Lazy<String> = Lazy::new(|| {
    std::env::var("IMAGE_API_BASE").unwrap_or_else(|_| "https://api.image.invalid".to_string())
});

/// API key for the image-generation provider.
pub static IMAGE_API_KEY: Lazy<Option<String>> = Lazy::new(|| read_optional_env("IMAGE_API_KEY"));

/// Base URL of the speech-synthesis provider.
pub static SPEECH_API_BASE: Lazy<String> = Lazy::new(|| {
    std::env::var("SPEECH_API_BASE").unwrap_or_else(|_| "https://api.speech.invalid".to_string())
});

/// API key for the speech-synthesis provider.
pub static SPEECH_API_KEY: Lazy<Option<String>> = Lazy::new(|| read_optional_env("SPEECH_API_KEY"));

/// Voice used for narration when a character does not carry its own voice id.
pub static DEFAULT_VOICE_ID: Lazy<String> =
    Lazy::new(|| std::env::var("DEFAULT_VOICE_ID").unwrap_or_else(|_| "narrator-1".to_string()));

/// Base URL of the blob-upload service audio files are stored through.
pub static BLOB_API_BASE: Lazy<String> = Lazy::new(|| {
    std::env::var("BLOB_API_BASE").unwrap_or_else(|_| "https://blobs.invalid".to_string())
});

fn read_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
