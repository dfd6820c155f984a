use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ServerConfig, TlsConfig};

/// Read an environment variable, treating blank values as unset.
fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match env_string(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name}: '{raw}' ({e})")),
    }
}

/// Build a configuration from environment variables on top of defaults.
///
/// `.env` values are already in the environment by the time this runs.
pub(super) fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = ServerConfig::default();

    // Server
    if let Some(host) = env_string("HOST") {
        config.host = host;
    }
    if let Some(port) = env_parse("PORT")? {
        config.port = port;
    }
    if let Some(url) = env_string("PUBLIC_BASE_URL") {
        config.public_base_url = url;
    }
    if let Some(limit) = env_parse("MAX_UPLOAD_BYTES")? {
        config.max_upload_bytes = limit;
    }

    config.tls = match (env_string("TLS_CERT_PATH"), env_string("TLS_KEY_PATH")) {
        (Some(cert), Some(key)) => Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        (None, None) => None,
        _ => return Err("TLS_CERT_PATH and TLS_KEY_PATH must be set together".into()),
    };

    // Storage
    if let Some(dir) = env_string("STORAGE_DIR") {
        config.storage.dir = PathBuf::from(dir);
    }
    if let Some(minutes) = env_parse("STORAGE_EXPIRY_MINUTES")? {
        config.storage.expiry_minutes = minutes;
    }
    if let Some(seconds) = env_parse("STORAGE_SWEEP_INTERVAL_SECONDS")? {
        config.storage.sweep_interval_seconds = seconds;
    }
    if let Some(extension) = env_string("STORAGE_EXTENSION") {
        config.storage.extension = extension;
    }

    // Synthesis
    if let Some(url) = env_string("SYNTHESIS_URL") {
        config.synthesis.url = url;
    }
    config.synthesis.api_key = env_string("SYNTHESIS_API_KEY");
    config.synthesis.model = env_string("SYNTHESIS_MODEL");
    config.synthesis.voice = env_string("SYNTHESIS_VOICE");
    config.synthesis.speaker_id = env_parse("SYNTHESIS_SPEAKER_ID")?;
    config.synthesis.length_scale = env_parse("SYNTHESIS_LENGTH_SCALE")?;
    config.synthesis.noise_scale = env_parse("SYNTHESIS_NOISE_SCALE")?;
    config.synthesis.noise_w = env_parse("SYNTHESIS_NOISE_W")?;
    if let Some(silence) = env_parse("SYNTHESIS_SENTENCE_SILENCE")? {
        config.synthesis.sentence_silence = silence;
    }
    if let Some(timeout) = env_parse("SYNTHESIS_TIMEOUT_SECONDS")? {
        config.synthesis.timeout_seconds = timeout;
    }

    // Security
    config.cors_allowed_origins = env_string("CORS_ALLOWED_ORIGINS");
    if let Some(rps) = env_parse("RATE_LIMIT_REQUESTS_PER_SECOND")? {
        config.rate_limit_requests_per_second = rps;
    }
    if let Some(burst) = env_parse("RATE_LIMIT_BURST_SIZE")? {
        config.rate_limit_burst_size = burst;
    }

    Ok(config)
}
