use url::Url;

use super::{ServerConfig, StorageConfig, SynthesisConfig};

/// Validate a fully merged configuration.
pub(super) fn validate_config(config: &ServerConfig) -> Result<(), String> {
    validate_server(config)?;
    validate_storage(&config.storage)?;
    validate_synthesis(&config.synthesis)?;
    Ok(())
}

fn validate_server(config: &ServerConfig) -> Result<(), String> {
    if config.host.trim().is_empty() {
        return Err("Server host must not be empty".to_string());
    }
    if config.port == 0 {
        return Err("Server port must be greater than 0".to_string());
    }
    if config.max_upload_bytes == 0 {
        return Err("max_upload_bytes must be greater than 0".to_string());
    }
    if !config.public_base_url.is_empty() {
        validate_http_url("public_base_url", &config.public_base_url)?;
    }
    if config.rate_limit_requests_per_second == 0 {
        return Err("rate_limit_requests_per_second must be greater than 0".to_string());
    }
    if config.rate_limit_burst_size == 0 {
        return Err("rate_limit_burst_size must be greater than 0".to_string());
    }
    Ok(())
}

fn validate_storage(storage: &StorageConfig) -> Result<(), String> {
    if storage.dir.as_os_str().is_empty() {
        return Err("Storage dir must not be empty".to_string());
    }
    if storage.expiry_minutes == 0 {
        return Err("Storage expiry_minutes must be at least 1".to_string());
    }
    if storage.sweep_interval_seconds == 0 {
        return Err("Storage sweep interval must be at least 1 second".to_string());
    }

    let expiry_seconds = storage.expiry_minutes.saturating_mul(60);
    if storage.sweep_interval_seconds >= expiry_seconds {
        return Err(format!(
            "Storage sweep interval ({}s) must be shorter than the expiry ({}s)",
            storage.sweep_interval_seconds, expiry_seconds
        ));
    }

    let extension = storage.extension.trim_start_matches('.');
    if extension.is_empty() || !extension.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(format!(
            "Storage extension must be ASCII alphanumeric, got '{}'",
            storage.extension
        ));
    }
    Ok(())
}

fn validate_synthesis(synthesis: &SynthesisConfig) -> Result<(), String> {
    validate_http_url("synthesis url", &synthesis.url)?;

    if synthesis.timeout_seconds == 0 {
        return Err("Synthesis timeout_seconds must be greater than 0".to_string());
    }
    if !synthesis.sentence_silence.is_finite() || synthesis.sentence_silence < 0.0 {
        return Err("Synthesis sentence_silence must be a non-negative number".to_string());
    }
    if let Some(scale) = synthesis.length_scale {
        if !scale.is_finite() || scale <= 0.0 {
            return Err("Synthesis length_scale must be greater than 0".to_string());
        }
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("Invalid {field} '{value}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!(
            "Invalid {field} '{value}': scheme must be http or https, got '{scheme}'"
        )),
    }
}
