use std::path::PathBuf;

use super::yaml::{TlsYaml, YamlConfig};
use super::{ServerConfig, TlsConfig, env};

/// Merge environment configuration (base) with YAML overrides.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = env::load_from_env()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(url) = server.public_base_url {
            config.public_base_url = url;
        }
        if let Some(limit) = server.max_upload_bytes {
            config.max_upload_bytes = limit;
        }
        if let Some(tls) = server.tls {
            config.tls = merge_tls(config.tls.take(), tls)?;
        }
    }

    if let Some(storage) = yaml.storage {
        if let Some(dir) = storage.dir {
            config.storage.dir = PathBuf::from(dir);
        }
        if let Some(minutes) = storage.expiry_minutes {
            config.storage.expiry_minutes = minutes;
        }
        if let Some(seconds) = storage.sweep_interval_seconds {
            config.storage.sweep_interval_seconds = seconds;
        }
        if let Some(extension) = storage.extension {
            config.storage.extension = extension;
        }
    }

    if let Some(synthesis) = yaml.synthesis {
        let target = &mut config.synthesis;
        if let Some(url) = synthesis.url {
            target.url = url;
        }
        if synthesis.api_key.is_some() {
            target.api_key = synthesis.api_key;
        }
        if synthesis.model.is_some() {
            target.model = synthesis.model;
        }
        if synthesis.voice.is_some() {
            target.voice = synthesis.voice;
        }
        if synthesis.speaker_id.is_some() {
            target.speaker_id = synthesis.speaker_id;
        }
        if synthesis.length_scale.is_some() {
            target.length_scale = synthesis.length_scale;
        }
        if synthesis.noise_scale.is_some() {
            target.noise_scale = synthesis.noise_scale;
        }
        if synthesis.noise_w.is_some() {
            target.noise_w = synthesis.noise_w;
        }
        if let Some(silence) = synthesis.sentence_silence {
            target.sentence_silence = silence;
        }
        if let Some(timeout) = synthesis.timeout_seconds {
            target.timeout_seconds = timeout;
        }
    }

    if let Some(security) = yaml.security {
        if security.cors_allowed_origins.is_some() {
            config.cors_allowed_origins = security.cors_allowed_origins;
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
    }

    Ok(config)
}

/// YAML paths override environment paths one by one; `enabled: false`
/// switches TLS off entirely.
fn merge_tls(base: Option<TlsConfig>, yaml: TlsYaml) -> Result<Option<TlsConfig>, String> {
    if yaml.enabled == Some(false) {
        return Ok(None);
    }

    let (base_cert, base_key) = match base {
        Some(tls) => (Some(tls.cert_path), Some(tls.key_path)),
        None => (None, None),
    };
    let cert = yaml.cert_path.map(PathBuf::from).or(base_cert);
    let key = yaml.key_path.map(PathBuf::from).or(base_key);

    match (cert, key) {
        (Some(cert_path), Some(key_path)) => Ok(Some(TlsConfig {
            cert_path,
            key_path,
        })),
        (None, None) if yaml.enabled != Some(true) => Ok(None),
        _ => Err("TLS requires both cert_path and key_path".to_string()),
    }
}
