//! Configuration module for the splice gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use splice_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

/// Default upload limit for the stretch endpoint (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// TLS configuration for HTTPS
#[derive(Debug, Clone, PartialEq)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Artifact storage settings
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    /// Directory holding stored artifacts
    pub dir: PathBuf,
    /// Age after which an artifact is removed by the sweep
    pub expiry_minutes: u64,
    /// Cadence of the background sweep
    pub sweep_interval_seconds: u64,
    /// File extension for stored artifacts (without the dot)
    pub extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./artifacts"),
            expiry_minutes: 20,
            sweep_interval_seconds: 60,
            extension: "wav".to_string(),
        }
    }
}

/// Voice engine settings
///
/// The VITS-style knobs are forwarded with every synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    /// OpenAI-compatible speech endpoint
    pub url: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub speaker_id: Option<u32>,
    pub length_scale: Option<f32>,
    pub noise_scale: Option<f32>,
    pub noise_w: Option<f32>,
    /// Seconds of silence after each sentence
    pub sentence_silence: f32,
    /// Per-request timeout for the voice engine
    pub timeout_seconds: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000/v1/audio/speech".to_string(),
            api_key: None,
            model: None,
            voice: None,
            speaker_id: None,
            length_scale: None,
            noise_scale: None,
            noise_w: None,
            sentence_silence: 0.0,
            timeout_seconds: 60,
        }
    }
}

/// Server configuration
///
/// Contains all configuration needed to run the gateway:
/// - Server settings (host, port, TLS, public URL, upload limit)
/// - Artifact storage (directory, expiry, sweep cadence)
/// - Voice engine endpoint and synthesis parameters
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    /// Prefix for artifact URLs handed to clients. Empty means relative URLs.
    pub public_base_url: String,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,

    pub storage: StorageConfig,
    pub synthesis: SynthesisConfig,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            tls: None,
            public_base_url: String::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            storage: StorageConfig::default(),
            synthesis: SynthesisConfig::default(),
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

/// Zeroize the voice engine key when the configuration is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.synthesis.api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // .env is loaded into the process environment in main.rs, so the
        // environment already reflects .env < actual ENV when we get here.
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    ///
    /// Unset variables fall back to defaults. The result is validated.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }
}
