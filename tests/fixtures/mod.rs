//! Test Fixtures Module
//!
//! This module provides test fixtures for splice gateway testing:
//! - Audio fixtures (programmatically generated WAV data)
//! - Voice engine doubles
//! - Configuration fixtures

// Allow dead code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]

pub mod audio_fixtures;
pub mod synth_fixtures;

pub use audio_fixtures::*;
pub use synth_fixtures::*;

use std::path::Path;

use splice_gateway::ServerConfig;

/// Configuration with storage under `storage_dir` and everything else default
pub fn test_config(storage_dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.public_base_url = "http://localhost:5000".to_string();
    config.storage.dir = storage_dir.to_path_buf();
    config
}
