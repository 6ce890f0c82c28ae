//! Receiver config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use quakewatch_core::error::{QuakeWatchError, Result};

pub use schema::{AlertLogSection, ReceiverConfig, ServerSection};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "QUAKEWATCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "quakewatch-receiver.yaml";

pub fn load_from_file(path: &str) -> Result<ReceiverConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| QuakeWatchError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ReceiverConfig> {
    let cfg: ReceiverConfig = serde_yaml::from_str(s)
        .map_err(|e| QuakeWatchError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config for the binary.
///
/// An explicit `QUAKEWATCH_CONFIG` must exist; a missing default file falls
/// back to built-in defaults.
pub fn load_from_env() -> Result<ReceiverConfig> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return load_from_file(&path);
    }
    match fs::metadata(DEFAULT_CONFIG_PATH) {
        Ok(_) => load_from_file(DEFAULT_CONFIG_PATH),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "no config file; using defaults");
            Ok(ReceiverConfig::default())
        }
        Err(e) => Err(QuakeWatchError::Config(format!("stat config failed: {e}"))),
    }
}
