use std::net::SocketAddr;

use serde::Deserialize;
use quakewatch_core::error::{QuakeWatchError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiverConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub alert_log: AlertLogSection,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            alert_log: AlertLogSection::default(),
        }
    }
}

impl ReceiverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(QuakeWatchError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.alert_log.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            QuakeWatchError::Config(format!("server.listen must be a socket address: {e}"))
        })
    }
}

/// Upper bound on retained generations; rotation walks every slot under the log lock.
pub const MAX_BACKUP_COUNT: usize = 1000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertLogSection {
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Rotate once the active file would reach this size. 0 disables rotation.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Rotated generations kept. 0 disables rotation.
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,

    /// Echo alerts to stdout.
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for AlertLogSection {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            max_bytes: default_max_bytes(),
            backup_count: default_backup_count(),
            console: default_console(),
        }
    }
}

impl AlertLogSection {
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(QuakeWatchError::Config("alert_log.path must not be empty".into()));
        }
        if self.backup_count > MAX_BACKUP_COUNT {
            return Err(QuakeWatchError::Config(format!(
                "alert_log.backup_count must be at most {MAX_BACKUP_COUNT}"
            )));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:5001".into()
}
fn default_log_path() -> String {
    "alert_logs.log".into()
}
fn default_max_bytes() -> u64 {
    1_000_000
}
fn default_backup_count() -> usize {
    5
}
fn default_console() -> bool {
    true
}
