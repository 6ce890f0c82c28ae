//! Shared application state for the alert receiver.
//!
//! The metric registry and the ingestor are built once here and handed to
//! every handler through axum `State`.

use std::sync::Arc;

use quakewatch_core::error::Result;

use crate::config::ReceiverConfig;
use crate::ingest::AlertIngestor;
use crate::obs::ReceiverMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<ReceiverMetrics>,
    ingestor: Arc<AlertIngestor>,
}

struct AppStateInner {
    cfg: ReceiverConfig,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can report a log file that cannot be opened.
    pub fn new(cfg: ReceiverConfig) -> Result<Self> {
        let ingestor = AlertIngestor::from_config(&cfg.alert_log)?;
        Ok(Self::from_parts(cfg, ingestor, ReceiverMetrics::new()))
    }

    pub fn from_parts(cfg: ReceiverConfig, ingestor: AlertIngestor, metrics: ReceiverMetrics) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            metrics: Arc::new(metrics),
            ingestor: Arc::new(ingestor),
        }
    }

    pub fn cfg(&self) -> &ReceiverConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &Arc<ReceiverMetrics> {
        &self.metrics
    }

    pub fn ingestor(&self) -> Arc<AlertIngestor> {
        Arc::clone(&self.ingestor)
    }
}
