//! Alert ingestion: one console block and one file record per alert.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Local;

use quakewatch_core::alert::format;
use quakewatch_core::error::{QuakeWatchError, Result};
use quakewatch_core::{AlertBatch, Classification};

use crate::config::AlertLogSection;

use super::rotating::RotatingFile;

const BANNER_TIME: &str = "%Y-%m-%d %H:%M:%S";
const RECORD_TIME: &str = "%Y-%m-%d %H:%M:%S,%3f";

pub struct AlertIngestor {
    console: Mutex<Box<dyn Write + Send>>,
    file: RotatingFile,
}

impl AlertIngestor {
    pub fn new(file: RotatingFile, console: Box<dyn Write + Send>) -> Self {
        Self {
            console: Mutex::new(console),
            file,
        }
    }

    /// Build from config: stdout console (or none) plus the rotating log file.
    pub fn from_config(cfg: &AlertLogSection) -> Result<Self> {
        let file = RotatingFile::open(&cfg.path, cfg.max_bytes, cfg.backup_count)?;
        let console: Box<dyn Write + Send> = if cfg.console {
            Box::new(io::stdout())
        } else {
            Box::new(io::sink())
        };
        Ok(Self::new(file, console))
    }

    pub fn log_file(&self) -> &RotatingFile {
        &self.file
    }

    /// Write every alert of `batch` to both sinks. Returns the number of alerts.
    ///
    /// File writes complete before this returns. Console failures are logged
    /// and do not fail ingestion; file failures do.
    pub fn ingest(&self, batch: &AlertBatch, class: Classification) -> Result<usize> {
        let now = Local::now();
        let prefix = format!("{} - INFO - ", now.format(RECORD_TIME));

        // Held for the whole batch so concurrent batches do not interleave on the console.
        let mut console = self
            .console
            .lock()
            .map_err(|_| QuakeWatchError::Internal("console lock poisoned".into()))?;

        let banner = format::banner(class, &now.format(BANNER_TIME).to_string());
        write_console(&mut **console, &banner);

        for item in &batch.alerts {
            write_console(&mut **console, &format::console_block(item));
            let record = format::file_record(class, item, &prefix);
            self.file.append(record.as_bytes())?;
        }

        tracing::info!(classification = %class, alerts = batch.len(), "alert batch ingested");
        Ok(batch.len())
    }
}

fn write_console(out: &mut dyn Write, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        tracing::warn!(error = %e, "console write failed");
    }
}
