//! Helpers shared by the receiver integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use quakewatch_receiver::app_state::AppState;
use quakewatch_receiver::config::ReceiverConfig;
use quakewatch_receiver::ingest::{AlertIngestor, RotatingFile};
use quakewatch_receiver::obs::ReceiverMetrics;

/// Console stand-in that keeps everything written to it.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn ingestor(log_path: &Path) -> (AlertIngestor, Captured) {
    rotating_ingestor(log_path, 1_000_000, 5)
}

pub fn rotating_ingestor(log_path: &Path, max_bytes: u64, backups: usize) -> (AlertIngestor, Captured) {
    let console = Captured::default();
    let file = RotatingFile::open(log_path, max_bytes, backups).unwrap();
    (AlertIngestor::new(file, Box::new(console.clone())), console)
}

pub fn app_state(log_path: &Path) -> (AppState, Captured) {
    app_state_with(log_path, 1_000_000, 5)
}

pub fn app_state_with(log_path: &Path, max_bytes: u64, backups: usize) -> (AppState, Captured) {
    let (ingestor, console) = rotating_ingestor(log_path, max_bytes, backups);
    let state = AppState::from_parts(ReceiverConfig::default(), ingestor, ReceiverMetrics::new());
    (state, console)
}
