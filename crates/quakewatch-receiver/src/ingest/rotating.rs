//! Size-rotated append-only log file.
//!
//! Layout: `<path>` is the active file, `<path>.1` the most recent backup, up
//! to `<path>.<backup_count>`. Append and rotation share one mutex, so a record
//! is written whole into exactly one generation.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use quakewatch_core::error::{QuakeWatchError, Result};

struct ActiveFile {
    file: File,
    size: u64,
}

pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    active: Mutex<ActiveFile>,
}

impl RotatingFile {
    /// Open (or create) `path` for appending.
    ///
    /// Rotation is disabled when `max_bytes` or `backup_count` is zero.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let active = open_active(&path)?;
        Ok(Self {
            path,
            max_bytes,
            backup_count,
            active: Mutex::new(active),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of backup generation `n` (1 = most recent).
    pub fn backup_path(&self, n: usize) -> PathBuf {
        let mut s: OsString = self.path.as_os_str().to_owned();
        s.push(format!(".{n}"));
        PathBuf::from(s)
    }

    /// Append one record, rotating first if it would reach `max_bytes`.
    /// Returns once the bytes are handed to the OS.
    pub fn append(&self, record: &[u8]) -> Result<()> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| QuakeWatchError::Internal("alert log lock poisoned".into()))?;

        if self.should_rotate(active.size, record.len() as u64) {
            self.rotate(&mut active)?;
        }

        active.file.write_all(record)?;
        active.file.flush()?;
        active.size += record.len() as u64;
        Ok(())
    }

    fn should_rotate(&self, size: u64, incoming: u64) -> bool {
        self.max_bytes > 0 && self.backup_count > 0 && size > 0 && size + incoming >= self.max_bytes
    }

    fn rotate(&self, active: &mut ActiveFile) -> Result<()> {
        let oldest = self.backup_path(self.backup_count);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.backup_count).rev() {
            let src = self.backup_path(n);
            if src.exists() {
                fs::rename(&src, self.backup_path(n + 1))?;
            }
        }
        // The active file may have been removed externally; reopen regardless.
        if self.path.exists() {
            fs::rename(&self.path, self.backup_path(1))?;
        }
        *active = open_active(&self.path)?;

        tracing::debug!(path = %self.path.display(), backups = self.backup_count, "alert log rotated");
        Ok(())
    }
}

fn open_active(path: &Path) -> Result<ActiveFile> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok(ActiveFile { file, size })
}
