//! Append-only beacon log
//!
//! One compact JSON object per line. Writers only ever append; readers keep
//! a bounded window of the newest lines and parse those.

use crate::error::{Result, StoreError};
use seekbeacon_core::Beacon;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Result of a bounded tail read. `records` are oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TailRead<T> {
    pub records: Vec<T>,
    /// Lines in the window that were not valid UTF-8 JSON of the requested shape.
    pub malformed: usize,
}

impl<T> Default for TailRead<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            malformed: 0,
        }
    }
}

impl<T> TailRead<T> {
    /// Non-blank lines considered.
    pub fn scanned(&self) -> usize {
        self.records.len() + self.malformed
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BeaconStore {
    path: PathBuf,
}

impl BeaconStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, beacon: &Beacon) -> Result<()> {
        self.append_record(beacon)
    }

    /// Append any serializable record as one line, creating parent directories.
    pub fn append_record<T: Serialize>(&self, record: &T) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        // Single write so concurrent appenders do not interleave within a line.
        file.write_all(&line).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    /// Parse up to the last `max` non-blank lines as `T`.
    ///
    /// A missing file is an empty read. Bad lines are counted, never fatal.
    pub fn read_recent<T: DeserializeOwned>(&self, max: usize) -> Result<TailRead<T>> {
        let Some(lines) = self.tail_lines(max)? else {
            return Ok(TailRead::default());
        };

        let mut out = TailRead::default();
        for raw in lines {
            let parsed = std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| serde_json::from_str::<T>(s.trim()).ok());
            match parsed {
                Some(record) => out.records.push(record),
                None => out.malformed += 1,
            }
        }
        Ok(out)
    }

    /// Last `max` non-blank raw lines, or `None` if the file does not exist.
    fn tail_lines(&self, max: usize) -> Result<Option<VecDeque<Vec<u8>>>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let mut reader = BufReader::new(file);
        let mut window: VecDeque<Vec<u8>> = VecDeque::with_capacity(max.min(1024));
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| StoreError::io(&self.path, e))?;
            if n == 0 {
                break;
            }
            if max == 0 || buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            if window.len() == max {
                window.pop_front();
            }
            window.push_back(buf.clone());
        }
        Ok(Some(window))
    }
}
