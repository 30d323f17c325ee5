//! Run history store
//!
//! Append-only log of every [`RunRecord`]. The store is the only shared
//! mutable resource during a benchmark: records are inserted one at a time as
//! each call completes and are never updated or deleted.
//!
//! Two implementations:
//! - [`JsonlHistoryStore`]: one JSON object per line on disk.
//! - [`MemoryHistoryStore`]: in-process, for tests and dry runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::record::RunRecord;

/// Result type alias for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors raised by a history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize run record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append/query interface over persisted runs.
#[async_trait]
pub trait RunHistory: Send + Sync {
    /// Persist a single record.
    async fn append(&self, record: &RunRecord) -> HistoryResult<()>;

    /// Every record in append order.
    async fn load_all(&self) -> HistoryResult<Vec<RunRecord>>;

    /// Number of records stored.
    async fn count(&self) -> HistoryResult<usize> {
        Ok(self.load_all().await?.len())
    }
}

/// Shared handle used by concurrent writers.
pub type SharedHistory = Arc<dyn RunHistory>;

/// JSONL-backed store.
///
/// Each record is written with a single `write_all` of one complete line.
/// In-process writers are serialised through a mutex so lines never
/// interleave.
pub struct JsonlHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlHistoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl RunHistory for JsonlHistoryStore {
    async fn append(&self, record: &RunRecord) -> HistoryResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_err(e))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_err(e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_err(e))?;
        file.flush().await.map_err(|e| self.io_err(e))?;

        debug!(path = %self.path.display(), model = %record.result.model, "appended run record");
        Ok(())
    }

    async fn load_all(&self) -> HistoryResult<Vec<RunRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };

        let mut records = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RunRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = lineno + 1,
                    "skipping unparsable history line: {e}"
                ),
            }
        }
        Ok(records)
    }
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<RunRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with existing records.
    pub fn with_records(records: Vec<RunRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl RunHistory for MemoryHistoryStore {
    async fn append(&self, record: &RunRecord) -> HistoryResult<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn load_all(&self) -> HistoryResult<Vec<RunRecord>> {
        Ok(self.records.lock().await.clone())
    }
}

/// Most recent record for each (model, puzzle) pair, ordered by model then
/// timestamp. Ties on timestamp keep the later-appended record.
pub fn latest_per_pair(records: &[RunRecord]) -> Vec<RunRecord> {
    let mut latest: HashMap<(&str, &str), &RunRecord> = HashMap::new();
    for record in records {
        let key = (record.result.model.as_str(), record.result.puzzle_id.as_str());
        match latest.get(&key) {
            Some(existing) if existing.timestamp > record.timestamp => {}
            _ => {
                latest.insert(key, record);
            }
        }
    }

    let mut selected: Vec<RunRecord> = latest.into_values().cloned().collect();
    selected.sort_by(|a, b| {
        a.result
            .model
            .cmp(&b.result.model)
            .then(a.timestamp.cmp(&b.timestamp))
            .then(a.result.puzzle_id.cmp(&b.result.puzzle_id))
    });
    selected
}
