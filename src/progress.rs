use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::chunker::ChunkStatus;

// @module: Thread-safe translation progress ledger

// @enum: Overall status of a translation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Done,
    Error,
}

// @struct: Per-chunk progress descriptor, index-aligned with partial results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkProgress {
    // @field: Chunk index within the run
    pub index: usize,

    // @field: Header label for display
    pub header: String,

    // @field: Chunk size in characters
    pub size: usize,

    // @field: Chunk status
    pub status: ChunkStatus,
}

impl ChunkProgress {
    pub fn new(index: usize, header: impl Into<String>, size: usize) -> Self {
        ChunkProgress {
            index,
            header: header.into(),
            size,
            status: ChunkStatus::Pending,
        }
    }
}

// @struct: Progress record of one translation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    // @field: Overall run status
    pub status: RunStatus,

    // @field: Total chunks planned for the run
    pub total_chunks: usize,

    // @field: Chunks completed so far, never decreasing
    pub chunks_completed: usize,

    // @field: Index of the chunk currently being processed
    pub current_chunk: usize,

    // @field: Per-chunk descriptors
    pub chunks_info: Vec<ChunkProgress>,

    // @field: Translated output per chunk, index-aligned with chunks_info
    pub partial_results: Vec<String>,

    // @field: Error message for failed runs
    pub error: Option<String>,
}

impl ProgressRecord {
    fn new() -> Self {
        ProgressRecord {
            status: RunStatus::Running,
            total_chunks: 0,
            chunks_completed: 0,
            current_chunk: 0,
            chunks_info: Vec::new(),
            partial_results: Vec::new(),
            error: None,
        }
    }
}

/// Thread-safe ledger mapping document identifiers to progress records.
///
/// One instance is shared between the translation workers (which mutate) and
/// status-polling callers (which read). All operations take a single coarse
/// lock; critical sections are O(1) map and vector mutations, translation
/// itself always happens outside the lock. Readers receive clones, never live
/// references. Misuse (unknown id or out-of-range index) is logged and
/// ignored so it can never abort a translation loop. Records live until
/// overwritten by the next run for the same id or explicitly cleared.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    records: Arc<Mutex<HashMap<String, ProgressRecord>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, ProgressRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("progress ledger mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Begin a fresh run for `id`, overwriting any prior record.
    pub fn start(&self, id: &str) {
        self.guard().insert(id.to_string(), ProgressRecord::new());
    }

    /// Declare the chunk plan for a running document. Pre-allocates one empty
    /// partial-result slot per chunk.
    pub fn set_total_chunks(&self, id: &str, total: usize, chunks: Vec<ChunkProgress>) {
        let mut records = self.guard();
        let Some(record) = records.get_mut(id) else {
            warn!("set_total_chunks for unknown document id: {}", id);
            return;
        };
        record.total_chunks = total;
        record.chunks_info = chunks;
        record.partial_results = vec![String::new(); total];
        record.chunks_completed = 0;
        record.current_chunk = 0;
    }

    /// Update one chunk's status in place.
    pub fn update_chunk_progress(&self, id: &str, index: usize, status: ChunkStatus) {
        let mut records = self.guard();
        let Some(record) = records.get_mut(id) else {
            warn!("update_chunk_progress for unknown document id: {}", id);
            return;
        };
        let Some(info) = record.chunks_info.get_mut(index) else {
            warn!("chunk index {} out of range for document {}", index, id);
            return;
        };
        info.status = status;
        if status == ChunkStatus::Processing {
            record.current_chunk = index;
        }
    }

    /// Store the translated text for a chunk and mark it completed.
    pub fn add_chunk_result(&self, id: &str, index: usize, text: &str) {
        let mut records = self.guard();
        let Some(record) = records.get_mut(id) else {
            warn!("add_chunk_result for unknown document id: {}", id);
            return;
        };
        if index >= record.partial_results.len() {
            warn!("result index {} out of range for document {}", index, id);
            return;
        }
        record.partial_results[index] = text.to_string();
        if let Some(info) = record.chunks_info.get_mut(index) {
            if info.status != ChunkStatus::Completed {
                info.status = ChunkStatus::Completed;
                record.chunks_completed = (record.chunks_completed + 1).min(record.total_chunks);
            }
        }
    }

    /// Mark a run finished.
    pub fn finish(&self, id: &str) {
        let mut records = self.guard();
        if let Some(record) = records.get_mut(id) {
            record.status = RunStatus::Done;
        } else {
            warn!("finish for unknown document id: {}", id);
        }
    }

    /// Mark a run failed. Partial results gathered before the failure remain
    /// available.
    pub fn error(&self, id: &str, message: &str) {
        let mut records = self.guard();
        if let Some(record) = records.get_mut(id) {
            record.status = RunStatus::Error;
            record.error = Some(message.to_string());
        } else {
            warn!("error for unknown document id: {}", id);
        }
    }

    /// Snapshot of one record, if any.
    pub fn get(&self, id: &str) -> Option<ProgressRecord> {
        self.guard().get(id).cloned()
    }

    /// Join of the non-empty stored results in index order, usable as a live
    /// preview before the run finishes.
    pub fn get_partial_results(&self, id: &str) -> String {
        let records = self.guard();
        match records.get(id) {
            Some(record) => record
                .partial_results
                .iter()
                .filter(|r| !r.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join("\n\n"),
            None => String::new(),
        }
    }

    /// Snapshot of every record.
    pub fn all(&self) -> HashMap<String, ProgressRecord> {
        self.guard().clone()
    }

    /// Drop the record for `id`. Returns whether a record existed.
    pub fn clear(&self, id: &str) -> bool {
        self.guard().remove(id).is_some()
    }

    /// Drop every record.
    pub fn clear_all(&self) {
        self.guard().clear();
    }
}
