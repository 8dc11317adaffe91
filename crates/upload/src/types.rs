use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use auditorbit_protocol::{
    Destination, EvidenceRecord, FileMeta, UploadProgress, UploadStatus,
};

use crate::retry::RetryConfig;
use crate::validation::ValidationRules;
use crate::{DEFAULT_CHUNK_SIZE, UploadError};

/// Which byte-transfer mechanism a transfer uses. Chosen at start time,
/// immutable thereafter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// One whole-body PUT. No partial resume: a resumed or retried transfer
    /// restarts the full body from zero.
    #[default]
    SingleShot,
    /// Sequential ranged PUTs; resumable from the last confirmed offset.
    Chunked,
}

/// Proof of a completed byte transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub bytes_transferred: u64,
    /// SHA-256 hex digest of the full object.
    pub checksum: String,
}

/// Per-transfer options supplied to `start`.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub strategy: StrategyKind,
    /// Total tries allowed per network operation, including the first.
    pub max_attempts: u32,
    pub chunk_size: usize,
    pub retry: RetryConfig,
    pub rules: ValidationRules,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            max_attempts: 3,
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry: RetryConfig::default(),
            rules: ValidationRules::default().with_max_size_mb(50),
        }
    }
}

/// Events emitted by the controller while a transfer runs.
///
/// `Completed`, `Failed`, and `Cancelled` are terminal: exactly one of them
/// fires per transfer, and nothing follows it.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// A non-terminal state transition.
    StateChanged(UploadStatus),
    /// Fired on every `transferred_bytes` update.
    Progress {
        transferred_bytes: u64,
        total_bytes: u64,
    },
    Completed(EvidenceRecord),
    Failed(UploadError),
    Cancelled,
}

/// One upload attempt's lifecycle state (thread-safe snapshot).
///
/// Created by `start`, mutated only by the controller, garbage-eligible
/// once the consumer drops its handle after a terminal state.
pub struct FileTransfer {
    inner: RwLock<TransferInner>,
}

struct TransferInner {
    id: String,
    file: FileMeta,
    destination: Destination,
    strategy: StrategyKind,
    status: UploadStatus,
    total_bytes: u64,
    transferred_bytes: u64,
    attempt: u32,
    error: String,
    evidence_id: Option<String>,
}

impl FileTransfer {
    pub(crate) fn new(
        file: FileMeta,
        destination: Destination,
        strategy: StrategyKind,
        total_bytes: u64,
    ) -> Self {
        Self {
            inner: RwLock::new(TransferInner {
                id: uuid::Uuid::new_v4().to_string(),
                file,
                destination,
                strategy,
                status: UploadStatus::Idle,
                total_bytes,
                transferred_bytes: 0,
                attempt: 0,
                error: String::new(),
                evidence_id: None,
            }),
        }
    }

    pub fn id(&self) -> String {
        self.inner.read().unwrap().id.clone()
    }

    pub fn file(&self) -> FileMeta {
        self.inner.read().unwrap().file.clone()
    }

    pub fn destination(&self) -> Destination {
        self.inner.read().unwrap().destination.clone()
    }

    pub fn strategy(&self) -> StrategyKind {
        self.inner.read().unwrap().strategy
    }

    pub fn status(&self) -> UploadStatus {
        self.inner.read().unwrap().status
    }

    pub fn total_bytes(&self) -> u64 {
        self.inner.read().unwrap().total_bytes
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.inner.read().unwrap().transferred_bytes
    }

    /// Retry counter: how many tries the byte transfer has consumed.
    /// Reset only by a new `start`.
    pub fn attempt(&self) -> u32 {
        self.inner.read().unwrap().attempt
    }

    /// The server-side evidence id, once the init call has succeeded.
    pub fn evidence_id(&self) -> Option<String> {
        self.inner.read().unwrap().evidence_id.clone()
    }

    /// Returns current progress as a UI-facing snapshot.
    pub fn progress(&self) -> UploadProgress {
        let inner = self.inner.read().unwrap();
        UploadProgress {
            transfer_id: inner.id.clone(),
            status: inner.status,
            total_bytes: inner.total_bytes,
            transferred_bytes: inner.transferred_bytes,
            attempt: inner.attempt,
            error: inner.error.clone(),
        }
    }

    pub(crate) fn set_status(&self, status: UploadStatus) {
        self.inner.write().unwrap().status = status;
    }

    pub(crate) fn set_attempt(&self, attempt: u32) {
        self.inner.write().unwrap().attempt = attempt;
    }

    pub(crate) fn set_evidence_id(&self, evidence_id: String) {
        self.inner.write().unwrap().evidence_id = Some(evidence_id);
    }

    /// Records an absolute transferred-byte count. Monotonic: a stale or
    /// restarted report never lowers the recorded value.
    pub(crate) fn record_progress(&self, transferred_bytes: u64) {
        let mut inner = self.inner.write().unwrap();
        inner.transferred_bytes = inner.transferred_bytes.max(transferred_bytes);
    }

    pub(crate) fn mark_completed(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.status = UploadStatus::Completed;
        inner.transferred_bytes = inner.total_bytes;
    }

    pub(crate) fn mark_failed(&self, error: &UploadError) {
        let mut inner = self.inner.write().unwrap();
        inner.status = UploadStatus::Failed;
        inner.error = error.to_string();
    }

    pub(crate) fn mark_cancelled(&self) {
        self.inner.write().unwrap().status = UploadStatus::Cancelled;
    }
}
