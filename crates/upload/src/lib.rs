//! Resumable evidence upload pipeline.
//!
//! A caller hands [`UploadController::start`] a file snapshot, its bytes,
//! and a destination descriptor. The controller validates the file before
//! any network I/O, requests upload credentials from the storage front-end,
//! moves the bytes through the selected [`TransferStrategy`], and finalizes
//! with a confirmation call. Pause, resume, and cancel are cooperative;
//! transient failures retry with exponential backoff.

mod chunked;
mod chunker;
mod controller;
mod retry;
mod single_shot;
mod storage;
mod strategy;
#[cfg(test)]
mod testutil;
mod types;
mod validation;

pub use chunked::ChunkedStrategy;
pub use chunker::{Chunk, ChunkSlicer, checksum_bytes};
pub use controller::UploadController;
pub use retry::RetryConfig;
pub use single_shot::SingleShotStrategy;
pub use storage::{BoxFuture, StorageBackend};
pub use strategy::{
    ProgressSink, TransferContext, TransferOutcome, TransferStrategy, strategy_for,
};
pub use types::{
    FileTransfer, StrategyKind, TransferReceipt, UploadEvent, UploadOptions,
};
pub use validation::{ValidationRules, validate};

/// Default chunk size for the chunked strategy: 4 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Errors produced by the upload pipeline.
///
/// The variants are the failure taxonomy: validation and destination errors
/// are terminal immediately, transient errors are retried up to the attempt
/// budget, and cancellation is terminal but distinct from failure so the UI
/// can stay quiet about it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// Pre-flight check failed; no network call was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Network-level failure or a 5xx response; retried with backoff.
    #[error("transfer error: {0}")]
    Transient(String),

    /// The destination rejected the request (4xx); never retried.
    #[error("destination rejected request ({status}): {message}")]
    Destination { status: u16, message: String },

    /// User-initiated cancellation.
    #[error("cancelled")]
    Cancelled,

    /// A transfer is already active on this controller.
    #[error("another transfer is already active")]
    TransferActive,
}

impl UploadError {
    /// Whether the retry policy applies to this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, UploadError::Transient(_))
    }
}
