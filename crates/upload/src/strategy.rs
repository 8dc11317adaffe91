use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use auditorbit_protocol::{FileMeta, InitEvidenceResponse};

use crate::chunked::ChunkedStrategy;
use crate::single_shot::SingleShotStrategy;
use crate::storage::{BoxFuture, StorageBackend};
use crate::types::{FileTransfer, StrategyKind, TransferReceipt, UploadEvent};
use crate::UploadError;

/// Reports absolute transferred-byte counts: updates the transfer snapshot
/// and forwards a progress event to the consumer.
pub struct ProgressSink<'a> {
    transfer: &'a FileTransfer,
    events_tx: &'a mpsc::Sender<UploadEvent>,
}

impl<'a> ProgressSink<'a> {
    pub(crate) fn new(
        transfer: &'a FileTransfer,
        events_tx: &'a mpsc::Sender<UploadEvent>,
    ) -> Self {
        Self {
            transfer,
            events_tx,
        }
    }

    /// Records `transferred_bytes` (absolute, not a delta) and emits a
    /// progress event.
    pub async fn report(&self, transferred_bytes: u64) {
        self.transfer.record_progress(transferred_bytes);
        let _ = self
            .events_tx
            .send(UploadEvent::Progress {
                transferred_bytes: self.transfer.transferred_bytes(),
                total_bytes: self.transfer.total_bytes(),
            })
            .await;
    }
}

/// Everything one `transfer` call needs: the source, the credentials, and
/// the cooperative control signals.
pub struct TransferContext<'a> {
    pub backend: &'a dyn StorageBackend,
    pub credentials: &'a InitEvidenceResponse,
    pub file: &'a FileMeta,
    pub data: &'a [u8],
    /// Byte offset to re-enter at. Strategies without resume support ignore
    /// it and send the full body.
    pub start_offset: u64,
    pub cancel: &'a CancellationToken,
    /// Set by `pause()`; checked between units of work.
    pub pause_requested: &'a Arc<AtomicBool>,
    pub progress: &'a ProgressSink<'a>,
}

impl TransferContext<'_> {
    pub(crate) fn pause_pending(&self) -> bool {
        self.pause_requested.load(Ordering::Relaxed)
    }
}

/// How a `transfer` call ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// All bytes landed; the receipt carries the totals.
    Completed(TransferReceipt),
    /// A pause request was honored after the in-flight unit. `offset` is
    /// where a resumable strategy would re-enter.
    Suspended { offset: u64 },
}

/// Pluggable byte-transfer mechanism.
///
/// Implementations must honor cooperative cancellation via
/// `ctx.cancel`, check `ctx.pause_requested` between units of work, and
/// report monotonically increasing progress.
pub trait TransferStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Whether a paused or retried transfer can re-enter at
    /// `start_offset` instead of resending from zero.
    fn supports_resume(&self) -> bool;

    fn transfer<'a>(
        &'a self,
        ctx: TransferContext<'a>,
    ) -> BoxFuture<'a, Result<TransferOutcome, UploadError>>;
}

/// Builds the strategy for `kind`.
pub fn strategy_for(kind: StrategyKind, chunk_size: usize) -> Box<dyn TransferStrategy> {
    match kind {
        StrategyKind::SingleShot => Box::new(SingleShotStrategy),
        StrategyKind::Chunked => Box::new(ChunkedStrategy::new(chunk_size)),
    }
}
