use tracing::debug;

use crate::UploadError;
use crate::chunker::{ChunkSlicer, checksum_bytes};
use crate::storage::BoxFuture;
use crate::strategy::{TransferContext, TransferOutcome, TransferStrategy};
use crate::types::{StrategyKind, TransferReceipt};
use crate::DEFAULT_CHUNK_SIZE;

/// Moves the object as sequential byte ranges, one PUT per chunk.
///
/// Cancellation and pause requests are checked between chunks and before
/// each network call; a pause is honored after the in-flight chunk lands,
/// and `transfer` re-enters at `start_offset` so already-delivered bytes are
/// never resent. One chunk is in flight at a time, which keeps progress
/// offsets strictly non-decreasing.
pub struct ChunkedStrategy {
    chunk_size: usize,
}

impl ChunkedStrategy {
    /// Creates the strategy. A `chunk_size` of 0 selects
    /// [`DEFAULT_CHUNK_SIZE`].
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: if chunk_size == 0 {
                DEFAULT_CHUNK_SIZE
            } else {
                chunk_size
            },
        }
    }
}

impl TransferStrategy for ChunkedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Chunked
    }

    fn supports_resume(&self) -> bool {
        true
    }

    fn transfer<'a>(
        &'a self,
        ctx: TransferContext<'a>,
    ) -> BoxFuture<'a, Result<TransferOutcome, UploadError>> {
        Box::pin(async move {
            let total = ctx.data.len() as u64;
            let mut slicer = ChunkSlicer::new(ctx.data, self.chunk_size);
            slicer.seek_to(ctx.start_offset);

            loop {
                if ctx.cancel.is_cancelled() {
                    return Err(UploadError::Cancelled);
                }
                if ctx.pause_pending() {
                    debug!(offset = slicer.offset(), "suspending after in-flight chunk");
                    return Ok(TransferOutcome::Suspended {
                        offset: slicer.offset(),
                    });
                }

                let Some(chunk) = slicer.next_chunk() else {
                    break;
                };
                let offset = chunk.offset;
                let sent_through = offset + chunk.data.len() as u64;

                let put = ctx.backend.put_range(
                    &ctx.credentials.upload_url,
                    offset,
                    total,
                    ctx.file.mime_type.as_deref(),
                    chunk.data,
                );
                tokio::select! {
                    _ = ctx.cancel.cancelled() => return Err(UploadError::Cancelled),
                    result = put => result?,
                }

                debug!(offset, sent_through, total, "chunk delivered");
                ctx.progress.report(sent_through).await;
            }

            Ok(TransferOutcome::Completed(TransferReceipt {
                bytes_transferred: total,
                checksum: checksum_bytes(ctx.data),
            }))
        })
    }
}
