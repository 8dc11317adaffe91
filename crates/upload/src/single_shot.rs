use crate::UploadError;
use crate::chunker::checksum_bytes;
use crate::storage::BoxFuture;
use crate::strategy::{TransferContext, TransferOutcome, TransferStrategy};
use crate::types::{StrategyKind, TransferReceipt};

/// Moves the whole object body in one PUT.
///
/// The simplest strategy, and the default. It has no partial-resume
/// capability: after a pause or a transient failure the full body is sent
/// again from zero, so `start_offset` is ignored. A pause request can only
/// take effect before the request is issued; once the PUT is in flight it
/// runs to completion or aborts.
pub struct SingleShotStrategy;

impl TransferStrategy for SingleShotStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SingleShot
    }

    fn supports_resume(&self) -> bool {
        false
    }

    fn transfer<'a>(
        &'a self,
        ctx: TransferContext<'a>,
    ) -> BoxFuture<'a, Result<TransferOutcome, UploadError>> {
        Box::pin(async move {
            if ctx.cancel.is_cancelled() {
                return Err(UploadError::Cancelled);
            }
            if ctx.pause_pending() {
                return Ok(TransferOutcome::Suspended { offset: 0 });
            }

            let put = ctx.backend.put_object(
                &ctx.credentials.upload_url,
                ctx.file.mime_type.as_deref(),
                ctx.data.to_vec(),
            );
            tokio::select! {
                _ = ctx.cancel.cancelled() => return Err(UploadError::Cancelled),
                result = put => result?,
            }

            let total = ctx.data.len() as u64;
            ctx.progress.report(total).await;
            Ok(TransferOutcome::Completed(TransferReceipt {
                bytes_transferred: total,
                checksum: checksum_bytes(ctx.data),
            }))
        })
    }
}
