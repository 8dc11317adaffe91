use std::future::Future;
use std::pin::Pin;

use auditorbit_protocol::{
    ConfirmEvidenceRequest, EvidenceRecord, InitEvidenceRequest, InitEvidenceResponse,
    RequestContext,
};

use crate::UploadError;

/// Boxed future returned by the storage seam.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Abstract storage front-end for evidence uploads.
///
/// The client crate implements this on top of the HTTP API; using a trait
/// keeps the controller decoupled from transport and testable with mocks.
/// Implementations must clone borrowed arguments before entering the async
/// block, since the returned future only borrows `self`.
pub trait StorageBackend: Send + Sync {
    /// `POST /evidence/init` — registers the upload and returns the
    /// presigned destination credentials.
    fn init_evidence(
        &self,
        ctx: &RequestContext,
        req: &InitEvidenceRequest,
    ) -> BoxFuture<'_, Result<InitEvidenceResponse, UploadError>>;

    /// Single `PUT` of the whole object body to the presigned URL.
    fn put_object(
        &self,
        upload_url: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<(), UploadError>>;

    /// Ranged `PUT` of one chunk (`Content-Range: bytes <offset>-..`).
    fn put_range(
        &self,
        upload_url: &str,
        offset: u64,
        total_size: u64,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<(), UploadError>>;

    /// `POST /evidence/{id}/confirm` — finalizes the upload.
    fn confirm_evidence(
        &self,
        ctx: &RequestContext,
        evidence_id: &str,
        req: &ConfirmEvidenceRequest,
    ) -> BoxFuture<'_, Result<EvidenceRecord, UploadError>>;

    /// `DELETE /evidence/{id}` — discards partial server-side state after a
    /// cancellation. Best-effort; the controller ignores failures.
    fn discard_evidence(
        &self,
        ctx: &RequestContext,
        evidence_id: &str,
    ) -> BoxFuture<'_, Result<(), UploadError>>;
}
