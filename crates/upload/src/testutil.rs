//! Scripted storage backend for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use auditorbit_protocol::{
    ConfirmEvidenceRequest, EvidenceRecord, InitEvidenceRequest, InitEvidenceResponse,
    RequestContext,
};

use crate::UploadError;
use crate::storage::{BoxFuture, StorageBackend};

/// Mock backend with per-endpoint result scripts and call recording.
///
/// Scripted results are consumed front-to-back; when a script is empty the
/// call succeeds with a canned response. An optional semaphore gates
/// `put_range` so tests can hold chunks in flight deterministically.
pub(crate) struct MockBackend {
    pub init_results: Mutex<Vec<Result<InitEvidenceResponse, UploadError>>>,
    pub put_object_results: Mutex<Vec<Result<(), UploadError>>>,
    pub put_range_results: Mutex<Vec<Result<(), UploadError>>>,
    pub confirm_results: Mutex<Vec<Result<EvidenceRecord, UploadError>>>,
    pub init_calls: AtomicUsize,
    /// Body sizes of completed `put_object` calls.
    pub put_objects: Mutex<Vec<usize>>,
    /// `(offset, body size)` of completed `put_range` calls.
    pub put_ranges: Mutex<Vec<(u64, usize)>>,
    pub confirm_calls: AtomicUsize,
    pub discard_calls: AtomicUsize,
    pub range_gate: Option<Arc<Semaphore>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            init_results: Mutex::new(Vec::new()),
            put_object_results: Mutex::new(Vec::new()),
            put_range_results: Mutex::new(Vec::new()),
            confirm_results: Mutex::new(Vec::new()),
            init_calls: AtomicUsize::new(0),
            put_objects: Mutex::new(Vec::new()),
            put_ranges: Mutex::new(Vec::new()),
            confirm_calls: AtomicUsize::new(0),
            discard_calls: AtomicUsize::new(0),
            range_gate: None,
        }
    }

    pub fn with_range_gate(gate: Arc<Semaphore>) -> Self {
        Self {
            range_gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn credentials() -> InitEvidenceResponse {
        InitEvidenceResponse {
            evidence_id: "ev-1".into(),
            bucket: "auditorbit".into(),
            object_key: "eng/e1/obj_scan.pdf".into(),
            upload_url: "https://storage.test/put?sig=x".into(),
        }
    }

    pub fn record() -> EvidenceRecord {
        EvidenceRecord {
            id: "ev-1".into(),
            filename: "scan.pdf".into(),
            mime_type: Some("application/pdf".into()),
            size_bytes: Some(1024),
            status: "uploaded".into(),
            created_at: "2025-11-02T10:00:00+00".into(),
        }
    }

    fn pop<T>(script: &Mutex<Vec<Result<T, UploadError>>>) -> Option<Result<T, UploadError>> {
        let mut scripted = script.lock().unwrap();
        if scripted.is_empty() {
            None
        } else {
            Some(scripted.remove(0))
        }
    }
}

impl StorageBackend for MockBackend {
    fn init_evidence(
        &self,
        _ctx: &RequestContext,
        _req: &InitEvidenceRequest,
    ) -> BoxFuture<'_, Result<InitEvidenceResponse, UploadError>> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = Self::pop(&self.init_results);
        Box::pin(async move { scripted.unwrap_or_else(|| Ok(Self::credentials())) })
    }

    fn put_object(
        &self,
        _upload_url: &str,
        _content_type: Option<&str>,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<(), UploadError>> {
        let scripted = Self::pop(&self.put_object_results);
        Box::pin(async move {
            let result = scripted.unwrap_or(Ok(()));
            if result.is_ok() {
                self.put_objects.lock().unwrap().push(body.len());
            }
            result
        })
    }

    fn put_range(
        &self,
        _upload_url: &str,
        offset: u64,
        _total_size: u64,
        _content_type: Option<&str>,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<(), UploadError>> {
        let scripted = Self::pop(&self.put_range_results);
        Box::pin(async move {
            if let Some(gate) = &self.range_gate {
                let permit = gate
                    .acquire()
                    .await
                    .map_err(|_| UploadError::Transient("gate closed".into()))?;
                permit.forget();
            }
            let result = scripted.unwrap_or(Ok(()));
            if result.is_ok() {
                self.put_ranges.lock().unwrap().push((offset, body.len()));
            }
            result
        })
    }

    fn confirm_evidence(
        &self,
        _ctx: &RequestContext,
        _evidence_id: &str,
        _req: &ConfirmEvidenceRequest,
    ) -> BoxFuture<'_, Result<EvidenceRecord, UploadError>> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = Self::pop(&self.confirm_results);
        Box::pin(async move { scripted.unwrap_or_else(|| Ok(Self::record())) })
    }

    fn discard_evidence(
        &self,
        _ctx: &RequestContext,
        _evidence_id: &str,
    ) -> BoxFuture<'_, Result<(), UploadError>> {
        self.discard_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(()) })
    }
}
