use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use auditorbit_protocol::{
    ConfirmEvidenceRequest, Destination, EvidenceRecord, FileMeta, InitEvidenceRequest,
    RequestContext, UploadProgress, UploadStatus,
};

use crate::UploadError;
use crate::storage::{BoxFuture, StorageBackend};
use crate::strategy::{ProgressSink, TransferContext, TransferOutcome, strategy_for};
use crate::types::{FileTransfer, UploadEvent, UploadOptions};
use crate::validation::validate;

const EVENT_BUFFER: usize = 256;

/// Orchestrates one evidence upload at a time: validate, request a
/// destination, move bytes through the selected strategy, confirm.
///
/// Events are delivered through the channel returned by
/// [`take_events`](Self::take_events). Exactly one terminal event —
/// `Completed`, `Failed`, or `Cancelled` — fires per transfer, and nothing
/// follows it. Starting a new transfer while one is non-terminal is
/// rejected; callers needing concurrent uploads create one controller per
/// upload.
pub struct UploadController {
    backend: Arc<dyn StorageBackend>,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
    current: Mutex<Option<Arc<FileTransfer>>>,
    controls: Mutex<Controls>,
}

/// Cooperative control signals for the active transfer, replaced on every
/// accepted `start`.
struct Controls {
    cancel: CancellationToken,
    pause_requested: Arc<AtomicBool>,
    resume_notify: Arc<Notify>,
}

impl Controls {
    fn fresh() -> Self {
        Self {
            cancel: CancellationToken::new(),
            pause_requested: Arc::new(AtomicBool::new(false)),
            resume_notify: Arc::new(Notify::new()),
        }
    }
}

impl UploadController {
    /// Creates a controller over the given storage backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        Self {
            backend,
            events_tx,
            events_rx: Some(events_rx),
            current: Mutex::new(None),
            controls: Mutex::new(Controls::fresh()),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Starts a new transfer.
    ///
    /// The file is validated synchronously before any network call: a
    /// rejected file fails immediately with `Validation` and the backend is
    /// never touched. On acceptance the transfer runs on a spawned task and
    /// the new transfer's id is returned.
    pub fn start(
        &self,
        ctx: RequestContext,
        engagement_id: impl Into<String>,
        file: FileMeta,
        data: Vec<u8>,
        destination: Destination,
        options: UploadOptions,
    ) -> Result<String, UploadError> {
        let mut current = self.current.lock().unwrap();
        if let Some(active) = current.as_ref()
            && !active.status().is_terminal()
        {
            return Err(UploadError::TransferActive);
        }

        let total = data.len() as u64;
        let transfer = Arc::new(FileTransfer::new(
            file.clone(),
            destination,
            options.strategy,
            total,
        ));

        transfer.set_status(UploadStatus::Validating);
        self.emit_sync(UploadEvent::StateChanged(UploadStatus::Validating));

        let checked = if file.size_bytes == 0 || data.is_empty() {
            Err(UploadError::Validation("file is empty".into()))
        } else {
            validate(&file, &options.rules)
        };
        if let Err(err) = checked {
            transfer.mark_failed(&err);
            *current = Some(transfer);
            warn!(file = %file.name, error = %err, "upload rejected before any network call");
            self.emit_sync(UploadEvent::Failed(err.clone()));
            return Err(err);
        }

        transfer.set_status(UploadStatus::RequestingDestination);
        self.emit_sync(UploadEvent::StateChanged(UploadStatus::RequestingDestination));

        let controls = {
            let mut guard = self.controls.lock().unwrap();
            *guard = Controls::fresh();
            (
                guard.cancel.clone(),
                Arc::clone(&guard.pause_requested),
                Arc::clone(&guard.resume_notify),
            )
        };

        let id = transfer.id();
        *current = Some(Arc::clone(&transfer));
        info!(transfer = %id, file = %file.name, size = total, "upload started");

        tokio::spawn(drive(DriveTask {
            backend: Arc::clone(&self.backend),
            transfer,
            ctx,
            engagement_id: engagement_id.into(),
            data,
            options,
            events_tx: self.events_tx.clone(),
            cancel: controls.0,
            pause_requested: controls.1,
            resume_notify: controls.2,
        }));

        Ok(id)
    }

    /// Requests a pause. Valid only while transferring; a no-op otherwise.
    ///
    /// The strategy suspends after its in-flight unit; already-transferred
    /// bytes are kept.
    pub fn pause(&self) {
        let Some(transfer) = self.transfer() else {
            return;
        };
        if transfer.status() != UploadStatus::InProgress {
            return;
        }
        let controls = self.controls.lock().unwrap();
        controls.pause_requested.store(true, Ordering::Relaxed);
        debug!(transfer = %transfer.id(), "pause requested");
    }

    /// Resumes a paused transfer. Valid only from `Paused`; a no-op
    /// otherwise.
    ///
    /// A resumable strategy continues from the recorded offset; the
    /// single-shot strategy restarts the body from zero.
    pub fn resume(&self) {
        let Some(transfer) = self.transfer() else {
            return;
        };
        if transfer.status() != UploadStatus::Paused {
            return;
        }
        let controls = self.controls.lock().unwrap();
        if controls.pause_requested.swap(false, Ordering::Relaxed) {
            controls.resume_notify.notify_one();
            debug!(transfer = %transfer.id(), "resume requested");
        }
    }

    /// Cancels the active transfer from any non-terminal state.
    ///
    /// The in-flight network operation is aborted, partial server-side
    /// state is discarded best-effort, and exactly one `Cancelled` event
    /// fires. No further events follow.
    pub fn cancel(&self) {
        let Some(transfer) = self.transfer() else {
            return;
        };
        if transfer.status().is_terminal() {
            return;
        }
        info!(transfer = %transfer.id(), "cancel requested");
        self.controls.lock().unwrap().cancel.cancel();
    }

    /// The current transfer, if any.
    pub fn transfer(&self) -> Option<Arc<FileTransfer>> {
        self.current.lock().unwrap().clone()
    }

    /// The current transfer's state; `Idle` before the first `start`.
    pub fn state(&self) -> UploadStatus {
        self.transfer()
            .map(|t| t.status())
            .unwrap_or(UploadStatus::Idle)
    }

    /// Progress snapshot of the current transfer.
    pub fn progress(&self) -> Option<UploadProgress> {
        self.transfer().map(|t| t.progress())
    }

    fn emit_sync(&self, event: UploadEvent) {
        if self.events_tx.try_send(event).is_err() {
            debug!("event receiver not keeping up, dropping event");
        }
    }
}

/// Everything the spawned drive task owns.
struct DriveTask {
    backend: Arc<dyn StorageBackend>,
    transfer: Arc<FileTransfer>,
    ctx: RequestContext,
    engagement_id: String,
    data: Vec<u8>,
    options: UploadOptions,
    events_tx: mpsc::Sender<UploadEvent>,
    cancel: CancellationToken,
    pause_requested: Arc<AtomicBool>,
    resume_notify: Arc<Notify>,
}

/// Runs the transfer to a terminal state and emits the one terminal event.
async fn drive(task: DriveTask) {
    let id = task.transfer.id();
    match run(&task).await {
        Ok(record) => {
            task.transfer.mark_completed();
            info!(transfer = %id, evidence = %record.id, "upload completed");
            let _ = task.events_tx.send(UploadEvent::Completed(record)).await;
        }
        Err(UploadError::Cancelled) => {
            task.transfer.mark_cancelled();
            if let Some(evidence_id) = task.transfer.evidence_id()
                && let Err(err) = task.backend.discard_evidence(&task.ctx, &evidence_id).await
            {
                warn!(transfer = %id, error = %err, "failed to discard cancelled evidence");
            }
            info!(transfer = %id, "upload cancelled");
            let _ = task.events_tx.send(UploadEvent::Cancelled).await;
        }
        Err(err) => {
            task.transfer.mark_failed(&err);
            warn!(transfer = %id, error = %err, "upload failed");
            let _ = task.events_tx.send(UploadEvent::Failed(err)).await;
        }
    }
}

async fn run(task: &DriveTask) -> Result<EvidenceRecord, UploadError> {
    let file = task.transfer.file();

    // 1. Request destination credentials.
    let init_req = InitEvidenceRequest {
        engagement_id: task.engagement_id.clone(),
        filename: file.name.clone(),
        mime_type: file.mime_type.clone(),
        size_bytes: Some(file.size_bytes as i64),
    };
    let credentials = with_retry("init", task, || {
        task.backend.init_evidence(&task.ctx, &init_req)
    })
    .await?;
    task.transfer.set_evidence_id(credentials.evidence_id.clone());
    debug!(
        transfer = %task.transfer.id(),
        evidence = %credentials.evidence_id,
        object_key = %credentials.object_key,
        "destination granted"
    );

    // 2. Move the bytes.
    set_state(task, UploadStatus::InProgress).await;
    let strategy = strategy_for(task.options.strategy, task.options.chunk_size);
    let progress = ProgressSink::new(&task.transfer, &task.events_tx);

    let mut attempt: u32 = 1;
    task.transfer.set_attempt(attempt);

    let receipt = loop {
        if task.cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        // A resumable strategy re-enters at the recorded offset; the
        // single-shot strategy always restarts the full body.
        let start_offset = if strategy.supports_resume() {
            task.transfer.transferred_bytes()
        } else {
            0
        };

        let outcome = strategy
            .transfer(TransferContext {
                backend: task.backend.as_ref(),
                credentials: &credentials,
                file: &file,
                data: &task.data,
                start_offset,
                cancel: &task.cancel,
                pause_requested: &task.pause_requested,
                progress: &progress,
            })
            .await;

        match outcome {
            Ok(TransferOutcome::Completed(receipt)) => break receipt,
            Ok(TransferOutcome::Suspended { offset }) => {
                debug!(transfer = %task.transfer.id(), offset, "transfer paused");
                set_state(task, UploadStatus::Paused).await;
                wait_for_resume(task).await?;
                set_state(task, UploadStatus::InProgress).await;
            }
            Err(err) if err.is_transient() && attempt < task.options.max_attempts => {
                let delay = task.options.retry.delay_for_attempt(attempt);
                warn!(
                    transfer = %task.transfer.id(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient transfer failure, retrying"
                );
                attempt += 1;
                task.transfer.set_attempt(attempt);
                sleep_or_cancel(task, delay).await?;
            }
            Err(err) => return Err(err),
        }
    };

    // A pause that raced transfer completion has nothing left to suspend.
    task.pause_requested.store(false, Ordering::Relaxed);
    debug!(
        transfer = %task.transfer.id(),
        bytes = receipt.bytes_transferred,
        checksum = %receipt.checksum,
        "transfer receipt"
    );

    // 3. Confirm.
    set_state(task, UploadStatus::Confirming).await;
    let confirm_req = ConfirmEvidenceRequest {
        size_bytes: Some(file.size_bytes as i64),
        mime_type: file.mime_type.clone(),
    };
    with_retry("confirm", task, || {
        task.backend
            .confirm_evidence(&task.ctx, &credentials.evidence_id, &confirm_req)
    })
    .await
}

/// Retries a transient-prone call up to the attempt budget.
///
/// Used for the init and confirm calls; their local try counts are not
/// recorded on the transfer — the `attempt` field tracks byte-transfer
/// tries only.
async fn with_retry<'a, T>(
    label: &'static str,
    task: &'a DriveTask,
    mut op: impl FnMut() -> BoxFuture<'a, Result<T, UploadError>>,
) -> Result<T, UploadError> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        if task.cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        let result = tokio::select! {
            _ = task.cancel.cancelled() => return Err(UploadError::Cancelled),
            result = op() => result,
        };
        match result {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < task.options.max_attempts => {
                let delay = task.options.retry.delay_for_attempt(attempt);
                warn!(op = label, attempt, error = %err, "transient failure, retrying");
                sleep_or_cancel(task, delay).await?;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn wait_for_resume(task: &DriveTask) -> Result<(), UploadError> {
    loop {
        tokio::select! {
            _ = task.cancel.cancelled() => return Err(UploadError::Cancelled),
            _ = task.resume_notify.notified() => {
                if !task.pause_requested.load(Ordering::Relaxed) {
                    return Ok(());
                }
                // Stale wake-up while still paused; keep waiting.
            }
        }
    }
}

async fn sleep_or_cancel(task: &DriveTask, delay: Duration) -> Result<(), UploadError> {
    tokio::select! {
        _ = task.cancel.cancelled() => Err(UploadError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

async fn set_state(task: &DriveTask, status: UploadStatus) {
    task.transfer.set_status(status);
    let _ = task
        .events_tx
        .send(UploadEvent::StateChanged(status))
        .await;
}
