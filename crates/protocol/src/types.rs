use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a candidate file, taken when a transfer starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileMeta {
    /// Creates a snapshot with just a name and size.
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: None,
            last_modified: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }
}

/// Where transferred bytes should land: an object-storage bucket plus a
/// key prefix. Supplied by the caller and immutable for the transfer's
/// lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub bucket: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub object_key_prefix: String,
}

impl Destination {
    pub fn new(bucket: impl Into<String>, object_key_prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object_key_prefix: object_key_prefix.into(),
        }
    }
}

/// Current state of an evidence transfer, as seen across the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "validating")]
    Validating,
    #[serde(rename = "requesting_destination")]
    RequestingDestination,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "paused")]
    Paused,
    #[serde(rename = "confirming")]
    Confirming,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl UploadStatus {
    /// Terminal states admit no further transitions for that transfer.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Progress information for an active transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub transfer_id: String,
    pub status: UploadStatus,
    pub total_bytes: u64,
    pub transferred_bytes: u64,
    pub attempt: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl UploadProgress {
    /// Returns the transfer progress as a percentage (0-100).
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.transferred_bytes as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Per-request context threaded explicitly into every API call.
///
/// Replaces the ad-hoc "read the stored session token wherever a network
/// call happens" pattern: callers own the token and pass it down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub bearer_token: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }
}
