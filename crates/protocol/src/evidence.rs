use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Registers a pending evidence upload and requests a presigned destination.
///
/// `POST /evidence/init`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitEvidenceRequest {
    pub engagement_id: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
}

/// Finalizes an evidence upload after the bytes have landed.
///
/// `POST /evidence/{id}/confirm`. Both fields are optional; the server keeps
/// whatever it already recorded when a field is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmEvidenceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Upload credentials returned by the init endpoint.
///
/// `upload_url` is a presigned PUT URL; `bucket`/`object_key` identify where
/// the bytes will land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitEvidenceResponse {
    pub evidence_id: String,
    pub bucket: String,
    pub object_key: String,
    pub upload_url: String,
}

/// An evidence record as returned by confirm and the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    pub status: String,
    pub created_at: String,
}

/// A short-lived download URL for a stored evidence object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub url: String,
}
