//! Wire types for the AuditOrbit evidence storage API.
//!
//! The payload shapes here are fixed by the storage front-end contract:
//! `POST /evidence/init`, a direct `PUT` to the presigned URL, and
//! `POST /evidence/{id}/confirm`. Field names are snake_case on the wire.

pub mod evidence;
pub mod types;

pub use evidence::{
    ConfirmEvidenceRequest, DownloadLink, EvidenceRecord, InitEvidenceRequest,
    InitEvidenceResponse,
};
pub use types::{Destination, FileMeta, RequestContext, UploadProgress, UploadStatus};
