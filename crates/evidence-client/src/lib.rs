//! HTTP client for the evidence storage front-end.
//!
//! Async `reqwest` client for the init/confirm endpoints plus the direct
//! presigned-URL PUTs. Implements the upload crate's storage seam, mapping
//! HTTP failures onto the transfer error taxonomy.

mod client;

pub use client::{Error, EvidenceClient};
