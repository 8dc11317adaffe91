use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;

use auditorbit_protocol::{
    ConfirmEvidenceRequest, DownloadLink, EvidenceRecord, InitEvidenceRequest,
    InitEvidenceResponse, RequestContext,
};
use auditorbit_upload::{BoxFuture, StorageBackend, UploadError};

/// Errors from the evidence client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Evidence storage API client.
///
/// Authentication is not client state: the bearer token travels in the
/// [`RequestContext`] threaded into each call, so one client serves any
/// number of callers.
pub struct EvidenceClient {
    http: reqwest::Client,
    base_url: String,
}

impl EvidenceClient {
    /// Creates a client against `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Creates a client reusing an existing `reqwest` client.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// `POST /evidence/init` — registers the upload, returns credentials.
    pub async fn init_evidence(
        &self,
        ctx: &RequestContext,
        req: &InitEvidenceRequest,
    ) -> Result<InitEvidenceResponse, Error> {
        let url = format!("{}/evidence/init", self.base_url);
        debug!(filename = %req.filename, engagement = %req.engagement_id, "init evidence");
        send_json(authorized(self.http.post(&url), ctx).json(req)).await
    }

    /// `POST /evidence/{id}/confirm` — finalizes the upload.
    pub async fn confirm_evidence(
        &self,
        ctx: &RequestContext,
        evidence_id: &str,
        req: &ConfirmEvidenceRequest,
    ) -> Result<EvidenceRecord, Error> {
        let url = format!("{}/evidence/{evidence_id}/confirm", self.base_url);
        send_json(authorized(self.http.post(&url), ctx).json(req)).await
    }

    /// `GET /evidence?engagement_id=` — lists an engagement's evidence.
    pub async fn list_evidence(
        &self,
        ctx: &RequestContext,
        engagement_id: &str,
    ) -> Result<Vec<EvidenceRecord>, Error> {
        let url = format!("{}/evidence", self.base_url);
        let request = authorized(self.http.get(&url), ctx).query(&[("engagement_id", engagement_id)]);
        send_json(request).await
    }

    /// `GET /evidence/{id}/download` — returns a short-lived download URL.
    pub async fn download_link(
        &self,
        ctx: &RequestContext,
        evidence_id: &str,
    ) -> Result<DownloadLink, Error> {
        let url = format!("{}/evidence/{evidence_id}/download", self.base_url);
        send_json(authorized(self.http.get(&url), ctx)).await
    }

    /// `DELETE /evidence/{id}` — removes the record and its object.
    pub async fn delete_evidence(
        &self,
        ctx: &RequestContext,
        evidence_id: &str,
    ) -> Result<(), Error> {
        let url = format!("{}/evidence/{evidence_id}", self.base_url);
        expect_success(authorized(self.http.delete(&url), ctx)).await
    }

    /// Direct whole-body `PUT` to a presigned URL.
    pub async fn put_object(
        &self,
        upload_url: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Result<(), Error> {
        let mut request = self.http.put(upload_url).body(body);
        if let Some(ct) = content_type {
            request = request.header(CONTENT_TYPE, ct);
        }
        expect_success(request).await
    }

    /// Ranged `PUT` of one chunk to a presigned URL.
    pub async fn put_range(
        &self,
        upload_url: &str,
        offset: u64,
        total_size: u64,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Result<(), Error> {
        let end = offset + body.len() as u64 - 1;
        let mut request = self
            .http
            .put(upload_url)
            .header(CONTENT_RANGE, format!("bytes {offset}-{end}/{total_size}"))
            .body(body);
        if let Some(ct) = content_type {
            request = request.header(CONTENT_TYPE, ct);
        }
        expect_success(request).await
    }
}

/// Attaches the context's bearer token, when present.
fn authorized(
    request: reqwest::RequestBuilder,
    ctx: &RequestContext,
) -> reqwest::RequestBuilder {
    match &ctx.bearer_token {
        Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
        None => request,
    }
}

/// Sends a request and deserializes a successful JSON response.
async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, Error> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Sends a request, requiring a success status and ignoring the body.
async fn expect_success(request: reqwest::RequestBuilder) -> Result<(), Error> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}

/// Maps client failures onto the transfer error taxonomy: 4xx responses are
/// destination rejections, everything else is transient and retryable.
fn map_err(err: Error) -> UploadError {
    match err {
        Error::Api { status, body } if (400..500).contains(&status) => UploadError::Destination {
            status,
            message: body,
        },
        Error::Api { status, body } => {
            UploadError::Transient(format!("HTTP {status}: {body}"))
        }
        Error::Http(err) => UploadError::Transient(err.to_string()),
        Error::Json(err) => UploadError::Transient(format!("malformed response: {err}")),
    }
}

impl StorageBackend for EvidenceClient {
    fn init_evidence(
        &self,
        ctx: &RequestContext,
        req: &InitEvidenceRequest,
    ) -> BoxFuture<'_, Result<InitEvidenceResponse, UploadError>> {
        let ctx = ctx.clone();
        let req = req.clone();
        Box::pin(async move { self.init_evidence(&ctx, &req).await.map_err(map_err) })
    }

    fn put_object(
        &self,
        upload_url: &str,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<(), UploadError>> {
        let upload_url = upload_url.to_string();
        let content_type = content_type.map(str::to_string);
        Box::pin(async move {
            self.put_object(&upload_url, content_type.as_deref(), body)
                .await
                .map_err(map_err)
        })
    }

    fn put_range(
        &self,
        upload_url: &str,
        offset: u64,
        total_size: u64,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> BoxFuture<'_, Result<(), UploadError>> {
        let upload_url = upload_url.to_string();
        let content_type = content_type.map(str::to_string);
        Box::pin(async move {
            self.put_range(&upload_url, offset, total_size, content_type.as_deref(), body)
                .await
                .map_err(map_err)
        })
    }

    fn confirm_evidence(
        &self,
        ctx: &RequestContext,
        evidence_id: &str,
        req: &ConfirmEvidenceRequest,
    ) -> BoxFuture<'_, Result<EvidenceRecord, UploadError>> {
        let ctx = ctx.clone();
        let evidence_id = evidence_id.to_string();
        let req = req.clone();
        Box::pin(async move {
            self.confirm_evidence(&ctx, &evidence_id, &req)
                .await
                .map_err(map_err)
        })
    }

    fn discard_evidence(
        &self,
        ctx: &RequestContext,
        evidence_id: &str,
    ) -> BoxFuture<'_, Result<(), UploadError>> {
        let ctx = ctx.clone();
        let evidence_id = evidence_id.to_string();
        Box::pin(async move {
            self.delete_evidence(&ctx, &evidence_id)
                .await
                .map_err(map_err)
        })
    }
}
