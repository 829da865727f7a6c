//! Multipart upload with progress reporting.
//!
//! Uploads go through a separate path from plain requests: the file part is a
//! chunked stream so the caller can observe progress, which a buffered JSON
//! dispatch cannot offer. Classification differs from the dispatcher on
//! purpose: non-2xx statuses reject with the raw status and body, and
//! non-success envelope codes other than `unauthorized` resolve so
//! upload-specific UI keeps the partial-failure detail.

use bytes::Bytes;

use crate::{
    client::{truncate_body, Client},
    error::RedirectTarget,
    types::{Response, ResponseCode},
    Error,
};

/// Size of the chunks the file body is streamed in.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Callback invoked with `(bytes_sent, bytes_total)` as the body is produced.
pub type ProgressHandler = Box<dyn Fn(u64, u64) + Send + Sync>;

/// One file to upload: the multipart field name, the file name sent to the
/// server, an optional MIME type, and the raw bytes.
pub struct UploadFile {
    pub field: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Client {
    /// Uploads a file as multipart form data, with optional extra text fields
    /// and an optional progress callback.
    ///
    /// Returns the raw envelope for every code except `success` and
    /// `unauthorized`; callers must check `code` themselves.
    pub async fn upload(
        &self,
        path: &str,
        file: UploadFile,
        fields: &[(&str, String)],
        progress: Option<ProgressHandler>,
    ) -> Result<Response<serde_json::Value>, Error> {
        let url = self.build_url(path, &[])?;

        let total = file.bytes.len() as u64;
        let chunks: Vec<Bytes> = file
            .bytes
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(Bytes::copy_from_slice)
            .collect();
        let mut sent = 0u64;
        let body_stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(cb) = &progress {
                cb(sent, total);
            }
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        let mut part =
            reqwest::multipart::Part::stream_with_length(reqwest::Body::wrap_stream(body_stream), total)
                .file_name(file.filename);
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        let mut form = reqwest::multipart::Form::new();
        for (key, value) in fields {
            form = form.text(key.to_string(), value.clone());
        }
        form = form.part(file.field, part);

        let req = self.authorize(self.http.post(url)).multipart(form);
        let resp = req.send().await.map_err(|e| {
            tracing::error!("upload to {} failed: {}", path, e);
            self.notifier.error(&e.to_string());
            Error::Network(e)
        })?;

        // Uploads classify by HTTP status first; the envelope only matters on 2xx.
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::error!("upload failed with status {}: {}", status, truncate_body(&body));
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let envelope: Response<serde_json::Value> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("failed to parse upload envelope: {}", e);
            Error::Parse(e)
        })?;
        match envelope.code {
            ResponseCode::Unauthorized => {
                self.session.clear();
                Err(Error::Redirected(RedirectTarget::Login { redirect: None }))
            }
            _ => Ok(envelope),
        }
    }
}
