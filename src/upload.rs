//! File uploads.
//!
//! Uploads bypass the JSON transport path: the body is a
//! `multipart/form-data` form carrying a single file field (`document` for
//! loan documents, `file` for generic uploads), streamed in chunks so the
//! caller can observe progress. Responses follow the same typed
//! success/error contract as the JSON path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::de::DeserializeOwned;

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};

/// Progress callback, invoked with `(bytes_sent, bytes_total)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

const CHUNK_SIZE: usize = 64 * 1024;

impl ApiClient {
  /// Upload a file as `multipart/form-data`.
  ///
  /// The bearer token is attached when present. `on_progress` is invoked
  /// as each chunk is handed to the transport.
  pub async fn upload<T: DeserializeOwned>(
    &self,
    endpoint: &str,
    field: &str,
    file_name: &str,
    bytes: Vec<u8>,
    on_progress: Option<ProgressFn>,
  ) -> ApiResult<T> {
    let url = self.build_url(endpoint, &[])?;
    let total = bytes.len() as u64;
    tracing::debug!(%url, total, "file upload");

    let sent = Arc::new(AtomicU64::new(0));
    let chunks: Vec<Vec<u8>> = bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();
    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
      let so_far = sent.fetch_add(chunk.len() as u64, Ordering::SeqCst) + chunk.len() as u64;
      if let Some(progress) = &on_progress {
        progress(so_far, total);
      }
      Ok::<Vec<u8>, std::io::Error>(chunk)
    }));

    let part = Part::stream_with_length(Body::wrap_stream(stream), total)
      .file_name(file_name.to_string())
      .mime_str("application/octet-stream")
      .map_err(|e| ApiError::local(format!("Invalid upload mime type: {}", e)))?;
    let form = Form::new().part(field.to_string(), part);

    let mut request = self.http().post(url).multipart(form);
    if let Some(token) = self.bearer_token() {
      request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|_| ApiError::network())?;
    Self::handle_response(response).await
  }
}
