//! HTTP implementation of the backend client.

use super::{
    Backend, HealthStatus, IngestReply, IngestResponse, QueryRequest, QueryResponse,
    StreamedAnswer, Utf8Decoder,
};
use crate::config::Settings;
use crate::error::{RagdeskError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use url::Url;

/// Multipart field name the backend reads uploaded files from.
const FILES_FIELD: &str = "files";

/// Backend reached over HTTP.
///
/// No timeout is configured: a request runs until the server answers or the
/// connection fails.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client with a preconfigured `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, mut base_url: Url) -> Self {
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    /// Create a client from the configured server URL.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.base_url()?))
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RagdeskError::Config(format!("invalid endpoint '{}': {}", path, e)))
    }

    fn query_request(&self, path: &str, query: &str) -> Result<reqwest::RequestBuilder> {
        Ok(self.client.post(self.endpoint(path)?).json(&QueryRequest {
            query: query.to_string(),
        }))
    }

    async fn file_part(path: &Path) -> Result<Part> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(path))?;
        Ok(part)
    }
}

/// Content type sent with an uploaded file.
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Read the body of a non-2xx response into a status error.
async fn status_error(response: reqwest::Response) -> RagdeskError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RagdeskError::Status { status, body }
}

/// Pull `error_msg` out of an error body, if the body is JSON and has one.
fn extract_error_msg(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("error_msg")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self, query), fields(len = query.len()))]
    async fn query(&self, query: &str) -> Result<QueryResponse> {
        debug!("Sending query to {}", self.base_url);

        let response = self.query_request("query", query)?.send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response.bytes().await?;
        let answer: QueryResponse = serde_json::from_slice(&body)
            .map_err(|e| RagdeskError::MalformedResponse(format!("query response: {}", e)))?;

        debug!("Received answer with {} sources", answer.sources.len());
        Ok(answer)
    }

    #[instrument(skip(self, files), fields(count = files.len()))]
    async fn ingest(&self, files: &[PathBuf]) -> Result<IngestReply> {
        let mut form = Form::new();
        for path in files {
            form = form.part(FILES_FIELD, Self::file_part(path).await?);
        }

        debug!("Uploading {} files to {}", files.len(), self.base_url);

        let response = self
            .client
            .post(self.endpoint("ingest")?)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let parsed: IngestResponse = serde_json::from_slice(&body)
                .map_err(|e| RagdeskError::MalformedResponse(format!("ingest response: {}", e)))?;
            info!(
                "Backend accepted {} files, {} chunks",
                parsed.filenames.len(),
                parsed.chunks_ingested
            );
            Ok(IngestReply::Accepted(parsed))
        } else {
            info!("Backend rejected upload with status {}", status);
            Ok(IngestReply::Rejected {
                status: status.as_u16(),
                error_msg: extract_error_msg(&body),
            })
        }
    }

    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthStatus> {
        let response = self.client.get(self.endpoint("health")?).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| RagdeskError::MalformedResponse(format!("health response: {}", e)))
    }

    #[instrument(skip(self, query), fields(len = query.len()))]
    async fn query_stream(&self, query: &str) -> Result<StreamedAnswer> {
        let response = self.query_request("query_stream", query)?.send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        // The backend answers with plain JSON when it has no context to stream
        if is_json(&response) {
            let body = response.bytes().await?;
            let answer: QueryResponse = serde_json::from_slice(&body)
                .map_err(|e| RagdeskError::MalformedResponse(format!("query response: {}", e)))?;
            return Ok(StreamedAnswer::Complete(answer));
        }

        let bytes = response.bytes_stream().boxed();
        let fragments = stream::unfold(
            (bytes, Some(Utf8Decoder::new())),
            |(mut bytes, decoder)| async move {
                let mut decoder = decoder?;
                loop {
                    match bytes.next().await {
                        Some(Ok(chunk)) => {
                            let text = decoder.push(&chunk);
                            if !text.is_empty() {
                                return Some((Ok(text), (bytes, Some(decoder))));
                            }
                        }
                        Some(Err(e)) => {
                            return Some((Err(RagdeskError::from(e)), (bytes, None)));
                        }
                        None => {
                            let rest = decoder.finish();
                            if rest.is_empty() {
                                return None;
                            }
                            return Some((Ok(rest), (bytes, None)));
                        }
                    }
                }
            },
        );

        Ok(StreamedAnswer::Fragments(fragments.boxed()))
    }
}
