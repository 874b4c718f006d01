//! Question-answering backend abstraction.
//!
//! The retrieval pipeline lives entirely behind these calls. The client only
//! knows the request and response shapes of the backend's HTTP surface.

mod decode;
mod http;

pub use decode::Utf8Decoder;
pub use http::HttpBackend;

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Body of a `POST /query` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    pub query: String,
}

/// Answer returned by `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    /// The answer text.
    pub response: String,
    /// Source filenames the answer was grounded on.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Backend confidence in the answer (0.0-1.0).
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Body of a successful `POST /ingest` response.
///
/// Fields are lenient: a response missing them still produces a confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct IngestResponse {
    pub filenames: Vec<String>,
    pub chunks_ingested: u64,
    pub files_processed: Option<u64>,
    /// Set by the backend when files were accepted but storing chunks failed.
    pub error_msg: Option<String>,
}

/// Outcome of an upload that reached the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestReply {
    /// 2xx status.
    Accepted(IngestResponse),
    /// Non-2xx status, with the backend's `error_msg` if it sent one.
    Rejected {
        status: u16,
        error_msg: Option<String>,
    },
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Stream of answer fragments in arrival order.
pub type AnswerStream = BoxStream<'static, Result<String>>;

/// What `query_stream` hands back.
pub enum StreamedAnswer {
    /// The whole answer arrived at once, sources and confidence included.
    Complete(QueryResponse),
    /// Answer text arriving piece by piece.
    Fragments(AnswerStream),
}

impl std::fmt::Debug for StreamedAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamedAnswer::Complete(answer) => f.debug_tuple("Complete").field(answer).finish(),
            StreamedAnswer::Fragments(_) => f.write_str("Fragments(..)"),
        }
    }
}

/// Trait for the remote question-answering service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Ask a question and wait for the full answer.
    async fn query(&self, query: &str) -> Result<QueryResponse>;

    /// Upload files for ingestion as one request.
    ///
    /// Transport failures, including unreadable local files, are errors.
    /// Any response from the server is an [`IngestReply`].
    async fn ingest(&self, files: &[PathBuf]) -> Result<IngestReply>;

    /// Check that the backend is up.
    async fn health(&self) -> Result<HealthStatus>;

    /// Ask a question and receive the answer as it is generated.
    ///
    /// Backends without streaming return the complete answer.
    async fn query_stream(&self, query: &str) -> Result<StreamedAnswer> {
        Ok(StreamedAnswer::Complete(self.query(query).await?))
    }
}
