//! The query and ingestion flows.
//!
//! [`App`] ties a [`Backend`] to the shared [`ViewState`](crate::state::ViewState).
//! Every failure is converted into view state or an [`IngestNotice`] here;
//! nothing escapes to the caller.

use crate::backend::{Backend, IngestReply, QueryResponse, StreamedAnswer};
use crate::picker::FileSelection;
use crate::state::{Flight, SharedState, ViewState};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shown when an upload never got a response.
pub const NO_RESPONSE_MESSAGE: &str = "No response from server - make sure it's running";

/// Used when a rejected upload carries no `error_msg`.
pub const UNKNOWN_ERROR: &str = "Unknown Error";

/// What happened to a query submission.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The query text was empty; nothing was sent.
    Skipped,
    /// A query was already outstanding; nothing was sent.
    Busy,
    /// The backend answered.
    Answered(QueryResponse),
    /// The attempt failed and the failure message is now the answer.
    Failed,
}

/// Message presented to the user after an upload attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestNotice {
    /// The backend accepted the upload.
    Accepted {
        filenames: Vec<String>,
        chunks_ingested: u64,
        /// Backend-reported problem that did not fail the request.
        warning: Option<String>,
    },
    /// The backend answered with an error status.
    Rejected { message: String },
    /// The request never got a usable response.
    Unreachable,
}

impl IngestNotice {
    pub fn is_success(&self) -> bool {
        matches!(self, IngestNotice::Accepted { .. })
    }
}

impl From<IngestReply> for IngestNotice {
    fn from(reply: IngestReply) -> Self {
        match reply {
            IngestReply::Accepted(body) => IngestNotice::Accepted {
                filenames: body.filenames,
                chunks_ingested: body.chunks_ingested,
                warning: body.error_msg.filter(|m| !m.is_empty()),
            },
            IngestReply::Rejected { error_msg, .. } => IngestNotice::Rejected {
                message: error_msg.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            },
        }
    }
}

impl fmt::Display for IngestNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestNotice::Accepted {
                filenames,
                chunks_ingested,
                warning,
            } => {
                write!(
                    f,
                    "Success!\nFiles: {}\nChunks ingested: {}",
                    filenames.join(", "),
                    chunks_ingested
                )?;
                if let Some(warning) = warning {
                    write!(f, "\nWarning: {}", warning)?;
                }
                Ok(())
            }
            IngestNotice::Rejected { message } => {
                write!(f, "Error uploading files: {}", message)
            }
            IngestNotice::Unreachable => write!(f, "{}", NO_RESPONSE_MESSAGE),
        }
    }
}

/// The single view's controller.
#[derive(Clone)]
pub struct App {
    backend: Arc<dyn Backend>,
    state: SharedState,
}

impl App {
    /// Create an app with fresh view state.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: SharedState::new(),
        }
    }

    /// Shared handle to the view state.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Copy of the current view state.
    pub fn snapshot(&self) -> ViewState {
        self.state.snapshot()
    }

    /// Replace the query text.
    pub fn edit_query(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.update(|s| s.set_query(text));
    }

    /// Send the current query text and store the answer.
    pub async fn submit_query(&self) -> QueryOutcome {
        let query = self.state.snapshot().query().to_string();
        if query.is_empty() {
            return QueryOutcome::Skipped;
        }
        let Some(_guard) = self.state.acquire(Flight::Query) else {
            debug!("Query already in flight");
            return QueryOutcome::Busy;
        };

        match self.backend.query(&query).await {
            Ok(answer) => {
                info!("Query answered");
                self.state
                    .update(|s| s.finish_query_success(answer.response.clone()));
                QueryOutcome::Answered(answer)
            }
            Err(e) => {
                error!("Something went wrong contacting the server: {}", e);
                self.state.update(|s| s.finish_query_failure());
                QueryOutcome::Failed
            }
        }
    }

    /// Send the current query text and receive the answer incrementally.
    ///
    /// `on_fragment` sees each piece as it arrives. The stored answer is set
    /// once the stream completes; any error along the way fails the query.
    pub async fn submit_query_streamed<F>(&self, mut on_fragment: F) -> QueryOutcome
    where
        F: FnMut(&str) + Send,
    {
        let query = self.state.snapshot().query().to_string();
        if query.is_empty() {
            return QueryOutcome::Skipped;
        }
        let Some(_guard) = self.state.acquire(Flight::Query) else {
            debug!("Query already in flight");
            return QueryOutcome::Busy;
        };

        let mut stream = match self.backend.query_stream(&query).await {
            Ok(StreamedAnswer::Fragments(stream)) => stream,
            Ok(StreamedAnswer::Complete(answer)) => {
                info!("Query answered without streaming");
                on_fragment(&answer.response);
                self.state
                    .update(|s| s.finish_query_success(answer.response.clone()));
                return QueryOutcome::Answered(answer);
            }
            Err(e) => {
                error!("Something went wrong contacting the server: {}", e);
                self.state.update(|s| s.finish_query_failure());
                return QueryOutcome::Failed;
            }
        };

        let mut answer = String::new();
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(text) => {
                    on_fragment(&text);
                    answer.push_str(&text);
                }
                Err(e) => {
                    error!("Answer stream broke off: {}", e);
                    self.state.update(|s| s.finish_query_failure());
                    return QueryOutcome::Failed;
                }
            }
        }

        // plain text streams carry no sources or confidence
        self.state.update(|s| s.finish_query_success(answer.clone()));
        QueryOutcome::Answered(QueryResponse {
            response: answer,
            sources: Vec::new(),
            confidence: None,
        })
    }

    /// Upload every file in `selection` as one request.
    ///
    /// Returns `None` without sending anything when the selection is empty
    /// or an upload is already running. The selection is cleared after every
    /// attempt.
    pub async fn handle_upload(&self, selection: &mut FileSelection) -> Option<IngestNotice> {
        if selection.is_empty() {
            return None;
        }
        let Some(_guard) = self.state.acquire(Flight::Ingest) else {
            debug!("Upload already in flight");
            return None;
        };

        let notice = match self.backend.ingest(selection.files()).await {
            Ok(reply) => IngestNotice::from(reply),
            Err(e) => {
                warn!("Upload of {} files failed: {}", selection.len(), e);
                IngestNotice::Unreachable
            }
        };

        selection.clear();
        Some(notice)
    }
}
