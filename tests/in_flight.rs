use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ragdesk::app::{App, IngestNotice, QueryOutcome};
use ragdesk::backend::{
    Backend, HealthStatus, IngestReply, IngestResponse, QueryResponse, StreamedAnswer,
};
use ragdesk::error::{RagdeskError, Result};
use ragdesk::picker::FileSelection;
use ragdesk::state::QUERY_FAILED_MESSAGE;
use ragdesk::view;
use tokio::sync::Semaphore;

/// Backend whose calls block until a permit is released.
struct GatedBackend {
    gate: Semaphore,
    queries: AtomicUsize,
    uploads: AtomicUsize,
}

impl GatedBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            queries: AtomicUsize::new(0),
            uploads: AtomicUsize::new(0),
        })
    }

    async fn pass(&self) {
        self.gate.acquire().await.expect("gate open").forget();
    }

    fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }
}

#[async_trait]
impl Backend for GatedBackend {
    async fn query(&self, query: &str) -> Result<QueryResponse> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.pass().await;
        Ok(QueryResponse {
            response: format!("answer to {}", query),
            sources: Vec::new(),
            confidence: None,
        })
    }

    async fn ingest(&self, files: &[PathBuf]) -> Result<IngestReply> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.pass().await;
        Ok(IngestReply::Accepted(IngestResponse {
            filenames: files
                .iter()
                .map(|f| f.display().to_string())
                .collect(),
            chunks_ingested: 1,
            ..Default::default()
        }))
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "OK".to_string(),
        })
    }
}

/// Backend whose answer stream breaks off after the first fragment.
struct BrokenStreamBackend;

#[async_trait]
impl Backend for BrokenStreamBackend {
    async fn query(&self, _query: &str) -> Result<QueryResponse> {
        Err(RagdeskError::MalformedResponse("only streams".to_string()))
    }

    async fn ingest(&self, _files: &[PathBuf]) -> Result<IngestReply> {
        Ok(IngestReply::Rejected {
            status: 501,
            error_msg: None,
        })
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "OK".to_string(),
        })
    }

    async fn query_stream(&self, _query: &str) -> Result<StreamedAnswer> {
        let fragments: Vec<Result<String>> = vec![
            Ok("The report covers".to_string()),
            Err(RagdeskError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            ))),
        ];
        Ok(StreamedAnswer::Fragments(stream::iter(fragments).boxed()))
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_query_flag_held_while_in_flight() {
    let backend = GatedBackend::new();
    let app = App::new(backend.clone());
    app.edit_query("what changed?");

    let task_app = app.clone();
    let running = tokio::spawn(async move { task_app.submit_query().await });

    wait_until(|| app.snapshot().is_querying()).await;

    let frame = view::render(&app.snapshot());
    assert!(!frame.ask.enabled);
    assert_eq!(frame.ask.label, view::ASK_BUSY_LABEL);
    assert!(frame.query_editable);

    // a second submission while the first is outstanding sends nothing
    assert_eq!(app.submit_query().await, QueryOutcome::Busy);
    assert_eq!(backend.queries.load(Ordering::SeqCst), 1);

    // editing the query during flight is allowed
    app.edit_query("something else");

    backend.release(1);
    let outcome = running.await.expect("task finished");
    assert!(matches!(outcome, QueryOutcome::Answered(_)));

    let state = app.snapshot();
    assert!(!state.is_querying());
    assert_eq!(state.answer(), "answer to what changed?");
    assert_eq!(state.query(), "something else");
}

#[tokio::test]
async fn test_flows_run_concurrently() {
    let backend = GatedBackend::new();
    let app = App::new(backend.clone());
    app.edit_query("q");

    let query_app = app.clone();
    let query = tokio::spawn(async move { query_app.submit_query().await });
    let upload_app = app.clone();
    let upload = tokio::spawn(async move {
        let mut selection = FileSelection::new(vec![PathBuf::from("a.pdf")]);
        let notice = upload_app.handle_upload(&mut selection).await;
        (notice, selection)
    });

    wait_until(|| {
        let state = app.snapshot();
        state.is_querying() && state.is_ingesting()
    })
    .await;

    let frame = view::render(&app.snapshot());
    assert!(!frame.ask.enabled);
    assert!(!frame.file_input.enabled);
    assert_eq!(frame.processing, Some(view::PROCESSING_NOTICE));

    // a second upload is refused while the first runs
    let mut again = FileSelection::new(vec![PathBuf::from("b.txt")]);
    assert_eq!(app.handle_upload(&mut again).await, None);
    assert_eq!(backend.uploads.load(Ordering::SeqCst), 1);

    backend.release(2);

    let outcome = query.await.expect("query task");
    assert!(matches!(outcome, QueryOutcome::Answered(_)));
    let (notice, selection) = upload.await.expect("upload task");
    assert!(matches!(notice, Some(IngestNotice::Accepted { .. })));
    assert!(selection.is_empty());

    let state = app.snapshot();
    assert!(!state.is_querying());
    assert!(!state.is_ingesting());
}

#[tokio::test]
async fn test_abandoned_query_releases_flag() {
    let backend = GatedBackend::new();
    let app = App::new(backend.clone());
    app.edit_query("never answered");

    let task_app = app.clone();
    let running = tokio::spawn(async move { task_app.submit_query().await });
    wait_until(|| app.snapshot().is_querying()).await;

    running.abort();
    assert!(running.await.is_err());

    assert!(!app.snapshot().is_querying());
    assert_eq!(app.snapshot().answer(), "");
}

#[tokio::test]
async fn test_stream_breaking_midway_fails_query() {
    let app = App::new(Arc::new(BrokenStreamBackend));
    app.edit_query("summarize");

    let mut seen = String::new();
    let outcome = app
        .submit_query_streamed(|fragment| seen.push_str(fragment))
        .await;

    assert_eq!(outcome, QueryOutcome::Failed);
    assert_eq!(seen, "The report covers");

    let state = app.snapshot();
    assert_eq!(state.answer(), QUERY_FAILED_MESSAGE);
    assert!(!state.is_querying());

    // the flag is free again for the next question
    assert_eq!(app.submit_query_streamed(|_| {}).await, QueryOutcome::Failed);
}
