//! Ragdesk - a terminal client for a RAG backend
//!
//! Ask questions about your documents and upload new documents to a
//! retrieval-augmented question-answering service. Retrieval, chunking and
//! generation all happen on the backend; this crate only speaks its HTTP API
//! and keeps the state of a single view.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `backend` - Backend trait and its HTTP client
//! - `state` - View state and in-flight guards
//! - `picker` - File selection for uploads
//! - `app` - The query and ingestion flows
//! - `view` - Rendering of the view state
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ragdesk::app::App;
//! use ragdesk::backend::HttpBackend;
//! use ragdesk::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let app = App::new(Arc::new(HttpBackend::from_settings(&settings)?));
//!
//!     app.edit_query("What do my documents say about pricing?");
//!     app.submit_query().await;
//!     println!("{}", app.snapshot().answer());
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod picker;
pub mod state;
pub mod view;

pub use error::{RagdeskError, Result};
