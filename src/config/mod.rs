//! Configuration module for Ragdesk.
//!
//! Handles loading and saving the client settings file.

mod settings;

pub use settings::{GeneralSettings, IngestSettings, ServerSettings, Settings};
