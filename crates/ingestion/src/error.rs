//! Error type for fetching and importing the country dataset.

use crate::report::ImportStage;
use std::path::PathBuf;

/// Fatal import failures. Per-record and per-border problems are not errors;
/// they are collected in the [`ImportReport`](crate::ImportReport).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to fetch country dataset from {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("country dataset request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("country dataset is not a JSON array")]
    Decode(#[source] serde_json::Error),
    #[error("failed to read snapshot {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store write failed after {stage}")]
    Store {
        stage: ImportStage,
        #[source]
        source: anyhow::Error,
    },
}

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;
