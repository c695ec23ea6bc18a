// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pipeline error types.

use crate::config::ConfigError;
use std::path::PathBuf;

/// Error type shared by every pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Failed to fetch activities page {page}: {source}")]
    FetchPage {
        page: u32,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("Missing input: expected {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Marker message used when Strava rejects a request with 429.
    pub const STRAVA_RATE_LIMIT: &'static str = "Rate limit exceeded";

    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when an expected upstream artifact was not found.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, PipelineError::MissingInput(_))
    }

    /// True for failures reported by (or while talking to) Strava.
    pub fn is_upstream(&self) -> bool {
        match self {
            PipelineError::StravaApi(_) => true,
            PipelineError::FetchPage { source, .. } => source.is_upstream(),
            _ => false,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
