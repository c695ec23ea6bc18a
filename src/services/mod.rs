// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - one per pipeline stage.

pub mod gold;
pub mod ingest;
pub mod silver;
pub mod site;
pub mod strava;

use std::path::PathBuf;

pub use gold::{aggregate_weekly, SilverToGold};
pub use ingest::{ingest, ActivityFetcher, BronzeBatch, BronzeWriter};
pub use silver::{project_runs, BronzeToSilver};
pub use site::{SiteExporter, SiteReport};
pub use strava::StravaClient;

/// Rows written by a stage, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub rows: usize,
    pub path: PathBuf,
}
