// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Run-Progress: weekly running progression from Strava
//!
//! This crate implements a staged pipeline: Strava activities are ingested
//! into append-only bronze batches, typed into a silver runs table,
//! aggregated into gold weekly totals, and exported as JSON for a static
//! page.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use error::Result;
use services::{BronzeBatch, BronzeToSilver, SiteExporter, SiteReport, SilverToGold, StageSummary};

/// Outcome of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub bronze: BronzeBatch,
    pub silver: StageSummary,
    pub gold: StageSummary,
    pub site: SiteReport,
}

/// Run every stage in order: ingest, silver, gold, site.
pub async fn run_pipeline(config: &Config) -> Result<PipelineReport> {
    let bronze = services::ingest(config).await?;
    let silver = BronzeToSilver::new(config).run()?;
    let gold = SilverToGold::new(config).run()?;
    let site = SiteExporter::new(config).build()?;

    Ok(PipelineReport {
        bronze,
        silver,
        gold,
        site,
    })
}
