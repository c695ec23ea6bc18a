// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run-Progress pipeline runner
//!
//! Runs every stage in order: fetch from Strava into bronze, type into
//! silver, aggregate into gold, and export the static site.

use anyhow::Context;
use run_progress::{config::Config, logging::init_logging, run_pipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env();
    config
        .ensure_dirs()
        .with_context(|| {
            format!(
                "Failed to create directories under {}",
                config.base_dir.display()
            )
        })?;

    let report = run_pipeline(&config).await?;

    tracing::info!(
        batch = %report.bronze.batch_id,
        fetched = report.bronze.records,
        runs = report.silver.rows,
        weeks = report.gold.rows,
        "Pipeline complete"
    );
    Ok(())
}
