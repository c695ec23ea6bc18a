// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fetch activities from Strava and save them as a new bronze batch.

use anyhow::Context;
use run_progress::{config::Config, logging::init_logging, services};

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

    let batch = services::ingest(&config).await?;
    match &batch.columnar_path {
        Some(path) => tracing::info!(
            records = batch.records,
            path = %path.display(),
            "Saved activities"
        ),
        None => tracing::info!(
            raw = %batch.raw_path.display(),
            "No activities fetched; wrote raw batch only"
        ),
    }
    Ok(())
}
