// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Export the site JSON documents and create index.html if needed.

use anyhow::Context;
use run_progress::{config::Config, logging::init_logging, services::SiteExporter};

fn main() -> anyhow::Result<()> {
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

    let report = SiteExporter::new(&config).build()?;
    if report.weekly.is_none() || report.activities.is_none() {
        tracing::warn!("Site built with missing data; run the earlier stages first");
    }
    Ok(())
}
