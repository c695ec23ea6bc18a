// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rebuild the silver runs table from the latest bronze snapshot.

use anyhow::Context;
use run_progress::{config::Config, logging::init_logging, services::BronzeToSilver};

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

    BronzeToSilver::new(&config).run()?;
    Ok(())
}
