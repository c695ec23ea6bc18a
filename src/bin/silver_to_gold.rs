// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rebuild the gold weekly aggregate from silver.

use anyhow::Context;
use run_progress::{config::Config, logging::init_logging, services::SilverToGold};

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

    SilverToGold::new(&config).run()?;
    Ok(())
}
