// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Silver → gold: weekly running totals.

use crate::config::Config;
use crate::db::tables;
use crate::error::Result;
use crate::models::{SilverRun, WeeklyAggregate, WeeklyStats};
use crate::services::StageSummary;

/// Aggregate runs by ISO (year, week), ascending.
///
/// Runs without a start date cannot be placed in a week and are left out.
pub fn aggregate_weekly(runs: &[SilverRun]) -> Vec<WeeklyAggregate> {
    let stats: WeeklyStats = runs.iter().collect();
    if stats.undated() > 0 {
        tracing::warn!(
            undated = stats.undated(),
            "Runs without start_date_local excluded from weekly totals"
        );
    }
    stats.into_rows()
}

/// Silver → gold aggregation.
pub struct SilverToGold<'a> {
    config: &'a Config,
}

impl<'a> SilverToGold<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Rebuild the canonical weekly aggregate from silver.
    pub fn run(&self) -> Result<StageSummary> {
        let runs = tables::read_runs(&self.config.silver_path())?;
        let weekly = aggregate_weekly(&runs);

        let path = self.config.gold_path();
        tables::write_weekly(&path, &weekly)?;

        tracing::info!(rows = weekly.len(), path = %path.display(), "Gold weekly written");
        Ok(StageSummary {
            rows: weekly.len(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_silver_is_missing_input() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_base_dir(tmp.path());

        let err = SilverToGold::new(&config).run().unwrap_err();
        assert!(err.is_missing_input());
        assert!(err.to_string().contains("runs.parquet"));
    }
}
