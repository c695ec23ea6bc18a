// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly running aggregates (the gold layer).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::SilverRun;
use crate::time_utils::iso_year_week;

/// One row per ISO week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
    /// ISO week-year
    pub year: i32,
    /// ISO week number (1..=53)
    pub week: u32,
    pub total_distance_km: f64,
    pub total_time_h: f64,
    pub n_runs: u32,
    pub avg_distance_km: f64,
}

impl WeeklyAggregate {
    /// Display label, e.g. "2025-W3" (week is not zero-padded).
    pub fn label(&self) -> String {
        format!("{}-W{}", self.year, self.week)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct WeekTotals {
    distance_km: f64,
    time_h: f64,
    n_runs: u32,
}

/// Accumulates runs into weekly buckets keyed by (ISO year, ISO week).
#[derive(Debug, Default)]
pub struct WeeklyStats {
    weeks: BTreeMap<(i32, u32), WeekTotals>,
    /// Runs skipped because they had no start date
    undated: usize,
}

impl WeeklyStats {
    /// Add a run.
    ///
    /// Returns `false` if the run has no start date and was skipped.
    pub fn add_run(&mut self, run: &SilverRun) -> bool {
        let Some(start) = run.start_date_local else {
            self.undated += 1;
            return false;
        };

        let totals = self.weeks.entry(iso_year_week(start)).or_default();
        totals.distance_km += run.distance_km();
        totals.time_h += run.moving_time_h();
        totals.n_runs += 1;
        true
    }

    pub fn undated(&self) -> usize {
        self.undated
    }

    /// Finished rows, ascending by (year, week).
    pub fn into_rows(self) -> Vec<WeeklyAggregate> {
        self.weeks
            .into_iter()
            .map(|((year, week), totals)| WeeklyAggregate {
                year,
                week,
                total_distance_km: totals.distance_km,
                total_time_h: totals.time_h,
                n_runs: totals.n_runs,
                avg_distance_km: totals.distance_km / f64::from(totals.n_runs),
            })
            .collect()
    }
}

impl<'a> FromIterator<&'a SilverRun> for WeeklyStats {
    fn from_iter<I: IntoIterator<Item = &'a SilverRun>>(iter: I) -> Self {
        let mut stats = WeeklyStats::default();
        for run in iter {
            stats.add_run(run);
        }
        stats
    }
}
