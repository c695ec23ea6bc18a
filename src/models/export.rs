// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON documents consumed by the static site.

use serde::Serialize;

use crate::models::{SilverRun, WeeklyAggregate};
use crate::time_utils::format_utc_rfc3339;

/// Row of `progression_weekly.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPoint {
    pub year: i32,
    pub week: u32,
    /// "{year}-W{week}"
    pub year_week: String,
    pub total_distance_km: f64,
    pub total_time_h: f64,
    pub n_runs: u32,
    pub avg_distance_km: f64,
}

impl From<&WeeklyAggregate> for WeeklyPoint {
    fn from(row: &WeeklyAggregate) -> Self {
        Self {
            year: row.year,
            week: row.week,
            year_week: row.label(),
            total_distance_km: row.total_distance_km,
            total_time_h: row.total_time_h,
            n_runs: row.n_runs,
            avg_distance_km: row.avg_distance_km,
        }
    }
}

/// Row of `activities.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRow {
    /// RFC3339 start date, `null` when unknown
    pub date: Option<String>,
    pub name: String,
    pub distance_km: f64,
    pub moving_time_min: f64,
    pub average_speed: f64,
    pub max_speed: f64,
    pub total_elevation_gain: f64,
}

impl From<&SilverRun> for ActivityRow {
    fn from(run: &SilverRun) -> Self {
        Self {
            date: run.start_date_local.map(format_utc_rfc3339),
            name: run.name.clone(),
            distance_km: run.distance_km(),
            moving_time_min: run.moving_time_min(),
            average_speed: run.average_speed,
            max_speed: run.max_speed,
            total_elevation_gain: run.total_elevation_gain,
        }
    }
}
