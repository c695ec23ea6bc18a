// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gold → site: JSON documents and the static page that renders them.

use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::db::tables;
use crate::error::{PipelineError, Result};
use crate::models::{ActivityRow, SilverRun, WeeklyPoint};
use crate::services::StageSummary;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// Outcome of a full site build.
#[derive(Debug, Clone, Default)]
pub struct SiteReport {
    /// `None` when gold was missing
    pub weekly: Option<StageSummary>,
    /// `None` when silver was missing
    pub activities: Option<StageSummary>,
    /// Whether index.html was created on this run
    pub index_created: bool,
}

/// Order runs newest first; runs without a date come before all dated ones.
pub fn newest_first(a: &SilverRun, b: &SilverRun) -> Ordering {
    match (a.start_date_local, b.start_date_local) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}

/// Activity table rows, newest first (stable for equal dates).
pub fn activity_rows(runs: &[SilverRun]) -> Vec<ActivityRow> {
    let mut sorted: Vec<&SilverRun> = runs.iter().collect();
    sorted.sort_by(|a, b| newest_first(a, b));
    sorted.into_iter().map(ActivityRow::from).collect()
}

/// Writes the site's JSON assets and page.
pub struct SiteExporter<'a> {
    config: &'a Config,
}

impl<'a> SiteExporter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Export both documents and make sure the page exists.
    ///
    /// A missing upstream dataset skips only its own export.
    pub fn build(&self) -> Result<SiteReport> {
        let weekly = self.export_weekly()?;
        let activities = self.export_activities()?;
        let index_created = self.ensure_index_html()?;

        Ok(SiteReport {
            weekly,
            activities,
            index_created,
        })
    }

    /// Write `progression_weekly.json` from gold, in gold order.
    pub fn export_weekly(&self) -> Result<Option<StageSummary>> {
        let source = self.config.gold_path();
        let Some(rows) = skip_if_missing(tables::read_weekly(&source), &source)? else {
            return Ok(None);
        };

        let points: Vec<WeeklyPoint> = rows.iter().map(WeeklyPoint::from).collect();
        let path = self.config.weekly_json_path();
        write_json(&path, &points)?;

        tracing::info!(rows = points.len(), path = %path.display(), "Wrote weekly JSON");
        Ok(Some(StageSummary {
            rows: points.len(),
            path,
        }))
    }

    /// Write `activities.json` from silver, newest first.
    pub fn export_activities(&self) -> Result<Option<StageSummary>> {
        let source = self.config.silver_path();
        let Some(runs) = skip_if_missing(tables::read_runs(&source), &source)? else {
            return Ok(None);
        };

        let rows = activity_rows(&runs);
        let path = self.config.activities_json_path();
        write_json(&path, &rows)?;

        tracing::info!(rows = rows.len(), path = %path.display(), "Wrote activities JSON");
        Ok(Some(StageSummary {
            rows: rows.len(),
            path,
        }))
    }

    /// Create `index.html` unless it already exists.
    ///
    /// Returns `true` if the file was written.
    pub fn ensure_index_html(&self) -> Result<bool> {
        let path = self.config.index_html_path();
        if path.exists() {
            tracing::debug!(path = %path.display(), "index.html already exists");
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        fs::write(&path, INDEX_HTML).map_err(|e| PipelineError::io(&path, e))?;
        tracing::info!(path = %path.display(), "Created index.html");
        Ok(true)
    }
}

/// Turn a missing upstream file into a logged skip.
fn skip_if_missing<T>(result: Result<T>, source: &Path) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_missing_input() => {
            tracing::warn!(path = %source.display(), "Upstream file not found, skipping export");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let json = serde_json::to_string(value)?;
    fs::write(path, json).map_err(|e| PipelineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn run(id: i64, day: Option<u32>) -> SilverRun {
        SilverRun {
            activity_id: id,
            name: format!("Run {}", id),
            start_date_local: day.map(|d| Utc.with_ymd_and_hms(2025, 3, d, 7, 0, 0).unwrap()),
            distance: 10000.0,
            moving_time: 3600,
            elapsed_time: 3700,
            total_elevation_gain: 55.5,
            average_speed: 2.7777,
            max_speed: 4.25,
        }
    }

    #[test]
    fn test_activity_rows_newest_first_with_undated_first() {
        let runs = vec![
            run(1, Some(2)),
            run(2, None),
            run(3, Some(9)),
            run(4, None),
            run(5, Some(5)),
        ];

        let names: Vec<String> = activity_rows(&runs)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Run 2", "Run 4", "Run 3", "Run 5", "Run 1"]);
    }

    #[test]
    fn test_activity_row_conversions() {
        let rows = activity_rows(&[run(1, Some(2))]);
        let row = &rows[0];

        assert_eq!(row.date.as_deref(), Some("2025-03-02T07:00:00Z"));
        assert_eq!(row.distance_km, 10.0);
        assert_eq!(row.moving_time_min, 60.0);
        assert_eq!(row.average_speed, 2.7777);
        assert_eq!(row.total_elevation_gain, 55.5);
    }

    #[test]
    fn test_ensure_index_html_does_not_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_base_dir(tmp.path());
        let exporter = SiteExporter::new(&config);

        assert!(exporter.ensure_index_html().unwrap());
        fs::write(config.index_html_path(), "custom").unwrap();
        assert!(!exporter.ensure_index_html().unwrap());
        assert_eq!(fs::read_to_string(config.index_html_path()).unwrap(), "custom");
    }

    #[test]
    fn test_template_fetches_both_documents() {
        assert!(INDEX_HTML.contains("assets/progression_weekly.json"));
        assert!(INDEX_HTML.contains("assets/activities.json"));
    }
}
