// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bronze → silver: type the latest snapshot's runs.

use crate::config::Config;
use crate::db::{tables, BronzeStore};
use crate::error::{PipelineError, Result};
use crate::models::{RawActivity, SilverRun};
use crate::services::StageSummary;

/// Project raw records onto silver runs.
///
/// Non-run records are dropped silently; runs with unusable required
/// fields are dropped with a warning.
pub fn project_runs(records: &[RawActivity]) -> Vec<SilverRun> {
    let mut runs = Vec::new();

    for record in records.iter().filter(|r| r.is_run()) {
        match SilverRun::from_raw(record) {
            Ok(run) => runs.push(run),
            Err(issues) => {
                tracing::warn!(
                    activity_id = ?issues.activity_id,
                    issues = %issues,
                    "Dropping run with unusable fields"
                );
            }
        }
    }

    runs
}

/// Bronze → silver transform.
pub struct BronzeToSilver<'a> {
    config: &'a Config,
}

impl<'a> BronzeToSilver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Rebuild the canonical silver dataset from the latest bronze snapshot.
    pub fn run(&self) -> Result<StageSummary> {
        let store = BronzeStore::new(&self.config.bronze_dir);
        let (batch_id, snapshot) = store
            .latest_snapshot()?
            .ok_or_else(|| PipelineError::MissingInput(store.dir().to_path_buf()))?;

        tracing::info!(batch = %batch_id, path = %snapshot.display(), "Reading bronze snapshot");
        let records = store.read_columnar(&snapshot)?;
        let runs = project_runs(&records);

        let undated = runs.iter().filter(|r| r.start_date_local.is_none()).count();
        if undated > 0 {
            tracing::warn!(undated, "Runs kept without a parseable start_date_local");
        }

        let path = self.config.silver_path();
        tables::write_runs(&path, &runs)?;

        tracing::info!(rows = runs.len(), path = %path.display(), "Silver written");
        Ok(StageSummary {
            rows: runs.len(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<RawActivity> {
        serde_json::from_value(value).unwrap()
    }

    fn activity(id: i64, kind: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("{} {}", kind, id),
            "type": kind,
            "start_date_local": "2025-03-04T06:15:00Z",
            "distance": 5000.0,
            "moving_time": 1800,
            "elapsed_time": 1900,
            "total_elevation_gain": 12.0,
            "average_speed": 2.7,
            "max_speed": 3.9
        })
    }

    #[test]
    fn test_project_runs_filters_by_type() {
        let raw = records(json!([
            activity(1, "Run"),
            activity(2, "Ride"),
            activity(3, "Run"),
            activity(4, "Swim"),
            activity(5, "run"),
        ]));

        let ids: Vec<i64> = project_runs(&raw).iter().map(|r| r.activity_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_project_runs_drops_incomplete_rows() {
        let mut broken = activity(2, "Run");
        broken.as_object_mut().unwrap().remove("distance");
        let raw = records(json!([activity(1, "Run"), broken]));

        let runs = project_runs(&raw);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].activity_id, 1);
    }

    #[test]
    fn test_missing_bronze_is_missing_input() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_base_dir(tmp.path());

        let err = BronzeToSilver::new(&config).run().unwrap_err();
        match err {
            PipelineError::MissingInput(path) => assert_eq!(path, config.bronze_dir),
            other => panic!("unexpected error: {other}"),
        }
    }
}
