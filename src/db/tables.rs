// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed Parquet tables for the silver and gold layers.

use arrow::array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampMicrosecondArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use std::path::Path;
use std::sync::Arc;

use crate::db::parquet::{column_as, downcast, read_batches, write_batch};
use crate::error::{PipelineError, Result};
use crate::models::{SilverRun, WeeklyAggregate};

const UTC: &str = "UTC";

fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some(UTC.into()))
}

// =========================================================================
// Silver: runs.parquet
// =========================================================================

pub fn runs_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("activity_id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, false),
        Field::new("start_date_local", timestamp_type(), true),
        Field::new("distance", DataType::Float64, false),
        Field::new("moving_time", DataType::Int64, false),
        Field::new("elapsed_time", DataType::Int64, false),
        Field::new("total_elevation_gain", DataType::Float64, false),
        Field::new("average_speed", DataType::Float64, false),
        Field::new("max_speed", DataType::Float64, false),
    ]))
}

pub fn runs_to_batch(runs: &[SilverRun]) -> Result<RecordBatch> {
    let activity_id: Int64Array = runs.iter().map(|r| Some(r.activity_id)).collect();
    let name: StringArray = runs.iter().map(|r| Some(r.name.as_str())).collect();
    let start_date_local = TimestampMicrosecondArray::from(
        runs.iter()
            .map(|r| r.start_date_local.map(|t| t.timestamp_micros()))
            .collect::<Vec<_>>(),
    )
    .with_timezone(UTC);
    let distance: Float64Array = runs.iter().map(|r| Some(r.distance)).collect();
    let moving_time: Int64Array = runs.iter().map(|r| Some(r.moving_time)).collect();
    let elapsed_time: Int64Array = runs.iter().map(|r| Some(r.elapsed_time)).collect();
    let total_elevation_gain: Float64Array =
        runs.iter().map(|r| Some(r.total_elevation_gain)).collect();
    let average_speed: Float64Array = runs.iter().map(|r| Some(r.average_speed)).collect();
    let max_speed: Float64Array = runs.iter().map(|r| Some(r.max_speed)).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(activity_id),
        Arc::new(name),
        Arc::new(start_date_local),
        Arc::new(distance),
        Arc::new(moving_time),
        Arc::new(elapsed_time),
        Arc::new(total_elevation_gain),
        Arc::new(average_speed),
        Arc::new(max_speed),
    ];
    Ok(RecordBatch::try_new(runs_schema(), columns)?)
}

pub fn batch_to_runs(batch: &RecordBatch) -> Result<Vec<SilverRun>> {
    let activity_id = column_as(batch, "activity_id", &DataType::Int64)?;
    let activity_id = downcast::<Int64Array>(&activity_id, "activity_id")?;
    let name = column_as(batch, "name", &DataType::Utf8)?;
    let name = downcast::<StringArray>(&name, "name")?;
    let start = column_as(batch, "start_date_local", &timestamp_type())?;
    let start = downcast::<TimestampMicrosecondArray>(&start, "start_date_local")?;
    let distance = column_as(batch, "distance", &DataType::Float64)?;
    let distance = downcast::<Float64Array>(&distance, "distance")?;
    let moving_time = column_as(batch, "moving_time", &DataType::Int64)?;
    let moving_time = downcast::<Int64Array>(&moving_time, "moving_time")?;
    let elapsed_time = column_as(batch, "elapsed_time", &DataType::Int64)?;
    let elapsed_time = downcast::<Int64Array>(&elapsed_time, "elapsed_time")?;
    let gain = column_as(batch, "total_elevation_gain", &DataType::Float64)?;
    let gain = downcast::<Float64Array>(&gain, "total_elevation_gain")?;
    let average_speed = column_as(batch, "average_speed", &DataType::Float64)?;
    let average_speed = downcast::<Float64Array>(&average_speed, "average_speed")?;
    let max_speed = column_as(batch, "max_speed", &DataType::Float64)?;
    let max_speed = downcast::<Float64Array>(&max_speed, "max_speed")?;

    let required: [(&dyn Array, &str); 8] = [
        (activity_id, "activity_id"),
        (name, "name"),
        (distance, "distance"),
        (moving_time, "moving_time"),
        (elapsed_time, "elapsed_time"),
        (gain, "total_elevation_gain"),
        (average_speed, "average_speed"),
        (max_speed, "max_speed"),
    ];
    for (column, column_name) in required {
        if column.null_count() > 0 {
            return Err(PipelineError::Schema(format!(
                "column `{}` contains nulls",
                column_name
            )));
        }
    }

    let runs = (0..batch.num_rows())
        .map(|i| SilverRun {
            activity_id: activity_id.value(i),
            name: name.value(i).to_string(),
            start_date_local: if start.is_null(i) {
                None
            } else {
                DateTime::from_timestamp_micros(start.value(i))
            },
            distance: distance.value(i),
            moving_time: moving_time.value(i),
            elapsed_time: elapsed_time.value(i),
            total_elevation_gain: gain.value(i),
            average_speed: average_speed.value(i),
            max_speed: max_speed.value(i),
        })
        .collect();
    Ok(runs)
}

pub fn write_runs(path: &Path, runs: &[SilverRun]) -> Result<()> {
    write_batch(path, &runs_to_batch(runs)?)
}

pub fn read_runs(path: &Path) -> Result<Vec<SilverRun>> {
    let mut runs = Vec::new();
    for batch in read_batches(path)? {
        runs.extend(batch_to_runs(&batch)?);
    }
    Ok(runs)
}

// =========================================================================
// Gold: weekly_progress.parquet
// =========================================================================

pub fn weekly_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("week", DataType::UInt32, false),
        Field::new("total_distance_km", DataType::Float64, false),
        Field::new("total_time_h", DataType::Float64, false),
        Field::new("n_runs", DataType::UInt32, false),
        Field::new("avg_distance_km", DataType::Float64, false),
    ]))
}

pub fn weekly_to_batch(rows: &[WeeklyAggregate]) -> Result<RecordBatch> {
    let year: Int32Array = rows.iter().map(|r| Some(r.year)).collect();
    let week: UInt32Array = rows.iter().map(|r| Some(r.week)).collect();
    let total_distance_km: Float64Array = rows.iter().map(|r| Some(r.total_distance_km)).collect();
    let total_time_h: Float64Array = rows.iter().map(|r| Some(r.total_time_h)).collect();
    let n_runs: UInt32Array = rows.iter().map(|r| Some(r.n_runs)).collect();
    let avg_distance_km: Float64Array = rows.iter().map(|r| Some(r.avg_distance_km)).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(year),
        Arc::new(week),
        Arc::new(total_distance_km),
        Arc::new(total_time_h),
        Arc::new(n_runs),
        Arc::new(avg_distance_km),
    ];
    Ok(RecordBatch::try_new(weekly_schema(), columns)?)
}

pub fn batch_to_weekly(batch: &RecordBatch) -> Result<Vec<WeeklyAggregate>> {
    let year = column_as(batch, "year", &DataType::Int32)?;
    let year = downcast::<Int32Array>(&year, "year")?;
    let week = column_as(batch, "week", &DataType::UInt32)?;
    let week = downcast::<UInt32Array>(&week, "week")?;
    let total_distance_km = column_as(batch, "total_distance_km", &DataType::Float64)?;
    let total_distance_km = downcast::<Float64Array>(&total_distance_km, "total_distance_km")?;
    let total_time_h = column_as(batch, "total_time_h", &DataType::Float64)?;
    let total_time_h = downcast::<Float64Array>(&total_time_h, "total_time_h")?;
    let n_runs = column_as(batch, "n_runs", &DataType::UInt32)?;
    let n_runs = downcast::<UInt32Array>(&n_runs, "n_runs")?;
    let avg_distance_km = column_as(batch, "avg_distance_km", &DataType::Float64)?;
    let avg_distance_km = downcast::<Float64Array>(&avg_distance_km, "avg_distance_km")?;

    Ok((0..batch.num_rows())
        .map(|i| WeeklyAggregate {
            year: year.value(i),
            week: week.value(i),
            total_distance_km: total_distance_km.value(i),
            total_time_h: total_time_h.value(i),
            n_runs: n_runs.value(i),
            avg_distance_km: avg_distance_km.value(i),
        })
        .collect())
}

pub fn write_weekly(path: &Path, rows: &[WeeklyAggregate]) -> Result<()> {
    write_batch(path, &weekly_to_batch(rows)?)
}

pub fn read_weekly(path: &Path) -> Result<Vec<WeeklyAggregate>> {
    let mut rows = Vec::new();
    for batch in read_batches(path)? {
        rows.extend(batch_to_weekly(&batch)?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn run(id: i64, start: Option<chrono::DateTime<Utc>>) -> SilverRun {
        SilverRun {
            activity_id: id,
            name: format!("Run {}", id),
            start_date_local: start,
            distance: 5012.3,
            moving_time: 1800,
            elapsed_time: 1900,
            total_elevation_gain: 41.7,
            average_speed: 2.784,
            max_speed: 4.123,
        }
    }

    #[test]
    fn test_runs_table_keeps_null_timestamps() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("runs.parquet");
        let runs = vec![
            run(1, Some(Utc.with_ymd_and_hms(2025, 3, 4, 6, 15, 0).unwrap())),
            run(2, None),
        ];

        write_runs(&path, &runs).unwrap();
        assert_eq!(read_runs(&path).unwrap(), runs);
    }

    #[test]
    fn test_empty_runs_table_is_readable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("runs.parquet");

        write_runs(&path, &[]).unwrap();
        assert!(read_runs(&path).unwrap().is_empty());
    }

    #[test]
    fn test_runs_schema_column_order() {
        let names: Vec<String> = runs_schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "activity_id",
                "name",
                "start_date_local",
                "distance",
                "moving_time",
                "elapsed_time",
                "total_elevation_gain",
                "average_speed",
                "max_speed"
            ]
        );
    }

    #[test]
    fn test_missing_table_is_missing_input() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_weekly(&tmp.path().join("weekly_progress.parquet")).unwrap_err();
        assert!(err.is_missing_input());
    }

    #[test]
    fn test_batch_without_required_column_is_schema_error() {
        let schema = Arc::new(Schema::new(vec![Field::new("year", DataType::Int32, false)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(vec![2025]))]).unwrap();

        let err = batch_to_weekly(&batch).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }
}
