// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Append-only bronze snapshot storage.
//!
//! Every ingestion run produces one batch, named by its UTC creation time:
//! - `strava_activities_<batch>.json` (always, lossless)
//! - `strava_activities_<batch>.parquet` (only for non-empty batches)
//!
//! The columnar file has a schema inferred from the raw records, since the
//! provider owns the keys.

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::db::parquet::{column_as, downcast, read_batches, write_batch};
use crate::error::{PipelineError, Result};
use crate::models::RawActivity;

const FILE_PREFIX: &str = "strava_activities_";
const BATCH_TS_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Field metadata marking a column whose cells are JSON text.
const ENCODING_KEY: &str = "encoding";
const JSON_ENCODING: &str = "json";

/// Sortable batch identifier: creation second plus a collision sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId {
    pub created_at: NaiveDateTime,
    /// 0 for the first batch created in a given second
    pub seq: u32,
}

impl BatchId {
    pub fn new(created_at: DateTime<Utc>, seq: u32) -> Self {
        // Truncate to the second so the id round-trips through its name.
        let created_at = created_at.naive_utc();
        let created_at = created_at.with_nanosecond(0).unwrap_or(created_at);
        Self { created_at, seq }
    }
}

impl Ord for BatchId {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.created_at, self.seq).cmp(&(other.created_at, other.seq))
    }
}

impl PartialOrd for BatchId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.created_at.format(BATCH_TS_FORMAT))?;
        if self.seq > 0 {
            write!(f, "_{}", self.seq)?;
        }
        Ok(())
    }
}

impl FromStr for BatchId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PipelineError::Schema(format!("invalid batch id `{}`", s));

        let (ts, seq) = match s.split_once('_') {
            Some((ts, seq)) => (ts, seq.parse::<u32>().map_err(|_| invalid())?),
            None => (s, 0),
        };
        let created_at = NaiveDateTime::parse_from_str(ts, BATCH_TS_FORMAT).map_err(|_| invalid())?;
        Ok(Self { created_at, seq })
    }
}

/// Bronze directory handle.
#[derive(Debug, Clone)]
pub struct BronzeStore {
    dir: PathBuf,
}

impl BronzeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn raw_path(&self, id: &BatchId) -> PathBuf {
        self.dir.join(format!("{}{}.json", FILE_PREFIX, id))
    }

    pub fn columnar_path(&self, id: &BatchId) -> PathBuf {
        self.dir.join(format!("{}{}.parquet", FILE_PREFIX, id))
    }

    /// Allocate an id for a batch created at `now` that collides with no
    /// existing batch.
    pub fn allocate_batch_id(&self, now: DateTime<Utc>) -> BatchId {
        let mut id = BatchId::new(now, 0);
        while self.raw_path(&id).exists() || self.columnar_path(&id).exists() {
            id.seq += 1;
        }
        id
    }

    /// Write the lossless JSON form of a batch.
    pub fn write_raw(&self, id: &BatchId, records: &[RawActivity]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::io(&self.dir, e))?;
        let path = self.raw_path(id);
        let json = serde_json::to_vec(records)?;
        fs::write(&path, json).map_err(|e| PipelineError::io(&path, e))?;
        Ok(path)
    }

    /// Write the columnar form of a batch.
    pub fn write_columnar(&self, id: &BatchId, records: &[RawActivity]) -> Result<PathBuf> {
        let path = self.columnar_path(id);
        let batch = records_to_batch(records)?;
        write_batch(&path, &batch)?;
        Ok(path)
    }

    /// All columnar snapshots, oldest first.
    pub fn snapshots(&self) -> Result<Vec<(BatchId, PathBuf)>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| PipelineError::io(&self.dir, e))?;
        let mut snapshots = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::io(&self.dir, e))?;
            let path = entry.path();
            let Some(id) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(FILE_PREFIX))
                .and_then(|n| n.strip_suffix(".parquet"))
                .and_then(|n| n.parse::<BatchId>().ok())
            else {
                continue;
            };
            snapshots.push((id, path));
        }

        snapshots.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(snapshots)
    }

    /// The most recent columnar snapshot, if any.
    pub fn latest_snapshot(&self) -> Result<Option<(BatchId, PathBuf)>> {
        Ok(self.snapshots()?.pop())
    }

    /// Read a columnar snapshot back into raw records.
    pub fn read_columnar(&self, path: &Path) -> Result<Vec<RawActivity>> {
        let mut records = Vec::new();
        for batch in read_batches(path)? {
            records.extend(batch_to_records(&batch)?);
        }
        Ok(records)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema inference
// ─────────────────────────────────────────────────────────────────────────────

/// Inferred column kind, widened as values are observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    /// Nested or mixed values, stored as JSON text
    Json,
}

impl ColumnKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => ColumnKind::Null,
            Value::Bool(_) => ColumnKind::Bool,
            Value::Number(n) if n.is_i64() => ColumnKind::Int,
            Value::Number(_) => ColumnKind::Float,
            Value::String(_) => ColumnKind::Str,
            Value::Array(_) | Value::Object(_) => ColumnKind::Json,
        }
    }

    fn widen(self, other: Self) -> Self {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, b) => b,
            (a, Null) => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Json,
        }
    }

    fn data_type(self) -> DataType {
        match self {
            ColumnKind::Bool => DataType::Boolean,
            ColumnKind::Int => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Null | ColumnKind::Str | ColumnKind::Json => DataType::Utf8,
        }
    }
}

/// Build a record batch from raw records.
///
/// Columns keep the order in which their keys first appear; a key absent
/// from a record is null for that row. Columns stored as JSON text carry
/// `encoding = "json"` in their field metadata.
pub fn records_to_batch(records: &[RawActivity]) -> Result<RecordBatch> {
    let mut columns: Vec<(String, ColumnKind)> = Vec::new();
    for record in records {
        for (key, value) in record.fields() {
            let kind = ColumnKind::of(value);
            match columns.iter_mut().find(|(name, _)| name == key) {
                Some((_, existing)) => *existing = existing.widen(kind),
                None => columns.push((key.clone(), kind)),
            }
        }
    }

    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

    for (name, kind) in &columns {
        let values = records.iter().map(|r| r.get(name));
        let array: ArrayRef = match kind {
            ColumnKind::Bool => Arc::new(
                values
                    .map(|v| v.and_then(Value::as_bool))
                    .collect::<BooleanArray>(),
            ),
            ColumnKind::Int => Arc::new(
                values
                    .map(|v| v.and_then(Value::as_i64))
                    .collect::<Int64Array>(),
            ),
            ColumnKind::Float => Arc::new(
                values
                    .map(|v| v.and_then(Value::as_f64))
                    .collect::<Float64Array>(),
            ),
            ColumnKind::Str => Arc::new(
                values
                    .map(|v| v.and_then(Value::as_str).map(str::to_string))
                    .collect::<StringArray>(),
            ),
            ColumnKind::Null | ColumnKind::Json => {
                Arc::new(values.map(|v| v.map(Value::to_string)).collect::<StringArray>())
            }
        };
        let mut field = Field::new(name, kind.data_type(), true);
        if *kind == ColumnKind::Json {
            field = field.with_metadata(HashMap::from([(
                ENCODING_KEY.to_string(),
                JSON_ENCODING.to_string(),
            )]));
        }
        fields.push(field);
        arrays.push(array);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(records.len()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        arrays,
        &options,
    )?)
}

/// Convert a record batch back into raw records.
///
/// Null cells are omitted from the resulting records.
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<RawActivity>> {
    let mut records = vec![Map::new(); batch.num_rows()];
    let schema = batch.schema();

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name();
        let mut values = column_values(name, column, batch)?;
        if is_json_encoded(field) {
            values = values
                .into_iter()
                .map(|v| v.map(decode_json_cell).transpose())
                .collect::<Result<_>>()?;
        }
        for (record, value) in records.iter_mut().zip(values) {
            if let Some(value) = value {
                record.insert(name.clone(), value);
            }
        }
    }

    Ok(records.into_iter().map(RawActivity::from).collect())
}

fn is_json_encoded(field: &Field) -> bool {
    field.metadata().get(ENCODING_KEY).map(String::as_str) == Some(JSON_ENCODING)
}

fn decode_json_cell(value: Value) -> Result<Value> {
    match value {
        Value::String(text) => Ok(serde_json::from_str(&text)?),
        other => Ok(other),
    }
}

fn column_values(
    name: &str,
    column: &ArrayRef,
    batch: &RecordBatch,
) -> Result<Vec<Option<Value>>> {
    let values = match column.data_type() {
        DataType::Null => vec![None; column.len()],
        DataType::Boolean => downcast::<BooleanArray>(column, name)?
            .iter()
            .map(|v| v.map(Value::Bool))
            .collect(),
        DataType::Int64 => downcast::<Int64Array>(column, name)?
            .iter()
            .map(|v| v.map(Value::from))
            .collect(),
        DataType::Float64 => downcast::<Float64Array>(column, name)?
            .iter()
            .map(|v| v.and_then(Number::from_f64).map(Value::Number))
            .collect(),
        DataType::Utf8 => downcast::<StringArray>(column, name)?
            .iter()
            .map(|v| v.map(|s| Value::String(s.to_string())))
            .collect(),
        DataType::LargeUtf8 => downcast::<LargeStringArray>(column, name)?
            .iter()
            .map(|v| v.map(|s| Value::String(s.to_string())))
            .collect(),
        _ => {
            // Anything else (e.g. written by another tool) is read as text.
            let text = column_as(batch, name, &DataType::Utf8)?;
            downcast::<StringArray>(&text, name)?
                .iter()
                .map(|v| v.map(|s| Value::String(s.to_string())))
                .collect()
        }
    };
    Ok(values)
}
