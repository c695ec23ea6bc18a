// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity models: the untyped bronze record and the typed silver run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::time_utils::parse_utc_lenient;

/// Sport type kept by the silver stage.
pub const RUN_TYPE: &str = "Run";

/// Raw activity exactly as returned by Strava.
///
/// Keys are owned by the provider; nothing here assumes a schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawActivity(pub Map<String, Value>);

impl RawActivity {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Sport type (`type` field), if it is a string.
    pub fn activity_type(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    pub fn is_run(&self) -> bool {
        self.activity_type() == Some(RUN_TYPE)
    }
}

impl From<Map<String, Value>> for RawActivity {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Typed projection of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SilverRun {
    /// Strava activity ID
    pub activity_id: i64,
    pub name: String,
    /// `None` when the source text could not be parsed
    pub start_date_local: Option<DateTime<Utc>>,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub moving_time: i64,
    /// Seconds
    pub elapsed_time: i64,
    /// Meters
    pub total_elevation_gain: f64,
    /// m/s
    pub average_speed: f64,
    /// m/s
    pub max_speed: f64,
}

/// What went wrong with one field during projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    Missing(&'static str),
    Malformed {
        field: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::Missing(field) => write!(f, "{} missing", field),
            FieldIssue::Malformed { field, expected } => {
                write!(f, "{} is not {}", field, expected)
            }
        }
    }
}

/// Every problem found in a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssues {
    /// Raw `id`, when it was usable
    pub activity_id: Option<i64>,
    pub issues: Vec<FieldIssue>,
}

impl fmt::Display for RowIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let issues: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        write!(f, "{}", issues.join(", "))
    }
}

/// Collects field issues while projecting one record.
struct Projector<'a> {
    raw: &'a RawActivity,
    issues: Vec<FieldIssue>,
}

impl<'a> Projector<'a> {
    fn value(&mut self, field: &'static str) -> Option<&'a Value> {
        let raw: &'a RawActivity = self.raw;
        let value = raw.get(field);
        if value.is_none() {
            self.issues.push(FieldIssue::Missing(field));
        }
        value
    }

    fn malformed(&mut self, field: &'static str, expected: &'static str) {
        self.issues.push(FieldIssue::Malformed { field, expected });
    }

    fn int(&mut self, field: &'static str) -> Option<i64> {
        let value = self.value(field)?;
        let parsed = value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        });
        if parsed.is_none() {
            self.malformed(field, "an integer");
        }
        parsed
    }

    fn float(&mut self, field: &'static str) -> Option<f64> {
        let parsed = self.value(field)?.as_f64();
        if parsed.is_none() {
            self.malformed(field, "a number");
        }
        parsed
    }

    fn string(&mut self, field: &'static str) -> Option<String> {
        let parsed = self.value(field)?.as_str().map(str::to_string);
        if parsed.is_none() {
            self.malformed(field, "a string");
        }
        parsed
    }
}

impl SilverRun {
    /// Project a raw record onto the silver columns.
    ///
    /// `start_date_local` is parsed leniently and never causes a rejection;
    /// every other field is required. All problems are reported together.
    pub fn from_raw(raw: &RawActivity) -> Result<Self, RowIssues> {
        let mut p = Projector {
            raw,
            issues: Vec::new(),
        };

        let activity_id = p.int("id");
        let name = p.string("name");
        let distance = p.float("distance");
        let moving_time = p.int("moving_time");
        let elapsed_time = p.int("elapsed_time");
        let total_elevation_gain = p.float("total_elevation_gain");
        let average_speed = p.float("average_speed");
        let max_speed = p.float("max_speed");

        let start_date_local = raw
            .get("start_date_local")
            .and_then(Value::as_str)
            .and_then(parse_utc_lenient);

        match (
            activity_id,
            name,
            distance,
            moving_time,
            elapsed_time,
            total_elevation_gain,
            average_speed,
            max_speed,
        ) {
            (
                Some(activity_id),
                Some(name),
                Some(distance),
                Some(moving_time),
                Some(elapsed_time),
                Some(total_elevation_gain),
                Some(average_speed),
                Some(max_speed),
            ) => Ok(Self {
                activity_id,
                name,
                start_date_local,
                distance,
                moving_time,
                elapsed_time,
                total_elevation_gain,
                average_speed,
                max_speed,
            }),
            _ => Err(RowIssues {
                activity_id,
                issues: p.issues,
            }),
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance / 1000.0
    }

    pub fn moving_time_h(&self) -> f64 {
        self.moving_time as f64 / 3600.0
    }

    pub fn moving_time_min(&self) -> f64 {
        self.moving_time as f64 / 60.0
    }
}
