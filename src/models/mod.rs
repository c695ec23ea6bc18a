// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for each pipeline layer.

pub mod activity;
pub mod export;
pub mod stats;

pub use activity::{FieldIssue, RawActivity, RowIssues, SilverRun};
pub use export::{ActivityRow, WeeklyPoint};
pub use stats::{WeeklyAggregate, WeeklyStats};
