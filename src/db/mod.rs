// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer (Parquet files on local disk).

pub mod bronze;
pub mod parquet;
pub mod tables;

pub use bronze::{BatchId, BronzeStore};
