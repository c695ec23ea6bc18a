// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Parquet read/write helpers shared by the storage layers.

use arrow::array::{Array, ArrayRef};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Write a record batch to `path`, replacing any previous file.
///
/// Data goes to a sibling temp file first and is renamed into place.
pub fn write_batch(path: &Path, batch: &RecordBatch) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let temp_path = path.with_extension("parquet.tmp");
    let file = File::create(&temp_path).map_err(|e| PipelineError::io(&temp_path, e))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;

    fs::rename(&temp_path, path).map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}

/// Read every record batch from `path`.
///
/// A missing file is reported as [`PipelineError::MissingInput`].
pub fn read_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Look up a column and cast it to `data_type`.
pub fn column_as(batch: &RecordBatch, name: &str, data_type: &DataType) -> Result<ArrayRef> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::Schema(format!("missing column `{}`", name)))?;

    if column.data_type() == data_type {
        return Ok(column.clone());
    }
    cast(column, data_type).map_err(|e| {
        PipelineError::Schema(format!(
            "column `{}` ({}) cannot be read as {}: {}",
            name,
            column.data_type(),
            data_type,
            e
        ))
    })
}

/// Downcast a column to its concrete array type.
pub fn downcast<'a, T: Array + 'static>(array: &'a ArrayRef, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| PipelineError::Schema(format!("column `{}` has unexpected type", name)))
}
