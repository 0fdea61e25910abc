//! Projection of the cleaned table onto the comparison features

use crate::error::Result;
use crate::model::FEATURE_NAMES;
use crate::table::{Table, PROCESSED_DELIMITER, REFERENCE_DELIMITER};
use std::path::Path;

/// `Player` followed by the feature columns, in feature order
pub fn key_columns() -> Vec<&'static str> {
    std::iter::once("Player").chain(FEATURE_NAMES).collect()
}

/// Keep identity and feature columns only, preserving row order.
/// A missing column is a data-integrity error.
pub fn select_features(table: &Table) -> Result<Table> {
    table.select(&key_columns())
}

/// Read a cleaned (`;`) table and write its key-stats projection (`,`)
pub fn write_key_stats(cleaned_path: &Path, key_stats_path: &Path) -> Result<usize> {
    let cleaned = Table::read(cleaned_path, PROCESSED_DELIMITER)?;
    let key = select_features(&cleaned)?;
    key.write(key_stats_path, REFERENCE_DELIMITER)?;
    log::info!("Saved {} rows to {}", key.rows.len(), key_stats_path.display());
    Ok(key.rows.len())
}
