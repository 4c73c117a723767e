//! Output formatting and persistence for aggregated emissions.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::Result;
use tracing::{debug, info};

use crate::analyzers::types::AggregateRow;
use csv::WriterBuilder;
use std::fs::File;

/// Logs the aggregate using Rust's debug pretty-print format.
pub fn print_pretty(rows: &[AggregateRow]) {
    info!("{:#?}", rows);
}

/// Logs the aggregate as pretty-printed JSON.
pub fn print_json(rows: &[AggregateRow]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

/// Writes the aggregate to a CSV file, replacing any existing content.
///
/// Columns use the same upper-case names as the source file. A state whose
/// per-flight mean is undefined gets an empty `CO2_PER_FLIGHT` cell.
pub fn write_summary_csv(path: &str, rows: &[AggregateRow]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing summary CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path, rows = rows.len(), "Summary CSV written");
    Ok(())
}
