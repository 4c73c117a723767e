use crate::analyzers::aggregate::aggregate_by_state;
use crate::analyzers::types::AggregateRow;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::parser::load_records;
use chrono::Utc;
use tracing::{debug, info};

/// Loads the configured CSV and aggregates it per state.
///
/// Nothing is cached: every call re-reads the source file from disk.
#[tracing::instrument(skip(config), fields(zero_flights = %config.zero_flights))]
pub fn aggregated_emissions(config: &PipelineConfig) -> Result<Vec<AggregateRow>> {
    info!(requested_at = %Utc::now().to_rfc3339(), "Emissions data requested");

    let records = load_records(&config.source)?;
    let rows = aggregate_by_state(&records, config.zero_flights)?;

    debug!(records = records.len(), states = rows.len(), "Emissions aggregated");
    Ok(rows)
}
