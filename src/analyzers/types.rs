//! Data types used by the aggregation pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized row of the emissions CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub state_name: String,
    pub flight_month: NaiveDate,
    pub co2_qty_tonnes: f64,
    pub tf: f64,
}

impl RawRecord {
    /// CO2 tonnes per flight for this record, `None` when no flights were reported.
    pub fn co2_per_flight(&self) -> Option<f64> {
        if self.tf == 0.0 {
            None
        } else {
            Some(self.co2_qty_tonnes / self.tf)
        }
    }
}

/// Per-state summary served to the dashboard.
///
/// Field names serialize in upper case to match the source column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    #[serde(rename = "STATE_NAME")]
    pub state_name: String,
    #[serde(rename = "CO2_QTY_TONNES")]
    pub co2_qty_tonnes: f64,
    #[serde(rename = "TF")]
    pub tf: f64,
    /// Mean of the per-record ratios, not total CO2 over total flights.
    #[serde(rename = "CO2_PER_FLIGHT")]
    pub co2_per_flight: Option<f64>,
}
