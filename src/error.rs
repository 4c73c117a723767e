//! Error type for the load and aggregate pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Every way a request for aggregated emissions can fail.
#[derive(Error, Debug)]
pub enum EmissionsError {
    /// Source file missing or unreadable
    #[error("cannot read emissions source {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes are not valid in the declared encoding
    #[error("source is not valid {encoding} (first bad byte at offset {offset})")]
    EncodingMismatch {
        encoding: &'static str,
        offset: usize,
    },

    /// Required column absent or duplicated after header normalization
    #[error("malformed schema: {0}")]
    MalformedSchema(String),

    /// Structurally broken CSV
    #[error("malformed CSV: {0}")]
    MalformedCsv(#[from] csv::Error),

    /// FLIGHT_MONTH not in MM-DD-YYYY form
    #[error("line {line}: FLIGHT_MONTH '{value}' does not match MM-DD-YYYY")]
    MalformedDate { line: u64, value: String },

    /// Numeric column holds something that is not a finite number
    #[error("line {line}: {column} '{value}' is not a number")]
    MalformedNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    /// Zero flight count under the reject policy
    #[error("division by zero: {state} reported 0 flights for {flight_month}")]
    ZeroFlights {
        state: String,
        flight_month: NaiveDate,
    },
}

impl EmissionsError {
    /// Stable identifier for the error kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            EmissionsError::SourceUnavailable { .. } => "SourceUnavailable",
            EmissionsError::EncodingMismatch { .. } => "EncodingMismatch",
            EmissionsError::MalformedSchema(_) => "MalformedSchema",
            EmissionsError::MalformedCsv(_) => "MalformedCsv",
            EmissionsError::MalformedDate { .. } => "MalformedDate",
            EmissionsError::MalformedNumber { .. } => "MalformedNumber",
            EmissionsError::ZeroFlights { .. } => "ArithmeticError",
        }
    }
}

pub type Result<T> = std::result::Result<T, EmissionsError>;
