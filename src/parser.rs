//! CSV loader for flight emissions records.
//!
//! Decodes the source bytes, normalizes the header row (trimmed, upper case),
//! checks the schema once, and turns every row into a typed [`RawRecord`].
//! Any bad row aborts the whole load.

use std::borrow::Cow;

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Deserialize;
use tracing::debug;

use crate::analyzers::types::RawRecord;
use crate::config::{SourceConfig, SourceEncoding};
use crate::error::{EmissionsError, Result};

pub const STATE_NAME: &str = "STATE_NAME";
pub const FLIGHT_MONTH: &str = "FLIGHT_MONTH";
pub const CO2_QTY_TONNES: &str = "CO2_QTY_TONNES";
pub const TF: &str = "TF";

const REQUIRED_COLUMNS: [&str; 4] = [STATE_NAME, FLIGHT_MONTH, CO2_QTY_TONNES, TF];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A row as it comes out of the CSV reader, before any typing.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "STATE_NAME")]
    state_name: String,
    #[serde(rename = "FLIGHT_MONTH")]
    flight_month: String,
    #[serde(rename = "CO2_QTY_TONNES")]
    co2_qty_tonnes: String,
    #[serde(rename = "TF")]
    tf: String,
}

/// Reads and parses the configured source file.
///
/// # Errors
///
/// [`EmissionsError::SourceUnavailable`] if the file cannot be read, otherwise
/// whatever [`read_records`] reports.
#[tracing::instrument(skip(config), fields(path = %config.path.display(), encoding = %config.encoding))]
pub fn load_records(config: &SourceConfig) -> Result<Vec<RawRecord>> {
    let bytes = std::fs::read(&config.path).map_err(|source| EmissionsError::SourceUnavailable {
        path: config.path.clone(),
        source,
    })?;
    debug!(bytes = bytes.len(), "Source file read");

    read_records(&bytes, config.encoding)
}

/// Parses emissions records from raw bytes in the given encoding.
pub fn read_records(bytes: &[u8], encoding: SourceEncoding) -> Result<Vec<RawRecord>> {
    let text = decode(bytes, encoding)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: StringRecord = rdr.headers()?.iter().map(normalize_header).collect();
    check_schema(&headers)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map_or(0, |p| p.line());
        let parsed: CsvRow = row.deserialize(Some(&headers))?;
        records.push(into_record(parsed, line)?);
    }

    debug!(records = records.len(), "Emissions records parsed");
    Ok(records)
}

/// Decodes source bytes into text.
///
/// A UTF-8 byte-order mark is dropped. Latin-1 maps each byte to the code
/// point of the same value and cannot fail.
pub fn decode(bytes: &[u8], encoding: SourceEncoding) -> Result<Cow<'_, str>> {
    match encoding {
        SourceEncoding::Utf8 => {
            let (skipped, body) = match bytes.strip_prefix(UTF8_BOM) {
                Some(rest) => (UTF8_BOM.len(), rest),
                None => (0, bytes),
            };
            std::str::from_utf8(body)
                .map(Cow::Borrowed)
                .map_err(|e| EmissionsError::EncodingMismatch {
                    encoding: encoding.label(),
                    offset: skipped + e.valid_up_to(),
                })
        }
        SourceEncoding::Latin1 => Ok(Cow::Owned(bytes.iter().copied().map(char::from).collect())),
    }
}

pub fn normalize_header(header: &str) -> String {
    header.trim().to_uppercase()
}

/// Parses a `MM-DD-YYYY` date. Anything else, including single-digit
/// months or days, is rejected.
pub fn parse_flight_month(value: &str) -> Option<NaiveDate> {
    let b = value.as_bytes();
    if b.len() != 10 || b[2] != b'-' || b[5] != b'-' {
        return None;
    }
    let digits_ok = b
        .iter()
        .enumerate()
        .all(|(i, c)| i == 2 || i == 5 || c.is_ascii_digit());
    if !digits_ok {
        return None;
    }

    let month: u32 = value[0..2].parse().ok()?;
    let day: u32 = value[3..5].parse().ok()?;
    let year: i32 = value[6..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn check_schema(headers: &StringRecord) -> Result<()> {
    let mut missing = Vec::new();
    for column in REQUIRED_COLUMNS {
        match headers.iter().filter(|h| *h == column).count() {
            0 => missing.push(column),
            1 => {}
            n => {
                return Err(EmissionsError::MalformedSchema(format!(
                    "column {column} appears {n} times"
                )));
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(EmissionsError::MalformedSchema(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )))
    }
}

fn into_record(row: CsvRow, line: u64) -> Result<RawRecord> {
    if row.state_name.is_empty() {
        return Err(EmissionsError::MalformedSchema(format!(
            "line {line}: {STATE_NAME} is empty"
        )));
    }

    let flight_month =
        parse_flight_month(&row.flight_month).ok_or_else(|| EmissionsError::MalformedDate {
            line,
            value: row.flight_month.clone(),
        })?;

    Ok(RawRecord {
        co2_qty_tonnes: parse_number(&row.co2_qty_tonnes, CO2_QTY_TONNES, line)?,
        tf: parse_number(&row.tf, TF, line)?,
        state_name: row.state_name,
        flight_month,
    })
}

fn parse_number(value: &str, column: &'static str, line: u64) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EmissionsError::MalformedNumber {
            line,
            column,
            value: value.to_string(),
        })
}
