//! Runtime configuration for the emissions pipeline.
//!
//! Nothing here is global: the binary builds a [`PipelineConfig`] from CLI
//! flags and environment variables and hands it to whoever needs it.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Text encoding of the source CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl SourceEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Latin1 => "latin-1",
        }
    }
}

impl FromStr for SourceEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(SourceEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(SourceEncoding::Latin1),
            other => Err(format!("unsupported encoding '{other}'")),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to do with a record whose flight count is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroFlightPolicy {
    /// Keep the record in the sums, leave it out of the per-flight mean.
    #[default]
    Skip,
    /// Fail the whole aggregation.
    Reject,
}

impl FromStr for ZeroFlightPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(ZeroFlightPolicy::Skip),
            "reject" => Ok(ZeroFlightPolicy::Reject),
            other => Err(format!("unknown zero-flight policy '{other}' (expected skip or reject)")),
        }
    }
}

impl fmt::Display for ZeroFlightPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroFlightPolicy::Skip => f.write_str("skip"),
            ZeroFlightPolicy::Reject => f.write_str("reject"),
        }
    }
}

/// Where the emissions CSV lives and how its bytes are encoded.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub encoding: SourceEncoding,
}

impl SourceConfig {
    pub fn new(path: impl Into<PathBuf>, encoding: SourceEncoding) -> Self {
        Self {
            path: path.into(),
            encoding,
        }
    }
}

/// Everything a single run of load + aggregate needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub zero_flights: ZeroFlightPolicy,
}
