//! Per-state emissions aggregation.
//!
//! Takes the typed records produced by the loader, sums CO2 and flight
//! counts per state, averages the per-flight ratio, and orders the states
//! by total CO2.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
