use crate::analyzers::types::{AggregateRow, RawRecord};
use crate::analyzers::utility::mean;
use crate::config::ZeroFlightPolicy;
use crate::error::{EmissionsError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Running totals for one state while records are being folded in.
struct StateGroup<'a> {
    state_name: &'a str,
    co2_qty_tonnes: f64,
    tf: f64,
    per_flight: Vec<f64>,
}

/// Aggregates [`RawRecord`]s into one [`AggregateRow`] per state.
///
/// CO2 and flight counts are summed per state; `CO2_PER_FLIGHT` is the mean
/// of each record's own ratio. Rows come back ordered by total CO2, highest
/// first, with ties left in the order their state first appeared.
///
/// # Errors
///
/// [`EmissionsError::ZeroFlights`] for a record with `TF == 0` when `policy`
/// is [`ZeroFlightPolicy::Reject`].
pub fn aggregate_by_state(
    records: &[RawRecord],
    policy: ZeroFlightPolicy,
) -> Result<Vec<AggregateRow>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<StateGroup> = Vec::new();
    let mut undefined = 0usize;

    for record in records {
        let ratio = record.co2_per_flight();
        if ratio.is_none() {
            if policy == ZeroFlightPolicy::Reject {
                return Err(EmissionsError::ZeroFlights {
                    state: record.state_name.clone(),
                    flight_month: record.flight_month,
                });
            }
            undefined += 1;
        }

        let slot = *index.entry(record.state_name.as_str()).or_insert_with(|| {
            groups.push(StateGroup {
                state_name: &record.state_name,
                co2_qty_tonnes: 0.0,
                tf: 0.0,
                per_flight: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.co2_qty_tonnes += record.co2_qty_tonnes;
        group.tf += record.tf;
        group.per_flight.extend(ratio);
    }

    if undefined > 0 {
        debug!(records = undefined, "Zero-flight records left out of per-flight means");
    }

    let mut rows: Vec<AggregateRow> = groups
        .into_iter()
        .map(|g| AggregateRow {
            state_name: g.state_name.to_string(),
            co2_qty_tonnes: g.co2_qty_tonnes,
            tf: g.tf,
            co2_per_flight: mean(&g.per_flight),
        })
        .collect();

    // sort_by is stable, so equal totals keep encounter order
    rows.sort_by(|a, b| b.co2_qty_tonnes.total_cmp(&a.co2_qty_tonnes));

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(state: &str, co2: f64, tf: f64, month: u32) -> RawRecord {
        RawRecord {
            state_name: state.to_string(),
            flight_month: NaiveDate::from_ymd_opt(2023, month, 1).unwrap(),
            co2_qty_tonnes: co2,
            tf,
        }
    }

    fn row(state: &str, co2: f64, tf: f64, per_flight: Option<f64>) -> AggregateRow {
        AggregateRow {
            state_name: state.to_string(),
            co2_qty_tonnes: co2,
            tf,
            co2_per_flight: per_flight,
        }
    }

    #[test]
    fn test_two_states() {
        let records = vec![
            record("A", 10.0, 2.0, 1),
            record("A", 20.0, 2.0, 2),
            record("B", 5.0, 1.0, 1),
        ];

        let rows = aggregate_by_state(&records, ZeroFlightPolicy::Skip).unwrap();

        assert_eq!(
            rows,
            vec![row("A", 30.0, 4.0, Some(7.5)), row("B", 5.0, 1.0, Some(5.0))]
        );
    }

    #[test]
    fn test_empty_input() {
        let rows = aggregate_by_state(&[], ZeroFlightPolicy::Reject).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_mean_of_ratios_not_ratio_of_sums() {
        // ratios 1.0 and 100.0; ratio of sums would be 110 / 11 = 10.0
        let records = vec![record("A", 10.0, 10.0, 1), record("A", 100.0, 1.0, 2)];
        let rows = aggregate_by_state(&records, ZeroFlightPolicy::Skip).unwrap();
        assert_eq!(rows[0].co2_per_flight, Some(50.5));
        assert_ne!(rows[0].co2_per_flight, Some(110.0 / 11.0));
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let records = vec![
            record("C", 5.0, 1.0, 1),
            record("A", 50.0, 1.0, 1),
            record("B", 5.0, 1.0, 1),
            record("D", 5.0, 1.0, 1),
        ];

        let rows = aggregate_by_state(&records, ZeroFlightPolicy::Skip).unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.state_name.as_str()).collect();

        assert_eq!(order, vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_interleaved_states_grouped() {
        let records = vec![
            record("A", 1.0, 1.0, 1),
            record("B", 2.0, 1.0, 1),
            record("A", 3.0, 1.0, 2),
            record("B", 4.0, 1.0, 2),
        ];

        let rows = aggregate_by_state(&records, ZeroFlightPolicy::Skip).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], row("B", 6.0, 2.0, Some(3.0)));
        assert_eq!(rows[1], row("A", 4.0, 2.0, Some(2.0)));
    }

    #[test]
    fn test_zero_flights_skipped_from_mean() {
        let records = vec![record("A", 10.0, 2.0, 1), record("A", 7.0, 0.0, 2)];

        let rows = aggregate_by_state(&records, ZeroFlightPolicy::Skip).unwrap();

        assert_eq!(rows, vec![row("A", 17.0, 2.0, Some(5.0))]);
    }

    #[test]
    fn test_zero_flights_only_gives_null_mean() {
        let records = vec![record("A", 3.0, 0.0, 1)];

        let rows = aggregate_by_state(&records, ZeroFlightPolicy::Skip).unwrap();

        assert_eq!(rows, vec![row("A", 3.0, 0.0, None)]);
    }

    #[test]
    fn test_zero_flights_rejected() {
        let records = vec![record("A", 10.0, 2.0, 1), record("B", 7.0, 0.0, 3)];

        match aggregate_by_state(&records, ZeroFlightPolicy::Reject).unwrap_err() {
            EmissionsError::ZeroFlights { state, flight_month } => {
                assert_eq!(state, "B");
                assert_eq!(flight_month, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
