//! Attendance summarization: duration normalization and aggregation.
//!
//! The backend reports "time spent" in whatever shape the upstream check-in
//! kiosk produced: a plain minute count, an informal "1h 30m" string, or
//! garbage. These functions collapse a record list into the two derived
//! shapes the dashboard renders - status counters for the summary panel and
//! a per-student minute series for the chart. Both are recomputed from the
//! current record list on every call; nothing here does I/O or keeps state.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{AttendanceRecord, TimeSpent, STATUS_CHECKED_IN, STATUS_CHECKED_OUT};

/// Status and notification counters for a record list.
///
/// Counters increment independently - a checked-in record whose parent was
/// notified counts toward both `checked_in` and `notified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub checked_in: usize,
    pub checked_out: usize,
    pub notified: usize,
}

/// One chart data point: a student's name and their normalized minutes.
/// Produced one per record, in record order, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationPoint {
    pub student_name: String,
    pub minutes: u64,
}

static HOUR_MINUTE_RE: OnceLock<Regex> = OnceLock::new();

/// "1h 30m" style pattern. Both digit groups are optional so a bare "h"
/// still matches and resolves to zero.
fn hour_minute_re() -> &'static Regex {
    HOUR_MINUTE_RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)?\s*h\s*(\d+)?\s*m?").expect("hour/minute pattern is valid")
    })
}

/// Normalize a time-spent value to whole minutes. Total over its domain:
/// any input resolves to a number, malformed values degrade to 0 rather
/// than erroring, since the result feeds a chart axis.
///
/// - Absent -> 0.
/// - Numeric -> passed through as minutes (fractional values truncate,
///   negative or non-finite values clamp to 0).
/// - Text with an "h" hour marker -> hours*60 + minutes via the pattern
///   above; text containing "h" that the pattern cannot read at all -> 0,
///   with no digit-strip fallback.
/// - Other text -> every non-digit stripped, remainder parsed as an
///   integer; empty or unparseable -> 0.
pub fn normalize_minutes(value: Option<&TimeSpent>) -> u64 {
    match value {
        None => 0,
        Some(TimeSpent::Minutes(m)) => {
            if m.is_finite() && *m > 0.0 {
                *m as u64
            } else {
                0
            }
        }
        Some(TimeSpent::Text(text)) => normalize_text(text),
    }
}

fn normalize_text(text: &str) -> u64 {
    if text.to_lowercase().contains('h') {
        match hour_minute_re().captures(text) {
            Some(caps) => {
                let hours = caps
                    .get(1)
                    .and_then(|m| m.as_str().parse::<u64>().ok())
                    .unwrap_or(0);
                let minutes = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse::<u64>().ok())
                    .unwrap_or(0);
                hours * 60 + minutes
            }
            None => 0,
        }
    } else {
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse::<u64>().unwrap_or(0)
    }
}

/// Reduce a record sequence to its status summary and per-record duration
/// series in a single pass. Point order matches record order; the summary
/// does not depend on order at all. Empty input yields an all-zero summary
/// and an empty series.
///
/// Accepts any iterator of record references so filtered views aggregate
/// without copying the records first.
pub fn aggregate<'a, I>(records: I) -> (StatusSummary, Vec<DurationPoint>)
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let records = records.into_iter();
    let mut summary = StatusSummary::default();
    let mut points = Vec::with_capacity(records.size_hint().0);

    for record in records {
        match record.status.as_str() {
            STATUS_CHECKED_IN => summary.checked_in += 1,
            STATUS_CHECKED_OUT => summary.checked_out += 1,
            // Open status set: unrecognized values count toward neither
            _ => {}
        }
        if record.parent_notified {
            summary.notified += 1;
        }
        points.push(DurationPoint {
            student_name: record.student_name.clone(),
            minutes: normalize_minutes(record.time_spent.as_ref()),
        });
    }

    (summary, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotifiedFilter, RecordFilter};

    fn minutes(m: f64) -> Option<TimeSpent> {
        Some(TimeSpent::Minutes(m))
    }

    fn text(s: &str) -> Option<TimeSpent> {
        Some(TimeSpent::Text(s.to_string()))
    }

    fn record(
        name: &str,
        status: &str,
        notified: bool,
        time_spent: Option<TimeSpent>,
    ) -> AttendanceRecord {
        AttendanceRecord {
            id: 0,
            student_id: 0,
            student_name: name.to_string(),
            status: status.to_string(),
            parent_notified: notified,
            checkin_time: None,
            checkout_time: None,
            time_spent,
            date: None,
        }
    }

    // -------------------------------------------------------------------------
    // Normalizer Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_normalize_absent_and_empty() {
        assert_eq!(normalize_minutes(None), 0);
        assert_eq!(normalize_minutes(text("").as_ref()), 0);
    }

    #[test]
    fn test_normalize_numeric_passthrough() {
        assert_eq!(normalize_minutes(minutes(0.0).as_ref()), 0);
        assert_eq!(normalize_minutes(minutes(45.0).as_ref()), 45);
    }

    #[test]
    fn test_normalize_numeric_edge_values() {
        // Fractional truncates, negatives and non-finite clamp to 0
        assert_eq!(normalize_minutes(minutes(45.9).as_ref()), 45);
        assert_eq!(normalize_minutes(minutes(-30.0).as_ref()), 0);
        assert_eq!(normalize_minutes(minutes(f64::NAN).as_ref()), 0);
        assert_eq!(normalize_minutes(minutes(f64::INFINITY).as_ref()), 0);
    }

    #[test]
    fn test_normalize_hour_minute_text() {
        assert_eq!(normalize_minutes(text("1h 30m").as_ref()), 90);
        assert_eq!(normalize_minutes(text("1h").as_ref()), 60);
        assert_eq!(normalize_minutes(text("2h5m").as_ref()), 125);
    }

    #[test]
    fn test_normalize_hour_minute_case_insensitive() {
        assert_eq!(normalize_minutes(text("2H 5M").as_ref()), 125);
        assert_eq!(normalize_minutes(text("1H 30M").as_ref()), 90);
    }

    #[test]
    fn test_normalize_digit_strip_without_hour_marker() {
        assert_eq!(normalize_minutes(text("45 min").as_ref()), 45);
        assert_eq!(normalize_minutes(text("90").as_ref()), 90);
        assert_eq!(normalize_minutes(text("  25 m.  ").as_ref()), 25);
    }

    #[test]
    fn test_normalize_unparseable_text() {
        assert_eq!(normalize_minutes(text("abc").as_ref()), 0);
        assert_eq!(normalize_minutes(text("n/a").as_ref()), 0);
        // Contains "h" but no digits the pattern can read - stays 0, no
        // digit-strip fallback
        assert_eq!(normalize_minutes(text("hhh").as_ref()), 0);
        assert_eq!(normalize_minutes(text("who knows").as_ref()), 0);
    }

    // -------------------------------------------------------------------------
    // Aggregator Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_aggregate_empty() {
        let records: Vec<AttendanceRecord> = Vec::new();
        let (summary, points) = aggregate(&records);
        assert_eq!(summary, StatusSummary::default());
        assert!(points.is_empty());
    }

    #[test]
    fn test_aggregate_counters_independent() {
        // A checked-in record with a notified parent bumps both counters
        let records = vec![record("Ann", "checked_in", true, None)];
        let (summary, _) = aggregate(&records);
        assert_eq!(summary.checked_in, 1);
        assert_eq!(summary.checked_out, 0);
        assert_eq!(summary.notified, 1);
    }

    #[test]
    fn test_aggregate_unknown_status_still_counts_notified() {
        let records = vec![
            record("Ann", "on_field_trip", true, minutes(10.0)),
            record("Bo", "", false, None),
        ];
        let (summary, points) = aggregate(&records);
        assert_eq!(summary.checked_in, 0);
        assert_eq!(summary.checked_out, 0);
        assert_eq!(summary.notified, 1);
        // Unknown-status records still contribute duration points
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].minutes, 10);
    }

    #[test]
    fn test_aggregate_status_counts_bounded_by_input() {
        let records = vec![
            record("Ann", "checked_in", false, None),
            record("Bo", "checked_out", true, None),
            record("Cy", "mystery", true, None),
        ];
        let (summary, _) = aggregate(&records);
        assert!(summary.checked_in + summary.checked_out <= records.len());
    }

    #[test]
    fn test_aggregate_point_order_and_duplicates() {
        let records = vec![
            record("Ann", "checked_in", false, minutes(5.0)),
            record("Ann", "checked_out", false, minutes(7.0)),
            record("Bo", "checked_in", false, minutes(9.0)),
        ];
        let (_, points) = aggregate(&records);
        assert_eq!(points.len(), records.len());
        // Duplicate names are kept, order matches input
        let names: Vec<&str> = points.iter().map(|p| p.student_name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Ann", "Bo"]);
        let mins: Vec<u64> = points.iter().map(|p| p.minutes).collect();
        assert_eq!(mins, vec![5, 7, 9]);
    }

    #[test]
    fn test_aggregate_end_to_end() {
        let records = vec![
            record("Ann", "checked_in", true, text("1h 15m")),
            record("Bo", "checked_out", false, minutes(30.0)),
        ];
        let (summary, points) = aggregate(&records);

        assert_eq!(summary.checked_in, 1);
        assert_eq!(summary.checked_out, 1);
        assert_eq!(summary.notified, 1);
        assert_eq!(
            points,
            vec![
                DurationPoint {
                    student_name: "Ann".to_string(),
                    minutes: 75
                },
                DurationPoint {
                    student_name: "Bo".to_string(),
                    minutes: 30
                },
            ]
        );
    }

    #[test]
    fn test_filter_then_aggregate() {
        let records = vec![
            record("Ann", "checked_in", true, text("1h 15m")),
            record("Bo", "checked_out", false, minutes(30.0)),
        ];
        let filter = RecordFilter {
            notified: NotifiedFilter::Yes,
            ..Default::default()
        };

        let narrowed = filter.apply(&records);
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].student_name, "Ann");

        let (summary, points) = aggregate(narrowed.iter().copied());
        assert_eq!(summary.checked_in, 1);
        assert_eq!(summary.checked_out, 0);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].minutes, 75);
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let records = vec![
            record("Ann", "checked_in", true, text("2h")),
            record("Bo", "checked_out", false, text("45 min")),
        ];
        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
