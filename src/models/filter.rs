//! Record filtering for the dashboard views.
//!
//! Filtering is a pure predicate composition applied before aggregation:
//! a case-insensitive substring match on the student name, an exact status
//! match (or match-all), and a tri-state parent-notified match.

use crate::models::record::AttendanceRecord;
use crate::utils::contains_ignore_case;

/// Status filter state, cycled with the `s` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    CheckedIn,
    CheckedOut,
}

impl StatusFilter {
    pub fn next(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::CheckedIn,
            StatusFilter::CheckedIn => StatusFilter::CheckedOut,
            StatusFilter::CheckedOut => StatusFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::CheckedIn => "Checked In",
            StatusFilter::CheckedOut => "Checked Out",
        }
    }

    fn matches(&self, record: &AttendanceRecord) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::CheckedIn => record.is_checked_in(),
            StatusFilter::CheckedOut => record.is_checked_out(),
        }
    }
}

/// Parent-notified filter state, cycled with the `n` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifiedFilter {
    #[default]
    All,
    Yes,
    No,
}

impl NotifiedFilter {
    pub fn next(&self) -> Self {
        match self {
            NotifiedFilter::All => NotifiedFilter::Yes,
            NotifiedFilter::Yes => NotifiedFilter::No,
            NotifiedFilter::No => NotifiedFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotifiedFilter::All => "All",
            NotifiedFilter::Yes => "Yes",
            NotifiedFilter::No => "No",
        }
    }

    fn matches(&self, record: &AttendanceRecord) -> bool {
        match self {
            NotifiedFilter::All => true,
            NotifiedFilter::Yes => record.parent_notified,
            NotifiedFilter::No => !record.parent_notified,
        }
    }
}

/// Combined filter applied to a record list before display and aggregation.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub name_query: String,
    pub status: StatusFilter,
    pub notified: NotifiedFilter,
}

impl RecordFilter {
    /// True when no predicate narrows the list.
    pub fn is_empty(&self) -> bool {
        self.name_query.is_empty()
            && self.status == StatusFilter::All
            && self.notified == NotifiedFilter::All
    }

    /// Evaluate all three predicates, short-circuiting left to right.
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        (self.name_query.is_empty()
            || contains_ignore_case(&record.student_name, &self.name_query))
            && self.status.matches(record)
            && self.notified.matches(record)
    }

    /// Narrow a record list, preserving input order.
    pub fn apply<'a>(&self, records: &'a [AttendanceRecord]) -> Vec<&'a AttendanceRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, status: &str, notified: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: 0,
            student_id: 0,
            student_name: name.to_string(),
            status: status.to_string(),
            parent_notified: notified,
            checkin_time: None,
            checkout_time: None,
            time_spent: None,
            date: None,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = RecordFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&record("Ann", "checked_in", true)));
        assert!(filter.matches(&record("", "on_field_trip", false)));
    }

    #[test]
    fn test_name_query_case_insensitive() {
        let filter = RecordFilter {
            name_query: "ann".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&record("Ann Chu", "checked_in", false)));
        assert!(filter.matches(&record("JOANNE", "checked_in", false)));
        assert!(!filter.matches(&record("Bo", "checked_in", false)));
    }

    #[test]
    fn test_status_filter_cycle() {
        assert_eq!(StatusFilter::All.next(), StatusFilter::CheckedIn);
        assert_eq!(StatusFilter::CheckedIn.next(), StatusFilter::CheckedOut);
        assert_eq!(StatusFilter::CheckedOut.next(), StatusFilter::All); // Wraps around
    }

    #[test]
    fn test_notified_filter() {
        let filter = RecordFilter {
            notified: NotifiedFilter::Yes,
            ..Default::default()
        };
        assert!(filter.matches(&record("Ann", "checked_in", true)));
        assert!(!filter.matches(&record("Bo", "checked_out", false)));

        let filter = RecordFilter {
            notified: NotifiedFilter::No,
            ..Default::default()
        };
        assert!(!filter.matches(&record("Ann", "checked_in", true)));
        assert!(filter.matches(&record("Bo", "checked_out", false)));
    }

    #[test]
    fn test_combined_predicates_order_preserved() {
        let records = vec![
            record("Ann", "checked_in", true),
            record("Anna", "checked_out", true),
            record("Bo", "checked_in", true),
            record("Andre", "checked_in", false),
        ];
        let filter = RecordFilter {
            name_query: "an".to_string(),
            status: StatusFilter::CheckedIn,
            notified: NotifiedFilter::Yes,
        };

        let matched = filter.apply(&records);
        let names: Vec<&str> = matched.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["Ann"]);
    }
}
