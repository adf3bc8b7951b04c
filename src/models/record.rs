use serde::{Deserialize, Serialize};

/// Status value the backend sends for a student currently on site.
pub const STATUS_CHECKED_IN: &str = "checked_in";

/// Status value the backend sends once a student has left.
pub const STATUS_CHECKED_OUT: &str = "checked_out";

/// Time spent on site, as the backend reports it.
///
/// The upstream system is inconsistent: some records carry a plain minute
/// count, others an informal "1h 30m" style string, and some nothing at all.
/// The untagged representation accepts either JSON number or string;
/// `summary::normalize_minutes` collapses all of it to whole minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeSpent {
    Minutes(f64),
    Text(String),
}

/// One attendance event for a student on a given day.
///
/// Records are read-only to this application; the backend owns storage and
/// archival. Every field is defaulted so a sparse or partially-migrated
/// record still deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub student_id: i64,
    #[serde(default)]
    pub student_name: String,
    /// Open set in practice - unrecognized values are tolerated, not rejected.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub parent_notified: bool,
    /// Opaque timestamp string, displayed as-is.
    #[serde(default)]
    pub checkin_time: Option<String>,
    #[serde(default)]
    pub checkout_time: Option<String>,
    #[serde(default)]
    pub time_spent: Option<TimeSpent>,
    /// Present on archived records, absent on today's live records.
    #[serde(default)]
    pub date: Option<String>,
}

impl AttendanceRecord {
    pub fn is_checked_in(&self) -> bool {
        self.status == STATUS_CHECKED_IN
    }

    pub fn is_checked_out(&self) -> bool {
        self.status == STATUS_CHECKED_OUT
    }

    /// Human-readable status for table cells ("Checked In" / "Checked Out",
    /// unknown values shown verbatim).
    pub fn status_display(&self) -> &str {
        match self.status.as_str() {
            STATUS_CHECKED_IN => "Checked In",
            STATUS_CHECKED_OUT => "Checked Out",
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "id": 7,
            "student_id": 42,
            "student_name": "Ann Chu",
            "status": "checked_in",
            "parent_notified": true,
            "checkin_time": "2026-03-02T08:15:00Z",
            "checkout_time": null,
            "time_spent": "1h 15m",
            "date": "2026-03-02"
        }"#;

        let record: AttendanceRecord =
            serde_json::from_str(json).expect("Failed to parse record JSON");
        assert_eq!(record.id, 7);
        assert_eq!(record.student_name, "Ann Chu");
        assert!(record.is_checked_in());
        assert!(record.parent_notified);
        assert_eq!(
            record.time_spent,
            Some(TimeSpent::Text("1h 15m".to_string()))
        );
        assert_eq!(record.date.as_deref(), Some("2026-03-02"));
    }

    #[test]
    fn test_deserialize_numeric_time_spent() {
        let json = r#"{"id": 1, "student_name": "Bo", "status": "checked_out", "time_spent": 30}"#;
        let record: AttendanceRecord =
            serde_json::from_str(json).expect("Failed to parse record JSON");
        assert_eq!(record.time_spent, Some(TimeSpent::Minutes(30.0)));
        assert!(record.is_checked_out());
    }

    #[test]
    fn test_deserialize_sparse_record() {
        // Only an id - every other field defaults
        let record: AttendanceRecord =
            serde_json::from_str(r#"{"id": 3}"#).expect("Failed to parse sparse record");
        assert_eq!(record.student_name, "");
        assert_eq!(record.status, "");
        assert!(!record.parent_notified);
        assert_eq!(record.time_spent, None);
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_unrecognized_status_tolerated() {
        let json = r#"{"id": 9, "status": "on_field_trip"}"#;
        let record: AttendanceRecord =
            serde_json::from_str(json).expect("Failed to parse record JSON");
        assert!(!record.is_checked_in());
        assert!(!record.is_checked_out());
        assert_eq!(record.status_display(), "on_field_trip");
    }
}
