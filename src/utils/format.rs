/// Case-insensitive substring check, used by search and filtering
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a minute count for display: "1h 30m", "45m", "0m"
pub fn format_minutes(minutes: u64) -> String {
    if minutes >= 60 {
        let hours = minutes / 60;
        let rest = minutes % 60;
        if rest == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, rest)
        }
    } else {
        format!("{}m", minutes)
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%b %d, %Y").to_string()
    } else if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

/// Format an opaque timestamp string as a clock time where possible.
/// The backend sends RFC 3339 timestamps; anything else is shown as-is.
pub fn format_time(timestamp: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(timestamp) {
        dt.format("%H:%M").to_string()
    } else {
        timestamp.to_string()
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline
pub fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Ann Chu", "ann"));
        assert!(contains_ignore_case("Ann Chu", "CHU"));
        assert!(contains_ignore_case("Ann Chu", ""));
        assert!(!contains_ignore_case("Ann Chu", "bo"));
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(60), "1h");
        assert_eq!(format_minutes(90), "1h 30m");
        assert_eq!(format_minutes(125), "2h 5m");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-03-02"), "Mar 02, 2026");
        assert_eq!(format_date("not a date"), "not a date");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time("2026-03-02T08:15:00Z"), "08:15");
        assert_eq!(format_time("8:15am"), "8:15am");
    }

    #[test]
    fn test_csv_field() {
        assert_eq!(csv_field("Ann"), "Ann");
        assert_eq!(csv_field("Chu, Ann"), "\"Chu, Ann\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
    }
}
