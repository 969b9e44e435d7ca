use chrono::Utc;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Whole days elapsed since a millisecond epoch timestamp.
/// Future timestamps (clock skew) read as zero days.
pub fn days_since_ms(timestamp_ms: i64) -> i64 {
    let elapsed_ms = Utc::now().timestamp_millis() - timestamp_ms;
    (elapsed_ms / (1000 * 60 * 60 * 24)).max(0)
}

/// Format a millisecond epoch timestamp for display
pub fn format_ms_date(timestamp_ms: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(timestamp_ms) {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_days_since_ms() {
        let now = Utc::now().timestamp_millis();
        assert_eq!(days_since_ms(now), 0);
        assert_eq!(days_since_ms(now - 8 * 24 * 60 * 60 * 1000), 8);
        // Clock skew clamps to zero
        assert_eq!(days_since_ms(now + 60_000), 0);
    }
}
