use chrono::{DateTime, Local};

/// RFC 3339 timestamp in local time; anything unparseable is shown as-is.
pub fn format_created_at(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_is_verbatim() {
        assert_eq!(format_created_at(""), "");
        assert_eq!(format_created_at("yesterday"), "yesterday");
    }

    #[test]
    fn test_rfc3339_is_reformatted() {
        let shown = format_created_at("2024-05-15T12:00:00Z");
        assert_eq!(shown.len(), "2024-05-01 10:00:00".len());
        assert!(shown.starts_with("2024-05-1"));
    }
}
