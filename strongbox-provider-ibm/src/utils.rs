//! Utility functions for value formatting

use chrono::{DateTime, SecondsFormat, Utc};

/// Render a service timestamp as RFC 3339 with millisecond precision (e.g., "2022-11-03T10:00:00.000Z")
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Identifier for a data source read: the UTC wall-clock time of the read
///
/// Two reads within the same instant share an identifier; hosts treat data
/// source identifiers as opaque.
pub fn data_source_id() -> String {
    Utc::now().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_datetime() {
        let value = Utc.with_ymd_and_hms(2022, 11, 3, 10, 0, 0).unwrap();
        assert_eq!(format_datetime(&value), "2022-11-03T10:00:00.000Z");
    }

    #[test]
    fn test_data_source_id_is_utc_timestamp() {
        let id = data_source_id();
        assert!(id.ends_with(" UTC"), "unexpected id: {}", id);
    }
}
