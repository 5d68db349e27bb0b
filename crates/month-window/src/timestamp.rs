//! Run timestamps used to name report artifacts.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::window::parse_timezone;

/// Format used in report file names (e.g., `20251014_093005`).
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Render `now` as a report timestamp in the local time of `timezone`.
///
/// # Errors
///
/// Returns [`WindowError::UnknownTimezone`](crate::WindowError::UnknownTimezone)
/// if the timezone name does not resolve.
pub fn report_timestamp(now: DateTime<Utc>, timezone: &str) -> Result<String> {
    let tz = parse_timezone(timezone)?;
    Ok(now
        .with_timezone(&tz)
        .format(REPORT_TIMESTAMP_FORMAT)
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_uses_local_time() {
        // 22:15 UTC in July is 00:15 the next day in Rome (CEST).
        let now = Utc.with_ymd_and_hms(2025, 7, 31, 22, 15, 7).unwrap();
        assert_eq!(report_timestamp(now, "Europe/Rome").unwrap(), "20250801_001507");
        assert_eq!(report_timestamp(now, "UTC").unwrap(), "20250731_221507");
    }

    #[test]
    fn test_timestamp_unknown_timezone() {
        let now = Utc.with_ymd_and_hms(2025, 7, 31, 22, 15, 7).unwrap();
        assert!(report_timestamp(now, "Nowhere/City").is_err());
    }
}
