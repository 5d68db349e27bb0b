//! The `YYYY-MM` month argument.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, WindowError};
use crate::window::{compute_month_window, MonthWindow};

/// A calendar month, parsed from and displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Build a month, rejecting month numbers outside 1-12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(WindowError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The [`MonthWindow`] of this month in `timezone`.
    pub fn window(&self, timezone: &str, now: Option<DateTime<Utc>>) -> Result<MonthWindow> {
        compute_month_window(self.year, self.month, timezone, now)
    }
}

impl FromStr for YearMonth {
    type Err = WindowError;

    /// Parse exactly four year digits, a dash, and two month digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use month_window::YearMonth;
    ///
    /// let m: YearMonth = "2025-10".parse().unwrap();
    /// assert_eq!((m.year, m.month), (2025, 10));
    /// assert!("2025-1".parse::<YearMonth>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || WindowError::InvalidMonthArg(s.to_string());

        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || month.len() != 2 || !all_digits(year) || !all_digits(month) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let m: YearMonth = "2025-02".parse().unwrap();
        assert_eq!(m, YearMonth { year: 2025, month: 2 });
        assert_eq!(m.to_string(), "2025-02");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let m: YearMonth = " 2024-12\n".parse().unwrap();
        assert_eq!(m.to_string(), "2024-12");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["2025-2", "25-02", "2025/02", "abcd-ef", "2025-02-01", "", "2025-", "+202-01"] {
            let err = input.parse::<YearMonth>().unwrap_err();
            assert_eq!(
                err,
                WindowError::InvalidMonthArg(input.to_string()),
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range_month() {
        assert_eq!(
            "2025-13".parse::<YearMonth>().unwrap_err(),
            WindowError::InvalidMonth(13)
        );
        assert_eq!(
            "2025-00".parse::<YearMonth>().unwrap_err(),
            WindowError::InvalidMonth(0)
        );
    }

    #[test]
    fn test_error_message_names_the_input() {
        let err = "October".parse::<YearMonth>().unwrap_err();
        assert!(err.to_string().contains("'October'"), "got: {err}");
    }

    #[test]
    fn test_window_delegates_to_calculator() {
        let m: YearMonth = "2024-02".parse().unwrap();
        let w = m.window("Europe/Rome", None).unwrap();
        assert_eq!(w.total_days(), 29);
    }

    #[test]
    fn test_ordering_is_chronological() {
        let a: YearMonth = "2024-12".parse().unwrap();
        let b: YearMonth = "2025-01".parse().unwrap();
        assert!(a < b);
    }
}
