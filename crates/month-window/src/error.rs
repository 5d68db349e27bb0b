//! Error types for month-window operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Unknown timezone: '{0}'")]
    UnknownTimezone(String),

    #[error("Invalid month argument '{0}': expected YYYY-MM")]
    InvalidMonthArg(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),
}

pub type Result<T> = std::result::Result<T, WindowError>;
