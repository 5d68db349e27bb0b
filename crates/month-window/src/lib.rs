//! # month-window
//!
//! Deterministic month framing for FinOps policy agents.
//!
//! Policy prompts ask an LLM agent to reason about month-to-date spend,
//! end-of-month forecasts and month-end checks. The agent is never asked to
//! work out calendar facts itself: this crate computes the month's first and
//! last day in the policy timezone, the clamped "today", and the day counts
//! the prompt quotes.
//!
//! ## Modules
//!
//! - [`window`] — [`compute_month_window`] and the [`MonthWindow`] value
//! - [`month`] — the `YYYY-MM` month argument
//! - [`timestamp`] — report file timestamps
//! - [`error`] — Error types

pub mod error;
pub mod month;
pub mod timestamp;
pub mod window;

pub use error::WindowError;
pub use month::YearMonth;
pub use timestamp::{report_timestamp, REPORT_TIMESTAMP_FORMAT};
pub use window::{
    compute_month_window, parse_timezone, MonthWindow, WindowPhase, WindowSummary,
    DEFAULT_TIMEZONE,
};
