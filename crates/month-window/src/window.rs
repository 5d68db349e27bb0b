//! Month-window and observation-boundary computation.
//!
//! Every policy prompt is framed by a calendar month evaluated in a named
//! timezone: its first and last day, the "today" the agent should reason
//! about, and how many days of the month have been observed or remain.
//! The computation is pure apart from an optional clock read, so the same
//! inputs always frame the same window.
//!
//! # Clamping
//!
//! The reference instant is clamped into `[start, end]`. Running against a
//! past month treats its last day as "today"; running against a future month
//! treats its first day as "today". [`MonthWindow::phase`] records which of
//! the two happened so callers can tell a clamped window from a live one.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Result, WindowError};

/// Timezone the FinOps policies are evaluated in unless configured otherwise.
pub const DEFAULT_TIMEZONE: &str = "Europe/Rome";

/// Where the unclamped "now" fell relative to the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPhase {
    /// "now" precedes the first day; the reference instant was moved to `start`.
    NotStarted,
    /// "now" falls on one of the month's days.
    InProgress,
    /// "now" follows the last day; the reference instant was moved to `end`.
    Concluded,
}

/// A calendar month framed in a timezone, with a clamped observation point.
#[derive(Debug, Clone)]
pub struct MonthWindow {
    /// The timezone every other field is expressed in.
    pub timezone: Tz,
    /// Local midnight of the first day (inclusive).
    pub start: DateTime<Tz>,
    /// Local midnight of the last day (inclusive).
    pub end: DateTime<Tz>,
    /// The "now" instant, clamped into `[start, end]`.
    pub reference_instant: DateTime<Tz>,
    /// Days from `start` through the reference day, inclusive.
    pub days_observed: u32,
    /// Days after the reference day through `end`.
    pub remaining_days: u32,
    /// Whether the reference day is the month's last day.
    pub is_month_end: bool,
    /// Whether clamping moved the reference instant, and in which direction.
    pub phase: WindowPhase,
}

/// A serializable view of a [`MonthWindow`] with ISO calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSummary {
    pub timezone: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub today: NaiveDate,
    pub days_observed: u32,
    pub remaining_days: u32,
    pub total_days: u32,
    pub is_month_end: bool,
    pub phase: WindowPhase,
}

impl MonthWindow {
    /// Calendar date of `start`.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Calendar date of `end`.
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Calendar date of the clamped reference instant.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_instant.date_naive()
    }

    /// Number of calendar days in the month.
    pub fn total_days(&self) -> u32 {
        day_count(self.end_date().signed_duration_since(self.start_date()).num_days() + 1)
    }

    /// ISO-date view consumed by prompt builders and the `window` command.
    pub fn summary(&self) -> WindowSummary {
        WindowSummary {
            timezone: self.timezone.name().to_string(),
            start: self.start_date(),
            end: self.end_date(),
            today: self.reference_date(),
            days_observed: self.days_observed,
            remaining_days: self.remaining_days,
            total_days: self.total_days(),
            is_month_end: self.is_month_end,
            phase: self.phase,
        }
    }
}

/// Compute the window for `(year, month)` in `timezone`.
///
/// # Arguments
///
/// * `year` — Calendar year
/// * `month` — Month number, 1-12
/// * `timezone` — An IANA timezone name (e.g., `"Europe/Rome"`)
/// * `now` — The reference instant; `None` reads the system clock
///
/// # Errors
///
/// Returns [`WindowError::InvalidMonth`] if `month` is outside 1-12,
/// [`WindowError::UnknownTimezone`] if the timezone name does not resolve, or
/// [`WindowError::InvalidDatetime`] if the year is outside chrono's range.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use month_window::compute_month_window;
///
/// let now = Utc.with_ymd_and_hms(2025, 2, 10, 11, 0, 0).unwrap();
/// let window = compute_month_window(2025, 2, "Europe/Rome", Some(now)).unwrap();
/// assert_eq!(window.end_date().to_string(), "2025-02-28");
/// assert_eq!(window.days_observed, 10);
/// assert_eq!(window.remaining_days, 18);
/// assert!(!window.is_month_end);
/// ```
pub fn compute_month_window(
    year: i32,
    month: u32,
    timezone: &str,
    now: Option<DateTime<Utc>>,
) -> Result<MonthWindow> {
    if !(1..=12).contains(&month) {
        return Err(WindowError::InvalidMonth(month));
    }
    let tz = parse_timezone(timezone)?;

    let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        WindowError::InvalidDatetime(format!("{year}-{month:02} is outside the supported range"))
    })?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let last_day = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .ok_or_else(|| {
            WindowError::InvalidDatetime(format!(
                "last day of {year}-{month:02} is outside the supported range"
            ))
        })?;

    let start = local_start_of_day(&tz, first_day)?;
    let end = local_start_of_day(&tz, last_day)?;

    let now = now.unwrap_or_else(Utc::now).with_timezone(&tz);
    let reference_instant = if now < start {
        start
    } else if now > end {
        end
    } else {
        now
    };

    // The clamp compares instants; the phase compares calendar days, so any
    // time on the last day is still "in progress".
    let phase = if now.date_naive() < first_day {
        WindowPhase::NotStarted
    } else if now.date_naive() > last_day {
        WindowPhase::Concluded
    } else {
        WindowPhase::InProgress
    };

    let reference_date = reference_instant.date_naive();
    let days_observed = reference_date.signed_duration_since(first_day).num_days() + 1;
    let remaining_days = last_day.signed_duration_since(reference_date).num_days();

    Ok(MonthWindow {
        timezone: tz,
        start,
        end,
        reference_instant,
        days_observed: day_count(days_observed),
        remaining_days: day_count(remaining_days),
        is_month_end: reference_date == last_day,
        phase,
    })
}

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| WindowError::UnknownTimezone(s.to_string()))
}

/// First valid local instant of `date` in `tz`.
///
/// Midnight is used when it exists (the earlier reading if it is ambiguous).
/// In zones whose DST transition skips midnight, the first whole hour that
/// exists on that day is used instead.
fn local_start_of_day(tz: &Tz, date: NaiveDate) -> Result<DateTime<Tz>> {
    (0..4)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| tz.from_local_datetime(&naive).earliest())
        .ok_or_else(|| {
            WindowError::InvalidDatetime(format!(
                "no valid start of day for {date} in {}",
                tz.name()
            ))
        })
}

/// Floor a signed day difference at zero.
fn day_count(days: i64) -> u32 {
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    /// A wall-clock time in Rome, as a UTC instant.
    fn rome(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        chrono_tz::Europe::Rome
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── Concrete scenarios ──────────────────────────────────────────────

    #[test]
    fn test_mid_february_2025() {
        let w = compute_month_window(2025, 2, "Europe/Rome", Some(rome(2025, 2, 10, 12, 0)))
            .unwrap();
        assert_eq!(w.start_date(), date(2025, 2, 1));
        assert_eq!(w.end_date(), date(2025, 2, 28));
        assert_eq!(w.reference_date(), date(2025, 2, 10));
        assert_eq!(w.days_observed, 10);
        assert_eq!(w.remaining_days, 18);
        assert!(!w.is_month_end);
        assert_eq!(w.phase, WindowPhase::InProgress);
    }

    #[test]
    fn test_leap_day_late_evening() {
        let w = compute_month_window(2024, 2, "Europe/Rome", Some(rome(2024, 2, 29, 23, 59)))
            .unwrap();
        assert_eq!(w.end_date(), date(2024, 2, 29));
        assert_eq!(w.days_observed, 29);
        assert_eq!(w.remaining_days, 0);
        assert!(w.is_month_end);
        // 23:59 is past `end` (midnight), so the instant is clamped, but the
        // day itself is still part of the month.
        assert_eq!(w.reference_instant, w.end);
        assert_eq!(w.phase, WindowPhase::InProgress);
    }

    #[test]
    fn test_december_after_month_clamps_to_end() {
        let w = compute_month_window(2025, 12, "Europe/Rome", Some(rome(2026, 1, 15, 9, 0)))
            .unwrap();
        assert_eq!(w.end_date(), date(2025, 12, 31));
        assert_eq!(w.reference_date(), date(2025, 12, 31));
        assert_eq!(w.days_observed, 31);
        assert_eq!(w.remaining_days, 0);
        assert!(w.is_month_end);
        assert_eq!(w.phase, WindowPhase::Concluded);
    }

    // ── Month lengths ───────────────────────────────────────────────────

    #[test]
    fn test_month_lengths_2025() {
        let expected = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        let now = rome(2025, 6, 15, 12, 0);
        for (i, len) in expected.iter().enumerate() {
            let month = i as u32 + 1;
            let w = compute_month_window(2025, month, "Europe/Rome", Some(now)).unwrap();
            assert_eq!(w.total_days(), *len, "month {month}");
            assert_eq!(w.end_date(), date(2025, month, *len));
            assert!(w.start_date() <= w.end_date());
        }
    }

    #[test]
    fn test_february_leap_and_common_years() {
        let now = rome(2000, 1, 1, 0, 0);
        for (year, last) in [(2024, 29), (2023, 28), (2000, 29), (1900, 28), (2100, 28)] {
            let w = compute_month_window(year, 2, "Europe/Rome", Some(now)).unwrap();
            assert_eq!(w.end_date(), date(year, 2, last), "year {year}");
        }
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let w = compute_month_window(2025, 12, "UTC", Some(rome(2025, 12, 5, 12, 0))).unwrap();
        assert_eq!(w.start_date(), date(2025, 12, 1));
        assert_eq!(w.end_date(), date(2025, 12, 31));
        assert_eq!(w.total_days(), 31);
    }

    // ── Clamping ────────────────────────────────────────────────────────

    #[test]
    fn test_now_before_start_clamps_to_start() {
        let w = compute_month_window(2025, 4, "Europe/Rome", Some(rome(2025, 1, 3, 8, 0)))
            .unwrap();
        assert_eq!(w.reference_instant, w.start);
        assert_eq!(w.days_observed, 1);
        assert_eq!(w.remaining_days, 29);
        assert!(!w.is_month_end);
        assert_eq!(w.phase, WindowPhase::NotStarted);
    }

    #[test]
    fn test_now_after_end_clamps_to_end() {
        let w = compute_month_window(2025, 4, "Europe/Rome", Some(rome(2025, 9, 3, 8, 0)))
            .unwrap();
        assert_eq!(w.reference_instant, w.end);
        assert_eq!(w.days_observed, 30);
        assert_eq!(w.remaining_days, 0);
        assert!(w.is_month_end);
    }

    #[test]
    fn test_first_instant_of_month_is_day_one() {
        let w = compute_month_window(2025, 3, "Europe/Rome", Some(rome(2025, 3, 1, 0, 0)))
            .unwrap();
        assert_eq!(w.reference_instant, w.start);
        assert_eq!(w.days_observed, 1);
        assert_eq!(w.remaining_days, 30);
        assert_eq!(w.phase, WindowPhase::InProgress);
    }

    #[test]
    fn test_local_date_not_utc_date_decides_the_day() {
        // 23:30 UTC on Feb 9 is already Feb 10 in Rome.
        let now = Utc.with_ymd_and_hms(2025, 2, 9, 23, 30, 0).unwrap();
        let w = compute_month_window(2025, 2, "Europe/Rome", Some(now)).unwrap();
        assert_eq!(w.reference_date(), date(2025, 2, 10));
        assert_eq!(w.days_observed, 10);
    }

    #[test]
    fn test_counts_sum_to_month_length_for_every_day() {
        for day in 1..=31 {
            let w = compute_month_window(2025, 1, "Europe/Rome", Some(rome(2025, 1, day, 15, 0)))
                .unwrap();
            assert_eq!(w.days_observed + w.remaining_days, 31, "day {day}");
            assert_eq!(w.remaining_days == 0, w.is_month_end);
        }
    }

    #[test]
    fn test_omitted_now_reads_clock_inside_window() {
        let w = compute_month_window(2025, 5, "Europe/Rome", None).unwrap();
        assert!(w.start_date() <= w.reference_date());
        assert!(w.reference_date() <= w.end_date());
        assert_eq!(w.days_observed + w.remaining_days, 31);
    }

    // ── DST ─────────────────────────────────────────────────────────────

    #[test]
    fn test_start_is_local_midnight_across_dst() {
        // Rome switches to CEST on the last Sunday of March.
        let w = compute_month_window(2025, 4, "Europe/Rome", Some(rome(2025, 4, 2, 0, 0)))
            .unwrap();
        assert_eq!(w.start.hour(), 0);
        assert_eq!(w.start.with_timezone(&Utc).hour(), 22);
    }

    #[test]
    fn test_midnight_gap_uses_first_valid_hour() {
        // Lebanon springs forward at 00:00 on the last Sunday of March;
        // 2024-03-31 is both a Sunday and the last day of the month.
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let w = compute_month_window(2024, 3, "Asia/Beirut", Some(now)).unwrap();
        assert_eq!(w.end_date(), date(2024, 3, 31));
        assert_eq!(w.end.hour(), 1);
        assert_eq!(w.total_days(), 31);
        assert_eq!(w.days_observed, 15);
        assert_eq!(w.remaining_days, 16);
    }

    // ── Errors ──────────────────────────────────────────────────────────

    #[test]
    fn test_month_zero_is_invalid() {
        let err = compute_month_window(2025, 0, "Europe/Rome", None).unwrap_err();
        assert_eq!(err, WindowError::InvalidMonth(0));
    }

    #[test]
    fn test_month_thirteen_is_invalid() {
        let err = compute_month_window(2025, 13, "Europe/Rome", None).unwrap_err();
        assert_eq!(err, WindowError::InvalidMonth(13));
        assert!(err.to_string().contains("Invalid month"), "got: {err}");
    }

    #[test]
    fn test_unknown_timezone() {
        let err = compute_month_window(2025, 2, "Mars/Olympus_Mons", None).unwrap_err();
        assert_eq!(err, WindowError::UnknownTimezone("Mars/Olympus_Mons".to_string()));
    }

    #[test]
    fn test_month_checked_before_timezone() {
        let err = compute_month_window(2025, 13, "Not/AZone", None).unwrap_err();
        assert_eq!(err, WindowError::InvalidMonth(13));
    }

    #[test]
    fn test_year_out_of_range() {
        let err = compute_month_window(i32::MAX, 1, "UTC", None).unwrap_err();
        assert!(matches!(err, WindowError::InvalidDatetime(_)), "got: {err:?}");
    }

    // ── Summary ─────────────────────────────────────────────────────────

    #[test]
    fn test_summary_serializes_iso_dates() {
        let w = compute_month_window(2025, 2, "Europe/Rome", Some(rome(2025, 2, 10, 12, 0)))
            .unwrap();
        let json = serde_json::to_value(w.summary()).unwrap();
        assert_eq!(json["timezone"], "Europe/Rome");
        assert_eq!(json["start"], "2025-02-01");
        assert_eq!(json["end"], "2025-02-28");
        assert_eq!(json["today"], "2025-02-10");
        assert_eq!(json["total_days"], 28);
        assert_eq!(json["phase"], "in_progress");
    }

    #[test]
    fn test_day_count_floors_negative() {
        assert_eq!(day_count(-3), 0);
        assert_eq!(day_count(0), 0);
        assert_eq!(day_count(28), 28);
    }
}
