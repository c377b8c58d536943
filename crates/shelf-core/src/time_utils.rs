use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use tracing::debug;

// ── Day-first date parsing ────────────────────────────────────────────────────

/// `D/M/Y`, `D-M-Y` or `D.M.Y` with an optional trailing time component.
fn day_first_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})(?:[ T].*)?$")
            .expect("regex is valid")
    })
}

/// `YYYY-MM-DD` with an optional trailing time component.
fn iso_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T].*)?$").expect("regex is valid")
    })
}

/// Parse a completion date written day-first, as spreadsheets in
/// day-month-year locales export them.
///
/// Accepted shapes:
/// - `01/03/2024`, `1/3/2024`, `01-03-2024`, `01.03.2024`
/// - two-digit years: `00`–`69` → 20xx, `70`–`99` → 19xx
/// - an optional time suffix: `01/03/2024 10:15:00`
/// - unambiguous ISO dates: `2024-03-01`
///
/// Returns `None` for anything else, including impossible calendar dates
/// such as `31/02/2024`.
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = iso_pattern().captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let caps = day_first_pattern().captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year_text = &caps[3];
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += if year < 70 { 2000 } else { 1900 };
    }

    let date = NaiveDate::from_ymd_opt(year, month, day);
    if date.is_none() {
        debug!("rejected impossible date {:?}", s);
    }
    date
}

// ── Month keys ────────────────────────────────────────────────────────────────

/// Format the calendar-month bucket of `date` as `MM/YYYY`.
///
/// ```
/// use chrono::NaiveDate;
/// use shelf_core::time_utils::month_key;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(month_key(date), "03/2024");
/// ```
pub fn month_key(date: NaiveDate) -> String {
    format!("{:02}/{:04}", date.month(), date.year())
}

/// Parse a `MM/YYYY` key back to the first day of that month.
pub fn parse_month_key(key: &str) -> Option<NaiveDate> {
    let (month, year) = key.trim().split_once('/')?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Short axis label for a month, e.g. `"Mar 2024"`.
pub fn month_label(month: NaiveDate) -> String {
    month.format("%b %Y").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
