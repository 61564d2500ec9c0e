//! Date canonicalization.
//!
//! The UI speaks two literal shapes ("17/September/2025" from the option
//! lists, "17 Sept 25" from the landing page) while records carry ISO-ish
//! timestamps with arbitrary offsets. Everything is reduced to a
//! [`CanonicalDate`] so equality and ordering ignore format and time-of-day.
//!
//! Record timestamps are read in UTC calendar terms; literals are read by
//! their own calendar fields. A late-evening timestamp with a positive
//! offset can therefore land on the previous UTC day. This asymmetry is
//! kept deliberately for compatibility with existing clients.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
];

static LONG_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/([A-Za-z]+)/(\d{4})$").expect("valid regex"));

static SHORT_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\s+([A-Za-z]+)\.?\s+(\d{2}|\d{4})$").expect("valid regex")
});

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A calendar day with no time component, ordered by (year, month, day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl From<NaiveDate> for CanonicalDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Display shape of a literal date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// `DD/Month/YYYY`, e.g. `07/September/2025`
    #[default]
    Long,
    /// `D Mon YY`, e.g. `7 Sept 25`
    Short,
}

impl DateFormat {
    pub fn render(&self, date: CanonicalDate) -> String {
        let month_index = (date.month() - 1) as usize;
        match self {
            DateFormat::Long => format!(
                "{:02}/{}/{}",
                date.day(),
                MONTH_NAMES[month_index],
                date.year()
            ),
            DateFormat::Short => format!(
                "{} {} {:02}",
                date.day(),
                SHORT_MONTH_NAMES[month_index],
                date.year().rem_euclid(100)
            ),
        }
    }

    /// Infer which literal shape a string uses, if any.
    pub fn detect(literal: &str) -> Option<DateFormat> {
        let literal = literal.trim();
        if LONG_LITERAL.is_match(literal) {
            Some(DateFormat::Long)
        } else if SHORT_LITERAL.is_match(literal) {
            Some(DateFormat::Short)
        } else {
            None
        }
    }
}

/// Canonicalize any supported date string: a UI literal or a record timestamp.
pub fn canonicalize(value: &str) -> Option<CanonicalDate> {
    parse_literal(value).or_else(|| parse_timestamp(value))
}

/// Parse a UI literal (`17/September/2025` or `17 Sept 25`) by its own calendar fields.
pub fn parse_literal(value: &str) -> Option<CanonicalDate> {
    let value = value.trim();
    let caps = LONG_LITERAL
        .captures(value)
        .or_else(|| SHORT_LITERAL.captures(value))?;

    let day: u32 = caps[1].parse().ok()?;
    let month = month_from_name(&caps[2])?;
    let year = expand_year(&caps[3])?;
    CanonicalDate::from_ymd(year, month, day)
}

/// Parse a record timestamp and take its UTC calendar date.
///
/// Naive date-times carry no offset and are taken as already being UTC.
pub fn parse_timestamp(value: &str) -> Option<CanonicalDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive().into());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc).date_naive().into());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date().into());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().map(Into::into)
}

/// Today's local date rendered as a literal, the landing page's default selection.
pub fn today(format: DateFormat) -> String {
    format.render(Local::now().date_naive().into())
}

/// Full names, the `SHORT_MONTH_NAMES` forms, and any prefix of three or
/// more letters ("Sep", "Sept", "Septem") are accepted, case-insensitively.
fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.trim().to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|full| full.to_lowercase().starts_with(&lower))
        .map(|index| index as u32 + 1)
}

/// Two-digit years below 50 are 20xx, the rest 19xx.
fn expand_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    if text.len() == 2 {
        Some(if year < 50 { 2000 + year } else { 1900 + year })
    } else {
        Some(year)
    }
}
