//! Normalization of the free-form dates found in scraped pages.
//!
//! The catalogue prints dates in many shapes: relative ("5 minutes ago"),
//! anchored ("Yesterday, 8:48 AM"), full timestamps with an optional zone,
//! and partial dates where unknown parts are written as `??`. Everything is
//! normalized into a [`NormalizedDate`] whose unknown parts are `0`.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

/// Source of the current instant.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
  }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<FixedOffset> {
    self.0
  }
}

/// A possibly partial date, with the full timestamp when the source had one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDate {
  /// 0 when unknown
  pub year: i32,
  /// 1-12, 0 when unknown
  pub month: u32,
  /// 1-31, 0 when unknown
  pub day: u32,
  /// Present for relative, anchored and clock-time inputs
  pub timestamp: Option<DateTime<FixedOffset>>,
  /// Zone name when the source carried a parenthesized zone, e.g. `JST`
  pub zone: Option<String>,
}

impl NormalizedDate {
  fn from_timestamp(ts: DateTime<FixedOffset>, zone: Option<String>) -> Self {
    Self {
      year: ts.year(),
      month: ts.month(),
      day: ts.day(),
      timestamp: Some(ts),
      zone,
    }
  }

  /// Build a partial date, rejecting impossible combinations.
  fn partial(year: i32, month: u32, day: u32) -> Option<Self> {
    if month > 12 || day > 31 {
      return None;
    }
    if month > 0 && day > 0 {
      // Unknown years are checked against a leap year so that Feb 29 passes.
      let probe = if year > 0 { year } else { 2000 };
      NaiveDate::from_ymd_opt(probe, month, day)?;
    }
    Some(Self {
      year,
      month,
      day,
      timestamp: None,
      zone: None,
    })
  }

  /// `(year, month, day)` ignoring time of day.
  pub fn ymd(&self) -> (i32, u32, u32) {
    (self.year, self.month, self.day)
  }
}

static RELATIVE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(\d+) (second|minute|hour)s? ago$").expect("valid regex"));
static ANCHORED: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(Today|Yesterday), (\d{1,2}):(\d{2}) ?(AM|PM)$").expect("valid regex")
});
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^([A-Z][a-z]{2}) (\d{1,2}),? (?:(\d{4}),? )?(\d{1,2}):(\d{2})(?: ?(AM|PM))?(?: \(([A-Za-z]+)\))?$",
  )
  .expect("valid regex")
});
static FULL_DATE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([A-Z][a-z]{2}|\?{3}) (\d{1,2}|\?{2}),? (\d{4})$").expect("valid regex")
});
static MONTH_YEAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^([A-Z][a-z]{2}),? (\d{4})$").expect("valid regex"));
static MONTH_DAY: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^([A-Z][a-z]{2}) (\d{1,2}),?$").expect("valid regex"));
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})$").expect("valid regex"));
static SHORT_NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(\d{2}|\?{2})-(\d{2}|\?{2})-(\d{2})$").expect("valid regex")
});
static DURATION_PART: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(\d+)\s*(hr|min|sec)\.").expect("valid regex"));

const MONTHS: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Two-digit years up to this value belong to the 2000s.
const CENTURY_PIVOT: i32 = 68;

/// Parses scraped date text against an ordered grammar; the first matching
/// rule wins.
#[derive(Clone)]
pub struct DateNormalizer {
  clock: Arc<dyn Clock>,
}

impl Default for DateNormalizer {
  fn default() -> Self {
    Self::new(Arc::new(SystemClock))
  }
}

impl DateNormalizer {
  pub fn new(clock: Arc<dyn Clock>) -> Self {
    Self { clock }
  }

  /// Normalize `text`, or `None` when no rule matches.
  pub fn parse(&self, text: &str) -> Option<NormalizedDate> {
    let s = text.trim();
    if s.is_empty() {
      return None;
    }

    let now = self.clock.now();
    let now = now.with_nanosecond(0).unwrap_or(now);

    if s == "now" {
      return Some(NormalizedDate::from_timestamp(now, None));
    }

    if let Some(c) = RELATIVE.captures(s) {
      let n: i64 = c[1].parse().ok()?;
      let delta = match &c[2] {
        "second" => Duration::try_seconds(n)?,
        "minute" => Duration::try_minutes(n)?,
        _ => Duration::try_hours(n)?,
      };
      return Some(NormalizedDate::from_timestamp(now.checked_sub_signed(delta)?, None));
    }

    if let Some(c) = ANCHORED.captures(s) {
      let mut day = now.date_naive();
      if &c[1] == "Yesterday" {
        day = day.pred_opt()?;
      }
      let time = clock_time(&c[2], &c[3], c.get(4).map(|m| m.as_str()))?;
      let ts = now.offset().from_local_datetime(&day.and_time(time)).single()?;
      return Some(NormalizedDate::from_timestamp(ts, None));
    }

    if let Some(c) = TIMESTAMP.captures(s) {
      let month = month_number(&c[1])?;
      let day: u32 = c[2].parse().ok()?;
      let year = match c.get(3) {
        Some(y) => y.as_str().parse().ok()?,
        None => now.year(),
      };
      let time = clock_time(&c[4], &c[5], c.get(6).map(|m| m.as_str()))?;
      let date = NaiveDate::from_ymd_opt(year, month, day)?;
      let (offset, zone) = match c.get(7) {
        Some(z) => (FixedOffset::east_opt(0)?, Some(z.as_str().to_string())),
        None => (*now.offset(), None),
      };
      let ts = offset.from_local_datetime(&date.and_time(time)).single()?;
      return Some(NormalizedDate::from_timestamp(ts, zone));
    }

    if let Some(c) = FULL_DATE.captures(s) {
      let month = unknown_or(&c[1], month_number)?;
      let day = unknown_or(&c[2], |d| d.parse().ok())?;
      let year = c[3].parse().ok()?;
      return NormalizedDate::partial(year, month, day);
    }

    if let Some(c) = MONTH_YEAR.captures(s) {
      return NormalizedDate::partial(c[2].parse().ok()?, month_number(&c[1])?, 0);
    }

    if let Some(c) = MONTH_DAY.captures(s) {
      return NormalizedDate::partial(0, month_number(&c[1])?, c[2].parse().ok()?);
    }

    if let Some(c) = YEAR.captures(s) {
      return NormalizedDate::partial(c[1].parse().ok()?, 0, 0);
    }

    if let Some(c) = SHORT_NUMERIC.captures(s) {
      let month = unknown_or(&c[1], |m| m.parse().ok())?;
      let day = unknown_or(&c[2], |d| d.parse().ok())?;
      let yy: i32 = c[3].parse().ok()?;
      let year = if yy <= CENTURY_PIVOT { 2000 + yy } else { 1900 + yy };
      return NormalizedDate::partial(year, month, day);
    }

    None
  }

  /// `(year, month, day)` of `text`; all zero when the text is not a date.
  pub fn date(&self, text: &str) -> (i32, u32, u32) {
    self.parse(text).map(|d| d.ymd()).unwrap_or_default()
  }
}

fn month_number(name: &str) -> Option<u32> {
  MONTHS.iter().position(|m| *m == name).map(|i| i as u32 + 1)
}

/// `??`/`???` tokens are unknown (0) rather than invalid.
fn unknown_or(token: &str, parse: impl Fn(&str) -> Option<u32>) -> Option<u32> {
  if token.chars().all(|c| c == '?') {
    Some(0)
  } else {
    parse(token)
  }
}

/// `H:MM` with an optional meridiem; 24-hour when absent.
fn clock_time(hour: &str, minute: &str, meridiem: Option<&str>) -> Option<NaiveTime> {
  let mut h: u32 = hour.parse().ok()?;
  let m: u32 = minute.parse().ok()?;
  if let Some(mer) = meridiem {
    if !(1..=12).contains(&h) {
      return None;
    }
    h %= 12;
    if mer == "PM" {
      h += 12;
    }
  }
  NaiveTime::from_hms_opt(h, m, 0)
}

/// Total seconds in text like `1 hr. 23 min. 4 sec.`; any unit may be missing.
/// Saturates at `u64::MAX`.
pub fn parse_duration(text: &str) -> u64 {
  DURATION_PART
    .captures_iter(text)
    .map(|c| {
      let n: u64 = c[1].parse().unwrap_or(u64::MAX);
      match &c[2] {
        "hr" => n.saturating_mul(3600),
        "min" => n.saturating_mul(60),
        _ => n,
      }
    })
    .fold(0, u64::saturating_add)
}

/// `HH:MM:SS` rendering of a second count.
pub fn format_duration(seconds: u64) -> String {
  format!(
    "{:02}:{:02}:{:02}",
    seconds / 3600,
    seconds % 3600 / 60,
    seconds % 60
  )
}

/// Season name for a calendar month; empty when the month is out of range.
pub fn season_of(month: u32) -> &'static str {
  match month {
    1..=3 => "winter",
    4..=6 => "spring",
    7..=9 => "summer",
    10..=12 => "fall",
    _ => "",
  }
}

/// Season the clock is currently in.
pub fn current_season(clock: &dyn Clock) -> &'static str {
  season_of(clock.now().month())
}
