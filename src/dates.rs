//! Date parsing and cycle-directory naming.
//!
//! Every instant in an experiment is UTC, so plain `NaiveDateTime` values are
//! used throughout.
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Cycle directories and l1c file names use `YYYYMMDDHH`.
pub const CYCLE_FORMAT: &str = "%Y%m%d%H";

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%a %b %d %H:%M:%S %Y",
];

/// Parse the date spellings found in CLI arguments, `exp.config` and
/// `cycle_status`.
pub fn parse_date(text: &str) -> Result<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("empty date"));
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return parse_compact(trimmed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_utc());
    }
    let normalized = normalize(trimmed);
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(parsed);
        }
    }
    if let Some((day, hour)) = normalized.split_once('T') {
        if hour.len() <= 2 && hour.bytes().all(|b| b.is_ascii_digit()) {
            return at_hour(parse_day(day, "%Y-%m-%d")?, hour);
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return at_hour(day, "0");
    }
    Err(anyhow!("unrecognized date {trimmed:?}"))
}

/// Format an instant the way cycle directories are named.
pub fn format_cycle(time: &NaiveDateTime) -> String {
    time.format(CYCLE_FORMAT).to_string()
}

/// Parse a `YYYYMMDDHH` cycle directory name, `None` for anything else.
pub fn parse_cycle_name(name: &str) -> Option<NaiveDateTime> {
    if name.len() != 10 || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    parse_compact(name).ok()
}

/// Drop `Z`/`UTC` markers and collapse the padding `date -u` emits.
fn normalize(text: &str) -> String {
    let text = text.strip_suffix('Z').unwrap_or(text);
    text.split_whitespace()
        .filter(|token| *token != "UTC")
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_compact(digits: &str) -> Result<NaiveDateTime> {
    let (day, rest) = digits.split_at(digits.len().min(8));
    let day = parse_day(day, "%Y%m%d")?;
    match rest.len() {
        0 => at_hour(day, "0"),
        2 => at_hour(day, rest),
        4 | 6 => {
            let time = format!("{}{}", rest, &"0000"[..6 - rest.len()]);
            let stamp = format!("{}{}", day.format("%Y%m%d"), time);
            NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S")
                .with_context(|| format!("parse date {digits:?}"))
        }
        _ => Err(anyhow!("unrecognized date {digits:?}")),
    }
}

fn parse_day(text: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, format).with_context(|| format!("parse date {text:?}"))
}

fn at_hour(day: NaiveDate, hour: &str) -> Result<NaiveDateTime> {
    let hour: u32 = hour
        .parse()
        .with_context(|| format!("parse hour {hour:?}"))?;
    day.and_hms_opt(hour, 0, 0)
        .ok_or_else(|| anyhow!("hour {hour} out of range"))
}

/// Inclusive-start date window used to filter cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// A range admitting every cycle.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDateTime::MIN,
            end: NaiveDateTime::MAX,
        }
    }

    /// Build a range from optional CLI strings; missing bounds stay open.
    pub fn from_args(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let mut range = Self::unbounded();
        if let Some(start) = start {
            range.start = parse_date(start).context("invalid start date")?;
        }
        if let Some(end) = end {
            range.end = parse_date(end).context("invalid end date")?;
        }
        if range.start > range.end {
            return Err(anyhow!(
                "start date {} is after end date {}",
                range.start,
                range.end
            ));
        }
        Ok(range)
    }

    /// `start <= time <= end`; used for raw per-cycle binning.
    pub fn contains(&self, time: &NaiveDateTime) -> bool {
        self.start <= *time && *time <= self.end
    }

    /// `start <= time < end`; used when merging across cycles.
    pub fn contains_half_open(&self, time: &NaiveDateTime) -> bool {
        self.start <= *time && *time < self.end
    }
}

#[cfg(test)]
#[path = "dates_tests.rs"]
mod tests;
