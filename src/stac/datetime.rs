//! Datetime parsing and canonical formatting for the `datetime` query parameter.
//!
//! Naive values are taken as UTC. The canonical form is
//! `YYYY-MM-DDTHH:MM:SS[.fff]Z`, fractional digits only when non-zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

const RANGE_SEPARATOR: char = '/';
const OPEN_BOUND: &str = "..";

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Temporal properties of a requested item: one instant or a closed range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalProperties {
    /// Written to the item as `datetime`
    Instant(DateTime<Utc>),
    /// Written as `start_datetime` and `end_datetime`
    Range {
        /// Inclusive start
        start: DateTime<Utc>,
        /// Inclusive end, never before `start`
        end:   DateTime<Utc>,
    },
}

impl TemporalProperties {
    /// The instant, or `None` for a range
    pub const fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(instant) => Some(*instant),
            Self::Range { .. } => None,
        }
    }

    /// Item properties carrying the range (`start_datetime`, `end_datetime`); empty for an instant
    pub fn properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        if let Self::Range { start, end } = self {
            properties.insert("start_datetime".to_string(), format_datetime(start).into());
            properties.insert("end_datetime".to_string(), format_datetime(end).into());
        }
        properties
    }
}

/// Parse the raw `datetime` parameter.
///
/// Absent or empty input gives `None`. A single `/` splits a closed range whose bounds
/// must both parse and be ordered.
pub fn parse_temporal(raw: Option<&str>) -> Result<Option<TemporalProperties>> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    let parts: Vec<&str> = raw.split(RANGE_SEPARATOR).collect();
    match parts.as_slice() {
        [single] => Ok(Some(TemporalProperties::Instant(parse_datetime(single)?))),
        [start, end] => {
            let start = parse_bound(raw, start)?;
            let end = parse_bound(raw, end)?;
            if start > end {
                return Err(Error::invalid_datetime(raw, "range start is after its end"));
            }
            Ok(Some(TemporalProperties::Range { start, end }))
        }
        _ => Err(Error::invalid_datetime(
            raw,
            format!("expected at most one '{RANGE_SEPARATOR}' separator"),
        )),
    }
}

fn parse_bound(raw: &str, bound: &str) -> Result<DateTime<Utc>> {
    match bound.trim() {
        "" => Err(Error::invalid_datetime(raw, "range bound is empty")),
        OPEN_BOUND => Err(Error::invalid_datetime(raw, "open ranges are not supported")),
        value => parse_datetime(value),
    }
}

/// Parse one ISO-8601 date or datetime into UTC
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>> {
    let value = normalize_separator(raw.trim());

    let parsed = if let Some(naive) = value.strip_suffix(['Z', 'z']) {
        parse_naive(naive)
    } else {
        parse_with_offset(&value).or_else(|| parse_naive(&value))
    };

    parsed.ok_or_else(|| Error::invalid_datetime(raw, "expected an ISO-8601 date or datetime"))
}

/// Canonical UTC string of an instant
pub fn format_datetime(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Accept a space between date and time, as ISO-8601 profiles commonly do, and give
/// hour-only times (`YYYY-MM-DDTHH`, optionally zoned) their implicit minutes
fn normalize_separator(value: &str) -> String {
    let value = if value.len() > 10 && value.as_bytes()[10] == b' ' {
        format!("{}T{}", &value[..10], &value[11..])
    } else {
        value.to_string()
    };

    let bytes = value.as_bytes();
    let hour_only = bytes.len() >= 13
        && bytes[10] == b'T'
        && bytes[11..13].iter().all(u8::is_ascii_digit)
        && bytes
            .get(13)
            .is_none_or(|next| *next != b':' && !next.is_ascii_digit());
    if hour_only {
        format!("{}:00{}", &value[..13], &value[13..])
    } else {
        value
    }
}

fn parse_with_offset(value: &str) -> Option<DateTime<Utc>> {
    OFFSET_FORMATS.iter().find_map(|format| {
        DateTime::parse_from_str(value, format)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

fn parse_naive(value: &str) -> Option<DateTime<Utc>> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| parse_date(value).and_then(|date| date.and_hms_opt(0, 0, 0)))
        .map(|naive| naive.and_utc())
}

/// `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or `YYYYMMDD`
fn parse_date(value: &str) -> Option<NaiveDate> {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !value.is_ascii() {
        return None;
    }

    match value.len() {
        4 if digits(value) => NaiveDate::from_ymd_opt(value.parse().ok()?, 1, 1),
        7 if digits(&value[..4]) && &value[4..5] == "-" && digits(&value[5..]) => {
            NaiveDate::from_ymd_opt(value[..4].parse().ok()?, value[5..].parse().ok()?, 1)
        }
        8 if digits(value) => NaiveDate::from_ymd_opt(
            value[..4].parse().ok()?,
            value[4..6].parse().ok()?,
            value[6..].parse().ok()?,
        ),
        10 => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
        _ => None,
    }
}
