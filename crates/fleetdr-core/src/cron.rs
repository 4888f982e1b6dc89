//! Five-field cron expressions and schedule due-ness.
//!
//! Expressions have the classic `minute hour day-of-month month day-of-week`
//! layout. Each field accepts `*`, a literal, a range `a-b`, a step `*/n` or
//! `a-b/n`, or a comma-separated list of those. All five fields must match
//! for an instant to match, including the two day fields: a schedule such as
//! `0 2 1 * 1` fires only on a Monday that is also the first of the month.
//!
//! Evaluation happens in UTC at minute resolution.

use std::{fmt, str::FromStr};

use jiff::{tz::TimeZone, Timestamp};
use log::{debug, warn};

use crate::error::DrError;

/// Default schedule for new DR plans: every day at 02:00 UTC.
pub const DEFAULT_SCHEDULE: &str = "0 2 * * *";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl FieldKind {
    const ALL: [FieldKind; 5] = [
        FieldKind::Minute,
        FieldKind::Hour,
        FieldKind::DayOfMonth,
        FieldKind::Month,
        FieldKind::DayOfWeek,
    ];

    fn name(self) -> &'static str {
        match self {
            FieldKind::Minute => "minute",
            FieldKind::Hour => "hour",
            FieldKind::DayOfMonth => "day-of-month",
            FieldKind::Month => "month",
            FieldKind::DayOfWeek => "day-of-week",
        }
    }

    fn bounds(self) -> (u32, u32) {
        match self {
            FieldKind::Minute => (0, 59),
            FieldKind::Hour => (0, 23),
            FieldKind::DayOfMonth => (1, 31),
            FieldKind::Month => (1, 12),
            FieldKind::DayOfWeek => (0, 6),
        }
    }
}

/// Set of accepted values for one field, one bit per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CronField {
    bits: u64,
}

impl CronField {
    fn parse(kind: FieldKind, text: &str) -> Result<Self, String> {
        let mut bits = 0u64;
        for part in text.split(',') {
            bits |= Self::parse_part(kind, part)?;
        }
        Ok(Self { bits })
    }

    fn parse_part(kind: FieldKind, part: &str) -> Result<u64, String> {
        if part.is_empty() {
            return Err(format!("empty entry in {} field", kind.name()));
        }

        let (base, step) = match part.split_once('/') {
            Some((base, step)) => {
                let step = parse_number(step)
                    .ok_or_else(|| format!("invalid step '{step}' in {} field", kind.name()))?;
                if step == 0 {
                    return Err(format!("step must be at least 1 in {} field", kind.name()));
                }
                (base, Some(step))
            }
            None => (part, None),
        };

        let (min, max) = kind.bounds();
        let (start, end) = if base == "*" {
            (min, max)
        } else if let Some((from, to)) = base.split_once('-') {
            let from = parse_value(kind, from)?;
            let to = parse_value(kind, to)?;
            if from > to {
                return Err(format!(
                    "range {from}-{to} is reversed in {} field",
                    kind.name()
                ));
            }
            (from, to)
        } else {
            if step.is_some() {
                return Err(format!(
                    "step in {} field needs '*' or a range before '/'",
                    kind.name()
                ));
            }
            let value = parse_value(kind, base)?;
            (value, value)
        };

        let step = step.unwrap_or(1);
        let mut bits = 0u64;
        let mut value = start;
        while value <= end {
            bits |= 1u64 << value;
            value = match value.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(bits)
    }

    fn contains(self, value: u32) -> bool {
        value < 64 && self.bits & (1u64 << value) != 0
    }
}

fn parse_number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_value(kind: FieldKind, text: &str) -> Result<u32, String> {
    let (min, max) = kind.bounds();
    let value = parse_number(text)
        .ok_or_else(|| format!("invalid value '{text}' in {} field", kind.name()))?;
    if value < min || value > max {
        return Err(format!(
            "{} value {value} out of range {min}-{max}",
            kind.name()
        ));
    }
    Ok(value)
}

/// A parsed, validated cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    fields: [CronField; 5],
}

impl CronSchedule {
    /// Parses and validates a five-field expression.
    ///
    /// # Errors
    ///
    /// Returns `DrError::InvalidCron` naming the offending field.
    pub fn parse(expression: &str) -> Result<Self, DrError> {
        let invalid = |reason: String| DrError::InvalidCron {
            expression: expression.to_string(),
            reason,
        };

        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(invalid(format!("expected 5 fields, found {}", parts.len())));
        }

        let mut fields = [CronField { bits: 0 }; 5];
        for ((slot, kind), text) in fields.iter_mut().zip(FieldKind::ALL).zip(parts) {
            *slot = CronField::parse(kind, text).map_err(invalid)?;
        }

        Ok(Self {
            expression: expression.trim().to_string(),
            fields,
        })
    }

    /// Returns true when the UTC minute containing `at` matches every field.
    pub fn matches(&self, at: Timestamp) -> bool {
        let dt = at.to_zoned(TimeZone::UTC);
        let values = [
            dt.minute() as u32,
            dt.hour() as u32,
            dt.day() as u32,
            dt.month() as u32,
            dt.weekday().to_sunday_zero_offset() as u32,
        ];
        self.fields
            .iter()
            .zip(values)
            .all(|(field, value)| field.contains(value))
    }

    /// The normalized source expression.
    pub fn as_str(&self) -> &str {
        &self.expression
    }
}

impl FromStr for CronSchedule {
    type Err = DrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Validates a cron expression without keeping the parsed form.
pub fn validate(expression: &str) -> Result<(), DrError> {
    CronSchedule::parse(expression).map(|_| ())
}

/// Decides whether a schedule should fire at `now`.
///
/// Malformed expressions are never due. A schedule that already ran in the
/// same UTC minute as `now` is not due again.
pub fn is_due(expression: &str, last_run: Option<Timestamp>, now: Timestamp) -> bool {
    let schedule = match CronSchedule::parse(expression) {
        Ok(schedule) => schedule,
        Err(e) => {
            warn!("Skipping schedule: {e}");
            return false;
        }
    };

    if !schedule.matches(now) {
        return false;
    }

    match last_run {
        Some(last) if same_minute(last, now) => {
            debug!("Schedule '{expression}' already ran this minute");
            false
        }
        _ => true,
    }
}

fn same_minute(a: Timestamp, b: Timestamp) -> bool {
    a.as_second().div_euclid(60) == b.as_second().div_euclid(60)
}
