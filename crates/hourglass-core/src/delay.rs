//! Human-readable delay specifications.
//!
//! A delay is written the way people write durations (`"15m"`, `"3h"`,
//! `"2 days"`). The raw string is bound into some proofs verbatim, while the
//! normalized number of seconds drives the setup token and the wait time.

use std::fmt;

/// Floor applied to every delay, in seconds.
pub const MIN_DELAY_SECS: u64 = 60;

/// Delays issued by `setup` when the caller does not name any.
pub const DEFAULT_DELAYS: [&str; 4] = ["15m", "30m", "3h", "2d"];

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;
const MS_PER_WEEK: f64 = 7.0 * MS_PER_DAY;
const MS_PER_YEAR: f64 = 365.25 * MS_PER_DAY;

const U64_LIMIT: f64 = u64::MAX as f64;

/// A delay as presented by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelaySpec {
    raw: String,
}

impl DelaySpec {
    /// Wrap a raw delay string. Never fails; unparsable input normalizes to
    /// the floor.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The string exactly as the client sent it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Delay in seconds, clamped to [`MIN_DELAY_SECS`].
    pub fn seconds(&self) -> u64 {
        normalize_seconds(&self.raw)
    }

    /// Delay in whole minutes (at least 1).
    pub fn minutes(&self) -> u64 {
        self.seconds() / 60
    }
}

impl fmt::Display for DelaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for DelaySpec {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Parse a delay and clamp it to [`MIN_DELAY_SECS`].
///
/// Unparsable input is treated as the floor. Well-formed input too large for
/// `u64` saturates to `u64::MAX` instead; see [`is_out_of_range`].
pub fn normalize_seconds(input: &str) -> u64 {
    match floored_seconds(input) {
        None => MIN_DELAY_SECS,
        Some(secs) if secs >= U64_LIMIT => u64::MAX,
        Some(secs) => (secs as u64).max(MIN_DELAY_SECS),
    }
}

/// Parse a human duration into whole seconds.
///
/// Accepts a non-negative decimal number, optional whitespace, and an
/// optional unit. A bare number is milliseconds. Returns `None` for anything
/// else, including values too large for `u64`.
pub fn parse_seconds(input: &str) -> Option<u64> {
    floored_seconds(input).filter(|secs| *secs < U64_LIMIT).map(|secs| secs as u64)
}

/// Whether `input` is a well-formed delay whose value does not fit in `u64`
/// seconds.
pub fn is_out_of_range(input: &str) -> bool {
    floored_seconds(input).is_some_and(|secs| secs >= U64_LIMIT)
}

/// Whole seconds as a float. Infinite for digit runs that overflow `f64`.
fn floored_seconds(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let split = trimmed.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    if number.is_empty() {
        return None;
    }
    let value: f64 = number.parse().ok()?;
    let factor = unit_factor_ms(&unit.trim_start().to_ascii_lowercase())?;

    let secs = (value * factor / MS_PER_SECOND).floor();
    if secs.is_nan() || secs < 0.0 {
        return None;
    }
    Some(secs)
}

fn unit_factor_ms(unit: &str) -> Option<f64> {
    let factor = match unit {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => MS_PER_SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" => MS_PER_MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => MS_PER_HOUR,
        "d" | "day" | "days" => MS_PER_DAY,
        "w" | "week" | "weeks" => MS_PER_WEEK,
        "y" | "yr" | "yrs" | "year" | "years" => MS_PER_YEAR,
        _ => return None,
    };
    Some(factor)
}
