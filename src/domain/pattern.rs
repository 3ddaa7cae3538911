/// Repeat pattern grammar and parser
///
/// A habit stores its recurrence as a short human-readable string such as
/// `"daily"`, `"every 3 days"`, `"weekly on mon,wed,fri"` or `"3 times per week"`.
/// This module validates those strings and turns them into a structured
/// `RecurrencePattern` that the window calculator can match on.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Longest supported gap for `every N days`
pub const MAX_INTERVAL_DAYS: u32 = 365;

/// Most completions that fit in one week for `N times per week`
pub const MAX_TIMES_PER_WEEK: u8 = 7;

/// How often a habit recurs, parsed from the raw pattern string
///
/// Each variant carries only the data it needs. Day-based variants produce
/// one-day check-in windows; `TimesPerWeek` uses the whole week as its window
/// and only extends the streak once the weekly quota is met.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrencePattern {
    /// Every calendar day
    Daily,
    /// Every N-th calendar day (e.g. every 3 days)
    EveryNDays { interval_days: u32 },
    /// Specific days of the week, kept sorted from Monday and without duplicates
    WeeklyOnDays { days: Vec<Weekday> },
    /// A number of completions anywhere inside a Monday-based week
    TimesPerWeek { times: u8 },
}

impl RecurrencePattern {
    /// Build a weekly pattern, normalizing day order and removing duplicates
    pub fn weekly_on(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut days: Vec<Weekday> = days.into_iter().collect();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        RecurrencePattern::WeeklyOnDays { days }
    }

    /// Check that a descriptor can actually produce windows
    ///
    /// Descriptors coming out of `parse` always pass. This guards descriptors
    /// that were built by hand or deserialized from somewhere else.
    pub fn check(&self) -> Result<(), DomainError> {
        match self {
            RecurrencePattern::Daily => Ok(()),
            RecurrencePattern::EveryNDays { interval_days } => {
                if *interval_days == 0 || *interval_days > MAX_INTERVAL_DAYS {
                    return Err(DomainError::PatternComputation(format!(
                        "interval must be 1-{} days, got {}",
                        MAX_INTERVAL_DAYS, interval_days
                    )));
                }
                Ok(())
            }
            RecurrencePattern::WeeklyOnDays { days } => {
                if days.is_empty() {
                    return Err(DomainError::PatternComputation(
                        "weekly pattern has no days".to_string(),
                    ));
                }
                let mut seen = [false; 7];
                for day in days {
                    let index = day.num_days_from_monday() as usize;
                    if seen[index] {
                        return Err(DomainError::PatternComputation(format!(
                            "weekly pattern lists {} more than once",
                            weekday_name(*day)
                        )));
                    }
                    seen[index] = true;
                }
                Ok(())
            }
            RecurrencePattern::TimesPerWeek { times } => {
                if *times == 0 || *times > MAX_TIMES_PER_WEEK {
                    return Err(DomainError::PatternComputation(format!(
                        "times per week must be 1-{}, got {}",
                        MAX_TIMES_PER_WEEK, times
                    )));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrencePattern::Daily => write!(f, "daily"),
            RecurrencePattern::EveryNDays { interval_days } => {
                write!(f, "every {} days", interval_days)
            }
            RecurrencePattern::WeeklyOnDays { days } => {
                let names: Vec<&str> = days.iter().map(|d| weekday_name(*d)).collect();
                write!(f, "weekly on {}", names.join(","))
            }
            RecurrencePattern::TimesPerWeek { times: 1 } => write!(f, "1 time per week"),
            RecurrencePattern::TimesPerWeek { times } => write!(f, "{} times per week", times),
        }
    }
}

impl FromStr for RecurrencePattern {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Check whether a raw pattern string is part of the recognized grammar
///
/// Empty and whitespace-only strings are never valid.
pub fn validate(raw: &str) -> bool {
    parse(raw).is_ok()
}

/// Parse a raw pattern string into a `RecurrencePattern`
///
/// Matching is case-insensitive and tolerant of extra whitespace. Anything
/// outside the grammar fails with `DomainError::PatternFormat`.
pub fn parse(raw: &str) -> Result<RecurrencePattern, DomainError> {
    let normalized = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if normalized.is_empty() {
        return Err(format_error(raw, "pattern cannot be empty"));
    }

    let tokens: Vec<&str> = normalized.split(' ').collect();

    match tokens.as_slice() {
        ["daily"] | ["every", "day"] => Ok(RecurrencePattern::Daily),
        ["weekdays"] => Ok(RecurrencePattern::weekly_on([
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ])),
        ["weekends"] => Ok(RecurrencePattern::weekly_on([Weekday::Sat, Weekday::Sun])),
        ["weekly"] => Ok(RecurrencePattern::TimesPerWeek { times: 1 }),
        ["every", count, "day" | "days"] => {
            let interval_days = parse_count(raw, count, MAX_INTERVAL_DAYS)?;
            if interval_days == 1 {
                Ok(RecurrencePattern::Daily)
            } else {
                Ok(RecurrencePattern::EveryNDays { interval_days })
            }
        }
        ["weekly", "on", rest @ ..] if !rest.is_empty() => {
            let days = parse_day_list(raw, &rest.join(" "))?;
            Ok(RecurrencePattern::weekly_on(days))
        }
        [count, "time" | "times", "per", "week"] => {
            let times = parse_count(raw, count, u32::from(MAX_TIMES_PER_WEEK))?;
            Ok(RecurrencePattern::TimesPerWeek { times: times as u8 })
        }
        _ => Err(format_error(raw, "unrecognized pattern")),
    }
}

/// Parse a positive decimal count bounded by `max`
fn parse_count(raw: &str, token: &str, max: u32) -> Result<u32, DomainError> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(format_error(raw, &format!("'{}' is not a number", token)));
    }

    let value: u32 = token
        .parse()
        .map_err(|_| format_error(raw, &format!("'{}' is out of range", token)))?;

    if value == 0 || value > max {
        return Err(format_error(
            raw,
            &format!("count must be between 1 and {}, got {}", max, value),
        ));
    }

    Ok(value)
}

/// Parse a comma separated list of weekday names
fn parse_day_list(raw: &str, list: &str) -> Result<Vec<Weekday>, DomainError> {
    let mut days = Vec::new();

    for item in list.split(',') {
        let item = item.trim();
        if item.is_empty() {
            return Err(format_error(raw, "empty entry in day list"));
        }
        let day = parse_weekday(item)
            .ok_or_else(|| format_error(raw, &format!("'{}' is not a weekday", item)))?;
        days.push(day);
    }

    Ok(days)
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

fn format_error(raw: &str, reason: &str) -> DomainError {
    DomainError::PatternFormat {
        pattern: raw.to_string(),
        reason: reason.to_string(),
    }
}
