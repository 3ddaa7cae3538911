/// Check-in window arithmetic
///
/// Given a parsed `RecurrencePattern`, a progression level and a reference
/// instant, this module works out the `[start_date, end_date)` window in which
/// the next check-in counts, and whether reaching that level extends the
/// streak. Day boundaries are computed in the owner's UTC offset.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, RecurrencePattern};

/// Result of a window computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextWindow {
    /// Inclusive start of the check-in window
    pub start_date: DateTime<Utc>,
    /// Exclusive end of the check-in window
    pub end_date: DateTime<Utc>,
    /// Level the habit should store after this transition
    pub resolved_level: u32,
    /// How much the streak grows (0 or 1)
    pub streak_delta: u32,
}

impl NextWindow {
    /// Whether an instant falls inside `[start_date, end_date)`
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant < self.end_date
    }
}

/// Computes check-in windows with calendar days anchored to a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCalculator {
    offset: FixedOffset,
}

impl WindowCalculator {
    /// Create a calculator whose days start at local midnight in `offset`
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Calculator with UTC day boundaries
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// The UTC offset used for day boundaries
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Compute the next check-in window
    ///
    /// `level == 0` is the activation case: the first window that starts at or
    /// after the reference day, with no streak change. `level > 0` is the
    /// check-in case: the window for the occurrence after the current one.
    /// The result depends only on the arguments and the configured offset.
    pub fn next_window(
        &self,
        pattern: &RecurrencePattern,
        level: u32,
        reference: DateTime<Utc>,
    ) -> Result<NextWindow, DomainError> {
        // A descriptor that slipped past parsing still has to be rejected here
        pattern.check()?;

        let today = reference.with_timezone(&self.offset).date_naive();
        let activating = level == 0;

        let (first_day, length_days, streak_delta) = match pattern {
            RecurrencePattern::Daily => {
                let day = if activating { today } else { add_days(today, 1)? };
                (day, 1, u32::from(!activating))
            }
            RecurrencePattern::EveryNDays { interval_days } => {
                let day = if activating {
                    today
                } else {
                    add_days(today, u64::from(*interval_days))?
                };
                (day, 1, u32::from(!activating))
            }
            RecurrencePattern::WeeklyOnDays { days } => {
                // Activation may land on today, a check-in always moves forward
                let skip = if activating { 0 } else { 1 };
                let day = (skip..skip + 7)
                    .map(|offset| add_days(today, offset))
                    .collect::<Result<Vec<_>, _>>()?
                    .into_iter()
                    .find(|candidate| days.contains(&candidate.weekday()))
                    .ok_or_else(|| {
                        DomainError::PatternComputation(
                            "weekly pattern produced no occurrence within a week".to_string(),
                        )
                    })?;
                (day, 1, u32::from(!activating))
            }
            RecurrencePattern::TimesPerWeek { times } => {
                let week_start = today
                    .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
                    .ok_or_else(|| overflow(today))?;
                // The streak only grows once the weekly quota is reached
                let quota_met = !activating && level % u32::from(*times) == 0;
                let day = if quota_met { add_days(week_start, 7)? } else { week_start };
                (day, 7, u32::from(quota_met))
            }
        };

        let start_date = self.day_start(first_day)?;
        let end_date = self.day_start(add_days(first_day, length_days)?)?;

        tracing::debug!(
            "Computed window {} .. {} for pattern '{}' at level {}",
            start_date,
            end_date,
            pattern,
            level
        );

        Ok(NextWindow {
            start_date,
            end_date,
            resolved_level: level,
            streak_delta,
        })
    }

    /// Local midnight of `date`, expressed in UTC
    fn day_start(&self, date: NaiveDate) -> Result<DateTime<Utc>, DomainError> {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| overflow(date))?;
        self.offset
            .from_local_datetime(&midnight)
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| overflow(date))
    }
}

impl Default for WindowCalculator {
    fn default() -> Self {
        Self::utc()
    }
}

/// Compute the next check-in window using UTC day boundaries
pub fn next_window(
    pattern: &RecurrencePattern,
    level: u32,
    reference: DateTime<Utc>,
) -> Result<NextWindow, DomainError> {
    WindowCalculator::utc().next_window(pattern, level, reference)
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, DomainError> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| overflow(date))
}

fn overflow(date: NaiveDate) -> DomainError {
    DomainError::PatternComputation(format!("date arithmetic overflow near {}", date))
}
