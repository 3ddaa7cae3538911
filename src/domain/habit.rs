/// Habit record and its partial updates
///
/// This module defines the `Habit` record the engine transitions, the
/// `HabitPatch` the lifecycle emits for the store to apply, and the derived
/// state/bucket views used when presenting habits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{pattern, DomainError, HabitId, OwnerId};

/// A recurring habit with its current check-in window and streak counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// User who owns this habit
    pub owner_id: OwnerId,
    /// Display name (e.g., "Morning Run")
    pub name: String,
    /// Raw repeat pattern, validated before every use
    pub repeat_pattern: String,
    /// True while the habit has an active check-in window
    pub status: bool,
    /// Inclusive start of the current window
    pub start_date: Option<DateTime<Utc>>,
    /// Exclusive end of the current window
    pub end_date: Option<DateTime<Utc>>,
    /// Progression counter within the pattern
    pub last_level: u32,
    /// Current consecutive-completion count
    pub streak: u32,
    /// Best streak achieved before the most recent break
    pub last_streak: u32,
    /// How many times the streak has been broken
    pub streak_breaks: u32,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// When this habit was last written
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the store on every update
    pub version: u64,
}

/// Stored lifecycle state of a habit
///
/// `Broken` is only ever an event label in the sweep; a broken habit is
/// stored as `Inactive` with a non-zero `streak_breaks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HabitState {
    Inactive,
    Active,
}

/// Dashboard grouping for a habit at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitBucket {
    /// Active and the window is open right now
    Today,
    /// Active, but the window opens later
    Tomorrow,
    /// Inactive after at least one missed window
    Broken,
    /// Inactive and never broken (not started yet)
    Idle,
}

impl Habit {
    /// Create a new, inactive habit with validation
    ///
    /// The engine itself never creates habits; this constructor is for the
    /// application layer and tests. The pattern must be part of the grammar.
    pub fn new(
        owner_id: OwnerId,
        name: String,
        repeat_pattern: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        pattern::parse(&repeat_pattern)?;

        Ok(Self {
            id: HabitId::new(),
            owner_id,
            name: name.trim().to_string(),
            repeat_pattern,
            status: false,
            start_date: None,
            end_date: None,
            last_level: 0,
            streak: 0,
            last_streak: 0,
            streak_breaks: 0,
            created_at,
            updated_at: created_at,
            version: 0,
        })
    }

    /// Current stored state
    pub fn state(&self) -> HabitState {
        if self.status {
            HabitState::Active
        } else {
            HabitState::Inactive
        }
    }

    /// Check the status/window invariant
    ///
    /// Active habits have both window bounds with `start_date <= end_date`;
    /// inactive habits have neither.
    pub fn is_consistent(&self) -> bool {
        match (self.status, self.start_date, self.end_date) {
            (true, Some(start), Some(end)) => start <= end,
            (false, None, None) => true,
            _ => false,
        }
    }

    /// Whether the habit is active but its window closed before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status && self.end_date.map_or(false, |end| end < now)
    }

    /// Best streak including the one currently running
    pub fn best_streak(&self) -> u32 {
        self.streak.max(self.last_streak)
    }

    /// Dashboard bucket at `now`
    ///
    /// Overdue habits are reported as `Broken` even before the sweep has
    /// written them back, so a lapsed window is never shown as open. The
    /// window is half-open: at `now == end_date` it has already closed.
    pub fn bucket(&self, now: DateTime<Utc>) -> HabitBucket {
        let closed = self.end_date.map_or(false, |end| end <= now);
        match (self.status, self.start_date) {
            (true, _) if closed => HabitBucket::Broken,
            (true, Some(start)) if start > now => HabitBucket::Tomorrow,
            (true, _) => HabitBucket::Today,
            (false, _) if self.streak_breaks > 0 => HabitBucket::Broken,
            (false, _) => HabitBucket::Idle,
        }
    }

    /// Apply a patch in place
    ///
    /// Stores use this so that every adapter applies partial updates the same
    /// way. Version bookkeeping is left to the store.
    pub fn apply(&mut self, patch: &HabitPatch, updated_at: DateTime<Utc>) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(last_level) = patch.last_level {
            self.last_level = last_level;
        }
        if let Some(streak) = patch.streak {
            self.streak = streak;
        }
        if let Some(last_streak) = patch.last_streak {
            self.last_streak = last_streak;
        }
        if let Some(streak_breaks) = patch.streak_breaks {
            self.streak_breaks = streak_breaks;
        }
        self.updated_at = updated_at;
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string(),
            ));
        }

        Ok(())
    }
}

/// Partial update of a habit record
///
/// `None` leaves a field untouched. The nullable window bounds use a nested
/// option so that "clear the date" (`Some(None)`) is distinct from "leave it".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitPatch {
    pub status: Option<bool>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub last_level: Option<u32>,
    pub streak: Option<u32>,
    pub last_streak: Option<u32>,
    pub streak_breaks: Option<u32>,
}

impl HabitPatch {
    /// Whether applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == HabitPatch::default()
    }
}
