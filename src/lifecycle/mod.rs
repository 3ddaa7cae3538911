/// Habit lifecycle state machine
///
/// This module drives the three transitions of a habit:
/// 1. Check-in: advance the level, move the window forward, maybe grow the streak
/// 2. Activate: open a fresh window for an inactive or broken habit
/// 3. Sweep: break every active habit whose window has already closed
///
/// Each single-habit transition is one read followed by one versioned write,
/// so it either applies completely or not at all.

mod overview;
mod sweep;

pub use overview::HabitOverview;
pub use sweep::{SweepFailure, SweepReport};

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::EngineConfig;
use crate::domain::{
    pattern, Clock, DomainError, Habit, HabitId, HabitPatch, NextWindow, OwnerId,
    RecurrencePattern, WindowCalculator,
};
use crate::storage::{HabitStore, StoreError};
use crate::EngineError;

/// Orchestrates habit transitions over a store and a clock
pub struct HabitLifecycle<S, C> {
    store: S,
    clock: C,
    config: EngineConfig,
    calculator: WindowCalculator,
}

impl<S: HabitStore, C: Clock> HabitLifecycle<S, C> {
    /// Create a lifecycle engine
    ///
    /// Fails if the configuration is out of range.
    pub fn new(store: S, clock: C, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let calculator = WindowCalculator::new(config.offset()?);

        info!(
            "Habit lifecycle ready (utc offset {} min, sweep concurrency {})",
            config.utc_offset_minutes, config.sweep_concurrency
        );

        Ok(Self {
            store,
            clock,
            config,
            calculator,
        })
    }

    /// Get a reference to the store (useful for testing)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Record one completion of a habit
    ///
    /// Moves the habit to the window after the current occurrence, stores the
    /// new level and adds the pattern's streak delta. Calling this twice
    /// records two completions; duplicate submissions must be filtered by the
    /// caller.
    ///
    /// A check-in made before the stored window opens counts toward that
    /// window, so the next window is computed from its start and never lands
    /// earlier than the one already stored.
    pub async fn checkin(&self, owner_id: &OwnerId, habit_id: &HabitId) -> Result<Habit, EngineError> {
        let habit = self.load(owner_id, habit_id).await?;
        let recurrence = self.validated_pattern(&habit)?;

        let level = habit.last_level.checked_add(1).ok_or_else(|| {
            self.computation_error(
                &habit,
                DomainError::PatternComputation("level counter overflow".to_string()),
            )
        })?;

        let now = self.clock.now();
        let reference = match habit.start_date {
            Some(start) if habit.status && start > now => start,
            _ => now,
        };
        let window = self.window_for(&habit, &recurrence, level, reference)?;

        let patch = HabitPatch {
            status: Some(true),
            start_date: Some(Some(window.start_date)),
            end_date: Some(Some(window.end_date)),
            last_level: Some(window.resolved_level),
            streak: Some(habit.streak.saturating_add(window.streak_delta)),
            ..HabitPatch::default()
        };

        let updated = self.write(&habit, patch).await?;

        info!(
            "Checked in habit {} (level {}, streak {}, next window {} .. {})",
            updated.id, updated.last_level, updated.streak, window.start_date, window.end_date
        );
        Ok(updated)
    }

    /// Open a fresh check-in window for an inactive or broken habit
    ///
    /// Activation only touches the window and the status; the level and the
    /// streak stay as they are. Resetting those is the sweep's job.
    pub async fn activate(&self, owner_id: &OwnerId, habit_id: &HabitId) -> Result<Habit, EngineError> {
        let habit = self.load(owner_id, habit_id).await?;
        let recurrence = self.validated_pattern(&habit)?;
        let window = self.window_for(&habit, &recurrence, 0, self.clock.now())?;

        let patch = HabitPatch {
            status: Some(true),
            start_date: Some(Some(window.start_date)),
            end_date: Some(Some(window.end_date)),
            ..HabitPatch::default()
        };

        let updated = self.write(&habit, patch).await?;

        info!(
            "Activated habit {} (window {} .. {})",
            updated.id, window.start_date, window.end_date
        );
        Ok(updated)
    }

    /// Load an owner-scoped habit
    async fn load(&self, owner_id: &OwnerId, habit_id: &HabitId) -> Result<Habit, EngineError> {
        self.store
            .find_habit(habit_id, owner_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                habit_id: habit_id.clone(),
            })
    }

    /// Parse the stored pattern, rejecting empty or unknown ones
    fn validated_pattern(&self, habit: &Habit) -> Result<RecurrencePattern, EngineError> {
        pattern::parse(&habit.repeat_pattern).map_err(|e| {
            let reason = match e {
                DomainError::PatternFormat { reason, .. } => reason,
                other => other.to_string(),
            };
            EngineError::InvalidPattern {
                habit_id: habit.id.clone(),
                pattern: habit.repeat_pattern.clone(),
                reason,
            }
        })
    }

    /// Compute the window for `level` relative to `reference`
    fn window_for(
        &self,
        habit: &Habit,
        recurrence: &RecurrencePattern,
        level: u32,
        reference: DateTime<Utc>,
    ) -> Result<NextWindow, EngineError> {
        self.calculator
            .next_window(recurrence, level, reference)
            .map_err(|e| self.computation_error(habit, e))
    }

    fn computation_error(&self, habit: &Habit, cause: DomainError) -> EngineError {
        error!(
            "Cannot compute window for habit {} with pattern '{}': {}",
            habit.id, habit.repeat_pattern, cause
        );
        EngineError::PatternComputation {
            habit_id: habit.id.clone(),
            message: cause.to_string(),
        }
    }

    /// Write a patch against the version that was read
    async fn write(&self, habit: &Habit, patch: HabitPatch) -> Result<Habit, EngineError> {
        self.store
            .update_habit(&habit.id, habit.version, patch)
            .await
            .map_err(|e| match e {
                StoreError::HabitNotFound { .. } => EngineError::NotFound {
                    habit_id: habit.id.clone(),
                },
                other => EngineError::Store(other),
            })
    }
}
