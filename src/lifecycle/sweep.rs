/// Missed-window sweep
///
/// Finds every active habit of an owner whose window closed before now and
/// breaks its streak. Updates are independent per habit and run with bounded
/// concurrency; one failed write never stops the others.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Clock, Habit, HabitId, HabitPatch, OwnerId};
use crate::lifecycle::HabitLifecycle;
use crate::storage::{HabitStore, StoreError};
use crate::EngineError;

/// Outcome of a sweep where every selected habit was written back
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Habits that were moved from active to broken
    pub broken: Vec<HabitId>,
}

/// A habit the sweep selected but could not update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub habit_id: HabitId,
    pub error: StoreError,
}

/// Fields written when a habit misses its window
///
/// The best streak is kept, everything else returns to the inactive
/// starting point and the break counter goes up by one.
pub(crate) fn break_patch(habit: &Habit) -> HabitPatch {
    HabitPatch {
        status: Some(false),
        start_date: Some(None),
        end_date: Some(None),
        last_level: Some(0),
        streak: Some(0),
        last_streak: Some(habit.best_streak()),
        streak_breaks: Some(habit.streak_breaks.saturating_add(1)),
    }
}

impl<S: HabitStore, C: Clock> HabitLifecycle<S, C> {
    /// Break every active habit of `owner_id` whose window has lapsed
    ///
    /// Each write is guarded by the version read during selection, so a
    /// habit that was checked in meanwhile is left alone and reported as a
    /// failure instead of being broken. Running the sweep again selects
    /// nothing that was already broken.
    pub async fn sweep_missed(&self, owner_id: &OwnerId) -> Result<SweepReport, EngineError> {
        let now = self.clock.now();
        let overdue = self.store.find_active_overdue_habits(owner_id, now).await?;

        if overdue.is_empty() {
            debug!("Sweep for owner {}: nothing overdue", owner_id);
            return Ok(SweepReport::default());
        }

        debug!(
            "Sweep for owner {}: {} overdue habit(s)",
            owner_id,
            overdue.len()
        );

        let results: Vec<(HabitId, Result<Habit, StoreError>)> = stream::iter(overdue)
            .map(|habit| async move {
                let patch = break_patch(&habit);
                let result = self.store.update_habit(&habit.id, habit.version, patch).await;
                (habit.id, result)
            })
            .buffer_unordered(self.config.sweep_concurrency)
            .collect()
            .await;

        let mut broken = Vec::new();
        let mut failed = Vec::new();

        for (habit_id, result) in results {
            match result {
                Ok(habit) => {
                    debug!(
                        "Broke habit {} (best streak {}, breaks {})",
                        habit.id, habit.last_streak, habit.streak_breaks
                    );
                    broken.push(habit_id);
                }
                Err(error) => {
                    warn!("Sweep could not break habit {}: {}", habit_id, error);
                    failed.push(SweepFailure { habit_id, error });
                }
            }
        }

        info!(
            "Sweep for owner {} broke {} habit(s), {} failed",
            owner_id,
            broken.len(),
            failed.len()
        );

        if failed.is_empty() {
            Ok(SweepReport { broken })
        } else {
            Err(EngineError::PartialSweep { broken, failed })
        }
    }
}
