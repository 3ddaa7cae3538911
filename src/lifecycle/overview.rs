/// Dashboard read: sweep first, then group habits by bucket
///
/// Lapsed windows must be corrected before anything is shown as "current", so
/// the overview always runs the missed-window sweep before listing habits.

use serde::Serialize;
use tracing::warn;

use crate::domain::{Clock, Habit, HabitBucket, OwnerId};
use crate::lifecycle::{HabitLifecycle, SweepFailure};
use crate::storage::HabitStore;
use crate::EngineError;

/// An owner's habits grouped for display
#[derive(Debug, Clone, Default, Serialize)]
pub struct HabitOverview {
    /// Window open right now
    pub today: Vec<Habit>,
    /// Window opens later
    pub tomorrow: Vec<Habit>,
    /// Broken and waiting for reactivation
    pub broken: Vec<Habit>,
    /// Never started
    pub idle: Vec<Habit>,
    /// Habits the preceding sweep could not correct
    #[serde(skip)]
    pub sweep_failures: Vec<SweepFailure>,
}

impl HabitOverview {
    /// Total number of habits across all buckets
    pub fn total(&self) -> usize {
        self.today.len() + self.tomorrow.len() + self.broken.len() + self.idle.len()
    }

    /// Habits in one bucket
    pub fn bucket(&self, bucket: HabitBucket) -> &[Habit] {
        match bucket {
            HabitBucket::Today => &self.today,
            HabitBucket::Tomorrow => &self.tomorrow,
            HabitBucket::Broken => &self.broken,
            HabitBucket::Idle => &self.idle,
        }
    }
}

impl<S: HabitStore, C: Clock> HabitLifecycle<S, C> {
    /// Sweep lapsed habits, then list the owner's habits by bucket
    ///
    /// A partial sweep does not fail the overview: the failures are carried
    /// in `sweep_failures`, and any habit still overdue lands in `broken`.
    pub async fn overview(&self, owner_id: &OwnerId) -> Result<HabitOverview, EngineError> {
        let sweep_failures = match self.sweep_missed(owner_id).await {
            Ok(_) => Vec::new(),
            Err(EngineError::PartialSweep { failed, .. }) => {
                warn!(
                    "Overview for owner {} continues after {} failed sweep update(s)",
                    owner_id,
                    failed.len()
                );
                failed
            }
            Err(e) => return Err(e),
        };

        let now = self.clock.now();
        let mut overview = HabitOverview {
            sweep_failures,
            ..HabitOverview::default()
        };

        for habit in self.store.list_habits(owner_id).await? {
            match habit.bucket(now) {
                HabitBucket::Today => overview.today.push(habit),
                HabitBucket::Tomorrow => overview.tomorrow.push(habit),
                HabitBucket::Broken => overview.broken.push(habit),
                HabitBucket::Idle => overview.idle.push(habit),
            }
        }

        Ok(overview)
    }
}
