/// In-memory implementation of the habit store
///
/// This keeps habits in a map behind an async read/write lock. Every update
/// runs under the write lock, so the version check and the patch are applied
/// as one step. Useful for tests and for embedding the engine without a
/// database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{Habit, HabitId, HabitPatch, OwnerId};
use crate::storage::{HabitStore, StoreError};

/// Map-backed habit store
#[derive(Debug, Default)]
pub struct MemoryStore {
    habits: RwLock<HashMap<HabitId, Habit>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a habit regardless of owner
    ///
    /// Only meant for inspection in tests and tooling; engine operations
    /// always go through the owner-scoped lookups.
    pub async fn get(&self, habit_id: &HabitId) -> Option<Habit> {
        self.habits.read().await.get(habit_id).cloned()
    }

    /// Number of stored habits
    pub async fn len(&self) -> usize {
        self.habits.read().await.len()
    }

    /// Whether the store holds no habits
    pub async fn is_empty(&self) -> bool {
        self.habits.read().await.is_empty()
    }
}

#[async_trait]
impl HabitStore for MemoryStore {
    async fn find_habit(
        &self,
        habit_id: &HabitId,
        owner_id: &OwnerId,
    ) -> Result<Option<Habit>, StoreError> {
        let habits = self.habits.read().await;
        Ok(habits
            .get(habit_id)
            .filter(|habit| &habit.owner_id == owner_id)
            .cloned())
    }

    async fn find_active_overdue_habits(
        &self,
        owner_id: &OwnerId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Habit>, StoreError> {
        let habits = self.habits.read().await;
        let mut overdue: Vec<Habit> = habits
            .values()
            .filter(|habit| &habit.owner_id == owner_id && habit.is_overdue(now))
            .cloned()
            .collect();
        overdue.sort_by_key(|habit| habit.created_at);
        Ok(overdue)
    }

    async fn update_habit(
        &self,
        habit_id: &HabitId,
        expected_version: u64,
        patch: HabitPatch,
    ) -> Result<Habit, StoreError> {
        let mut habits = self.habits.write().await;

        let habit = habits
            .get_mut(habit_id)
            .ok_or_else(|| StoreError::HabitNotFound {
                habit_id: habit_id.to_string(),
            })?;

        if habit.version != expected_version {
            return Err(StoreError::VersionConflict {
                habit_id: habit_id.to_string(),
                expected: expected_version,
                actual: habit.version,
            });
        }

        habit.apply(&patch, Utc::now());
        habit.version += 1;

        tracing::debug!("Updated habit {} to version {}", habit_id, habit.version);
        Ok(habit.clone())
    }

    async fn list_habits(&self, owner_id: &OwnerId) -> Result<Vec<Habit>, StoreError> {
        let habits = self.habits.read().await;
        let mut owned: Vec<Habit> = habits
            .values()
            .filter(|habit| &habit.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|habit| habit.created_at);
        Ok(owned)
    }

    async fn insert_habit(&self, habit: &Habit) -> Result<(), StoreError> {
        let mut habits = self.habits.write().await;

        if habits.contains_key(&habit.id) {
            return Err(StoreError::DuplicateHabit {
                habit_id: habit.id.to_string(),
            });
        }

        habits.insert(habit.id.clone(), habit.clone());
        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }
}
