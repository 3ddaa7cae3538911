/// Storage boundary for habit records
///
/// The engine does not own persistence. It talks to whatever holds the habit
/// records through the `HabitStore` trait; the store owns transaction
/// boundaries and serializes writes per habit through the version check on
/// `update_habit`.

pub mod memory;

// Re-export the bundled store
pub use memory::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Habit, HabitId, HabitPatch, OwnerId};

/// Errors that can occur during storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    /// Another writer updated the habit after it was read
    #[error("Version conflict on habit {habit_id}: expected {expected}, found {actual}")]
    VersionConflict {
        habit_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Duplicate habit: {habit_id} already exists")]
    DuplicateHabit { habit_id: String },

    /// Failure reported by the underlying storage backend
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Trait defining the storage capability the engine consumes
///
/// Implementations must apply each `update_habit` atomically: either every
/// field in the patch is written and the version is bumped, or nothing is.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Find a habit by id, scoped to its owner
    ///
    /// Returns `None` both when the habit does not exist and when it belongs
    /// to somebody else.
    async fn find_habit(
        &self,
        habit_id: &HabitId,
        owner_id: &OwnerId,
    ) -> Result<Option<Habit>, StoreError>;

    /// All active habits of `owner_id` whose window ended before `now`
    async fn find_active_overdue_habits(
        &self,
        owner_id: &OwnerId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Habit>, StoreError>;

    /// Apply a patch if the stored version still equals `expected_version`
    ///
    /// Returns the updated habit with its new version.
    async fn update_habit(
        &self,
        habit_id: &HabitId,
        expected_version: u64,
        patch: HabitPatch,
    ) -> Result<Habit, StoreError>;

    /// All habits of `owner_id`, oldest first
    async fn list_habits(&self, owner_id: &OwnerId) -> Result<Vec<Habit>, StoreError>;

    /// Insert a newly created habit
    async fn insert_habit(&self, habit: &Habit) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: HabitStore + ?Sized> HabitStore for std::sync::Arc<T> {
    async fn find_habit(
        &self,
        habit_id: &HabitId,
        owner_id: &OwnerId,
    ) -> Result<Option<Habit>, StoreError> {
        (**self).find_habit(habit_id, owner_id).await
    }

    async fn find_active_overdue_habits(
        &self,
        owner_id: &OwnerId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Habit>, StoreError> {
        (**self).find_active_overdue_habits(owner_id, now).await
    }

    async fn update_habit(
        &self,
        habit_id: &HabitId,
        expected_version: u64,
        patch: HabitPatch,
    ) -> Result<Habit, StoreError> {
        (**self).update_habit(habit_id, expected_version, patch).await
    }

    async fn list_habits(&self, owner_id: &OwnerId) -> Result<Vec<Habit>, StoreError> {
        (**self).list_habits(owner_id).await
    }

    async fn insert_habit(&self, habit: &Habit) -> Result<(), StoreError> {
        (**self).insert_habit(habit).await
    }
}
