/// Public library interface for the habit recurrence and streak engine
///
/// This crate parses repeat patterns, computes check-in windows and keeps
/// streak counters up to date on check-in, activation and missed windows.
/// Persistence and time are supplied by the caller through the `HabitStore`
/// and `Clock` traits.

use thiserror::Error;

// Internal modules
mod domain;
mod storage;
mod lifecycle;

pub mod config;
pub mod logging;

// Re-export public modules and types
pub use domain::*;
pub use storage::{HabitStore, MemoryStore, StoreError};
pub use lifecycle::{HabitLifecycle, HabitOverview, SweepFailure, SweepReport};
pub use config::{ConfigError, EngineConfig};

/// Errors surfaced by lifecycle operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// The habit does not exist or belongs to another owner
    #[error("Habit not found: {habit_id}")]
    NotFound { habit_id: HabitId },

    /// The stored repeat pattern is empty or outside the grammar
    #[error("Invalid repeat pattern '{pattern}' on habit {habit_id}: {reason}")]
    InvalidPattern {
        habit_id: HabitId,
        pattern: String,
        reason: String,
    },

    /// A validated pattern still could not produce a forward window
    #[error("Pattern computation failed for habit {habit_id}: {message}")]
    PatternComputation { habit_id: HabitId, message: String },

    /// Some habits could not be written back during a sweep
    #[error(
        "Sweep left {} habit(s) uncorrected ({} broken successfully)",
        .failed.len(),
        .broken.len()
    )]
    PartialSweep {
        broken: Vec<HabitId>,
        failed: Vec<SweepFailure>,
    },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
