/// Domain module containing the recurrence-and-streak core
///
/// This module defines the habit record, the recurrence pattern grammar and the
/// window arithmetic that decides when the next check-in is due. Everything in
/// here is pure: no storage access and no reading of the wall clock.

pub mod clock;
pub mod habit;
pub mod pattern;
pub mod types;
pub mod window;

// Re-export public types for easy access
pub use clock::*;
pub use habit::*;
pub use pattern::*;
pub use types::*;
pub use window::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The raw pattern string is not part of the recognized grammar
    #[error("Invalid repeat pattern '{pattern}': {reason}")]
    PatternFormat { pattern: String, reason: String },

    /// A pattern descriptor cannot produce a forward window
    #[error("Pattern computation error: {0}")]
    PatternComputation(String),

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),
}
