//! Error types for trial execution.

use thiserror::Error;

/// Errors that can occur while running trials.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Expression evaluation failed against the trial's value mapping.
    ///
    /// Parse-time validation makes this unreachable for definitions
    /// produced by the parser; hitting it is an internal defect, not a
    /// user-facing condition.
    #[error(transparent)]
    Definition(#[from] mocsidef::Error),

    /// A job index that maps to no seeds for this definition.
    #[error("job index {index} has no seeds for {trial_count} trials")]
    EmptyJob {
        /// The offending job index.
        index: u32,
        /// Trial count of the definition.
        trial_count: u32,
    },
}

/// Result type alias for trial execution.
pub type Result<T> = std::result::Result<T, Error>;
