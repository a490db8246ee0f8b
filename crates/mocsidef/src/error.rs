//! Error types for definition and expression parsing.

use thiserror::Error;

/// Errors that can occur while parsing or evaluating a definition.
///
/// Parsing is fail-fast: the first error aborts the parse and no partial
/// definition is produced.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A line that matches no recognized form.
    #[error("syntax error at line {line}: {reason}")]
    Syntax {
        /// Line number where the error occurred (1-based).
        line: usize,
        /// Reason for the parse failure.
        reason: String,
    },

    /// The same variable name was declared twice.
    #[error("variable name used twice ({0})")]
    DuplicateVariable(String),

    /// An expression referenced a name that has not been declared yet.
    #[error("use of undefined variable name ({0})")]
    UndefinedVariable(String),

    /// An expression term that is neither a variable name nor a numeric
    /// literal.
    #[error("invalid term ({0})")]
    InvalidTerm(String),

    /// A distribution name other than the supported ones.
    #[error("unknown distribution name ({0})")]
    UnknownDistribution(String),

    /// A distribution was given the wrong number of arguments.
    #[error("{distribution} distribution takes {expected} arguments, found {found}")]
    ArgumentCount {
        /// Name of the distribution.
        distribution: &'static str,
        /// How many arguments it takes.
        expected: usize,
        /// How many arguments were provided.
        found: usize,
    },

    /// A `Range` bound that is not an integer.
    #[error("non-integral bound for Range ({0})")]
    NonIntegralBound(f64),

    /// A `Range` whose lower bound exceeds its upper bound.
    #[error("empty Range ({lower},{upper})")]
    EmptyRange {
        /// Lower bound of the range.
        lower: i32,
        /// Upper bound of the range.
        upper: i32,
    },

    /// A binomial trial count that is not a non-negative integer.
    #[error("invalid trial count for B ({0})")]
    InvalidBinomialTrials(f64),

    /// A binomial success probability outside `[0, 1]`.
    #[error("success probability {0} is outside [0.0, 1.0]")]
    ProbabilityOutOfRange(f64),

    /// A `trials=` line whose value is not an unsigned integer.
    #[error("failed to parse trial count ({0})")]
    MalformedTrialCount(String),

    /// More than one `trials=` line.
    #[error("multiple trial count lines")]
    DuplicateTrialCount,

    /// No `trials=` line anywhere in the definition.
    #[error("trial count never defined")]
    MissingTrialCount,

    /// A value mapping lacked a referenced name at evaluation time.
    ///
    /// Parse-time validation makes this unreachable for well-formed
    /// definitions; hitting it indicates an internal inconsistency.
    #[error("no value bound for variable ({0})")]
    UnknownVariable(String),
}

/// Result type alias for definition operations.
pub type Result<T> = std::result::Result<T, Error>;
