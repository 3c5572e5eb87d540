// ⚠️ Error Types - everything the core can fail with
// Validation failures are recoverable (fix the input), parse failures surface
// from scoring and are never defaulted to zero points.

use thiserror::Error;

// ============================================================================
// VALIDATION
// ============================================================================

/// Every rule a receipt broke, in the order the rules were checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The receipt is invalid. {}", .reasons.join(", "))]
pub struct ValidationError {
    pub reasons: Vec<String>,
}

impl ValidationError {
    pub fn new(reasons: Vec<String>) -> Self {
        ValidationError { reasons }
    }
}

// ============================================================================
// PARSING (raised while scoring)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unable to parse purchase date/time {input:?}: {reason}")]
    DateTime { input: String, reason: String },

    #[error("unable to parse amount {input:?}: {reason}")]
    Amount { input: String, reason: String },

    #[error("points total does not fit in 64 bits")]
    PointsOverflow,
}

// ============================================================================
// STORE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unable to insert receipt with no id set")]
    MissingId,

    #[error("a receipt with id {0} already exists")]
    DuplicateId(String),

    #[error("receipt store lock poisoned")]
    LockPoisoned,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
