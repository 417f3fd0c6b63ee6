//! Error handling and result types for calendar index operations.
//!
//! Absence is not an error here: `find` and `delete` on a missing clock return
//! `Ok(None)` / `Ok(false)`. Everything in [`CalendarError`] is a condition the
//! caller must be able to tell apart from a plain miss.

use thiserror::Error;

/// Error type for calendar index operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// Clock (or one of its decomposed coordinates) lies outside the valid domain.
    #[error("clock {clock} out of range (valid: 0..={max})")]
    OutOfRange { clock: i64, max: u32 },

    /// `insert` found an event already stored under this clock.
    #[error("an event with clock {0} already exists")]
    DuplicateKey(u32),

    /// Event type, unit or status code outside its enumeration.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Index construction parameters rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Structural invariant violation found by the validators.
    #[error("corrupted structure: {0}")]
    CorruptedStructure(String),
}

impl CalendarError {
    /// Create an OutOfRange error for a raw clock value
    pub fn out_of_range(clock: i64) -> Self {
        Self::OutOfRange {
            clock,
            max: crate::types::MAX_CLOCK,
        }
    }

    /// Create an InvalidEvent error naming the offending field
    pub fn invalid_event(field: &str, value: i64) -> Self {
        Self::InvalidEvent(format!("{} code {} is not allowed", field, value))
    }

    /// Create an InvalidConfig error with context
    pub fn invalid_config(parameter: &str, details: &str) -> Self {
        Self::InvalidConfig(format!("{}: {}", parameter, details))
    }

    /// Create a CorruptedStructure error with context
    pub fn corrupted(component: &str, details: &str) -> Self {
        Self::CorruptedStructure(format!("{} corruption: {}", component, details))
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey(_))
    }
}

/// Result type for calendar operations
pub type CalendarResult<T> = Result<T, CalendarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CalendarError::out_of_range(-1);
        assert_eq!(err.to_string(), "clock -1 out of range (valid: 0..=31539999)");

        let err = CalendarError::DuplicateKey(42);
        assert_eq!(err.to_string(), "an event with clock 42 already exists");

        let err = CalendarError::invalid_event("unit", 11);
        assert_eq!(err.to_string(), "invalid event: unit code 11 is not allowed");
    }

    #[test]
    fn test_predicates() {
        assert!(CalendarError::out_of_range(31_540_000).is_out_of_range());
        assert!(!CalendarError::DuplicateKey(1).is_out_of_range());
        assert!(CalendarError::DuplicateKey(1).is_duplicate());
        assert!(!CalendarError::corrupted("list", "cycle").is_duplicate());
    }
}
