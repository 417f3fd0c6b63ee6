//! Core types and constants for the calendar indexes.
//!
//! The key space is the number of seconds elapsed since midnight on the first
//! day of the modeled year.

use std::fmt;

use crate::error::{CalendarError, CalendarResult};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Size of the clock domain in seconds.
pub const YEAR_SECONDS: u32 = 31_540_000;

/// Largest valid clock value.
pub const MAX_CLOCK: u32 = YEAR_SECONDS - 1;

pub const SECONDS_PER_MINUTE: u32 = 60;
pub const SECONDS_PER_HOUR: u32 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: u32 = 24 * SECONDS_PER_HOUR;

/// Day slots needed to cover the domain. `YEAR_SECONDS` runs a little past
/// 365 whole days, so the last slot is only partially addressable.
pub const DAY_SLOTS: u32 = YEAR_SECONDS.div_ceil(SECONDS_PER_DAY);

// ============================================================================
// SLOT IDS
// ============================================================================

/// Index into one of the arenas.
pub type SlotId = u32;

/// Sentinel for "no slot": an absent sub-level, bucket or list link.
pub const NULL_SLOT: SlotId = u32::MAX;

// ============================================================================
// CLOCK
// ============================================================================

/// A clock value known to lie inside `0..=MAX_CLOCK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Clock(u32);

impl Clock {
    pub const ZERO: Clock = Clock(0);
    pub const MAX: Clock = Clock(MAX_CLOCK);

    /// Validate a raw clock value.
    ///
    /// # Examples
    ///
    /// ```
    /// use calendar_index::{Clock, MAX_CLOCK};
    ///
    /// assert_eq!(Clock::new(0).unwrap().get(), 0);
    /// assert_eq!(Clock::new(MAX_CLOCK as i64).unwrap(), Clock::MAX);
    /// assert!(Clock::new(-1).unwrap_err().is_out_of_range());
    /// assert!(Clock::new(MAX_CLOCK as i64 + 1).is_err());
    /// ```
    pub fn new(raw: i64) -> CalendarResult<Self> {
        if (0..=MAX_CLOCK as i64).contains(&raw) {
            Ok(Clock(raw as u32))
        } else {
            tracing::debug!(clock = raw, "clock outside the year domain");
            Err(CalendarError::out_of_range(raw))
        }
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Clock {
    type Error = CalendarError;

    fn try_from(raw: i64) -> CalendarResult<Self> {
        Clock::new(raw)
    }
}

impl From<Clock> for u32 {
    fn from(clock: Clock) -> u32 {
        clock.0
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
