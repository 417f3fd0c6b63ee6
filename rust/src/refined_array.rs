//! Refined nested array calendar: day → fixed-width slot of the day.
//!
//! Two levels instead of four. Each leaf bucket covers `bucket_span` seconds
//! and holds every event in that window, sorted by clock, so the structure
//! allocates far fewer tables than [`crate::NestedArrayCalendar`] at the price
//! of a binary search inside a bucket. The span is the tuning knob: 1 second
//! behaves like an exact index, 86 400 seconds degenerates to one sorted
//! vector per day.

use crate::calendar::Calendar;
use crate::coordinate_tree::{CoordinateTree, Iter, TreeStats};
use crate::decomposition::Decomposition;
use crate::error::CalendarResult;
use crate::event::Event;
use crate::types::Clock;

/// Bucket width used by [`RefinedArrayCalendar::new`]: one minute.
pub const DEFAULT_BUCKET_SPAN: u32 = 60;

#[derive(Debug, Clone)]
pub struct RefinedArrayCalendar {
    tree: CoordinateTree,
}

impl Default for RefinedArrayCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl RefinedArrayCalendar {
    pub fn new() -> Self {
        Self {
            tree: CoordinateTree::new(Self::default_decomposition()),
        }
    }

    fn default_decomposition() -> Decomposition {
        match Decomposition::coarse(DEFAULT_BUCKET_SPAN) {
            Ok(decomposition) => decomposition,
            Err(_) => unreachable!("one minute divides a day"),
        }
    }

    /// Create a calendar whose buckets cover `bucket_span` seconds.
    ///
    /// The span must divide the 86 400 seconds of a day.
    ///
    /// # Examples
    ///
    /// ```
    /// use calendar_index::RefinedArrayCalendar;
    ///
    /// let hourly = RefinedArrayCalendar::with_bucket_span(3_600).unwrap();
    /// assert_eq!(hourly.bucket_span(), 3_600);
    /// assert!(RefinedArrayCalendar::with_bucket_span(7).is_err());
    /// ```
    pub fn with_bucket_span(bucket_span: u32) -> CalendarResult<Self> {
        Ok(Self {
            tree: CoordinateTree::new(Decomposition::coarse(bucket_span)?),
        })
    }

    pub fn bucket_span(&self) -> u32 {
        self.tree.decomposition().bucket_span()
    }

    /// First clock of the bucket that holds `clock`.
    pub fn bucket_start(&self, clock: Clock) -> Clock {
        let span = self.bucket_span();
        let start = clock.get() / span * span;
        // Rounding down never leaves the domain.
        Clock::new(i64::from(start)).unwrap_or(Clock::ZERO)
    }

    pub fn iter(&self) -> Iter<'_> {
        self.tree.iter()
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }

    pub fn get(&self, clock: Clock) -> CalendarResult<Option<&Event>> {
        self.tree.find(clock)
    }
}

impl Calendar for RefinedArrayCalendar {
    fn name(&self) -> &'static str {
        "Improved Nested Array Calendar"
    }

    fn load(&mut self, event: Event) {
        let placed = self.tree.insert(event, false);
        debug_assert!(placed.is_ok());
    }

    fn insert(&mut self, event: Event) -> CalendarResult<()> {
        self.tree.insert(event, true)
    }

    fn find(&self, clock: i64) -> CalendarResult<Option<Event>> {
        Ok(self.tree.find(Clock::new(clock)?)?.copied())
    }

    fn delete(&mut self, clock: i64) -> CalendarResult<bool> {
        Ok(self.tree.remove(Clock::new(clock)?)?.is_some())
    }

    fn total_events(&self) -> usize {
        self.tree.len()
    }

    fn events(&self) -> Box<dyn Iterator<Item = &Event> + '_> {
        Box::new(self.tree.iter())
    }

    fn validate(&self) -> CalendarResult<()> {
        self.tree.check_invariants()
    }

    fn clear(&mut self) {
        self.tree.clear();
    }
}
