//! Nested array calendar: day → hour → minute → second.
//!
//! Every clock gets its own leaf bucket, so a bucket only ever holds more than
//! one event when `load` stores a repeated clock. Lookups cost four table
//! steps plus a scan of that (normally single-element) bucket.

use crate::calendar::Calendar;
use crate::coordinate_tree::{CoordinateTree, Iter, TreeStats};
use crate::decomposition::Decomposition;
use crate::error::{CalendarError, CalendarResult};
use crate::event::Event;
use crate::types::{Clock, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};

/// Calendar position of a clock, as addressed by the nested array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarPosition {
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CalendarPosition {
    pub fn from_clock(clock: Clock) -> Self {
        let raw = clock.get();
        Self {
            day: raw / SECONDS_PER_DAY,
            hour: raw % SECONDS_PER_DAY / SECONDS_PER_HOUR,
            minute: raw % SECONDS_PER_HOUR / SECONDS_PER_MINUTE,
            second: raw % SECONDS_PER_MINUTE,
        }
    }

    /// Inverse of [`Self::from_clock`]. Fails for positions past the end of
    /// the clock domain or with an hour, minute or second out of its range.
    pub fn to_clock(self) -> CalendarResult<Clock> {
        for (value, limit) in [(self.hour, 24), (self.minute, 60), (self.second, 60)] {
            if value >= limit {
                return Err(CalendarError::out_of_range(i64::from(value)));
            }
        }
        Clock::new(
            i64::from(self.day) * i64::from(SECONDS_PER_DAY)
                + i64::from(self.hour) * i64::from(SECONDS_PER_HOUR)
                + i64::from(self.minute) * i64::from(SECONDS_PER_MINUTE)
                + i64::from(self.second),
        )
    }
}

#[derive(Debug, Clone)]
pub struct NestedArrayCalendar {
    tree: CoordinateTree,
}

impl Default for NestedArrayCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl NestedArrayCalendar {
    pub fn new() -> Self {
        Self {
            tree: CoordinateTree::new(Decomposition::calendar()),
        }
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

    /// Events stored on one day, in clock order.
    pub fn day(&self, day: u32) -> Iter<'_> {
        self.tree.iter_under(day)
    }
}

impl Calendar for NestedArrayCalendar {
    fn name(&self) -> &'static str {
        "Nested Array Calendar"
    }

    fn load(&mut self, event: Event) {
        // Decomposition is total over validated clocks.
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
