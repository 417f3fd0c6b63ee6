//! The contract shared by all calendar indexes.
//!
//! Benchmark drivers and tests talk to a `dyn Calendar` and pick the storage
//! strategy once, through [`CalendarKind`].

use std::fmt;
use std::str::FromStr;

use crate::error::{CalendarError, CalendarResult};
use crate::event::{Event, EventTuple};
use crate::linked_list::LinkedListCalendar;
use crate::nested_array::NestedArrayCalendar;
use crate::refined_array::RefinedArrayCalendar;

/// Operations every calendar index supports.
///
/// `insert` rejects a clock that is already stored with
/// [`CalendarError::DuplicateKey`]. `load` never checks; when it stores a
/// repeated clock, same-clock events keep their insertion order and `find`
/// and `delete` act on the earliest one.
pub trait Calendar {
    /// Human readable strategy name.
    fn name(&self) -> &'static str;

    /// Unconditional insertion used for bulk population.
    fn load(&mut self, event: Event);

    /// Insert a new event, rejecting duplicate clocks.
    fn insert(&mut self, event: Event) -> CalendarResult<()>;

    /// Event stored at `clock`, `Ok(None)` when absent.
    fn find(&self, clock: i64) -> CalendarResult<Option<Event>>;

    /// Remove the event at `clock`; `Ok(false)` when absent.
    fn delete(&mut self, clock: i64) -> CalendarResult<bool>;

    /// Live event count, O(1).
    fn total_events(&self) -> usize;

    /// Live events in ascending clock order.
    fn events(&self) -> Box<dyn Iterator<Item = &Event> + '_>;

    /// Check structural invariants.
    fn validate(&self) -> CalendarResult<()>;

    /// Drop every event.
    fn clear(&mut self);

    /// All live events in ascending clock order.
    fn report(&self) -> Vec<Event> {
        let mut out = Vec::with_capacity(self.total_events());
        out.extend(self.events().copied());
        out
    }

    fn is_empty(&self) -> bool {
        self.total_events() == 0
    }

    fn contains(&self, clock: i64) -> CalendarResult<bool> {
        Ok(self.find(clock)?.is_some())
    }

    /// `load` from a generator tuple.
    fn load_tuple(&mut self, tuple: &EventTuple) -> CalendarResult<()> {
        self.load(Event::from_tuple(tuple)?);
        Ok(())
    }

    /// `insert` from a generator tuple.
    fn insert_tuple(&mut self, tuple: &EventTuple) -> CalendarResult<()> {
        self.insert(Event::from_tuple(tuple)?)
    }
}

/// Storage strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CalendarKind {
    LinkedList,
    NestedArray,
    #[default]
    RefinedArray,
}

impl CalendarKind {
    /// Strategies in benchmark order.
    pub const ALL: [CalendarKind; 3] = [
        CalendarKind::RefinedArray,
        CalendarKind::NestedArray,
        CalendarKind::LinkedList,
    ];

    /// Build an empty index of this kind with default parameters.
    pub fn build(self) -> Box<dyn Calendar> {
        match self {
            CalendarKind::LinkedList => Box::new(LinkedListCalendar::new()),
            CalendarKind::NestedArray => Box::new(NestedArrayCalendar::new()),
            CalendarKind::RefinedArray => Box::new(RefinedArrayCalendar::new()),
        }
    }

    /// Build an empty index; `bucket_span` only affects the refined array.
    pub fn build_with_span(self, bucket_span: u32) -> CalendarResult<Box<dyn Calendar>> {
        match self {
            CalendarKind::RefinedArray => {
                Ok(Box::new(RefinedArrayCalendar::with_bucket_span(bucket_span)?))
            }
            other => Ok(other.build()),
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            CalendarKind::LinkedList => "linked",
            CalendarKind::NestedArray => "nested",
            CalendarKind::RefinedArray => "refined",
        }
    }
}

impl fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for CalendarKind {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linked" | "linked-list" | "list" => Ok(CalendarKind::LinkedList),
            "nested" | "nested-array" => Ok(CalendarKind::NestedArray),
            "refined" | "refined-array" | "improved" => Ok(CalendarKind::RefinedArray),
            other => Err(CalendarError::invalid_config(
                "strategy",
                &format!("unknown strategy '{}' (expected linked, nested or refined)", other),
            )),
        }
    }
}
