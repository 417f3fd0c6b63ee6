//! Calendar event indexes over a one-year clock.
//!
//! A discrete-event simulation keeps its pending events in a *calendar*
//! keyed by an integer clock in `0..YEAR_SECONDS`. This crate provides three
//! interchangeable indexes behind the [`Calendar`] trait:
//!
//! - [`LinkedListCalendar`]: a sorted doubly linked list, walked from
//!   whichever end is closer to the target clock.
//! - [`NestedArrayCalendar`]: day → hour → minute → second tables with one
//!   leaf bucket per clock.
//! - [`RefinedArrayCalendar`]: day → fixed-width slot tables whose leaf
//!   buckets hold every event in the slot, sorted by clock.
//!
//! ```
//! use calendar_index::{Calendar, CalendarKind, Event};
//!
//! let mut calendar = CalendarKind::RefinedArray.build();
//! for clock in [5, 1, 3] {
//!     calendar.insert(Event::new(clock, 0, 1, 0).unwrap()).unwrap();
//! }
//! let clocks: Vec<u32> = calendar.report().iter().map(Event::key).collect();
//! assert_eq!(clocks, vec![1, 3, 5]);
//! assert!(calendar.delete(3).unwrap());
//! assert_eq!(calendar.find(3).unwrap(), None);
//! ```

mod calendar;
mod compact_arena;
mod coordinate_tree;
mod decomposition;
mod error;
mod event;
mod linked_list;
#[cfg(any(test, feature = "testing"))]
mod macros;
mod nested_array;
mod refined_array;
mod report;
mod table_arena;
mod types;
mod validation;
mod workload;

#[cfg(any(test, feature = "testing"))]
pub mod conformance;

#[cfg(any(test, feature = "testing"))]
#[doc(hidden)]
pub use paste as __paste;

pub use calendar::{Calendar, CalendarKind};
pub use compact_arena::{CompactArena, CompactArenaStats};
pub use coordinate_tree::{Bucket, CoordinateTree, Iter as TreeIter, TreeStats};
pub use decomposition::{Coordinates, Decomposition, Level, MAX_DEPTH};
pub use error::{CalendarError, CalendarResult};
pub use event::{Event, EventStatus, EventTuple, EventType, MAX_UNIT};
pub use linked_list::{Iter as ListIter, LinkedListCalendar};
pub use nested_array::{CalendarPosition, NestedArrayCalendar};
pub use refined_array::{RefinedArrayCalendar, DEFAULT_BUCKET_SPAN};
pub use report::write_report;
pub use table_arena::TableArena;
pub use types::{
    Clock, SlotId, DAY_SLOTS, MAX_CLOCK, NULL_SLOT, SECONDS_PER_DAY, SECONDS_PER_HOUR,
    SECONDS_PER_MINUTE, YEAR_SECONDS,
};
pub use workload::{
    EventStream, SampleKeys, WorkloadConfig, DEFAULT_EVENTS, DEFAULT_SAMPLE_BOUND,
    DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE, DEFAULT_SEED,
};
