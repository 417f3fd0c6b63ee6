//! Event records stored by every calendar index.

use std::fmt;

use crate::error::{CalendarError, CalendarResult};
use crate::types::Clock;

/// Six-field tuple produced by the workload generator:
/// `(reserved, clock, type, unit, status, reserved)`.
pub type EventTuple = [i64; 6];

/// Highest unit number an event may be assigned to.
pub const MAX_UNIT: u8 = 10;

/// Kind of event. Codes follow the generator's `n % 6` selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventType {
    Dispatch = 0,
    Arrival = 1,
    Departure = 2,
    Service = 3,
    Maintenance = 4,
    Run = 5,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Dispatch,
        EventType::Arrival,
        EventType::Departure,
        EventType::Service,
        EventType::Maintenance,
        EventType::Run,
    ];

    pub fn from_code(code: i64) -> CalendarResult<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| CalendarError::invalid_event("type", code))
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Whether the unit is running when the event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventStatus {
    Idle = 0,
    Running = 1,
}

impl EventStatus {
    pub fn from_code(code: i64) -> CalendarResult<Self> {
        match code {
            0 => Ok(EventStatus::Idle),
            1 => Ok(EventStatus::Running),
            other => Err(CalendarError::invalid_event("status", other)),
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// An immutable calendar event. Linkage and position state belong to the
/// index holding the event, never to the event itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    clock: Clock,
    event_type: EventType,
    unit: u8,
    status: EventStatus,
}

impl Event {
    /// Build an event from raw codes, validating every field.
    ///
    /// # Examples
    ///
    /// ```
    /// use calendar_index::{Event, EventStatus, EventType};
    ///
    /// let event = Event::new(3_600, 5, 2, 1).unwrap();
    /// assert_eq!(event.clock().get(), 3_600);
    /// assert_eq!(event.event_type(), EventType::Run);
    /// assert_eq!(event.status(), EventStatus::Running);
    ///
    /// assert!(Event::new(-1, 0, 1, 0).unwrap_err().is_out_of_range());
    /// assert!(Event::new(0, 0, 11, 0).is_err());
    /// ```
    pub fn new(clock: i64, event_type: i64, unit: i64, status: i64) -> CalendarResult<Self> {
        let clock = Clock::new(clock)?;
        let event_type = EventType::from_code(event_type)?;
        let status = EventStatus::from_code(status)?;
        let unit = match u8::try_from(unit) {
            Ok(unit) if (1..=MAX_UNIT).contains(&unit) => unit,
            _ => return Err(CalendarError::invalid_event("unit", unit)),
        };
        Ok(Self::with_fields(clock, event_type, unit, status))
    }

    /// Build an event from already validated parts. `unit` must lie in `1..=MAX_UNIT`.
    pub fn with_fields(clock: Clock, event_type: EventType, unit: u8, status: EventStatus) -> Self {
        debug_assert!((1..=MAX_UNIT).contains(&unit));
        Self {
            clock,
            event_type,
            unit,
            status,
        }
    }

    /// Build an event from a generator tuple. Positions 0 and 5 are reserved
    /// and ignored.
    pub fn from_tuple(tuple: &EventTuple) -> CalendarResult<Self> {
        Self::new(tuple[1], tuple[2], tuple[3], tuple[4])
    }

    /// The tuple form of this event, reserved positions zeroed.
    pub fn to_tuple(&self) -> EventTuple {
        [
            0,
            i64::from(self.clock.get()),
            i64::from(self.event_type.code()),
            i64::from(self.unit),
            i64::from(self.status.code()),
            0,
        ]
    }

    #[inline]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Shorthand for `self.clock().get()`, the key every index orders by.
    #[inline]
    pub fn key(&self) -> u32 {
        self.clock.get()
    }

    #[inline]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    #[inline]
    pub fn unit(&self) -> u8 {
        self.unit
    }

    #[inline]
    pub fn status(&self) -> EventStatus {
        self.status
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.clock,
            self.event_type.code(),
            self.unit,
            self.status.code()
        )
    }
}
