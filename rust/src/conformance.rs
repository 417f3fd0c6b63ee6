//! Behavioural checks every [`Calendar`] implementation must pass.
//!
//! Each check takes a fresh, empty calendar and panics with a descriptive
//! message on the first mismatch. They are normally instantiated through
//! [`crate::calendar_conformance_tests!`]. Compiled only with the `testing`
//! feature.

use crate::calendar::Calendar;
use crate::error::CalendarError;
use crate::event::Event;
use crate::types::{MAX_CLOCK, YEAR_SECONDS};

fn event(clock: i64, unit: i64) -> Event {
    match Event::new(clock, 1, unit, 0) {
        Ok(event) => event,
        Err(err) => panic!("bad fixture clock {}: {}", clock, err),
    }
}

fn keys(calendar: &dyn Calendar) -> Vec<u32> {
    calendar.events().map(Event::key).collect()
}

fn assert_empty(calendar: &dyn Calendar) {
    assert_eq!(calendar.total_events(), 0, "{} should be empty", calendar.name());
    assert!(calendar.report().is_empty(), "{} reports events", calendar.name());
}

/// Load 5, 1, 3; report ascending; find returns the stored event; delete by
/// clock.
pub fn basic_scenario(calendar: &mut dyn Calendar) {
    assert_empty(calendar);
    let stored = |clock: i64| match Event::new(clock, 0, 1, 0) {
        Ok(event) => event,
        Err(err) => panic!("bad fixture clock {}: {}", clock, err),
    };
    for clock in [5, 1, 3] {
        calendar.load(stored(clock));
    }
    assert_eq!(keys(calendar), vec![1, 3, 5], "{}", calendar.name());
    assert_eq!(calendar.find(3).unwrap(), Some(stored(3)), "{}", calendar.name());
    assert_eq!(calendar.find(4).unwrap(), None);

    assert!(calendar.delete(3).unwrap());
    assert_eq!(
        calendar.report(),
        vec![stored(1), stored(5)],
        "{}",
        calendar.name()
    );
    assert_eq!(calendar.total_events(), 2);
    calendar.validate().unwrap();
}

/// First and last clock of the domain work; one step outside fails.
pub fn domain_boundaries(calendar: &mut dyn Calendar) {
    let last = i64::from(MAX_CLOCK);
    calendar.insert(event(0, 1)).unwrap();
    calendar.insert(event(last, 1)).unwrap();
    assert_eq!(keys(calendar), vec![0, MAX_CLOCK]);

    for outside in [-1, i64::from(YEAR_SECONDS), i64::MAX] {
        assert!(
            matches!(
                calendar.find(outside),
                Err(CalendarError::OutOfRange { .. })
            ),
            "{}: find({})",
            calendar.name(),
            outside
        );
        assert!(calendar.delete(outside).unwrap_err().is_out_of_range());
    }
    assert!(Event::new(i64::from(YEAR_SECONDS), 1, 1, 0).is_err());
    assert_eq!(calendar.total_events(), 2);

    assert!(calendar.delete(last).unwrap());
    assert!(calendar.delete(0).unwrap());
    assert_empty(calendar);
    calendar.validate().unwrap();
}

/// Deleting twice reports the second attempt as absent.
pub fn delete_is_idempotent(calendar: &mut dyn Calendar) {
    assert!(!calendar.delete(42).unwrap(), "delete on empty calendar");
    calendar.insert(event(42, 1)).unwrap();
    assert!(calendar.delete(42).unwrap());
    assert!(!calendar.delete(42).unwrap());
    assert_empty(calendar);
}

/// `insert` refuses a clock already stored and leaves the original intact.
pub fn duplicates_rejected(calendar: &mut dyn Calendar) {
    calendar.insert(event(100, 1)).unwrap();
    assert_eq!(
        calendar.insert(event(100, 2)),
        Err(CalendarError::DuplicateKey(100))
    );
    assert_eq!(calendar.total_events(), 1);
    assert_eq!(calendar.find(100).unwrap().map(|e| e.unit()), Some(1));
}

/// `load` keeps repeated clocks in insertion order; find and delete take the
/// earliest.
pub fn load_keeps_ties_stable(calendar: &mut dyn Calendar) {
    for (clock, unit) in [(10, 1), (20, 1), (10, 2), (10, 3)] {
        calendar.load(event(clock, unit));
    }
    assert_eq!(calendar.total_events(), 4);
    let units: Vec<(u32, u8)> = calendar.events().map(|e| (e.key(), e.unit())).collect();
    assert_eq!(units, vec![(10, 1), (10, 2), (10, 3), (20, 1)], "{}", calendar.name());

    assert_eq!(calendar.find(10).unwrap().map(|e| e.unit()), Some(1));
    assert!(calendar.delete(10).unwrap());
    assert_eq!(calendar.find(10).unwrap().map(|e| e.unit()), Some(2));
    calendar.validate().unwrap();
}

/// Load an ascending run, delete all of it in a scattered order.
pub fn load_then_delete_all(calendar: &mut dyn Calendar) {
    const COUNT: i64 = 2_000;
    const STRIDE: i64 = 7_919;
    for i in 0..COUNT {
        calendar.load(event(i * STRIDE, i % 10 + 1));
    }
    assert_eq!(calendar.total_events(), COUNT as usize);
    calendar.validate().unwrap();

    // 1_009 is coprime with COUNT, so this visits every index once.
    for i in 0..COUNT {
        let clock = (i * 1_009 % COUNT) * STRIDE;
        assert!(calendar.delete(clock).unwrap(), "{}: delete {}", calendar.name(), clock);
    }
    assert_empty(calendar);
    calendar.validate().unwrap();
}

/// The count always equals the number of reported events.
pub fn count_matches_report(calendar: &mut dyn Calendar) {
    let mut expected = 0usize;
    for clock in (0..50_000).step_by(997) {
        calendar.insert(event(clock, 4)).unwrap();
        expected += 1;
        assert_eq!(calendar.total_events(), expected);
    }
    for clock in (0..50_000).step_by(997 * 3) {
        assert!(calendar.delete(clock).unwrap());
        expected -= 1;
        assert_eq!(calendar.total_events(), expected);
    }
    assert_eq!(calendar.report().len(), expected);
    let report = keys(calendar);
    assert!(report.windows(2).all(|pair| pair[0] < pair[1]));
}

/// `clear` empties the calendar and leaves it usable.
pub fn clear_resets(calendar: &mut dyn Calendar) {
    for clock in [9, 99, 999, 9_999] {
        calendar.insert(event(clock, 1)).unwrap();
    }
    calendar.clear();
    assert_empty(calendar);
    calendar.validate().unwrap();
    calendar.insert(event(99, 1)).unwrap();
    assert_eq!(keys(calendar), vec![99]);
}
