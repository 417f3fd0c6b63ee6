use calendar_index::{
    write_report, Calendar, CalendarError, CalendarKind, Event, EventStatus, EventType,
    LinkedListCalendar, NestedArrayCalendar, RefinedArrayCalendar, MAX_CLOCK, YEAR_SECONDS,
};

fn event(clock: i64) -> Event {
    Event::new(clock, 2, 4, 0).unwrap()
}

fn keys(calendar: &dyn Calendar) -> Vec<u32> {
    calendar.report().iter().map(Event::key).collect()
}

fn all_calendars() -> Vec<Box<dyn Calendar>> {
    CalendarKind::ALL.iter().map(|kind| kind.build()).collect()
}

#[test]
fn test_load_report_find_delete() {
    let stored = |clock: i64| Event::new(clock, 0, 1, 0).unwrap();
    for mut calendar in all_calendars() {
        for clock in [5, 1, 3] {
            calendar.load(stored(clock));
        }
        assert_eq!(keys(calendar.as_ref()), vec![1, 3, 5], "{}", calendar.name());
        assert_eq!(calendar.find(3).unwrap(), Some(stored(3)), "{}", calendar.name());
        assert!(calendar.delete(3).unwrap());
        assert_eq!(calendar.report(), vec![stored(1), stored(5)]);
        assert_eq!(calendar.total_events(), 2);
    }
}

#[test]
fn test_insert_report_find_delete() {
    for mut calendar in all_calendars() {
        for clock in [5, 1, 3] {
            calendar.insert(event(clock)).unwrap();
        }
        assert_eq!(keys(calendar.as_ref()), vec![1, 3, 5], "{}", calendar.name());
        assert_eq!(calendar.find(3).unwrap(), Some(event(3)));
        assert!(calendar.delete(3).unwrap());
        assert_eq!(keys(calendar.as_ref()), vec![1, 5]);
        assert_eq!(calendar.total_events(), 2);
    }
}

#[test]
fn test_find_absent_is_none() {
    for mut calendar in all_calendars() {
        assert_eq!(calendar.find(0).unwrap(), None);
        calendar.insert(event(100)).unwrap();
        assert_eq!(calendar.find(99).unwrap(), None);
        assert_eq!(calendar.find(101).unwrap(), None);
    }
}

#[test]
fn test_delete_absent_is_false_and_changes_nothing() {
    for mut calendar in all_calendars() {
        calendar.insert(event(10)).unwrap();
        calendar.insert(event(20)).unwrap();
        assert!(!calendar.delete(15).unwrap());
        assert_eq!(keys(calendar.as_ref()), vec![10, 20]);
        calendar.validate().unwrap();
    }
}

#[test]
fn test_domain_edges() {
    let last = i64::from(MAX_CLOCK);
    for mut calendar in all_calendars() {
        calendar.insert(event(last)).unwrap();
        calendar.insert(event(0)).unwrap();
        assert_eq!(keys(calendar.as_ref()), vec![0, MAX_CLOCK]);
        assert_eq!(calendar.find(last).unwrap().map(|e| e.key()), Some(MAX_CLOCK));

        let err = calendar.find(i64::from(YEAR_SECONDS)).unwrap_err();
        assert_eq!(
            err,
            CalendarError::OutOfRange {
                clock: i64::from(YEAR_SECONDS),
                max: MAX_CLOCK
            }
        );
        assert!(calendar.delete(-1).unwrap_err().is_out_of_range());
    }
}

#[test]
fn test_invalid_event_fields_are_rejected() {
    assert!(matches!(
        Event::new(0, 6, 1, 0),
        Err(CalendarError::InvalidEvent(_))
    ));
    assert!(Event::new(0, 0, 0, 0).is_err());
    assert!(Event::new(0, 0, 1, 2).is_err());
    assert!(Event::new(i64::from(YEAR_SECONDS), 0, 1, 0)
        .unwrap_err()
        .is_out_of_range());

    let mut calendar = CalendarKind::LinkedList.build();
    assert!(calendar.load_tuple(&[0, 5, 9, 1, 0, 0]).is_err());
    assert!(calendar.is_empty());
}

#[test]
fn test_tuple_intake_ignores_reserved_fields() {
    let event = Event::from_tuple(&[77, 3_600, 5, 10, 1, -4]).unwrap();
    assert_eq!(event.key(), 3_600);
    assert_eq!(event.event_type(), EventType::Run);
    assert_eq!(event.unit(), 10);
    assert_eq!(event.status(), EventStatus::Running);
    assert_eq!(event.to_tuple(), [0, 3_600, 5, 10, 1, 0]);
}

#[test]
fn test_duplicate_insert_rejected_everywhere() {
    for mut calendar in all_calendars() {
        calendar.insert(event(86_400)).unwrap();
        assert!(calendar.insert(event(86_400)).unwrap_err().is_duplicate());
        assert_eq!(calendar.total_events(), 1);
        calendar.validate().unwrap();
    }
}

#[test]
fn test_concrete_types_behind_trait_objects() {
    let calendars: Vec<Box<dyn Calendar>> = vec![
        Box::new(LinkedListCalendar::new()),
        Box::new(NestedArrayCalendar::new()),
        Box::new(RefinedArrayCalendar::with_bucket_span(1).unwrap()),
        Box::new(RefinedArrayCalendar::with_bucket_span(86_400).unwrap()),
    ];
    for mut calendar in calendars {
        for clock in [172_800, 7, 86_399, 86_400, 3_600] {
            calendar.insert(event(clock)).unwrap();
        }
        assert_eq!(
            keys(calendar.as_ref()),
            vec![7, 3_600, 86_399, 86_400, 172_800],
            "{}",
            calendar.name()
        );
        calendar.validate().unwrap();
    }
}

#[test]
fn test_report_writer_matches_report() {
    for mut calendar in all_calendars() {
        for clock in [30, 10, 20] {
            calendar.insert(Event::new(clock, 5, 2, 1).unwrap()).unwrap();
        }
        let mut out = Vec::new();
        let lines = write_report(calendar.as_ref(), &mut out).unwrap();
        assert_eq!(lines, calendar.total_events());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "10 5 2 1\n20 5 2 1\n30 5 2 1\n"
        );
    }
}
