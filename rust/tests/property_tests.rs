use std::collections::BTreeSet;

use calendar_index::{
    Calendar, CalendarKind, Clock, Decomposition, Event, RefinedArrayCalendar, MAX_CLOCK,
};
use proptest::prelude::*;

fn clock() -> impl Strategy<Value = u32> {
    prop_oneof![0..=MAX_CLOCK, 0u32..500, (MAX_CLOCK - 500)..=MAX_CLOCK]
}

fn span() -> impl Strategy<Value = u32> {
    prop::sample::select(vec![1u32, 2, 30, 60, 450, 3_600, 86_400])
}

proptest! {
    /// Report is the sorted set of inserted clocks, for every strategy.
    #[test]
    fn prop_report_is_sorted_and_complete(clocks in prop::collection::vec(clock(), 0..200)) {
        let expected: Vec<u32> =
            clocks.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        for kind in CalendarKind::ALL {
            let mut calendar = kind.build();
            for &raw in &clocks {
                let _ = calendar.insert(Event::new(i64::from(raw), 0, 1, 0).unwrap());
            }
            let report: Vec<u32> = calendar.report().iter().map(Event::key).collect();
            prop_assert_eq!(&report, &expected);
            prop_assert_eq!(calendar.total_events(), expected.len());
        }
    }

    /// Insert then delete restores the previous contents.
    #[test]
    fn prop_insert_delete_round_trip(
        existing in prop::collection::btree_set(clock(), 0..100),
        extra in clock(),
    ) {
        prop_assume!(!existing.contains(&extra));
        for kind in CalendarKind::ALL {
            let mut calendar = kind.build();
            for &raw in &existing {
                calendar.load(Event::new(i64::from(raw), 1, 2, 0).unwrap());
            }
            let before = calendar.report();
            calendar.insert(Event::new(i64::from(extra), 3, 4, 0).unwrap()).unwrap();
            prop_assert!(calendar.delete(i64::from(extra)).unwrap());
            prop_assert_eq!(calendar.report(), before);
            prop_assert!(calendar.validate().is_ok());
        }
    }

    /// Deleting every stored clock in any order empties the index.
    #[test]
    fn prop_delete_all_in_any_order(
        clocks in prop::collection::vec(clock(), 1..150).prop_shuffle(),
        span in span(),
    ) {
        let mut calendar = RefinedArrayCalendar::with_bucket_span(span).unwrap();
        for &raw in &clocks {
            calendar.load(Event::new(i64::from(raw), 0, 1, 0).unwrap());
        }
        for &raw in clocks.iter().rev() {
            prop_assert!(calendar.delete(i64::from(raw)).unwrap());
        }
        prop_assert!(calendar.is_empty());
        prop_assert_eq!(calendar.stats().buckets, 0);
        prop_assert!(calendar.validate().is_ok());
    }

    /// Decompose then compose is the identity on the clock domain.
    #[test]
    fn prop_decomposition_round_trip(raw in clock(), span in span()) {
        let clock = Clock::new(i64::from(raw)).unwrap();
        for decomposition in [Decomposition::calendar(), Decomposition::coarse(span).unwrap()] {
            let coords = decomposition.decompose(clock).unwrap();
            let bucket_start = decomposition.compose(&coords).unwrap();
            prop_assert!(bucket_start.get() <= raw);
            prop_assert!(raw - bucket_start.get() < decomposition.bucket_span());
        }
        let exact = Decomposition::calendar();
        prop_assert_eq!(exact.compose(&exact.decompose(clock).unwrap()).unwrap(), clock);
    }

    /// Clocks outside the domain are rejected rather than misplaced.
    #[test]
    fn prop_out_of_range_rejected(
        raw in prop_oneof![i64::MIN..0, i64::from(MAX_CLOCK) + 1..i64::MAX]
    ) {
        for kind in CalendarKind::ALL {
            let mut calendar = kind.build();
            prop_assert!(calendar.find(raw).unwrap_err().is_out_of_range());
            prop_assert!(calendar.delete(raw).unwrap_err().is_out_of_range());
        }
        prop_assert!(Event::new(raw, 0, 1, 0).is_err());
    }
}
