use std::collections::BTreeMap;

use calendar_index::{Calendar, CalendarKind, Event, RefinedArrayCalendar, WorkloadConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Reference model: clock -> events in insertion order.
#[derive(Default)]
struct Model {
    events: BTreeMap<u32, Vec<Event>>,
    len: usize,
}

impl Model {
    fn load(&mut self, event: Event) {
        self.events.entry(event.key()).or_default().push(event);
        self.len += 1;
    }

    fn insert(&mut self, event: Event) -> bool {
        if self.events.contains_key(&event.key()) {
            return false;
        }
        self.load(event);
        true
    }

    fn find(&self, clock: u32) -> Option<Event> {
        self.events.get(&clock).and_then(|bucket| bucket.first().copied())
    }

    fn delete(&mut self, clock: u32) -> bool {
        let Some(bucket) = self.events.get_mut(&clock) else {
            return false;
        };
        bucket.remove(0);
        if bucket.is_empty() {
            self.events.remove(&clock);
        }
        self.len -= 1;
        true
    }

    fn report(&self) -> Vec<Event> {
        self.events.values().flatten().copied().collect()
    }
}

fn calendars() -> Vec<Box<dyn Calendar>> {
    let mut calendars: Vec<Box<dyn Calendar>> =
        CalendarKind::ALL.iter().map(|kind| kind.build()).collect();
    calendars.push(Box::new(RefinedArrayCalendar::with_bucket_span(900).unwrap()));
    calendars
}

fn random_event(rng: &mut StdRng, max_clock: u32) -> Event {
    Event::new(
        i64::from(rng.gen_range(0..=max_clock)),
        rng.gen_range(0..6),
        rng.gen_range(1..=10),
        rng.gen_range(0..2),
    )
    .unwrap()
}

fn run_random_operations(seed: u64, operations: usize, max_clock: u32) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut model = Model::default();
    let mut calendars = calendars();

    for step in 0..operations {
        let event = random_event(&mut rng, max_clock);
        let clock = i64::from(event.key());
        match rng.gen_range(0..10) {
            0..=1 => {
                model.load(event);
                for calendar in calendars.iter_mut() {
                    calendar.load(event);
                }
            }
            2..=4 => {
                let accepted = model.insert(event);
                for calendar in calendars.iter_mut() {
                    assert_eq!(calendar.insert(event).is_ok(), accepted, "step {}", step);
                }
            }
            5..=6 => {
                let expected = model.find(event.key());
                for calendar in &calendars {
                    assert_eq!(calendar.find(clock).unwrap(), expected, "step {}", step);
                }
            }
            _ => {
                let expected = model.delete(event.key());
                for calendar in calendars.iter_mut() {
                    assert_eq!(
                        calendar.delete(clock).unwrap(),
                        expected,
                        "{} step {}",
                        calendar.name(),
                        step
                    );
                }
            }
        }
        if step % 500 == 0 {
            let expected = model.report();
            for calendar in &calendars {
                assert_eq!(
                    calendar.total_events(),
                    model.len,
                    "{} step {}",
                    calendar.name(),
                    step
                );
                assert_eq!(calendar.report(), expected, "{} step {}", calendar.name(), step);
                calendar.validate().unwrap();
            }
        }
    }

    let expected = model.report();
    for calendar in &calendars {
        assert_eq!(calendar.total_events(), model.len, "{}", calendar.name());
        assert_eq!(calendar.report(), expected, "{}", calendar.name());
        calendar.validate().unwrap();
    }
}

#[test]
fn test_random_operations_dense_clocks() {
    // Small clock range: plenty of hits, duplicates and shared buckets.
    run_random_operations(1, 5_000, 2_000);
}

#[test]
fn test_random_operations_whole_year() {
    run_random_operations(2, 5_000, calendar_index::MAX_CLOCK);
}

#[test]
fn test_random_operations_many_seeds() {
    for seed in 10..20 {
        run_random_operations(seed, 1_000, 200_000);
    }
}

#[test]
fn test_generated_workload_gives_identical_reports() {
    let config = WorkloadConfig {
        events: 20_000,
        ..WorkloadConfig::default()
    };
    let mut calendars = calendars();
    for tuple in config.event_stream().unwrap() {
        for calendar in calendars.iter_mut() {
            calendar.load_tuple(&tuple).unwrap();
        }
    }

    let sample = config.sample_keys().unwrap();
    for tuple in sample.insert_tuples() {
        let outcomes: Vec<bool> = calendars
            .iter_mut()
            .map(|calendar| calendar.insert_tuple(&tuple).is_ok())
            .collect();
        assert!(outcomes.windows(2).all(|pair| pair[0] == pair[1]));
    }

    let mut keys: Vec<i64> = sample.iter().collect();
    keys.shuffle(&mut StdRng::seed_from_u64(99));
    for key in keys {
        let outcomes: Vec<bool> = calendars
            .iter_mut()
            .map(|calendar| calendar.delete(key).unwrap())
            .collect();
        assert!(outcomes.windows(2).all(|pair| pair[0] == pair[1]));
    }

    let reference = calendars[0].report();
    for calendar in &calendars[1..] {
        assert_eq!(calendar.report(), reference, "{}", calendar.name());
    }
}
