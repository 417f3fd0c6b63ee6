//! Seeded benchmark workload.
//!
//! [`EventStream`] manufactures the bulk-load tuples: a strictly increasing
//! clock advanced by random steps bounded so the whole stream fits in the
//! year. [`SampleKeys`] is the fixed random sample later used for the
//! insert/find/delete phases.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CalendarError, CalendarResult};
use crate::event::EventTuple;
use crate::types::{MAX_CLOCK, YEAR_SECONDS};

pub const DEFAULT_EVENTS: usize = 1_000_000;
pub const DEFAULT_SEED: u64 = 846_195_035;
pub const DEFAULT_SAMPLE_SIZE: usize = 1_000;
pub const DEFAULT_SAMPLE_BOUND: u32 = 1_000_000;
pub const DEFAULT_SAMPLE_SEED: u64 = 235_387_522;

/// Number of event types the generator cycles through.
const TYPE_COUNT: u32 = 6;
/// The type code whose events start out running.
const RUNNING_TYPE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Events in the bulk load.
    pub events: usize,
    pub seed: u64,
    /// Keys in the insert/find/delete sample.
    pub sample_size: usize,
    /// Sample keys are drawn from `0..sample_bound`.
    pub sample_bound: u32,
    pub sample_seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            events: DEFAULT_EVENTS,
            seed: DEFAULT_SEED,
            sample_size: DEFAULT_SAMPLE_SIZE,
            sample_bound: DEFAULT_SAMPLE_BOUND,
            sample_seed: DEFAULT_SAMPLE_SEED,
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> CalendarResult<()> {
        if self.events as u64 > u64::from(MAX_CLOCK) {
            return Err(CalendarError::invalid_config(
                "events",
                &format!("{} unique clocks do not fit below {}", self.events, MAX_CLOCK),
            ));
        }
        if self.sample_bound == 0 || self.sample_bound > YEAR_SECONDS {
            return Err(CalendarError::invalid_config(
                "sample_bound",
                &format!("{} outside 1..={}", self.sample_bound, YEAR_SECONDS),
            ));
        }
        Ok(())
    }

    /// Upper bound (exclusive) of a single clock advance.
    pub fn max_advance(&self) -> u32 {
        let per_event = YEAR_SECONDS as usize / self.events.max(1);
        per_event.clamp(2, YEAR_SECONDS as usize) as u32
    }

    pub fn event_stream(&self) -> CalendarResult<EventStream> {
        self.validate()?;
        Ok(EventStream::new(self.events, self.max_advance(), self.seed))
    }

    pub fn sample_keys(&self) -> CalendarResult<SampleKeys> {
        self.validate()?;
        Ok(SampleKeys::generate(self.sample_size, self.sample_bound, self.sample_seed))
    }
}

/// Strictly increasing stream of bulk-load tuples.
#[derive(Debug, Clone)]
pub struct EventStream {
    rng: StdRng,
    clock: u32,
    max_advance: u32,
    remaining: usize,
}

impl EventStream {
    pub fn new(events: usize, max_advance: u32, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            clock: 0,
            max_advance: max_advance.max(2),
            remaining: events,
        }
    }

    /// Tuple for a clock reached by an advance of `step`.
    fn tuple(clock: u32, step: u32) -> EventTuple {
        let event_type = step % TYPE_COUNT;
        let unit = step % 10 + 1;
        let status = u32::from(event_type == RUNNING_TYPE);
        [
            0,
            i64::from(clock),
            i64::from(event_type),
            i64::from(unit),
            i64::from(status),
            0,
        ]
    }
}

impl Iterator for EventStream {
    type Item = EventTuple;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let step = self.rng.gen_range(1..self.max_advance);
        self.clock += step;
        self.remaining -= 1;
        Some(Self::tuple(self.clock, step))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for EventStream {}

/// Fixed random sample of clocks for the timed phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleKeys {
    keys: Vec<u32>,
}

impl SampleKeys {
    pub fn generate(count: usize, bound: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let bound = bound.max(1);
        Self {
            keys: (0..count).map(|_| rng.gen_range(0..bound)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.keys.iter().map(|&key| i64::from(key))
    }

    /// Insert tuples for the sample: type 1, unit 1, running.
    pub fn insert_tuples(&self) -> impl Iterator<Item = EventTuple> + '_ {
        self.iter().map(|key| [0, key, 1, 1, 1, 0])
    }
}
