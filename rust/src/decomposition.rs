//! Coordinate decomposition of clock values.
//!
//! A [`Decomposition`] is an ordered list of levels, coarsest first. Level `i`
//! maps a clock to `(clock / stride_i) % fanout_i`; the first level is not
//! wrapped and must cover the whole domain. Strides nest exactly
//! (`stride_i == stride_{i+1} * fanout_{i+1}`), so composing the coordinates
//! gives back the first clock of the leaf bucket and the mapping preserves
//! clock order lexicographically.

use std::fmt;

use crate::error::{CalendarError, CalendarResult};
use crate::types::{
    Clock, DAY_SLOTS, MAX_CLOCK, SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
};

/// Deepest supported decomposition.
pub const MAX_DEPTH: usize = 4;

/// One positional coordinate of a decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub name: &'static str,
    /// Seconds covered by one step of this coordinate.
    pub stride: u32,
    /// Number of distinct coordinate values.
    pub fanout: u32,
}

impl Level {
    pub const fn new(name: &'static str, stride: u32, fanout: u32) -> Self {
        Self {
            name,
            stride,
            fanout,
        }
    }
}

/// Coordinate tuple of one clock, coarsest coordinate first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Coordinates {
    coords: [u32; MAX_DEPTH],
    depth: usize,
}

impl Coordinates {
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.coords[..self.depth]
    }

    #[inline]
    pub fn get(&self, level: usize) -> usize {
        self.coords[level] as usize
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.as_slice().iter().map(u32::to_string).collect();
        write!(f, "({})", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    levels: Vec<Level>,
}

impl Decomposition {
    /// Build a decomposition, checking that strides nest and that the top
    /// level covers every valid clock.
    pub fn new(levels: Vec<Level>) -> CalendarResult<Self> {
        if levels.is_empty() || levels.len() > MAX_DEPTH {
            return Err(CalendarError::invalid_config(
                "levels",
                &format!("depth {} outside 1..={}", levels.len(), MAX_DEPTH),
            ));
        }
        if let Some(level) = levels.iter().find(|l| l.stride == 0 || l.fanout == 0) {
            return Err(CalendarError::invalid_config(
                level.name,
                "stride and fanout must be positive",
            ));
        }
        for pair in levels.windows(2) {
            let (outer, inner) = (&pair[0], &pair[1]);
            if inner.stride.checked_mul(inner.fanout) != Some(outer.stride) {
                return Err(CalendarError::invalid_config(
                    inner.name,
                    &format!(
                        "{} x {} does not tile one {} step of {}",
                        inner.fanout, inner.stride, outer.name, outer.stride
                    ),
                ));
            }
        }
        let top = &levels[0];
        if u64::from(top.stride) * u64::from(top.fanout) <= u64::from(MAX_CLOCK) {
            return Err(CalendarError::invalid_config(
                top.name,
                "top level does not cover the clock domain",
            ));
        }
        Ok(Self { levels })
    }

    /// Day, hour, minute, second: every leaf holds exactly one clock.
    pub fn calendar() -> Self {
        Self {
            levels: vec![
                Level::new("day", SECONDS_PER_DAY, DAY_SLOTS),
                Level::new("hour", SECONDS_PER_HOUR, 24),
                Level::new("minute", SECONDS_PER_MINUTE, 60),
                Level::new("second", 1, 60),
            ],
        }
    }

    /// Day, then `bucket_span`-second slots within the day.
    pub fn coarse(bucket_span: u32) -> CalendarResult<Self> {
        if bucket_span == 0 || SECONDS_PER_DAY % bucket_span != 0 {
            return Err(CalendarError::invalid_config(
                "bucket_span",
                &format!("{} does not divide a day of {} seconds", bucket_span, SECONDS_PER_DAY),
            ));
        }
        Self::new(vec![
            Level::new("day", SECONDS_PER_DAY, DAY_SLOTS),
            Level::new("slot", bucket_span, SECONDS_PER_DAY / bucket_span),
        ])
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Seconds covered by one leaf bucket.
    #[inline]
    pub fn bucket_span(&self) -> u32 {
        self.levels[self.levels.len() - 1].stride
    }

    /// Split a clock into its coordinate path.
    #[inline]
    pub fn decompose(&self, clock: Clock) -> CalendarResult<Coordinates> {
        let raw = clock.get();
        let mut coords = [0u32; MAX_DEPTH];
        for (i, level) in self.levels.iter().enumerate() {
            let step = raw / level.stride;
            let coord = if i == 0 { step } else { step % level.fanout };
            if coord >= level.fanout {
                return Err(CalendarError::out_of_range(i64::from(raw)));
            }
            coords[i] = coord;
        }
        Ok(Coordinates {
            coords,
            depth: self.levels.len(),
        })
    }

    /// First clock of the bucket addressed by `coords`.
    pub fn compose(&self, coords: &Coordinates) -> CalendarResult<Clock> {
        if coords.depth() != self.depth() {
            return Err(CalendarError::invalid_config(
                "coordinates",
                &format!("depth {} against a {}-level decomposition", coords.depth(), self.depth()),
            ));
        }
        let mut raw: i64 = 0;
        for (coord, level) in coords.as_slice().iter().zip(&self.levels) {
            if *coord >= level.fanout {
                return Err(CalendarError::out_of_range(i64::from(*coord)));
            }
            raw += i64::from(*coord) * i64::from(level.stride);
        }
        Clock::new(raw)
    }
}
