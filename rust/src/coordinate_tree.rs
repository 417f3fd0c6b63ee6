//! Lazy multi-level coordinate tree shared by the array-based indexes.
//!
//! Level `i` of the tree is a [`TableArena`] whose tables have one child slot
//! per value of coordinate `i`. A child slot of a non-leaf level holds the id
//! of a table in the next level; a child slot of the last level holds the id of
//! a bucket in the bucket arena. Missing tables and buckets are `NULL_SLOT` and
//! are only materialized when an event lands under them. Deleting the last
//! event under a table frees the table again, bottom up. The root table is
//! allocated once and never freed.
//!
//! Buckets are kept sorted by clock. Events with equal clocks keep their
//! insertion order, so lookups and deletes act on the earliest one.

use tracing::{debug, trace};

use crate::compact_arena::CompactArena;
use crate::decomposition::{Coordinates, Decomposition, MAX_DEPTH};
use crate::error::{CalendarError, CalendarResult};
use crate::event::Event;
use crate::table_arena::TableArena;
use crate::types::{Clock, SlotId, NULL_SLOT};

/// Events sharing one leaf coordinate tuple, ascending by clock.
pub type Bucket = Vec<Event>;

/// Occupancy figures for a coordinate tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    /// Live tables per level, coarsest first.
    pub tables_per_level: Vec<usize>,
    /// Child slots reserved across all levels.
    pub reserved_slots: usize,
    pub buckets: usize,
    pub largest_bucket: usize,
    pub events: usize,
}

impl TreeStats {
    pub fn average_bucket_len(&self) -> f64 {
        if self.buckets == 0 {
            0.0
        } else {
            self.events as f64 / self.buckets as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoordinateTree {
    pub(crate) decomposition: Decomposition,
    pub(crate) root: SlotId,
    pub(crate) levels: Vec<TableArena>,
    pub(crate) buckets: CompactArena<Bucket>,
    pub(crate) len: usize,
}

impl CoordinateTree {
    pub fn new(decomposition: Decomposition) -> Self {
        let mut levels: Vec<TableArena> = decomposition
            .levels()
            .iter()
            .map(|level| TableArena::new(level.fanout as usize))
            .collect();
        let root = levels[0].allocate();
        Self {
            decomposition,
            root,
            levels,
            buckets: CompactArena::new(),
            len: 0,
        }
    }

    pub fn decomposition(&self) -> &Decomposition {
        &self.decomposition
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // ============================================================================
    // PATH RESOLUTION
    // ============================================================================

    /// Follow `coords` down to the bucket id without allocating.
    fn bucket_id(&self, coords: &Coordinates) -> SlotId {
        let last = self.levels.len() - 1;
        let mut table = self.root;
        for (level, arena) in self.levels.iter().enumerate() {
            let child = arena.child(table, coords.get(level));
            if child == NULL_SLOT || level == last {
                return child;
            }
            table = child;
        }
        NULL_SLOT
    }

    /// Follow `coords` down to the bucket id, materializing missing tables and
    /// the bucket itself.
    fn bucket_id_or_create(&mut self, coords: &Coordinates) -> SlotId {
        let last = self.levels.len() - 1;
        let mut table = self.root;
        for level in 0..last {
            let coord = coords.get(level);
            let mut child = self.levels[level].child(table, coord);
            if child == NULL_SLOT {
                child = self.levels[level + 1].allocate();
                self.levels[level].set_child(table, coord, child);
                trace!(level = level + 1, table = child, "materialized table");
            }
            table = child;
        }

        let coord = coords.get(last);
        let mut bucket = self.levels[last].child(table, coord);
        if bucket == NULL_SLOT {
            bucket = self.buckets.allocate(Bucket::new());
            self.levels[last].set_child(table, coord, bucket);
        }
        bucket
    }

    // ============================================================================
    // OPERATIONS
    // ============================================================================

    /// Place an event. With `reject_duplicates` an existing event at the same
    /// clock turns the call into a `DuplicateKey` error and nothing changes.
    pub fn insert(&mut self, event: Event, reject_duplicates: bool) -> CalendarResult<()> {
        let coords = self.decomposition.decompose(event.clock())?;
        let key = event.key();

        if reject_duplicates {
            let existing = self.bucket_id(&coords);
            if let Some(bucket) = self.buckets.get(existing) {
                let pos = bucket.partition_point(|e| e.key() < key);
                if bucket.get(pos).is_some_and(|e| e.key() == key) {
                    debug!(clock = key, "insert rejected: clock already present");
                    return Err(CalendarError::DuplicateKey(key));
                }
            }
        }

        let bucket_id = self.bucket_id_or_create(&coords);
        if let Some(bucket) = self.buckets.get_mut(bucket_id) {
            // After any equal clocks, so ties stay in insertion order.
            let pos = bucket.partition_point(|e| e.key() <= key);
            bucket.insert(pos, event);
            self.len += 1;
        }
        Ok(())
    }

    /// Earliest-inserted event stored at `clock`.
    pub fn find(&self, clock: Clock) -> CalendarResult<Option<&Event>> {
        let coords = self.decomposition.decompose(clock)?;
        let key = clock.get();
        Ok(self.buckets.get(self.bucket_id(&coords)).and_then(|bucket| {
            let pos = bucket.partition_point(|e| e.key() < key);
            bucket.get(pos).filter(|e| e.key() == key)
        }))
    }

    /// Remove the earliest-inserted event stored at `clock`, reclaiming the
    /// bucket and any tables left empty.
    pub fn remove(&mut self, clock: Clock) -> CalendarResult<Option<Event>> {
        let coords = self.decomposition.decompose(clock)?;
        let key = clock.get();
        let depth = self.levels.len();

        // Tables visited on the way down; path[i] is the table at level i.
        let mut path = [NULL_SLOT; MAX_DEPTH];
        let mut table = self.root;
        for (level, slot) in path.iter_mut().enumerate().take(depth) {
            *slot = table;
            table = self.levels[level].child(table, coords.get(level));
            if table == NULL_SLOT {
                return Ok(None);
            }
        }
        let bucket_id = table;

        let Some(bucket) = self.buckets.get_mut(bucket_id) else {
            return Ok(None);
        };
        let pos = bucket.partition_point(|e| e.key() < key);
        if bucket.get(pos).map_or(true, |e| e.key() != key) {
            return Ok(None);
        }
        let removed = bucket.remove(pos);
        let emptied = bucket.is_empty();
        self.len -= 1;

        if emptied {
            self.buckets.deallocate(bucket_id);
            self.levels[depth - 1].set_child(path[depth - 1], coords.get(depth - 1), NULL_SLOT);

            for level in (1..depth).rev() {
                let table = path[level];
                if self.levels[level].occupied(table) != 0 {
                    break;
                }
                self.levels[level].release(table);
                self.levels[level - 1].set_child(path[level - 1], coords.get(level - 1), NULL_SLOT);
                trace!(level, table, "reclaimed empty table");
            }
        }
        Ok(Some(removed))
    }

    /// All events in ascending clock order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Events under one top-level coordinate, in clock order. Only that
    /// subtree is visited.
    pub fn iter_under(&self, coord: u32) -> Iter<'_> {
        let child = self.levels[0].child(self.root, coord as usize);
        if child == NULL_SLOT {
            return Iter::over(self, Vec::new(), &[], 0);
        }
        if self.levels.len() == 1 {
            let bucket = self.buckets.get(child).map_or(&[][..], Vec::as_slice);
            return Iter::over(self, Vec::new(), bucket, bucket.len());
        }
        let remaining = self.count_under(1, child);
        Iter::over(self, vec![(1, child, 0)], &[], remaining)
    }

    fn count_under(&self, level: usize, table: SlotId) -> usize {
        let leaf_level = self.levels.len() - 1;
        self.levels[level]
            .children(table)
            .iter()
            .filter(|&&child| child != NULL_SLOT)
            .map(|&child| {
                if level < leaf_level {
                    self.count_under(level + 1, child)
                } else {
                    self.buckets.get(child).map_or(0, Vec::len)
                }
            })
            .sum()
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            tables_per_level: self.levels.iter().map(TableArena::len).collect(),
            reserved_slots: self.levels.iter().map(TableArena::reserved_slots).sum(),
            buckets: self.buckets.len(),
            largest_bucket: self.buckets.iter().map(|(_, b)| b.len()).max().unwrap_or(0),
            events: self.len,
        }
    }

    pub fn clear(&mut self) {
        for arena in &mut self.levels {
            arena.clear();
        }
        self.buckets.clear();
        self.root = self.levels[0].allocate();
        self.len = 0;
    }
}

// ============================================================================
// ITERATION
// ============================================================================

/// Depth-first walk over the tables in coordinate order, yielding each
/// bucket's events in turn.
pub struct Iter<'a> {
    tree: &'a CoordinateTree,
    /// (level, table, next coordinate to visit)
    stack: Vec<(usize, SlotId, usize)>,
    bucket: std::slice::Iter<'a, Event>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    fn new(tree: &'a CoordinateTree) -> Self {
        let mut stack = Vec::with_capacity(tree.levels.len());
        if tree.len > 0 {
            stack.push((0, tree.root, 0));
        }
        Self::over(tree, stack, &[], tree.len)
    }

    fn over(
        tree: &'a CoordinateTree,
        stack: Vec<(usize, SlotId, usize)>,
        bucket: &'a [Event],
        remaining: usize,
    ) -> Self {
        Self {
            tree,
            stack,
            bucket: bucket.iter(),
            remaining,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let leaf_level = tree.levels.len() - 1;
        loop {
            if let Some(event) = self.bucket.next() {
                self.remaining -= 1;
                return Some(event);
            }

            let top = self.stack.last_mut()?;
            let (level, table, start) = *top;
            let children = tree.levels[level].children(table);
            let Some(offset) = children
                .get(start..)
                .and_then(|rest| rest.iter().position(|&child| child != NULL_SLOT))
            else {
                self.stack.pop();
                continue;
            };

            let coord = start + offset;
            top.2 = coord + 1;
            let child = children[coord];
            if level == leaf_level {
                if let Some(bucket) = tree.buckets.get(child) {
                    self.bucket = bucket.iter();
                }
            } else {
                self.stack.push((level + 1, child, 0));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
