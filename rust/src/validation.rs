//! Structural invariant checks for the calendar indexes.
//!
//! Mutations are written to keep these invariants; the checks exist for tests
//! and for the benchmark driver's post-run verification.

use crate::coordinate_tree::CoordinateTree;
use crate::decomposition::MAX_DEPTH;
use crate::error::{CalendarError, CalendarResult};
use crate::linked_list::LinkedListCalendar;
use crate::types::{SlotId, NULL_SLOT};

// ============================================================================
// LINKED LIST
// ============================================================================

impl LinkedListCalendar {
    /// Check link symmetry, ordering, termination and counts.
    pub fn check_invariants(&self) -> CalendarResult<()> {
        let empty = self.len == 0;
        if (self.head == NULL_SLOT) != empty || (self.tail == NULL_SLOT) != empty {
            return Err(CalendarError::corrupted(
                "Linked list",
                &format!("head={} tail={} with {} events", self.head, self.tail, self.len),
            ));
        }
        if self.nodes.len() != self.len {
            return Err(CalendarError::corrupted(
                "Linked list",
                &format!("{} live nodes but count is {}", self.nodes.len(), self.len),
            ));
        }

        let mut prev = NULL_SLOT;
        let mut prev_key = None;
        let mut cursor = self.head;
        let mut visited = 0usize;
        while cursor != NULL_SLOT {
            let node = self.nodes.get(cursor).ok_or_else(|| {
                CalendarError::corrupted("Linked list", &format!("link to dead slot {}", cursor))
            })?;
            if node.prev != prev {
                return Err(CalendarError::corrupted(
                    "Linked list",
                    &format!("slot {} points back to {} instead of {}", cursor, node.prev, prev),
                ));
            }
            if prev_key.is_some_and(|key| key > node.event.key()) {
                return Err(CalendarError::corrupted(
                    "Linked list",
                    &format!("clock {} follows {:?}", node.event.key(), prev_key),
                ));
            }
            visited += 1;
            if visited > self.len {
                return Err(CalendarError::corrupted(
                    "Linked list",
                    "forward chain does not terminate",
                ));
            }
            prev_key = Some(node.event.key());
            prev = cursor;
            cursor = node.next;
        }

        if prev != self.tail {
            return Err(CalendarError::corrupted(
                "Linked list",
                &format!("chain ends at {} but tail is {}", prev, self.tail),
            ));
        }
        if visited != self.len {
            return Err(CalendarError::corrupted(
                "Linked list",
                &format!("{} reachable nodes but count is {}", visited, self.len),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// COORDINATE TREE
// ============================================================================

/// Tallies gathered while walking a coordinate tree.
struct Walk {
    seen: Vec<Vec<bool>>,
    tables: Vec<usize>,
    buckets: usize,
    events: usize,
}

impl CoordinateTree {
    /// Check that every table and bucket is reachable exactly once, occupancy
    /// counts match, no empty table or bucket lingers, every event sits on its
    /// own coordinate path and buckets are sorted.
    pub fn check_invariants(&self) -> CalendarResult<()> {
        if !self.levels[0].contains(self.root) {
            return Err(CalendarError::corrupted("Coordinate tree", "root table is not live"));
        }

        let mut walk = Walk {
            seen: self
                .levels
                .iter()
                .map(|arena| vec![false; arena.reserved_slots() / arena.fanout()])
                .collect(),
            tables: vec![0; self.levels.len()],
            buckets: 0,
            events: 0,
        };
        let mut path = [0u32; MAX_DEPTH];
        self.check_table(0, self.root, &mut path, &mut walk)?;

        for (level, arena) in self.levels.iter().enumerate() {
            if walk.tables[level] != arena.len() {
                return Err(CalendarError::corrupted(
                    "Coordinate tree",
                    &format!(
                        "level {}: {} reachable tables, {} allocated",
                        level,
                        walk.tables[level],
                        arena.len()
                    ),
                ));
            }
        }
        if walk.buckets != self.buckets.len() {
            return Err(CalendarError::corrupted(
                "Coordinate tree",
                &format!("{} reachable buckets, {} allocated", walk.buckets, self.buckets.len()),
            ));
        }
        if walk.events != self.len {
            return Err(CalendarError::corrupted(
                "Coordinate tree",
                &format!("{} reachable events but count is {}", walk.events, self.len),
            ));
        }
        Ok(())
    }

    fn check_table(
        &self,
        level: usize,
        table: SlotId,
        path: &mut [u32; MAX_DEPTH],
        walk: &mut Walk,
    ) -> CalendarResult<()> {
        let arena = &self.levels[level];
        let seen = walk.seen[level].get_mut(table as usize).ok_or_else(|| {
            CalendarError::corrupted(
                "Coordinate tree",
                &format!("level {} table {} out of bounds", level, table),
            )
        })?;
        if *seen || !arena.contains(table) {
            return Err(CalendarError::corrupted(
                "Coordinate tree",
                &format!("level {} table {} reused or not live", level, table),
            ));
        }
        *seen = true;
        walk.tables[level] += 1;

        let children = arena.children(table);
        let occupied = children.iter().filter(|&&child| child != NULL_SLOT).count();
        if occupied != arena.occupied(table) as usize {
            return Err(CalendarError::corrupted(
                "Coordinate tree",
                &format!(
                    "level {} table {} counts {} children, holds {}",
                    level,
                    table,
                    arena.occupied(table),
                    occupied
                ),
            ));
        }
        if occupied == 0 && level > 0 {
            return Err(CalendarError::corrupted(
                "Coordinate tree",
                &format!("empty table {} left at level {}", table, level),
            ));
        }

        let leaf_level = self.levels.len() - 1;
        for (coord, &child) in children.iter().enumerate() {
            if child == NULL_SLOT {
                continue;
            }
            path[level] = coord as u32;
            if level < leaf_level {
                self.check_table(level + 1, child, path, walk)?;
            } else {
                self.check_bucket(child, &path[..=level], walk)?;
            }
        }
        Ok(())
    }

    fn check_bucket(&self, bucket_id: SlotId, path: &[u32], walk: &mut Walk) -> CalendarResult<()> {
        let bucket = self.buckets.get(bucket_id).ok_or_else(|| {
            CalendarError::corrupted(
                "Coordinate tree",
                &format!("link to dead bucket {}", bucket_id),
            )
        })?;
        if bucket.is_empty() {
            return Err(CalendarError::corrupted(
                "Coordinate tree",
                &format!("empty bucket {} at {:?}", bucket_id, path),
            ));
        }
        if bucket.windows(2).any(|pair| pair[0].key() > pair[1].key()) {
            return Err(CalendarError::corrupted(
                "Coordinate tree",
                &format!("bucket {} at {:?} is not sorted", bucket_id, path),
            ));
        }
        for event in bucket {
            let coords = self.decomposition.decompose(event.clock())?;
            if coords.as_slice() != path {
                return Err(CalendarError::corrupted(
                    "Coordinate tree",
                    &format!(
                        "clock {} stored under {:?}, belongs at {}",
                        event.clock(),
                        path,
                        coords
                    ),
                ));
            }
        }
        walk.buckets += 1;
        walk.events += bucket.len();
        Ok(())
    }

    /// Sizes of all buckets in coordinate order (for testing/debugging).
    pub fn bucket_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.buckets.len());
        self.collect_bucket_sizes(0, self.root, &mut sizes);
        sizes
    }

    fn collect_bucket_sizes(&self, level: usize, table: SlotId, sizes: &mut Vec<usize>) {
        let leaf_level = self.levels.len() - 1;
        for &child in self.levels[level].children(table) {
            if child == NULL_SLOT {
                continue;
            }
            if level < leaf_level {
                self.collect_bucket_sizes(level + 1, child, sizes);
            } else if let Some(bucket) = self.buckets.get(child) {
                sizes.push(bucket.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::Decomposition;
    use crate::event::Event;
    use crate::linked_list::ListNode;

    fn event(clock: i64) -> Event {
        Event::new(clock, 0, 1, 0).unwrap()
    }

    #[test]
    fn test_valid_tree_passes() {
        let mut tree = CoordinateTree::new(Decomposition::coarse(60).unwrap());
        for raw in [0, 30, 59, 60, 86_400, 31_539_999] {
            tree.insert(event(raw), true).unwrap();
        }
        tree.check_invariants().unwrap();
        assert_eq!(tree.bucket_sizes(), vec![3, 1, 1, 1]);
    }

    #[test]
    fn test_misplaced_event_is_detected() {
        let mut tree = CoordinateTree::new(Decomposition::coarse(60).unwrap());
        tree.insert(event(10), true).unwrap();
        tree.insert(event(70), true).unwrap();

        // Move clock 70 into the bucket for 0..60.
        let first = tree.buckets.iter().next().map(|(id, _)| id).unwrap();
        tree.buckets.get_mut(first).unwrap().push(event(70));
        tree.len += 1;
        assert!(matches!(
            tree.check_invariants(),
            Err(CalendarError::CorruptedStructure(_))
        ));
    }

    #[test]
    fn test_count_mismatch_is_detected() {
        let mut tree = CoordinateTree::new(Decomposition::calendar());
        tree.insert(event(10), true).unwrap();
        tree.len = 2;
        assert!(tree.check_invariants().is_err());
    }

    #[test]
    fn test_broken_back_link_is_detected() {
        let mut list = LinkedListCalendar::new();
        for raw in [1, 2, 3] {
            crate::calendar::Calendar::load(&mut list, event(raw));
        }
        list.check_invariants().unwrap();

        let tail = list.tail;
        let node: &mut ListNode = list.nodes.get_mut(tail).unwrap();
        node.prev = NULL_SLOT;
        assert!(matches!(
            list.check_invariants(),
            Err(CalendarError::CorruptedStructure(_))
        ));
    }

    #[test]
    fn test_empty_structures_pass() {
        LinkedListCalendar::new().check_invariants().unwrap();
        CoordinateTree::new(Decomposition::calendar())
            .check_invariants()
            .unwrap();
    }
}
