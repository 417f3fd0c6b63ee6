//! Compact slot arena using Vec<T> instead of Vec<Option<T>>.
//!
//! Holds the linked list's nodes and the array indexes' leaf buckets. Slots are
//! addressed by [`SlotId`]; freed slots go on a free list and are reused before
//! the storage grows.

use std::convert::TryFrom;

use crate::types::{SlotId, NULL_SLOT};

/// Statistics for a compact arena
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompactArenaStats {
    pub total_slots: usize,
    pub allocated_count: usize,
    pub free_count: usize,
    pub fragmentation: f64,
}

/// Slot arena with a separate free list and allocation mask.
#[derive(Debug, Clone)]
pub struct CompactArena<T> {
    /// Direct storage without Option wrapper
    storage: Vec<T>,
    /// Free slot indices for reuse
    free_list: Vec<usize>,
    /// Which slots currently hold a live value
    allocated_mask: Vec<bool>,
    allocated: usize,
}

impl<T> CompactArena<T> {
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            free_list: Vec::new(),
            allocated_mask: Vec::new(),
            allocated: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            allocated_mask: Vec::with_capacity(capacity),
            allocated: 0,
        }
    }

    /// Store an item and return its slot id, reusing a freed slot if one exists.
    #[inline]
    pub fn allocate(&mut self, item: T) -> SlotId {
        let index = if let Some(free_index) = self.free_list.pop() {
            self.storage[free_index] = item;
            self.allocated_mask[free_index] = true;
            free_index
        } else {
            let index = self.storage.len();
            self.storage.push(item);
            self.allocated_mask.push(true);
            index
        };
        self.allocated += 1;

        // The clock domain bounds every arena far below u32::MAX slots.
        debug_assert!(index < NULL_SLOT as usize);
        index as SlotId
    }

    /// Map an id to its storage index if the slot is live.
    #[inline]
    fn live_index(&self, id: SlotId) -> Option<usize> {
        if id == NULL_SLOT {
            return None;
        }
        let index = usize::try_from(id).ok()?;
        if self.allocated_mask.get(index).copied().unwrap_or(false) {
            Some(index)
        } else {
            None
        }
    }

    fn mark_free(&mut self, index: usize) {
        self.allocated_mask[index] = false;
        self.free_list.push(index);
        self.allocated -= 1;
    }

    /// Free a slot, handing back a copy of its value. The stale value stays in
    /// storage until the slot is reused.
    #[inline]
    pub fn release(&mut self, id: SlotId) -> Option<T>
    where
        T: Clone,
    {
        let index = self.live_index(id)?;
        self.mark_free(index);
        Some(self.storage[index].clone())
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.live_index(id).map(|index| &self.storage[index])
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.live_index(id).map(move |index| &mut self.storage[index])
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.live_index(id).is_some()
    }

    /// Live slots in slot-id order (not insertion order).
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> + '_ {
        self.storage
            .iter()
            .zip(self.allocated_mask.iter())
            .enumerate()
            .filter(|(_, (_, &allocated))| allocated)
            .map(|(index, (item, _))| (index as SlotId, item))
    }

    pub fn stats(&self) -> CompactArenaStats {
        let free_count = self.free_list.len();
        let fragmentation = if self.storage.is_empty() {
            0.0
        } else {
            free_count as f64 / self.storage.len() as f64
        };

        CompactArenaStats {
            total_slots: self.storage.len(),
            allocated_count: self.allocated,
            free_count,
            fragmentation,
        }
    }

    /// Number of live slots
    pub fn len(&self) -> usize {
        self.allocated
    }

    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    pub fn clear(&mut self) {
        self.storage.clear();
        self.allocated_mask.clear();
        self.free_list.clear();
        self.allocated = 0;
    }
}

impl<T> Default for CompactArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> CompactArena<T> {
    /// Free a slot and move its value out, leaving a default in storage.
    pub fn deallocate(&mut self, id: SlotId) -> Option<T> {
        let index = self.live_index(id)?;
        self.mark_free(index);
        Some(std::mem::take(&mut self.storage[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_arena_basic_operations() {
        let mut arena = CompactArena::new();

        let id1 = arena.allocate(42);
        let id2 = arena.allocate(84);
        let id3 = arena.allocate(126);

        assert_eq!(arena.get(id1), Some(&42));
        assert_eq!(arena.get(id2), Some(&84));
        assert_eq!(arena.get(id3), Some(&126));
        assert!(!arena.contains(NULL_SLOT));
        assert_eq!(arena.get(NULL_SLOT), None);

        let stats = arena.stats();
        assert_eq!(stats.allocated_count, 3);
        assert_eq!(stats.free_count, 0);
    }

    #[test]
    fn test_deallocate_reuses_slot() {
        let mut arena: CompactArena<Vec<u32>> = CompactArena::new();

        let id1 = arena.allocate(vec![1, 2]);
        let id2 = arena.allocate(vec![3]);

        assert_eq!(arena.deallocate(id1), Some(vec![1, 2]));
        assert!(!arena.contains(id1));
        assert_eq!(arena.deallocate(id1), None);
        assert!(arena.contains(id2));

        let id3 = arena.allocate(vec![4]);
        assert_eq!(id3, id1);
        assert_eq!(arena.get(id3), Some(&vec![4]));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.stats().free_count, 0);
    }

    #[test]
    fn test_release_and_iter() {
        let mut arena = CompactArena::with_capacity(4);
        let a = arena.allocate('a');
        let b = arena.allocate('b');
        let c = arena.allocate('c');

        assert_eq!(arena.release(b), Some('b'));
        assert_eq!(arena.release(b), None);

        let live: Vec<_> = arena.iter().collect();
        assert_eq!(live, vec![(a, &'a'), (c, &'c')]);

        let stats = arena.stats();
        assert_eq!(stats.total_slots, 3);
        assert_eq!(stats.free_count, 1);
        assert!((stats.fragmentation - 1.0 / 3.0).abs() < 1e-9);

        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.iter().count(), 0);
    }
}
