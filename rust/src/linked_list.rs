//! Clock-ordered doubly linked list calendar.
//!
//! Nodes live in a [`CompactArena`] and link to each other by slot id. The
//! forward chain `head -> next -> ... -> tail` is the ownership path: a node is
//! live exactly while it is reachable from `head`. `prev` is a back reference
//! used to walk from the tail and to relink around a removed node; it never
//! keeps a node alive on its own.
//!
//! Every operation is a linear walk. `load` walks back from the tail, which is
//! constant time for the ascending streams the workload generator produces.
//! `insert`, `find` and `delete` start from whichever end is closer to the
//! clock, judged against the midpoint of the head and tail clocks.

use tracing::debug;

use crate::calendar::Calendar;
use crate::compact_arena::CompactArena;
use crate::error::{CalendarError, CalendarResult};
use crate::event::Event;
use crate::types::{Clock, SlotId, NULL_SLOT};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ListNode {
    pub(crate) event: Event,
    pub(crate) prev: SlotId,
    pub(crate) next: SlotId,
}

#[derive(Debug, Clone)]
pub struct LinkedListCalendar {
    pub(crate) nodes: CompactArena<ListNode>,
    pub(crate) head: SlotId,
    pub(crate) tail: SlotId,
    pub(crate) len: usize,
}

impl Default for LinkedListCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkedListCalendar {
    pub fn new() -> Self {
        Self {
            nodes: CompactArena::new(),
            head: NULL_SLOT,
            tail: NULL_SLOT,
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: CompactArena::with_capacity(capacity),
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<&Event> {
        self.nodes.get(self.head).map(|node| &node.event)
    }

    pub fn last(&self) -> Option<&Event> {
        self.nodes.get(self.tail).map(|node| &node.event)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.len,
        }
    }

    // ============================================================================
    // WALKS
    // ============================================================================

    /// Whether a walk for `key` should start at the head.
    fn closer_to_head(&self, key: u32) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => {
                let (lo, hi) = (u64::from(first.key()), u64::from(last.key()));
                2 * u64::from(key) <= lo + hi
            }
            _ => true,
        }
    }

    /// Neighbours `(prev, next)` between which an event with `key` belongs,
    /// after any events with the same key. Walks from the tail.
    fn position_from_tail(&self, key: u32) -> (SlotId, SlotId) {
        let mut next = NULL_SLOT;
        let mut cursor = self.tail;
        while let Some(node) = self.nodes.get(cursor) {
            if node.event.key() <= key {
                break;
            }
            next = cursor;
            cursor = node.prev;
        }
        (cursor, next)
    }

    /// Same position as [`Self::position_from_tail`], walking from the head.
    fn position_from_head(&self, key: u32) -> (SlotId, SlotId) {
        let mut prev = NULL_SLOT;
        let mut cursor = self.head;
        while let Some(node) = self.nodes.get(cursor) {
            if node.event.key() > key {
                break;
            }
            prev = cursor;
            cursor = node.next;
        }
        (prev, cursor)
    }

    fn position(&self, key: u32) -> (SlotId, SlotId) {
        if self.closer_to_head(key) {
            self.position_from_head(key)
        } else {
            self.position_from_tail(key)
        }
    }

    /// Slot of the first node (in list order) holding `key`.
    fn locate(&self, key: u32) -> SlotId {
        if self.closer_to_head(key) {
            let mut cursor = self.head;
            while let Some(node) = self.nodes.get(cursor) {
                if node.event.key() >= key {
                    return if node.event.key() == key { cursor } else { NULL_SLOT };
                }
                cursor = node.next;
            }
            NULL_SLOT
        } else {
            // Last node with key <= target, then back over any equal keys.
            let (mut cursor, _) = self.position_from_tail(key);
            if self.nodes.get(cursor).map_or(true, |node| node.event.key() != key) {
                return NULL_SLOT;
            }
            while let Some(node) = self.nodes.get(cursor) {
                match self.nodes.get(node.prev) {
                    Some(prev) if prev.event.key() == key => cursor = node.prev,
                    _ => break,
                }
            }
            cursor
        }
    }

    // ============================================================================
    // MUTATION
    // ============================================================================

    /// Splice a new node between two adjacent slots (either may be NULL_SLOT).
    fn link(&mut self, prev: SlotId, next: SlotId, event: Event) {
        let id = self.nodes.allocate(ListNode { event, prev, next });
        match self.nodes.get_mut(prev) {
            Some(node) => node.next = id,
            None => self.head = id,
        }
        match self.nodes.get_mut(next) {
            Some(node) => node.prev = id,
            None => self.tail = id,
        }
        self.len += 1;
    }

    /// Detach a live node, relinking its neighbours around it.
    fn unlink(&mut self, id: SlotId) -> Option<Event> {
        let ListNode { event, prev, next } = self.nodes.release(id)?;
        match self.nodes.get_mut(prev) {
            Some(node) => node.next = next,
            None => self.head = next,
        }
        match self.nodes.get_mut(next) {
            Some(node) => node.prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
        Some(event)
    }

    /// Remove and return the event at `clock`.
    pub fn remove(&mut self, clock: Clock) -> Option<Event> {
        let id = self.locate(clock.get());
        self.unlink(id)
    }

    pub fn get(&self, clock: Clock) -> Option<&Event> {
        self.nodes.get(self.locate(clock.get())).map(|node| &node.event)
    }
}

impl Calendar for LinkedListCalendar {
    fn name(&self) -> &'static str {
        "Linked List Calendar"
    }

    fn load(&mut self, event: Event) {
        let (prev, next) = self.position_from_tail(event.key());
        self.link(prev, next, event);
    }

    fn insert(&mut self, event: Event) -> CalendarResult<()> {
        let key = event.key();
        let (prev, next) = self.position(key);
        if self.nodes.get(prev).is_some_and(|node| node.event.key() == key) {
            debug!(clock = key, "insert rejected: clock already present");
            return Err(CalendarError::DuplicateKey(key));
        }
        self.link(prev, next, event);
        Ok(())
    }

    fn find(&self, clock: i64) -> CalendarResult<Option<Event>> {
        let clock = Clock::new(clock)?;
        Ok(self.get(clock).copied())
    }

    fn delete(&mut self, clock: i64) -> CalendarResult<bool> {
        let clock = Clock::new(clock)?;
        Ok(self.remove(clock).is_some())
    }

    fn total_events(&self) -> usize {
        self.len
    }

    fn events(&self) -> Box<dyn Iterator<Item = &Event> + '_> {
        Box::new(self.iter())
    }

    fn validate(&self) -> CalendarResult<()> {
        self.check_invariants()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.head = NULL_SLOT;
        self.tail = NULL_SLOT;
        self.len = 0;
    }
}

/// Forward traversal from the head.
pub struct Iter<'a> {
    nodes: &'a CompactArena<ListNode>,
    cursor: SlotId,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cursor)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
