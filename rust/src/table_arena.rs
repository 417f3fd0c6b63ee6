//! Flat arena of fixed-fanout coordinate tables.
//!
//! One arena per level of a coordinate tree. A table is `fanout` consecutive
//! child slots inside a single `Vec<SlotId>`, so table `t` coordinate `c` lives
//! at `t * fanout + c`. Empty children hold [`NULL_SLOT`]. Each table keeps a
//! count of its non-null children so an emptied table can be reclaimed without
//! scanning it.

use crate::types::{SlotId, NULL_SLOT};

#[derive(Debug, Clone)]
pub struct TableArena {
    fanout: usize,
    slots: Vec<SlotId>,
    occupied: Vec<u32>,
    in_use: Vec<bool>,
    free_tables: Vec<SlotId>,
    live_tables: usize,
}

impl TableArena {
    pub fn new(fanout: usize) -> Self {
        assert!(fanout > 0, "table fanout must be positive");
        Self {
            fanout,
            slots: Vec::new(),
            occupied: Vec::new(),
            in_use: Vec::new(),
            free_tables: Vec::new(),
            live_tables: 0,
        }
    }

    #[inline]
    pub fn fanout(&self) -> usize {
        self.fanout
    }

    /// Allocate a table with every child slot empty.
    pub fn allocate(&mut self) -> SlotId {
        self.live_tables += 1;
        if let Some(table) = self.free_tables.pop() {
            let index = table as usize;
            self.in_use[index] = true;
            debug_assert_eq!(self.occupied[index], 0);
            return table;
        }

        let table = self.in_use.len();
        self.slots.resize(self.slots.len() + self.fanout, NULL_SLOT);
        self.occupied.push(0);
        self.in_use.push(true);
        debug_assert!(table < NULL_SLOT as usize);
        table as SlotId
    }

    /// Return an empty table to the free list. Returns false if the table is
    /// not live or still has children.
    pub fn release(&mut self, table: SlotId) -> bool {
        let index = table as usize;
        if !self.contains(table) || self.occupied[index] != 0 {
            return false;
        }
        self.in_use[index] = false;
        self.free_tables.push(table);
        self.live_tables -= 1;
        true
    }

    pub fn contains(&self, table: SlotId) -> bool {
        table != NULL_SLOT && self.in_use.get(table as usize).copied().unwrap_or(false)
    }

    /// Child slot at `coord`, or `NULL_SLOT` if the table or child is absent.
    #[inline]
    pub fn child(&self, table: SlotId, coord: usize) -> SlotId {
        if table == NULL_SLOT || coord >= self.fanout {
            return NULL_SLOT;
        }
        self.slots
            .get(table as usize * self.fanout + coord)
            .copied()
            .unwrap_or(NULL_SLOT)
    }

    /// Overwrite a child slot, keeping the table's occupancy count in step.
    #[inline]
    pub fn set_child(&mut self, table: SlotId, coord: usize, child: SlotId) {
        debug_assert!(self.contains(table));
        debug_assert!(coord < self.fanout);
        let index = table as usize;
        let slot = &mut self.slots[index * self.fanout + coord];
        match (*slot == NULL_SLOT, child == NULL_SLOT) {
            (true, false) => self.occupied[index] += 1,
            (false, true) => self.occupied[index] -= 1,
            _ => {}
        }
        *slot = child;
    }

    /// Number of non-empty children of a table.
    #[inline]
    pub fn occupied(&self, table: SlotId) -> u32 {
        self.occupied.get(table as usize).copied().unwrap_or(0)
    }

    /// All child slots of a table in coordinate order.
    pub fn children(&self, table: SlotId) -> &[SlotId] {
        if !self.contains(table) {
            return &[];
        }
        let start = table as usize * self.fanout;
        &self.slots[start..start + self.fanout]
    }

    /// Live tables.
    pub fn len(&self) -> usize {
        self.live_tables
    }

    pub fn is_empty(&self) -> bool {
        self.live_tables == 0
    }

    /// Child slots reserved, including those of freed tables.
    pub fn reserved_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.occupied.clear();
        self.in_use.clear();
        self.free_tables.clear();
        self.live_tables = 0;
    }
}
