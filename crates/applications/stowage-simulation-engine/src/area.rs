//! Capacity-bounded FIFO storage areas

use std::collections::VecDeque;

use stowage_core::{AreaId, Item};

/// One storage location: a fixed capacity and a FIFO queue of items
#[derive(Debug, Clone)]
pub struct StorageArea {
    id: AreaId,
    capacity: usize,
    items: VecDeque<Item>,
}

impl StorageArea {
    /// Create an empty area
    pub fn new(id: AreaId, capacity: usize) -> Self {
        StorageArea {
            id,
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    pub fn id(&self) -> AreaId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently held
    pub fn occupancy(&self) -> usize {
        self.items.len()
    }

    pub fn free_capacity(&self) -> usize {
        self.capacity - self.items.len()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item at the back of the queue.
    /// Returns the item unchanged if the area is full.
    pub fn store(&mut self, item: Item) -> Result<(), Item> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push_back(item);
        Ok(())
    }

    /// Remove the oldest item
    pub fn release(&mut self) -> Option<Item> {
        self.items.pop_front()
    }

    /// Next item `release` would return
    pub fn oldest(&self) -> Option<&Item> {
        self.items.front()
    }

    /// Held items, oldest first
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }
}
