//! Fixed-capacity reuse container.
//!
//! Every instance is built up front; `acquire` only flips a flag, it never
//! allocates. Instances are never dropped while the pool lives.

use serde::{Deserialize, Serialize};


/// Index of an instance inside its pool. Stays valid for the pool lifetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub usize);

/// Hooks run by the pool when an instance changes hands.
pub trait Poolable {
    fn on_acquire(&mut self) {}

    /// Must leave the instance inert: no pending timers, no behaviour.
    fn on_release(&mut self) {}
}

struct PoolSlot<T> {
    item: T,
    active: bool,
}

pub struct ObjectPool<T> {
    slots: Vec<PoolSlot<T>>,
    active_count: usize,
}

impl<T: Poolable> ObjectPool<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            slots: items.into_iter().map(|item| PoolSlot { item, active: false }).collect(),
            active_count: 0,
        }
    }

    /// Builds `capacity` inactive instances, `factory` receives the slot index.
    pub fn from_factory(capacity: usize, factory: impl FnMut(usize) -> T) -> Self {
        Self::from_items((0..capacity).map(factory).collect())
    }

    /// First inactive instance, marked active. `None` when exhausted.
    pub fn acquire(&mut self) -> Option<PoolId> {
        self.acquire_by(|_| true)
    }

    /// First inactive instance accepted by `predicate`, marked active.
    pub fn acquire_by(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Option<PoolId> {
        let index = self.slots.iter().position(|slot| !slot.active && predicate(&slot.item))?;
        let slot = &mut self.slots[index];
        slot.active = true;
        slot.item.on_acquire();
        self.active_count += 1;
        Some(PoolId(index))
    }

    /// Returns the instance to the available set. Releasing an inactive or
    /// unknown id does nothing and returns `false`.
    pub fn release(&mut self, id: PoolId) -> bool {
        match self.slots.get_mut(id.0) {
            Some(slot) if slot.active => {
                slot.active = false;
                slot.item.on_release();
                self.active_count -= 1;
                true
            }
            _ => false,
        }
    }
}

impl<T> ObjectPool<T> {
    pub fn get(&self, id: PoolId) -> Option<&T> {
        self.slots.get(id.0).map(|slot| &slot.item)
    }

    pub fn get_mut(&mut self, id: PoolId) -> Option<&mut T> {
        self.slots.get_mut(id.0).map(|slot| &mut slot.item)
    }

    pub fn is_active(&self, id: PoolId) -> bool {
        self.slots.get(id.0).is_some_and(|slot| slot.active)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn inactive_count(&self) -> usize {
        self.slots.len() - self.active_count
    }

    /// Every instance, active or not.
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &T)> {
        self.slots.iter().enumerate().map(|(index, slot)| (PoolId(index), &slot.item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PoolId, &mut T)> {
        self.slots.iter_mut().enumerate().map(|(index, slot)| (PoolId(index), &mut slot.item))
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (PoolId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (PoolId(index), &slot.item))
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolId, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (PoolId(index), &mut slot.item))
    }
}
