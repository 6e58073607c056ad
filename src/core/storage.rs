use std::fmt::Debug;
use std::marker::PhantomData;
use crate::core::{BodyHandle, TargetHandle};
use crate::error::PhysicsError;
use crate::Result;

/// Generic storage trait for physics objects
pub trait Storage<T, H> {
    /// Adds an item to the storage and returns its handle
    fn add(&mut self, item: T) -> H;

    /// Gets a reference to an item by its handle
    fn get(&self, handle: H) -> Option<&T>;

    /// Gets a mutable reference to an item by its handle
    fn get_mut(&mut self, handle: H) -> Option<&mut T>;

    /// Removes an item from the storage
    fn remove(&mut self, handle: H) -> Option<T>;

    /// Returns the number of items in the storage
    fn len(&self) -> usize;

    /// Returns whether the storage is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all items from the storage
    fn clear(&mut self);
}

/// Handle types that address a slot by index and generation
pub trait SlotHandle: Copy + Debug {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(&self) -> usize;
    fn generation(&self) -> u32;
}

impl SlotHandle for BodyHandle {
    fn from_parts(index: u32, generation: u32) -> Self {
        BodyHandle { index, generation }
    }

    fn index(&self) -> usize {
        self.index as usize
    }

    fn generation(&self) -> u32 {
        self.generation
    }
}

impl SlotHandle for TargetHandle {
    fn from_parts(index: u32, generation: u32) -> Self {
        TargetHandle { index, generation }
    }

    fn index(&self) -> usize {
        self.index as usize
    }

    fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    item: Option<T>,
}

/// Arena with stable, generation-checked handles. A removed slot is reused
/// with a bumped generation, so stale handles never alias a new item.
#[derive(Debug, Clone)]
pub struct SlotStorage<T, H> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _handle: PhantomData<H>,
}

/// Storage for rigid bodies
pub type BodyStorage<T> = SlotStorage<T, BodyHandle>;

/// Storage for target transform nodes
pub type TargetStorage<T> = SlotStorage<T, TargetHandle>;

impl<T, H: SlotHandle> Default for SlotStorage<T, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H: SlotHandle> SlotStorage<T, H> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _handle: PhantomData,
        }
    }

    /// Returns whether the handle still refers to a live item
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Iterates over live items in slot order
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.item
                .as_ref()
                .map(|item| (H::from_parts(index as u32, slot.generation), item))
        })
    }

    /// Iterates mutably over live items in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.item
                .as_mut()
                .map(|item| (H::from_parts(index as u32, generation), item))
        })
    }

    /// Returns the handles of all live items in slot order
    pub fn handles(&self) -> Vec<H> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Gets an item by its handle, returning an error if it is gone
    pub fn try_get(&self, handle: H) -> Result<&T> {
        self.get(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("No live item for handle {:?}", handle)))
    }

    /// Gets a mutable item by its handle, returning an error if it is gone
    pub fn try_get_mut(&mut self, handle: H) -> Result<&mut T> {
        self.get_mut(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("No live item for handle {:?}", handle)))
    }
}

impl<T, H: SlotHandle> Storage<T, H> for SlotStorage<T, H> {
    fn add(&mut self, item: T) -> H {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.item = Some(item);
            return H::from_parts(index, slot.generation);
        }

        self.slots.push(Slot { generation: 0, item: Some(item) });
        H::from_parts((self.slots.len() - 1) as u32, 0)
    }

    fn get(&self, handle: H) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.item.as_ref())
    }

    fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.item.as_mut())
    }

    fn remove(&mut self, handle: H) -> Option<T> {
        let slot = self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())?;
        let item = slot.item.take()?;

        self.free.push(handle.index() as u32);
        self.len -= 1;
        Some(item)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.item.take().is_some() {
                self.free.push(index as u32);
            }
        }
        self.len = 0;
    }
}
