use alloc::vec::Vec;

use super::handle::Handle;

/// A slot is either a live element or a link in the free list.
#[derive(Clone)]
enum Slot<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// Slot storage for tree nodes.
///
/// Vacated slots are threaded into an intrusive free list and handed out again
/// before the backing `Vec` grows.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<Handle>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of occupied slots.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        let handle = if let Some(handle) = self.free_head {
            let slot = &mut self.slots[handle.to_index()];
            let Slot::Vacant(next) = *slot else {
                panic!("`Arena::alloc()` - free list points at an occupied slot!");
            };
            self.free_head = next;
            *slot = Slot::Occupied(element);
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX + 1
            );
            self.slots.push(Slot::Occupied(element));
            Handle::from_index(self.slots.len() - 1)
        };
        self.len += 1;
        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.to_index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant(_) => panic!("`Arena::get()` - `handle` is invalid!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.to_index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant(_) => panic!("`Arena::get_mut()` - `handle` is invalid!"),
        }
    }

    /// Removes the element and pushes its slot onto the free list.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = core::mem::replace(&mut self.slots[handle.to_index()], Slot::Vacant(self.free_head));
        match slot {
            Slot::Occupied(element) => {
                self.free_head = Some(handle);
                self.len -= 1;
                element
            }
            Slot::Vacant(next) => {
                self.slots[handle.to_index()] = Slot::Vacant(next);
                panic!("`Arena::take()` - `handle` is invalid!");
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}
