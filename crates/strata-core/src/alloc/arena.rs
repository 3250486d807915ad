use crate::profiling::profile_function;
use std::num::NonZeroU64;

/// Generational index into an [`Arena`].
///
/// Upper 32 bits hold the generation, lower 32 bits hold `index + 1` so the
/// value is never zero and `Option<Handle>` stays 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(NonZeroU64);

impl Handle {
    pub fn new(generation: u32, idx: u32) -> Self {
        let raw = ((generation as u64) << 32) | (idx as u64 + 1);
        // idx + 1 is at least 1 and fits the low word for any idx < u32::MAX
        match NonZeroU64::new(raw) {
            Some(v) => Self(v),
            None => unreachable!("handle index overflow"),
        }
    }

    pub fn generation(&self) -> u32 {
        (self.0.get() >> 32) as u32
    }

    pub fn index(&self) -> u32 {
        (self.0.get() & u32::MAX as u64) as u32 - 1
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot arena with a free list.
///
/// Removed slots are recycled with a bumped generation so stale handles are
/// detected: [`Arena::get`] panics on them, [`Arena::try_get`] returns `None`.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> Handle {
        self.insert_with(|_| value)
    }

    /// Insert a value built from its own handle, for self-referencing records.
    pub fn insert_with(&mut self, f: impl FnOnce(Handle) -> T) -> Handle {
        profile_function!();
        self.len += 1;
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            let handle = Handle::new(slot.generation, idx);
            slot.value = Some(f(handle));
            handle
        } else {
            let idx = self.slots.len() as u32;
            let handle = Handle::new(0, idx);
            self.slots.push(Slot {
                generation: 0,
                value: Some(f(handle)),
            });
            handle
        }
    }

    fn slot(&self, handle: Handle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
    }

    pub fn try_get(&self, handle: Handle) -> Option<&T> {
        self.slot(handle).and_then(|slot| slot.value.as_ref())
    }

    pub fn try_get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn get(&self, handle: Handle) -> &T {
        match self.try_get(handle) {
            Some(value) => value,
            None => panic!("invalid generation, use after free! ({:?})", handle),
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> &mut T {
        match self.try_get_mut(handle) {
            Some(value) => value,
            None => panic!("invalid generation, use after free! ({:?})", handle),
        }
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.try_get(handle).is_some()
    }

    /// Remove the value and recycle its slot.
    pub fn remove(&mut self, handle: Handle) -> T {
        profile_function!();
        let index = handle.index();
        let slot = match self.slots.get_mut(index as usize) {
            Some(slot) if slot.generation == handle.generation() && slot.value.is_some() => slot,
            _ => panic!("invalid generation, use after free! ({:?})", handle),
        };
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        match value {
            Some(value) => value,
            None => unreachable!(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every value. Outstanding handles become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(idx as u32);
        }
        self.len = 0;
    }

    /// Live values with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::new(slot.generation, idx as u32), value))
        })
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::ops::Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &T {
        self.get(handle)
    }
}

impl<T> std::ops::IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut T {
        self.get_mut(handle)
    }
}

static_assertions::assert_eq_size!(Handle, Option<Handle>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_insert() {
        let mut arena = Arena::<u8>::new();
        let h = arena.insert(15);
        assert_eq!(h.generation(), 0);
        assert_eq!(h.index(), 0);
        assert_eq!(arena[h], 15);
    }

    #[test]
    fn test_arena_insert_with_sees_own_handle() {
        let mut arena = Arena::<Handle>::new();
        let h = arena.insert_with(|me| me);
        assert_eq!(arena[h], h);
        arena.remove(h);
        let h2 = arena.insert_with(|me| me);
        assert_eq!(arena[h2], h2);
        assert_ne!(h, h2);
    }

    #[test]
    #[should_panic]
    fn test_arena_uaf() {
        let mut arena = Arena::<u8>::new();
        let _ = arena.insert(15);
        let stale = Handle::new(1, 0);
        let _ = arena.get(stale);
    }

    #[test]
    fn test_arena_remove_recycles() {
        let mut arena = Arena::<u8>::new();
        let h = arena.insert(15);
        assert_eq!(arena.remove(h), 15);
        let h2 = arena.insert(45);
        assert_eq!(h.index(), h2.index());
        assert_ne!(h.generation(), h2.generation());
        assert!(!arena.contains(h));
    }

    #[test]
    fn test_arena_iter_skips_vacant() {
        let mut arena = Arena::<u8>::new();
        let handles: Vec<_> = (0..10).map(|i| arena.insert(i)).collect();
        arena.remove(handles[0]);
        arena.remove(handles[5]);
        let values: Vec<u8> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 6, 7, 8, 9]);
        assert_eq!(arena.len(), 8);
    }
}
