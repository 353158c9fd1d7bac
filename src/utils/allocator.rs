use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-chosen body identifier. Small integers keep the arena dense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl BodyId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for BodyId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Arena keyed directly by [`BodyId`].
///
/// Slots are addressed by the id's integer value, so iteration always visits
/// bodies in ascending id order regardless of insertion order. Removing a body
/// drops its value in place; nothing is freed by hand.
#[derive(Debug, Clone)]
pub struct BodyArena<T> {
    items: Vec<Option<T>>,
    len: usize,
}

impl<T> Default for BodyArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BodyArena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            len: 0,
        }
    }

    /// Stores `item` under `id`, returning the value it replaced.
    ///
    /// Grows the slot vector to `id + 1`, so callers cap ids first
    /// (the registry rejects ids above `MAX_BODY_ID`).
    pub fn insert(&mut self, id: BodyId, item: T) -> Option<T> {
        let index = id.index();
        if index >= self.items.len() {
            self.items.resize_with(index + 1, || None);
        }
        let previous = self.items[index].replace(item);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    pub fn get(&self, id: BodyId) -> Option<&T> {
        self.items.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut T> {
        self.items.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: BodyId) -> Option<T> {
        let removed = self.items.get_mut(id.index()).and_then(|slot| slot.take());
        if removed.is_some() {
            self.len -= 1;
            while matches!(self.items.last(), Some(None)) {
                self.items.pop();
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.len = 0;
    }

    pub fn iter(&self) -> ArenaIter<'_, T> {
        ArenaIter {
            inner: self.items.iter().enumerate(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct ArenaIter<'a, T> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Option<T>>>,
}

impl<'a, T> Iterator for ArenaIter<'a, T> {
    type Item = (BodyId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, slot) in self.inner.by_ref() {
            if let Some(item) = slot.as_ref() {
                return Some((BodyId(index as u32), item));
            }
        }
        None
    }
}
