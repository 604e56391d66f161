use std::fmt;

use super::IndexError;

/// Handle to one entry of an [`ElementList`].
///
/// The stamp is unique per insertion, so a handle kept past its removal
/// never resolves to a later entry that reused the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    slot: u32,
    stamp: u64,
}

#[derive(Debug)]
struct Entry<T> {
    value: Option<T>,
    stamp: u64,
    prev: Option<u32>,
    next: Option<u32>,
}

/// Insertion-ordered list with O(1) removal through [`EntryHandle`]s.
pub struct ElementList<T> {
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
    next_stamp: u64,
}

impl<T> Default for ElementList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ElementList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> ElementList<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            next_stamp: 0,
        }
    }

    /// Appends `value` and returns the handle that removes it.
    pub fn push(&mut self, value: T) -> EntryHandle {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.push_stamped(value, stamp)
    }

    /// Appends under a caller-chosen stamp; callers keep stamps unique.
    pub(crate) fn push_stamped(&mut self, value: T, stamp: u64) -> EntryHandle {
        let entry = Entry {
            value: Some(value),
            stamp,
            prev: self.tail,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.entries[slot as usize] = entry;
                slot
            }
            None => {
                self.entries.push(entry);
                (self.entries.len() - 1) as u32
            }
        };
        match self.tail {
            Some(tail) => self.entries[tail as usize].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
        EntryHandle { slot, stamp }
    }

    pub fn remove(&mut self, handle: EntryHandle) -> Result<T, IndexError> {
        let entry = self
            .entries
            .get_mut(handle.slot as usize)
            .filter(|entry| entry.stamp == handle.stamp)
            .ok_or(IndexError::StaleHandle)?;
        let value = entry.value.take().ok_or(IndexError::StaleHandle)?;
        let (prev, next) = (entry.prev.take(), entry.next.take());

        match prev {
            Some(prev) => self.entries[prev as usize].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.entries[next as usize].prev = prev,
            None => self.tail = prev,
        }
        self.free.push(handle.slot);
        self.len -= 1;
        Ok(value)
    }

    pub fn get(&self, handle: EntryHandle) -> Option<&T> {
        self.entries
            .get(handle.slot as usize)
            .filter(|entry| entry.stamp == handle.stamp)
            .and_then(|entry| entry.value.as_ref())
    }

    /// Values in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct Iter<'a, T> {
    list: &'a ElementList<T>,
    cursor: Option<u32>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let entry = &self.list.entries[self.cursor? as usize];
        self.cursor = entry.next;
        entry.value.as_ref()
    }
}
