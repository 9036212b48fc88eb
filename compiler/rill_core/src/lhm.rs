//! Insertion-ordered hash map over an open-addressed slot table.
//!
//! Lookup goes through a power-of-two slot array probed linearly from the
//! key's ideal index. Entries live in a separate vector in insertion order,
//! so iteration order is first-insertion order no matter how the slots are
//! laid out.
//!
//! Removal turns the key's slot into a tombstone and leaves a hole in the
//! entry vector. Tombstones still count toward the load factor; the next
//! rebuild re-inserts the live entries in order and drops both the
//! tombstones and the holes. A rebuild only grows the table when live
//! entries dominate the load.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use thiserror::Error;

use crate::internal::internal_coding_error;

/// Slot count of the first table, allocated on first insert.
pub const INITIAL_ARRAY_LENGTH: usize = 16;

/// Occupied plus tombstoned slots, as a fraction of the table, that triggers
/// a rebuild. Expressed as `LOAD_NUMERATOR / LOAD_DENOMINATOR` (0.7).
const LOAD_NUMERATOR: usize = 7;
const LOAD_DENOMINATOR: usize = 10;

/// Table growth multiplier when a rebuild grows the table.
pub const ENLARGEMENT_FACTOR: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Slot {
    Empty,
    /// Index into the entry vector.
    Occupied(usize),
    /// Tombstone left by a removal; probing continues past it.
    Deleted,
}

#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    ideal_index: usize,
}

enum Probe {
    Found { slot: usize, entry: usize },
    Vacant { slot: usize, ideal_index: usize },
}

/// Bookkeeping disagreement reported by [`Lhm::check_counts`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("slot counts disagree: occupied {counted_occupied} (tracked {tracked_occupied}), deleted {counted_deleted} (tracked {tracked_deleted})")]
pub struct CountMismatch {
    pub counted_occupied: usize,
    pub tracked_occupied: usize,
    pub counted_deleted: usize,
    pub tracked_deleted: usize,
}

/// Linked hash map: unique keys, insertion-ordered iteration.
///
/// Re-putting an existing key replaces its value in place without moving
/// it. Cloning is a deep copy.
#[derive(Clone)]
pub struct Lhm<K, V> {
    slots: Vec<Slot>,
    /// Insertion-ordered; `None` is a hole left by a removal.
    entries: Vec<Option<Entry<K, V>>>,
    num_occupied: usize,
    num_freed: usize,
}

impl<K, V> Lhm<K, V> {
    /// An empty map. No table is allocated until the first insert.
    pub const fn new() -> Self {
        Lhm {
            slots: Vec::new(),
            entries: Vec::new(),
            num_occupied: 0,
            num_freed: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.num_occupied
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_occupied == 0
    }

    /// Current slot-table length (0 before the first insert).
    #[inline]
    pub fn array_length(&self) -> usize {
        self.slots.len()
    }

    /// Number of tombstoned slots not yet reclaimed by a rebuild.
    #[inline]
    pub fn tombstone_count(&self) -> usize {
        self.num_freed
    }

    /// Removes every entry, keeping the table allocation.
    pub fn clear(&mut self) {
        self.slots.fill(Slot::Empty);
        self.entries.clear();
        self.num_occupied = 0;
        self.num_freed = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.iter(),
            remaining: self.num_occupied,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.entries.iter_mut(),
            remaining: self.num_occupied,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }

    /// First entry in insertion order.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Recounts slot states and compares them against the tracked counters.
    pub fn check_counts(&self) -> Result<(), CountMismatch> {
        let mut counted_occupied = 0;
        let mut counted_deleted = 0;
        for slot in &self.slots {
            match slot {
                Slot::Occupied(_) => counted_occupied += 1,
                Slot::Deleted => counted_deleted += 1,
                Slot::Empty => {}
            }
        }
        if counted_occupied == self.num_occupied && counted_deleted == self.num_freed {
            Ok(())
        } else {
            Err(CountMismatch {
                counted_occupied,
                tracked_occupied: self.num_occupied,
                counted_deleted,
                tracked_deleted: self.num_freed,
            })
        }
    }

    fn live_entry(&self, index: usize) -> &Entry<K, V> {
        match self.entries.get(index) {
            Some(Some(entry)) => entry,
            _ => internal_coding_error("lhm slot points at a missing entry"),
        }
    }

    fn live_entry_mut(&mut self, index: usize) -> &mut Entry<K, V> {
        match self.entries.get_mut(index) {
            Some(Some(entry)) => entry,
            _ => internal_coding_error("lhm slot points at a missing entry"),
        }
    }
}

impl<K: Hash + Eq, V> Lhm<K, V> {
    /// Inserts or replaces. Returns the previous value for an existing key,
    /// whose position in iteration order is kept.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.reserve_one();
        match self.probe(&key) {
            Probe::Found { entry, .. } => {
                Some(std::mem::replace(&mut self.live_entry_mut(entry).value, value))
            }
            Probe::Vacant { slot, ideal_index } => {
                self.occupy(slot, ideal_index, key, value);
                None
            }
        }
    }

    /// The value for `key`, inserting `default()` at the end if absent.
    pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        self.reserve_one();
        let index = match self.probe(&key) {
            Probe::Found { entry, .. } => entry,
            Probe::Vacant { slot, ideal_index } => self.occupy(slot, ideal_index, key, default()),
        };
        &mut self.live_entry_mut(index).value
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(key) {
            Probe::Found { entry, .. } => Some(&self.live_entry(entry).value),
            Probe::Vacant { .. } => None,
        }
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(key) {
            Probe::Found { entry, .. } => Some(&mut self.live_entry_mut(entry).value),
            Probe::Vacant { .. } => None,
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        matches!(self.probe(key), Probe::Found { .. })
    }

    /// Removes `key`, leaving a tombstone in its slot. Later entries keep
    /// their relative order.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Probe::Found { slot, entry } = self.probe(key) else {
            return None;
        };
        self.slots[slot] = Slot::Deleted;
        self.num_occupied -= 1;
        self.num_freed += 1;
        self.entries
            .get_mut(entry)
            .and_then(Option::take)
            .map(|removed| removed.value)
    }

    /// Ideal (unprobed) slot index of a present key.
    pub fn ideal_index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(key) {
            Probe::Found { entry, .. } => Some(self.live_entry(entry).ideal_index),
            Probe::Vacant { .. } => None,
        }
    }

    fn ideal_index<Q: Hash + ?Sized>(key: &Q, array_length: usize) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        // Table lengths are powers of two.
        (hasher.finish() as usize) & (array_length - 1)
    }

    /// Walks the probe chain for `key` until it finds the key or an empty
    /// slot. Tombstones are skipped, never reused.
    fn probe<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let array_length = self.slots.len();
        if array_length == 0 {
            return Probe::Vacant {
                slot: 0,
                ideal_index: 0,
            };
        }
        let ideal_index = Self::ideal_index(key, array_length);
        let mut index = ideal_index;
        for _ in 0..array_length {
            match self.slots[index] {
                Slot::Empty => {
                    return Probe::Vacant {
                        slot: index,
                        ideal_index,
                    }
                }
                Slot::Occupied(entry) => {
                    if <K as Borrow<Q>>::borrow(&self.live_entry(entry).key) == key {
                        return Probe::Found { slot: index, entry };
                    }
                }
                Slot::Deleted => {}
            }
            index = (index + 1) & (array_length - 1);
        }
        internal_coding_error("lhm slot table is full; rebuilding should have prevented this")
    }

    fn occupy(&mut self, slot: usize, ideal_index: usize, key: K, value: V) -> usize {
        let index = self.entries.len();
        self.entries.push(Some(Entry {
            key,
            value,
            ideal_index,
        }));
        self.slots[slot] = Slot::Occupied(index);
        self.num_occupied += 1;
        index
    }

    /// Makes room for one more insert: allocates the first table, or
    /// rebuilds once occupied plus tombstoned slots reach the load factor.
    ///
    /// The rebuild keeps the current length when tombstones are at least
    /// half the load, and grows otherwise, so the table tracks the peak live
    /// count rather than the number of removals.
    fn reserve_one(&mut self) {
        let array_length = self.slots.len();
        if array_length == 0 {
            self.slots = vec![Slot::Empty; INITIAL_ARRAY_LENGTH];
        } else if (self.num_occupied + self.num_freed) * LOAD_DENOMINATOR
            >= array_length * LOAD_NUMERATOR
        {
            let new_length = if self.num_freed >= self.num_occupied {
                array_length
            } else {
                array_length * ENLARGEMENT_FACTOR
            };
            self.rebuild(new_length);
        }
    }

    /// Re-inserts the live entries, in order, into a fresh table of
    /// `new_length` slots, dropping tombstones and entry holes.
    fn rebuild(&mut self, new_length: usize) {
        tracing::trace!(
            from = self.slots.len(),
            to = new_length,
            live = self.num_occupied,
            tombstones = self.num_freed,
            "rebuilding lhm"
        );
        let old_entries = std::mem::take(&mut self.entries);
        self.slots = vec![Slot::Empty; new_length];
        self.entries.reserve(self.num_occupied);
        self.num_occupied = 0;
        self.num_freed = 0;
        for entry in old_entries.into_iter().flatten() {
            match self.probe(&entry.key) {
                Probe::Vacant { slot, ideal_index } => {
                    self.occupy(slot, ideal_index, entry.key, entry.value);
                }
                Probe::Found { .. } => internal_coding_error("duplicate key during lhm rebuild"),
            }
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> Lhm<K, V> {
    /// Human-readable table dump: header counters, then one line per slot.
    pub fn dump(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "array_length={} num_occupied={} num_freed={}",
            self.slots.len(),
            self.num_occupied,
            self.num_freed
        );
        for (index, slot) in self.slots.iter().enumerate() {
            let _ = match slot {
                Slot::Empty => writeln!(out, "{index:4} empty"),
                Slot::Deleted => writeln!(out, "{index:4} deleted"),
                Slot::Occupied(entry) => {
                    let entry = self.live_entry(*entry);
                    writeln!(
                        out,
                        "{index:4} ideal={:<4} {:?} => {:?}",
                        entry.ideal_index, entry.key, entry.value
                    )
                }
            };
        }
        out
    }
}

impl<K, V> Default for Lhm<K, V> {
    fn default() -> Self {
        Lhm::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Lhm<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Order-sensitive: equal maps hold equal pairs in the same order.
impl<K: PartialEq, V: PartialEq> PartialEq for Lhm<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for Lhm<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Lhm::new();
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for Lhm<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

pub struct Iter<'a, K, V> {
    inner: std::slice::Iter<'a, Option<Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.inner.next()? {
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

pub struct IterMut<'a, K, V> {
    inner: std::slice::IterMut<'a, Option<Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.inner.next()? {
                self.remaining -= 1;
                return Some((&entry.key, &mut entry.value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

pub struct IntoIter<K, V> {
    inner: std::vec::IntoIter<Option<Entry<K, V>>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.inner.next()? {
                self.remaining -= 1;
                return Some((entry.key, entry.value));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> IntoIterator for Lhm<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
            remaining: self.num_occupied,
        }
    }
}

impl<'a, K, V> IntoIterator for &'a Lhm<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut Lhm<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
