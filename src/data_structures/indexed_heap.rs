use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::heap_primitives::best_child;
use crate::heap_primitives::parent;

type HeapIndex = usize;

/// A ranked key sitting in an `IndexedHeap`.
///
/// Entries compare by `(rank, order)`, where `order` is the insertion order
/// within the heap. No two entries ever compare equal, so the pop order is
/// fully deterministic.
#[derive(Clone, Debug)]
pub struct HeapEntry<K, R> {
    pub rank: R,
    order: u64,
    pub key: K,
}

impl<K, R: Ord> PartialEq for HeapEntry<K, R> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<K, R: Ord> Eq for HeapEntry<K, R> {}

impl<K, R: Ord> PartialOrd for HeapEntry<K, R> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<K, R: Ord> Ord for HeapEntry<K, R> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Indexed min-heap
///
/// A binary heap of `(key, rank)` pairs that also tracks the slot of every
/// key, so a key can be found in constant time and re-ranked in logarithmic
/// time without searching the array for it.
///
/// Every swap inside the heap updates the slots of both swapped keys.
///
/// ```pseudocode
/// for (i, e) in self.heap.enumerate():
///   assert_eq(self.slots[e.key], i)
/// ```
#[derive(Debug)]
pub struct IndexedHeap<K, R>
where
    K: Copy + Eq + Hash + Debug,
    R: Ord + Debug,
{
    heap: Vec<HeapEntry<K, R>>,
    slots: FxHashMap<K, HeapIndex>,
    next_order: u64,
}

impl<K, R> IndexedHeap<K, R>
where
    K: Copy + Eq + Hash + Debug,
    R: Ord + Debug,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-sizes the heap for `s` keys. The heap still grows past `s`.
    pub fn with_capacity(s: usize) -> Self {
        Self {
            heap: Vec::with_capacity(s),
            slots: FxHashMap::with_capacity_and_hasher(s, Default::default()),
            next_order: 0u64,
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    #[inline(always)]
    pub fn contains(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// The current rank of `key`, if it's in the heap.
    pub fn rank(&self, key: &K) -> Option<&R> {
        self.slots.get(key).map(|&i| &self.heap[i].rank)
    }

    /// The current slot of `key`, if it's in the heap.
    pub fn slot(&self, key: &K) -> Option<HeapIndex> {
        self.slots.get(key).copied()
    }

    /// The best entry, without removing it.
    pub fn peek(&self) -> Option<(K, &R)> {
        self.heap.first().map(|e| (e.key, &e.rank))
    }

    /// Adds a new key.
    ///
    /// The key must not be in the heap already. Returns its slot.
    pub fn push(&mut self, key: K, rank: R) -> HeapIndex {
        debug_assert!(
            !self.contains(&key),
            "{key:?} is already in the heap, re-rank it with update()"
        );
        self.verify_heap();

        let heap_index = self.heap.len(); // Future heap_index
        let order = self.next_order;
        self.next_order += 1;

        self.heap.push(HeapEntry { rank, order, key });
        self.slots.insert(key, heap_index);
        let heap_index = self._unsafe_sift_up(heap_index);

        self.verify_heap();
        heap_index
    }

    /// Removes the best entry.
    pub fn pop(&mut self) -> Option<(K, R)> {
        #[cfg(feature = "coz_profile")]
        coz::scope!("Pop");

        self.verify_heap();
        if self.heap.is_empty() {
            return None;
        }

        // The last entry takes the place of the root and sinks back down.
        let entry = self.heap.swap_remove(0);
        self.slots.remove(&entry.key);
        if let Some(root) = self.heap.first() {
            self.slots.insert(root.key, 0);
            self._unsafe_sift_down(0);
        }

        self.verify_heap();
        Some((entry.key, entry.rank))
    }

    /// Re-ranks a key already in the heap.
    ///
    /// Improving a rank can only move the key up. A worse rank moves it down
    /// instead. Returns the new slot, or `None` if the key is not in the heap.
    pub fn update(&mut self, key: K, rank: R) -> Option<HeapIndex> {
        let index = *self.slots.get(&key)?;
        self.verify_heap();

        let improved = rank <= self.heap[index].rank;
        self.heap[index].rank = rank;
        let index = if improved {
            self._unsafe_sift_up(index)
        } else {
            self._unsafe_sift_down(index)
        };

        self.verify_heap();
        Some(index)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
        self.next_order = 0u64;
    }

    /// Entries in heap (array) order.
    pub fn iter(&self) -> impl Iterator<Item = &HeapEntry<K, R>> {
        self.heap.iter()
    }

    /// Checks the heap order and the slot index.
    pub fn is_valid(&self) -> bool {
        if self.slots.len() != self.heap.len() {
            return false;
        }
        self.heap.iter().enumerate().all(|(i, e)| {
            self.slots.get(&e.key) == Some(&i) && (i == 0 || self.heap[parent(i)] <= *e)
        })
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify_heap(&self) {
        // All good... (hopefully)
    }

    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify_heap(&self) {
        debug_assert_eq!(self.slots.len(), self.heap.len(), "Slot index out of sync");
        // Every entry,
        for (i, e) in self.heap.iter().enumerate() {
            // - Has its slot recorded.
            debug_assert_eq!(self.slots.get(&e.key), Some(&i), "{e:?} is out of sync");

            // - Goes after its parent entry, if any.
            if i == 0 {
                continue;
            }
            let p = parent(i);
            debug_assert!(
                self.heap[p] <= self.heap[i],
                "Entry[{p}]={:?} !<= child [{i}]={:?}. Out of heap of len={}",
                self.heap[p],
                self.heap[i],
                self.heap.len(),
            );
        }
    }

    // Implementation details

    /// Raises an entry
    /// Returns it's new index
    #[inline(always)]
    fn _unsafe_sift_up(&mut self, index: HeapIndex) -> HeapIndex {
        debug_assert!(
            index < self.heap.len(),
            "Entry is way out of sync. Index out of bounds..."
        );

        let mut pos = index;
        while pos != 0 {
            let up = parent(pos);
            if self.heap[up] <= self.heap[pos] {
                break;
            }
            self._unsafe_swap(up, pos);
            pos = up;
        }
        pos
    }

    /// Lowers an entry
    /// Returns it's new index
    #[inline(always)]
    fn _unsafe_sift_down(&mut self, mut index: HeapIndex) -> HeapIndex {
        debug_assert!(
            index < self.heap.len(),
            "Entry is way out of sync. Index out of bounds..."
        );

        while let Some(child) = best_child(&self.heap, index) {
            if self.heap[index] <= self.heap[child] {
                break;
            }
            self._unsafe_swap(index, child);
            index = child;
        }
        index
    }

    /// Swaps two entries in the heap.
    ///
    /// For consistency in calling code `l < r` is checked.
    ///
    /// Keeps the slot index in sync.
    #[inline(always)]
    fn _unsafe_swap(&mut self, l: HeapIndex, r: HeapIndex) {
        debug_assert!(l < r, "Swap({l}, {r}) uses wrong argument order");

        let len = self.heap.len();
        debug_assert!(l < len, "Left  swap index {l} is OUT OF BOUNDS({len})");
        debug_assert!(r < len, "Right swap index {r} is OUT OF BOUNDS({len})");
        self.heap.swap(l, r);
        self.slots.insert(self.heap[l].key, l);
        self.slots.insert(self.heap[r].key, r);
        debug_assert!(
            self.heap[l] <= self.heap[r],
            "Swaps must locally restore the heap invariant."
        );
    }
}

impl<K, R> Default for IndexedHeap<K, R>
where
    K: Copy + Eq + Hash + Debug,
    R: Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
