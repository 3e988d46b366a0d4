//! Indexed min-priority queue with decrease-key.
//!
//! Items are dense integer indices (row-major cell offsets). The heap lives
//! in a flat array and a parallel `index → heap slot` table makes membership
//! tests and in-place key updates O(1) to locate and O(log n) to restore.

const ABSENT: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    index: u32,
    key: f32,
}

/// Array-backed binary min-heap keyed by `f32`, addressable by item index.
#[derive(Debug, Clone, Default)]
pub struct IndexedMinQueue {
    heap: Vec<HeapEntry>,
    slots: Vec<u32>,
}

impl IndexedMinQueue {
    /// A queue accepting indices in `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: Vec::new(),
            slots: vec![ABSENT; capacity],
        }
    }

    /// Number of addressable indices.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Empty the queue and make room for indices in `0..capacity`.
    pub fn reset(&mut self, capacity: usize) {
        self.clear();
        if self.slots.len() < capacity {
            self.slots.resize(capacity, ABSENT);
        }
    }

    /// Remove every item. Costs O(len), not O(capacity).
    pub fn clear(&mut self) {
        for e in self.heap.drain(..) {
            self.slots[e.index as usize] = ABSENT;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|&s| s != ABSENT)
    }

    /// Current key of a queued item.
    pub fn key(&self, index: usize) -> Option<f32> {
        let slot = *self.slots.get(index)?;
        (slot != ABSENT).then(|| self.heap[slot as usize].key)
    }

    /// Smallest queued item without removing it.
    pub fn peek(&self) -> Option<(usize, f32)> {
        self.heap.first().map(|e| (e.index as usize, e.key))
    }

    /// Insert `index`. Panics if it is already queued or out of capacity.
    pub fn push(&mut self, index: usize, key: f32) {
        assert!(!self.contains(index), "index {index} is already queued");
        let slot = self.heap.len();
        self.heap.push(HeapEntry {
            index: index as u32,
            key,
        });
        self.slots[index] = slot as u32;
        self.sift_up(slot);
    }

    /// Lower the key of a queued item. Keys that are not smaller are
    /// ignored. Returns `false` if the item is not queued.
    pub fn decrease_key(&mut self, index: usize, key: f32) -> bool {
        let Some(&slot) = self.slots.get(index) else {
            return false;
        };
        if slot == ABSENT {
            return false;
        }
        let slot = slot as usize;
        if key < self.heap[slot].key {
            self.heap[slot].key = key;
            self.sift_up(slot);
        }
        true
    }

    /// Insert `index`, or lower its key if it is already queued.
    pub fn push_or_decrease(&mut self, index: usize, key: f32) {
        if !self.decrease_key(index, key) {
            self.push(index, key);
        }
    }

    /// Remove and return the item with the smallest key.
    pub fn pop(&mut self) -> Option<(usize, f32)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let top = self.heap.pop()?;
        self.slots[top.index as usize] = ABSENT;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((top.index as usize, top.key))
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.heap[slot].key >= self.heap[parent].key {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.heap[left].key < self.heap[smallest].key {
                smallest = left;
            }
            if right < len && self.heap[right].key < self.heap[smallest].key {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots[self.heap[a].index as usize] = a as u32;
        self.slots[self.heap[b].index as usize] = b as u32;
    }
}
