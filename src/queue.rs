//! Fixed capacity priority queue with deletion at arbitrary positions.
//!
//! The heap is 1-indexed: the root sits at index 1, the children of `i` at
//! `2i` and `2i + 1`, and `next` is the first free index. Every enqueued
//! element also gets a [`QueueHandle`], which resolves to the element's
//! current heap index in O(1), so an element can be pulled out of the middle
//! of the heap in O(log n) without scanning.

use std::cmp::Ordering;
use std::collections::TryReserveError;

use crate::order::Comparator;

/// Stable reference to an enqueued element.
///
/// The stamp changes every time the handle slot is recycled, so a handle kept
/// after its element left the queue never resolves to a different element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueHandle {
    slot: u32,
    stamp: u32,
}

struct Entry<T> {
    item: T,
    slot: u32,
}

#[derive(Clone, Copy)]
struct SlotState {
    /// heap index, 0 when the slot is free
    index: usize,
    stamp: u32,
}

pub struct IndexedQueue<T, C> {
    /// heap index `i` lives at `heap[i - 1]`
    heap: Vec<Entry<T>>,
    capacity: usize,
    slots: Vec<SlotState>,
    free_slots: Vec<u32>,
    cmp: C,
}

impl<T, C: Comparator<T>> IndexedQueue<T, C> {
    /// Create a queue holding at most `capacity` elements.
    pub fn new(capacity: usize, cmp: C) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            capacity,
            slots: vec![SlotState { index: 0, stamp: 0 }; capacity],
            free_slots: (0..capacity as u32).rev().collect(),
            cmp,
        }
    }

    /// Same as [`Self::new`], but reports allocation failure instead of aborting.
    pub fn try_new(capacity: usize, cmp: C) -> Result<Self, TryReserveError> {
        let mut heap = Vec::new();
        heap.try_reserve_exact(capacity)?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize(capacity, SlotState { index: 0, stamp: 0 });
        let mut free_slots = Vec::new();
        free_slots.try_reserve_exact(capacity)?;
        free_slots.extend((0..capacity as u32).rev());

        Ok(Self {
            heap,
            capacity,
            slots,
            free_slots,
            cmp,
        })
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() == self.capacity
    }

    /// First free heap index
    pub fn next_index(&self) -> usize {
        self.heap.len() + 1
    }

    /// Add `item`, returns `None` and drops the item when the queue is full.
    pub fn enqueue(&mut self, item: T) -> Option<QueueHandle> {
        if self.is_full() {
            return None;
        }
        let slot = self.free_slots.pop()?;
        self.heap.push(Entry { item, slot });

        let index = self.heap.len();
        let state = &mut self.slots[slot as usize];
        state.index = index;
        let handle = QueueHandle {
            slot,
            stamp: state.stamp,
        };

        self.sift_up(index);
        Some(handle)
    }

    /// Remove the element with the highest priority
    pub fn dequeue(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.delete_at(1)
    }

    pub fn peek(&self) -> Option<&T> {
        self.heap.first().map(|e| &e.item)
    }

    /// Element at heap `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        index
            .checked_sub(1)
            .and_then(|i| self.heap.get(i))
            .map(|e| &e.item)
    }

    /// Remove the element at heap `index` (1 based), `None` when out of range.
    pub fn delete_at(&mut self, index: usize) -> Option<T> {
        let last = self.heap.len();
        if index < 1 || index > last {
            return None;
        }

        self.swap(index, last);
        let entry = self.heap.pop()?;
        let state = &mut self.slots[entry.slot as usize];
        state.index = 0;
        state.stamp = state.stamp.wrapping_add(1);
        self.free_slots.push(entry.slot);

        if index < last {
            let parent = index / 2;
            if parent >= 1 && self.outranks(index, parent) {
                self.sift_up(index);
            } else {
                self.sift_down(index);
            }
        }

        Some(entry.item)
    }

    /// Current heap index of the element behind `handle`
    pub fn index_of(&self, handle: QueueHandle) -> Option<usize> {
        let state = self.slots.get(handle.slot as usize)?;
        if state.stamp != handle.stamp || state.index == 0 {
            return None;
        }
        Some(state.index)
    }

    pub fn contains(&self, handle: QueueHandle) -> bool {
        self.index_of(handle).is_some()
    }

    /// Remove the element behind `handle`
    pub fn remove(&mut self, handle: QueueHandle) -> Option<T> {
        let index = self.index_of(handle)?;
        self.delete_at(index)
    }

    /// Drop all elements, outstanding handles become stale
    pub fn clear(&mut self) {
        while self.delete_at(self.heap.len()).is_some() {}
    }

    /// Elements in heap order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|e| &e.item)
    }

    /// Check heap order and handle bookkeeping
    pub fn verify(&self) -> bool {
        for index in 2..=self.heap.len() {
            if self.outranks(index, index / 2) {
                return false;
            }
        }
        self.heap
            .iter()
            .enumerate()
            .all(|(i, e)| self.slots[e.slot as usize].index == i + 1)
    }

    /// Whether the element at `a` has a strictly higher priority than the one at `b`
    fn outranks(&self, a: usize, b: usize) -> bool {
        self.cmp
            .compare(&self.heap[a - 1].item, &self.heap[b - 1].item)
            == Ordering::Greater
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a - 1, b - 1);
        let slot_a = self.heap[a - 1].slot as usize;
        let slot_b = self.heap[b - 1].slot as usize;
        self.slots[slot_a].index = a;
        self.slots[slot_b].index = b;
    }

    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 1 {
            let parent = index / 2;
            if !self.outranks(index, parent) {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
        index
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index;
            let right = left + 1;
            if left > len {
                return;
            }

            // take the path of the higher priority child, left on a tie
            let child = if right <= len && self.outranks(right, left) {
                right
            } else {
                left
            };
            if !self.outranks(child, index) {
                return;
            }
            self.swap(child, index);
            index = child;
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::order::{NaturalOrder, Reversed};

    type MinQueue = IndexedQueue<i32, Reversed<NaturalOrder>>;

    fn min_queue(capacity: usize) -> MinQueue {
        IndexedQueue::new(capacity, Reversed(NaturalOrder))
    }

    fn drain(queue: &mut MinQueue) -> Vec<i32> {
        let mut result = vec![];
        while let Some(v) = queue.dequeue() {
            assert!(queue.verify());
            result.push(v);
        }
        result
    }

    #[test]
    fn test_enqueue_layout() {
        let mut queue = min_queue(10);
        assert!(queue.is_empty());
        for v in [5, 11, 44, 39, 1, 11] {
            queue.enqueue(v);
        }
        let layout = (1..queue.next_index())
            .map(|i| *queue.get(i).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(layout, vec![1, 5, 11, 39, 11, 44]);
    }

    #[test]
    fn test_dequeue_order() {
        let mut queue = min_queue(10);
        for v in [5, 11, 44, 39, 1, 11] {
            queue.enqueue(v);
        }
        assert_eq!(drain(&mut queue), vec![1, 5, 11, 11, 39, 44]);
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_full_queue_is_noop() {
        let mut queue = min_queue(2);
        assert!(queue.enqueue(3).is_some());
        assert!(queue.enqueue(2).is_some());
        assert!(queue.is_full());
        assert_eq!(queue.enqueue(1), None);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek(), Some(&2));

        let empty = min_queue(0);
        assert!(empty.is_full() && empty.is_empty());
    }

    #[test]
    fn test_delete_at_sifts_up_and_down() {
        let mut queue = min_queue(16);
        for v in [1, 10, 2, 11, 12, 3, 4, 13, 14] {
            queue.enqueue(v);
        }
        // the last element (14) takes the place of 11 and has to sink below 13
        let index = (1..queue.next_index())
            .find(|i| queue.get(*i) == Some(&11))
            .unwrap();
        assert_eq!(queue.delete_at(index), Some(11));
        assert!(queue.verify());

        assert_eq!(queue.delete_at(0), None);
        assert_eq!(queue.delete_at(queue.next_index()), None);
        assert_eq!(drain(&mut queue), vec![1, 2, 3, 4, 10, 12, 13, 14]);
    }

    #[test]
    fn test_handles() {
        let mut queue = min_queue(4);
        let h5 = queue.enqueue(5).unwrap();
        let h1 = queue.enqueue(1).unwrap();
        let h3 = queue.enqueue(3).unwrap();

        assert_eq!(queue.index_of(h1), Some(1));
        assert_eq!(queue.remove(h5), Some(5));
        assert_eq!(queue.remove(h5), None);
        assert!(!queue.contains(h5));

        // the slot of h5 is recycled, the old handle stays dead
        let h7 = queue.enqueue(7).unwrap();
        assert_eq!(queue.remove(h5), None);
        assert!(queue.contains(h7));

        assert_eq!(queue.dequeue(), Some(1));
        assert!(!queue.contains(h1));
        assert_eq!(queue.remove(h3), Some(3));
        assert_eq!(drain(&mut queue), vec![7]);
    }

    #[test]
    fn test_clear() {
        let mut queue = min_queue(4);
        let handle = queue.enqueue(1).unwrap();
        queue.enqueue(2);
        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.contains(handle));
        assert!(queue.enqueue(3).is_some());
    }

    proptest! {
        #[test]
        fn prop_drain_is_sorted(values in prop::collection::vec(-1000i32..1000, 0..200)) {
            let mut queue = min_queue(values.len());
            for v in &values {
                queue.enqueue(*v);
                prop_assert!(queue.verify());
            }
            let mut expected = values.clone();
            expected.sort();
            prop_assert_eq!(drain(&mut queue), expected);
        }

        #[test]
        fn prop_delete_at_equals_never_enqueued(
            values in prop::collection::vec(-1000i32..1000, 1..200),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut queue = min_queue(values.len());
            for v in &values {
                queue.enqueue(*v);
            }
            let index = pick.index(queue.len()) + 1;
            let deleted = queue.delete_at(index).unwrap();
            prop_assert!(queue.verify());

            let mut expected = values.clone();
            let position = expected.iter().position(|v| *v == deleted).unwrap();
            expected.remove(position);
            expected.sort();
            prop_assert_eq!(drain(&mut queue), expected);
        }

        #[test]
        fn prop_mixed_operations_keep_heap_order(
            ops in prop::collection::vec((0u8..3, -100i32..100), 0..300),
        ) {
            let mut queue = min_queue(64);
            let mut handles = vec![];
            for (op, value) in ops {
                match op {
                    0 => {
                        if let Some(handle) = queue.enqueue(value) {
                            handles.push(handle);
                        }
                    }
                    1 => {
                        queue.dequeue();
                    }
                    _ => {
                        if let Some(handle) = handles.pop() {
                            queue.remove(handle);
                        }
                    }
                }
                prop_assert!(queue.verify());
                prop_assert!(queue.len() <= queue.capacity());
            }
        }
    }
}
