// Indexed min-heap for the A* open set.
//
// `std::collections::BinaryHeap` has no way to lower the priority of an
// entry already queued, so searches built on it either push duplicates or
// scan the heap. `OpenSet` keeps its own array-backed binary heap plus a
// node → slot map, which gives `decrease_key` in O(log n) and membership
// tests in O(1).
//
// Ordering: smallest `g + h` first; equal totals pop the lower node id
// first. The tie-break makes every search reproducible.

use rustc_hash::FxHashMap;
use std::cmp::Ordering;

use crate::types::NodeId;

/// A queued search node: its cost so far (`g`) and its estimate to the
/// target (`h`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpenEntry {
    pub node: NodeId,
    pub g: f64,
    pub h: f64,
}

impl OpenEntry {
    pub fn total(&self) -> f64 {
        self.g + self.h
    }

    fn priority_cmp(&self, other: &Self) -> Ordering {
        self.total()
            .total_cmp(&other.total())
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Min-heap of `OpenEntry` with decrease-key.
#[derive(Debug, Default)]
pub struct OpenSet {
    heap: Vec<OpenEntry>,
    slots: FxHashMap<NodeId, usize>,
}

impl OpenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a node that is not already queued.
    pub fn push(&mut self, entry: OpenEntry) {
        debug_assert!(!self.slots.contains_key(&entry.node), "{} queued twice", entry.node);
        let slot = self.heap.len();
        self.heap.push(entry);
        self.slots.insert(entry.node, slot);
        self.sift_up(slot);
    }

    /// Remove and return the entry with the lowest total.
    pub fn pop(&mut self) -> Option<OpenEntry> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.slots.remove(&entry.node);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(entry)
    }

    pub fn get(&self, node: NodeId) -> Option<&OpenEntry> {
        self.slots.get(&node).map(|&slot| &self.heap[slot])
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.slots.contains_key(&node)
    }

    /// Lower `node`'s cost so far to `g`. Returns false (and changes
    /// nothing) if the node is not queued or `g` is not an improvement.
    pub fn decrease_key(&mut self, node: NodeId, g: f64) -> bool {
        let Some(&slot) = self.slots.get(&node) else {
            return false;
        };
        if g >= self.heap[slot].g {
            return false;
        }
        self.heap[slot].g = g;
        self.sift_up(slot);
        true
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.heap[slot].priority_cmp(&self.heap[parent]) != Ordering::Less {
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
            if left < len && self.heap[left].priority_cmp(&self.heap[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < len && self.heap[right].priority_cmp(&self.heap[smallest]) == Ordering::Less {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].node, a);
        self.slots.insert(self.heap[b].node, b);
    }
}
