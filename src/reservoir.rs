//! Bounded uniform sampling of hits.
//!
//! Every counted hit draws an independent `Uniform[0,1)` key; the reservoir keeps the `k` items
//! with the highest keys. Because the kept set is a pure function of the keys, per-document
//! reservoirs merge into exactly the reservoir a single sequential pass would have produced.
//!
//! # Invariants
//! - `len() <= capacity`
//! - after any sequence of offers and merges, the kept items are the top `capacity` of everything
//!   offered, under the total order of [`SampleItem`]

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One sampled hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleItem {
    /// Priority key in `[0, 1)`
    pub key: f64,
    pub rule: String,
    /// Trimmed sentence block of the hit
    pub text: String,
    /// Document the hit came from
    pub document: String,
}

impl SampleItem {
    fn order_tuple(&self) -> (&str, &str, &str) {
        (&self.document, &self.text, &self.rule)
    }
}

// WHY: key ties are broken by content so merge results never depend on arrival order
impl Ord for SampleItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.order_tuple().cmp(&other.order_tuple()))
    }
}

impl PartialOrd for SampleItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SampleItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SampleItem {}

/// Draw a fresh priority key
pub fn draw_key<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Top-`capacity` reservoir backed by a min-heap on the key
#[derive(Debug, Clone, Default)]
pub struct Reservoir {
    capacity: usize,
    heap: BinaryHeap<Reverse<SampleItem>>,
}

impl Reservoir {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(4096)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offer one item; returns whether it was kept
    pub fn offer(&mut self, item: SampleItem) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(item));
            return true;
        }
        match self.heap.peek_mut() {
            Some(mut min) if item > min.0 => {
                *min = Reverse(item);
                true
            }
            _ => false,
        }
    }

    /// Fold another reservoir into this one with the same offer rule
    pub fn merge(&mut self, other: Reservoir) {
        for Reverse(item) in other.heap.into_vec() {
            self.offer(item);
        }
    }

    /// Kept items in ascending key order
    pub fn into_sorted_vec(self) -> Vec<SampleItem> {
        let mut items: Vec<SampleItem> = self.heap.into_iter().map(|Reverse(item)| item).collect();
        items.sort();
        items
    }
}
