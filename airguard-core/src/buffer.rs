//! Bounded Sample Window for Streaming Filters
//!
//! ## Overview
//!
//! Every filter keeps the most recent raw samples it has seen, up to its
//! configured window size. Once the window is full, the next push evicts the
//! oldest sample. The evicted value is handed back to the caller so that the
//! moving average can keep its running sum exact without re-summing the
//! window.
//!
//! ```text
//! capacity = 3
//!
//! push(10) -> [10]          evicted: None
//! push(20) -> [10, 20]      evicted: None
//! push(30) -> [10, 20, 30]  evicted: None
//! push(40) -> [20, 30, 40]  evicted: Some(10)
//! ```
//!
//! Unlike a compile-time sized ring, the capacity here is chosen at runtime
//! because window sizes come from configuration. Storage is a `VecDeque`
//! allocated once with the configured capacity.
//!
//! ## Usage Example
//!
//! ```rust
//! use airguard_core::buffer::SampleWindow;
//!
//! let mut window = SampleWindow::new(2);
//! assert_eq!(window.push(1.0), None);
//! assert_eq!(window.push(2.0), None);
//! assert_eq!(window.push(3.0), Some(1.0));
//!
//! let samples: Vec<f64> = window.iter().copied().collect();
//! assert_eq!(samples, vec![2.0, 3.0]);
//! ```

use std::collections::VecDeque;

/// Fixed-capacity window of the most recent samples, oldest first
///
/// ## Internal Invariants
///
/// - `samples.len() <= capacity`
/// - `capacity >= 1`
/// - Iteration yields samples in the order they were pushed
///
/// ## Thread Safety
///
/// Not synchronized. A window belongs to exactly one filter, and a filter to
/// exactly one published quantity.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SampleWindow {
    /// Creates an empty window. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, returning the evicted oldest sample when full
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(value);
        evicted
    }

    /// Changes the capacity, evicting oldest samples that no longer fit
    ///
    /// Returns the evicted samples, oldest first.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<f64> {
        self.capacity = capacity.max(1);
        let excess = self.samples.len().saturating_sub(self.capacity);
        self.samples.drain(..excess).collect()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no sample is retained
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check if the next push will evict
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Most recent sample
    pub fn last(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Sample by logical index (0 = oldest)
    pub fn get(&self, index: usize) -> Option<f64> {
        self.samples.get(index).copied()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.samples.iter()
    }

    /// Drop all samples, keeping the capacity
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Copy of the retained samples, oldest first
    pub fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}
