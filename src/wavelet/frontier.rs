// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded best-first frontier for the top-K searches.
//!
//! An ordered map keyed by `(Reverse(score), sequence)`: the first entry is
//! the best candidate, the last the one to evict. The sequence number keeps
//! keys unique and breaks score ties in insertion order.

use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Smallest frontier capacity, whatever `top_k` is.
pub const FRONTIER_FLOOR: usize = 256;

/// Wrapper for f64 that implements Ord for use in BTreeMap keys.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrderedScore(pub f64);

impl PartialEq for OrderedScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for OrderedScore {}

impl PartialOrd for OrderedScore {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedScore {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Call-local max-priority structure with a hard capacity.
#[derive(Debug)]
pub(crate) struct Frontier<E> {
    entries: BTreeMap<(Reverse<OrderedScore>, u64), E>,
    capacity: usize,
    next_seq: u64,
    evicted: usize,
}

impl<E> Frontier<E> {
    pub fn for_top_k(top_k: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: top_k.max(FRONTIER_FLOOR),
            next_seq: 0,
            evicted: 0,
        }
    }

    /// Insert; when over capacity, drop the lowest-scoring entry.
    pub fn push(&mut self, score: f64, entry: E) {
        let key = (Reverse(OrderedScore(score)), self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key, entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_last();
            self.evicted += 1;
        }
    }

    /// Remove and return the highest-scoring entry.
    pub fn pop(&mut self) -> Option<(f64, E)> {
        self.entries
            .pop_first()
            .map(|((Reverse(OrderedScore(score)), _), entry)| (score, entry))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries dropped because the frontier was full.
    pub fn evicted(&self) -> usize {
        self.evicted
    }
}
