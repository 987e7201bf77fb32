// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Value types shared by every layer of the index.
//!
//! # Invariants
//!
//! - **MatchRange**: `start <= end`. An empty range (`start == end`) means
//!   "no match" and is a normal value, never an error.
//! - **DocId**: 1-based. Document `i` of the input (0-based) is `DocId(i + 1)`,
//!   which leaves symbol 0 free in document arrays.

use std::ops::Range;

use serde::{Deserialize, Serialize};

// =============================================================================
// NEWTYPES
// =============================================================================

/// Type-safe 1-based document identifier.
///
/// Prevents accidentally passing a row or text position where a document ID
/// is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DocId(pub u32);

impl DocId {
    /// Create a DocId from a 0-based document index.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        DocId(index as u32 + 1)
    }

    /// Create a new DocId, validating it names one of `num_docs` documents.
    #[inline]
    pub fn new(id: u32, num_docs: usize) -> Option<Self> {
        if id >= 1 && (id as usize) <= num_docs {
            Some(DocId(id))
        } else {
            None
        }
    }

    /// Get the underlying value.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// 0-based index into per-document arrays.
    #[inline]
    pub fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// RANGES
// =============================================================================

/// Half-open interval `[start, end)` over some index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

impl MatchRange {
    /// The canonical empty range.
    pub const EMPTY: MatchRange = MatchRange { start: 0, end: 0 };

    /// Build a range, collapsing `end < start` to an empty range at `start`.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for MatchRange {
    fn from(r: Range<usize>) -> Self {
        MatchRange::new(r.start, r.end)
    }
}

/// A match range carrying a caller-supplied score contribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedRange {
    pub range: MatchRange,
    pub weight: f64,
}

impl WeightedRange {
    pub fn new(range: impl Into<MatchRange>, weight: f64) -> Self {
        Self {
            range: range.into(),
            weight,
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// A symbol produced by a top-K union, with its accumulated score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedSymbol {
    pub symbol: u32,
    pub score: f64,
}

/// A document with its accumulated score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Outcome of a backward search.
///
/// `matched` is the length of the longest pattern suffix that occurs in the
/// text and `range` the BWT rows of that suffix. `matched == pattern.len()`
/// means a full match; `matched == 0` comes with an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchMatch {
    pub matched: usize,
    pub range: MatchRange,
}

impl SearchMatch {
    /// True when every pattern symbol matched.
    pub fn is_full(&self, pattern_len: usize) -> bool {
        self.matched == pattern_len && !self.range.is_empty()
    }
}
