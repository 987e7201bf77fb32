// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Range traversals shared by both encodings.
//!
//! Both the wavelet matrix and the prefix-code tree are a binary partition of
//! the symbol space: at every node a range of positions splits into the part
//! that goes left (bit 0) and the part that goes right (bit 1). [`Partition`]
//! captures exactly that, and the algorithms here are written once against it.
//!
//! # Top-K union
//!
//! Best-first branch and bound. A frontier entry carries the ranges still
//! alive under its node; its key is the sum of their weights, an upper bound
//! on the score of any symbol below. Popping a leaf therefore yields a final
//! result, and results come out in non-increasing score order.
//!
//! The frontier holds at most `max(top_k, FRONTIER_FLOOR)` entries. If it
//! never overflows the answer is exact; an overflow evicts the weakest bounds.

use crate::types::{MatchRange, RankedSymbol, WeightedRange};

use super::frontier::Frontier;
use super::{AuxFilter, WaveletSequence};

/// Where a traversal stands: an internal node or a resolved symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor<N> {
    Node(N),
    Leaf(u32),
}

/// A binary partition of the symbol space with rank-based range splitting.
pub(crate) trait Partition {
    type Node: Copy;

    fn root(&self) -> Cursor<Self::Node>;

    /// Project `range` (in `node`'s index space) into its two children.
    fn split(&self, node: Self::Node, range: MatchRange) -> [MatchRange; 2];

    fn child(&self, node: Self::Node, bit: usize) -> Cursor<Self::Node>;

    /// `other` viewed as this partition, when both share node identity.
    fn lockstep<'a>(&self, other: &'a WaveletSequence) -> Option<&'a Self>;
}

// ============================================================================
// INTERSECT
// ============================================================================

/// Symbols present in at least `ranges.len() - threshold` of `ranges`.
pub(crate) fn intersect<P: Partition>(
    p: &P,
    ranges: &[MatchRange],
    threshold: usize,
    max_count: usize,
) -> Vec<u32> {
    let required = ranges.len().saturating_sub(threshold).max(1);
    let live: Vec<MatchRange> = ranges.iter().copied().filter(|r| !r.is_empty()).collect();

    let mut out = Vec::new();
    if max_count == 0 || live.len() < required {
        return out;
    }
    intersect_from(p, p.root(), live, required, max_count, &mut out);
    out.sort_unstable();
    out
}

fn intersect_from<P: Partition>(
    p: &P,
    cursor: Cursor<P::Node>,
    ranges: Vec<MatchRange>,
    required: usize,
    max_count: usize,
    out: &mut Vec<u32>,
) {
    let node = match cursor {
        Cursor::Leaf(symbol) => {
            out.push(symbol);
            return;
        }
        Cursor::Node(node) => node,
    };

    let [zeros, ones] = project(p, node, &ranges);
    for (bit, side) in [zeros, ones].into_iter().enumerate() {
        if out.len() >= max_count {
            return;
        }
        // Too many ranges already failed on this side.
        if side.len() < required {
            continue;
        }
        intersect_from(p, p.child(node, bit), side, required, max_count, out);
    }
}

// ============================================================================
// PROJECTION
// ============================================================================

fn project<P: Partition>(p: &P, node: P::Node, ranges: &[MatchRange]) -> [Vec<MatchRange>; 2] {
    let mut sides = [Vec::with_capacity(ranges.len()), Vec::with_capacity(ranges.len())];
    for &range in ranges {
        for (side, half) in sides.iter_mut().zip(p.split(node, range)) {
            if !half.is_empty() {
                side.push(half);
            }
        }
    }
    sides
}

fn project_weighted<P: Partition>(
    p: &P,
    node: P::Node,
    ranges: &[WeightedRange],
) -> [(Vec<WeightedRange>, f64); 2] {
    let mut sides = [(Vec::new(), 0.0), (Vec::new(), 0.0)];
    for wr in ranges {
        for (side, half) in sides.iter_mut().zip(p.split(node, wr.range)) {
            if !half.is_empty() {
                side.0.push(WeightedRange {
                    range: half,
                    weight: wr.weight,
                });
                side.1 += wr.weight;
            }
        }
    }
    sides
}

/// Non-empty, positively weighted ranges and their total weight.
fn seed_ranges(ranges: &[WeightedRange]) -> (Vec<WeightedRange>, f64) {
    let live: Vec<WeightedRange> = ranges
        .iter()
        .copied()
        .filter(|wr| !wr.range.is_empty() && wr.weight > 0.0)
        .collect();
    let score = live.iter().map(|wr| wr.weight).sum();
    (live, score)
}

// ============================================================================
// FRONTIER ENTRIES
// ============================================================================

trait Entry<N> {
    fn cursor(&self) -> Cursor<N>;
}

/// Node cursor plus the weighted ranges alive under it.
struct PatternList<N> {
    cursor: Cursor<N>,
    ranges: Vec<WeightedRange>,
}

/// A [`PatternList`] restricted to symbols inside at least one filter range.
struct FilteredPatternList<N> {
    list: PatternList<N>,
    filters: Vec<MatchRange>,
}

/// A [`PatternList`] that must also satisfy every auxiliary filter walked in
/// lockstep; `aux[i]` are the ranges of filter `i` projected to this node.
struct AuxFilteredPatternList<N> {
    list: PatternList<N>,
    aux: Vec<Vec<MatchRange>>,
}

impl<N: Copy> Entry<N> for PatternList<N> {
    fn cursor(&self) -> Cursor<N> {
        self.cursor
    }
}

impl<N: Copy> Entry<N> for FilteredPatternList<N> {
    fn cursor(&self) -> Cursor<N> {
        self.list.cursor
    }
}

impl<N: Copy> Entry<N> for AuxFilteredPatternList<N> {
    fn cursor(&self) -> Cursor<N> {
        self.list.cursor
    }
}

/// Pop best, emit leaves, expand nodes, until `top_k` results or exhaustion.
fn best_first<N: Copy, E: Entry<N>>(
    seed: Option<(f64, E)>,
    top_k: usize,
    mut expand: impl FnMut(N, E, &mut Vec<(f64, E)>),
) -> Vec<RankedSymbol> {
    let mut results = Vec::new();
    if top_k == 0 {
        return results;
    }
    let mut frontier = Frontier::for_top_k(top_k);
    if let Some((score, entry)) = seed {
        if score > 0.0 {
            frontier.push(score, entry);
        }
    }

    let mut children = Vec::with_capacity(2);
    while results.len() < top_k {
        let Some((score, entry)) = frontier.pop() else {
            break;
        };
        match entry.cursor() {
            Cursor::Leaf(symbol) => results.push(RankedSymbol { symbol, score }),
            Cursor::Node(node) => {
                expand(node, entry, &mut children);
                for (child_score, child) in children.drain(..) {
                    frontier.push(child_score, child);
                }
            }
        }
    }

    if frontier.evicted() > 0 {
        tracing::debug!(
            evicted = frontier.evicted(),
            top_k,
            "top-k frontier overflowed; results may be approximate"
        );
    }
    results
}

// ============================================================================
// TOP-K UNION
// ============================================================================

pub(crate) fn top_k_union<P: Partition>(
    p: &P,
    ranges: &[WeightedRange],
    top_k: usize,
) -> Vec<RankedSymbol> {
    let (live, score) = seed_ranges(ranges);
    let seed = PatternList {
        cursor: p.root(),
        ranges: live,
    };

    best_first(Some((score, seed)), top_k, |node, entry: PatternList<P::Node>, out| {
        let sides = project_weighted(p, node, &entry.ranges);
        for (bit, (ranges, score)) in sides.into_iter().enumerate() {
            if score > 0.0 {
                out.push((
                    score,
                    PatternList {
                        cursor: p.child(node, bit),
                        ranges,
                    },
                ));
            }
        }
    })
}

/// Like [`top_k_union`], keeping only symbols that occur in some filter range.
pub(crate) fn top_k_union_with_filters<P: Partition>(
    p: &P,
    filters: &[MatchRange],
    ranges: &[WeightedRange],
    top_k: usize,
) -> Vec<RankedSymbol> {
    let filters: Vec<MatchRange> = filters.iter().copied().filter(|r| !r.is_empty()).collect();
    if filters.is_empty() {
        return Vec::new();
    }
    let (live, score) = seed_ranges(ranges);
    let seed = FilteredPatternList {
        list: PatternList {
            cursor: p.root(),
            ranges: live,
        },
        filters,
    };

    best_first(
        Some((score, seed)),
        top_k,
        |node, entry: FilteredPatternList<P::Node>, out| {
            let sides = project_weighted(p, node, &entry.list.ranges);
            let filter_sides = project(p, node, &entry.filters);
            for (bit, ((ranges, score), filters)) in
                sides.into_iter().zip(filter_sides).enumerate()
            {
                // No filter range reaches this subtree.
                if score <= 0.0 || filters.is_empty() {
                    continue;
                }
                out.push((
                    score,
                    FilteredPatternList {
                        list: PatternList {
                            cursor: p.child(node, bit),
                            ranges,
                        },
                        filters,
                    },
                ));
            }
        },
    )
}

/// Like [`top_k_union`], keeping only symbols that satisfy every auxiliary
/// filter (each one an OR over its ranges in another sequence).
///
/// Filters over a sequence with the same node identity are projected in
/// lockstep and prune whole subtrees; the rest are checked with `rank` once a
/// leaf is resolved.
pub(crate) fn top_k_union_with_aux_filters<P: Partition>(
    p: &P,
    aux_filters: &[AuxFilter<'_>],
    ranges: &[WeightedRange],
    top_k: usize,
) -> Vec<RankedSymbol> {
    let mut lockstep: Vec<&P> = Vec::new();
    let mut lockstep_ranges: Vec<Vec<MatchRange>> = Vec::new();
    let mut at_leaf: Vec<(&WaveletSequence, Vec<MatchRange>)> = Vec::new();

    for filter in aux_filters {
        let live: Vec<MatchRange> = filter
            .ranges
            .iter()
            .copied()
            .filter(|r| !r.is_empty())
            .collect();
        // An empty filter admits nothing.
        if live.is_empty() {
            return Vec::new();
        }
        match p.lockstep(filter.sequence) {
            Some(view) => {
                lockstep.push(view);
                lockstep_ranges.push(live);
            }
            None => at_leaf.push((filter.sequence, live)),
        }
    }

    let admits_leaf = |cursor: Cursor<P::Node>| match cursor {
        Cursor::Node(_) => true,
        Cursor::Leaf(symbol) => at_leaf.iter().all(|(sequence, ranges)| {
            ranges
                .iter()
                .any(|r| sequence.rank(symbol, r.end) > sequence.rank(symbol, r.start))
        }),
    };

    let root = p.root();
    if !admits_leaf(root) {
        return Vec::new();
    }
    let (live, score) = seed_ranges(ranges);
    let seed = AuxFilteredPatternList {
        list: PatternList {
            cursor: root,
            ranges: live,
        },
        aux: lockstep_ranges,
    };

    best_first(
        Some((score, seed)),
        top_k,
        |node, entry: AuxFilteredPatternList<P::Node>, out| {
            let sides = project_weighted(p, node, &entry.list.ranges);

            let mut aux_sides: [Vec<Vec<MatchRange>>; 2] = [Vec::new(), Vec::new()];
            for (view, ranges) in lockstep.iter().zip(&entry.aux) {
                let [zeros, ones] = project(*view, node, ranges);
                aux_sides[0].push(zeros);
                aux_sides[1].push(ones);
            }

            for (bit, ((ranges, score), aux)) in sides.into_iter().zip(aux_sides).enumerate() {
                // Some auxiliary filter has no document left in this subtree.
                if score <= 0.0 || aux.iter().any(Vec::is_empty) {
                    continue;
                }
                let cursor = p.child(node, bit);
                if !admits_leaf(cursor) {
                    continue;
                }
                out.push((
                    score,
                    AuxFilteredPatternList {
                        list: PatternList { cursor, ranges },
                        aux,
                    },
                ));
            }
        },
    )
}
