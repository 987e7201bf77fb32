// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! Brute-force oracles that the succinct structures are checked against,
//! plus small corpus fixtures. Always compiled, hidden from documentation.

#![doc(hidden)]

use std::collections::BTreeMap;

use crate::build::{Corpus, CorpusDocument};
use crate::types::{MatchRange, RankedSymbol, WeightedRange};

/// Occurrences of `symbol` in `seq[..pos]`.
pub fn naive_rank(seq: &[u32], symbol: u32, pos: usize) -> usize {
    seq[..pos.min(seq.len())].iter().filter(|&&s| s == symbol).count()
}

/// Position of the `k`-th (0-based) `symbol`.
pub fn naive_select(seq: &[u32], symbol: u32, k: usize) -> Option<usize> {
    seq.iter()
        .enumerate()
        .filter(|(_, &s)| s == symbol)
        .nth(k)
        .map(|(i, _)| i)
}

/// Score of every symbol: summed weight of the ranges it appears in.
pub fn naive_scores(seq: &[u32], ranges: &[WeightedRange]) -> BTreeMap<u32, f64> {
    let mut scores = BTreeMap::new();
    for wr in ranges.iter().filter(|wr| wr.weight > 0.0) {
        let end = wr.range.end.min(seq.len());
        let mut seen: Vec<u32> = seq[wr.range.start.min(end)..end].to_vec();
        seen.sort_unstable();
        seen.dedup();
        for s in seen {
            *scores.entry(s).or_insert(0.0) += wr.weight;
        }
    }
    scores
}

/// Top `k` of [`naive_scores`], by score then symbol.
pub fn naive_top_k(seq: &[u32], ranges: &[WeightedRange], k: usize) -> Vec<RankedSymbol> {
    let mut ranked: Vec<RankedSymbol> = naive_scores(seq, ranges)
        .into_iter()
        .map(|(symbol, score)| RankedSymbol { symbol, score })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.symbol.cmp(&b.symbol)));
    ranked.truncate(k);
    ranked
}

/// Symbols missing from at most `threshold` of `ranges` (but present in at
/// least one), ascending.
pub fn naive_intersect(seq: &[u32], ranges: &[MatchRange], threshold: usize) -> Vec<u32> {
    let required = ranges.len().saturating_sub(threshold).max(1);
    let weighted: Vec<WeightedRange> = ranges.iter().map(|&r| WeightedRange::new(r, 1.0)).collect();
    naive_scores(seq, &weighted)
        .into_iter()
        .filter(|&(_, hits)| hits as usize >= required)
        .map(|(s, _)| s)
        .collect()
}

/// Occurrences of `pattern` in `text`, overlaps included.
pub fn naive_count(text: &[u8], pattern: &[u8]) -> usize {
    if pattern.is_empty() || pattern.len() > text.len() {
        return 0;
    }
    text.windows(pattern.len()).filter(|w| *w == pattern).count()
}

/// 1-based ids of the documents containing `pattern`.
pub fn naive_doc_ids<D: AsRef<[u8]>>(documents: &[D], pattern: &[u8]) -> Vec<u32> {
    documents
        .iter()
        .enumerate()
        .filter(|(_, d)| naive_count(d.as_ref(), pattern) > 0)
        .map(|(i, _)| i as u32 + 1)
        .collect()
}

/// A document with one `body` property and optional `tag` filter values.
pub fn make_doc(id: &str, body: &str, tags: &[&str]) -> CorpusDocument {
    let mut doc = CorpusDocument {
        id: Some(id.to_string()),
        ..CorpusDocument::default()
    };
    doc.properties.insert("body".to_string(), body.to_string());
    if !tags.is_empty() {
        doc.filters
            .insert("tag".to_string(), tags.iter().map(|t| t.to_string()).collect());
    }
    doc
}

/// A body-only corpus, keys `d1`, `d2`, ...
pub fn make_corpus<S: AsRef<str>>(bodies: &[S]) -> Corpus {
    Corpus {
        documents: bodies
            .iter()
            .enumerate()
            .map(|(i, b)| make_doc(&format!("d{}", i + 1), b.as_ref(), &[]))
            .collect(),
    }
}
