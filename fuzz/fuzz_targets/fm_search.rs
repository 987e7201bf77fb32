// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! FM-index construction and search over arbitrary documents.
//!
//! Counts are compared with a scan of the documents, and every located
//! position must actually hold the pattern.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wavedex::{FmIndex, IndexConfig};

#[derive(Arbitrary, Debug)]
struct Input {
    documents: Vec<Vec<u8>>,
    pattern: Vec<u8>,
    sample_rate: u8,
}

fuzz_target!(|input: Input| {
    let config = IndexConfig {
        sample_rate: u32::from(input.sample_rate.max(1)),
        ..IndexConfig::default()
    };
    let docs: Vec<Vec<u8>> = input
        .documents
        .into_iter()
        .take(16)
        .map(|d| d.into_iter().filter(|&b| b != config.delimiter).take(256).collect())
        .collect();
    let Ok(index) = FmIndex::build(&docs, &config) else {
        assert!(docs.is_empty());
        return;
    };

    let pattern: Vec<u8> = input.pattern.into_iter().take(16).collect();
    if pattern.is_empty() || pattern.contains(&config.delimiter) {
        return;
    }
    let expected: usize = docs
        .iter()
        .map(|d| d.windows(pattern.len()).filter(|w| *w == pattern.as_slice()).count())
        .sum();
    assert_eq!(index.count(&pattern), expected);

    let mut text = Vec::new();
    for d in &docs {
        text.extend_from_slice(d);
        text.push(config.delimiter);
    }
    let m = index.backward_search(&pattern);
    let suffix = &pattern[pattern.len() - m.matched..];
    for pos in index.locate(m.range, 64) {
        assert_eq!(&text[pos..pos + m.matched], suffix);
    }
});
