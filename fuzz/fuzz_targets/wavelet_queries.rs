// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Wavelet sequence queries on arbitrary sequences and ranges.
//!
//! Rank and access are checked against a scan; top-K must come out in
//! non-increasing score order with distinct symbols, for both encodings.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wavedex::{WaveletEncoding, WaveletSequence, WeightedRange};

#[derive(Arbitrary, Debug)]
struct Input {
    symbols: Vec<u16>,
    sigma: u16,
    prefix_code: bool,
    ranges: Vec<(u16, u16, u8)>,
    top_k: u8,
}

fuzz_target!(|input: Input| {
    let sigma = u32::from(input.sigma.max(1));
    let seq: Vec<u32> = input.symbols.iter().map(|&s| u32::from(s) % sigma).collect();
    let encoding = if input.prefix_code {
        WaveletEncoding::PrefixCode
    } else {
        WaveletEncoding::Balanced
    };
    let Ok(ws) = WaveletSequence::build(&seq, sigma, encoding) else {
        assert!(seq.is_empty());
        return;
    };

    for (i, &s) in seq.iter().enumerate().take(256) {
        let (got, rank) = ws.access_rank(i).expect("in range");
        assert_eq!(got, s);
        assert_eq!(rank, seq[..i].iter().filter(|&&x| x == s).count());
    }

    let ranges: Vec<WeightedRange> = input
        .ranges
        .iter()
        .map(|&(a, b, w)| {
            let (a, b) = (usize::from(a.min(b)), usize::from(a.max(b)));
            WeightedRange::new(a..b, f64::from(w))
        })
        .collect();
    let results = ws.top_k_union(&ranges, usize::from(input.top_k));
    assert!(results.len() <= usize::from(input.top_k));
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
        assert_ne!(pair[0].symbol, pair[1].symbol);
    }
});
