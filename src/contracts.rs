// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Runtime contracts for freshly built structures.
//!
//! Debug-mode assertions over the structural invariants every query relies
//! on. They compile to nothing in release builds and run once after each
//! build in debug builds and tests.
//!
//! # INVARIANTS (DO NOT REMOVE THESE CHECKS)
//!
//! | Contract Function              | Invariant                                           |
//! |--------------------------------|-----------------------------------------------------|
//! | `check_occurrence_table`       | `occ` monotone, `occ[0] = 0`, `occ[σ] = n`          |
//! | `check_level_populations`      | recorded zero count = counted zeros, width = n      |
//! | `check_prefix_code`            | children hold what parents route; frequent ⇒ short  |
//! | `check_delimiter_total`        | document spans add up to the text length            |
//! | `check_sample_table`           | one sample per `r` positions, position 0 sampled    |
//!
//! # Usage
//!
//! ```ignore
//! // In debug builds, this panics if invariant is violated
//! contracts::check_wavelet_sequence(&sequence);
//!
//! // In release builds, this is a no-op
//! ```

use crate::succinct::{BitVector, CumulativeArray};
use crate::wavelet::{PrefixCodeTree, Shape, WaveletMatrix, WaveletSequence};

// ============================================================================
// WAVELET SEQUENCE CONTRACTS
// ============================================================================

/// Check every invariant of a built wavelet sequence.
#[inline]
pub fn check_wavelet_sequence(sequence: &WaveletSequence) {
    if !cfg!(debug_assertions) {
        return;
    }
    check_occurrence_table(sequence.occurrences(), sequence.len());
    match sequence.shape() {
        Shape::Balanced(matrix) => check_level_populations(matrix, sequence.len()),
        Shape::PrefixCode(tree) => check_prefix_code(tree, sequence.occurrences()),
    }
}

/// Check that the occurrence table is a cumulative count ending at `len`.
///
/// # Panics (debug builds only)
/// Panics if the table is non-monotone or does not span `[0, len]`.
#[inline]
pub fn check_occurrence_table(occ: &[usize], len: usize) {
    debug_assert!(
        occ.first() == Some(&0),
        "Contract violation: occ[0] = {:?}, expected 0",
        occ.first()
    );
    debug_assert!(
        occ.last() == Some(&len),
        "Contract violation: occ[σ] = {:?}, expected {}",
        occ.last(),
        len
    );
    for (c, pair) in occ.windows(2).enumerate() {
        debug_assert!(
            pair[0] <= pair[1],
            "Contract violation: occ[{}] = {} > occ[{}] = {}",
            c,
            pair[0],
            c + 1,
            pair[1]
        );
    }
}

/// Check that each matrix level holds `len` bits and its recorded zero count.
#[inline]
pub fn check_level_populations(matrix: &WaveletMatrix, len: usize) {
    for (l, (recorded, counted, bits)) in matrix.level_populations().enumerate() {
        debug_assert!(
            bits == len,
            "Contract violation: level {} has {} bits, sequence has {}",
            l,
            bits,
            len
        );
        debug_assert!(
            recorded == counted,
            "Contract violation: level {} records {} zeros, holds {}",
            l,
            recorded,
            counted
        );
    }
}

/// Check node populations and code-length monotonicity of a prefix-code tree.
///
/// A symbol that occurs strictly more often than another never gets a longer
/// code.
#[inline]
pub fn check_prefix_code(tree: &PrefixCodeTree, occ: &[usize]) {
    for (i, (routed, bits)) in tree.node_populations().enumerate() {
        debug_assert!(
            routed == bits,
            "Contract violation: node {} holds {} bits, parent routes {}",
            i,
            bits,
            routed
        );
    }

    let mut by_frequency: Vec<(usize, u8)> = occ
        .windows(2)
        .enumerate()
        .filter_map(|(s, w)| {
            let freq = w[1] - w[0];
            tree.code_len(s as u32).map(|len| (freq, len))
        })
        .collect();
    by_frequency.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for pair in by_frequency.windows(2) {
        let ((f_hi, len_hi), (f_lo, len_lo)) = (pair[0], pair[1]);
        debug_assert!(
            f_hi == f_lo || len_hi <= len_lo,
            "Contract violation: frequency {} got code length {}, frequency {} got {}",
            f_hi,
            len_hi,
            f_lo,
            len_lo
        );
    }
}

// ============================================================================
// FM-INDEX CONTRACTS
// ============================================================================

/// Check that per-document spans add up to the indexed text length.
#[inline]
pub fn check_delimiter_total(delimiters: &CumulativeArray, text_len: usize) {
    debug_assert!(
        delimiters.total() == text_len as u64,
        "Contract violation: document spans sum to {}, text has {} symbols",
        delimiters.total(),
        text_len
    );
}

/// Check that row sampling matches a text sampling rate of `sample_rate`.
#[inline]
pub fn check_sample_table(sampled_rows: &BitVector, sample_rate: u32, text_len: usize) {
    let expected = text_len.div_ceil(sample_rate.max(1) as usize);
    debug_assert!(
        sampled_rows.count_ones() == expected,
        "Contract violation: {} sampled rows, expected {} for rate {} over {} symbols",
        sampled_rows.count_ones(),
        expected,
        sample_rate,
        text_len
    );
}
