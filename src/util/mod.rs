// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bit-twiddling helpers and the packed integer vector.
//!
//! This is the grab-bag of word-level helpers the succinct structures share.

mod int_vector;

pub use int_vector::IntVector;

/// Number of bits needed to represent every value in `0..=max_value`.
///
/// Always at least 1, so a vector of zeros still has a well-defined width.
#[inline]
pub fn bits_needed(max_value: u64) -> u32 {
    (64 - max_value.leading_zeros()).max(1)
}

/// Number of bits needed to distinguish `count` symbols (`⌈log2 count⌉`, min 1).
#[inline]
pub fn ceil_log2(count: u64) -> u32 {
    if count <= 2 {
        1
    } else {
        64 - (count - 1).leading_zeros()
    }
}

/// Position of the `k`-th (0-based) set bit of `word`.
///
/// Clears the lowest set bit `k` times, then takes trailing zeros. Returns 64
/// when `word` has at most `k` set bits.
#[inline]
pub fn select_in_word(mut word: u64, k: u32) -> u32 {
    for _ in 0..k {
        word &= word.wrapping_sub(1);
    }
    word.trailing_zeros()
}
