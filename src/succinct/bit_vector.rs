// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Rank/select bit vector.
//!
//! Rank9 with an interleaved (blocked) layout. Each 512-bit block is stored
//! as 10 x 64-bit words:
//! - Word 0: absolute rank (number of 1s before this block)
//! - Word 1: relative ranks (7 x 9-bit cumulative counts within the block)
//! - Word 2-9: raw data (512 bits)
//!
//! One extra sentinel block closes the storage so `rank1(len)` never needs a
//! bounds check. Select uses a coarse index (the block holding every 512th
//! one or zero) to narrow a binary search over block ranks.

use std::fmt;
use std::io::{Read, Write};

use crate::binary::{read_len, read_words, write_u64, write_words, MAX_WORDS};
use crate::error::{Error, Result};
use crate::util::select_in_word;

const BLOCK_BITS: usize = 512;
const BLOCK_WORDS: usize = 10;

/// Immutable bit vector with constant-time rank and logarithmic select.
#[derive(Clone, PartialEq, Eq)]
pub struct BitVector {
    /// Interleaved data: [abs_rank, rel_ranks, data0, ..., data7, ...]
    storage: Vec<u64>,
    /// Block index for every 512th one-bit
    select1_index: Vec<u32>,
    /// Block index for every 512th zero-bit
    select0_index: Vec<u32>,
    len: usize,
    ones: usize,
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitVector")
            .field("len", &self.len)
            .field("ones", &self.ones)
            .finish()
    }
}

/// Accumulates bits one at a time before freezing them into a [`BitVector`].
#[derive(Debug, Default, Clone)]
pub struct BitVectorBuilder {
    words: Vec<u64>,
    len: usize,
}

impl BitVectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(64)),
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, bit: bool) {
        if self.len % 64 == 0 {
            self.words.push(0);
        }
        if bit {
            self.words[self.len / 64] |= 1u64 << (self.len % 64);
        }
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn build(self) -> BitVector {
        BitVector::new(&self.words, self.len)
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut builder = BitVectorBuilder::new();
        for bit in iter {
            builder.push(bit);
        }
        builder.build()
    }
}

impl BitVector {
    /// Build from raw little-endian words holding `len` bits.
    ///
    /// Bits at positions `>= len` in the last word are ignored.
    pub fn new(bits: &[u64], len: usize) -> Self {
        let num_blocks = len.div_ceil(BLOCK_BITS);
        let mut storage = vec![0u64; num_blocks * BLOCK_WORDS + BLOCK_WORDS];
        let mut select1_index = Vec::new();
        let mut select0_index = Vec::new();

        let mut total_rank = 0u64;
        let mut next_select1_threshold = 0u64;
        let mut next_select0_threshold = 0u64;

        for i in 0..num_blocks {
            let base = i * BLOCK_WORDS;
            storage[base] = total_rank;
            let total_zeros = (i * BLOCK_BITS) as u64 - total_rank;

            while total_rank >= next_select1_threshold {
                select1_index.push(i as u32);
                next_select1_threshold += BLOCK_BITS as u64;
            }
            while total_zeros >= next_select0_threshold {
                select0_index.push(i as u32);
                next_select0_threshold += BLOCK_BITS as u64;
            }

            let mut relative_ranks = 0u64;
            let mut current_rel = 0u64;

            for j in 0..8 {
                let data_idx = i * 8 + j;
                let mut word = bits.get(data_idx).copied().unwrap_or(0);
                let word_start = data_idx * 64;
                if word_start + 64 > len {
                    let keep = len.saturating_sub(word_start);
                    word &= if keep == 0 { 0 } else { u64::MAX >> (64 - keep) };
                }
                storage[base + 2 + j] = word;

                if j > 0 {
                    relative_ranks |= current_rel << (9 * (j - 1));
                }
                current_rel += word.count_ones() as u64;
            }
            storage[base + 1] = relative_ranks;
            total_rank += current_rel;
        }

        // Sentinel
        let last_base = num_blocks * BLOCK_WORDS;
        storage[last_base] = total_rank;
        let total_zeros = (num_blocks * BLOCK_BITS) as u64 - total_rank;
        while total_rank >= next_select1_threshold {
            select1_index.push(num_blocks as u32);
            next_select1_threshold += BLOCK_BITS as u64;
        }
        while total_zeros >= next_select0_threshold {
            select0_index.push(num_blocks as u32);
            next_select0_threshold += BLOCK_BITS as u64;
        }

        Self {
            storage,
            select1_index,
            select0_index,
            len,
            ones: total_rank as usize,
        }
    }

    /// Total number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Number of unset bits.
    pub fn count_zeros(&self) -> usize {
        self.len - self.ones
    }

    /// Bit at index `i`; `false` past the end.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        let block_idx = i / BLOCK_BITS;
        let word_in_block = (i % BLOCK_BITS) / 64;
        let word = self.storage[block_idx * BLOCK_WORDS + 2 + word_in_block];
        (word >> (i % 64)) & 1 != 0
    }

    /// Number of set bits in `[0, i)`. `i` is clamped to `len`.
    #[inline]
    pub fn rank1(&self, i: usize) -> usize {
        if i == 0 {
            return 0;
        }
        let i = i.min(self.len);
        let block_idx = i / BLOCK_BITS;
        let sub_block_idx = (i % BLOCK_BITS) / 64;
        let bit_offset = i % 64;

        let base = block_idx * BLOCK_WORDS;
        let mut rank = self.storage[base] as usize;

        if sub_block_idx > 0 {
            let relative_ranks = self.storage[base + 1];
            rank += ((relative_ranks >> (9 * (sub_block_idx - 1))) & 0x1FF) as usize;
        }

        let word = self.storage[base + 2 + sub_block_idx];
        let mask = (1u64 << bit_offset).wrapping_sub(1);
        rank += (word & mask).count_ones() as usize;

        rank
    }

    /// Number of unset bits in `[0, i)`. `i` is clamped to `len`.
    #[inline]
    pub fn rank0(&self, i: usize) -> usize {
        let i = i.min(self.len);
        i - self.rank1(i)
    }

    /// Position of the `k`-th (0-based) set bit.
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones {
            return None;
        }

        let target = k + 1;
        let select_idx = k / BLOCK_BITS;
        let mut block_low = self.select1_index[select_idx] as usize;
        let mut block_high = match self.select1_index.get(select_idx + 1) {
            Some(&next) => next as usize + 1,
            None => self.storage.len() / BLOCK_WORDS,
        };

        while block_low < block_high {
            let mid = block_low + (block_high - block_low) / 2;
            if (self.storage[mid * BLOCK_WORDS] as usize) < target {
                block_low = mid + 1;
            } else {
                block_high = mid;
            }
        }
        let block_idx = block_low - 1;
        let base = block_idx * BLOCK_WORDS;
        let mut remaining = target - self.storage[base] as usize;

        let relative_ranks = self.storage[base + 1];
        let mut sub_block_idx = 0;
        for j in 1..8 {
            let rel_rank = ((relative_ranks >> (9 * (j - 1))) & 0x1FF) as usize;
            if rel_rank < remaining {
                sub_block_idx = j;
            } else {
                break;
            }
        }
        if sub_block_idx > 0 {
            remaining -= ((relative_ranks >> (9 * (sub_block_idx - 1))) & 0x1FF) as usize;
        }

        let word = self.storage[base + 2 + sub_block_idx];
        let pos_in_word = select_in_word(word, (remaining - 1) as u32) as usize;
        Some(block_idx * BLOCK_BITS + sub_block_idx * 64 + pos_in_word)
    }

    /// Position of the `k`-th (0-based) unset bit.
    pub fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.count_zeros() {
            return None;
        }

        let target = k + 1;
        let select_idx = k / BLOCK_BITS;
        let mut block_low = self.select0_index[select_idx] as usize;
        let mut block_high = match self.select0_index.get(select_idx + 1) {
            Some(&next) => next as usize + 1,
            None => self.storage.len() / BLOCK_WORDS,
        };

        while block_low < block_high {
            let mid = block_low + (block_high - block_low) / 2;
            let rank0_at_mid = mid * BLOCK_BITS - self.storage[mid * BLOCK_WORDS] as usize;
            if rank0_at_mid < target {
                block_low = mid + 1;
            } else {
                block_high = mid;
            }
        }
        let block_idx = block_low - 1;
        let base = block_idx * BLOCK_WORDS;
        let mut remaining = target - (block_idx * BLOCK_BITS - self.storage[base] as usize);

        let relative_ranks1 = self.storage[base + 1];
        let mut sub_block_idx = 0;
        for j in 1..8 {
            let rel_rank1 = ((relative_ranks1 >> (9 * (j - 1))) & 0x1FF) as usize;
            if j * 64 - rel_rank1 < remaining {
                sub_block_idx = j;
            } else {
                break;
            }
        }
        if sub_block_idx > 0 {
            let rel_rank1 = ((relative_ranks1 >> (9 * (sub_block_idx - 1))) & 0x1FF) as usize;
            remaining -= sub_block_idx * 64 - rel_rank1;
        }

        let word = !self.storage[base + 2 + sub_block_idx];
        let pos_in_word = select_in_word(word, (remaining - 1) as u32) as usize;
        Some(block_idx * BLOCK_BITS + sub_block_idx * 64 + pos_in_word)
    }

    /// Raw data words, without the rank directory.
    fn data_words(&self) -> Vec<u64> {
        let word_count = self.len.div_ceil(64);
        (0..word_count)
            .map(|w| self.storage[(w / 8) * BLOCK_WORDS + 2 + w % 8])
            .collect()
    }

    /// Heap bytes held by data, rank directory and select indexes.
    pub fn alloc_size(&self) -> usize {
        self.storage.len() * std::mem::size_of::<u64>()
            + (self.select1_index.len() + self.select0_index.len()) * std::mem::size_of::<u32>()
    }

    /// Layout: `[len u64][word_count u64][data words]`.
    ///
    /// Only the data is stored; the rank and select directories are rebuilt
    /// on load.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, self.len as u64)?;
        write_words(w, &self.data_words())?;
        Ok(())
    }

    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        let len = read_len(r, MAX_WORDS * 64, "bit vector length")?;
        let words = read_words(r, MAX_WORDS)?;
        if words.len() != len.div_ceil(64) {
            return Err(Error::corrupt(format!(
                "bit vector of {} bits stored in {} words",
                len,
                words.len()
            )));
        }
        Ok(Self::new(&words, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_select(bits: &[bool], value: bool, k: usize) -> Option<usize> {
        bits.iter()
            .enumerate()
            .filter(|&(_, &b)| b == value)
            .nth(k)
            .map(|(i, _)| i)
    }

    #[test]
    fn rank_basic() {
        let bv = BitVector::new(&[0b1011, 0b1101], 128);
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.rank1(1), 1);
        assert_eq!(bv.rank1(4), 3);
        assert_eq!(bv.rank0(4), 1);
        assert!(bv.get(0));
        assert!(!bv.get(2));
        assert!(!bv.get(500));
    }

    #[test]
    fn select_basic() {
        let bv = BitVector::new(&[0b1011], 64);
        assert_eq!(bv.select1(0), Some(0));
        assert_eq!(bv.select1(1), Some(1));
        assert_eq!(bv.select1(2), Some(3));
        assert_eq!(bv.select1(3), None);

        assert_eq!(bv.select0(0), Some(2));
        assert_eq!(bv.select0(1), Some(4));
        assert_eq!(bv.select0(60), Some(63));
        assert_eq!(bv.select0(61), None);
    }

    #[test]
    fn trailing_garbage_bits_are_masked() {
        let bv = BitVector::new(&[u64::MAX], 3);
        assert_eq!(bv.count_ones(), 3);
        assert_eq!(bv.count_zeros(), 0);
        assert_eq!(bv.select0(0), None);
    }

    #[test]
    fn multi_block_rank_select_agree_with_scan() {
        let bits: Vec<bool> = (0..5000).map(|i| (i * 31 + i / 7) % 5 < 2).collect();
        let bv: BitVector = bits.iter().copied().collect();

        let mut ones = 0;
        for (i, &bit) in bits.iter().enumerate() {
            assert_eq!(bv.rank1(i), ones, "rank1({})", i);
            assert_eq!(bv.get(i), bit);
            if bit {
                ones += 1;
            }
        }
        assert_eq!(bv.rank1(bits.len()), ones);
        assert_eq!(bv.rank1(bits.len() + 100), ones);

        for k in (0..ones).step_by(37) {
            assert_eq!(bv.select1(k), naive_select(&bits, true, k));
        }
        for k in (0..bits.len() - ones).step_by(41) {
            assert_eq!(bv.select0(k), naive_select(&bits, false, k));
        }
    }

    #[test]
    fn block_aligned_length() {
        let bv: BitVector = (0..1024).map(|i| i % 2 == 0).collect();
        assert_eq!(bv.rank1(1024), 512);
        assert_eq!(bv.select1(511), Some(1022));
        assert_eq!(bv.select0(511), Some(1023));
    }

    #[test]
    fn empty_vector() {
        let bv = BitVectorBuilder::new().build();
        assert!(bv.is_empty());
        assert_eq!(bv.rank1(0), 0);
        assert_eq!(bv.rank0(10), 0);
        assert_eq!(bv.select1(0), None);
        assert_eq!(bv.select0(0), None);
    }

    #[test]
    fn save_load_preserves_answers() {
        let bv: BitVector = (0..2000).map(|i| i % 3 == 1).collect();
        let mut buf = Vec::new();
        bv.save(&mut buf).unwrap();
        let loaded = BitVector::load(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded, bv);
        assert_eq!(loaded.select1(100), bv.select1(100));
    }
}
