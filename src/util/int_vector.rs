// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width packed integers.
//!
//! Values are stored back to back at `width` bits each, little-endian within
//! a run of `u64` words. A value may straddle two words.

use std::io::{Read, Write};

use crate::binary::{read_len, read_u8, read_words, write_u64, write_u8, write_words, MAX_WORDS};
use crate::error::{Error, Result};

use super::bits_needed;

/// Packed vector of `width`-bit unsigned integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVector {
    words: Vec<u64>,
    len: usize,
    width: u32,
}

impl IntVector {
    /// Pack `values` using the smallest width that fits the largest value.
    pub fn from_values(values: &[u64]) -> Self {
        let max = values.iter().copied().max().unwrap_or(0);
        Self::with_width(values, bits_needed(max))
    }

    /// Pack `values` at an explicit `width` (1..=64). Values are masked.
    pub fn with_width(values: &[u64], width: u32) -> Self {
        debug_assert!((1..=64).contains(&width), "width must be in 1..=64");
        let total_bits = values.len() * width as usize;
        let mut words = vec![0u64; total_bits.div_ceil(64)];
        let mask = Self::mask(width);

        for (i, &value) in values.iter().enumerate() {
            let value = value & mask;
            let bit = i * width as usize;
            let (word, offset) = (bit / 64, (bit % 64) as u32);
            words[word] |= value << offset;
            if offset + width > 64 {
                words[word + 1] |= value >> (64 - offset);
            }
        }

        Self {
            words,
            len: values.len(),
            width,
        }
    }

    #[inline]
    fn mask(width: u32) -> u64 {
        if width == 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        }
    }

    /// Value at `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u64> {
        if index >= self.len {
            return None;
        }
        let bit = index * self.width as usize;
        let (word, offset) = (bit / 64, (bit % 64) as u32);
        let mut value = self.words[word] >> offset;
        if offset + self.width > 64 {
            value |= self.words[word + 1] << (64 - offset);
        }
        Some(value & Self::mask(self.width))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Heap bytes held by the packed words.
    pub fn alloc_size(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }

    /// Layout: `[width u8][len u64][words]`.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u8(w, self.width as u8)?;
        write_u64(w, self.len as u64)?;
        write_words(w, &self.words)?;
        Ok(())
    }

    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        let width = read_u8(r)? as u32;
        if !(1..=64).contains(&width) {
            return Err(Error::corrupt(format!("int vector width {}", width)));
        }
        let len = read_len(r, MAX_WORDS * 64, "int vector length")?;
        let words = read_words(r, MAX_WORDS)?;
        if words.len() != (len * width as usize).div_ceil(64) {
            return Err(Error::corrupt(format!(
                "int vector of {} × {} bits stored in {} words",
                len,
                width,
                words.len()
            )));
        }
        Ok(Self { words, len, width })
    }
}
