// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Balanced encoding: the wavelet matrix.
//!
//! Every symbol gets a fixed `⌈log2 σ⌉`-bit code (its binary value, MSB
//! first). Level `l` stores bit `l` of every element; the next level holds
//! the same elements stably partitioned, zeros first. `zeros[l]` is where the
//! ones start on level `l + 1`.
//!
//! After the last level the elements are ordered by bit-reversed symbol, so
//! each symbol owns one contiguous block. `leaf_starts[c]` is the start of
//! that block, which is where `select` begins its walk up.

use std::io::{Read, Write};

use crate::binary::{read_u8, write_u8};
use crate::error::{Error, Result};
use crate::succinct::{BitVector, BitVectorBuilder};
use crate::types::MatchRange;
use crate::util::ceil_log2;

use super::traversal::{Cursor, Partition};
use super::{Shape, WaveletSequence};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Level {
    bits: BitVector,
    zeros: usize,
}

impl Level {
    fn new(bits: BitVector) -> Self {
        let zeros = bits.count_zeros();
        Self { bits, zeros }
    }

    /// Position on the next level of the element at `pos` with bit `bit`.
    #[inline]
    fn map(&self, pos: usize, bit: bool) -> usize {
        if bit {
            self.zeros + self.bits.rank1(pos)
        } else {
            self.bits.rank0(pos)
        }
    }

    /// Position on this level of the element at `pos` on the next level.
    #[inline]
    fn unmap(&self, pos: usize, bit: bool) -> Option<usize> {
        if bit {
            pos.checked_sub(self.zeros)
                .and_then(|p| self.bits.select1(p))
        } else {
            self.bits.select0(pos)
        }
    }
}

/// Node of the implicit matrix tree: a level and the code bits chosen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixNode {
    level: usize,
    prefix: u32,
}

/// Wavelet matrix over `0..alphabet_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveletMatrix {
    levels: Vec<Level>,
    leaf_starts: Vec<usize>,
    len: usize,
}

impl WaveletMatrix {
    /// Number of levels for an alphabet of `alphabet_size` symbols.
    pub fn level_count(alphabet_size: u32) -> usize {
        ceil_log2(alphabet_size as u64) as usize
    }

    /// Build from validated symbols. `counts[c]` is the frequency of `c`.
    pub(crate) fn build(symbols: &[u32], alphabet_size: u32, counts: &[usize]) -> Self {
        let level_count = Self::level_count(alphabet_size);
        let mut current: Vec<u32> = symbols.to_vec();
        let mut levels = Vec::with_capacity(level_count);

        for l in 0..level_count {
            let shift = level_count - 1 - l;
            let mut builder = BitVectorBuilder::with_capacity(current.len());
            let mut zeros = Vec::with_capacity(current.len());
            let mut ones = Vec::new();
            for &symbol in &current {
                let bit = (symbol >> shift) & 1 == 1;
                builder.push(bit);
                if bit {
                    ones.push(symbol);
                } else {
                    zeros.push(symbol);
                }
            }
            levels.push(Level::new(builder.build()));
            zeros.extend_from_slice(&ones);
            current = zeros;
        }

        let leaf_starts = Self::leaf_starts(level_count, counts);
        Self {
            levels,
            leaf_starts,
            len: symbols.len(),
        }
    }

    /// Block starts in bit-reversed symbol order.
    fn leaf_starts(level_count: usize, counts: &[usize]) -> Vec<usize> {
        let reverse = |c: u32| c.reverse_bits() >> (32 - level_count as u32);
        let mut order: Vec<u32> = (0..counts.len() as u32).collect();
        order.sort_unstable_by_key(|&c| reverse(c));

        let mut starts = vec![0usize; counts.len()];
        let mut offset = 0;
        for c in order {
            starts[c as usize] = offset;
            offset += counts[c as usize];
        }
        starts
    }

    #[inline]
    fn bit_of(&self, symbol: u32, level: usize) -> bool {
        (symbol >> (self.levels.len() - 1 - level)) & 1 == 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    pub fn access(&self, pos: usize) -> Option<u32> {
        self.access_rank(pos).map(|(symbol, _)| symbol)
    }

    /// Symbol at `pos` and its rank at `pos`, in one descent.
    pub fn access_rank(&self, mut pos: usize) -> Option<(u32, usize)> {
        if pos >= self.len {
            return None;
        }
        let mut symbol = 0u32;
        for level in &self.levels {
            let bit = level.bits.get(pos);
            symbol = (symbol << 1) | bit as u32;
            pos = level.map(pos, bit);
        }
        let start = self.leaf_starts.get(symbol as usize).copied()?;
        Some((symbol, pos - start))
    }

    /// Occurrences of `symbol` in `[0, pos)`; 0 outside the alphabet.
    pub fn rank(&self, symbol: u32, pos: usize) -> usize {
        let Some(&start) = self.leaf_starts.get(symbol as usize) else {
            return 0;
        };
        let mut pos = pos.min(self.len);
        for (l, level) in self.levels.iter().enumerate() {
            pos = level.map(pos, self.bit_of(symbol, l));
        }
        pos.saturating_sub(start)
    }

    /// Position of occurrence `k` of `symbol`, walking up from its block.
    ///
    /// The caller has checked `k < freq(symbol)`.
    pub fn select(&self, symbol: u32, k: usize) -> Option<usize> {
        let start = *self.leaf_starts.get(symbol as usize)?;
        let mut pos = start + k;
        for (l, level) in self.levels.iter().enumerate().rev() {
            pos = level.unmap(pos, self.bit_of(symbol, l))?;
        }
        Some(pos)
    }

    /// `(recorded zeros, counted zeros, bit count)` per level.
    pub(crate) fn level_populations(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.levels
            .iter()
            .map(|l| (l.zeros, l.bits.count_zeros(), l.bits.len()))
    }

    pub fn alloc_size(&self) -> usize {
        self.levels.iter().map(|l| l.bits.alloc_size()).sum::<usize>()
            + self.leaf_starts.len() * std::mem::size_of::<usize>()
    }

    /// Layout: `[level_count u8][bit vector × level_count]`.
    pub(crate) fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u8(w, self.levels.len() as u8)?;
        for level in &self.levels {
            level.bits.save(w)?;
        }
        Ok(())
    }

    pub(crate) fn load<R: Read>(
        r: &mut R,
        alphabet_size: u32,
        len: usize,
        counts: &[usize],
    ) -> Result<Self> {
        let level_count = read_u8(r)? as usize;
        let expected = Self::level_count(alphabet_size);
        if level_count != expected {
            return Err(Error::SerializationMismatch {
                what: "wavelet matrix level count",
                expected: expected as u64,
                found: level_count as u64,
            });
        }

        let mut levels = Vec::with_capacity(level_count);
        for l in 0..level_count {
            let bits = BitVector::load(r)?;
            if bits.len() != len {
                return Err(Error::corrupt(format!(
                    "wavelet level {} has {} bits, expected {}",
                    l,
                    bits.len(),
                    len
                )));
            }
            levels.push(Level::new(bits));
        }

        let matrix = Self {
            leaf_starts: Self::leaf_starts(level_count, counts),
            levels,
            len,
        };

        // Every symbol's block must actually hold that symbol.
        for (symbol, &count) in counts.iter().enumerate() {
            if count > 0 && matrix.rank(symbol as u32, len) != count {
                return Err(Error::corrupt(format!(
                    "wavelet levels disagree with occurrence count of symbol {}",
                    symbol
                )));
            }
        }
        Ok(matrix)
    }
}

impl Partition for WaveletMatrix {
    type Node = MatrixNode;

    fn root(&self) -> Cursor<MatrixNode> {
        Cursor::Node(MatrixNode {
            level: 0,
            prefix: 0,
        })
    }

    #[inline]
    fn split(&self, node: MatrixNode, range: MatchRange) -> [MatchRange; 2] {
        let level = &self.levels[node.level];
        [
            MatchRange::new(level.map(range.start, false), level.map(range.end, false)),
            MatchRange::new(level.map(range.start, true), level.map(range.end, true)),
        ]
    }

    #[inline]
    fn child(&self, node: MatrixNode, bit: usize) -> Cursor<MatrixNode> {
        let prefix = (node.prefix << 1) | bit as u32;
        if node.level + 1 == self.levels.len() {
            Cursor::Leaf(prefix)
        } else {
            Cursor::Node(MatrixNode {
                level: node.level + 1,
                prefix,
            })
        }
    }

    fn lockstep<'a>(&self, other: &'a WaveletSequence) -> Option<&'a Self> {
        match other.shape() {
            Shape::Balanced(matrix) if matrix.levels() == self.levels() => Some(matrix),
            _ => None,
        }
    }
}
