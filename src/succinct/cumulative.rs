// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Elias–Fano coded prefix sums ("delimiter array").
//!
//! Stores a sequence of non-negative increments as the monotone sequence of
//! their running totals `S_1..S_m`. Each total splits into `low_bits` raw low
//! bits (packed in an [`IntVector`]) and a high part stored in unary in a
//! [`BitVector`]: element `i` sets bit `(S_i >> low_bits) + i`.
//!
//! `prefix_sum(i)` is the total of the first `i` increments, so with document
//! lengths as increments it is the start offset of document `i`.

use std::io::{Read, Write};

use crate::binary::{read_len, read_u64, write_u64, MAX_WORDS};
use crate::error::{Error, Result};
use crate::util::IntVector;

use super::BitVector;

/// Collects increments before freezing them into a [`CumulativeArray`].
#[derive(Debug, Default, Clone)]
pub struct CumulativeArrayBuilder {
    sums: Vec<u64>,
    total: u64,
}

impl CumulativeArrayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one increment.
    pub fn add(&mut self, increment: u64) {
        self.total += increment;
        self.sums.push(self.total);
    }

    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn build(self) -> CumulativeArray {
        let count = self.sums.len();
        let total = self.total;
        let low_bits = if count == 0 || total <= count as u64 {
            0
        } else {
            63 - (total / count as u64).leading_zeros()
        };

        let low_mask = if low_bits == 0 { 0 } else { (1u64 << low_bits) - 1 };
        let lows: Vec<u64> = self.sums.iter().map(|&s| s & low_mask).collect();

        let upper_len = count + (total >> low_bits) as usize + 1;
        let mut upper_words = vec![0u64; upper_len.div_ceil(64)];
        for (i, &s) in self.sums.iter().enumerate() {
            let pos = (s >> low_bits) as usize + i;
            upper_words[pos / 64] |= 1u64 << (pos % 64);
        }

        CumulativeArray {
            low: IntVector::with_width(&lows, low_bits.max(1)),
            high: BitVector::new(&upper_words, upper_len),
            low_bits,
            count,
            total,
        }
    }
}

impl FromIterator<u64> for CumulativeArray {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut builder = CumulativeArrayBuilder::new();
        for increment in iter {
            builder.add(increment);
        }
        builder.build()
    }
}

/// Immutable prefix-sum array with `find` (predecessor search).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeArray {
    low: IntVector,
    high: BitVector,
    low_bits: u32,
    count: usize,
    total: u64,
}

impl CumulativeArray {
    /// Number of increments.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sum of all increments.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Running total after `i` increments (`S_i`, with `S_0 = 0`).
    #[inline]
    fn sum_at(&self, i: usize) -> u64 {
        // S_{i+1} lives at upper one-bit number i.
        let upper = self.high.select1(i).map_or(0, |pos| (pos - i) as u64);
        let low = if self.low_bits == 0 {
            0
        } else {
            self.low.get(i).unwrap_or(0)
        };
        (upper << self.low_bits) | low
    }

    /// Total of the first `index` increments. Clamped to `len()`.
    pub fn prefix_sum(&self, index: usize) -> u64 {
        let index = index.min(self.count);
        if index == 0 {
            0
        } else {
            self.sum_at(index - 1)
        }
    }

    /// The increment at `index`, or `None` past the end.
    pub fn increment(&self, index: usize) -> Option<u64> {
        (index < self.count).then(|| self.prefix_sum(index + 1) - self.prefix_sum(index))
    }

    /// Index `i` whose span `[prefix_sum(i), prefix_sum(i + 1))` contains `value`.
    ///
    /// Zero-length spans never own a value. `None` when `value >= total()`.
    pub fn find(&self, value: u64) -> Option<usize> {
        if value >= self.total {
            return None;
        }

        // Narrow to elements sharing value's high part.
        let high = (value >> self.low_bits) as usize;
        let lo = if high == 0 {
            0
        } else {
            self.high.select0(high - 1).map_or(0, |pos| pos - (high - 1))
        };
        let hi = self
            .high
            .select0(high)
            .map_or(self.count, |pos| pos - high)
            .min(self.count);

        // Count of S_1..S_m that are <= value; S_0 = 0 always is.
        let mut left = lo;
        let mut right = hi;
        while left < right {
            let mid = left + (right - left) / 2;
            if self.sum_at(mid) <= value {
                left = mid + 1;
            } else {
                right = mid;
            }
        }
        Some(left)
    }

    /// Iterator over the stored increments.
    pub fn increments(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.count).map(move |i| self.prefix_sum(i + 1) - self.prefix_sum(i))
    }

    pub fn alloc_size(&self) -> usize {
        self.low.alloc_size() + self.high.alloc_size()
    }

    /// Layout: `[count u64][total u64][low IntVector][high BitVector]`.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, self.count as u64)?;
        write_u64(w, self.total)?;
        self.low.save(w)?;
        self.high.save(w)?;
        Ok(())
    }

    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        let count = read_len(r, MAX_WORDS * 64, "cumulative array count")?;
        let total = read_u64(r)?;
        let low = IntVector::load(r)?;
        let high = BitVector::load(r)?;

        let low_bits = if count == 0 || total <= count as u64 {
            0
        } else {
            63 - (total / count as u64).leading_zeros()
        };
        if low.len() != count
            || high.count_ones() != count
            || high.len() != count + (total >> low_bits) as usize + 1
        {
            return Err(Error::corrupt(format!(
                "cumulative array of {} entries (total {}) has inconsistent parts",
                count, total
            )));
        }

        let array = Self {
            low,
            high,
            low_bits,
            count,
            total,
        };
        if count > 0 && array.sum_at(count - 1) != total {
            return Err(Error::corrupt("cumulative array total does not match its last sum"));
        }
        if low_bits > 0 && array.low.iter().any(|v| v >> low_bits != 0) {
            return Err(Error::corrupt("cumulative array low part is too wide"));
        }
        let mut previous = 0;
        for i in 0..count {
            let sum = array.sum_at(i);
            if sum < previous {
                return Err(Error::corrupt("cumulative array sums are not monotone"));
            }
            previous = sum;
        }
        Ok(array)
    }
}
