// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Wavelet sequences: a static symbol sequence with rank/select.
//!
//! One type, two encodings chosen at build time:
//!
//! | Encoding              | Structure         | Code length  | Best for          |
//! |-----------------------|-------------------|--------------|-------------------|
//! | [`WaveletEncoding::Balanced`]   | wavelet matrix    | `⌈log2 σ⌉`   | dense alphabets   |
//! | [`WaveletEncoding::PrefixCode`] | Huffman tree      | entropy      | skewed alphabets  |
//!
//! On top of access/rank/select, both support the range algorithms used by
//! search: [`WaveletSequence::intersect`] (symbols shared by many ranges) and
//! the `top_k_union*` family (symbols ranked by summed range weights).

mod frontier;
mod matrix;
mod prefix_code;
mod traversal;

use std::io::{Read, Write};

use crate::binary::{
    read_u32, read_u64, read_u8, unwrap_payload, wrap_payload, write_u32, write_u64, write_u8,
    PayloadKind, MAX_ALPHABET_SIZE,
};
use crate::config::WaveletEncoding;
use crate::error::{Error, Result};
use crate::types::{MatchRange, RankedSymbol, WeightedRange};

pub use frontier::FRONTIER_FLOOR;
pub use matrix::{MatrixNode, WaveletMatrix};
pub use prefix_code::{PrefixCodeTree, MAX_PREFIX_CODE_ALPHABET};
pub use traversal::Cursor;

/// The encoding-specific half of a [`WaveletSequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Balanced(WaveletMatrix),
    PrefixCode(PrefixCodeTree),
}

/// Restricts a top-K search to symbols occurring in `ranges` of `sequence`.
///
/// Ranges inside one filter are OR-ed; several filters are AND-ed.
#[derive(Debug, Clone)]
pub struct AuxFilter<'a> {
    pub sequence: &'a WaveletSequence,
    pub ranges: Vec<MatchRange>,
}

/// Immutable sequence over `0..alphabet_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveletSequence {
    alphabet_size: u32,
    len: usize,
    /// `occ[c]` = number of symbols `< c`; `occ[σ] = len`.
    occ: Vec<usize>,
    shape: Shape,
}

/// Dispatch to the shape's [`traversal`] implementation.
macro_rules! with_partition {
    ($self:expr, $p:ident => $body:expr) => {
        match &$self.shape {
            Shape::Balanced($p) => $body,
            Shape::PrefixCode($p) => $body,
        }
    };
}

impl WaveletSequence {
    /// Build over `symbols`, each of which must be `< alphabet_size`.
    pub fn build(symbols: &[u32], alphabet_size: u32, encoding: WaveletEncoding) -> Result<Self> {
        if symbols.is_empty() {
            return Err(Error::EmptyInput("wavelet sequence needs at least one symbol"));
        }
        if alphabet_size == 0 {
            return Err(Error::EmptyAlphabet);
        }
        if encoding == WaveletEncoding::PrefixCode && alphabet_size > MAX_PREFIX_CODE_ALPHABET {
            return Err(Error::AlphabetTooLarge {
                alphabet_size,
                max: MAX_PREFIX_CODE_ALPHABET,
            });
        }

        let mut counts = vec![0usize; alphabet_size as usize];
        for (position, &symbol) in symbols.iter().enumerate() {
            match counts.get_mut(symbol as usize) {
                Some(count) => *count += 1,
                None => {
                    return Err(Error::SymbolOutOfRange {
                        symbol,
                        position,
                        alphabet_size,
                    })
                }
            }
        }

        let shape = match encoding {
            WaveletEncoding::Balanced => {
                Shape::Balanced(WaveletMatrix::build(symbols, alphabet_size, &counts))
            }
            WaveletEncoding::PrefixCode => {
                Shape::PrefixCode(PrefixCodeTree::build(symbols, &counts))
            }
        };

        let sequence = Self {
            alphabet_size,
            len: symbols.len(),
            occ: occurrence_table(&counts),
            shape,
        };
        crate::contracts::check_wavelet_sequence(&sequence);

        tracing::debug!(
            len = sequence.len,
            alphabet_size,
            encoding = encoding.name(),
            bytes = sequence.alloc_size(),
            "built wavelet sequence"
        );
        Ok(sequence)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn alphabet_size(&self) -> u32 {
        self.alphabet_size
    }

    pub fn encoding(&self) -> WaveletEncoding {
        match self.shape {
            Shape::Balanced(_) => WaveletEncoding::Balanced,
            Shape::PrefixCode(_) => WaveletEncoding::PrefixCode,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of symbols strictly smaller than `symbol`; `len` past the alphabet.
    pub fn occ(&self, symbol: u32) -> usize {
        self.occ
            .get(symbol as usize)
            .copied()
            .unwrap_or(self.len)
    }

    /// The whole occurrence table, `σ + 1` entries.
    pub fn occurrences(&self) -> &[usize] {
        &self.occ
    }

    pub fn frequency(&self, symbol: u32) -> usize {
        self.occ(symbol.saturating_add(1)) - self.occ(symbol)
    }

    pub fn access(&self, pos: usize) -> Option<u32> {
        match &self.shape {
            Shape::Balanced(m) => m.access(pos),
            Shape::PrefixCode(t) => t.access(pos),
        }
    }

    /// Symbol at `pos` and `rank(symbol, pos)`, in one descent.
    pub fn access_rank(&self, pos: usize) -> Option<(u32, usize)> {
        match &self.shape {
            Shape::Balanced(m) => m.access_rank(pos),
            Shape::PrefixCode(t) => t.access_rank(pos),
        }
    }

    /// Occurrences of `symbol` in `[0, pos)`. `pos` is clamped to `len`.
    pub fn rank(&self, symbol: u32, pos: usize) -> usize {
        if symbol >= self.alphabet_size || pos == 0 {
            return 0;
        }
        if pos >= self.len {
            return self.frequency(symbol);
        }
        match &self.shape {
            Shape::Balanced(m) => m.rank(symbol, pos),
            Shape::PrefixCode(t) => t.rank(symbol, pos),
        }
    }

    /// Position of the `k`-th (0-based) occurrence of `symbol`.
    pub fn select(&self, symbol: u32, k: usize) -> Option<usize> {
        if k >= self.frequency(symbol) {
            return None;
        }
        match &self.shape {
            Shape::Balanced(m) => m.select(symbol, k),
            Shape::PrefixCode(t) => t.select(symbol, k),
        }
    }

    /// Symbols occurring in at least `ranges.len() - threshold` of `ranges`,
    /// ascending, at most `max_count` of them.
    pub fn intersect(&self, ranges: &[MatchRange], threshold: usize, max_count: usize) -> Vec<u32> {
        let ranges = self.clamp_all(ranges);
        with_partition!(self, p => traversal::intersect(p, &ranges, threshold, max_count))
    }

    /// The `top_k` symbols by summed weight of the ranges they occur in.
    ///
    /// Ordered by non-increasing score. Ranges that are empty or carry a
    /// non-positive weight do not contribute.
    pub fn top_k_union(&self, ranges: &[WeightedRange], top_k: usize) -> Vec<RankedSymbol> {
        let ranges = self.clamp_weighted(ranges);
        with_partition!(self, p => traversal::top_k_union(p, &ranges, top_k))
    }

    /// [`top_k_union`](Self::top_k_union) restricted to symbols that occur
    /// in at least one of `filters` (ranges over this same sequence).
    pub fn top_k_union_with_filters(
        &self,
        filters: &[MatchRange],
        ranges: &[WeightedRange],
        top_k: usize,
    ) -> Vec<RankedSymbol> {
        let filters = self.clamp_all(filters);
        let ranges = self.clamp_weighted(ranges);
        with_partition!(self, p => traversal::top_k_union_with_filters(p, &filters, &ranges, top_k))
    }

    /// [`top_k_union`](Self::top_k_union) restricted to symbols accepted by
    /// every auxiliary filter.
    pub fn top_k_union_with_aux_filters(
        &self,
        aux_filters: &[AuxFilter<'_>],
        ranges: &[WeightedRange],
        top_k: usize,
    ) -> Vec<RankedSymbol> {
        let aux: Vec<AuxFilter<'_>> = aux_filters
            .iter()
            .map(|f| AuxFilter {
                sequence: f.sequence,
                ranges: f.sequence.clamp_all(&f.ranges),
            })
            .collect();
        let ranges = self.clamp_weighted(ranges);
        with_partition!(self, p => traversal::top_k_union_with_aux_filters(p, &aux, &ranges, top_k))
    }

    fn clamp(&self, range: MatchRange) -> MatchRange {
        MatchRange::new(range.start.min(self.len), range.end.min(self.len))
    }

    fn clamp_all(&self, ranges: &[MatchRange]) -> Vec<MatchRange> {
        ranges.iter().map(|&r| self.clamp(r)).collect()
    }

    fn clamp_weighted(&self, ranges: &[WeightedRange]) -> Vec<WeightedRange> {
        ranges
            .iter()
            .map(|wr| WeightedRange {
                range: self.clamp(wr.range),
                weight: wr.weight,
            })
            .collect()
    }

    /// Heap bytes held by the structure.
    pub fn alloc_size(&self) -> usize {
        let shape = match &self.shape {
            Shape::Balanced(m) => m.alloc_size(),
            Shape::PrefixCode(t) => t.alloc_size(),
        };
        shape + self.occ.len() * std::mem::size_of::<usize>()
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Layout: `[alphabet_size u32][encoding u8][len u64][occ (σ+1) × u64]`,
    /// then the shape.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.alphabet_size)?;
        write_u8(w, self.encoding() as u8)?;
        write_u64(w, self.len as u64)?;
        for &o in &self.occ {
            write_u64(w, o as u64)?;
        }
        match &self.shape {
            Shape::Balanced(m) => m.save(w),
            Shape::PrefixCode(t) => t.save(w),
        }
    }

    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        let alphabet_size = read_u32(r)?;
        if alphabet_size == 0 {
            return Err(Error::EmptyAlphabet);
        }
        if alphabet_size > MAX_ALPHABET_SIZE {
            return Err(Error::corrupt(format!(
                "alphabet size {} exceeds limit {}",
                alphabet_size, MAX_ALPHABET_SIZE
            )));
        }

        let tag = read_u8(r)?;
        let encoding = WaveletEncoding::from_u8(tag).ok_or(Error::SerializationMismatch {
            what: "wavelet encoding",
            expected: WaveletEncoding::PrefixCode as u64,
            found: tag as u64,
        })?;
        if encoding == WaveletEncoding::PrefixCode && alphabet_size > MAX_PREFIX_CODE_ALPHABET {
            return Err(Error::corrupt(format!(
                "prefix-code alphabet {} exceeds limit {}",
                alphabet_size, MAX_PREFIX_CODE_ALPHABET
            )));
        }

        let len = usize::try_from(read_u64(r)?)
            .map_err(|_| Error::corrupt("wavelet length does not fit in usize"))?;
        if len == 0 {
            return Err(Error::corrupt("wavelet sequence is empty"));
        }

        let mut occ = Vec::with_capacity(alphabet_size as usize + 1);
        let mut previous = 0usize;
        for _ in 0..=alphabet_size {
            let o = read_u64(r)? as usize;
            if o < previous || o > len {
                return Err(Error::corrupt("occurrence table is not monotone"));
            }
            occ.push(o);
            previous = o;
        }
        if occ.first() != Some(&0) || occ.last() != Some(&len) {
            return Err(Error::corrupt("occurrence table does not span the sequence"));
        }
        let counts: Vec<usize> = occ.windows(2).map(|w| w[1] - w[0]).collect();

        let shape = match encoding {
            WaveletEncoding::Balanced => {
                Shape::Balanced(WaveletMatrix::load(r, alphabet_size, len, &counts)?)
            }
            WaveletEncoding::PrefixCode => {
                Shape::PrefixCode(PrefixCodeTree::load(r, alphabet_size, len, &counts)?)
            }
        };

        Ok(Self {
            alphabet_size,
            len,
            occ,
            shape,
        })
    }

    /// [`load`](Self::load), failing unless the stored alphabet and encoding
    /// are the expected ones.
    pub fn load_expecting<R: Read>(
        r: &mut R,
        alphabet_size: u32,
        encoding: WaveletEncoding,
    ) -> Result<Self> {
        let sequence = Self::load(r)?;
        if sequence.alphabet_size != alphabet_size {
            return Err(Error::SerializationMismatch {
                what: "wavelet alphabet size",
                expected: alphabet_size as u64,
                found: sequence.alphabet_size as u64,
            });
        }
        if sequence.encoding() != encoding {
            return Err(Error::SerializationMismatch {
                what: "wavelet encoding",
                expected: encoding as u64,
                found: sequence.encoding() as u64,
            });
        }
        Ok(sequence)
    }

    /// Serialize into a standalone container file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        self.save(&mut payload)?;
        Ok(wrap_payload(PayloadKind::Wavelet, &payload))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut payload = unwrap_payload(bytes, PayloadKind::Wavelet)?;
        let sequence = Self::load(&mut payload)?;
        if !payload.is_empty() {
            return Err(Error::corrupt(format!(
                "{} trailing bytes after wavelet payload",
                payload.len()
            )));
        }
        Ok(sequence)
    }
}

fn occurrence_table(counts: &[usize]) -> Vec<usize> {
    let mut occ = Vec::with_capacity(counts.len() + 1);
    let mut total = 0;
    occ.push(0);
    for &c in counts {
        total += c;
        occ.push(total);
    }
    occ
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENCODINGS: [WaveletEncoding; 2] = [WaveletEncoding::Balanced, WaveletEncoding::PrefixCode];

    fn brute_rank(symbols: &[u32], symbol: u32, pos: usize) -> usize {
        symbols[..pos.min(symbols.len())]
            .iter()
            .filter(|&&s| s == symbol)
            .count()
    }

    #[test]
    fn build_rejects_bad_input() {
        for enc in ENCODINGS {
            assert!(matches!(
                WaveletSequence::build(&[], 4, enc),
                Err(Error::EmptyInput(_))
            ));
            assert!(matches!(
                WaveletSequence::build(&[0], 0, enc),
                Err(Error::EmptyAlphabet)
            ));
            assert!(matches!(
                WaveletSequence::build(&[1, 4], 4, enc),
                Err(Error::SymbolOutOfRange { symbol: 4, position: 1, .. })
            ));
        }
        assert!(matches!(
            WaveletSequence::build(&[0], MAX_PREFIX_CODE_ALPHABET + 1, WaveletEncoding::PrefixCode),
            Err(Error::AlphabetTooLarge { .. })
        ));
    }

    #[test]
    fn rank_select_access_agree_with_brute_force() {
        let symbols = [2u32, 0, 3, 3, 1, 0, 2, 2, 7, 3];
        for enc in ENCODINGS {
            let seq = WaveletSequence::build(&symbols, 8, enc).unwrap();
            assert_eq!(seq.len(), symbols.len());
            assert_eq!(seq.encoding(), enc);
            for (i, &s) in symbols.iter().enumerate() {
                assert_eq!(seq.access(i), Some(s));
                assert_eq!(seq.access_rank(i), Some((s, brute_rank(&symbols, s, i))));
            }
            assert_eq!(seq.access(symbols.len()), None);
            for c in 0..10u32 {
                for pos in 0..=symbols.len() + 2 {
                    assert_eq!(seq.rank(c, pos), brute_rank(&symbols, c, pos), "rank({c}, {pos})");
                }
                let freq = brute_rank(&symbols, c, symbols.len());
                assert_eq!(seq.frequency(c), freq);
                for k in 0..freq {
                    let pos = seq.select(c, k).unwrap();
                    assert_eq!(symbols[pos], c);
                    assert_eq!(seq.rank(c, pos), k);
                }
                assert_eq!(seq.select(c, freq), None);
            }
        }
    }

    #[test]
    fn occurrence_table_is_cumulative() {
        let seq = WaveletSequence::build(&[1, 1, 0, 3], 5, WaveletEncoding::Balanced).unwrap();
        assert_eq!(seq.occurrences(), &[0, 1, 3, 3, 4, 4]);
        assert_eq!(seq.occ(5), 4);
        assert_eq!(seq.occ(99), 4);
    }

    #[test]
    fn single_symbol_alphabet() {
        for enc in ENCODINGS {
            let seq = WaveletSequence::build(&[0, 0, 0], 1, enc).unwrap();
            assert_eq!(seq.access(2), Some(0));
            assert_eq!(seq.rank(0, 2), 2);
            assert_eq!(seq.select(0, 1), Some(1));
            let top = seq.top_k_union(&[WeightedRange::new(0..2, 1.5)], 3);
            assert_eq!(top, vec![RankedSymbol { symbol: 0, score: 1.5 }]);
            assert_eq!(seq.intersect(&[MatchRange::new(0, 1), MatchRange::new(1, 3)], 0, 10), vec![0]);
        }
    }

    #[test]
    fn intersect_respects_threshold() {
        // Symbols:     0  1  2  3  4  5  6  7  8
        let symbols = [1u32, 2, 3, 2, 3, 4, 3, 4, 5];
        let ranges = [MatchRange::new(0, 3), MatchRange::new(3, 6), MatchRange::new(6, 9)];
        for enc in ENCODINGS {
            let seq = WaveletSequence::build(&symbols, 6, enc).unwrap();
            assert_eq!(seq.intersect(&ranges, 0, 10), vec![3]);
            assert_eq!(seq.intersect(&ranges, 1, 10), vec![2, 3, 4]);
            assert_eq!(seq.intersect(&ranges, 2, 10), vec![1, 2, 3, 4, 5]);
            assert_eq!(seq.intersect(&ranges, 2, 2).len(), 2);
            assert!(seq.intersect(&[], 0, 10).is_empty());
        }
    }

    #[test]
    fn top_k_union_orders_by_summed_weight() {
        let symbols = [1u32, 2, 3, 2, 3, 4, 3, 4, 5];
        let ranges = [
            WeightedRange::new(0..3, 1.0),
            WeightedRange::new(3..6, 2.0),
            WeightedRange::new(6..9, 4.0),
        ];
        for enc in ENCODINGS {
            let seq = WaveletSequence::build(&symbols, 6, enc).unwrap();
            let top = seq.top_k_union(&ranges, 3);
            assert_eq!(top[0], RankedSymbol { symbol: 3, score: 7.0 });
            assert_eq!(top[1], RankedSymbol { symbol: 4, score: 6.0 });
            assert_eq!(top[2].score, 4.0);
            assert_eq!(top[2].symbol, 5);
            assert!(seq.top_k_union(&ranges, 0).is_empty());
            assert!(seq.top_k_union(&[WeightedRange::new(0..3, 0.0)], 5).is_empty());
        }
    }

    #[test]
    fn filtered_top_k_only_admits_filter_symbols() {
        let symbols = [1u32, 2, 3, 2, 3, 4, 3, 4, 5];
        let ranges = [WeightedRange::new(0..9, 1.0)];
        for enc in ENCODINGS {
            let seq = WaveletSequence::build(&symbols, 6, enc).unwrap();
            // Positions 7..9 hold symbols 4 and 5.
            let top = seq.top_k_union_with_filters(&[MatchRange::new(7, 9)], &ranges, 10);
            let mut got: Vec<u32> = top.iter().map(|r| r.symbol).collect();
            got.sort_unstable();
            assert_eq!(got, vec![4, 5]);
            assert!(seq.top_k_union_with_filters(&[MatchRange::EMPTY], &ranges, 10).is_empty());
        }
    }

    #[test]
    fn aux_filters_are_anded_across_shapes() {
        let symbols = [1u32, 2, 3, 2, 3, 4, 3, 4, 5];
        let ranges = [WeightedRange::new(0..9, 1.0)];
        // Auxiliary sequences over the same alphabet.
        let aux_a = [3u32, 4, 5, 1];
        let aux_b = [4u32, 1, 2];
        for enc in ENCODINGS {
            let seq = WaveletSequence::build(&symbols, 6, enc).unwrap();
            for aux_enc in ENCODINGS {
                let a = WaveletSequence::build(&aux_a, 6, aux_enc).unwrap();
                let b = WaveletSequence::build(&aux_b, 6, aux_enc).unwrap();
                let filters = [
                    AuxFilter { sequence: &a, ranges: vec![MatchRange::new(0, 3)] },
                    AuxFilter { sequence: &b, ranges: vec![MatchRange::new(0, 1), MatchRange::new(2, 3)] },
                ];
                let top = seq.top_k_union_with_aux_filters(&filters, &ranges, 10);
                let got: Vec<u32> = top.iter().map(|r| r.symbol).collect();
                assert_eq!(got, vec![4], "{:?} over {:?}", enc, aux_enc);

                let none = [AuxFilter { sequence: &a, ranges: vec![MatchRange::EMPTY] }];
                assert!(seq.top_k_union_with_aux_filters(&none, &ranges, 10).is_empty());
            }
        }
    }

    #[test]
    fn save_load_round_trip_preserves_answers() {
        let symbols: Vec<u32> = (0..500u32).map(|i| (i * 7 + i / 13) % 37).collect();
        for enc in ENCODINGS {
            let seq = WaveletSequence::build(&symbols, 40, enc).unwrap();
            let bytes = seq.to_bytes().unwrap();
            let loaded = WaveletSequence::from_bytes(&bytes).unwrap();
            assert_eq!(loaded, seq);
            for pos in (0..symbols.len()).step_by(17) {
                assert_eq!(loaded.access(pos), seq.access(pos));
                assert_eq!(loaded.rank(5, pos), seq.rank(5, pos));
            }
        }
    }

    #[test]
    fn load_expecting_detects_mismatch() {
        let seq = WaveletSequence::build(&[1, 2, 3], 4, WaveletEncoding::Balanced).unwrap();
        let mut buf = Vec::new();
        seq.save(&mut buf).unwrap();

        assert!(matches!(
            WaveletSequence::load_expecting(&mut buf.as_slice(), 8, WaveletEncoding::Balanced),
            Err(Error::SerializationMismatch { what: "wavelet alphabet size", .. })
        ));
        assert!(matches!(
            WaveletSequence::load_expecting(&mut buf.as_slice(), 4, WaveletEncoding::PrefixCode),
            Err(Error::SerializationMismatch { what: "wavelet encoding", .. })
        ));

        // Unknown encoding discriminator.
        buf[4] = 7;
        assert!(matches!(
            WaveletSequence::load(&mut buf.as_slice()),
            Err(Error::SerializationMismatch { .. })
        ));
    }

    #[test]
    fn corrupted_container_is_rejected() {
        let seq = WaveletSequence::build(&[1, 2, 3, 1], 4, WaveletEncoding::PrefixCode).unwrap();
        let mut bytes = seq.to_bytes().unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xff;
        assert!(matches!(WaveletSequence::from_bytes(&bytes), Err(Error::Corrupt(_))));
    }
}
