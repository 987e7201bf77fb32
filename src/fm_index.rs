// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! FM-index over a multi-document byte corpus.
//!
//! # Text Model
//!
//! ```text
//! documents:  "banana"          "ananas"
//! text:       b a n a n a ⏎     a n a n a s ⏎     $
//! symbols:    byte + 1          delimiter + 1     terminal 0
//! ```
//!
//! The BWT of that text is stored as a [`WaveletSequence`] over 257 symbols;
//! the suffix array and the text itself are discarded after build. Suffix
//! positions divisible by the sample rate `r` are kept (as `p / r`, in row
//! order), so any row can be located by walking LF until a sampled row.
//!
//! # Search
//!
//! Backward search narrows a row range one pattern byte at a time, right to
//! left, with `occ(c) + rank(c, ·)`. It never fails: a pattern that only
//! partially occurs reports how many trailing bytes matched.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use crate::binary::{
    read_u32, read_u64, unwrap_payload, wrap_payload, write_u32, write_u64, PayloadKind,
};
use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::sais::build_suffix_array;
use crate::succinct::{BitVector, BitVectorBuilder, CumulativeArray, CumulativeArrayBuilder};
use crate::types::{DocId, MatchRange, SearchMatch};
use crate::util::IntVector;
use crate::wavelet::WaveletSequence;

/// Byte alphabet plus the terminal symbol.
pub const ALPHABET_SIZE: u32 = 257;

/// Symbol that ends the whole text.
pub const TERMINAL: u32 = 0;

#[inline]
fn symbol_of(byte: u8) -> u32 {
    byte as u32 + 1
}

/// Compressed self-index over a document collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FmIndex {
    sample_rate: u32,
    text_len: usize,
    /// `sa[row] / sample_rate` for every sampled row, in row order.
    samples: IntVector,
    /// Rows whose suffix position is divisible by `sample_rate`.
    sampled_rows: BitVector,
    /// Span of each document in the text (bytes + delimiter; the last one
    /// also owns the terminal).
    delimiters: CumulativeArray,
    bwt: WaveletSequence,
}

impl FmIndex {
    pub fn build<D: AsRef<[u8]>>(documents: &[D], config: &IndexConfig) -> Result<Self> {
        Self::build_with_document_array(documents, config).map(|(index, _)| index)
    }

    /// Build, also returning the document array: `da[row]` is the 1-based id
    /// of the document holding the suffix at `row`.
    pub fn build_with_document_array<D: AsRef<[u8]>>(
        documents: &[D],
        config: &IndexConfig,
    ) -> Result<(Self, Vec<u32>)> {
        config.validate()?;
        if documents.is_empty() {
            return Err(Error::EmptyInput("fm-index needs at least one document"));
        }

        let delimiter = symbol_of(config.delimiter);
        let total: usize = documents.iter().map(|d| d.as_ref().len() + 1).sum::<usize>() + 1;
        let mut text: Vec<u32> = Vec::with_capacity(total);
        let mut spans = CumulativeArrayBuilder::new();
        for (doc, bytes) in documents.iter().enumerate() {
            let bytes = bytes.as_ref();
            if bytes.contains(&config.delimiter) {
                return Err(Error::DelimiterInDocument {
                    doc,
                    delimiter: config.delimiter,
                });
            }
            text.extend(bytes.iter().map(|&b| symbol_of(b)));
            text.push(delimiter);
            let terminal = usize::from(doc + 1 == documents.len());
            spans.add((bytes.len() + 1 + terminal) as u64);
        }
        text.push(TERMINAL);
        let delimiters = spans.build();
        crate::contracts::check_delimiter_total(&delimiters, text.len());

        let sa = build_suffix_array(&text, ALPHABET_SIZE);
        let n = text.len();
        let r = config.sample_rate as usize;

        let mut bwt = Vec::with_capacity(n);
        let mut sampled = BitVectorBuilder::with_capacity(n);
        let mut samples = Vec::with_capacity(n / r + 1);
        let mut document_array = Vec::with_capacity(n);
        for &p in &sa {
            bwt.push(if p == 0 { text[n - 1] } else { text[p - 1] });
            let is_sampled = p % r == 0;
            sampled.push(is_sampled);
            if is_sampled {
                samples.push((p / r) as u64);
            }
            let doc = delimiters
                .find(p as u64)
                .ok_or_else(|| Error::InconsistentLengths(format!("suffix {} past text end", p)))?;
            document_array.push(DocId::from_index(doc).get());
        }
        drop(text);
        drop(sa);

        let sampled_rows = sampled.build();
        crate::contracts::check_sample_table(&sampled_rows, config.sample_rate, n);

        let index = Self {
            sample_rate: config.sample_rate,
            text_len: n,
            samples: IntVector::from_values(&samples),
            sampled_rows,
            delimiters,
            bwt: WaveletSequence::build(&bwt, ALPHABET_SIZE, config.encoding)?,
        };
        tracing::debug!(
            docs = documents.len(),
            text_len = n,
            sample_rate = config.sample_rate,
            bytes = index.alloc_size(),
            "built fm-index"
        );
        Ok((index, document_array))
    }

    pub fn doc_count(&self) -> usize {
        self.delimiters.len()
    }

    /// Text length in symbols, delimiters and terminal included.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bwt(&self) -> &WaveletSequence {
        &self.bwt
    }

    /// Per-document spans of the text, `doc_count()` entries.
    pub fn document_spans(&self) -> &CumulativeArray {
        &self.delimiters
    }

    /// Byte length of a document, without its delimiter.
    pub fn doc_length(&self, doc: DocId) -> Option<usize> {
        DocId::new(doc.get(), self.doc_count())?;
        let span = self.delimiters.increment(doc.index())? as usize;
        let terminal = usize::from(doc.index() + 1 == self.doc_count());
        span.checked_sub(1 + terminal)
    }

    /// Document holding text position `pos`.
    pub fn doc_at(&self, pos: usize) -> Option<DocId> {
        self.delimiters.find(pos as u64).map(DocId::from_index)
    }

    /// Narrow `range` by one symbol to the left.
    #[inline]
    fn step(&self, range: MatchRange, symbol: u32) -> MatchRange {
        let base = self.bwt.occ(symbol);
        MatchRange::new(
            base + self.bwt.rank(symbol, range.start),
            base + self.bwt.rank(symbol, range.end),
        )
    }

    /// Row of the suffix one position to the left of `row`'s suffix.
    #[inline]
    fn lf(&self, row: usize) -> Option<usize> {
        let (symbol, rank) = self.bwt.access_rank(row)?;
        Some(self.bwt.occ(symbol) + rank)
    }

    /// Longest suffix of `pattern` that occurs, and its rows.
    pub fn backward_search(&self, pattern: &[u8]) -> SearchMatch {
        let mut range = MatchRange::new(0, self.text_len);
        let mut matched = 0;
        for &byte in pattern.iter().rev() {
            let next = self.step(range, symbol_of(byte));
            if next.is_empty() {
                break;
            }
            range = next;
            matched += 1;
        }
        if matched == 0 {
            range = MatchRange::EMPTY;
        }
        SearchMatch { matched, range }
    }

    /// Number of occurrences of the whole `pattern`.
    pub fn count(&self, pattern: &[u8]) -> usize {
        let m = self.backward_search(pattern);
        if m.is_full(pattern.len()) {
            m.range.len()
        } else {
            0
        }
    }

    /// Text position of the suffix at `row`.
    fn position(&self, mut row: usize) -> Option<usize> {
        let mut steps = 0;
        while !self.sampled_rows.get(row) {
            row = self.lf(row)?;
            steps += 1;
        }
        let sample = self.samples.get(self.sampled_rows.rank1(row))? as usize;
        Some(sample * self.sample_rate as usize + steps)
    }

    /// Text positions of up to `max` rows of `range`, ascending.
    pub fn locate(&self, range: MatchRange, max: usize) -> Vec<usize> {
        let end = range.end.min(self.text_len);
        let mut positions: Vec<usize> = (range.start..end)
            .take(max)
            .filter_map(|row| self.position(row))
            .collect();
        positions.sort_unstable();
        positions
    }

    /// The first `max_docs` distinct documents met walking `range` in row
    /// order, returned ascending. Stops walking once that many are found.
    pub fn get_doc_id_list(&self, range: MatchRange, max_docs: usize) -> Vec<DocId> {
        let mut docs = BTreeSet::new();
        self.collect_docs(range, max_docs, &mut docs);
        docs.into_iter().collect()
    }

    /// Add documents of `range` rows to `docs` until it holds `max_docs`.
    fn collect_docs(&self, range: MatchRange, max_docs: usize, docs: &mut BTreeSet<DocId>) {
        let end = range.end.min(self.text_len);
        for row in range.start..end {
            if docs.len() >= max_docs {
                return;
            }
            if let Some(doc) = self.position(row).and_then(|pos| self.doc_at(pos)) {
                docs.insert(doc);
            }
        }
    }

    /// Length of the longest substring of `pattern` that occurs, with the
    /// row ranges of every substring of that length.
    ///
    /// Extends leftwards from every end index. A start index keeps the widest
    /// range seen so far; an extension that cannot beat it is abandoned,
    /// since every one of its occurrences continues into a match already
    /// explored from that start.
    pub fn longest_suffix_match_ranges(&self, pattern: &[u8]) -> (usize, Vec<MatchRange>) {
        let mut prune_bound = vec![0usize; pattern.len()];
        let mut best = 0;
        let mut ranges: Vec<MatchRange> = Vec::new();

        for end in (1..=pattern.len()).rev() {
            // No start left of `end` can produce a longer match.
            if end < best {
                break;
            }
            let mut range = MatchRange::new(0, self.text_len);
            for start in (0..end).rev() {
                let next = self.step(range, symbol_of(pattern[start]));
                if next.is_empty() || next.len() <= prune_bound[start] {
                    break;
                }
                prune_bound[start] = next.len();
                range = next;

                let len = end - start;
                if len > best {
                    best = len;
                    ranges.clear();
                }
                if len == best {
                    ranges.push(next);
                }
            }
        }

        ranges.sort_unstable_by_key(|r| (r.start, r.end));
        ranges.dedup();
        (best, ranges)
    }

    /// [`longest_suffix_match_ranges`](Self::longest_suffix_match_ranges),
    /// resolved to at most `max_docs` documents, ascending.
    pub fn longest_suffix_match(&self, pattern: &[u8], max_docs: usize) -> (usize, Vec<DocId>) {
        let (len, ranges) = self.longest_suffix_match_ranges(pattern);
        let mut docs = BTreeSet::new();
        for range in ranges {
            if docs.len() >= max_docs {
                break;
            }
            self.collect_docs(range, max_docs, &mut docs);
        }
        (len, docs.into_iter().collect())
    }

    /// Rebuild every document not in `deleted`, in document order.
    ///
    /// Walks the whole BWT once; meant for maintenance, not queries.
    pub fn reconstruct_text(&self, deleted: &[DocId]) -> Vec<Vec<u8>> {
        // Row 0 is the terminal suffix; LF from it reads the text backwards.
        let mut reversed: Vec<u8> = Vec::with_capacity(self.text_len.saturating_sub(1));
        let mut row = 0;
        for _ in 1..self.text_len {
            let Some((symbol, rank)) = self.bwt.access_rank(row) else {
                break;
            };
            reversed.push(symbol.saturating_sub(1) as u8);
            row = self.bwt.occ(symbol) + rank;
        }
        reversed.reverse();
        let text = reversed;

        let mut docs = Vec::with_capacity(self.doc_count());
        for index in 0..self.doc_count() {
            let doc = DocId::from_index(index);
            let start = self.delimiters.prefix_sum(index) as usize;
            let Some(len) = self.doc_length(doc) else {
                continue;
            };
            if deleted.contains(&doc) {
                continue;
            }
            docs.push(text.get(start..start + len).unwrap_or_default().to_vec());
        }
        docs
    }

    pub fn alloc_size(&self) -> usize {
        self.samples.alloc_size()
            + self.sampled_rows.alloc_size()
            + self.delimiters.alloc_size()
            + self.bwt.alloc_size()
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Layout: `[sample_rate u32][text_len u64][alphabet_size u32][samples]
    /// [sampled rows][delimiters][bwt]`.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.sample_rate)?;
        write_u64(w, self.text_len as u64)?;
        write_u32(w, ALPHABET_SIZE)?;
        self.samples.save(w)?;
        self.sampled_rows.save(w)?;
        self.delimiters.save(w)?;
        self.bwt.save(w)
    }

    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        let sample_rate = read_u32(r)?;
        if sample_rate == 0 {
            return Err(Error::corrupt("fm-index sample rate is zero"));
        }
        let text_len = usize::try_from(read_u64(r)?)
            .map_err(|_| Error::corrupt("fm-index text length does not fit in usize"))?;
        let alphabet_size = read_u32(r)?;
        if alphabet_size != ALPHABET_SIZE {
            return Err(Error::SerializationMismatch {
                what: "fm-index alphabet size",
                expected: ALPHABET_SIZE as u64,
                found: alphabet_size as u64,
            });
        }

        let samples = IntVector::load(r)?;
        let sampled_rows = BitVector::load(r)?;
        let delimiters = CumulativeArray::load(r)?;
        let bwt = WaveletSequence::load(r)?;

        if bwt.alphabet_size() != ALPHABET_SIZE {
            return Err(Error::SerializationMismatch {
                what: "fm-index wavelet alphabet size",
                expected: ALPHABET_SIZE as u64,
                found: bwt.alphabet_size() as u64,
            });
        }
        if bwt.len() != text_len || sampled_rows.len() != text_len {
            return Err(Error::corrupt(format!(
                "fm-index text length {} disagrees with bwt ({}) or sampled rows ({})",
                text_len,
                bwt.len(),
                sampled_rows.len()
            )));
        }
        if samples.len() != sampled_rows.count_ones() {
            return Err(Error::corrupt(format!(
                "{} samples stored for {} sampled rows",
                samples.len(),
                sampled_rows.count_ones()
            )));
        }
        if delimiters.total() != text_len as u64 || delimiters.is_empty() {
            return Err(Error::corrupt(format!(
                "document spans cover {} of {} text symbols",
                delimiters.total(),
                text_len
            )));
        }
        if bwt.frequency(TERMINAL) != 1 {
            return Err(Error::corrupt("bwt must hold exactly one terminal"));
        }

        Ok(Self {
            sample_rate,
            text_len,
            samples,
            sampled_rows,
            delimiters,
            bwt,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        self.save(&mut payload)?;
        Ok(wrap_payload(PayloadKind::FmIndex, &payload))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut payload = unwrap_payload(bytes, PayloadKind::FmIndex)?;
        let index = Self::load(&mut payload)?;
        if !payload.is_empty() {
            return Err(Error::corrupt(format!(
                "{} trailing bytes after fm-index payload",
                payload.len()
            )));
        }
        Ok(index)
    }
}
