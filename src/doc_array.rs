// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Document arrays: wavelet sequences of document ids.
//!
//! Two kinds share one alphabet (`doc_count + 1`, ids are 1-based):
//!
//! - **Main arrays** map every BWT row of a property's FM-index to the
//!   document owning that suffix. A backward-search range over the FM-index
//!   is directly a range over the main array, so "which documents match" and
//!   "rank documents by matched ranges" become `intersect` and `top_k_union`.
//! - **Filter arrays** list, for each filter id (one attribute value), the
//!   documents carrying it. Filter id `f` owns positions
//!   `[prefix_sum(f), prefix_sum(f + 1))`.
//!
//! ```text
//! filter "tag":   rust      search    wasm
//! groups:         [1, 3]    [2, 3]    [4]
//! sequence:       1 3       2 3       4
//! spans:          0..2      2..4      4..5
//! ```

use std::io::{Read, Write};

use crate::binary::{
    read_len, read_str, read_u64, read_u8, write_str, write_u64, write_u8, write_varint,
    MAX_ARRAYS, MAX_DOC_COUNT,
};
use crate::config::WaveletEncoding;
use crate::error::{Error, Result};
use crate::succinct::{CumulativeArray, CumulativeArrayBuilder};
use crate::types::{DocId, MatchRange, RankedDoc, RankedSymbol, WeightedRange};
use crate::wavelet::{AuxFilter, WaveletSequence};

/// Handle to one array of a [`DocumentArrayManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayRef {
    Main(usize),
    Filter(usize),
}

/// One auxiliary restriction: documents carrying any filter id in `ids`.
///
/// `ids` are ranges of filter ids of the filter array `array`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    pub array: ArrayRef,
    pub ids: Vec<MatchRange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MainArray {
    name: String,
    sequence: WaveletSequence,
    doc_lengths: CumulativeArray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterArray {
    name: String,
    sequence: WaveletSequence,
    /// Population of each filter id.
    spans: CumulativeArray,
}

impl FilterArray {
    /// Filter-id range to position range.
    fn positions(&self, ids: MatchRange) -> MatchRange {
        MatchRange::new(
            self.spans.prefix_sum(ids.start) as usize,
            self.spans.prefix_sum(ids.end) as usize,
        )
    }
}

/// Main and filter document arrays of one corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentArrayManager {
    doc_count: usize,
    encoding: WaveletEncoding,
    main: Vec<MainArray>,
    filters: Vec<FilterArray>,
}

fn ranked_docs(symbols: Vec<RankedSymbol>) -> Vec<RankedDoc> {
    symbols
        .into_iter()
        .map(|r| RankedDoc {
            doc_id: DocId(r.symbol),
            score: r.score,
        })
        .collect()
}

impl DocumentArrayManager {
    pub fn new(doc_count: usize, encoding: WaveletEncoding) -> Result<Self> {
        if doc_count == 0 {
            return Err(Error::EmptyInput("document arrays need at least one document"));
        }
        if doc_count > MAX_DOC_COUNT as usize {
            return Err(Error::InvalidConfig(format!(
                "{} documents exceeds limit {}",
                doc_count, MAX_DOC_COUNT
            )));
        }
        Ok(Self {
            doc_count,
            encoding,
            main: Vec::new(),
            filters: Vec::new(),
        })
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn encoding(&self) -> WaveletEncoding {
        self.encoding
    }

    fn alphabet_size(&self) -> u32 {
        self.doc_count as u32 + 1
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if self.main_array(name).is_ok() || self.filter_array(name).is_ok() {
            return Err(Error::InvalidConfig(format!("duplicate document array name {:?}", name)));
        }
        Ok(())
    }

    /// Register a scored property. `doc_lengths[i]` is the number of array
    /// positions owned by document `i + 1`.
    pub fn add_main_array(
        &mut self,
        name: &str,
        doc_array: &[u32],
        doc_lengths: CumulativeArray,
    ) -> Result<ArrayRef> {
        self.check_name(name)?;
        if doc_lengths.len() != self.doc_count {
            return Err(Error::InconsistentLengths(format!(
                "main array {:?} has {} document lengths for {} documents",
                name,
                doc_lengths.len(),
                self.doc_count
            )));
        }
        if doc_lengths.total() != doc_array.len() as u64 {
            return Err(Error::InconsistentLengths(format!(
                "main array {:?}: document lengths sum to {}, array has {} entries",
                name,
                doc_lengths.total(),
                doc_array.len()
            )));
        }
        if let Some(position) = doc_array.iter().position(|&id| id == 0) {
            return Err(Error::SymbolOutOfRange {
                symbol: 0,
                position,
                alphabet_size: self.alphabet_size(),
            });
        }

        let sequence = WaveletSequence::build(doc_array, self.alphabet_size(), self.encoding)?;
        self.main.push(MainArray {
            name: name.to_string(),
            sequence,
            doc_lengths,
        });
        tracing::debug!(name, len = doc_array.len(), "added main document array");
        Ok(ArrayRef::Main(self.main.len() - 1))
    }

    /// Register a filter attribute; `groups[f]` are the documents of filter id `f`.
    pub fn add_filter_array(&mut self, name: &str, groups: &[Vec<DocId>]) -> Result<ArrayRef> {
        self.check_name(name)?;
        let mut symbols = Vec::with_capacity(groups.iter().map(Vec::len).sum());
        let mut spans = CumulativeArrayBuilder::new();
        for group in groups {
            for &doc in group {
                if DocId::new(doc.get(), self.doc_count).is_none() {
                    return Err(Error::SymbolOutOfRange {
                        symbol: doc.get(),
                        position: symbols.len(),
                        alphabet_size: self.alphabet_size(),
                    });
                }
                symbols.push(doc.get());
            }
            spans.add(group.len() as u64);
        }

        let sequence = WaveletSequence::build(&symbols, self.alphabet_size(), self.encoding)?;
        self.filters.push(FilterArray {
            name: name.to_string(),
            sequence,
            spans: spans.build(),
        });
        tracing::debug!(name, groups = groups.len(), len = symbols.len(), "added filter array");
        Ok(ArrayRef::Filter(self.filters.len() - 1))
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    pub fn main_array(&self, name: &str) -> Result<ArrayRef> {
        self.main
            .iter()
            .position(|a| a.name == name)
            .map(ArrayRef::Main)
            .ok_or_else(|| Error::UnknownArray(name.to_string()))
    }

    pub fn filter_array(&self, name: &str) -> Result<ArrayRef> {
        self.filters
            .iter()
            .position(|a| a.name == name)
            .map(ArrayRef::Filter)
            .ok_or_else(|| Error::UnknownArray(name.to_string()))
    }

    pub fn main_names(&self) -> impl Iterator<Item = &str> {
        self.main.iter().map(|a| a.name.as_str())
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|a| a.name.as_str())
    }

    pub fn name(&self, array: ArrayRef) -> Option<&str> {
        match array {
            ArrayRef::Main(i) => self.main.get(i).map(|a| a.name.as_str()),
            ArrayRef::Filter(i) => self.filters.get(i).map(|a| a.name.as_str()),
        }
    }

    pub fn sequence(&self, array: ArrayRef) -> Option<&WaveletSequence> {
        match array {
            ArrayRef::Main(i) => self.main.get(i).map(|a| &a.sequence),
            ArrayRef::Filter(i) => self.filters.get(i).map(|a| &a.sequence),
        }
    }

    /// Number of filter ids of a filter array; `None` for main arrays.
    pub fn filter_count(&self, array: ArrayRef) -> Option<usize> {
        match array {
            ArrayRef::Filter(i) => self.filters.get(i).map(|a| a.spans.len()),
            ArrayRef::Main(_) => None,
        }
    }

    /// Positions owned by `doc` in a main array.
    pub fn doc_length(&self, array: ArrayRef, doc: DocId) -> Option<u64> {
        match array {
            ArrayRef::Main(i) => self.main.get(i)?.doc_lengths.increment(doc.index()),
            ArrayRef::Filter(_) => None,
        }
    }

    /// Translate caller ranges into position ranges of `array`.
    fn positions(&self, array: ArrayRef, ranges: &[MatchRange]) -> Vec<MatchRange> {
        match array {
            ArrayRef::Filter(i) => match self.filters.get(i) {
                Some(filter) => ranges.iter().map(|&r| filter.positions(r)).collect(),
                None => Vec::new(),
            },
            ArrayRef::Main(_) => ranges.to_vec(),
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Documents present in at least `ranges.len() - threshold` of `ranges`.
    ///
    /// Ranges are row ranges for main arrays and filter-id ranges for filter
    /// arrays.
    pub fn get_matched_doc_id_list(
        &self,
        array: ArrayRef,
        ranges: &[MatchRange],
        threshold: usize,
        max_docs: usize,
    ) -> Vec<DocId> {
        let Some(sequence) = self.sequence(array) else {
            return Vec::new();
        };
        let positions = self.positions(array, ranges);
        sequence
            .intersect(&positions, threshold, max_docs)
            .into_iter()
            .map(DocId)
            .collect()
    }

    /// The `top_k` documents by summed weight of the ranges they occur in.
    pub fn get_top_k_doc_id_list(
        &self,
        array: ArrayRef,
        ranges: &[WeightedRange],
        top_k: usize,
    ) -> Vec<RankedDoc> {
        let Some(sequence) = self.sequence(array) else {
            return Vec::new();
        };
        let ranges: Vec<WeightedRange> = match array {
            ArrayRef::Filter(i) => match self.filters.get(i) {
                Some(filter) => ranges
                    .iter()
                    .map(|wr| WeightedRange {
                        range: filter.positions(wr.range),
                        weight: wr.weight,
                    })
                    .collect(),
                None => Vec::new(),
            },
            ArrayRef::Main(_) => ranges.to_vec(),
        };
        ranked_docs(sequence.top_k_union(&ranges, top_k))
    }

    /// Top-K over `property`, keeping documents that also occur in one of
    /// `filter_positions` (row ranges of the same array).
    pub fn get_top_k_doc_id_list_with_filters(
        &self,
        property: ArrayRef,
        ranges: &[WeightedRange],
        filter_positions: &[MatchRange],
        top_k: usize,
    ) -> Vec<RankedDoc> {
        let Some(sequence) = self.sequence(property) else {
            return Vec::new();
        };
        ranked_docs(sequence.top_k_union_with_filters(filter_positions, ranges, top_k))
    }

    /// Top-K over the main array `property`, keeping documents accepted by
    /// every filter query.
    pub fn get_top_k_doc_id_list_by_filter(
        &self,
        property: ArrayRef,
        ranges: &[WeightedRange],
        filters: &[FilterQuery],
        top_k: usize,
    ) -> Result<Vec<RankedDoc>> {
        let sequence = self
            .sequence(property)
            .ok_or_else(|| Error::UnknownArray(format!("{:?}", property)))?;

        let mut aux = Vec::with_capacity(filters.len());
        for query in filters {
            let ArrayRef::Filter(i) = query.array else {
                return Err(Error::UnknownArray(format!(
                    "{:?} is not a filter array",
                    query.array
                )));
            };
            let filter = self
                .filters
                .get(i)
                .ok_or_else(|| Error::UnknownArray(format!("{:?}", query.array)))?;
            aux.push(AuxFilter {
                sequence: &filter.sequence,
                ranges: query.ids.iter().map(|&r| filter.positions(r)).collect(),
            });
        }

        let ranked = if aux.is_empty() {
            sequence.top_k_union(ranges, top_k)
        } else {
            sequence.top_k_union_with_aux_filters(&aux, ranges, top_k)
        };
        Ok(ranked_docs(ranked))
    }

    /// Per-filter-id document groups without `deleted` documents.
    ///
    /// Empty for main arrays.
    pub fn reconstruct_text(&self, filter: ArrayRef, deleted: &[DocId]) -> Vec<Vec<DocId>> {
        let ArrayRef::Filter(i) = filter else {
            return Vec::new();
        };
        let Some(array) = self.filters.get(i) else {
            return Vec::new();
        };
        (0..array.spans.len())
            .map(|f| {
                array
                    .positions(MatchRange::new(f, f + 1))
                    .as_range()
                    .filter_map(|pos| array.sequence.access(pos))
                    .map(DocId)
                    .filter(|doc| !deleted.contains(doc))
                    .collect()
            })
            .collect()
    }

    pub fn alloc_size(&self) -> usize {
        let main: usize = self
            .main
            .iter()
            .map(|a| a.sequence.alloc_size() + a.doc_lengths.alloc_size() + a.name.len())
            .sum();
        let filters: usize = self
            .filters
            .iter()
            .map(|a| a.sequence.alloc_size() + a.spans.alloc_size() + a.name.len())
            .sum();
        main + filters
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Layout: `[doc_count u64][encoding u8]`
    /// `[main count varint][name, doc lengths, sequence]…`
    /// `[filter count varint][name, spans, sequence]…`.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, self.doc_count as u64)?;
        write_u8(w, self.encoding as u8)?;
        write_varint(w, self.main.len() as u64)?;
        for array in &self.main {
            write_str(w, &array.name)?;
            array.doc_lengths.save(w)?;
            array.sequence.save(w)?;
        }
        write_varint(w, self.filters.len() as u64)?;
        for array in &self.filters {
            write_str(w, &array.name)?;
            array.spans.save(w)?;
            array.sequence.save(w)?;
        }
        Ok(())
    }

    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        let doc_count = read_u64(r)? as usize;
        if doc_count == 0 || doc_count > MAX_DOC_COUNT as usize {
            return Err(Error::corrupt(format!("document count {} out of range", doc_count)));
        }
        let tag = read_u8(r)?;
        let encoding = WaveletEncoding::from_u8(tag).ok_or(Error::SerializationMismatch {
            what: "document array encoding",
            expected: WaveletEncoding::PrefixCode as u64,
            found: tag as u64,
        })?;
        let mut manager = Self::new(doc_count, encoding)?;
        let alphabet_size = manager.alphabet_size();

        let main_count = read_len(r, MAX_ARRAYS, "main array count")?;
        for _ in 0..main_count {
            let name = read_str(r)?;
            let doc_lengths = CumulativeArray::load(r)?;
            let sequence = WaveletSequence::load_expecting(r, alphabet_size, encoding)?;
            if doc_lengths.len() != doc_count || doc_lengths.total() != sequence.len() as u64 {
                return Err(Error::corrupt(format!(
                    "main array {:?} lengths disagree with its sequence",
                    name
                )));
            }
            manager.check_name(&name).map_err(|_| Error::corrupt("duplicate array name"))?;
            manager.main.push(MainArray {
                name,
                sequence,
                doc_lengths,
            });
        }

        let filter_count = read_len(r, MAX_ARRAYS, "filter array count")?;
        for _ in 0..filter_count {
            let name = read_str(r)?;
            let spans = CumulativeArray::load(r)?;
            let sequence = WaveletSequence::load_expecting(r, alphabet_size, encoding)?;
            if spans.total() != sequence.len() as u64 {
                return Err(Error::corrupt(format!(
                    "filter array {:?} spans disagree with its sequence",
                    name
                )));
            }
            manager.check_name(&name).map_err(|_| Error::corrupt("duplicate array name"))?;
            manager.filters.push(FilterArray {
                name,
                sequence,
                spans,
            });
        }
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::fm_index::FmIndex;

    fn doc_ids(ids: &[u32]) -> Vec<DocId> {
        ids.iter().map(|&i| DocId(i)).collect()
    }

    fn setup(encoding: WaveletEncoding) -> (FmIndex, DocumentArrayManager, ArrayRef, ArrayRef) {
        let docs = ["banana split", "ananas", "band of bananas", "no fruit"];
        let (fm, da) = FmIndex::build_with_document_array(&docs, &IndexConfig::default()).unwrap();
        let mut manager = DocumentArrayManager::new(docs.len(), encoding).unwrap();
        let body = manager
            .add_main_array("body", &da, fm.document_spans().clone())
            .unwrap();
        // Filter ids: 0 = "fruit", 1 = "music".
        let tags = manager
            .add_filter_array("tag", &[doc_ids(&[1, 2, 3]), doc_ids(&[3, 4])])
            .unwrap();
        (fm, manager, body, tags)
    }

    #[test]
    fn matched_docs_intersect_ranges() {
        for enc in [WaveletEncoding::Balanced, WaveletEncoding::PrefixCode] {
            let (fm, manager, body, tags) = setup(enc);
            let ana = fm.backward_search(b"ana").range;
            let band = fm.backward_search(b"band").range;
            assert_eq!(manager.get_matched_doc_id_list(body, &[ana], 0, 10), doc_ids(&[1, 2, 3]));
            assert_eq!(manager.get_matched_doc_id_list(body, &[ana, band], 0, 10), doc_ids(&[3]));
            assert_eq!(
                manager.get_matched_doc_id_list(body, &[ana, band], 1, 10),
                doc_ids(&[1, 2, 3])
            );
            // Documents carrying both tags.
            let both = [MatchRange::new(0, 1), MatchRange::new(1, 2)];
            assert_eq!(manager.get_matched_doc_id_list(tags, &both, 0, 10), doc_ids(&[3]));
        }
    }

    #[test]
    fn top_k_ranks_by_occurrence_weight() {
        let (fm, manager, body, tags) = setup(WaveletEncoding::Balanced);
        let ana = fm.backward_search(b"ana").range;
        let fruit = fm.backward_search(b"fruit").range;
        let ranked = manager.get_top_k_doc_id_list(
            body,
            &[WeightedRange::new(ana, 1.0), WeightedRange::new(fruit, 3.0)],
            10,
        );
        let order: Vec<DocId> = ranked.iter().map(|r| r.doc_id).collect();
        assert_eq!(order[0], DocId(4));
        assert_eq!(ranked[0].score, 3.0);
        assert_eq!(order.len(), 4);

        let by_tag = manager.get_top_k_doc_id_list(tags, &[WeightedRange::new(1..2, 2.0)], 10);
        let mut got: Vec<DocId> = by_tag.iter().map(|r| r.doc_id).collect();
        got.sort_unstable();
        assert_eq!(got, doc_ids(&[3, 4]));
    }

    #[test]
    fn filter_queries_restrict_top_k() {
        for enc in [WaveletEncoding::Balanced, WaveletEncoding::PrefixCode] {
            let (fm, manager, body, tags) = setup(enc);
            let ana = fm.backward_search(b"ana").range;
            let music = FilterQuery {
                array: tags,
                ids: vec![MatchRange::new(1, 2)],
            };
            let ranked = manager
                .get_top_k_doc_id_list_by_filter(body, &[WeightedRange::new(ana, 1.0)], &[music], 10)
                .unwrap();
            assert_eq!(ranked.iter().map(|r| r.doc_id).collect::<Vec<_>>(), doc_ids(&[3]));

            let not_a_filter = FilterQuery {
                array: body,
                ids: vec![],
            };
            assert!(matches!(
                manager.get_top_k_doc_id_list_by_filter(body, &[], &[not_a_filter], 10),
                Err(Error::UnknownArray(_))
            ));
        }
    }

    #[test]
    fn lookups_and_duplicates() {
        let (_, mut manager, body, tags) = setup(WaveletEncoding::Balanced);
        assert_eq!(manager.main_array("body").unwrap(), body);
        assert_eq!(manager.filter_array("tag").unwrap(), tags);
        assert!(matches!(manager.main_array("tag"), Err(Error::UnknownArray(_))));
        assert_eq!(manager.filter_count(tags), Some(2));
        assert!(manager.add_filter_array("tag", &[doc_ids(&[1])]).is_err());
        assert!(matches!(
            manager.add_filter_array("bad", &[doc_ids(&[9])]),
            Err(Error::SymbolOutOfRange { symbol: 9, .. })
        ));
    }

    #[test]
    fn reconstruct_filter_groups() {
        let (_, manager, body, tags) = setup(WaveletEncoding::PrefixCode);
        assert_eq!(
            manager.reconstruct_text(tags, &[]),
            vec![doc_ids(&[1, 2, 3]), doc_ids(&[3, 4])]
        );
        assert_eq!(
            manager.reconstruct_text(tags, &[DocId(3)]),
            vec![doc_ids(&[1, 2]), doc_ids(&[4])]
        );
        assert!(manager.reconstruct_text(body, &[]).is_empty());
    }

    #[test]
    fn save_load_round_trip() {
        let (fm, manager, body, _) = setup(WaveletEncoding::Balanced);
        let mut buf = Vec::new();
        manager.save(&mut buf).unwrap();
        let loaded = DocumentArrayManager::load(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded, manager);
        let ana = fm.backward_search(b"ana").range;
        assert_eq!(
            loaded.get_matched_doc_id_list(body, &[ana], 0, 10),
            manager.get_matched_doc_id_list(body, &[ana], 0, 10)
        );
    }
}
