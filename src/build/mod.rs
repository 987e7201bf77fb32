// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Corpus indexing: one FM-index per property, document arrays on top.
//!
//! ```text
//! Corpus ──► property "title" ──► FmIndex ──► main array "title"  ┐
//!        ──► property "body"  ──► FmIndex ──► main array "body"   ├─ DocumentArrayManager
//!        ──► filter "tag"     ──► sorted values ──► filter array  ┘
//! ```
//!
//! A query term is backward-searched in each property's FM-index; its row
//! range is a range of that property's main array. Ranking is then a
//! weighted top-K union over those ranges, restricted by filter arrays.

pub mod document;
pub mod parallel;
pub mod query;

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

#[cfg(feature = "parallel")]
use indicatif::ProgressBar;
use serde::Serialize;

use crate::binary::{
    read_len, read_str, read_u64, read_u8, unwrap_payload, wrap_payload, write_str, write_u64,
    write_u8, write_varint, PayloadKind, MAX_ARRAYS, MAX_DOC_COUNT, MAX_WORDS,
};
use crate::config::IndexConfig;
use crate::doc_array::{ArrayRef, DocumentArrayManager, FilterQuery};
use crate::error::{Error, Result};
use crate::fm_index::FmIndex;
use crate::types::{DocId, MatchRange, RankedDoc, WeightedRange};

pub use document::{Corpus, CorpusDocument};
pub use parallel::{build_properties, build_properties_with_progress, BuiltProperty};
pub use query::{PropertyWeight, Query};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Property {
    name: String,
    index: FmIndex,
    array: ArrayRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Filter {
    name: String,
    /// Sorted; the position of a value is its filter id.
    values: Vec<String>,
    array: ArrayRef,
}

impl Filter {
    fn id_of(&self, value: &str) -> Option<usize> {
        self.values
            .binary_search_by(|v| v.as_str().cmp(value))
            .ok()
    }
}

/// A searchable corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusIndex {
    default_top_k: usize,
    delimiter: u8,
    doc_keys: Vec<String>,
    properties: Vec<Property>,
    filters: Vec<Filter>,
    arrays: DocumentArrayManager,
}

/// Size and shape of a [`CorpusIndex`].
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub doc_count: usize,
    pub properties: Vec<PropertySummary>,
    pub filters: Vec<FilterSummary>,
    pub doc_array_bytes: usize,
    pub total_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertySummary {
    pub name: String,
    pub text_len: usize,
    pub sample_rate: u32,
    pub encoding: &'static str,
    pub bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    pub name: String,
    pub values: usize,
    pub entries: usize,
}

impl CorpusIndex {
    pub fn build(corpus: &Corpus, config: &IndexConfig) -> Result<Self> {
        let names = Self::prepare(corpus, config)?;
        let built = build_properties(corpus, &names, config)?;
        Self::assemble(corpus, config, built)
    }

    /// [`build`](Self::build), reporting each finished property on `progress`.
    #[cfg(feature = "parallel")]
    pub fn build_with_progress(
        corpus: &Corpus,
        config: &IndexConfig,
        progress: &ProgressBar,
    ) -> Result<Self> {
        let names = Self::prepare(corpus, config)?;
        progress.set_length(names.len() as u64);
        let built = build_properties_with_progress(corpus, &names, config, progress)?;
        Self::assemble(corpus, config, built)
    }

    /// Validate inputs; the property names to build, sorted.
    fn prepare(corpus: &Corpus, config: &IndexConfig) -> Result<Vec<String>> {
        config.validate()?;
        if corpus.is_empty() {
            return Err(Error::EmptyInput("corpus has no documents"));
        }
        let names = corpus.property_names();
        if names.is_empty() {
            return Err(Error::EmptyInput("corpus documents have no properties"));
        }
        Ok(names)
    }

    fn assemble(corpus: &Corpus, config: &IndexConfig, built: Vec<BuiltProperty>) -> Result<Self> {
        let doc_count = corpus.len();
        let mut arrays = DocumentArrayManager::new(doc_count, config.doc_array_encoding)?;

        let mut properties = Vec::with_capacity(built.len());
        for b in built {
            let array = arrays.add_main_array(
                &b.name,
                &b.document_array,
                b.index.document_spans().clone(),
            )?;
            properties.push(Property {
                name: b.name,
                index: b.index,
                array,
            });
        }

        let mut filters = Vec::new();
        for name in corpus.filter_names() {
            let mut groups: BTreeMap<&str, BTreeSet<DocId>> = BTreeMap::new();
            for (i, doc) in corpus.documents.iter().enumerate() {
                for value in doc.filters.get(&name).into_iter().flatten() {
                    groups.entry(value.as_str()).or_default().insert(DocId::from_index(i));
                }
            }
            if groups.is_empty() {
                tracing::warn!(filter = %name, "filter attribute has no values; skipped");
                continue;
            }
            let values: Vec<String> = groups.keys().map(|v| v.to_string()).collect();
            let groups: Vec<Vec<DocId>> = groups.into_values().map(|g| g.into_iter().collect()).collect();
            let array = arrays.add_filter_array(&name, &groups)?;
            filters.push(Filter {
                name,
                values,
                array,
            });
        }

        let index = Self {
            default_top_k: config.default_top_k,
            delimiter: config.delimiter,
            doc_keys: corpus
                .documents
                .iter()
                .map(|d| d.id.clone().unwrap_or_default())
                .collect(),
            properties,
            filters,
            arrays,
        };
        tracing::info!(
            docs = doc_count,
            properties = index.properties.len(),
            filters = index.filters.len(),
            bytes = index.alloc_size(),
            "built corpus index"
        );
        Ok(index)
    }

    pub fn doc_count(&self) -> usize {
        self.doc_keys.len()
    }

    /// The caller-supplied key of `doc`, if it had one.
    pub fn doc_key(&self, doc: DocId) -> Option<&str> {
        DocId::new(doc.get(), self.doc_count())
            .and_then(|doc| self.doc_keys.get(doc.index()))
            .map(String::as_str)
            .filter(|k| !k.is_empty())
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    pub fn property(&self, name: &str) -> Option<&FmIndex> {
        self.properties.iter().find(|p| p.name == name).map(|p| &p.index)
    }

    pub fn filter_values(&self, attribute: &str) -> Option<&[String]> {
        self.filters
            .iter()
            .find(|f| f.name == attribute)
            .map(|f| f.values.as_slice())
    }

    pub fn document_arrays(&self) -> &DocumentArrayManager {
        &self.arrays
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// Rank documents for `query`, best first.
    ///
    /// Each property yields its own top-K, which are then merged by summed
    /// score. A document just below the cut in several properties can
    /// therefore be missed.
    pub fn search(&self, query: &Query) -> Result<Vec<RankedDoc>> {
        let top_k = query.limit.unwrap_or(self.default_top_k);
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let targets: Vec<(&Property, f64)> = if query.properties.is_empty() {
            self.properties.iter().map(|p| (p, 1.0)).collect()
        } else {
            query
                .properties
                .iter()
                .map(|pw| {
                    self.properties
                        .iter()
                        .find(|p| p.name == pw.name)
                        .map(|p| (p, pw.weight))
                        .ok_or_else(|| Error::UnknownArray(pw.name.clone()))
                })
                .collect::<Result<_>>()?
        };

        let mut filter_queries = Vec::with_capacity(query.filters.len());
        for (attribute, values) in &query.filters {
            let filter = self
                .filters
                .iter()
                .find(|f| &f.name == attribute)
                .ok_or_else(|| Error::UnknownArray(attribute.clone()))?;
            let ids: Vec<MatchRange> = values
                .iter()
                .filter_map(|v| filter.id_of(v))
                .map(|id| MatchRange::new(id, id + 1))
                .collect();
            filter_queries.push(FilterQuery {
                array: filter.array,
                ids,
            });
        }

        let mut scores: BTreeMap<DocId, f64> = BTreeMap::new();
        for (property, weight) in targets {
            let ranges = self.term_ranges(&property.index, &query.terms, weight, query.fuzzy);
            if ranges.is_empty() {
                continue;
            }
            let ranked = self.arrays.get_top_k_doc_id_list_by_filter(
                property.array,
                &ranges,
                &filter_queries,
                top_k,
            )?;
            for r in ranked {
                *scores.entry(r.doc_id).or_insert(0.0) += r.score;
            }
        }

        let mut results: Vec<RankedDoc> = scores
            .into_iter()
            .map(|(doc_id, score)| RankedDoc { doc_id, score })
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
        results.truncate(top_k);
        tracing::debug!(terms = query.terms.len(), results = results.len(), "search");
        Ok(results)
    }

    /// Weighted row ranges of every term in one property.
    fn term_ranges(&self, index: &FmIndex, terms: &[String], weight: f64, fuzzy: bool) -> Vec<WeightedRange> {
        let mut ranges = Vec::new();
        for term in terms {
            let pattern = term.as_bytes();
            if pattern.is_empty() || pattern.contains(&self.delimiter) {
                continue;
            }
            let m = index.backward_search(pattern);
            if m.is_full(pattern.len()) {
                ranges.push(WeightedRange::new(m.range, weight));
            } else if fuzzy {
                let (len, found) = index.longest_suffix_match_ranges(pattern);
                if len == 0 {
                    continue;
                }
                let partial = weight * len as f64 / pattern.len() as f64;
                ranges.extend(found.into_iter().map(|r| WeightedRange::new(r, partial)));
            }
        }
        ranges
    }

    // ========================================================================
    // INSPECTION
    // ========================================================================

    pub fn alloc_size(&self) -> usize {
        self.properties.iter().map(|p| p.index.alloc_size()).sum::<usize>() + self.arrays.alloc_size()
    }

    pub fn inspect(&self) -> IndexSummary {
        IndexSummary {
            doc_count: self.doc_count(),
            properties: self
                .properties
                .iter()
                .map(|p| PropertySummary {
                    name: p.name.clone(),
                    text_len: p.index.text_len(),
                    sample_rate: p.index.sample_rate(),
                    encoding: p.index.bwt().encoding().name(),
                    bytes: p.index.alloc_size(),
                })
                .collect(),
            filters: self
                .filters
                .iter()
                .map(|f| FilterSummary {
                    name: f.name.clone(),
                    values: f.values.len(),
                    entries: self.arrays.sequence(f.array).map_or(0, |s| s.len()),
                })
                .collect(),
            doc_array_bytes: self.arrays.alloc_size(),
            total_bytes: self.alloc_size(),
        }
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Layout: `[default_top_k u64][delimiter u8][doc_count u64][doc keys]`
    /// `[property count][name, FmIndex]…[filter count][name, values]…`
    /// `[document arrays]`.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write_u64(w, self.default_top_k as u64)?;
        write_u8(w, self.delimiter)?;
        write_u64(w, self.doc_keys.len() as u64)?;
        for key in &self.doc_keys {
            write_str(w, key)?;
        }
        write_varint(w, self.properties.len() as u64)?;
        for p in &self.properties {
            write_str(w, &p.name)?;
            p.index.save(w)?;
        }
        write_varint(w, self.filters.len() as u64)?;
        for f in &self.filters {
            write_str(w, &f.name)?;
            write_varint(w, f.values.len() as u64)?;
            for v in &f.values {
                write_str(w, v)?;
            }
        }
        self.arrays.save(w)
    }

    pub fn load<R: Read>(r: &mut R) -> Result<Self> {
        let default_top_k = read_u64(r)? as usize;
        let delimiter = read_u8(r)?;
        let doc_count = read_len(r, MAX_DOC_COUNT as usize, "document count")?;
        let mut doc_keys = Vec::new();
        for _ in 0..doc_count {
            doc_keys.push(read_str(r)?);
        }

        let property_count = read_len(r, MAX_ARRAYS, "property count")?;
        let mut properties = Vec::with_capacity(property_count);
        for i in 0..property_count {
            let name = read_str(r)?;
            let index = FmIndex::load(r)?;
            if index.doc_count() != doc_count {
                return Err(Error::corrupt(format!(
                    "property {:?} indexes {} documents, corpus has {}",
                    name,
                    index.doc_count(),
                    doc_count
                )));
            }
            properties.push(Property {
                name,
                index,
                array: ArrayRef::Main(i),
            });
        }

        let filter_count = read_len(r, MAX_ARRAYS, "filter count")?;
        let mut filters = Vec::with_capacity(filter_count);
        for i in 0..filter_count {
            let name = read_str(r)?;
            let value_count = read_len(r, MAX_WORDS, "filter value count")?;
            let mut values = Vec::new();
            for _ in 0..value_count {
                values.push(read_str(r)?);
            }
            if !values.windows(2).all(|w| w[0] < w[1]) {
                return Err(Error::corrupt(format!("filter {:?} values are not sorted", name)));
            }
            filters.push(Filter {
                name,
                values,
                array: ArrayRef::Filter(i),
            });
        }

        let arrays = DocumentArrayManager::load(r)?;
        if arrays.doc_count() != doc_count {
            return Err(Error::corrupt("document arrays disagree on document count"));
        }
        for p in &properties {
            if arrays.name(p.array) != Some(p.name.as_str()) {
                return Err(Error::corrupt(format!("no main array for property {:?}", p.name)));
            }
        }
        for f in &filters {
            if arrays.name(f.array) != Some(f.name.as_str())
                || arrays.filter_count(f.array) != Some(f.values.len())
            {
                return Err(Error::corrupt(format!("filter array {:?} does not match its values", f.name)));
            }
        }

        Ok(Self {
            default_top_k,
            delimiter,
            doc_keys,
            properties,
            filters,
            arrays,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        self.save(&mut payload)?;
        Ok(wrap_payload(PayloadKind::Corpus, &payload))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut payload = unwrap_payload(bytes, PayloadKind::Corpus)?;
        let index = Self::load(&mut payload)?;
        if !payload.is_empty() {
            return Err(Error::corrupt(format!(
                "{} trailing bytes after corpus payload",
                payload.len()
            )));
        }
        Ok(index)
    }
}
