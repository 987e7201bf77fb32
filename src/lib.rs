// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Succinct full-text self-index with ranked document retrieval.
//!
//! A corpus is a list of documents. Every searchable property of those
//! documents becomes an FM-index whose BWT lives in a wavelet sequence, and
//! a document array maps each BWT row back to the document holding it.
//! Ranking is a best-first walk of the document array's wavelet sequence:
//! the K documents with the highest weighted hit counts come out first,
//! without enumerating every occurrence.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │  succinct   │────▶│   wavelet    │────▶│    fm_index      │
//! │ (BitVector, │     │ (matrix,     │     │ (backward search,│
//! │ Cumulative) │     │  prefix code)│     │  locate, docs)   │
//! └─────────────┘     └──────────────┘     └──────────────────┘
//!                            │                      │
//!                            ▼                      ▼
//!                     ┌──────────────┐     ┌──────────────────┐
//!                     │  doc_array   │────▶│ build::Corpus-   │
//!                     │ (main,filter)│     │ Index (search)   │
//!                     └──────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use wavedex::build::{Corpus, CorpusDocument, CorpusIndex, Query};
//! use wavedex::IndexConfig;
//!
//! let mut doc = CorpusDocument::default();
//! doc.properties.insert("body".into(), "banana bread".into());
//! let corpus = Corpus { documents: vec![doc] };
//!
//! let index = CorpusIndex::build(&corpus, &IndexConfig::default()).unwrap();
//! let hits = index.search(&Query::new(["nana"])).unwrap();
//! assert_eq!(hits[0].doc_id.get(), 1);
//! ```

pub mod binary;
pub mod build;
pub mod config;
pub mod contracts;
pub mod doc_array;
pub mod error;
pub mod fm_index;
pub mod sais;
pub mod succinct;
pub mod types;
pub mod util;
pub mod wavelet;

#[doc(hidden)]
pub mod testing;

pub use config::{IndexConfig, WaveletEncoding, DEFAULT_SAMPLE_RATE, DEFAULT_TOP_K};
pub use doc_array::{ArrayRef, DocumentArrayManager, FilterQuery};
pub use error::{Error, Result};
pub use fm_index::FmIndex;
pub use types::{
    DocId, MatchRange, RankedDoc, RankedSymbol, SearchMatch, WeightedRange,
};
pub use wavelet::{AuxFilter, WaveletSequence};
