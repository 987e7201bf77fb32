// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Parallel per-property index construction.
//!
//! Every property is an independent FM-index over the same document list,
//! so the builds are embarrassingly parallel. With the `parallel` feature
//! they run on rayon's pool; without it, one after another.

#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use indicatif::ProgressBar;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::IndexConfig;
use crate::error::Result;
use crate::fm_index::FmIndex;

use super::Corpus;

/// One property's FM-index with its document array, ready to register.
pub struct BuiltProperty {
    pub name: String,
    pub index: FmIndex,
    pub document_array: Vec<u32>,
}

fn build_property(corpus: &Corpus, name: &str, config: &IndexConfig) -> Result<BuiltProperty> {
    let texts: Vec<_> = corpus
        .documents
        .iter()
        .map(|d| d.property_bytes(name, config.delimiter))
        .collect();
    let blanked = corpus
        .documents
        .iter()
        .filter(|d| d.properties.get(name).is_some_and(|t| t.as_bytes().contains(&config.delimiter)))
        .count();
    if blanked > 0 {
        tracing::warn!(
            property = name,
            documents = blanked,
            delimiter = config.delimiter,
            "replaced delimiter bytes with spaces"
        );
    }

    let (index, document_array) = FmIndex::build_with_document_array(&texts, config)?;
    Ok(BuiltProperty {
        name: name.to_string(),
        index,
        document_array,
    })
}

/// Build every property in `names`, in the same order.
pub fn build_properties(
    corpus: &Corpus,
    names: &[String],
    config: &IndexConfig,
) -> Result<Vec<BuiltProperty>> {
    #[cfg(feature = "parallel")]
    let iter = names.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = names.iter();

    iter.map(|name| build_property(corpus, name, config))
        .collect()
}

/// Build every property with progress reporting.
#[cfg(feature = "parallel")]
pub fn build_properties_with_progress(
    corpus: &Corpus,
    names: &[String],
    config: &IndexConfig,
    progress: &ProgressBar,
) -> Result<Vec<BuiltProperty>> {
    let counter = AtomicUsize::new(0);

    names
        .par_iter()
        .map(|name| {
            let built = build_property(corpus, name, config)?;

            // Update progress
            let count = counter.fetch_add(1, Ordering::Relaxed) + 1;
            progress.set_position(count as u64);
            progress.set_message(format!("{} ({} symbols)", name, built.index.text_len()));

            Ok(built)
        })
        .collect()
}

/// Build every property with progress reporting.
/// Non-parallel fallback (no-op progress).
#[cfg(not(feature = "parallel"))]
pub fn build_properties_with_progress(
    corpus: &Corpus,
    names: &[String],
    config: &IndexConfig,
) -> Result<Vec<BuiltProperty>> {
    build_properties(corpus, names, config)
}
