// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Corpus input model.
//!
//! A corpus is a JSON document list. Each document maps property names to
//! text (every property gets its own FM-index) and filter attributes to
//! values (every attribute gets its own filter array).
//!
//! ```json
//! {
//!   "documents": [
//!     { "id": "post-1",
//!       "properties": { "title": "Banana bread", "body": "..." },
//!       "filters": { "tag": ["baking", "fruit"] } }
//!   ]
//! }
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CorpusDocument {
    /// Caller-facing key, shown in results. Optional.
    #[serde(default)]
    pub id: Option<String>,
    /// Property name to searchable text.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Filter attribute to the values this document carries.
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
}

impl CorpusDocument {
    /// Text of `property` with `delimiter` bytes blanked out; empty when absent.
    pub fn property_bytes(&self, property: &str, delimiter: u8) -> Cow<'_, [u8]> {
        let bytes = self
            .properties
            .get(property)
            .map(|s| s.as_bytes())
            .unwrap_or_default();
        if bytes.contains(&delimiter) {
            Cow::Owned(
                bytes
                    .iter()
                    .map(|&b| if b == delimiter { b' ' } else { b })
                    .collect(),
            )
        } else {
            Cow::Borrowed(bytes)
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
    pub documents: Vec<CorpusDocument>,
}

impl Corpus {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidConfig(format!("corpus JSON: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Every property name used by some document, sorted.
    pub fn property_names(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self
            .documents
            .iter()
            .flat_map(|d| d.properties.keys())
            .collect();
        names.into_iter().cloned().collect()
    }

    /// Every filter attribute used by some document, sorted.
    pub fn filter_names(&self) -> Vec<String> {
        let names: BTreeSet<&String> = self
            .documents
            .iter()
            .flat_map(|d| d.filters.keys())
            .collect();
        names.into_iter().cloned().collect()
    }
}
