// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Ranked multi-term queries over a [`super::CorpusIndex`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A property to search and the score each matching term contributes.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PropertyWeight {
    pub name: String,
    pub weight: f64,
}

/// Terms to look up, where, and how to restrict the documents.
///
/// Each term scores `weight` in every property it fully occurs in. Filter
/// values for the same attribute are alternatives; distinct attributes must
/// all match.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Query {
    pub terms: Vec<String>,
    /// Properties to search; empty means all, each with weight 1.
    #[serde(default)]
    pub properties: Vec<PropertyWeight>,
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
    /// Result count; the index default when absent.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Score partial matches by their longest matching substring.
    #[serde(default)]
    pub fuzzy: bool,
}

impl Query {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn property(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.properties.push(PropertyWeight {
            name: name.into(),
            weight,
        });
        self
    }

    pub fn filter(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters
            .entry(attribute.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }
}
