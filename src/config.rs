// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index construction settings.
//!
//! Loaded from JSON by the CLI (`--config`), otherwise `IndexConfig::default()`.
//! Every field has a serde default, so a partial file only overrides what it
//! names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a wavelet sequence encodes its symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum WaveletEncoding {
    /// Fixed `⌈log2 σ⌉`-bit codes (wavelet matrix). Good for dense alphabets.
    #[default]
    Balanced = 0,
    /// Huffman-shaped tree. Good for skewed alphabets, `σ <= 65536`.
    PrefixCode = 1,
}

impl WaveletEncoding {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Balanced),
            1 => Some(Self::PrefixCode),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::PrefixCode => "prefix-code",
        }
    }
}

/// Default suffix-array sampling rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 32;

/// Default number of ranked results.
pub const DEFAULT_TOP_K: usize = 20;

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_delimiter() -> u8 {
    b'\n'
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// Knobs for building an [`crate::FmIndex`] and its document arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Every text position divisible by this is sampled. Larger is smaller
    /// and slower to locate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Encoding of the BWT wavelet sequence.
    #[serde(default)]
    pub encoding: WaveletEncoding,

    /// Encoding of document-id wavelet sequences.
    #[serde(default)]
    pub doc_array_encoding: WaveletEncoding,

    /// Byte that terminates each document. Documents may not contain it.
    #[serde(default = "default_delimiter")]
    pub delimiter: u8,

    /// Result count when a query does not ask for one.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            encoding: WaveletEncoding::default(),
            doc_array_encoding: WaveletEncoding::default(),
            delimiter: default_delimiter(),
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidConfig("sample_rate must be at least 1".into()));
        }
        if self.default_top_k == 0 {
            return Err(Error::InvalidConfig("default_top_k must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
