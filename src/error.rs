// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types for index construction and loading.
//!
//! Only build and load can fail. Queries never return errors: an out-of-range
//! position, an empty match range or an exhausted frontier all come back as
//! `None` or an empty `Vec`.

use thiserror::Error;

/// Everything that can go wrong while building or loading an index.
#[derive(Debug, Error)]
pub enum Error {
    /// Tried to build a structure from zero symbols or zero documents.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Alphabet size of zero.
    #[error("alphabet size must be positive")]
    EmptyAlphabet,

    /// A symbol does not fit the declared alphabet.
    #[error("symbol {symbol} at position {position} is outside alphabet of size {alphabet_size}")]
    SymbolOutOfRange {
        symbol: u32,
        position: usize,
        alphabet_size: u32,
    },

    /// The prefix-code encoding only supports alphabets up to `max` symbols.
    #[error("alphabet size {alphabet_size} exceeds the prefix-code limit of {max}")]
    AlphabetTooLarge { alphabet_size: u32, max: u32 },

    /// A document contains the byte used to separate documents.
    #[error("document {doc} contains the delimiter byte {delimiter:#04x}")]
    DelimiterInDocument { doc: usize, delimiter: u8 },

    /// Per-document lengths do not add up to the indexed sequence length.
    #[error("inconsistent lengths: {0}")]
    InconsistentLengths(String),

    /// Configuration rejected by [`crate::IndexConfig::validate`].
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No main or filter array with this name.
    #[error("unknown document array: {0}")]
    UnknownArray(String),

    /// Stored structure disagrees with what the caller expects to load.
    #[error("serialization mismatch in {what}: expected {expected}, found {found}")]
    SerializationMismatch {
        what: &'static str,
        expected: u64,
        found: u64,
    },

    /// Structurally invalid bytes (bad magic, checksum, limits, truncation).
    #[error("corrupt index: {0}")]
    Corrupt(String),

    /// An I/O error occurred during serialization or deserialization.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for index operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::Corrupt(msg.into())
    }
}
