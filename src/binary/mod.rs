// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary format for wavedex indexes.
//!
//! Every succinct structure knows how to `save` itself into an `io::Write`
//! and `load` itself back from an `io::Read`; this module supplies the shared
//! primitives they use and the file container that wraps a finished payload.
//!
//! # Security Considerations
//!
//! Index files may come from anywhere, so loading is defensive:
//! - All size fields are validated against MAX_* constants before allocating
//! - CRC32 footer detects corruption/truncation before payload parsing
//! - Varint decoder has maximum iteration limits
//! - Structural invariants (level populations, tree shape) are re-checked
//!
//! # Container Layout
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ HEADER (16 bytes)                                          │
//! │   magic: [u8; 4] = "WVDX"                                  │
//! │   version: u8 = 3                                          │
//! │   kind: u8 (1 = wavelet, 2 = fm-index, 3 = corpus)         │
//! │   reserved: [u8; 2]                                        │
//! │   payload_len: u64                                         │
//! ├────────────────────────────────────────────────────────────┤
//! │ PAYLOAD (structure-specific `save` output)                 │
//! ├────────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic "XDVW"                     │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Payload Layouts
//!
//! ```text
//! WaveletSequence: [alphabet_size u32][encoding u8][len u64][occ (σ+1) × u64]
//!                  balanced:    [levels u8][bit vector × levels]
//!                  prefix-code: preorder nodes, 0 = internal + bit vector,
//!                               1 = leaf + symbol u32
//! FmIndex:         [sample_rate u32][text_len u64][alphabet_size u32]
//!                  [sample table][sampled-row bit vector]
//!                  [delimiter array][wavelet]
//! CorpusIndex:     [default_top_k u64][delimiter u8][doc keys]
//!                  [properties: name + FmIndex][filters: name + values]
//!                  [document arrays]
//! ```

mod encoding;
mod header;

pub use encoding::{
    decode_varint, encode_varint, read_len, read_str, read_u32, read_u64, read_u8,
    read_varint, read_words, write_str, write_u32, write_u64, write_u8, write_varint,
    write_words,
};
pub use header::{
    unwrap_payload, wrap_payload, PayloadKind, WavedexFooter, WavedexHeader, FOOTER_MAGIC,
    MAGIC, MAX_ALPHABET_SIZE, MAX_ARRAYS, MAX_DOC_COUNT, MAX_FILE_SIZE, MAX_STRING_LEN,
    MAX_TREE_NODES, MAX_VARINT_BYTES, MAX_WORDS, VERSION,
};
