// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index file header and footer.
//!
//! The header is 16 bytes: magic, version, payload kind and the payload
//! length. The footer is 8 bytes: a CRC32 over header + payload plus a magic
//! number ("XDVW", the header magic reversed). A file whose footer does not
//! check out is rejected before a single payload byte is parsed.

use std::io::{self, Read, Write};

use crc32fast::Hasher as Crc32Hasher;

use crate::error::{Error, Result};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "WVDX" in ASCII (header)
pub const MAGIC: [u8; 4] = [0x57, 0x56, 0x44, 0x58];

/// Footer magic: "XDVW" (reversed, marks valid file end)
pub const FOOTER_MAGIC: [u8; 4] = [0x58, 0x44, 0x56, 0x57];

/// Current format version
pub const VERSION: u8 = 3;

// ============================================================================
// SECURITY LIMITS (prevent resource exhaustion from malicious input)
// ============================================================================

/// Maximum file size: 4 GiB
pub const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024 * 1024;

/// Maximum number of documents
pub const MAX_DOC_COUNT: u32 = 100_000_000;

/// Maximum alphabet size of any stored wavelet sequence
pub const MAX_ALPHABET_SIZE: u32 = MAX_DOC_COUNT + 1;

/// Maximum number of `u64` words in one stored bit vector or int vector
pub const MAX_WORDS: usize = 1 << 28;

/// Maximum number of nodes in a stored prefix-code tree
pub const MAX_TREE_NODES: usize = 2 * MAX_ALPHABET_SIZE as usize;

/// Maximum number of named arrays in a document array manager
pub const MAX_ARRAYS: usize = 4096;

/// Maximum length of a stored name
pub const MAX_STRING_LEN: usize = 64 * 1024;

/// Maximum varint bytes (u64 needs at most 10 bytes)
pub const MAX_VARINT_BYTES: usize = 10;

// ============================================================================
// PAYLOAD KINDS
// ============================================================================

/// What the payload of an index file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadKind {
    /// A single `WaveletSequence`
    Wavelet = 1,
    /// A single `FmIndex`
    FmIndex = 2,
    /// A complete `CorpusIndex`
    Corpus = 3,
}

impl PayloadKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Wavelet),
            2 => Some(Self::FmIndex),
            3 => Some(Self::Corpus),
            _ => None,
        }
    }
}

// ============================================================================
// HEADER
// ============================================================================

/// Binary format header (16 bytes fixed size)
#[derive(Debug, Clone)]
pub struct WavedexHeader {
    pub version: u8,
    pub kind: PayloadKind,
    pub payload_len: u64,
}

impl WavedexHeader {
    // 4 (magic) + 1 (version) + 1 (kind) + 2 (reserved) + 8 (payload_len) = 16
    pub const SIZE: usize = 16;

    pub fn new(kind: PayloadKind, payload_len: u64) -> Self {
        Self {
            version: VERSION,
            kind,
            payload_len,
        }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&[self.version])?;
        w.write_all(&[self.kind as u8])?;
        w.write_all(&[0u8; 2])?; // reserved
        w.write_all(&self.payload_len.to_le_bytes())?;
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::corrupt(format!(
                "Invalid magic: expected WVDX, got {:?}",
                magic
            )));
        }

        let mut buf = [0u8; 12]; // 16 - 4 (magic) = 12
        r.read_exact(&mut buf)?;

        let version = buf[0];
        if version != VERSION {
            return Err(Error::SerializationMismatch {
                what: "format version",
                expected: VERSION as u64,
                found: version as u64,
            });
        }
        let kind = PayloadKind::from_u8(buf[1])
            .ok_or_else(|| Error::corrupt(format!("Unknown payload kind {}", buf[1])))?;
        // buf[2..4] is reserved
        let payload_len = u64::from_le_bytes([
            buf[4], buf[5], buf[6], buf[7], buf[8], buf[9], buf[10], buf[11],
        ]);

        Ok(Self {
            version,
            kind,
            payload_len,
        })
    }
}

// ============================================================================
// FOOTER (8 bytes)
// ============================================================================

/// Footer with CRC32 checksum and magic number
#[derive(Debug, Clone)]
pub struct WavedexFooter {
    /// CRC32 checksum of header + payload (everything before footer)
    pub crc32: u32,
}

impl WavedexFooter {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.crc32.to_le_bytes())?;
        w.write_all(&FOOTER_MAGIC)?;
        Ok(())
    }

    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(Error::corrupt("File too short for footer"));
        }

        let footer_start = bytes.len() - Self::SIZE;

        let magic = &bytes[footer_start + 4..];
        if magic != FOOTER_MAGIC {
            return Err(Error::corrupt(format!(
                "Invalid footer magic: expected XDVW, got {:?}",
                magic
            )));
        }

        let crc32 = u32::from_le_bytes([
            bytes[footer_start],
            bytes[footer_start + 1],
            bytes[footer_start + 2],
            bytes[footer_start + 3],
        ]);

        Ok(Self { crc32 })
    }

    /// Compute CRC32 over the given bytes
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}

// ============================================================================
// CONTAINER
// ============================================================================

/// Wrap a serialized payload in header + footer.
pub fn wrap_payload(kind: PayloadKind, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WavedexHeader::SIZE + payload.len() + WavedexFooter::SIZE);
    // Writes into a Vec cannot fail.
    let _ = WavedexHeader::new(kind, payload.len() as u64).write(&mut out);
    out.extend_from_slice(payload);
    let crc32 = WavedexFooter::compute_crc32(&out);
    let _ = WavedexFooter { crc32 }.write(&mut out);
    out
}

/// Validate header, length and checksum, returning the payload slice.
pub fn unwrap_payload(bytes: &[u8], expected: PayloadKind) -> Result<&[u8]> {
    if bytes.len() as u64 > MAX_FILE_SIZE {
        return Err(Error::corrupt(format!(
            "File size {} exceeds limit {}",
            bytes.len(),
            MAX_FILE_SIZE
        )));
    }
    if bytes.len() < WavedexHeader::SIZE + WavedexFooter::SIZE {
        return Err(Error::corrupt("File too short for header and footer"));
    }

    let header = WavedexHeader::read(&mut &bytes[..WavedexHeader::SIZE])?;
    if header.kind != expected {
        return Err(Error::SerializationMismatch {
            what: "payload kind",
            expected: expected as u64,
            found: header.kind as u64,
        });
    }

    let content_end = bytes.len() - WavedexFooter::SIZE;
    let payload_len = content_end - WavedexHeader::SIZE;
    if header.payload_len != payload_len as u64 {
        return Err(Error::corrupt(format!(
            "Payload length mismatch: header says {}, file has {}",
            header.payload_len, payload_len
        )));
    }

    let footer = WavedexFooter::read(bytes)?;
    let actual = WavedexFooter::compute_crc32(&bytes[..content_end]);
    if footer.crc32 != actual {
        return Err(Error::corrupt(format!(
            "CRC32 mismatch: expected {:08x}, got {:08x}",
            footer.crc32, actual
        )));
    }

    Ok(&bytes[WavedexHeader::SIZE..content_end])
}
