// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary encoding primitives: varints and little-endian fixed-width fields.
//!
//! Every structure in the index serializes itself through these helpers, so
//! endianness and bounds checking live in exactly one place. Readers take an
//! explicit element limit before allocating; a corrupted length prefix turns
//! into an `InvalidData` error instead of a multi-gigabyte `Vec`.
//!
//! # References
//!
//! - **Varint (LEB128)**: Little-endian base-128 variable-length integer encoding.
//!   See DWARF4 §7.6 "Variable Length Data" and the Protocol Buffers encoding
//!   guide: <https://protobuf.dev/programming-guides/encoding/>

use std::io::{self, Read, Write};

use super::header::{MAX_STRING_LEN, MAX_VARINT_BYTES};

// ============================================================================
// VARINT ENCODING
// ============================================================================

/// Encode a varint to bytes
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        } else {
            buf.push(byte | 0x80);
        }
    }
}

/// Decode a varint from bytes, returning (value, bytes_consumed)
///
/// Returns an error if:
/// - Buffer is empty
/// - Varint exceeds MAX_VARINT_BYTES (malformed/malicious input)
pub fn decode_varint(bytes: &[u8]) -> io::Result<(u64, usize)> {
    if bytes.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Empty buffer for varint",
        ));
    }

    let mut result: u64 = 0;
    let mut shift = 0;
    let mut i = 0;

    while i < bytes.len() && i < MAX_VARINT_BYTES {
        let byte = bytes[i];
        result |= ((byte & 0x7F) as u64) << shift;
        i += 1;
        if byte & 0x80 == 0 {
            return Ok((result, i));
        }
        shift += 7;
    }

    if i >= MAX_VARINT_BYTES {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Varint exceeds maximum length (possible corruption)",
        ))
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Incomplete varint",
        ))
    }
}

/// Write a varint to a stream.
pub fn write_varint<W: Write>(w: &mut W, value: u64) -> io::Result<()> {
    let mut buf = Vec::with_capacity(MAX_VARINT_BYTES);
    encode_varint(value, &mut buf);
    w.write_all(&buf)
}

/// Read a varint from a stream, one byte at a time.
pub fn read_varint<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = Vec::with_capacity(MAX_VARINT_BYTES);
    loop {
        let byte = read_u8(r)?;
        buf.push(byte);
        if byte & 0x80 == 0 || buf.len() >= MAX_VARINT_BYTES {
            break;
        }
    }
    decode_varint(&buf).map(|(value, _)| value)
}

// ============================================================================
// FIXED-WIDTH FIELDS
// ============================================================================

pub fn write_u8<W: Write>(w: &mut W, value: u8) -> io::Result<()> {
    w.write_all(&[value])
}

pub fn write_u32<W: Write>(w: &mut W, value: u32) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn write_u64<W: Write>(w: &mut W, value: u64) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn read_u8<R: Read>(r: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a `u64` that must fit a `usize` no larger than `max`.
pub fn read_len<R: Read>(r: &mut R, max: usize, what: &str) -> io::Result<usize> {
    let value = read_u64(r)?;
    if value > max as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} {} exceeds limit {}", what, value, max),
        ));
    }
    Ok(value as usize)
}

// ============================================================================
// WORD ARRAYS AND STRINGS
// ============================================================================

/// Write a length-prefixed array of `u64` words.
pub fn write_words<W: Write>(w: &mut W, words: &[u64]) -> io::Result<()> {
    write_u64(w, words.len() as u64)?;
    for &word in words {
        w.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}

/// Initial capacity bound for [`read_words`].
const READ_CHUNK_WORDS: usize = 4096;

/// Read a length-prefixed array of `u64` words, rejecting more than `max_words`.
pub fn read_words<R: Read>(r: &mut R, max_words: usize) -> io::Result<Vec<u64>> {
    let count = read_len(r, max_words, "word count")?;
    // The count is untrusted until the words actually arrive.
    let mut words = Vec::with_capacity(count.min(READ_CHUNK_WORDS));
    for _ in 0..count {
        words.push(read_u64(r)?);
    }
    Ok(words)
}

/// Write a varint-length-prefixed UTF-8 string.
pub fn write_str<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    write_varint(w, s.len() as u64)?;
    w.write_all(s.as_bytes())
}

/// Read a varint-length-prefixed UTF-8 string.
pub fn read_str<R: Read>(r: &mut R) -> io::Result<String> {
    let len = read_varint(r)? as usize;
    if len > MAX_STRING_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("String length {} exceeds limit {}", len, MAX_STRING_LEN),
        ));
    }
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use crate::binary::MAX_WORDS;

    #[test]
    fn varint_boundaries() {
        for value in [0u64, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            let (decoded, consumed) = decode_varint(&buf).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn varint_rejects_overlong_input() {
        let bytes = [0xFFu8; 12];
        assert!(decode_varint(&bytes).is_err());
        assert!(read_varint(&mut Cursor::new(&bytes[..])).is_err());
    }

    #[test]
    fn truncated_varint_is_eof() {
        let err = decode_varint(&[0x80, 0x80]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn words_respect_limit() {
        let mut buf = Vec::new();
        write_words(&mut buf, &[1, 2, 3]).unwrap();
        assert_eq!(read_words(&mut Cursor::new(&buf), 3).unwrap(), vec![1, 2, 3]);
        assert!(read_words(&mut Cursor::new(&buf), 2).is_err());
    }

    #[test]
    fn oversized_word_count_fails_on_missing_words() {
        // Claims close to MAX_WORDS words but carries two.
        let mut buf = Vec::new();
        write_u64(&mut buf, (MAX_WORDS - 1) as u64).unwrap();
        write_u64(&mut buf, 1).unwrap();
        write_u64(&mut buf, 2).unwrap();
        let err = read_words(&mut Cursor::new(&buf), MAX_WORDS).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn strings_and_fixed_fields_stream_in_order() {
        let mut buf = Vec::new();
        write_u8(&mut buf, 7).unwrap();
        write_str(&mut buf, "title").unwrap();
        write_u32(&mut buf, 0xDEAD_BEEF).unwrap();
        write_varint(&mut buf, 300).unwrap();

        let mut r = Cursor::new(&buf);
        assert_eq!(read_u8(&mut r).unwrap(), 7);
        assert_eq!(read_str(&mut r).unwrap(), "title");
        assert_eq!(read_u32(&mut r).unwrap(), 0xDEAD_BEEF);
        assert_eq!(read_varint(&mut r).unwrap(), 300);
    }
}
