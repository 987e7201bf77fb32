// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Varint (LEB128) decoding of arbitrary bytes.
//!
//! Every length and count in a `.wvdx` payload is a varint. Decoding garbage
//! must return Err, and any value that does decode must re-encode to a
//! canonical form that decodes to the same value.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wavedex::binary::{decode_varint, encode_varint, MAX_VARINT_BYTES};

fuzz_target!(|data: &[u8]| {
    let Ok((value, consumed)) = decode_varint(data) else {
        return;
    };
    assert!(consumed <= MAX_VARINT_BYTES, "consumed {} bytes", consumed);
    assert!(consumed <= data.len());

    let mut reencoded = Vec::new();
    encode_varint(value, &mut reencoded);
    let (redecoded, reconsumed) =
        decode_varint(&reencoded).expect("canonical encoding must decode");
    assert_eq!(value, redecoded);
    assert_eq!(reconsumed, reencoded.len());
    assert!(reencoded.len() <= consumed);
});
