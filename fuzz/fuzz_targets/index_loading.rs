// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Payload parsing under adversarial input.
//!
//! A crafted `.wvdx` file should produce an error, never a panic. The bytes
//! are fed both as a raw payload (past the checksum) and wrapped in a valid
//! container, for every payload kind.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wavedex::binary::{wrap_payload, PayloadKind};
use wavedex::build::CorpusIndex;
use wavedex::{FmIndex, WaveletSequence};

fuzz_target!(|data: &[u8]| {
    if let Ok(ws) = WaveletSequence::load(&mut &data[..]) {
        // A sequence that loads must answer queries without panicking.
        for pos in 0..ws.len().min(64) {
            let _ = ws.access_rank(pos);
        }
        let _ = ws.rank(0, ws.len());
    }
    if let Ok(fm) = FmIndex::load(&mut &data[..]) {
        let _ = fm.count(b"a");
    }
    if let Ok(index) = CorpusIndex::load(&mut &data[..]) {
        let _ = index.inspect();
    }

    let _ = WaveletSequence::from_bytes(&wrap_payload(PayloadKind::Wavelet, data));
    let _ = FmIndex::from_bytes(&wrap_payload(PayloadKind::FmIndex, data));
    let _ = CorpusIndex::from_bytes(&wrap_payload(PayloadKind::Corpus, data));
    let _ = CorpusIndex::from_bytes(data);
});
