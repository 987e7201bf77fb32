//! Save/load through the checksummed container.

use std::fs;

use wavedex::build::{CorpusIndex, Query};
use wavedex::{Error, FmIndex, WaveletSequence};

use crate::common::{banana_index, recipes_index, ENCODINGS};

#[test]
fn corpus_index_survives_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    for encoding in ENCODINGS {
        let index = recipes_index(encoding);
        let path = dir.path().join(format!("recipes-{}.wvdx", encoding.name()));
        fs::write(&path, index.to_bytes().unwrap()).unwrap();

        let loaded = CorpusIndex::from_bytes(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(loaded, index);

        let query = Query::new(["banana", "bake"]).filter("tag", "fruit");
        assert_eq!(loaded.search(&query).unwrap(), index.search(&query).unwrap());
    }
}

#[test]
fn flipped_byte_fails_the_checksum() {
    let index = recipes_index(ENCODINGS[0]);
    let mut bytes = index.to_bytes().unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x40;
    assert!(CorpusIndex::from_bytes(&bytes).is_err());
}

#[test]
fn truncated_file_is_rejected() {
    let bytes = banana_index(ENCODINGS[1]).to_bytes().unwrap();
    for cut in [0, 3, bytes.len() / 2, bytes.len() - 1] {
        assert!(FmIndex::from_bytes(&bytes[..cut]).is_err(), "cut at {}", cut);
    }
}

#[test]
fn payload_kinds_are_not_interchangeable() {
    let fm = banana_index(ENCODINGS[0]);
    let bytes = fm.to_bytes().unwrap();
    assert!(matches!(
        CorpusIndex::from_bytes(&bytes),
        Err(Error::SerializationMismatch { .. })
    ));
    assert!(matches!(
        WaveletSequence::from_bytes(&bytes),
        Err(Error::SerializationMismatch { .. })
    ));
    assert_eq!(FmIndex::from_bytes(&bytes).unwrap(), fm);
}

#[test]
fn raw_save_and_load_streams() {
    let index = recipes_index(ENCODINGS[1]);
    let mut buf = Vec::new();
    index.save(&mut buf).unwrap();
    let loaded = CorpusIndex::load(&mut buf.as_slice()).unwrap();
    assert_eq!(loaded.inspect().doc_count, 5);
    assert_eq!(loaded, index);
}
