//! Corpus and configuration files as the CLI reads them.

use std::fs;

use wavedex::build::{Corpus, CorpusIndex, Query};
use wavedex::{Error, IndexConfig, WaveletEncoding};

const CORPUS: &str = r#"{
  "documents": [
    { "id": "a", "properties": { "title": "Rust ownership", "body": "borrow checker\nrules" },
      "filters": { "level": ["intro"] } },
    { "id": "b", "properties": { "title": "Lifetimes", "body": "borrow scopes and regions" },
      "filters": { "level": ["advanced"] } },
    { "properties": { "title": "Traits" } }
  ]
}"#;

#[test]
fn json_files_build_a_searchable_index() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.json");
    let config_path = dir.path().join("config.json");
    fs::write(&corpus_path, CORPUS).unwrap();
    fs::write(
        &config_path,
        r#"{ "sample_rate": 4, "encoding": "prefix-code", "default_top_k": 2 }"#,
    )
    .unwrap();

    let corpus = Corpus::from_file(&corpus_path).unwrap();
    let config = IndexConfig::from_file(&config_path).unwrap();
    assert_eq!(config.encoding, WaveletEncoding::PrefixCode);
    assert_eq!(config.doc_array_encoding, WaveletEncoding::default());

    let index = CorpusIndex::build(&corpus, &config).unwrap();
    assert_eq!(index.doc_count(), 3);
    assert_eq!(index.property_names().collect::<Vec<_>>(), vec!["body", "title"]);

    let borrow = index.search(&Query::new(["borrow"])).unwrap();
    let ids: Vec<u32> = borrow.iter().map(|r| r.doc_id.get()).collect();
    assert_eq!(ids, vec![1, 2]);

    // The newline in document a's body was blanked before indexing.
    let joined = index.search(&Query::new(["checker rules"])).unwrap();
    assert_eq!(joined.len(), 1);
    assert_eq!(index.doc_key(joined[0].doc_id), Some("a"));

    // Documents without a key have none.
    let traits = index.search(&Query::new(["Traits"])).unwrap();
    assert_eq!(index.doc_key(traits[0].doc_id), None);

    // default_top_k applies when the query has no limit.
    assert_eq!(index.search(&Query::new(["r"])).unwrap().len(), 2);
}

#[test]
fn malformed_inputs_are_config_errors() {
    assert!(matches!(
        IndexConfig::from_json(r#"{ "sample_rate": 0 }"#),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        IndexConfig::from_json(r#"{ "encoding": "Huffman" }"#),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(Corpus::from_json("[]"), Err(Error::InvalidConfig(_))));

    let missing = tempfile::tempdir().unwrap().path().join("absent.json");
    assert!(matches!(Corpus::from_file(&missing), Err(Error::Io(_))));
}

#[test]
fn corpus_without_properties_is_rejected() {
    let corpus = Corpus::from_json(r#"{ "documents": [ { "id": "x" } ] }"#).unwrap();
    assert!(matches!(
        CorpusIndex::build(&corpus, &IndexConfig::default()),
        Err(Error::EmptyInput(_))
    ));
}
