//! Shared test utilities and fixtures.

#![allow(dead_code)]

use proptest::prelude::*;
use wavedex::build::{Corpus, CorpusDocument, CorpusIndex};
use wavedex::{FmIndex, IndexConfig, WaveletEncoding};

pub use wavedex::testing::{
    make_corpus, naive_count, naive_doc_ids, naive_intersect, naive_rank,
    naive_scores, naive_select, naive_top_k,
};

// ============================================================================
// FIXTURES
// ============================================================================

/// Two documents sharing most of their substrings.
pub const BANANA: [&str; 2] = ["banana", "ananas"];

/// Both encodings, for tests that must hold for either.
pub const ENCODINGS: [WaveletEncoding; 2] = [WaveletEncoding::Balanced, WaveletEncoding::PrefixCode];

pub fn config(encoding: WaveletEncoding, sample_rate: u32) -> IndexConfig {
    IndexConfig {
        sample_rate,
        encoding,
        doc_array_encoding: encoding,
        ..IndexConfig::default()
    }
}

pub fn banana_index(encoding: WaveletEncoding) -> FmIndex {
    FmIndex::build(&BANANA, &config(encoding, 2)).expect("banana index")
}

/// Recipes with a title, a body and tags.
pub fn recipes() -> Corpus {
    let doc = |id: &str, title: &str, body: &str, tags: &[&str]| {
        let mut d = CorpusDocument {
            id: Some(id.to_string()),
            ..CorpusDocument::default()
        };
        d.properties.insert("title".into(), title.into());
        d.properties.insert("body".into(), body.into());
        d.filters
            .insert("tag".into(), tags.iter().map(|t| t.to_string()).collect());
        d
    };
    Corpus {
        documents: vec![
            doc("bread", "banana bread", "mash bananas, fold into batter, bake", &["baking", "fruit"]),
            doc("smoothie", "banana smoothie", "blend banana with milk and ice", &["fruit", "quick"]),
            doc("focaccia", "focaccia", "proof the dough, dimple, bake with oil", &["baking"]),
            doc("salad", "fruit salad", "chop apple, banana and melon", &["fruit", "quick"]),
            doc("toast", "toast", "toast bread, butter it", &["quick"]),
        ],
    }
}

pub fn recipes_index(encoding: WaveletEncoding) -> CorpusIndex {
    CorpusIndex::build(&recipes(), &config(encoding, 4)).expect("recipes index")
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// Short documents over a tiny alphabet, so substrings repeat a lot.
pub fn documents_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::string::string_regex("[abc ]{0,12}").unwrap(), 1..6)
}

pub fn pattern_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[abc]{1,4}").unwrap()
}

pub fn encoding_strategy() -> impl Strategy<Value = WaveletEncoding> {
    prop::sample::select(ENCODINGS.to_vec())
}

/// A symbol sequence and its alphabet size.
pub fn sequence_strategy() -> impl Strategy<Value = (Vec<u32>, u32)> {
    (1u32..40).prop_flat_map(|sigma| {
        (prop::collection::vec(0..sigma, 1..200), Just(sigma))
    })
}
