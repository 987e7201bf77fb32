//! Corpus search against scanning every document.

use proptest::prelude::*;
use wavedex::build::{CorpusIndex, Query};

use crate::common::{
    config, documents_strategy, encoding_strategy, make_corpus, naive_doc_ids, pattern_strategy,
};

proptest! {
    #[test]
    fn single_term_finds_exactly_the_containing_documents(
        docs in documents_strategy(),
        pattern in pattern_strategy(),
        encoding in encoding_strategy(),
    ) {
        let index = CorpusIndex::build(&make_corpus(&docs), &config(encoding, 4)).unwrap();
        let results = index.search(&Query::new([pattern.clone()]).limit(100)).unwrap();

        let mut ids: Vec<u32> = results.iter().map(|r| r.doc_id.get()).collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, naive_doc_ids(&docs, pattern.as_bytes()));
        prop_assert!(results.iter().all(|r| r.score == 1.0));
    }

    #[test]
    fn scores_count_matching_terms(
        docs in documents_strategy(),
        terms in prop::collection::vec(pattern_strategy(), 1..4),
        encoding in encoding_strategy(),
    ) {
        let index = CorpusIndex::build(&make_corpus(&docs), &config(encoding, 4)).unwrap();
        let results = index.search(&Query::new(terms.clone()).limit(100)).unwrap();

        for window in results.windows(2) {
            prop_assert!(window[0].score >= window[1].score);
        }
        for r in &results {
            let body = docs[r.doc_id.index()].as_bytes();
            let hits = terms
                .iter()
                .filter(|t| naive_doc_ids(&[body], t.as_bytes()) == vec![1])
                .count();
            prop_assert_eq!(r.score, hits as f64);
        }
    }
}
