//! FM-index search, locate and reconstruction against scanning the documents.

use proptest::prelude::*;
use wavedex::FmIndex;

use crate::common::{
    config, documents_strategy, encoding_strategy, naive_count, naive_doc_ids, pattern_strategy,
};

/// The text the index is built over: documents joined by the delimiter.
fn joined(docs: &[String]) -> Vec<u8> {
    let mut text = Vec::new();
    for d in docs {
        text.extend_from_slice(d.as_bytes());
        text.push(b'\n');
    }
    text
}

fn naive_longest_substring(docs: &[String], pattern: &[u8]) -> usize {
    (1..=pattern.len())
        .rev()
        .find(|&len| {
            pattern
                .windows(len)
                .any(|w| docs.iter().any(|d| naive_count(d.as_bytes(), w) > 0))
        })
        .unwrap_or(0)
}

proptest! {
    #[test]
    fn count_and_documents_match_scan(
        docs in documents_strategy(),
        pattern in pattern_strategy(),
        encoding in encoding_strategy(),
        rate in 1u32..8,
    ) {
        let index = FmIndex::build(&docs, &config(encoding, rate)).unwrap();
        let p = pattern.as_bytes();
        let expected: usize = docs.iter().map(|d| naive_count(d.as_bytes(), p)).sum();
        prop_assert_eq!(index.count(p), expected);

        let m = index.backward_search(p);
        if m.is_full(p.len()) {
            let ids: Vec<u32> = index
                .get_doc_id_list(m.range, usize::MAX)
                .into_iter()
                .map(|d| d.get())
                .collect();
            prop_assert_eq!(ids, naive_doc_ids(&docs, p));
        } else {
            prop_assert_eq!(expected, 0);
        }
    }

    #[test]
    fn locate_points_at_occurrences(
        docs in documents_strategy(),
        pattern in pattern_strategy(),
        encoding in encoding_strategy(),
        rate in 1u32..8,
    ) {
        let index = FmIndex::build(&docs, &config(encoding, rate)).unwrap();
        let text = joined(&docs);
        let p = pattern.as_bytes();
        let m = index.backward_search(p);
        let positions = index.locate(m.range, usize::MAX);
        prop_assert_eq!(positions.len(), m.range.len());
        for pos in positions {
            prop_assert_eq!(&text[pos..pos + m.matched], &p[p.len() - m.matched..]);
        }
    }

    #[test]
    fn reconstruct_returns_documents(
        docs in documents_strategy(),
        encoding in encoding_strategy(),
    ) {
        let index = FmIndex::build(&docs, &config(encoding, 3)).unwrap();
        let rebuilt = index.reconstruct_text(&[]);
        let expected: Vec<Vec<u8>> = docs.iter().map(|d| d.as_bytes().to_vec()).collect();
        prop_assert_eq!(rebuilt, expected);
    }

    #[test]
    fn longest_match_length_matches_scan(
        docs in documents_strategy(),
        pattern in prop::string::string_regex("[abcd]{1,6}").unwrap(),
        encoding in encoding_strategy(),
    ) {
        let index = FmIndex::build(&docs, &config(encoding, 4)).unwrap();
        let (len, ranges) = index.longest_suffix_match_ranges(pattern.as_bytes());
        prop_assert_eq!(len, naive_longest_substring(&docs, pattern.as_bytes()));
        prop_assert_eq!(ranges.is_empty(), len == 0);
    }

    #[test]
    fn bytes_round_trip(docs in documents_strategy(), encoding in encoding_strategy()) {
        let index = FmIndex::build(&docs, &config(encoding, 2)).unwrap();
        let loaded = FmIndex::from_bytes(&index.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(loaded, index);
    }
}
