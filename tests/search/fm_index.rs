//! Worked examples over the two-document banana corpus.
//!
//! Text: `banana⏎ananas⏎$`, 15 symbols.

use wavedex::{DocId, MatchRange};

use crate::common::{banana_index, ENCODINGS};

#[test]
fn text_layout() {
    for encoding in ENCODINGS {
        let index = banana_index(encoding);
        assert_eq!(index.text_len(), 15);
        assert_eq!(index.doc_count(), 2);
        assert_eq!(index.doc_length(DocId(1)), Some(6));
        assert_eq!(index.doc_length(DocId(2)), Some(6));
        assert_eq!(index.doc_length(DocId(3)), None);
        assert_eq!(index.doc_at(6), Some(DocId(1)));
        assert_eq!(index.doc_at(7), Some(DocId(2)));
        assert_eq!(index.doc_at(14), Some(DocId(2)));
    }
}

#[test]
fn ana_occurs_four_times() {
    for encoding in ENCODINGS {
        let index = banana_index(encoding);
        let m = index.backward_search(b"ana");
        assert!(m.is_full(3));
        assert_eq!(m.range.len(), 4);
        assert_eq!(index.locate(m.range, usize::MAX), vec![1, 3, 7, 9]);
        assert_eq!(index.get_doc_id_list(m.range, 10), vec![DocId(1), DocId(2)]);
        assert_eq!(index.get_doc_id_list(m.range, 1), vec![DocId(1)]);
    }
}

#[test]
fn document_boundaries_are_not_crossed() {
    for encoding in ENCODINGS {
        let index = banana_index(encoding);
        // "banana" then "ananas": no occurrence spans the delimiter.
        assert_eq!(index.count(b"aa"), 0);
        assert_eq!(index.count(b"nas"), 1);
        assert_eq!(index.count(b"nana"), 2);
        assert_eq!(index.count(b"bananas"), 0);
    }
}

#[test]
fn partial_match_reports_matched_suffix() {
    for encoding in ENCODINGS {
        let index = banana_index(encoding);
        let m = index.backward_search(b"xnas");
        assert_eq!(m.matched, 3);
        assert!(!m.is_full(4));
        assert_eq!(index.locate(m.range, usize::MAX), vec![10]);

        let none = index.backward_search(b"zz");
        assert_eq!(none.matched, 0);
        assert_eq!(none.range, MatchRange::EMPTY);
    }
}

#[test]
fn longest_match_prefers_longest_substring() {
    for encoding in ENCODINGS {
        let index = banana_index(encoding);
        let (len, docs) = index.longest_suffix_match(b"xxbananzz", 10);
        assert_eq!(len, 5);
        assert_eq!(docs, vec![DocId(1)]);

        let (len, docs) = index.longest_suffix_match(b"zzz", 10);
        assert_eq!(len, 0);
        assert!(docs.is_empty());
    }
}

#[test]
fn reconstruct_skips_deleted_documents() {
    for encoding in ENCODINGS {
        let index = banana_index(encoding);
        assert_eq!(
            index.reconstruct_text(&[]),
            vec![b"banana".to_vec(), b"ananas".to_vec()]
        );
        assert_eq!(index.reconstruct_text(&[DocId(1)]), vec![b"ananas".to_vec()]);
    }
}
