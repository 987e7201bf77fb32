//! Weighted multi-property ranking over the recipe corpus.

use wavedex::build::Query;
use wavedex::{Error, RankedDoc};

use crate::common::{recipes_index, ENCODINGS};

fn ranked(results: &[RankedDoc]) -> Vec<(u32, f64)> {
    results.iter().map(|r| (r.doc_id.get(), r.score)).collect()
}

#[test]
fn every_property_counts_once_by_default() {
    for encoding in ENCODINGS {
        let index = recipes_index(encoding);
        let results = index.search(&Query::new(["banana"])).unwrap();
        assert_eq!(ranked(&results), vec![(1, 2.0), (2, 2.0), (4, 1.0)]);
    }
}

#[test]
fn property_weights_scale_scores() {
    for encoding in ENCODINGS {
        let index = recipes_index(encoding);
        let query = Query::new(["banana"]).property("title", 3.0).property("body", 1.0);
        let results = index.search(&query).unwrap();
        assert_eq!(ranked(&results), vec![(1, 4.0), (2, 4.0), (4, 1.0)]);
    }
}

#[test]
fn terms_accumulate() {
    for encoding in ENCODINGS {
        let index = recipes_index(encoding);
        let results = index.search(&Query::new(["banana", "bake"])).unwrap();
        assert_eq!(
            ranked(&results),
            vec![(1, 3.0), (2, 2.0), (3, 1.0), (4, 1.0)]
        );
    }
}

#[test]
fn search_is_restricted_to_named_properties() {
    let index = recipes_index(ENCODINGS[0]);
    let title = index.search(&Query::new(["bread"]).property("title", 1.0)).unwrap();
    assert_eq!(ranked(&title), vec![(1, 1.0)]);
    let body = index.search(&Query::new(["bread"]).property("body", 1.0)).unwrap();
    assert_eq!(ranked(&body), vec![(5, 1.0)]);
    let all = index.search(&Query::new(["bread"])).unwrap();
    assert_eq!(ranked(&all), vec![(1, 1.0), (5, 1.0)]);

    assert!(matches!(
        index.search(&Query::new(["bread"]).property("author", 1.0)),
        Err(Error::UnknownArray(name)) if name == "author"
    ));
}

#[test]
fn fuzzy_falls_back_to_longest_substring() {
    for encoding in ENCODINGS {
        let index = recipes_index(encoding);
        let exact = Query::new(["breadth"]).property("body", 1.0);
        assert!(index.search(&exact).unwrap().is_empty());

        let results = index.search(&exact.fuzzy(true)).unwrap();
        assert_eq!(ranked(&results), vec![(5, 5.0 / 7.0)]);
    }
}

#[test]
fn limit_and_keys() {
    let index = recipes_index(ENCODINGS[1]);
    let results = index.search(&Query::new(["a"]).limit(2)).unwrap();
    assert_eq!(results.len(), 2);

    let top = index.search(&Query::new(["focaccia"])).unwrap();
    assert_eq!(index.doc_key(top[0].doc_id), Some("focaccia"));
}

#[test]
fn degenerate_terms_match_nothing() {
    let index = recipes_index(ENCODINGS[0]);
    assert!(index.search(&Query::new(Vec::<String>::new())).unwrap().is_empty());
    assert!(index.search(&Query::new([""])).unwrap().is_empty());
    assert!(index.search(&Query::new(["bake\nbread"])).unwrap().is_empty());
    assert!(index.search(&Query::new(["zebra"])).unwrap().is_empty());
}
