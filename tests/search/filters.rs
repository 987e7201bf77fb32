//! Filter attributes: OR within an attribute, AND across attributes.

use wavedex::build::{Corpus, CorpusDocument, CorpusIndex, Query};
use wavedex::{Error, IndexConfig};

use crate::common::{recipes_index, ENCODINGS};

fn ids(index: &CorpusIndex, query: &Query) -> Vec<u32> {
    index
        .search(query)
        .unwrap()
        .iter()
        .map(|r| r.doc_id.get())
        .collect()
}

#[test]
fn single_value_restricts_results() {
    for encoding in ENCODINGS {
        let index = recipes_index(encoding);
        assert_eq!(ids(&index, &Query::new(["banana"]).filter("tag", "quick")), vec![2, 4]);
        assert_eq!(ids(&index, &Query::new(["banana"]).filter("tag", "baking")), vec![1]);
    }
}

#[test]
fn values_of_one_attribute_are_alternatives() {
    for encoding in ENCODINGS {
        let index = recipes_index(encoding);
        let query = Query::new(["bake", "toast"])
            .filter("tag", "baking")
            .filter("tag", "quick");
        assert_eq!(ids(&index, &query), vec![5, 1, 3]);
    }
}

#[test]
fn unknown_value_matches_nothing() {
    let index = recipes_index(ENCODINGS[0]);
    assert!(ids(&index, &Query::new(["banana"]).filter("tag", "savoury")).is_empty());
}

#[test]
fn unknown_attribute_is_an_error() {
    let index = recipes_index(ENCODINGS[0]);
    assert!(matches!(
        index.search(&Query::new(["banana"]).filter("cuisine", "thai")),
        Err(Error::UnknownArray(_))
    ));
}

#[test]
fn attributes_are_intersected() {
    let doc = |body: &str, tag: &str, diet: &str| {
        let mut d = CorpusDocument::default();
        d.properties.insert("body".into(), body.into());
        d.filters.insert("tag".into(), vec![tag.into()]);
        d.filters.insert("diet".into(), vec![diet.into()]);
        d
    };
    let corpus = Corpus {
        documents: vec![
            doc("lentil soup", "soup", "vegan"),
            doc("chicken soup", "soup", "meat"),
            doc("lentil salad", "salad", "vegan"),
        ],
    };
    for encoding in ENCODINGS {
        let config = IndexConfig {
            doc_array_encoding: encoding,
            ..IndexConfig::default()
        };
        let index = CorpusIndex::build(&corpus, &config).unwrap();
        assert_eq!(index.filter_values("diet"), Some(&["meat".to_string(), "vegan".to_string()][..]));

        let query = Query::new(["l"]).filter("tag", "soup").filter("diet", "vegan");
        assert_eq!(ids(&index, &query), vec![1]);
        let query = Query::new(["soup"]).filter("diet", "vegan");
        assert_eq!(ids(&index, &query), vec![1]);
    }
}
