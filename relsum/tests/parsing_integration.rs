//! Parsing and loading of the textual relation format.

use std::io::Write;

use relsum::core::{AttributeKind, WeightAssessor, WeightPolicy};
use relsum::error::SummaryError;
use relsum::sources::{load_relation, parse_relation};
use relsum::test_fixtures::{
    random_relation_text, RandomRelationConfig, PUBLICATIONS_RELATION, REFERENCE_RELATION,
};

#[test]
fn test_reference_relation_index() {
    let index = parse_relation(REFERENCE_RELATION, &WeightAssessor::equal()).unwrap();

    assert_eq!(index.attributes().len(), 3);
    assert_eq!(index.num_tuples(), 6);
    // x: a b, y: b a, z: c d e f
    assert_eq!(index.num_values(), 8);

    let expected = [
        (0, "a", vec![0, 1, 2, 4, 5]),
        (1, "b", vec![0, 1, 2, 4]),
        (2, "c", vec![0, 1, 2, 4]),
        (2, "d", vec![0, 3]),
        (2, "e", vec![3, 4]),
        (2, "f", vec![3]),
        (0, "b", vec![3]),
        (1, "a", vec![5]),
    ];
    for (attribute, value, tuples) in expected {
        let cell = index.cell(index.find_cell(attribute, value).unwrap());
        let mut actual: Vec<usize> = cell.covers().keys().copied().collect();
        actual.sort_unstable();
        assert_eq!(actual, tuples, "{attribute}={value}");
        assert!(cell.covers().values().all(|c| !c.covered && c.weight == 1.0));
    }
}

#[test]
fn test_hierarchy_prefixes() {
    let index = parse_relation(PUBLICATIONS_RELATION, &WeightAssessor::equal()).unwrap();
    let place = index.attribute_by_name("place").unwrap();
    assert_eq!(place.kind(), AttributeKind::Hierarchy);

    let mut values: Vec<&str> = place.values().keys().map(String::as_str).collect();
    values.sort_unstable();
    assert_eq!(
        values,
        vec![
            "eu",
            "eu/de",
            "eu/de/berlin",
            "eu/fr",
            "eu/fr/lyon",
            "eu/fr/paris",
            "us",
            "us/ca"
        ]
    );

    let paris = index.cell(place.cell("eu/fr/paris").unwrap());
    let mut tuples: Vec<usize> = paris.covers().keys().copied().collect();
    tuples.sort_unstable();
    assert_eq!(tuples, vec![0, 5]);
}

#[test]
fn test_decaying_weights_use_line_order() {
    let assessor = WeightAssessor::linear(vec![2.0, 1.0, 1.0, 1.0], 0.6).unwrap();
    assert_eq!(assessor.policy(), WeightPolicy::Linear);
    assert_eq!(assessor.num_tuples(), None);

    let index = parse_relation(PUBLICATIONS_RELATION, &assessor).unwrap();
    let vldb = index.cell(index.find_cell(0, "vldb").unwrap());
    let weights: Vec<f64> = (0..3).map(|t| vldb.covers()[&t].weight).collect();
    assert!((weights[0] - 2.0).abs() < 1e-12);
    assert!((weights[1] - 2.0 * (1.0 - 0.6 / 6.0)).abs() < 1e-12);
    assert!((weights[2] - 2.0 * (1.0 - 0.6 * 2.0 / 6.0)).abs() < 1e-12);
}

#[test]
fn test_configured_tuple_count_wins() {
    let assessor = WeightAssessor::exponential(vec![1.0, 1.0, 1.0, 1.0], 0.5)
        .unwrap()
        .with_num_tuples(3);
    let index = parse_relation(PUBLICATIONS_RELATION, &assessor).unwrap();

    let sigmod = index.cell(index.find_cell(0, "sigmod").unwrap());
    // rank 5 of 3 decays past the configured end
    assert!((sigmod.covers()[&5].weight - 0.5f64.powf(5.0 / 3.0)).abs() < 1e-12);
}

#[test]
fn test_parse_errors_name_lines() {
    let cases = [
        ("", 1),
        ("single,set", 2),
        ("single,set\nx", 2),
        ("single,bag\nx,y", 1),
        ("single,set\nx,y\na,b\nc,d\ne\n", 5),
        ("single,set\nx,y\na,b,c\n", 3),
    ];
    for (text, expected) in cases {
        match parse_relation(text, &WeightAssessor::equal()) {
            Err(SummaryError::Parse { line, .. }) => assert_eq!(line, expected, "{text:?}"),
            other => panic!("{text:?}: expected a parse error, got {other:?}"),
        }
    }
}

#[test]
fn test_load_relation_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PUBLICATIONS_RELATION.as_bytes()).unwrap();
    file.flush().unwrap();

    let index = load_relation(file.path(), &WeightAssessor::equal()).unwrap();
    assert_eq!(index.num_tuples(), 6);
    assert_eq!(index.attributes()[2].name(), "keywords");
}

#[test]
fn test_load_relation_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_relation(dir.path().join("nope.txt"), &WeightAssessor::equal()).unwrap_err();
    assert!(matches!(err, SummaryError::Io(_)));
    assert!(err.to_string().starts_with("IO error"));
}

#[test]
fn test_random_relation_text_parses() {
    let config = RandomRelationConfig::default().with_tuples(300).with_seed(11);
    let text = random_relation_text(&config);
    let index = parse_relation(&text, &WeightAssessor::equal()).unwrap();
    assert_eq!(index.num_tuples(), 300);
    assert!(index.num_values() > 0);
}
