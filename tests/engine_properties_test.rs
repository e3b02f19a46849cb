use phenograph::engine::ClosureEngine;
use phenograph::obo::parse_document;
use phenograph::{
    build_chart, build_display_tree, closest_common_ancestor, consolidate, ChartOptions,
    Diagnostic, Ontology, OntologyBuilder,
};
use std::collections::BTreeMap;

const MINI_HP: &str = include_str!("fixtures/mini_hp.obo");

const FEBRILE: &str = "HP:0002373";
const FOCAL: &str = "HP:0007359";
const SEIZURE: &str = "HP:0001250";
const MICROCEPHALY: &str = "HP:0000252";

fn load() -> Ontology {
    let doc = parse_document(MINI_HP).unwrap();
    OntologyBuilder::from_document(&doc)
        .with_root("HP:0000118")
        .build()
}

fn sum_valid(ontology: &Ontology, counts: &[(&str, u64)]) -> u64 {
    counts
        .iter()
        .filter(|(id, _)| ontology.contains(id))
        .map(|(_, c)| c)
        .sum()
}

#[test]
fn test_fixture_loads() {
    let ontology = load();
    let stats = ontology.statistics();

    // 15 frames plus the dangling is_a target
    assert_eq!(stats.term_count, 16);
    assert_eq!(stats.placeholder_count, 1);
    assert_eq!(stats.obsolete_count, 1);
    assert_eq!(stats.data_version.as_deref(), Some("hp/releases/2024-04-26"));
    assert_eq!(ontology.label("HP:0002279"), Some("Seizure"));
    assert_eq!(ontology.depth(FEBRILE), Some(4));
    assert_eq!(ontology.parent_of_record(MICROCEPHALY).map(|t| t.as_str()), Some("HP:0012443"));
}

#[test]
fn test_every_edge_is_in_both_closures() {
    let ontology = load();
    let mut engine = ClosureEngine::new(&ontology);

    for term in ontology.terms() {
        let parent = term.id.as_str();
        for child in ontology.children(parent) {
            assert!(engine.descendants(parent).contains(child.as_str()));
            assert!(engine.ancestors(child.as_str()).contains(parent));
        }
    }
}

#[test]
fn test_ancestors_of_any_example() {
    let ontology = load();
    let mut engine = ClosureEngine::new(&ontology);
    let closure = engine.ancestors_of_any([FEBRILE, FOCAL]);

    let ids: Vec<&str> = closure.iter().map(|t| t.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "HP:0000001",
            "HP:0000118",
            "HP:0000707",
            SEIZURE,
            FEBRILE,
            FOCAL,
            "HP:0012638",
        ]
    );
}

#[test]
fn test_batch_with_unknown_id() {
    let ontology = load();
    let mut engine = ClosureEngine::new(&ontology);
    let closure = engine.descendants_of_any([SEIZURE, "HP:9999999"]);

    // Seizure, its two children and the unknown input itself
    assert_eq!(closure.len(), 4);
    assert!(closure.contains("HP:9999999"));
    assert_eq!(
        closure.diagnostics.into_vec(),
        vec![Diagnostic::UnknownTerm { id: "HP:9999999".to_string() }]
    );
}

#[test]
fn test_consolidation_example() {
    let ontology = load();
    let counts = [(FEBRILE, 1), (FOCAL, 1), (SEIZURE, 0)];

    let at_two = consolidate(&ontology, counts, 2);
    assert_eq!(at_two.counts.get(SEIZURE), Some(&2));
    assert_eq!(at_two.counts.len(), 1);

    let at_three = consolidate(&ontology, counts, 3);
    assert_eq!(at_three.counts.get("HP:0000118"), Some(&2));
    assert_eq!(at_three.counts.len(), 1);
}

#[test]
fn test_consolidation_properties() {
    let ontology = load();
    let cohorts: Vec<Vec<(&str, u64)>> = vec![
        vec![(FEBRILE, 1), (FOCAL, 4), (MICROCEPHALY, 2), ("HP:0001249", 3)],
        vec![(SEIZURE, 5), ("HP:0002279", 1), ("HP:0000240", 1), ("HP:0000050", 2)],
        vec![("HP:0010000", 7), ("HP:0000001", 1), ("HP:0000118", 0), ("nope", 4)],
        vec![(FEBRILE, 0), (MICROCEPHALY, 0)],
    ];

    for counts in &cohorts {
        let expected = sum_valid(&ontology, counts);
        let mut previous_len = usize::MAX;

        for k in [-1, 0, 1, 2, 3, 5, 8, 13, 100] {
            let once = consolidate(&ontology, counts.iter().copied(), k);
            assert_eq!(once.total(), expected, "mass changed at k={} for {:?}", k, counts);

            let twice = consolidate(
                &ontology,
                once.counts.iter().map(|(id, &c)| (id.as_str(), c)),
                k,
            );
            assert_eq!(once.counts, twice.counts, "not idempotent at k={}", k);

            assert!(once.counts.len() <= previous_len, "retained terms grew at k={}", k);
            previous_len = once.counts.len();
        }
    }
}

#[test]
fn test_common_ancestor_validity() {
    let ontology = load();
    assert_eq!(
        closest_common_ancestor(&ontology, FEBRILE, FOCAL).map(|t| t.to_string()),
        Some(SEIZURE.to_string())
    );
    assert_eq!(
        closest_common_ancestor(&ontology, MICROCEPHALY, "HP:0002279").map(|t| t.to_string()),
        Some("HP:0000707".to_string())
    );
    assert_eq!(closest_common_ancestor(&ontology, FEBRILE, "HP:0000240"), None);
    assert_eq!(closest_common_ancestor(&ontology, FEBRILE, "HP:0000404"), None);

    let ids: Vec<String> = ontology.terms().map(|t| t.id.to_string()).collect();
    let mut engine = ClosureEngine::new(&ontology);
    for a in &ids {
        for b in &ids {
            let Some(found) = engine.closest_common_ancestor(a, b) else {
                continue;
            };
            let up_a = engine.ancestors(a);
            let up_b = engine.ancestors(b);
            assert!(up_a.contains(found.as_str()) && up_b.contains(found.as_str()));

            for below in engine.descendants(found.as_str()).iter() {
                if below == &found {
                    continue;
                }
                assert!(
                    !(up_a.contains(below.as_str()) && up_b.contains(below.as_str())),
                    "{} is a more specific common ancestor of {} and {} than {}",
                    below,
                    a,
                    b,
                    found
                );
            }
        }
    }
}

#[test]
fn test_chart_parents_closed() {
    let ontology = load();
    let raw: BTreeMap<&str, u64> = [(FEBRILE, 2), (FOCAL, 3), (MICROCEPHALY, 1), ("HP:0001249", 4)]
        .into_iter()
        .collect();
    let consolidated = consolidate(&ontology, raw.iter().map(|(k, &v)| (*k, v)), 3);
    let chart = build_chart(
        &ontology,
        consolidated.counts.iter().map(|(id, &c)| (id.as_str(), c)),
        ChartOptions::default(),
    );

    assert_eq!(chart.total(), 10);
    for entry in &chart.entries {
        if let Some(parent) = &entry.parent {
            assert!(chart.entries.iter().any(|e| &e.id == parent));
        }
    }
    assert_eq!(chart.entries[0].id.as_str(), "HP:0000118");
}

#[test]
fn test_outputs_are_deterministic() {
    let first = load();
    let second = load();
    let counts = [(FEBRILE, 1), (MICROCEPHALY, 1), ("HP:0001249", 1), ("HP:0010000", 1)];

    assert_eq!(consolidate(&first, counts, 2), consolidate(&second, counts, 2));
    assert_eq!(
        build_display_tree(&first, [MICROCEPHALY, FEBRILE, "HP:0010000"]),
        build_display_tree(&second, [FEBRILE, "HP:0010000", MICROCEPHALY])
    );
}
