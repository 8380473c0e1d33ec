//! End-to-end ingestion and serialization behavior over a realistic
//! mini-deck schema: topology, geometry inputs with dynamic children,
//! and a value node with a default.

use simdeck_db::{
    extract::deck_to_flat, validate::validate, Deck, DeckContext, IngestOptions, IngestSource,
    ValidateOptions, Value,
};
use simdeck_schema::{Decorator, Domain, LeafSpec, NodeSpec, SchemaRegistry};

fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.insert(
        "Run",
        NodeSpec::new()
            .with_leaf(
                "FileVersion",
                LeafSpec::new()
                    .with_domain(Domain::Mandatory)
                    .with_domain(Domain::int_min(4)),
            )
            .with_child("Process", "Process")
            .with_child("GeomInput", "GeomInput")
            .with_child("Gravity", "Gravity"),
    );
    registry.insert("Process", NodeSpec::new().with_child("Topology", "Topology"));
    registry.insert(
        "Topology",
        NodeSpec::new()
            .with_leaf(
                "P",
                LeafSpec::new()
                    .with_domain(Domain::Mandatory)
                    .with_domain(Domain::int_min(1)),
            )
            .with_leaf("Q", LeafSpec::new().with_domain(Domain::int_min(1)))
            .with_leaf(
                "R",
                LeafSpec::new()
                    .with_domain(Domain::int_min(1))
                    .with_default(1i64),
            ),
    );
    registry.insert(
        "GeomInput",
        NodeSpec::new().with_leaf(
            "Names",
            LeafSpec::new()
                .with_domain(Domain::Mandatory)
                .with_decorator(Decorator::SplitToList)
                .with_decorator(Decorator::SpawnChildren {
                    node_type: "GeomInputItem".to_string(),
                    location: ".".to_string(),
                }),
        ),
    );
    registry.insert(
        "GeomInputItem",
        NodeSpec::new()
            .with_value(LeafSpec::new().with_domain(Domain::enum_values(["Box", "SolidFile"])))
            .with_leaf("FileName", LeafSpec::new().with_domain(Domain::AnyString)),
    );
    registry.insert(
        "Gravity",
        NodeSpec::new().with_value(
            LeafSpec::new()
                .with_domain(Domain::RealRange {
                    min: Some(0.0),
                    max: None,
                })
                .with_default(1.0),
        ),
    );
    registry
}

const DECK: &str = r#"
FileVersion: 4
Process:
  Topology:
    P: 2
    Q: 2
GeomInput:
  Names: domain_input box_input
  domain_input:
    _value_: SolidFile
    FileName: geom.pfsol
  box_input:
    _value_: Box
"#;

#[test]
fn test_yaml_ingest_builds_and_validates() {
    let mut deck = Deck::new(&registry(), "Run").unwrap();
    let ctx = DeckContext::default();
    let root = deck.root();
    deck.ingest(
        root,
        IngestSource::YamlText(DECK),
        &IngestOptions::default(),
        &ctx,
    )
    .unwrap();

    assert_eq!(deck.get(root, "Process.Topology.P", false), Some(&Value::from(2i64)));
    assert_eq!(
        deck.get(root, "GeomInput.domain_input", false),
        Some(&Value::from("SolidFile"))
    );
    assert_eq!(deck.node(root).side_store().count(), 0);

    let report = validate(&deck, root, &ValidateOptions::default(), &ctx);
    assert!(report.is_valid(), "unexpected errors:\n{}", report.rendered());
}

#[test]
fn test_flat_keys_snapshot() {
    let mut deck = Deck::new(&registry(), "Run").unwrap();
    let ctx = DeckContext::default();
    let root = deck.root();
    deck.ingest(
        root,
        IngestSource::YamlText(DECK),
        &IngestOptions::default(),
        &ctx,
    )
    .unwrap();

    let flat = deck_to_flat(&deck, root);
    let keys: Vec<&str> = flat.keys().collect();
    insta::assert_snapshot!(
        keys.join(" "),
        @"FileVersion Process.Topology.P Process.Topology.Q GeomInput.Names GeomInput.domain_input GeomInput.domain_input.FileName GeomInput.box_input"
    );
}

#[test]
fn test_flatten_replay_is_fixed_point() {
    let mut deck = Deck::new(&registry(), "Run").unwrap();
    let ctx = DeckContext::default();
    let root = deck.root();
    deck.ingest(
        root,
        IngestSource::YamlText(DECK),
        &IngestOptions::default(),
        &ctx,
    )
    .unwrap();

    let flat = deck_to_flat(&deck, root);

    let mut replayed = Deck::new(&registry(), "Run").unwrap();
    replayed
        .ingest(
            replayed.root(),
            IngestSource::Flat(flat.clone()),
            &IngestOptions {
                fail_on_undefined: true,
            },
            &ctx,
        )
        .unwrap();

    assert_eq!(deck_to_flat(&replayed, replayed.root()), flat);
    assert_eq!(deck.size(root), replayed.size(replayed.root()));
}

#[test]
fn test_name_keys_apply_before_dependent_leaves() {
    let mut deck = Deck::new(&registry(), "Run").unwrap();
    let ctx = DeckContext::default();
    let root = deck.root();

    // Worst-case source order: every dependent key listed before the
    // name-list key that creates its container.
    let pairs = [
        ("GeomInput.domain_input.FileName", Value::from("geom.pfsol")),
        ("GeomInput.domain_input", Value::from("SolidFile")),
        ("Process.Topology.P", Value::from(2i64)),
        ("FileVersion", Value::from(4i64)),
        ("GeomInput.Names", Value::from("domain_input")),
    ];
    let flat: simdeck_db::FlatMap = pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    deck.ingest(
        root,
        IngestSource::Flat(flat),
        &IngestOptions {
            fail_on_undefined: true,
        },
        &ctx,
    )
    .unwrap();

    assert_eq!(
        deck.get(root, "GeomInput.domain_input.FileName", false),
        Some(&Value::from("geom.pfsol"))
    );
}

#[test]
fn test_mandatory_errors_counted_across_tree() {
    let deck = Deck::new(&registry(), "Run").unwrap();
    let ctx = DeckContext::default();
    // FileVersion, Topology.P, and GeomInput.Names are mandatory and unset.
    let report = validate(&deck, deck.root(), &ValidateOptions::default(), &ctx);
    assert_eq!(report.error_count, 3);
}

#[test]
fn test_strict_ingest_rejects_unknown_keys() {
    let mut deck = Deck::new(&registry(), "Run").unwrap();
    let ctx = DeckContext::default();
    let err = deck
        .ingest(
            deck.root(),
            IngestSource::Pair("Solver.MaxIter", Value::from(100i64)),
            &IngestOptions {
                fail_on_undefined: true,
            },
            &ctx,
        )
        .unwrap_err();
    assert!(matches!(err, simdeck_db::DeckError::UnresolvedKey { .. }));
}
