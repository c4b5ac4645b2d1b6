use patterngraph::{DerivationEngine, GraphDocument, PatternGraphError};

const DOCUMENT: &str = r#"{
  "vertices": [
    {"id": "api", "types": ["Service"], "name": "Billing API"},
    {"id": "worker", "types": ["service"]},
    {"id": "db", "types": ["store"], "name": "mongo"}
  ],
  "edges": [
    {"source_id": "api", "target_id": "worker", "types": ["calls"]},
    {"source_id": "worker", "target_id": "db", "types": ["writes"]}
  ],
  "rules": [
    {"name": "reach", "antecedent": "(service)[calls]>()[writes]>(store)", "production": "(1)[reaches](3)"}
  ],
  "derivation": {"max_generations": 3}
}"#;

#[test]
fn test_document_builds_graph_and_rules() {
    let document = GraphDocument::from_json(DOCUMENT).expect("document");
    assert_eq!(document.derivation.max_generations, 3);
    let mut graph = document.build_graph().expect("graph");
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.vertex("api").expect("api").types, vec!["service"]);

    let rules = document.build_rules().expect("rules");
    assert_eq!(rules[0].name(), "reach");
    let report = DerivationEngine::new(&mut graph, &rules)
        .derive_edges(document.derivation.max_generations)
        .expect("derive");
    assert_eq!(report.created_per_generation, vec![1, 0, 0]);
    assert_eq!(
        graph.analysis().count("('billing')=[reaches]=>('mongo')").expect("query"),
        1
    );
}

#[test]
fn test_document_defaults() {
    let document = GraphDocument::from_json("{}").expect("empty");
    assert!(document.vertices.is_empty());
    assert_eq!(document.derivation.max_generations, 1);
    let document = GraphDocument::from_json(r#"{"derivation": {}}"#).expect("empty derivation");
    assert_eq!(document.derivation.max_generations, 1);
}

#[test]
fn test_document_errors() {
    assert!(matches!(
        GraphDocument::from_json("{\"vertices\": 3}"),
        Err(PatternGraphError::Document(_))
    ));
    assert!(matches!(
        GraphDocument::from_path("/definitely/not/here.json"),
        Err(PatternGraphError::Document(_))
    ));
    let duplicate = r#"{"vertices": [{"id": "a", "types": ["t"]}, {"id": "a", "types": ["t"]}]}"#;
    let document = GraphDocument::from_json(duplicate).expect("parses");
    assert!(matches!(
        document.build_graph(),
        Err(PatternGraphError::InvalidInput(_))
    ));
}
