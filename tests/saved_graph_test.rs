use image_redactor::graph::kind::NodeKind;
use image_redactor::graph::{ImageInputs, NodeState, FIRST, SECOND};
use image_redactor::{JobCodec, NodeRegistry, RedactorError};

const SEPIA_GRAPH: &str = r#"{
  "nodes": [
    {"id": "a1", "type": "IMAGE", "x": 40.0, "y": 60.0, "data": "/photos/cat.png"},
    {"id": "b2", "type": "SEPIA", "x": 300.0, "y": 60.0, "data": null},
    {"id": "c3", "type": "FLOAT", "x": 40.0, "y": 200.0, "data": "12.5"},
    {"id": "d4", "type": "BRIGHT", "x": 520.0, "y": 120.0, "data": null},
    {"id": "e5", "type": "END_NODE", "x": 950.0, "y": 45.0, "data": null}
  ],
  "links": [
    {
      "id": "l1", "inputNode": "b2", "outputNode": "a1",
      "inputAnchor": "firstLink", "outputAnchor": "outputLinkHandle",
      "inputAnchorSize": {"first": 310.0, "second": 90.0},
      "outputAnchorSize": {"first": 190.0, "second": 90.0}
    },
    {
      "id": "l2", "inputNode": "d4", "outputNode": "b2",
      "inputAnchor": "firstLink", "outputAnchor": "outputLinkHandle",
      "inputAnchorSize": {"first": 530.0, "second": 150.0},
      "outputAnchorSize": {"first": 450.0, "second": 90.0}
    },
    {
      "id": "l3", "inputNode": "d4", "outputNode": "c3",
      "inputAnchor": "secondLink", "outputAnchor": "outputLinkHandle",
      "inputAnchorSize": {"first": 530.0, "second": 180.0},
      "outputAnchorSize": {"first": 190.0, "second": 230.0}
    }
  ]
}"#;

#[test]
fn test_load_saved_graph() {
    let graph = JobCodec::load_graph(SEPIA_GRAPH, &NodeRegistry::builtin()).unwrap();

    assert_eq!(graph.nodes().len(), 5);
    assert_eq!(graph.links().len(), 3);
    assert_eq!(graph.end_node_id(), Some("e5"));
    assert_eq!(
        graph.image_sources(),
        vec![("a1".to_string(), "/photos/cat.png".to_string())]
    );

    let bright = graph.node("d4").unwrap();
    assert_eq!(bright.kind, NodeKind::Bright);
    assert_eq!(bright.position, (520.0, 120.0));

    let link = graph.links().iter().find(|l| l.id == "l3").unwrap();
    assert_eq!(link.slot, SECOND);
    assert_eq!(link.output_anchor_position, (190.0, 230.0));
}

#[test]
fn test_saved_graph_survives_round_trip() {
    let graph = JobCodec::load_graph(SEPIA_GRAPH, &NodeRegistry::builtin()).unwrap();
    let text = JobCodec::encode_graph(&graph.to_saved()).unwrap();

    let original: serde_json::Value = serde_json::from_str(SEPIA_GRAPH).unwrap();
    let written: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(original, written);
}

#[test]
fn test_status_without_loaded_images() {
    let graph = JobCodec::load_graph(SEPIA_GRAPH, &NodeRegistry::builtin()).unwrap();
    let status = graph.status(&ImageInputs::new());

    let state_of = |id: &str| status.iter().find(|s| s.id == id).unwrap().state.clone();
    assert!(matches!(state_of("a1"), NodeState::Invalid { .. }));
    assert!(matches!(state_of("d4"), NodeState::Invalid { .. }));
    assert!(matches!(state_of("c3"), NodeState::Ready(_)));
    assert_eq!(
        state_of("e5"),
        NodeState::MissingInput {
            slot: FIRST.to_string()
        }
    );
}

#[test]
fn test_restricted_registry_drops_nodes_and_fails_links() {
    let registry = NodeRegistry::with_kinds(&[NodeKind::Image, NodeKind::Float, NodeKind::Bright]);
    let err = JobCodec::load_graph(SEPIA_GRAPH, &registry).unwrap_err();
    assert!(matches!(err, RedactorError::UnknownNode { ref id } if id == "b2"));
}

#[test]
fn test_mistyped_link_fails_the_load() {
    let text = SEPIA_GRAPH.replace(
        r#""inputNode": "d4", "outputNode": "c3",
      "inputAnchor": "secondLink""#,
        r#""inputNode": "d4", "outputNode": "c3",
      "inputAnchor": "firstLink""#,
    );
    assert_ne!(text, SEPIA_GRAPH);
    let err = JobCodec::load_graph(&text, &NodeRegistry::builtin()).unwrap_err();
    assert!(matches!(err, RedactorError::TypeMismatch { .. }));
}

#[test]
fn test_missing_links_section_fails() {
    let err = JobCodec::load_graph(r#"{"nodes": []}"#, &NodeRegistry::builtin()).unwrap_err();
    assert!(matches!(err, RedactorError::ValidationError { .. }));
}

#[test]
fn test_graph_without_end_node_gets_one() {
    let text = r#"{"nodes": [{"id": "n", "type": "INT", "x": 0, "y": 0, "data": "3"}], "links": []}"#;
    let graph = JobCodec::load_graph(text, &NodeRegistry::builtin()).unwrap();
    assert!(graph.end_node_id().is_some());
    assert_eq!(graph.nodes().len(), 2);
}
