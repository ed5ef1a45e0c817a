use image::{Rgb, RgbImage};
use image_redactor::domain::ports::ConfigProvider;
use image_redactor::graph::kind::NodeKind;
use image_redactor::graph::{END_NODE_ID, FIFTH, FIRST, FOURTH, SECOND, THIRD};
use image_redactor::{
    GraphPipeline, JobCodec, LocalStorage, NodeGraph, NodeRegistry, OutputFormat,
    RedactionEngine, RedactorError,
};
use std::path::Path;
use tempfile::TempDir;

struct TestConfig(String);

impl ConfigProvider for TestConfig {
    fn output_path(&self) -> &str {
        &self.0
    }

    fn output_format(&self) -> Option<OutputFormat> {
        None
    }
}

fn write_photo(dir: &Path) -> String {
    let path = dir.join("photo.png");
    RgbImage::from_fn(16, 12, |x, y| Rgb([(x * 15) as u8, (y * 20) as u8, 90]))
        .save(&path)
        .unwrap();
    path.to_str().unwrap().to_string()
}

async fn render(graph: NodeGraph, dir: &Path, name: &str) -> Result<RgbImage, RedactorError> {
    let output_path = dir.join("out").to_str().unwrap().to_string();
    let pipeline = GraphPipeline::new(
        LocalStorage::new(output_path.clone()),
        TestConfig(output_path),
        graph,
        name,
    );
    let written = RedactionEngine::new(pipeline).run().await?;
    Ok(image::open(written).unwrap().to_rgb8())
}

#[tokio::test]
async fn test_grey_graph_renders_equal_channels() {
    let temp_dir = TempDir::new().unwrap();
    let photo = write_photo(temp_dir.path());

    let mut graph = NodeGraph::new();
    let image = graph.add_node(NodeKind::Image).unwrap();
    graph.set_data(&image, photo).unwrap();
    let grey = graph.add_node(NodeKind::Grey).unwrap();
    graph.connect(&image, &grey, FIRST).unwrap();
    graph.connect(&grey, END_NODE_ID, FIRST).unwrap();

    let out = render(graph, temp_dir.path(), "grey.png").await.unwrap();
    assert_eq!(out.dimensions(), (16, 12));
    assert!(out.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
}

#[tokio::test]
async fn test_saved_graph_chain_renders() {
    let temp_dir = TempDir::new().unwrap();
    let photo = write_photo(temp_dir.path());

    let mut graph = NodeGraph::new();
    let image = graph.add_node(NodeKind::Image).unwrap();
    graph.set_data(&image, photo).unwrap();

    let scale = graph.add_node(NodeKind::ScalePixel).unwrap();
    let width = graph.add_node(NodeKind::Int).unwrap();
    let height = graph.add_node(NodeKind::Int).unwrap();
    graph.set_data(&width, "32").unwrap();
    graph.set_data(&height, "24").unwrap();
    graph.connect(&image, &scale, FIRST).unwrap();
    graph.connect(&width, &scale, SECOND).unwrap();
    graph.connect(&height, &scale, THIRD).unwrap();

    let text = graph.add_node(NodeKind::AddTextPixel).unwrap();
    let x = graph.add_node(NodeKind::Int).unwrap();
    let y = graph.add_node(NodeKind::Int).unwrap();
    let caption = graph.add_node(NodeKind::String).unwrap();
    let size = graph.add_node(NodeKind::Float).unwrap();
    graph.set_data(&x, "1").unwrap();
    graph.set_data(&y, "20").unwrap();
    graph.set_data(&caption, "X").unwrap();
    graph.set_data(&size, "1.0").unwrap();
    graph.connect(&scale, &text, FIRST).unwrap();
    graph.connect(&x, &text, SECOND).unwrap();
    graph.connect(&y, &text, THIRD).unwrap();
    graph.connect(&caption, &text, FOURTH).unwrap();
    graph.connect(&size, &text, FIFTH).unwrap();
    graph.connect(&text, END_NODE_ID, FIRST).unwrap();

    let graph_file = temp_dir.path().join("chain.ns");
    std::fs::write(&graph_file, JobCodec::encode_graph(&graph.to_saved()).unwrap()).unwrap();
    let reloaded = JobCodec::load_graph(
        &std::fs::read_to_string(&graph_file).unwrap(),
        &NodeRegistry::builtin(),
    )
    .unwrap();

    let out = render(reloaded, temp_dir.path(), "chain.png").await.unwrap();
    assert_eq!(out.dimensions(), (32, 24));
    assert!(out.pixels().any(|p| *p == Rgb([255, 255, 255])));
}

#[tokio::test]
async fn test_unconnected_end_node_is_missing_input() {
    let temp_dir = TempDir::new().unwrap();
    let err = render(NodeGraph::new(), temp_dir.path(), "none.png")
        .await
        .unwrap_err();
    assert!(matches!(err, RedactorError::MissingInput { .. }));
}

#[tokio::test]
async fn test_image_node_without_file_is_invalid() {
    let temp_dir = TempDir::new().unwrap();
    let mut graph = NodeGraph::new();
    let image = graph.add_node(NodeKind::Image).unwrap();
    graph.connect(&image, END_NODE_ID, FIRST).unwrap();

    let err = render(graph, temp_dir.path(), "empty.png").await.unwrap_err();
    assert!(matches!(err, RedactorError::InvalidParameter { .. }));
}

#[test]
fn test_rotate_half_turn_keeps_size() {
    let temp_dir = TempDir::new().unwrap();
    let photo = write_photo(temp_dir.path());

    let mut graph = NodeGraph::new();
    let image = graph.add_node(NodeKind::Image).unwrap();
    graph.set_data(&image, photo).unwrap();
    let rotate = graph.add_node(NodeKind::Rotate).unwrap();
    let degrees = graph.add_node(NodeKind::Float).unwrap();
    graph.set_data(&degrees, "180").unwrap();
    graph.connect(&image, &rotate, FIRST).unwrap();
    graph.connect(&degrees, &rotate, SECOND).unwrap();
    graph.connect(&rotate, END_NODE_ID, FIRST).unwrap();

    let out = tokio_test::block_on(render(graph, temp_dir.path(), "rotated.png")).unwrap();
    assert_eq!(out.dimensions(), (16, 12));
}
