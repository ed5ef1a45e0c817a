use image::{Rgb, RgbImage};
use image_redactor::graph::kind::NodeKind;
use image_redactor::graph::{END_NODE_ID, FIRST};
use image_redactor::utils::validation::Validate;
use image_redactor::{
    GraphPipeline, JobCodec, JobPipeline, LocalStorage, NodeGraph, NodeRegistry,
    RedactionEngine, RedactionMode, TomlConfig,
};
use std::path::Path;
use tempfile::TempDir;

fn batch_file(dir: &Path) -> String {
    let photo = dir.join("team.png");
    RgbImage::from_pixel(10, 10, Rgb([200, 50, 50]))
        .save(&photo)
        .unwrap();

    let mut graph = NodeGraph::new();
    let image = graph.add_node(NodeKind::Image).unwrap();
    graph.set_data(&image, photo.to_str().unwrap()).unwrap();
    let invert = graph.add_node(NodeKind::Invert).unwrap();
    graph.connect(&image, &invert, FIRST).unwrap();
    graph.connect(&invert, END_NODE_ID, FIRST).unwrap();
    let graph_file = dir.join("invert.ns");
    std::fs::write(&graph_file, JobCodec::encode_graph(&graph.to_saved()).unwrap()).unwrap();

    std::env::set_var("BATCH_TEST_OUTPUT", dir.join("out").to_str().unwrap());

    format!(
        r#"
[batch]
name = "integration"
version = "1.0"

[output]
path = "${{BATCH_TEST_OUTPUT}}"
format = "png"

[redaction]
color = "00ff00"

[[jobs]]
source = "{photo}"
mode = "fill"
output = "filled.png"
regions = [{{ x = 0, y = 0, width = 5, height = 10 }}]

[[graphs]]
file = "{graph}"
output = "inverted.png"

[monitoring]
enabled = false
"#,
        photo = photo.display(),
        graph = graph_file.display()
    )
}

#[tokio::test]
async fn test_batch_runs_jobs_and_graphs() {
    let temp_dir = TempDir::new().unwrap();
    let config = TomlConfig::from_toml_str(&batch_file(temp_dir.path())).unwrap();
    config.validate().unwrap();
    assert!(!config.monitoring_enabled());

    let jobs = config.resolve_jobs().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].mode, RedactionMode::Fill { color: [0, 255, 0, 255] });

    let job = jobs.into_iter().next().unwrap();
    let pipeline = JobPipeline::new(
        LocalStorage::new(config.output.path.clone()),
        config.clone(),
        job,
    );
    let filled = RedactionEngine::new(pipeline).run().await.unwrap();
    let filled = image::open(filled).unwrap().to_rgb8();
    assert_eq!(filled.get_pixel(0, 0), &Rgb([0, 255, 0]));
    assert_eq!(filled.get_pixel(9, 9), &Rgb([200, 50, 50]));

    let entry = &config.graphs[0];
    let graph = JobCodec::load_graph(
        &std::fs::read_to_string(&entry.file).unwrap(),
        &NodeRegistry::builtin(),
    )
    .unwrap();
    let pipeline = GraphPipeline::new(
        LocalStorage::new(config.output.path.clone()),
        config.clone(),
        graph,
        entry.output.clone(),
    );
    let inverted = RedactionEngine::new(pipeline).run().await.unwrap();
    assert!(inverted.ends_with("inverted.png"));
    let inverted = image::open(inverted).unwrap().to_rgb8();
    assert_eq!(inverted.get_pixel(3, 3), &Rgb([55, 205, 205]));

    std::env::remove_var("BATCH_TEST_OUTPUT");
}
