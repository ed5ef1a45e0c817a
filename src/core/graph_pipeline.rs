use crate::core::{
    run_blocking, store_render, ConfigProvider, Pipeline, RenderResult, SourceImage, Storage,
    VisionBackend,
};
use crate::graph::kind::{NodeKind, ValueType};
use crate::graph::{ImageInputs, NodeGraph};
use crate::utils::error::Result;
use crate::vision::ImageBackend;
use image::DynamicImage;
use std::sync::Arc;

/// Renders the image reaching the end node of a node graph.
pub struct GraphPipeline<S: Storage, C: ConfigProvider, B: VisionBackend = ImageBackend> {
    storage: S,
    config: C,
    backend: Arc<B>,
    graph: Arc<NodeGraph>,
    output_name: String,
}

impl<S: Storage, C: ConfigProvider> GraphPipeline<S, C, ImageBackend> {
    pub fn new(storage: S, config: C, graph: NodeGraph, output_name: impl Into<String>) -> Self {
        Self::with_backend(storage, config, graph, output_name, ImageBackend::new())
    }
}

impl<S: Storage, C: ConfigProvider, B: VisionBackend> GraphPipeline<S, C, B> {
    pub fn with_backend(
        storage: S,
        config: C,
        graph: NodeGraph,
        output_name: impl Into<String>,
        backend: B,
    ) -> Self {
        Self {
            storage,
            config,
            backend: Arc::new(backend),
            graph: Arc::new(graph),
            output_name: output_name.into(),
        }
    }
}

#[async_trait::async_trait]
impl<S, C, B> Pipeline for GraphPipeline<S, C, B>
where
    S: Storage,
    C: ConfigProvider,
    B: VisionBackend + 'static,
{
    async fn extract(&self) -> Result<Vec<SourceImage>> {
        let mut sources = Vec::new();
        for (node_id, path) in self.graph.image_sources() {
            let bytes = self.storage.read_file(&path).await?;
            tracing::debug!("Node '{}' reads {} ({} bytes)", node_id, path, bytes.len());
            sources.push(SourceImage {
                key: node_id,
                path,
                bytes,
            });
        }
        Ok(sources)
    }

    async fn transform(&self, sources: Vec<SourceImage>) -> Result<RenderResult> {
        let backend = Arc::clone(&self.backend);
        let graph = Arc::clone(&self.graph);

        let (image, operations_applied) = run_blocking("render", move || {
            let mut images = ImageInputs::new();
            for source in sources {
                let decoded = backend.decode(&source.path, &source.bytes)?;
                images.insert(source.key, Arc::new(decoded.to_rgb8()));
            }

            let rendered = graph.render(&images)?;
            let operations = graph
                .end_node_id()
                .map(|end| {
                    graph
                        .upstream(end)
                        .iter()
                        .filter(|node| {
                            node.kind != NodeKind::Image
                                && node.kind.output() == ValueType::Image
                        })
                        .count()
                })
                .unwrap_or(0);

            let image = Arc::try_unwrap(rendered).unwrap_or_else(|shared| (*shared).clone());
            Ok((DynamicImage::ImageRgb8(image), operations))
        })
        .await?;

        Ok(RenderResult {
            image,
            output_name: self.output_name.clone(),
            operations_applied,
        })
    }

    async fn load(&self, result: RenderResult) -> Result<String> {
        tracing::debug!("Storing under {}", self.config.output_path());
        store_render(&self.storage, &self.config, Arc::clone(&self.backend), result).await
    }
}
