use crate::core::{
    run_blocking, store_render, ConfigProvider, Pipeline, RenderResult, SourceImage, Storage,
    VisionBackend,
};
use crate::domain::model::RedactionJob;
use crate::utils::error::{RedactorError, Result};
use crate::utils::validation::Validate;
use crate::vision::ImageBackend;
use std::sync::Arc;

/// Redacts the regions of a single [`RedactionJob`].
pub struct JobPipeline<S: Storage, C: ConfigProvider, B: VisionBackend = ImageBackend> {
    storage: S,
    config: C,
    backend: Arc<B>,
    job: Arc<RedactionJob>,
}

impl<S: Storage, C: ConfigProvider> JobPipeline<S, C, ImageBackend> {
    pub fn new(storage: S, config: C, job: RedactionJob) -> Self {
        Self::with_backend(storage, config, job, ImageBackend::new())
    }
}

impl<S: Storage, C: ConfigProvider, B: VisionBackend> JobPipeline<S, C, B> {
    pub fn with_backend(storage: S, config: C, job: RedactionJob, backend: B) -> Self {
        Self {
            storage,
            config,
            backend: Arc::new(backend),
            job: Arc::new(job),
        }
    }

    pub fn job(&self) -> &RedactionJob {
        &self.job
    }
}

#[async_trait::async_trait]
impl<S, C, B> Pipeline for JobPipeline<S, C, B>
where
    S: Storage,
    C: ConfigProvider,
    B: VisionBackend + 'static,
{
    async fn extract(&self) -> Result<Vec<SourceImage>> {
        self.job.validate()?;

        let path = &self.job.source_image_path;
        let bytes = self.storage.read_file(path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path);

        Ok(vec![SourceImage {
            key: path.clone(),
            path: path.clone(),
            bytes,
        }])
    }

    async fn transform(&self, sources: Vec<SourceImage>) -> Result<RenderResult> {
        let source = sources
            .into_iter()
            .next()
            .ok_or_else(|| RedactorError::ProcessingError {
                message: "No source image was read".to_string(),
            })?;

        tracing::debug!(
            "Redacting {} region(s) with {}",
            self.job.regions.len(),
            self.job.mode.name()
        );
        let backend = Arc::clone(&self.backend);
        let job = Arc::clone(&self.job);
        let (image, operations_applied) = run_blocking("redact", move || {
            let image = backend.decode(&source.path, &source.bytes)?;
            backend.apply_job(&job, image)
        })
        .await?;

        Ok(RenderResult {
            image,
            output_name: self.job.output_name(),
            operations_applied,
        })
    }

    async fn load(&self, result: RenderResult) -> Result<String> {
        tracing::debug!("Storing under {}", self.config.output_path());
        store_render(&self.storage, &self.config, Arc::clone(&self.backend), result).await
    }
}
