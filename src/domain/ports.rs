use crate::domain::model::{RedactionJob, RenderResult, SourceImage};
use crate::utils::error::Result;
use crate::vision::OutputFormat;
use async_trait::async_trait;
use image::DynamicImage;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    /// Format forced on every output, overriding the output file extension.
    fn output_format(&self) -> Option<OutputFormat>;
}

/// Pixel-level operations the presentation layer relies on.
pub trait VisionBackend: Send + Sync {
    fn decode(&self, source_name: &str, bytes: &[u8]) -> Result<DynamicImage>;
    fn encode(&self, image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>>;
    fn apply_job(&self, job: &RedactionJob, image: DynamicImage) -> Result<(DynamicImage, usize)>;

    /// Decodes `bytes`, applies `job` and re-encodes in `format`.
    fn redact(&self, job: &RedactionJob, bytes: &[u8], format: OutputFormat) -> Result<Vec<u8>> {
        let image = self.decode(&job.source_image_path, bytes)?;
        let (redacted, _) = self.apply_job(job, image)?;
        self.encode(&redacted, format)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SourceImage>>;
    async fn transform(&self, sources: Vec<SourceImage>) -> Result<RenderResult>;
    async fn load(&self, result: RenderResult) -> Result<String>;
}
