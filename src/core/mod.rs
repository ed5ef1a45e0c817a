pub mod engine;
pub mod graph_pipeline;
pub mod job_pipeline;

pub use crate::domain::model::{RenderResult, SourceImage};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, VisionBackend};
pub use crate::utils::error::Result;

use crate::utils::error::RedactorError;
use crate::vision::OutputFormat;
use std::path::Path;
use std::sync::Arc;

/// Runs pixel work off the async runtime.
pub(crate) async fn run_blocking<T, F>(task: &str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RedactorError::ProcessingError {
            message: format!("{} worker failed: {}", task, e),
        })?
}

/// Encodes a render result and writes it through `storage`.
///
/// A format forced by the config replaces the extension of the output name.
pub(crate) async fn store_render<S, C, B>(
    storage: &S,
    config: &C,
    backend: Arc<B>,
    result: RenderResult,
) -> Result<String>
where
    S: Storage,
    C: ConfigProvider,
    B: VisionBackend + 'static,
{
    let (format, name) = match config.output_format() {
        Some(format) => {
            let name = Path::new(&result.output_name)
                .with_extension(format.extension())
                .display()
                .to_string();
            (format, name)
        }
        None => (OutputFormat::from_path(&result.output_name)?, result.output_name),
    };

    let image = result.image;
    let bytes = run_blocking("encode", move || backend.encode(&image, format)).await?;
    tracing::debug!("Encoded {} bytes as {:?}", bytes.len(), format);

    storage.write_file(&name, &bytes).await
}
