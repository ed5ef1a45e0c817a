use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

/// Drives a [`Pipeline`] through extract, transform and load.
pub struct RedactionEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> RedactionEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Returns where the output was written.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting redaction run");
        self.monitor.log_stats("start");

        tracing::info!("📥 Reading source images...");
        let sources = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} source image(s)", sources.len());
        self.monitor.log_stats("extract");

        tracing::info!("🎨 Processing pixels...");
        let result = self.pipeline.transform(sources).await?;
        tracing::info!(
            "🎨 Applied {} operation(s) to a {}x{} image",
            result.operations_applied,
            result.image.width(),
            result.image.height()
        );
        self.monitor.log_stats("transform");

        tracing::info!("💾 Writing output...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("load");

        self.monitor.log_final_stats();
        tracing::debug!("Run finished in {:?}", started.elapsed());
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RenderResult, SourceImage};
    use crate::utils::error::RedactorError;
    use async_trait::async_trait;
    use image::DynamicImage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
        fail_transform: bool,
    }

    #[async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<Vec<SourceImage>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![SourceImage {
                key: "a".to_string(),
                path: "a.png".to_string(),
                bytes: Vec::new(),
            }])
        }

        async fn transform(&self, sources: Vec<SourceImage>) -> Result<RenderResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transform {
                return Err(RedactorError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(RenderResult {
                image: DynamicImage::new_rgb8(2, 2),
                output_name: format!("{}.png", sources[0].key),
                operations_applied: 0,
            })
        }

        async fn load(&self, result: RenderResult) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("out/{}", result.output_name))
        }
    }

    #[tokio::test]
    async fn test_run_calls_every_phase() {
        let engine = RedactionEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: false,
        });
        assert_eq!(engine.run().await.unwrap(), "out/a.png");
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failed_phase_stops_the_run() {
        let engine = RedactionEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: true,
        });
        let result = tokio_test::block_on(engine.run());
        assert!(matches!(result, Err(RedactorError::ProcessingError { .. })));
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 2);
    }
}
