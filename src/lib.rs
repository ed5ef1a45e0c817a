pub mod codec;
pub mod config;
pub mod core;
pub mod domain;
pub mod graph;
pub mod session;
pub mod utils;
pub mod vision;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::{storage::LocalStorage, toml_config::TomlConfig, ModeKind};

pub use codec::JobCodec;
pub use crate::core::{engine::RedactionEngine, graph_pipeline::GraphPipeline, job_pipeline::JobPipeline};
pub use domain::model::{RedactionJob, RedactionMode, Region};
pub use graph::{registry::NodeRegistry, NodeGraph};
pub use session::EditorSession;
pub use utils::error::{RedactorError, Result};
pub use vision::{ImageBackend, OutputFormat};
