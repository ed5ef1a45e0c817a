use clap::Parser;
use image_redactor::config::cli::{Command, RedactArgs};
use image_redactor::domain::ports::VisionBackend;
use image_redactor::graph::saved::GRAPH_EXTENSION;
use image_redactor::graph::{ImageInputs, NodeState};
use image_redactor::utils::validation::validate_file_extensions;
use image_redactor::utils::{logger, validation::Validate};
use image_redactor::{
    CliConfig, EditorSession, GraphPipeline, ImageBackend, JobCodec, JobPipeline, LocalStorage,
    NodeGraph, NodeRegistry, RedactionEngine, RedactorError, Result,
};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting image-redactor CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = execute(&config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn execute(config: &CliConfig) -> Result<()> {
    match &config.command {
        Command::Redact(args) => redact(config, args).await,
        Command::Render { graph, output } => render(config, graph, output.as_deref()).await,
        Command::Inspect { graph } => inspect(graph).await,
        Command::Nodes => {
            list_nodes();
            Ok(())
        }
        Command::NewGraph { output } => new_graph(output),
    }
}

async fn redact(config: &CliConfig, args: &RedactArgs) -> Result<()> {
    let mut session = EditorSession::new();

    match (&args.job, &args.image) {
        (Some(job_file), _) => {
            session.load_job(job_file)?;
        }
        (None, Some(image)) => {
            session.open_image(image)?;
            for region in &args.regions {
                session.add_region(*region)?;
            }
            session.set_mode(args.redaction_mode()?)?;
        }
        (None, None) => {
            return Err(RedactorError::MissingConfigError {
                field: "image".to_string(),
            })
        }
    }

    if args.output.is_some() {
        session.set_output(args.output.clone())?;
    }

    if let Some(job_file) = &args.save_job {
        session.save_job(job_file)?;
        println!("💾 Job saved to: {}", job_file);
    }

    let job = session.discard().ok_or_else(|| RedactorError::ValidationError {
        message: "No image is open".to_string(),
    })?;
    let regions = job.regions.len();

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = JobPipeline::new(storage, config.clone(), job);
    let engine = RedactionEngine::new_with_monitoring(pipeline, config.monitor);
    let output_path = engine.run().await?;

    println!("✅ Redacted {} region(s)", regions);
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

async fn read_graph(path: &str) -> Result<NodeGraph> {
    validate_file_extensions("graph", &[path.to_string()], &[GRAPH_EXTENSION])?;
    let text = tokio::fs::read_to_string(path).await?;
    JobCodec::load_graph(&text, &NodeRegistry::builtin())
}

async fn render(config: &CliConfig, graph_path: &str, output: Option<&str>) -> Result<()> {
    let graph = read_graph(graph_path).await?;
    let output_name = output.map(str::to_string).unwrap_or_else(|| {
        let stem = Path::new(graph_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("graph");
        format!("{}.png", stem)
    });

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = GraphPipeline::new(storage, config.clone(), graph, output_name);
    let engine = RedactionEngine::new_with_monitoring(pipeline, config.monitor);
    let output_path = engine.run().await?;

    println!("✅ Graph rendered");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

async fn inspect(graph_path: &str) -> Result<()> {
    let graph = read_graph(graph_path).await?;
    let backend = ImageBackend::new();

    let mut images = ImageInputs::new();
    for (node_id, path) in graph.image_sources() {
        let decoded = match tokio::fs::read(&path).await {
            Ok(bytes) => backend.decode(&path, &bytes),
            Err(e) => Err(e.into()),
        };
        match decoded {
            Ok(image) => {
                images.insert(node_id, Arc::new(image.to_rgb8()));
            }
            Err(e) => tracing::warn!("⚠️ Node '{}' cannot load {}: {}", node_id, path, e),
        }
    }

    println!(
        "📋 {}: {} node(s), {} link(s)",
        graph_path,
        graph.nodes().len(),
        graph.links().len()
    );
    for status in graph.status(&images) {
        match status.state {
            NodeState::Ready(value_type) => {
                println!("  ✅ {} ({}) -> {}", status.id, status.kind, value_type)
            }
            NodeState::MissingInput { slot } => {
                println!("  ⚠️ {} ({}) missing input on {}", status.id, status.kind, slot)
            }
            NodeState::Invalid { reason } => {
                println!("  ❌ {} ({}) {}", status.id, status.kind, reason)
            }
        }
    }
    Ok(())
}

fn list_nodes() {
    let registry = NodeRegistry::builtin();
    println!("🧩 Available nodes:");
    for kind in registry.palette() {
        let inputs = kind
            .inputs()
            .iter()
            .map(|slot| format!("{} ({})", slot.label, slot.value_type))
            .collect::<Vec<_>>();
        let inputs = if inputs.is_empty() {
            "-".to_string()
        } else {
            inputs.join(", ")
        };
        println!(
            "  {:<15} {:<11} {} -> {}",
            kind.name(),
            kind.title(),
            inputs,
            kind.output()
        );
    }
}

fn new_graph(output: &str) -> Result<()> {
    validate_file_extensions("output", &[output.to_string()], &[GRAPH_EXTENSION])?;
    let text = JobCodec::encode_graph(&NodeGraph::new().to_saved())?;
    std::fs::write(output, text)?;
    println!("✅ Empty graph written to: {}", output);
    Ok(())
}
