use clap::Parser;
use image_redactor::config::toml_config::TomlConfig;
use image_redactor::utils::error::RedactorError;
use image_redactor::utils::{logger, validation::Validate};
use image_redactor::{
    GraphPipeline, JobCodec, JobPipeline, LocalStorage, NodeRegistry, RedactionEngine,
    RedactionJob,
};

#[derive(Parser)]
#[command(name = "toml-redact")]
#[command(about = "Run the redaction jobs and graphs listed in a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "redact.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if args.json_logs {
        logger::init_batch_logger(if args.verbose {
            Some("debug")
        } else {
            config.log_level()
        });
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based redaction");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let jobs = match config.resolve_jobs() {
        Ok(jobs) => jobs,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &jobs, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config, &jobs);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let mut failures: Vec<(String, RedactorError)> = Vec::new();
    let mut written = 0;

    for job in jobs {
        let label = job.source_image_path.clone();
        let storage = LocalStorage::new(config.output.path.clone());
        let pipeline = JobPipeline::new(storage, config.clone(), job);
        let engine = RedactionEngine::new_with_monitoring(pipeline, monitor_enabled);
        match engine.run().await {
            Ok(output_path) => {
                println!("✅ {} -> {}", label, output_path);
                written += 1;
            }
            Err(e) => failures.push((label, e)),
        }
    }

    let registry = NodeRegistry::builtin();
    for entry in &config.graphs {
        let result: image_redactor::Result<String> = async {
            let text = tokio::fs::read_to_string(&entry.file).await?;
            let graph = JobCodec::load_graph(&text, &registry)?;
            let storage = LocalStorage::new(config.output.path.clone());
            let pipeline = GraphPipeline::new(storage, config.clone(), graph, entry.output.clone());
            RedactionEngine::new_with_monitoring(pipeline, monitor_enabled)
                .run()
                .await
        }
        .await;
        match result {
            Ok(output_path) => {
                println!("✅ {} -> {}", entry.file, output_path);
                written += 1;
            }
            Err(e) => failures.push((entry.file.clone(), e)),
        }
    }

    println!("📁 {} output(s) written to {}", written, config.output.path);

    if failures.is_empty() {
        tracing::info!("✅ Batch '{}' completed successfully!", config.batch.name);
        return Ok(());
    }

    for (label, e) in &failures {
        tracing::error!(
            "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
            label,
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}: {}", label, e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    }

    let exit_code = failures
        .iter()
        .max_by_key(|(_, e)| e.severity())
        .map(|(_, e)| e.exit_code())
        .unwrap_or(1);
    std::process::exit(exit_code);
}

fn display_config_summary(config: &TomlConfig, jobs: &[RedactionJob], args: &Args) {
    println!("📋 Configuration Summary:");
    match &config.batch.version {
        Some(version) => println!("  Batch: {} v{}", config.batch.name, version),
        None => println!("  Batch: {}", config.batch.name),
    }
    if let Some(description) = &config.batch.description {
        println!("  Description: {}", description);
    }
    println!("  Output: {}", config.output.path);
    if let Some(format) = config.output.format {
        println!("  Format: {}", format.extension());
    }
    println!("  Jobs: {}", jobs.len());
    println!("  Graphs: {}", config.graphs.len());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig, jobs: &[RedactionJob]) {
    println!("🔍 Dry Run Analysis:");

    if !jobs.is_empty() {
        println!();
        println!("🖼️ Redaction Jobs:");
        for job in jobs {
            println!(
                "  {} -> {} ({} region(s), {})",
                job.source_image_path,
                job.output_name(),
                job.regions.len(),
                job.mode.name()
            );
            for region in &job.regions {
                println!(
                    "    {},{} {}x{}",
                    region.x, region.y, region.width, region.height
                );
            }
        }
    }

    if !config.graphs.is_empty() {
        println!();
        println!("🧩 Graphs:");
        for entry in &config.graphs {
            println!("  {} -> {}", entry.file, entry.output);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
