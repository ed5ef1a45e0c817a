use crate::config::ModeKind;
use crate::domain::model::{RedactionMode, Region};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use crate::vision::OutputFormat;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "image-redactor")]
#[command(about = "Redact image regions and render node-editor graphs")]
pub struct CliConfig {
    #[arg(long, global = true, default_value = "./output")]
    pub output_path: String,

    /// Force an output format instead of following the output file extension
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Redact regions of one image
    Redact(RedactArgs),
    /// Evaluate a saved graph and write the image reaching its end node
    Render {
        #[arg(long)]
        graph: String,
        #[arg(long)]
        output: Option<String>,
    },
    /// Show which nodes of a saved graph produce a value
    Inspect {
        #[arg(long)]
        graph: String,
    },
    /// List the node kinds that can be placed
    Nodes,
    /// Write an empty graph holding only the end node
    NewGraph {
        #[arg(long)]
        output: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RedactArgs {
    /// Saved job file to run
    #[arg(long, conflicts_with_all = ["image", "regions"])]
    pub job: Option<String>,

    #[arg(long, required_unless_present = "job")]
    pub image: Option<String>,

    /// Region as x,y,width,height (repeatable)
    #[arg(long = "region")]
    pub regions: Vec<Region>,

    #[arg(long, value_enum, default_value_t = ModeKind::Pixelate)]
    pub mode: ModeKind,

    #[arg(long)]
    pub block_size: Option<u32>,

    #[arg(long)]
    pub sigma: Option<f32>,

    /// Fill colour as RRGGBB or RRGGBBAA
    #[arg(long)]
    pub color: Option<String>,

    /// Also store the job as JSON
    #[arg(long)]
    pub save_job: Option<String>,

    /// Output file name, relative to --output-path
    #[arg(long)]
    pub output: Option<String>,
}

impl RedactArgs {
    pub fn redaction_mode(&self) -> Result<RedactionMode> {
        self.mode
            .build(self.block_size, self.sigma, self.color.as_deref())
    }
}

impl ConfigProvider for CliConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_format(&self) -> Option<OutputFormat> {
        self.format
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_redact() {
        let config = CliConfig::try_parse_from([
            "image-redactor",
            "redact",
            "--image",
            "cat.png",
            "--region",
            "1,2,3,4",
            "--region",
            "10,10,5,5",
            "--mode",
            "fill",
            "--color",
            "ff0000",
            "--output-path",
            "/tmp/out",
        ])
        .unwrap();

        assert_eq!(config.output_path, "/tmp/out");
        let Command::Redact(args) = &config.command else {
            panic!("expected redact");
        };
        assert_eq!(args.image.as_deref(), Some("cat.png"));
        assert_eq!(args.regions.len(), 2);
        assert_eq!(
            args.redaction_mode().unwrap(),
            RedactionMode::Fill { color: [255, 0, 0, 255] }
        );
    }

    #[test]
    fn test_job_and_image_conflict() {
        let result = CliConfig::try_parse_from([
            "image-redactor",
            "redact",
            "--job",
            "job.json",
            "--image",
            "cat.png",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_region_is_rejected_by_parser() {
        let result = CliConfig::try_parse_from([
            "image-redactor",
            "redact",
            "--image",
            "cat.png",
            "--region",
            "1,2,3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_flag() {
        let config =
            CliConfig::try_parse_from(["image-redactor", "--format", "bmp", "nodes"]).unwrap();
        assert_eq!(config.output_format(), Some(OutputFormat::Bmp));
        assert!(matches!(config.command, Command::Nodes));
    }
}
