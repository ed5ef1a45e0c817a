use crate::codec::JobCodec;
use crate::config::ModeKind;
use crate::domain::model::{RedactionJob, Region};
use crate::domain::ports::ConfigProvider;
use crate::graph::saved::GRAPH_EXTENSION;
use crate::utils::error::{RedactorError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, Validate,
};
use crate::vision::OutputFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub batch: BatchConfig,
    pub output: OutputConfig,
    pub redaction: Option<RedactionDefaults>,
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
    #[serde(default)]
    pub graphs: Vec<GraphEntry>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub format: Option<OutputFormat>,
}

/// Parameters used by jobs that leave them out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactionDefaults {
    pub block_size: Option<u32>,
    pub sigma: Option<f32>,
    pub color: Option<String>,
}

/// A job given either as a saved job file or inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobEntry {
    pub job: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub regions: Vec<Region>,
    pub mode: Option<ModeKind>,
    pub block_size: Option<u32>,
    pub sigma: Option<f32>,
    pub color: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEntry {
    pub file: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub system_stats: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RedactorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RedactorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring
            .as_ref()
            .map(|m| m.enabled && m.system_stats.unwrap_or(true))
            .unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    /// Resolves every `[[jobs]]` entry, reading job files where named.
    pub fn resolve_jobs(&self) -> Result<Vec<RedactionJob>> {
        self.jobs
            .iter()
            .enumerate()
            .map(|(index, entry)| self.resolve_job(index, entry))
            .collect()
    }

    fn resolve_job(&self, index: usize, entry: &JobEntry) -> Result<RedactionJob> {
        let field = |name: &str| format!("jobs[{}].{}", index, name);

        let mut job = match (&entry.job, &entry.source) {
            (Some(file), None) => {
                let text = std::fs::read_to_string(file)?;
                JobCodec::decode_job(&text)?
            }
            (None, Some(source)) => {
                let defaults = self.redaction.clone().unwrap_or_default();
                let mode = entry.mode.unwrap_or(ModeKind::Pixelate).build(
                    entry.block_size.or(defaults.block_size),
                    entry.sigma.or(defaults.sigma),
                    entry.color.as_deref().or(defaults.color.as_deref()),
                )?;
                let mut job = RedactionJob::new(source.clone(), mode);
                job.regions = entry.regions.clone();
                job
            }
            (Some(_), Some(_)) => {
                return Err(RedactorError::ConfigValidationError {
                    field: field("job"),
                    message: "Use either 'job' or 'source', not both".to_string(),
                })
            }
            (None, None) => {
                return Err(RedactorError::MissingConfigError {
                    field: field("source"),
                })
            }
        };

        if let Some(output) = &entry.output {
            job.output_path = Some(output.clone());
        }
        job.validate()?;
        Ok(job)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("batch.name", &self.batch.name)?;
        validate_path("output.path", &self.output.path)?;

        if self.jobs.is_empty() && self.graphs.is_empty() {
            return Err(RedactorError::ConfigValidationError {
                field: "jobs".to_string(),
                message: "Nothing to do: add a [[jobs]] or [[graphs]] entry".to_string(),
            });
        }

        if let Some(defaults) = &self.redaction {
            ModeKind::Pixelate.build(defaults.block_size, None, None)?;
            ModeKind::Blur.build(None, defaults.sigma, None)?;
            ModeKind::Fill.build(None, None, defaults.color.as_deref())?;
        }

        for (index, entry) in self.jobs.iter().enumerate() {
            if entry.job.is_some() == entry.source.is_some() {
                return Err(RedactorError::ConfigValidationError {
                    field: format!("jobs[{}]", index),
                    message: "Each job needs exactly one of 'job' or 'source'".to_string(),
                });
            }
            if let Some(output) = &entry.output {
                validate_file_extensions(
                    &format!("jobs[{}].output", index),
                    std::slice::from_ref(output),
                    &OutputFormat::EXTENSIONS,
                )?;
            }
        }

        for (index, graph) in self.graphs.iter().enumerate() {
            validate_file_extensions(
                &format!("graphs[{}].file", index),
                std::slice::from_ref(&graph.file),
                &[GRAPH_EXTENSION],
            )?;
            validate_file_extensions(
                &format!("graphs[{}].output", index),
                std::slice::from_ref(&graph.output),
                &OutputFormat::EXTENSIONS,
            )?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_format(&self) -> Option<OutputFormat> {
        self.output.format
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
