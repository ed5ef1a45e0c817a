//! JSON persistence for redaction jobs and node graphs.

use crate::domain::model::RedactionJob;
use crate::graph::registry::NodeRegistry;
use crate::graph::saved::Saved;
use crate::graph::NodeGraph;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

pub struct JobCodec;

impl JobCodec {
    pub fn encode_job(job: &RedactionJob) -> Result<String> {
        Ok(serde_json::to_string_pretty(job)?)
    }

    /// Parses and validates a job document.
    pub fn decode_job(text: &str) -> Result<RedactionJob> {
        let job: RedactionJob = serde_json::from_str(text)?;
        job.validate()?;
        Ok(job)
    }

    pub fn encode_graph(saved: &Saved) -> Result<String> {
        Ok(serde_json::to_string_pretty(saved)?)
    }

    pub fn decode_graph(text: &str) -> Result<Saved> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decodes a graph file and rebuilds it with the kinds `registry` allows.
    pub fn load_graph(text: &str, registry: &NodeRegistry) -> Result<NodeGraph> {
        NodeGraph::from_saved(Self::decode_graph(text)?, registry)
    }
}
