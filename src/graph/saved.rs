//! On-disk form of a node graph (`*.ns` files).

use serde::{Deserialize, Serialize};

/// Node graph file extension.
pub const GRAPH_EXTENSION: &str = "ns";

/// A layout coordinate pair, stored as `{"first": x, "second": y}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorSize {
    pub first: f64,
    pub second: f64,
}

impl From<(f64, f64)> for AnchorSize {
    fn from((first, second): (f64, f64)) -> Self {
        Self { first, second }
    }
}

impl From<AnchorSize> for (f64, f64) {
    fn from(anchor: AnchorSize) -> Self {
        (anchor.first, anchor.second)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    /// Kind name; kept as text so unknown kinds can be skipped instead of failing the file.
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkData {
    pub id: String,
    /// Node consuming the value.
    pub input_node: String,
    /// Node producing the value.
    pub output_node: String,
    /// Slot name on the consuming node.
    pub input_anchor: String,
    pub output_anchor: String,
    #[serde(default)]
    pub input_anchor_size: AnchorSize,
    #[serde(default)]
    pub output_anchor_size: AnchorSize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Saved {
    pub nodes: Option<Vec<NodeData>>,
    pub links: Option<Vec<LinkData>>,
}
