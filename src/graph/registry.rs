use crate::graph::kind::NodeKind;
use crate::graph::NodeGraph;
use crate::utils::error::{RedactorError, Result};

/// Order of the node buttons in the editor palette.
const PALETTE: [NodeKind; 16] = [
    NodeKind::Int,
    NodeKind::Float,
    NodeKind::String,
    NodeKind::Image,
    NodeKind::Sepia,
    NodeKind::Grey,
    NodeKind::Invert,
    NodeKind::Bright,
    NodeKind::Gaussian,
    NodeKind::Rotate,
    NodeKind::ScalePixel,
    NodeKind::Scale,
    NodeKind::MovePixel,
    NodeKind::Move,
    NodeKind::AddTextPixel,
    NodeKind::AddText,
];

/// Allow-list of node kinds the presentation layer may construct by name.
///
/// Saved graphs and command line input only ever reach a [`NodeKind`] through
/// [`NodeRegistry::resolve`]; a name missing from the registry is rejected.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    kinds: Vec<NodeKind>,
}

impl NodeRegistry {
    pub fn builtin() -> Self {
        Self {
            kinds: NodeKind::ALL.to_vec(),
        }
    }

    /// Registry limited to `kinds`. The end node is always registered.
    pub fn with_kinds(kinds: &[NodeKind]) -> Self {
        let mut kinds = kinds.to_vec();
        if !kinds.contains(&NodeKind::EndNode) {
            kinds.push(NodeKind::EndNode);
        }
        Self { kinds }
    }

    pub fn resolve(&self, name: &str) -> Option<NodeKind> {
        self.kinds
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn is_registered(&self, kind: NodeKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Kinds a user can place, in palette order.
    pub fn palette(&self) -> impl Iterator<Item = NodeKind> + '_ {
        PALETTE.iter().copied().filter(|kind| self.kinds.contains(kind))
    }

    /// Places a node of the kind called `name` in `graph`.
    pub fn create(&self, graph: &mut NodeGraph, name: &str) -> Result<String> {
        let kind = self
            .resolve(name)
            .ok_or_else(|| RedactorError::InvalidConfigValueError {
                field: "kind".to_string(),
                value: name.to_string(),
                reason: format!(
                    "Unknown node kind. Known kinds: {}",
                    self.palette().map(|k| k.name()).collect::<Vec<_>>().join(", ")
                ),
            })?;
        graph.add_node(kind)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = NodeRegistry::builtin();
        assert_eq!(registry.resolve("scale_pixel"), Some(NodeKind::ScalePixel));
        assert_eq!(registry.resolve("END_NODE"), Some(NodeKind::EndNode));
        assert_eq!(registry.resolve("Class.forName"), None);
    }

    #[test]
    fn test_palette_order_skips_end_node() {
        let registry = NodeRegistry::builtin();
        let palette: Vec<_> = registry.palette().collect();
        assert_eq!(palette.len(), 16);
        assert_eq!(palette[0], NodeKind::Int);
        assert_eq!(palette[9], NodeKind::Rotate);
        assert!(!palette.contains(&NodeKind::EndNode));
    }

    #[test]
    fn test_restricted_registry_rejects_unlisted_kinds() {
        let registry = NodeRegistry::with_kinds(&[NodeKind::Image, NodeKind::Grey]);
        let mut graph = NodeGraph::new();

        assert!(registry.create(&mut graph, "GREY").is_ok());
        assert!(registry.create(&mut graph, "SEPIA").is_err());
        assert!(registry.is_registered(NodeKind::EndNode));
        assert_eq!(registry.palette().count(), 2);
    }
}
