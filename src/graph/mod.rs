//! Typed dataflow graph behind the node editor.
//!
//! Value nodes and image nodes feed filter nodes, and filter nodes feed
//! the single end node whose input is what gets saved. Links are checked when
//! they are made: the producer's output type must match the slot, a slot takes
//! at most one link, and no link may close a cycle. Evaluation is pure; image
//! files are decoded beforehand and handed in by node id.

pub mod kind;
pub mod registry;
pub mod saved;

use crate::utils::error::{RedactorError, Result};
use crate::vision::{filters, geometry, text};
use image::{Rgb, RgbImage};
use kind::{NodeKind, Slot, ValueType};
use registry::NodeRegistry;
use saved::{LinkData, NodeData, Saved};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub use kind::{FIFTH, FIRST, FOURTH, SECOND, THIRD};

pub const END_NODE_ID: &str = "endNode";
/// Where a new graph places its end node.
pub const END_NODE_POSITION: (f64, f64) = (950.0, 45.0);
const NEW_NODE_OFFSET: f64 = 100.0;
const OUTPUT_ANCHOR: &str = "outputLinkHandle";
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const PERCENT_TEXT_THICKNESS: i32 = 2;

/// Decoded images for IMAGE nodes, keyed by node id.
pub type ImageInputs = HashMap<String, Arc<RgbImage>>;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Float(f32),
    Text(String),
    Image(Arc<RgbImage>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Text(_) => ValueType::String,
            Value::Image(_) => ValueType::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub position: (f64, f64),
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: String,
    pub output_node: String,
    pub input_node: String,
    pub slot: String,
    pub output_anchor: String,
    pub output_anchor_position: (f64, f64),
    pub input_anchor_position: (f64, f64),
}

/// Evaluation outcome of one node, as shown next to it in the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Ready(ValueType),
    MissingInput { slot: String },
    Invalid { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStatus {
    pub id: String,
    pub kind: NodeKind,
    pub state: NodeState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeGraph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    next_id: u64,
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeGraph {
    /// A graph holding only the end node.
    pub fn new() -> Self {
        let mut graph = Self::empty();
        graph.nodes.push(Node {
            id: END_NODE_ID.to_string(),
            kind: NodeKind::EndNode,
            position: END_NODE_POSITION,
            data: None,
        });
        graph
    }

    fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            next_id: 1,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or_else(|| RedactorError::UnknownNode { id: id.to_string() })
    }

    fn require(&self, id: &str) -> Result<&Node> {
        self.node(id)
            .ok_or_else(|| RedactorError::UnknownNode { id: id.to_string() })
    }

    pub fn end_node_id(&self) -> Option<&str> {
        self.nodes
            .iter()
            .find(|node| node.kind == NodeKind::EndNode)
            .map(|node| node.id.as_str())
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            let candidate = format!("{}-{}", prefix, self.next_id);
            self.next_id += 1;
            let taken = self.node(&candidate).is_some()
                || self.links.iter().any(|link| link.id == candidate);
            if !taken {
                return candidate;
            }
        }
    }

    /// Places a new node and returns its id.
    pub fn add_node(&mut self, kind: NodeKind) -> Result<String> {
        if kind == NodeKind::EndNode {
            if let Some(existing) = self.end_node_id() {
                return Err(RedactorError::DuplicateNode {
                    id: existing.to_string(),
                });
            }
        }

        let id = self.fresh_id(&kind.name().to_lowercase());
        tracing::debug!("Adding {} node '{}'", kind, id);
        self.nodes.push(Node {
            id: id.clone(),
            kind,
            position: (NEW_NODE_OFFSET, NEW_NODE_OFFSET),
            data: kind.default_data(),
        });
        Ok(id)
    }

    fn insert_node(&mut self, node: Node) -> Result<()> {
        if self.node(&node.id).is_some() {
            return Err(RedactorError::DuplicateNode { id: node.id });
        }
        if node.kind == NodeKind::EndNode && self.end_node_id().is_some() {
            return Err(RedactorError::DuplicateNode { id: node.id });
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Sets the value text of a value node or the path of an image node.
    pub fn set_data(&mut self, id: &str, data: impl Into<String>) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.kind.holds_data() {
            return Err(RedactorError::InvalidParameter {
                node: id.to_string(),
                reason: format!("{} nodes take their values from links", node.kind),
            });
        }
        node.data = Some(data.into());
        Ok(())
    }

    pub fn set_position(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        self.node_mut(id)?.position = (x, y);
        Ok(())
    }

    /// Removes a node together with every link touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node> {
        let index = self
            .nodes
            .iter()
            .position(|node| node.id == id)
            .ok_or_else(|| RedactorError::UnknownNode { id: id.to_string() })?;
        if self.nodes[index].kind == NodeKind::EndNode {
            return Err(RedactorError::ProtectedNode { id: id.to_string() });
        }

        self.links
            .retain(|link| link.input_node != id && link.output_node != id);
        Ok(self.nodes.remove(index))
    }

    /// Wires the output of `output_node` into `slot` of `input_node`.
    ///
    /// An existing link on the slot is replaced.
    pub fn connect(&mut self, output_node: &str, input_node: &str, slot: &str) -> Result<String> {
        let id = self.fresh_id("link");
        self.connect_link(Link {
            id: id.clone(),
            output_node: output_node.to_string(),
            input_node: input_node.to_string(),
            slot: slot.to_string(),
            output_anchor: OUTPUT_ANCHOR.to_string(),
            output_anchor_position: (0.0, 0.0),
            input_anchor_position: (0.0, 0.0),
        })?;
        Ok(id)
    }

    fn connect_link(&mut self, link: Link) -> Result<()> {
        let producer = self.require(&link.output_node)?;
        let consumer = self.require(&link.input_node)?;

        let slot = consumer
            .kind
            .input(&link.slot)
            .ok_or_else(|| RedactorError::UnknownSlot {
                node: consumer.id.clone(),
                slot: link.slot.clone(),
            })?;

        let produced = producer.kind.output();
        if produced != slot.value_type {
            return Err(RedactorError::TypeMismatch {
                node: consumer.id.clone(),
                slot: slot.name.to_string(),
                expected: slot.value_type.to_string(),
                found: produced.to_string(),
            });
        }

        if self.depends_on(&link.output_node, &link.input_node) {
            return Err(RedactorError::CycleDetected {
                node: link.input_node.clone(),
            });
        }

        if self.links.iter().any(|existing| existing.id == link.id) {
            return Err(RedactorError::DuplicateNode { id: link.id });
        }

        let replaced = self.disconnect(&link.input_node, &link.slot);
        if let Some(old) = replaced {
            tracing::debug!("Replacing link '{}' on {}.{}", old.id, old.input_node, old.slot);
        }
        self.links.push(link);
        Ok(())
    }

    /// Removes the link feeding `slot` of `input_node`, if any.
    pub fn disconnect(&mut self, input_node: &str, slot: &str) -> Option<Link> {
        let index = self
            .links
            .iter()
            .position(|link| link.input_node == input_node && link.slot == slot)?;
        Some(self.links.remove(index))
    }

    fn link_into(&self, input_node: &str, slot: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|link| link.input_node == input_node && link.slot == slot)
    }

    /// Whether `node` is `ancestor` or reads from it through any chain of links.
    fn depends_on(&self, node: &str, ancestor: &str) -> bool {
        let mut stack = vec![node.to_string()];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            stack.extend(
                self.links
                    .iter()
                    .filter(|link| link.input_node == current)
                    .map(|link| link.output_node.clone()),
            );
        }
        false
    }

    /// Every node `id` reads from, directly or through other nodes.
    pub fn upstream(&self, id: &str) -> Vec<&Node> {
        let mut stack = vec![id];
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        while let Some(current) = stack.pop() {
            for link in self.links.iter().filter(|link| link.input_node == current) {
                if seen.insert(link.output_node.as_str()) {
                    if let Some(node) = self.node(&link.output_node) {
                        found.push(node);
                    }
                    stack.push(link.output_node.as_str());
                }
            }
        }
        found
    }

    /// `(node id, path)` of every image node with a file selected.
    pub fn image_sources(&self) -> Vec<(String, String)> {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Image)
            .filter_map(|node| {
                node.data
                    .as_ref()
                    .filter(|path| !path.is_empty())
                    .map(|path| (node.id.clone(), path.clone()))
            })
            .collect()
    }

    pub fn evaluate(&self, id: &str, images: &ImageInputs) -> Result<Value> {
        let mut memo = HashMap::new();
        self.eval(id, images, &mut memo)
    }

    /// The image arriving at the end node.
    pub fn render(&self, images: &ImageInputs) -> Result<Arc<RgbImage>> {
        let end = self.end_node_id().ok_or_else(|| RedactorError::UnknownNode {
            id: END_NODE_ID.to_string(),
        })?;
        match self.evaluate(end, images)? {
            Value::Image(image) => Ok(image),
            other => Err(RedactorError::TypeMismatch {
                node: end.to_string(),
                slot: FIRST.to_string(),
                expected: ValueType::Image.to_string(),
                found: other.value_type().to_string(),
            }),
        }
    }

    /// Evaluates every node and reports which ones produce a value.
    pub fn status(&self, images: &ImageInputs) -> Vec<NodeStatus> {
        let mut memo = HashMap::new();
        self.nodes
            .iter()
            .map(|node| {
                let state = match self.eval(&node.id, images, &mut memo) {
                    Ok(value) => NodeState::Ready(value.value_type()),
                    Err(RedactorError::MissingInput { slot, .. }) => NodeState::MissingInput { slot },
                    Err(e) => NodeState::Invalid {
                        reason: e.to_string(),
                    },
                };
                NodeStatus {
                    id: node.id.clone(),
                    kind: node.kind,
                    state,
                }
            })
            .collect()
    }

    fn eval(
        &self,
        id: &str,
        images: &ImageInputs,
        memo: &mut HashMap<String, Value>,
    ) -> Result<Value> {
        if let Some(value) = memo.get(id) {
            return Ok(value.clone());
        }
        let node = self.require(id)?;
        let value = self.compute(node, images, memo)?;
        memo.insert(id.to_string(), value.clone());
        Ok(value)
    }

    fn input(
        &self,
        node: &Node,
        index: usize,
        images: &ImageInputs,
        memo: &mut HashMap<String, Value>,
    ) -> Result<Value> {
        let slot: &Slot = &node.kind.inputs()[index];
        let link = self
            .link_into(&node.id, slot.name)
            .ok_or_else(|| RedactorError::MissingInput {
                node: node.id.clone(),
                slot: slot.name.to_string(),
            })?;
        let value = self.eval(&link.output_node, images, memo)?;
        if value.value_type() != slot.value_type {
            return Err(RedactorError::TypeMismatch {
                node: node.id.clone(),
                slot: slot.name.to_string(),
                expected: slot.value_type.to_string(),
                found: value.value_type().to_string(),
            });
        }
        Ok(value)
    }

    fn slot_mismatch(&self, node: &Node, index: usize, found: &Value) -> RedactorError {
        let slot = &node.kind.inputs()[index];
        RedactorError::TypeMismatch {
            node: node.id.clone(),
            slot: slot.name.to_string(),
            expected: slot.value_type.to_string(),
            found: found.value_type().to_string(),
        }
    }

    fn image_input(
        &self,
        node: &Node,
        images: &ImageInputs,
        memo: &mut HashMap<String, Value>,
    ) -> Result<Arc<RgbImage>> {
        match self.input(node, 0, images, memo)? {
            Value::Image(image) => Ok(image),
            other => Err(self.slot_mismatch(node, 0, &other)),
        }
    }

    fn int_input(
        &self,
        node: &Node,
        index: usize,
        images: &ImageInputs,
        memo: &mut HashMap<String, Value>,
    ) -> Result<i32> {
        match self.input(node, index, images, memo)? {
            Value::Int(v) => Ok(v),
            other => Err(self.slot_mismatch(node, index, &other)),
        }
    }

    fn float_input(
        &self,
        node: &Node,
        index: usize,
        images: &ImageInputs,
        memo: &mut HashMap<String, Value>,
    ) -> Result<f32> {
        match self.input(node, index, images, memo)? {
            Value::Float(v) => Ok(v),
            other => Err(self.slot_mismatch(node, index, &other)),
        }
    }

    fn text_input(
        &self,
        node: &Node,
        index: usize,
        images: &ImageInputs,
        memo: &mut HashMap<String, Value>,
    ) -> Result<String> {
        match self.input(node, index, images, memo)? {
            Value::Text(v) => Ok(v),
            other => Err(self.slot_mismatch(node, index, &other)),
        }
    }

    fn compute(
        &self,
        node: &Node,
        images: &ImageInputs,
        memo: &mut HashMap<String, Value>,
    ) -> Result<Value> {
        let invalid = |reason: String| RedactorError::InvalidParameter {
            node: node.id.clone(),
            reason,
        };
        let text_data = node.data.as_deref().unwrap_or("");

        let image = match node.kind {
            NodeKind::Int => {
                return text_data
                    .parse::<i32>()
                    .map(Value::Int)
                    .map_err(|_| invalid(format!("'{}' is not an integer", text_data)));
            }
            NodeKind::Float => {
                return text_data
                    .parse::<f32>()
                    .map(Value::Float)
                    .map_err(|_| invalid(format!("'{}' is not a number", text_data)));
            }
            NodeKind::String => return Ok(Value::Text(text_data.to_string())),
            NodeKind::Image => {
                if text_data.is_empty() {
                    return Err(invalid("no image file selected".to_string()));
                }
                return images
                    .get(&node.id)
                    .cloned()
                    .map(Value::Image)
                    .ok_or_else(|| invalid(format!("image '{}' is not loaded", text_data)));
            }
            NodeKind::EndNode => return self.input(node, 0, images, memo),
            NodeKind::Sepia => filters::sepia(&*self.image_input(node, images, memo)?),
            NodeKind::Grey => filters::grey(&*self.image_input(node, images, memo)?),
            NodeKind::Invert => filters::invert(&*self.image_input(node, images, memo)?),
            NodeKind::Bright => {
                let source = self.image_input(node, images, memo)?;
                let beta = self.float_input(node, 1, images, memo)?;
                filters::brightness(&source, beta)
            }
            NodeKind::Gaussian => {
                let source = self.image_input(node, images, memo)?;
                let k = self.int_input(node, 1, images, memo)?;
                let ksize = filters::kernel_size(k).ok_or_else(|| {
                    invalid(format!(
                        "kernel size {} must be between 1 and {}",
                        k as i64 * 2 + 1,
                        filters::MAX_KERNEL_SIZE
                    ))
                })?;
                filters::gaussian_blur(&source, ksize, 0.0)
            }
            NodeKind::ScalePixel => {
                let source = self.image_input(node, images, memo)?;
                let x = self.int_input(node, 1, images, memo)?;
                let y = self.int_input(node, 2, images, memo)?;
                if x <= 0 || y <= 0 {
                    return Err(invalid(format!("size {}x{} must be positive", x, y)));
                }
                if !filters::fits_output(x as u64, y as u64) {
                    return Err(invalid(format!(
                        "size {}x{} exceeds {} pixels",
                        x,
                        y,
                        filters::MAX_OUTPUT_PIXELS
                    )));
                }
                filters::resize(&source, x as u32, y as u32)
            }
            NodeKind::Scale => {
                let source = self.image_input(node, images, memo)?;
                let px = self.float_input(node, 1, images, memo)?;
                let py = self.float_input(node, 2, images, memo)?;
                let width = source.width() as f64 * px as f64 / 100.0;
                let height = source.height() as f64 * py as f64 / 100.0;
                if !(width >= 1.0 && height >= 1.0) {
                    return Err(invalid(format!(
                        "scaled size {:.1}x{:.1} is smaller than one pixel",
                        width, height
                    )));
                }
                if width * height > filters::MAX_OUTPUT_PIXELS as f64 {
                    return Err(invalid(format!(
                        "scaled size {:.0}x{:.0} exceeds {} pixels",
                        width,
                        height,
                        filters::MAX_OUTPUT_PIXELS
                    )));
                }
                filters::resize(&source, width as u32, height as u32)
            }
            NodeKind::MovePixel => {
                let source = self.image_input(node, images, memo)?;
                let x = self.int_input(node, 1, images, memo)?;
                let y = self.int_input(node, 2, images, memo)?;
                geometry::translate(&source, x as f64, y as f64)
            }
            NodeKind::Move => {
                let source = self.image_input(node, images, memo)?;
                let px = self.float_input(node, 1, images, memo)?;
                let py = self.float_input(node, 2, images, memo)?;
                let dx = source.width() as f64 * px as f64 / 100.0;
                let dy = source.height() as f64 * py as f64 / 100.0;
                geometry::translate(&source, dx, dy)
            }
            NodeKind::Rotate => {
                let source = self.image_input(node, images, memo)?;
                let degrees = self.float_input(node, 1, images, memo)?;
                geometry::rotate(&source, degrees as f64)
            }
            NodeKind::AddTextPixel => {
                let source = self.image_input(node, images, memo)?;
                let x = self.int_input(node, 1, images, memo)?;
                let y = self.int_input(node, 2, images, memo)?;
                let caption = self.text_input(node, 3, images, memo)?;
                let scale = self.float_input(node, 4, images, memo)?;
                if !(scale > 0.0) {
                    return Err(invalid(format!("text scale {} must be positive", scale)));
                }
                let mut canvas = (*source).clone();
                text::draw_text(
                    &mut canvas,
                    &caption,
                    x as i64,
                    y as i64,
                    scale as f64,
                    scale as i32,
                    TEXT_COLOR,
                );
                canvas
            }
            NodeKind::AddText => {
                let source = self.image_input(node, images, memo)?;
                let px = self.float_input(node, 1, images, memo)?;
                let py = self.float_input(node, 2, images, memo)?;
                let caption = self.text_input(node, 3, images, memo)?;
                let scale = self.float_input(node, 4, images, memo)?;
                if !(scale > 0.0) {
                    return Err(invalid(format!("text scale {} must be positive", scale)));
                }
                let x = source.width() as f64 * px as f64 / 100.0;
                let y = source.height() as f64 * py as f64 / 100.0;
                let mut canvas = (*source).clone();
                text::draw_text(
                    &mut canvas,
                    &caption,
                    x as i64,
                    y as i64,
                    scale as f64,
                    PERCENT_TEXT_THICKNESS,
                    TEXT_COLOR,
                );
                canvas
            }
        };

        Ok(Value::Image(Arc::new(image)))
    }

    pub fn to_saved(&self) -> Saved {
        let nodes = self
            .nodes
            .iter()
            .map(|node| NodeData {
                id: node.id.clone(),
                node_type: Some(node.kind.name().to_string()),
                x: node.position.0,
                y: node.position.1,
                data: node.data.clone(),
            })
            .collect();
        let links = self
            .links
            .iter()
            .map(|link| LinkData {
                id: link.id.clone(),
                input_node: link.input_node.clone(),
                output_node: link.output_node.clone(),
                input_anchor: link.slot.clone(),
                output_anchor: link.output_anchor.clone(),
                input_anchor_size: link.input_anchor_position.into(),
                output_anchor_size: link.output_anchor_position.into(),
            })
            .collect();

        Saved {
            nodes: Some(nodes),
            links: Some(links),
        }
    }

    /// Rebuilds a graph, resolving node kinds through `registry`.
    pub fn from_saved(saved: Saved, registry: &NodeRegistry) -> Result<Self> {
        let nodes = saved.nodes.ok_or_else(|| RedactorError::ValidationError {
            message: "graph file has no 'nodes' section".to_string(),
        })?;
        let links = saved.links.ok_or_else(|| RedactorError::ValidationError {
            message: "graph file has no 'links' section".to_string(),
        })?;

        let mut graph = Self::empty();
        for data in nodes {
            let Some(kind) = data.node_type.as_deref().and_then(|name| registry.resolve(name))
            else {
                tracing::warn!(
                    "⚠️ Skipping node '{}' of unknown type {:?}",
                    data.id,
                    data.node_type
                );
                continue;
            };
            graph.insert_node(Node {
                id: data.id,
                kind,
                position: (data.x, data.y),
                data: data.data,
            })?;
        }

        if graph.end_node_id().is_none() {
            tracing::warn!("⚠️ Graph has no end node, adding one");
            graph.insert_node(Node {
                id: END_NODE_ID.to_string(),
                kind: NodeKind::EndNode,
                position: END_NODE_POSITION,
                data: None,
            })?;
        }

        for data in links {
            graph.connect_link(Link {
                id: data.id,
                output_node: data.output_node,
                input_node: data.input_node,
                slot: data.input_anchor,
                output_anchor: data.output_anchor,
                output_anchor_position: data.output_anchor_size.into(),
                input_anchor_position: data.input_anchor_size.into(),
            })?;
        }

        Ok(graph)
    }
}
