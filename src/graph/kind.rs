use serde::{Deserialize, Serialize};
use std::fmt;

pub const FIRST: &str = "firstLink";
pub const SECOND: &str = "secondLink";
pub const THIRD: &str = "thirdLink";
pub const FOURTH: &str = "fourthLink";
pub const FIFTH: &str = "fifthLink";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Int,
    Float,
    String,
    Image,
    None,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Int => "Int",
            ValueType::Float => "Float",
            ValueType::String => "String",
            ValueType::Image => "Image",
            ValueType::None => "None",
        };
        f.write_str(name)
    }
}

/// A typed input of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub label: &'static str,
    pub value_type: ValueType,
}

const fn slot(name: &'static str, label: &'static str, value_type: ValueType) -> Slot {
    Slot {
        name,
        label,
        value_type,
    }
}

const IMAGE_IN: Slot = slot(FIRST, "Image", ValueType::Image);

const NO_INPUTS: [Slot; 0] = [];
const IMAGE_ONLY: [Slot; 1] = [IMAGE_IN];
const IMAGE_FLOAT: [Slot; 2] = [IMAGE_IN, slot(SECOND, "Float", ValueType::Float)];
const IMAGE_INT: [Slot; 2] = [IMAGE_IN, slot(SECOND, "Int", ValueType::Int)];
const IMAGE_INT_XY: [Slot; 3] = [
    IMAGE_IN,
    slot(SECOND, "int x", ValueType::Int),
    slot(THIRD, "int y", ValueType::Int),
];
const IMAGE_FLOAT_XY: [Slot; 3] = [
    IMAGE_IN,
    slot(SECOND, "float x", ValueType::Float),
    slot(THIRD, "float y", ValueType::Float),
];
const TEXT_AT_PIXEL: [Slot; 5] = [
    IMAGE_IN,
    slot(SECOND, "int x", ValueType::Int),
    slot(THIRD, "int y", ValueType::Int),
    slot(FOURTH, "String", ValueType::String),
    slot(FIFTH, "Scale", ValueType::Float),
];
const TEXT_AT_PERCENT: [Slot; 5] = [
    IMAGE_IN,
    slot(SECOND, "float x", ValueType::Float),
    slot(THIRD, "float y", ValueType::Float),
    slot(FOURTH, "String", ValueType::String),
    slot(FIFTH, "Scale", ValueType::Float),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Int,
    Float,
    String,
    Image,
    Sepia,
    Grey,
    Invert,
    Bright,
    Gaussian,
    ScalePixel,
    Scale,
    MovePixel,
    Move,
    Rotate,
    AddTextPixel,
    AddText,
    EndNode,
}

impl NodeKind {
    pub const ALL: [NodeKind; 17] = [
        NodeKind::Int,
        NodeKind::Float,
        NodeKind::String,
        NodeKind::Image,
        NodeKind::Sepia,
        NodeKind::Grey,
        NodeKind::Invert,
        NodeKind::Bright,
        NodeKind::Gaussian,
        NodeKind::ScalePixel,
        NodeKind::Scale,
        NodeKind::MovePixel,
        NodeKind::Move,
        NodeKind::Rotate,
        NodeKind::AddTextPixel,
        NodeKind::AddText,
        NodeKind::EndNode,
    ];

    /// Name used in saved graphs.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Int => "INT",
            NodeKind::Float => "FLOAT",
            NodeKind::String => "STRING",
            NodeKind::Image => "IMAGE",
            NodeKind::Sepia => "SEPIA",
            NodeKind::Grey => "GREY",
            NodeKind::Invert => "INVERT",
            NodeKind::Bright => "BRIGHT",
            NodeKind::Gaussian => "GAUSSIAN",
            NodeKind::ScalePixel => "SCALE_PIXEL",
            NodeKind::Scale => "SCALE",
            NodeKind::MovePixel => "MOVE_PIXEL",
            NodeKind::Move => "MOVE",
            NodeKind::Rotate => "ROTATE",
            NodeKind::AddTextPixel => "ADD_TEXT_PIXEL",
            NodeKind::AddText => "ADD_TEXT",
            NodeKind::EndNode => "END_NODE",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NodeKind::Int => "Int",
            NodeKind::Float => "Float",
            NodeKind::String => "String",
            NodeKind::Image => "Image",
            NodeKind::Sepia => "Sepia",
            NodeKind::Grey => "Grey",
            NodeKind::Invert => "Invert",
            NodeKind::Bright => "Bright",
            NodeKind::Gaussian => "Gaussian",
            NodeKind::ScalePixel => "Scale Pixel",
            NodeKind::Scale => "Scale",
            NodeKind::MovePixel | NodeKind::Move => "Move",
            NodeKind::Rotate => "Rotate",
            NodeKind::AddTextPixel | NodeKind::AddText => "Add Text",
            NodeKind::EndNode => "Save Image",
        }
    }

    pub fn inputs(&self) -> &'static [Slot] {
        match self {
            NodeKind::Int | NodeKind::Float | NodeKind::String | NodeKind::Image => &NO_INPUTS,
            NodeKind::Sepia | NodeKind::Grey | NodeKind::Invert | NodeKind::EndNode => {
                &IMAGE_ONLY
            }
            NodeKind::Bright | NodeKind::Rotate => &IMAGE_FLOAT,
            NodeKind::Gaussian => &IMAGE_INT,
            NodeKind::ScalePixel | NodeKind::MovePixel => &IMAGE_INT_XY,
            NodeKind::Scale | NodeKind::Move => &IMAGE_FLOAT_XY,
            NodeKind::AddTextPixel => &TEXT_AT_PIXEL,
            NodeKind::AddText => &TEXT_AT_PERCENT,
        }
    }

    pub fn input(&self, name: &str) -> Option<&'static Slot> {
        self.inputs().iter().find(|slot| slot.name == name)
    }

    pub fn output(&self) -> ValueType {
        match self {
            NodeKind::Int => ValueType::Int,
            NodeKind::Float => ValueType::Float,
            NodeKind::String => ValueType::String,
            NodeKind::EndNode => ValueType::None,
            _ => ValueType::Image,
        }
    }

    /// Whether the node carries user-edited `data` (value text or image path).
    pub fn holds_data(&self) -> bool {
        matches!(
            self,
            NodeKind::Int | NodeKind::Float | NodeKind::String | NodeKind::Image
        )
    }

    /// Initial `data` of a freshly placed node.
    pub fn default_data(&self) -> Option<String> {
        match self {
            NodeKind::Int => Some("0".to_string()),
            NodeKind::Float => Some("0.0".to_string()),
            NodeKind::String => Some(String::new()),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
