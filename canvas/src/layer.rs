//! Layer vocabulary: kinds, activation and kernel enumerations, status, and
//! the per-kind catalog defaults.
//!
//! `LayerKind` is the tagged variant every other module dispatches on. It
//! round-trips through its display string (`"Conv2D"`, `"Image Input"`, ...)
//! so that the wire format stays the plain type name the palette emits, and
//! any unrecognized name survives as `Custom`.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Attribute keys understood inside a node's attribute bag.
pub mod attr {
    pub const LABEL: &str = "label";
    pub const LAYER_NAME: &str = "layerName";
    pub const TYPE: &str = "type";
    pub const UNITS: &str = "units";
    pub const ACTIVATION: &str = "activation";
    pub const KERNEL_SIZE: &str = "kernelSize";
    pub const POOL_SIZE: &str = "poolSize";
    pub const RATE: &str = "rate";
    pub const TOTAL_PARAMS: &str = "totalParams";
    pub const ESTIMATED_MEMORY: &str = "estimatedMemory";
    pub const STATUS: &str = "status";
}

/// The type of a layer block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerKind {
    Input,
    Embedding,
    ImageInput,
    Dense,
    Conv2D,
    Lstm,
    Gru,
    MaxPooling2D,
    AveragePooling2D,
    BatchNormalization,
    LayerNormalization,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
    Dropout,
    Regularization,
    Output,
    Classification,
    Regression,
    Concatenate,
    Add,
    Flatten,
    Reshape,
    /// Any type name outside the built-in vocabulary.
    Custom(String),
}

impl LayerKind {
    /// Every built-in kind, in palette order.
    pub const BUILTIN: [LayerKind; 24] = [
        Self::Input,
        Self::Embedding,
        Self::ImageInput,
        Self::Dense,
        Self::Conv2D,
        Self::Lstm,
        Self::Gru,
        Self::MaxPooling2D,
        Self::AveragePooling2D,
        Self::BatchNormalization,
        Self::LayerNormalization,
        Self::Relu,
        Self::Sigmoid,
        Self::Tanh,
        Self::Softmax,
        Self::Dropout,
        Self::Regularization,
        Self::Output,
        Self::Classification,
        Self::Regression,
        Self::Concatenate,
        Self::Add,
        Self::Flatten,
        Self::Reshape,
    ];

    /// The type name as carried on the wire and shown in the panel badge.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Input => "Input",
            Self::Embedding => "Embedding",
            Self::ImageInput => "Image Input",
            Self::Dense => "Dense",
            Self::Conv2D => "Conv2D",
            Self::Lstm => "LSTM",
            Self::Gru => "GRU",
            Self::MaxPooling2D => "MaxPooling2D",
            Self::AveragePooling2D => "AveragePooling2D",
            Self::BatchNormalization => "BatchNormalization",
            Self::LayerNormalization => "LayerNormalization",
            Self::Relu => "ReLU",
            Self::Sigmoid => "Sigmoid",
            Self::Tanh => "Tanh",
            Self::Softmax => "Softmax",
            Self::Dropout => "Dropout",
            Self::Regularization => "Regularization",
            Self::Output => "Output",
            Self::Classification => "Classification",
            Self::Regression => "Regression",
            Self::Concatenate => "Concatenate",
            Self::Add => "Add",
            Self::Flatten => "Flatten",
            Self::Reshape => "Reshape",
            Self::Custom(name) => name,
        }
    }

    /// Resolve a type name. Matching is exact; anything else becomes `Custom`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        Self::BUILTIN
            .iter()
            .find(|kind| kind.as_str() == name)
            .cloned()
            .unwrap_or_else(|| Self::Custom(name.to_owned()))
    }

    /// Stem used when deriving a `layerName`, e.g. `"conv2d"`.
    #[must_use]
    pub fn name_stem(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// Default configuration the palette attaches to this kind.
    ///
    /// Kinds without an entry return an empty map.
    #[must_use]
    pub fn catalog_defaults(&self) -> Map<String, Value> {
        use attr::{ACTIVATION, ESTIMATED_MEMORY, KERNEL_SIZE, POOL_SIZE, RATE, TOTAL_PARAMS, UNITS};

        match self {
            Self::Input => bag(&[
                (UNITS, json!(784)),
                (ACTIVATION, json!("None")),
                (TOTAL_PARAMS, json!(0)),
                (ESTIMATED_MEMORY, json!("0.1 MB")),
            ]),
            Self::Dense => bag(&[
                (UNITS, json!(64)),
                (ACTIVATION, json!("relu")),
                (TOTAL_PARAMS, json!(50240)),
                (ESTIMATED_MEMORY, json!("0.2 MB")),
            ]),
            Self::Conv2D => bag(&[
                (UNITS, json!(32)),
                (KERNEL_SIZE, json!("3x3")),
                (ACTIVATION, json!("relu")),
                (TOTAL_PARAMS, json!(320)),
                (ESTIMATED_MEMORY, json!("0.15 MB")),
            ]),
            Self::Lstm => bag(&[
                (UNITS, json!(64)),
                (ACTIVATION, json!("tanh")),
                (TOTAL_PARAMS, json!(66560)),
                (ESTIMATED_MEMORY, json!("0.3 MB")),
            ]),
            Self::Gru => bag(&[
                (UNITS, json!(64)),
                (ACTIVATION, json!("tanh")),
                (TOTAL_PARAMS, json!(24960)),
                (ESTIMATED_MEMORY, json!("0.2 MB")),
            ]),
            Self::Relu => bag(&[
                (ACTIVATION, json!("relu")),
                (TOTAL_PARAMS, json!(0)),
                (ESTIMATED_MEMORY, json!("0.05 MB")),
            ]),
            Self::Sigmoid => bag(&[
                (ACTIVATION, json!("sigmoid")),
                (TOTAL_PARAMS, json!(0)),
                (ESTIMATED_MEMORY, json!("0.05 MB")),
            ]),
            Self::Dropout => bag(&[(RATE, json!(0.5)), (TOTAL_PARAMS, json!(0)), (ESTIMATED_MEMORY, json!("0.05 MB"))]),
            Self::MaxPooling2D => bag(&[
                (POOL_SIZE, json!("2x2")),
                (TOTAL_PARAMS, json!(0)),
                (ESTIMATED_MEMORY, json!("0.05 MB")),
            ]),
            Self::Flatten | Self::Add | Self::Concatenate => {
                bag(&[(TOTAL_PARAMS, json!(0)), (ESTIMATED_MEMORY, json!("0.05 MB"))])
            }
            Self::Output => bag(&[
                (UNITS, json!(10)),
                (ACTIVATION, json!("softmax")),
                (TOTAL_PARAMS, json!(650)),
                (ESTIMATED_MEMORY, json!("0.1 MB")),
            ]),
            _ => Map::new(),
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LayerKind {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<&str> for LayerKind {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<LayerKind> for String {
    fn from(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Custom(name) => name,
            other => other.as_str().to_owned(),
        }
    }
}

/// Fallback attributes every new node starts from, before catalog defaults
/// and explicit configuration are layered on top.
#[must_use]
pub fn universal_defaults(kind: &LayerKind) -> Map<String, Value> {
    bag(&[
        (attr::LABEL, json!(kind.as_str())),
        (attr::UNITS, json!(32)),
        (attr::ACTIVATION, json!("relu")),
        (attr::KERNEL_SIZE, json!("3x3")),
        (attr::RATE, json!(0.5)),
        (attr::POOL_SIZE, json!("2x2")),
        (attr::TOTAL_PARAMS, json!(0)),
        (attr::ESTIMATED_MEMORY, json!("0.1 MB")),
    ])
}

fn bag(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), value.clone()))
        .collect()
}

/// Activation function applied by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    #[serde(rename = "None")]
    None,
    #[serde(rename = "relu")]
    Relu,
    #[serde(rename = "sigmoid")]
    Sigmoid,
    #[serde(rename = "tanh")]
    Tanh,
    #[serde(rename = "softmax")]
    Softmax,
    #[serde(rename = "leaky_relu", alias = "leaky-relu")]
    LeakyRelu,
}

impl Activation {
    pub const ALL: [Activation; 6] =
        [Self::None, Self::Relu, Self::Sigmoid, Self::Tanh, Self::Softmax, Self::LeakyRelu];

    /// Stored value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Softmax => "softmax",
            Self::LeakyRelu => "leaky_relu",
        }
    }

    /// Human-readable option label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Relu => "ReLU",
            Self::Sigmoid => "Sigmoid",
            Self::Tanh => "Tanh",
            Self::Softmax => "Softmax",
            Self::LeakyRelu => "Leaky ReLU",
        }
    }

    /// Parse a stored value, also accepting the hyphenated leaky-relu spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "leaky-relu" => Some(Self::LeakyRelu),
            _ => Self::ALL.into_iter().find(|a| a.as_str() == raw),
        }
    }
}

/// Convolution kernel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KernelSize {
    #[serde(rename = "1x1")]
    K1,
    #[default]
    #[serde(rename = "3x3")]
    K3,
    #[serde(rename = "5x5")]
    K5,
    #[serde(rename = "7x7")]
    K7,
}

impl KernelSize {
    pub const ALL: [KernelSize; 4] = [Self::K1, Self::K3, Self::K5, Self::K7];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::K1 => "1x1",
            Self::K3 => "3x3",
            Self::K5 => "5x5",
            Self::K7 => "7x7",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }
}

/// Lifecycle badge shown in the model summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayerStatus {
    #[default]
    Ready,
    Trained,
}

impl LayerStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Trained => "Trained",
        }
    }
}
