//! Properties panel: which form fields a layer type shows, how raw field
//! input is coerced, and the panel's mirrored copy of the selected node.
//!
//! Field visibility is a static function of the layer type. The panel holds
//! its own snapshot of the selected node and applies every edit to it in the
//! same step the store is updated, so the form reflects the edit immediately.

#[cfg(test)]
#[path = "properties_test.rs"]
mod properties_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::doc::{Node, write_field};
use crate::layer::{Activation, KernelSize, LayerKind, LayerStatus, attr};

/// A form control in the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelField {
    LayerName,
    Type,
    Units,
    KernelSize,
    PoolSize,
    Rate,
    Activation,
}

impl PanelField {
    /// Attribute key this control writes.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::LayerName => attr::LAYER_NAME,
            Self::Type => attr::TYPE,
            Self::Units => attr::UNITS,
            Self::KernelSize => attr::KERNEL_SIZE,
            Self::PoolSize => attr::POOL_SIZE,
            Self::Rate => attr::RATE,
            Self::Activation => attr::ACTIVATION,
        }
    }

    /// Form label for this control on a node of `kind`.
    #[must_use]
    pub fn label(self, kind: &LayerKind) -> &'static str {
        match self {
            Self::LayerName => "Layer Name",
            Self::Type => "Layer Type",
            Self::Units => units_label(kind),
            Self::KernelSize => "Kernel Size",
            Self::PoolSize => "Pool Size",
            Self::Rate => "Dropout Rate",
            Self::Activation => "Activation",
        }
    }

    /// Value the control shows for `node`. Unset or zero units show empty.
    #[must_use]
    pub fn value(self, node: &Node) -> Value {
        let props = node.props();
        match self {
            Self::LayerName => Value::from(node.data.layer_name.as_str()),
            Self::Type => Value::from(node.data.kind.as_str()),
            Self::Units => props.units().filter(|&n| n > 0).map_or_else(|| Value::from(""), Value::from),
            Self::KernelSize => Value::from(props.kernel_size().unwrap_or(KernelSize::K3.as_str())),
            Self::PoolSize => Value::from(props.pool_size()),
            Self::Rate => Value::from(props.rate()),
            Self::Activation => Value::from(props.activation().unwrap_or(Activation::None.as_str())),
        }
    }

    /// Input step for numeric controls.
    #[must_use]
    pub fn step(self) -> Option<f64> {
        match self {
            Self::Rate => Some(RATE_STEP),
            _ => None,
        }
    }
}

/// Controls shown for `kind`, in form order.
#[must_use]
pub fn visible_fields(kind: &LayerKind) -> Vec<PanelField> {
    let mut fields = vec![PanelField::LayerName, PanelField::Type];
    match kind {
        LayerKind::Input => fields.push(PanelField::Units),
        LayerKind::Dense | LayerKind::Lstm | LayerKind::Gru | LayerKind::Output => {
            fields.extend([PanelField::Units, PanelField::Activation]);
        }
        LayerKind::Conv2D => fields.extend([PanelField::Units, PanelField::KernelSize, PanelField::Activation]),
        LayerKind::MaxPooling2D | LayerKind::AveragePooling2D => fields.push(PanelField::PoolSize),
        LayerKind::Dropout => fields.push(PanelField::Rate),
        _ => {}
    }
    fields
}

/// Label of the units control; convolutions count filters.
#[must_use]
pub fn units_label(kind: &LayerKind) -> &'static str {
    match kind {
        LayerKind::Conv2D => "Filters",
        _ => "Units/Neurons",
    }
}

/// Entries of the type selector, with their option labels.
pub static LAYER_TYPE_OPTIONS: [(LayerKind, &str); 18] = [
    (LayerKind::Input, "Input"),
    (LayerKind::Dense, "Dense"),
    (LayerKind::Conv2D, "Conv2D"),
    (LayerKind::Lstm, "LSTM"),
    (LayerKind::Gru, "GRU"),
    (LayerKind::Relu, "ReLU"),
    (LayerKind::Sigmoid, "Sigmoid"),
    (LayerKind::Tanh, "Tanh"),
    (LayerKind::Softmax, "Softmax"),
    (LayerKind::Dropout, "Dropout"),
    (LayerKind::MaxPooling2D, "Max Pooling 2D"),
    (LayerKind::AveragePooling2D, "Average Pooling 2D"),
    (LayerKind::BatchNormalization, "Batch Normalization"),
    (LayerKind::LayerNormalization, "Layer Normalization"),
    (LayerKind::Flatten, "Flatten"),
    (LayerKind::Add, "Add"),
    (LayerKind::Concatenate, "Concatenate"),
    (LayerKind::Output, "Output"),
];

/// Dropout slider step.
pub const RATE_STEP: f64 = 0.1;

/// Turn raw form input for `field` into the value to store.
///
/// Integer fields keep the leading integer of the text and coerce digitless
/// or negative text to `0`. The dropout rate
/// is clamped into `[0, 1]`; non-numeric rate input yields `None` and the edit
/// is dropped. Select fields only accept their enumerated values. Free-text
/// fields pass through verbatim.
#[must_use]
pub fn coerce_input(field: &str, raw: &str) -> Option<Value> {
    match field {
        attr::UNITS | attr::TOTAL_PARAMS => Some(Value::from(parse_count(raw))),
        attr::RATE => parse_rate(raw).map(Value::from),
        attr::ACTIVATION => Activation::parse(raw).map(|a| Value::from(a.as_str())),
        attr::KERNEL_SIZE => KernelSize::parse(raw).map(|k| Value::from(k.as_str())),
        _ => Some(Value::from(raw)),
    }
}

/// Leading integer of `raw`: an optional sign then ASCII digits, the rest
/// ignored (`"12.5"` is 12, `"64px"` is 64). Negative or digitless text is 0.
fn parse_count(raw: &str) -> u64 {
    let text = raw.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if negative {
        return 0;
    }
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<u64>().unwrap_or(0)
}

fn parse_rate(raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(rate) if rate.is_finite() => Some(rate.clamp(0.0, 1.0)),
        _ => None,
    }
}

/// Panel open flag plus the mirrored copy of the selected node.
#[derive(Debug, Clone, Default)]
pub struct PropertiesPanel {
    open: bool,
    snapshot: Option<Node>,
}

impl PropertiesPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// The mirrored node, if one is held.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Node> {
        self.snapshot.as_ref()
    }

    /// Hold `node` and open the panel.
    pub fn show(&mut self, node: Node) {
        self.snapshot = Some(node);
        self.open = true;
    }

    /// Drop the held node. `collapse` also closes the panel.
    pub fn clear(&mut self, collapse: bool) {
        self.snapshot = None;
        if collapse {
            self.open = false;
        }
    }

    /// Mirror a field write into the held node.
    pub fn mirror(&mut self, field: &str, value: Value) {
        if let Some(node) = self.snapshot.as_mut() {
            write_field(node, field, value);
        }
    }

    /// Mirror a bulk status rewrite into the held node.
    pub fn mirror_status(&mut self, status: LayerStatus) {
        self.mirror(attr::STATUS, Value::from(status.as_str()));
    }

    /// Refresh geometry from the store without touching edited fields.
    pub fn mirror_position(&mut self, node: &Node) {
        if let Some(held) = self.snapshot.as_mut().filter(|held| held.id == node.id) {
            held.position = node.position;
        }
    }
}

/// Read-only figures shown under "Model Summary" for the selected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub total_params: u64,
    /// Edges touching the selected node.
    pub connections: usize,
    pub estimated_memory: String,
    pub status: LayerStatus,
}

impl ModelSummary {
    /// Build a summary for `node` given its incident edge count.
    #[must_use]
    pub fn for_node(node: &Node, connections: usize) -> Self {
        let props = node.props();
        Self {
            total_params: props.total_params(),
            connections,
            estimated_memory: props.estimated_memory().to_owned(),
            status: props.status(),
        }
    }
}
