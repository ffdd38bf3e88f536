//! Document model: layer nodes, connection edges, and the in-memory graph store.
//!
//! This module defines the data that describes what is on the canvas
//! (`Node`, `Edge`), a typed accessor for the open-ended attribute bag carried
//! by every node (`LayerProps`), and the store that owns the authoritative node
//! and edge lists (`GraphStore`).
//!
//! Structural changes flow into this layer from the engine (palette clicks,
//! drops, connect gestures, panel edits) and incremental geometry/selection
//! changes flow in from the rendering surface. The store keeps edges
//! referentially sound: removing a node removes every incident edge in the
//! same call.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::NODE_ID_PREFIX;
use crate::geom::{Dimensions, Position};
use crate::input::{EdgeChange, NodeChange};
use crate::layer::{LayerKind, LayerStatus, attr, universal_defaults};
use crate::render::RenderTemplate;

/// Unique identifier for a node.
pub type NodeId = String;

/// Unique identifier for an edge.
pub type EdgeId = String;

/// Per-node payload: naming, layer type, and the free-form attribute bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Display label shown on the node body.
    pub label: String,
    /// Derived once at creation as `<lowercase type>_<ordinal>`.
    pub layer_name: String,
    /// Layer type.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Remaining per-type attributes (`units`, `activation`, `rate`, ...).
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// A layer block on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Top-left corner in flow coordinates.
    pub position: Position,
    /// Visual template the rendering surface draws this node with.
    #[serde(rename = "type")]
    pub render_type: RenderTemplate,
    /// Layer payload.
    pub data: NodeData,
    /// Size last measured by the rendering surface, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<Dimensions>,
    /// Rendering-surface selection highlight.
    #[serde(default)]
    pub selected: bool,
    /// Whether the node is mid-drag on the rendering surface.
    #[serde(default)]
    pub dragging: bool,
}

impl Node {
    /// Typed view over this node's attribute bag.
    #[must_use]
    pub fn props(&self) -> LayerProps<'_> {
        LayerProps::new(&self.data.attrs)
    }
}

/// Line style used to draw an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStyle {
    /// Bezier curve.
    #[default]
    Default,
    Straight,
    Step,
    SmoothStep,
}

impl EdgeStyle {
    /// Parse a style name as used in configuration.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "default" | "bezier" => Some(Self::Default),
            "straight" => Some(Self::Straight),
            "step" => Some(Self::Step),
            "smoothstep" => Some(Self::SmoothStep),
            _ => None,
        }
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier, conventionally `<source>-<target>`.
    pub id: EdgeId,
    /// Node the connection leaves from.
    pub source: NodeId,
    /// Node the connection enters.
    pub target: NodeId,
    /// Line style.
    #[serde(rename = "type", default)]
    pub style: EdgeStyle,
    /// Rendering-surface selection highlight.
    #[serde(default)]
    pub selected: bool,
}

impl Edge {
    /// Whether either endpoint is `node_id`.
    #[must_use]
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Typed access to common fields of a node's attribute bag.
pub struct LayerProps<'a> {
    attrs: &'a Map<String, Value>,
}

impl<'a> LayerProps<'a> {
    /// Wrap a reference to an attribute bag for typed access.
    #[must_use]
    pub fn new(attrs: &'a Map<String, Value>) -> Self {
        Self { attrs }
    }

    /// Neuron or filter count. `None` when absent or not a non-negative integer.
    #[must_use]
    pub fn units(&self) -> Option<u64> {
        self.attrs.get(attr::UNITS).and_then(Value::as_u64)
    }

    /// Activation value as stored. `None` when absent.
    #[must_use]
    pub fn activation(&self) -> Option<&'a str> {
        self.attrs.get(attr::ACTIVATION).and_then(Value::as_str)
    }

    /// Kernel size as stored. `None` when absent.
    #[must_use]
    pub fn kernel_size(&self) -> Option<&'a str> {
        self.attrs.get(attr::KERNEL_SIZE).and_then(Value::as_str)
    }

    /// Pool size. Defaults to `"2x2"` when absent.
    #[must_use]
    pub fn pool_size(&self) -> &'a str {
        self.attrs
            .get(attr::POOL_SIZE)
            .and_then(Value::as_str)
            .unwrap_or("2x2")
    }

    /// Dropout probability. Defaults to `0.5` when absent.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.attrs
            .get(attr::RATE)
            .and_then(Value::as_f64)
            .unwrap_or(0.5)
    }

    /// Decorative parameter count. Defaults to `0`.
    #[must_use]
    pub fn total_params(&self) -> u64 {
        self.attrs
            .get(attr::TOTAL_PARAMS)
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// Decorative memory label. Defaults to `"0 MB"`.
    #[must_use]
    pub fn estimated_memory(&self) -> &'a str {
        self.attrs
            .get(attr::ESTIMATED_MEMORY)
            .and_then(Value::as_str)
            .unwrap_or("0 MB")
    }

    /// Lifecycle status. Defaults to `Ready`.
    #[must_use]
    pub fn status(&self) -> LayerStatus {
        match self.attrs.get(attr::STATUS).and_then(Value::as_str) {
            Some("Trained") => LayerStatus::Trained,
            _ => LayerStatus::Ready,
        }
    }
}

/// A node together with the edges that were cascaded away with it.
#[derive(Debug, Clone)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

/// Ordered in-memory store of nodes and edges.
///
/// Insertion order is preserved; it is the draw order of the rendering
/// surface and the order of the exported document.
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_id: u64,
}

impl GraphStore {
    /// Create an empty store whose counter starts at 1.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new(), edges: Vec::new(), next_id: 1 }
    }

    /// Replace the whole graph.
    ///
    /// The id counter is moved past the number of loaded nodes so minted ids
    /// never collide with the preset. Edges whose endpoints are missing are
    /// dropped.
    pub fn load_snapshot(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        let before = edges.len();
        self.edges = edges
            .into_iter()
            .filter(|e| self.contains_node(&e.source) && self.contains_node(&e.target))
            .collect();
        if self.edges.len() < before {
            log::warn!("dropped {} dangling edges from snapshot", before - self.edges.len());
        }
        self.next_id = self.next_id.max(self.nodes.len() as u64 + 1);
    }

    // --- Queries ---

    /// All nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Number of edges with `id` as source or target.
    #[must_use]
    pub fn incident_edge_count(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.touches(id)).count()
    }

    /// Number of nodes whose type is `kind`.
    #[must_use]
    pub fn count_of_kind(&self, kind: &LayerKind) -> usize {
        self.nodes.iter().filter(|n| &n.data.kind == kind).count()
    }

    /// The value the next minted node id will carry.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // --- Structural mutations ---

    /// Create a node of `kind` at `position` and append it.
    ///
    /// Attributes are layered as universal fallbacks, then the kind's catalog
    /// defaults, then `config`; explicit config wins. `layerName`, `type` and
    /// `status` are always derived, never copied from `config`.
    pub fn add_node(&mut self, kind: LayerKind, config: Map<String, Value>, position: Position) -> Node {
        let id = self.mint_id();
        let ordinal = self.count_of_kind(&kind) + 1;
        let layer_name = format!("{}_{ordinal}", kind.name_stem());

        let mut attrs = universal_defaults(&kind);
        attrs.extend(kind.catalog_defaults());
        attrs.extend(config);

        let label = match attrs.remove(attr::LABEL) {
            Some(Value::String(label)) => label,
            _ => kind.as_str().to_owned(),
        };
        attrs.remove(attr::LAYER_NAME);
        attrs.remove(attr::TYPE);
        attrs.insert(attr::STATUS.to_owned(), Value::from(LayerStatus::Ready.as_str()));

        let node = Node {
            id,
            position,
            render_type: RenderTemplate::for_kind(&kind),
            data: NodeData { label, layer_name, kind, attrs },
            measured: None,
            selected: false,
            dragging: false,
        };
        log::debug!("node added: id={} layer={}", node.id, node.data.layer_name);
        self.nodes.push(node.clone());
        node
    }

    /// Connect `source` to `target` with `style`.
    ///
    /// Returns `None` without touching the graph when either endpoint is
    /// missing. Self-loops, cycles and parallel edges are accepted; a parallel
    /// edge gets a numeric suffix so ids stay unique.
    pub fn connect(&mut self, source: &str, target: &str, style: EdgeStyle) -> Option<Edge> {
        if !self.contains_node(source) || !self.contains_node(target) {
            log::debug!("connect ignored: {source} -> {target} has a missing endpoint");
            return None;
        }
        let base = format!("{source}-{target}");
        let mut id = base.clone();
        let mut n = 2;
        while self.edge(&id).is_some() {
            id = format!("{base}-{n}");
            n += 1;
        }
        let edge = Edge { id, source: source.to_owned(), target: target.to_owned(), style, selected: false };
        log::debug!("edge added: id={}", edge.id);
        self.edges.push(edge.clone());
        Some(edge)
    }

    /// Remove a node and every edge touching it.
    pub fn delete_node(&mut self, id: &str) -> Option<RemovedNode> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(index);
        let (edges, kept): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.touches(id));
        self.edges = kept;
        log::debug!("node deleted: id={id} cascaded_edges={}", edges.len());
        Some(RemovedNode { node, edges })
    }

    /// Remove an edge.
    pub fn delete_edge(&mut self, id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.id == id)?;
        log::debug!("edge deleted: id={id}");
        Some(self.edges.remove(index))
    }

    // --- Attribute mutations ---

    /// Write `value` under `field` on a node. Returns false if the node doesn't exist.
    ///
    /// `label`, `layerName` and `type` land on the typed fields (a type change
    /// also re-derives the render template); everything else goes into the
    /// attribute bag verbatim.
    pub fn update_field(&mut self, id: &str, field: &str, value: Value) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        write_field(node, field, value);
        true
    }

    /// Overwrite every node's status.
    pub fn set_all_status(&mut self, status: LayerStatus) {
        for node in &mut self.nodes {
            node.data
                .attrs
                .insert(attr::STATUS.to_owned(), Value::from(status.as_str()));
        }
    }

    /// Reconcile incremental node changes reported by the rendering surface.
    ///
    /// Geometry and selection flags are applied verbatim. Removals go through
    /// [`GraphStore::delete_node`] so incident edges go with them. Returns the
    /// removed nodes.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) -> Vec<RemovedNode> {
        let mut removed = Vec::new();
        for change in changes {
            match change {
                NodeChange::Position { id, position, dragging } => {
                    if let Some(node) = self.nodes.iter_mut().find(|n| &n.id == id) {
                        if let Some(position) = position {
                            node.position = *position;
                        }
                        if let Some(dragging) = dragging {
                            node.dragging = *dragging;
                        }
                    }
                }
                NodeChange::Dimensions { id, dimensions: Some(dimensions), .. } => {
                    if let Some(node) = self.nodes.iter_mut().find(|n| &n.id == id) {
                        node.measured = Some(*dimensions);
                    }
                }
                NodeChange::Dimensions { dimensions: None, .. } => {}
                NodeChange::Select { id, selected } => {
                    if let Some(node) = self.nodes.iter_mut().find(|n| &n.id == id) {
                        node.selected = *selected;
                    }
                }
                NodeChange::Remove { id } => {
                    if let Some(gone) = self.delete_node(id) {
                        removed.push(gone);
                    }
                }
            }
        }
        removed
    }

    /// Reconcile incremental edge changes reported by the rendering surface.
    /// Returns the removed edges.
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) -> Vec<Edge> {
        let mut removed = Vec::new();
        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if let Some(edge) = self.edges.iter_mut().find(|e| &e.id == id) {
                        edge.selected = *selected;
                    }
                }
                EdgeChange::Remove { id } => {
                    if let Some(edge) = self.delete_edge(id) {
                        removed.push(edge);
                    }
                }
            }
        }
        removed
    }

    fn mint_id(&mut self) -> NodeId {
        loop {
            let id = format!("{NODE_ID_PREFIX}{}", self.next_id);
            self.next_id += 1;
            if !self.contains_node(&id) {
                return id;
            }
        }
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a single field write to `node`. Shared by the store and the
/// properties panel's mirrored snapshot so both see identical semantics.
pub(crate) fn write_field(node: &mut Node, field: &str, value: Value) {
    match field {
        attr::LABEL => node.data.label = value_to_text(value),
        attr::LAYER_NAME => node.data.layer_name = value_to_text(value),
        attr::TYPE => {
            let kind = LayerKind::from(value_to_text(value));
            node.render_type = RenderTemplate::for_kind(&kind);
            node.data.kind = kind;
        }
        _ => {
            node.data.attrs.insert(field.to_owned(), value);
        }
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
