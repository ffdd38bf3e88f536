use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::consts::{DUPLICATE_OFFSET, PLACEMENT_EXTENT, TRAINING_DELAY_MS, TRAINING_NOTICE};
use crate::doc::{Edge, EdgeId, EdgeStyle, GraphStore, Node, NodeData, NodeId, RemovedNode};
use crate::export::ModelExport;
use crate::geom::Position;
use crate::input::{CanvasEvent, DropEffect, EdgeChange, NodeChange};
use crate::layer::{LayerKind, LayerStatus, attr};
use crate::palette::{BlockDefinition, DragPayload, Palette, find_block};
use crate::properties::{ModelSummary, PanelField, PropertiesPanel, coerce_input, visible_fields};
use crate::render::RenderTemplate;
use crate::selection::{Chrome, Selection};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine operations for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    NodeCreated { node: Node },
    NodeUpdated { id: NodeId },
    NodeDeleted { id: NodeId, cascaded_edges: Vec<EdgeId> },
    EdgeCreated { edge: Edge },
    EdgeDeleted { id: EdgeId },
    SelectionChanged { selection: Selection },
    /// Host must call [`EngineCore::complete_training`] after `delay_ms`.
    TrainingScheduled { delay_ms: u32 },
    TrainingCompleted,
    /// Success acknowledgment to surface to the user.
    Notice { message: String },
    AcceptDrop { effect: DropEffect },
    RenderNeeded,
}

/// Editor view settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    /// Style applied to edges created from now on.
    pub connection_style: EdgeStyle,
    /// Left palette sidebar expanded.
    pub sidebar_open: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { connection_style: EdgeStyle::Default, sidebar_open: true }
    }
}

/// Core engine state: every editing rule, independent of any browser API.
///
/// Separated from the browser binding so it can be tested natively.
pub struct EngineCore {
    pub store: GraphStore,
    pub selection: Selection,
    pub panel: PropertiesPanel,
    pub palette: Palette,
    pub view: ViewConfig,
    training: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_view(ViewConfig::default())
    }
}

impl EngineCore {
    /// Empty canvas, nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_view(view: ViewConfig) -> Self {
        let mut panel = PropertiesPanel::new();
        panel.set_open(true);
        Self {
            store: GraphStore::new(),
            selection: Selection::Idle,
            panel,
            palette: Palette::new(),
            view,
            training: false,
        }
    }

    /// Canvas preloaded with the three-layer starter graph, `n2` selected.
    #[must_use]
    pub fn starter(view: ViewConfig) -> Self {
        let mut core = Self::with_view(view);
        let (nodes, edges) = starter_graph();
        core.load_snapshot(nodes, edges);
        core.node_click("n2");
        core
    }

    // --- Data inputs ---

    /// Replace the whole graph. A selection pointing at a vanished item is cleared.
    pub fn load_snapshot(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.store.load_snapshot(nodes, edges);
        let stale = match &self.selection {
            Selection::Idle => false,
            Selection::NodeSelected(id) => !self.store.contains_node(id),
            Selection::EdgeSelected(id) => self.store.edge(id).is_none(),
        };
        if stale {
            self.select(Selection::Idle);
        }
    }

    /// Dispatch a rendering-surface gesture.
    pub fn handle(&mut self, event: CanvasEvent) -> Vec<Action> {
        match event {
            CanvasEvent::NodeClick { id } => self.node_click(&id),
            CanvasEvent::EdgeClick { id } => self.edge_click(&id),
            CanvasEvent::PaneClick => self.pane_click(),
            CanvasEvent::NodesChange { changes } => self.apply_node_changes(&changes),
            CanvasEvent::EdgesChange { changes } => self.apply_edge_changes(&changes),
            CanvasEvent::Connect(conn) => self.connect(&conn.source, &conn.target),
            CanvasEvent::Drop { payload, position } => self.drop_payload(&payload, position),
            CanvasEvent::DragOver => self.drag_over(),
        }
    }

    // --- Node creation ---

    /// Create a node and select it.
    pub fn add_node(&mut self, kind: LayerKind, config: Map<String, Value>, position: Position) -> Vec<Action> {
        let node = self.store.add_node(kind, config, position);
        self.selection = Selection::NodeSelected(node.id.clone());
        self.panel.show(node.clone());
        vec![
            Action::NodeCreated { node },
            Action::SelectionChanged { selection: self.selection.clone() },
            Action::RenderNeeded,
        ]
    }

    /// Palette click: catalog defaults plus display name, placed automatically.
    pub fn add_block(&mut self, block: &BlockDefinition) -> Vec<Action> {
        let position = click_position(self.store.next_id());
        self.add_node(block.kind.clone(), block.click_config(), position)
    }

    /// Palette click by type name. Types outside the catalog get no catalog config.
    pub fn add_kind(&mut self, kind: LayerKind) -> Vec<Action> {
        match find_block(&kind) {
            Some(block) => self.add_block(block),
            None => {
                let position = click_position(self.store.next_id());
                self.add_node(kind, Map::new(), position)
            }
        }
    }

    /// Canvas drop of a palette drag payload.
    pub fn drop_payload(&mut self, payload: &DragPayload, position: Position) -> Vec<Action> {
        let Some((kind, config)) = payload.decode() else {
            log::debug!("drop ignored: payload carries no layer type");
            return Vec::new();
        };
        self.add_node(kind, config, position)
    }

    /// A palette block hovers the canvas.
    #[must_use]
    pub fn drag_over(&self) -> Vec<Action> {
        vec![Action::AcceptDrop { effect: DropEffect::Move }]
    }

    /// Copy the selected node next to itself. No-op without a node selection.
    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        let Some(source) = self.selection.node().and_then(|id| self.store.node(id)) else {
            return Vec::new();
        };
        let mut config = source.data.attrs.clone();
        config.insert(attr::LABEL.to_owned(), Value::from(source.data.label.clone()));
        let kind = source.data.kind.clone();
        let position = source.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        self.add_node(kind, config, position)
    }

    // --- Selection ---

    pub fn node_click(&mut self, id: &str) -> Vec<Action> {
        let Some(node) = self.store.node(id).cloned() else {
            return Vec::new();
        };
        self.selection = Selection::NodeSelected(node.id.clone());
        self.panel.show(node);
        vec![Action::SelectionChanged { selection: self.selection.clone() }, Action::RenderNeeded]
    }

    pub fn edge_click(&mut self, id: &str) -> Vec<Action> {
        if self.store.edge(id).is_none() {
            return Vec::new();
        }
        self.select(Selection::EdgeSelected(id.to_owned()))
    }

    /// Click on empty canvas: clear both selections.
    pub fn pane_click(&mut self) -> Vec<Action> {
        self.select(Selection::Idle)
    }

    /// Dismiss the edge affordance without deleting.
    pub fn cancel_edge_selection(&mut self) -> Vec<Action> {
        if self.selection.edge().is_none() {
            return Vec::new();
        }
        self.select(Selection::Idle)
    }

    fn select(&mut self, selection: Selection) -> Vec<Action> {
        if selection.node().is_none() {
            self.panel.clear(false);
        }
        self.selection = selection;
        vec![Action::SelectionChanged { selection: self.selection.clone() }, Action::RenderNeeded]
    }

    // --- Surface reconciliation ---

    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) -> Vec<Action> {
        let removed = self.store.apply_node_changes(changes);
        let mut actions = Vec::new();
        for gone in removed {
            actions.extend(self.node_removed(gone));
        }
        if let Some(node) = self.selection.node().and_then(|id| self.store.node(id)) {
            self.panel.mirror_position(node);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) -> Vec<Action> {
        let removed = self.store.apply_edge_changes(changes);
        let mut actions = Vec::new();
        for edge in removed {
            actions.extend(self.edge_removed(edge));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Structural mutations ---

    /// Connect two nodes with the current connection style. Dangling ids are ignored.
    pub fn connect(&mut self, source: &str, target: &str) -> Vec<Action> {
        match self.store.connect(source, target, self.view.connection_style) {
            Some(edge) => vec![Action::EdgeCreated { edge }, Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Delete a node and its edges in one step.
    pub fn delete_node(&mut self, id: &str) -> Vec<Action> {
        let Some(gone) = self.store.delete_node(id) else {
            return Vec::new();
        };
        let mut actions = self.node_removed(gone);
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn delete_selected_node(&mut self) -> Vec<Action> {
        match self.selection.node().map(str::to_owned) {
            Some(id) => self.delete_node(&id),
            None => Vec::new(),
        }
    }

    pub fn delete_edge(&mut self, id: &str) -> Vec<Action> {
        let Some(edge) = self.store.delete_edge(id) else {
            return Vec::new();
        };
        let mut actions = self.edge_removed(edge);
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn delete_selected_edge(&mut self) -> Vec<Action> {
        match self.selection.edge().map(str::to_owned) {
            Some(id) => self.delete_edge(&id),
            None => Vec::new(),
        }
    }

    fn node_removed(&mut self, gone: RemovedNode) -> Vec<Action> {
        let mut actions = vec![Action::NodeDeleted {
            id: gone.node.id.clone(),
            cascaded_edges: gone.edges.iter().map(|e| e.id.clone()).collect(),
        }];
        let edge_was_selected = gone
            .edges
            .iter()
            .any(|e| self.selection.edge() == Some(e.id.as_str()));
        if self.selection.forget_node(&gone.node.id) {
            self.panel.clear(true);
            actions.push(Action::SelectionChanged { selection: Selection::Idle });
        } else if edge_was_selected {
            self.selection = Selection::Idle;
            actions.push(Action::SelectionChanged { selection: Selection::Idle });
        }
        actions
    }

    fn edge_removed(&mut self, edge: Edge) -> Vec<Action> {
        let mut actions = vec![Action::EdgeDeleted { id: edge.id.clone() }];
        if self.selection.forget_edge(&edge.id) {
            actions.push(Action::SelectionChanged { selection: Selection::Idle });
        }
        actions
    }

    // --- Property edits ---

    /// Write `value` under `field` on `node_id`, mirroring into the panel if
    /// that node is the one on display.
    pub fn update_field(&mut self, node_id: &str, field: &str, value: Value) -> Vec<Action> {
        if !self.store.update_field(node_id, field, value.clone()) {
            return Vec::new();
        }
        if self.panel.snapshot().is_some_and(|n| n.id == node_id) {
            self.panel.mirror(field, value);
        }
        vec![Action::NodeUpdated { id: node_id.to_owned() }, Action::RenderNeeded]
    }

    /// Apply raw form input to the selected node.
    ///
    /// Input is coerced per field first; input that coerces to nothing (a
    /// non-numeric dropout rate, an unknown activation) leaves the node as is.
    pub fn edit_selected(&mut self, field: &str, raw: &str) -> Vec<Action> {
        let Some(id) = self.selection.node().map(str::to_owned) else {
            return Vec::new();
        };
        let Some(value) = coerce_input(field, raw) else {
            log::debug!("edit ignored: {field}={raw:?} does not coerce");
            return Vec::new();
        };
        self.update_field(&id, field, value)
    }

    // --- View ---

    pub fn toggle_properties_panel(&mut self) -> Vec<Action> {
        self.set_properties_panel_open(!self.panel.is_open())
    }

    pub fn set_properties_panel_open(&mut self, open: bool) -> Vec<Action> {
        self.panel.set_open(open);
        vec![Action::RenderNeeded]
    }

    pub fn set_connection_style(&mut self, style: EdgeStyle) {
        self.view.connection_style = style;
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.view.sidebar_open = open;
    }

    // --- Training / export ---

    /// Start a simulated training run. No-op while one is already running.
    pub fn begin_training(&mut self) -> Vec<Action> {
        if self.training {
            log::debug!("training already in progress");
            return Vec::new();
        }
        self.training = true;
        vec![Action::TrainingScheduled { delay_ms: TRAINING_DELAY_MS }, Action::RenderNeeded]
    }

    /// Finish the run: every node (and the panel's copy) becomes `Trained`.
    pub fn complete_training(&mut self) -> Vec<Action> {
        if !self.training {
            return Vec::new();
        }
        self.training = false;
        self.store.set_all_status(LayerStatus::Trained);
        self.panel.mirror_status(LayerStatus::Trained);
        log::debug!("training completed for {} layers", self.store.len());
        vec![
            Action::TrainingCompleted,
            Action::Notice { message: TRAINING_NOTICE.to_owned() },
            Action::RenderNeeded,
        ]
    }

    /// Abandon a run whose completion could not be scheduled. Statuses are untouched.
    pub fn cancel_training(&mut self) {
        self.training = false;
    }

    #[must_use]
    pub fn is_training(&self) -> bool {
        self.training
    }

    #[must_use]
    pub fn export_model(&self) -> ModelExport {
        ModelExport::from_store(&self.store)
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The panel's copy of the selected node.
    #[must_use]
    pub fn selected_node(&self) -> Option<&Node> {
        self.panel.snapshot()
    }

    #[must_use]
    pub fn chrome(&self) -> Chrome {
        Chrome::derive(&self.selection, self.panel.is_open())
    }

    /// Form controls for the selected node; empty without a node selection.
    #[must_use]
    pub fn panel_fields(&self) -> Vec<PanelField> {
        self.selected_node()
            .map(|node| visible_fields(&node.data.kind))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn model_summary(&self) -> Option<ModelSummary> {
        let node = self.selected_node()?;
        Some(ModelSummary::for_node(node, self.store.incident_edge_count(&node.id)))
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.store.node(id)
    }
}

/// Deterministic scatter inside the placement square, keyed by id counter.
#[allow(clippy::cast_precision_loss)]
fn click_position(seed: u64) -> Position {
    let k = seed as f64;
    let x = (k * 0.618_033_988_749_895).fract() * PLACEMENT_EXTENT;
    let y = (k * 0.754_877_666_246_693).fract() * PLACEMENT_EXTENT;
    Position::new(x, y)
}

/// The three-layer graph a fresh editor opens with.
#[must_use]
pub fn starter_graph() -> (Vec<Node>, Vec<Edge>) {
    let preset = |id: &str, y: f64, label: &str, layer_name: &str, kind: LayerKind, attrs: Value| {
        let attrs = match attrs {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Node {
            id: id.to_owned(),
            position: Position::new(0.0, y),
            render_type: RenderTemplate::for_kind(&kind),
            data: NodeData { label: label.to_owned(), layer_name: layer_name.to_owned(), kind, attrs },
            measured: None,
            selected: false,
            dragging: false,
        }
    };
    let nodes = vec![
        preset(
            "n1",
            0.0,
            "Input Layer",
            "input_layer",
            LayerKind::Input,
            json!({"units": 784, "activation": "None", "totalParams": 0, "estimatedMemory": "0.1 MB", "status": "Ready"}),
        ),
        preset(
            "n2",
            150.0,
            "Dense Layer",
            "dense_1",
            LayerKind::Dense,
            json!({"units": 64, "activation": "relu", "totalParams": 50240, "estimatedMemory": "0.2 MB", "status": "Ready"}),
        ),
        preset(
            "n3",
            300.0,
            "Conv Layer",
            "conv_1",
            LayerKind::Conv2D,
            json!({
                "units": 32,
                "kernelSize": "3x3",
                "activation": "relu",
                "totalParams": 320,
                "estimatedMemory": "0.15 MB",
                "status": "Ready"
            }),
        ),
    ];
    let edge = |source: &str, target: &str| Edge {
        id: format!("{source}-{target}"),
        source: source.to_owned(),
        target: target.to_owned(),
        style: EdgeStyle::Default,
        selected: false,
    };
    let edges = vec![edge("n1", "n2"), edge("n2", "n3")];
    (nodes, edges)
}
