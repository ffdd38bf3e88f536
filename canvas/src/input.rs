//! Input model: the gesture callbacks reported by the rendering surface.
//!
//! The diagramming surface owns hit-testing, pan/zoom and drag tracking. It
//! reports what happened as discrete events: clicks on nodes, edges or the
//! empty pane, batches of incremental node/edge changes, completed connect
//! gestures, and drag-and-drop. Each `CanvasEvent` maps one-to-one onto an
//! engine operation.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::{EdgeId, NodeId};
use crate::geom::{Dimensions, Position};
use crate::palette::DragPayload;

/// Incremental change to a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    /// The node moved, or its drag state toggled.
    Position {
        id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dragging: Option<bool>,
    },
    /// The node was measured or resized. A resize end carries only the
    /// `resizing` flag.
    Dimensions {
        id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimensions: Option<Dimensions>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resizing: Option<bool>,
    },
    /// The surface's own selection highlight changed.
    Select { id: NodeId, selected: bool },
    /// The surface removed the node (e.g. Backspace on a focused node).
    Remove { id: NodeId },
}

/// Incremental change to a single edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    Select { id: EdgeId, selected: bool },
    Remove { id: EdgeId },
}

/// A completed connect gesture between two node anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
}

/// Browser drop effect requested while a palette block hovers the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropEffect {
    Move,
}

/// A gesture reported by the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CanvasEvent {
    NodeClick { id: NodeId },
    EdgeClick { id: EdgeId },
    PaneClick,
    NodesChange { changes: Vec<NodeChange> },
    EdgesChange { changes: Vec<EdgeChange> },
    Connect(Connection),
    /// A palette block was released over the canvas at `position`.
    Drop { payload: DragPayload, position: Position },
    DragOver,
}
