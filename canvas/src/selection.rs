//! Selection state machine.
//!
//! At most one node or one edge is selected at any time. The variants make
//! the mutual exclusion structural: there is no representation of "a node and
//! an edge" to guard against.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use serde::{Deserialize, Serialize};

use crate::doc::{EdgeId, NodeId};

/// What the user has selected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum Selection {
    /// Nothing selected.
    #[default]
    Idle,
    NodeSelected(NodeId),
    EdgeSelected(EdgeId),
}

impl Selection {
    /// The selected node id, if a node is selected.
    #[must_use]
    pub fn node(&self) -> Option<&str> {
        match self {
            Self::NodeSelected(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// The selected edge id, if an edge is selected.
    #[must_use]
    pub fn edge(&self) -> Option<&str> {
        match self {
            Self::EdgeSelected(id) => Some(id.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Drop the selection if it points at `node_id`. Returns true if it did.
    pub fn forget_node(&mut self, node_id: &str) -> bool {
        if self.node() == Some(node_id) {
            *self = Self::Idle;
            return true;
        }
        false
    }

    /// Drop the selection if it points at `edge_id`. Returns true if it did.
    pub fn forget_edge(&mut self, edge_id: &str) -> bool {
        if self.edge() == Some(edge_id) {
            *self = Self::Idle;
            return true;
        }
        false
    }
}

/// Which auxiliary UI is visible, derived from selection and panel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chrome {
    /// Right-hand properties panel.
    pub properties_panel: bool,
    /// Floating "delete connection" affordance.
    pub edge_actions: bool,
}

impl Chrome {
    /// Derive chrome from the selection and whether the panel is toggled open.
    #[must_use]
    pub fn derive(selection: &Selection, panel_open: bool) -> Self {
        Self {
            properties_panel: panel_open && selection.node().is_some(),
            edge_actions: selection.edge().is_some(),
        }
    }
}
