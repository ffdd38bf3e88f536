//! Model export document.
//!
//! The export is a pure function of the current graph: a trimmed view of each
//! node and edge plus two totals. Delivery (browser download or a file on
//! disk) is the host's business.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::EXPORT_FILE_PREFIX;
use crate::doc::{GraphStore, NodeId};
use crate::layer::{LayerKind, attr};

/// Error returned by [`ModelExport::to_pretty_json`].
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to serialize model: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One exported layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub layer_name: String,
    /// Carried as stored; absent attributes serialize as `null`.
    pub units: Value,
    pub activation: Value,
    pub kernel_size: Value,
}

/// One exported connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedEdge {
    pub source: NodeId,
    pub target: NodeId,
}

/// The downloadable model description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelExport {
    pub nodes: Vec<ExportedNode>,
    pub edges: Vec<ExportedEdge>,
    /// Sum of every node's decorative `totalParams`.
    pub total_parameters: u64,
    pub total_layers: usize,
}

impl ModelExport {
    /// Snapshot the graph held by `store`.
    #[must_use]
    pub fn from_store(store: &GraphStore) -> Self {
        let nodes = store
            .nodes()
            .iter()
            .map(|node| {
                let field = |key: &str| node.data.attrs.get(key).cloned().unwrap_or(Value::Null);
                ExportedNode {
                    id: node.id.clone(),
                    kind: node.data.kind.clone(),
                    layer_name: node.data.layer_name.clone(),
                    units: field(attr::UNITS),
                    activation: field(attr::ACTIVATION),
                    kernel_size: field(attr::KERNEL_SIZE),
                }
            })
            .collect();
        let edges = store
            .edges()
            .iter()
            .map(|edge| ExportedEdge { source: edge.source.clone(), target: edge.target.clone() })
            .collect();
        let total_parameters = store.nodes().iter().map(|n| n.props().total_params()).sum();

        Self { nodes, edges, total_parameters, total_layers: store.len() }
    }

    /// Pretty-printed UTF-8 JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Serialize`] if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// File name for an export made on `iso_date` (`YYYY-MM-DD`).
///
/// A full ISO timestamp is accepted; everything from the `T` on is dropped.
#[must_use]
pub fn export_file_name(iso_date: &str) -> String {
    let date = iso_date.split('T').next().unwrap_or(iso_date);
    format!("{EXPORT_FILE_PREFIX}{date}.json")
}
