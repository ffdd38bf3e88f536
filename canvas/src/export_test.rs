use serde_json::{Map, json};

use super::*;
use crate::doc::EdgeStyle;
use crate::geom::Position;

fn three_layer_store() -> GraphStore {
    let mut store = GraphStore::new();
    for kind in [LayerKind::Input, LayerKind::Dense, LayerKind::Conv2D] {
        store.add_node(kind, Map::new(), Position::default());
    }
    store.connect("node-1", "node-2", EdgeStyle::Default);
    store.connect("node-2", "node-3", EdgeStyle::Default);
    store
}

#[test]
fn totals_sum_decorative_params() {
    let export = ModelExport::from_store(&three_layer_store());
    assert_eq!(export.total_parameters, 50560);
    assert_eq!(export.total_layers, 3);
    assert_eq!(export.edges.len(), 2);
}

#[test]
fn empty_graph_exports_zero_totals() {
    let export = ModelExport::from_store(&GraphStore::new());
    assert!(export.nodes.is_empty());
    assert_eq!(export.total_parameters, 0);
    assert_eq!(export.total_layers, 0);
}

#[test]
fn exported_node_keeps_only_listed_fields() {
    let export = ModelExport::from_store(&three_layer_store());
    let value = serde_json::to_value(&export.nodes[2]).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "node-3",
            "type": "Conv2D",
            "layerName": "conv2d_1",
            "units": 32,
            "activation": "relu",
            "kernelSize": "3x3"
        })
    );
}

#[test]
fn missing_attributes_export_as_null() {
    let mut store = GraphStore::new();
    store.add_node(LayerKind::Dense, Map::new(), Position::default());
    store.update_field("node-1", "units", serde_json::Value::Null);
    let export = ModelExport::from_store(&store);
    assert!(export.nodes[0].units.is_null());
}

#[test]
fn edges_export_endpoints_only() {
    let export = ModelExport::from_store(&three_layer_store());
    assert_eq!(export.edges[0], ExportedEdge { source: "node-1".into(), target: "node-2".into() });
    let value = serde_json::to_value(&export.edges[0]).unwrap();
    assert!(value.get("id").is_none());
}

#[test]
fn pretty_json_uses_camel_case_totals() {
    let json = ModelExport::from_store(&three_layer_store()).to_pretty_json().unwrap();
    assert!(json.contains("\"totalParameters\": 50560"));
    assert!(json.contains("\"totalLayers\": 3"));
    assert!(json.contains('\n'));
}

#[test]
fn export_leaves_store_untouched() {
    let store = three_layer_store();
    let before = store.nodes().to_vec();
    let _export = ModelExport::from_store(&store);
    assert_eq!(store.nodes(), before.as_slice());
}

#[test]
fn file_name_from_date() {
    assert_eq!(export_file_name("2024-05-01"), "deepblocks-model-2024-05-01.json");
    assert_eq!(export_file_name("2024-05-01T12:30:00.000Z"), "deepblocks-model-2024-05-01.json");
}
