use serde_json::{Map, json};

use super::*;
use crate::doc::GraphStore;
use crate::geom::Position;

fn node_of(kind: LayerKind) -> Node {
    GraphStore::new().add_node(kind, Map::new(), Position::default())
}

// =============================================================
// Field visibility
// =============================================================

#[test]
fn every_type_shows_name_and_type() {
    for kind in LayerKind::BUILTIN {
        let fields = visible_fields(&kind);
        assert_eq!(&fields[..2], &[PanelField::LayerName, PanelField::Type]);
    }
}

#[test]
fn input_shows_units_only() {
    assert_eq!(
        visible_fields(&LayerKind::Input),
        vec![PanelField::LayerName, PanelField::Type, PanelField::Units]
    );
}

#[test]
fn recurrent_and_dense_show_units_and_activation() {
    for kind in [LayerKind::Dense, LayerKind::Lstm, LayerKind::Gru, LayerKind::Output] {
        let fields = visible_fields(&kind);
        assert!(fields.contains(&PanelField::Units));
        assert!(fields.contains(&PanelField::Activation));
        assert!(!fields.contains(&PanelField::KernelSize));
    }
}

#[test]
fn conv_shows_kernel_size() {
    assert_eq!(
        visible_fields(&LayerKind::Conv2D),
        vec![
            PanelField::LayerName,
            PanelField::Type,
            PanelField::Units,
            PanelField::KernelSize,
            PanelField::Activation
        ]
    );
    assert_eq!(units_label(&LayerKind::Conv2D), "Filters");
    assert_eq!(units_label(&LayerKind::Dense), "Units/Neurons");
}

#[test]
fn pooling_and_dropout_fields() {
    assert_eq!(visible_fields(&LayerKind::AveragePooling2D)[2..], [PanelField::PoolSize]);
    assert_eq!(visible_fields(&LayerKind::Dropout)[2..], [PanelField::Rate]);
}

#[test]
fn other_types_show_only_common_fields() {
    assert_eq!(visible_fields(&LayerKind::Flatten).len(), 2);
    assert_eq!(visible_fields(&LayerKind::Custom("Foo".into())).len(), 2);
}

#[test]
fn panel_field_keys() {
    assert_eq!(PanelField::LayerName.key(), "layerName");
    assert_eq!(PanelField::KernelSize.key(), "kernelSize");
}

#[test]
fn panel_field_labels() {
    assert_eq!(PanelField::Rate.label(&LayerKind::Dropout), "Dropout Rate");
    assert_eq!(PanelField::Units.label(&LayerKind::Conv2D), "Filters");
    assert_eq!(PanelField::Units.label(&LayerKind::Input), "Units/Neurons");
}

#[test]
fn panel_field_values_read_the_node() {
    let mut store = GraphStore::new();
    let conv = store.add_node(
        LayerKind::Conv2D,
        json!({"units": 32, "activation": "relu"}).as_object().unwrap().clone(),
        Position::default(),
    );
    assert_eq!(PanelField::LayerName.value(&conv), json!("conv2d_1"));
    assert_eq!(PanelField::Type.value(&conv), json!("Conv2D"));
    assert_eq!(PanelField::Units.value(&conv), json!(32));
    assert_eq!(PanelField::KernelSize.value(&conv), json!("3x3"));
    assert_eq!(PanelField::Activation.value(&conv), json!("relu"));

    let dropout = store.add_node(LayerKind::Dropout, Map::new(), Position::default());
    assert_eq!(PanelField::Rate.value(&dropout), json!(0.5));
    assert_eq!(PanelField::PoolSize.value(&dropout), json!("2x2"));
}

#[test]
fn zero_units_show_empty() {
    let node = GraphStore::new().add_node(
        LayerKind::Dense,
        json!({"units": 0}).as_object().unwrap().clone(),
        Position::default(),
    );
    assert_eq!(PanelField::Units.value(&node), json!(""));
}

#[test]
fn only_rate_has_a_step() {
    assert_eq!(PanelField::Rate.step(), Some(RATE_STEP));
    assert_eq!(PanelField::Units.step(), None);
}

// =============================================================
// Input coercion
// =============================================================

#[test]
fn units_coerce_to_integer() {
    assert_eq!(coerce_input("units", "128"), Some(json!(128)));
    assert_eq!(coerce_input("units", " 16 "), Some(json!(16)));
    assert_eq!(coerce_input("units", "12.5"), Some(json!(12)));
    assert_eq!(coerce_input("units", "64px"), Some(json!(64)));
    assert_eq!(coerce_input("units", "+8"), Some(json!(8)));
}

#[test]
fn unparsable_or_negative_units_become_zero() {
    assert_eq!(coerce_input("units", "abc"), Some(json!(0)));
    assert_eq!(coerce_input("units", ""), Some(json!(0)));
    assert_eq!(coerce_input("units", "-5"), Some(json!(0)));
    assert_eq!(coerce_input("units", "px64"), Some(json!(0)));
    assert_eq!(coerce_input("units", "-"), Some(json!(0)));
}

#[test]
fn rate_is_clamped() {
    assert_eq!(coerce_input("rate", "0.3"), Some(json!(0.3)));
    assert_eq!(coerce_input("rate", "1.7"), Some(json!(1.0)));
    assert_eq!(coerce_input("rate", "-0.2"), Some(json!(0.0)));
}

#[test]
fn non_numeric_rate_is_dropped() {
    assert_eq!(coerce_input("rate", "abc"), None);
    assert_eq!(coerce_input("rate", "NaN"), None);
}

#[test]
fn select_fields_accept_only_enumerated_values() {
    assert_eq!(coerce_input("activation", "tanh"), Some(json!("tanh")));
    assert_eq!(coerce_input("activation", "leaky-relu"), Some(json!("leaky_relu")));
    assert_eq!(coerce_input("activation", "swish"), None);
    assert_eq!(coerce_input("kernelSize", "7x7"), Some(json!("7x7")));
    assert_eq!(coerce_input("kernelSize", "9x9"), None);
}

#[test]
fn free_text_passes_through() {
    assert_eq!(coerce_input("layerName", "encoder"), Some(json!("encoder")));
    assert_eq!(coerce_input("poolSize", "3x3"), Some(json!("3x3")));
    assert_eq!(coerce_input("type", "Dense"), Some(json!("Dense")));
}

// =============================================================
// PropertiesPanel
// =============================================================

#[test]
fn show_opens_and_holds_node() {
    let mut panel = PropertiesPanel::new();
    assert!(!panel.is_open());
    panel.show(node_of(LayerKind::Dense));
    assert!(panel.is_open());
    assert_eq!(panel.snapshot().unwrap().id, "node-1");
}

#[test]
fn clear_without_collapse_keeps_panel_open() {
    let mut panel = PropertiesPanel::new();
    panel.show(node_of(LayerKind::Dense));
    panel.clear(false);
    assert!(panel.snapshot().is_none());
    assert!(panel.is_open());
    panel.clear(true);
    assert!(!panel.is_open());
}

#[test]
fn mirror_writes_into_snapshot() {
    let mut panel = PropertiesPanel::new();
    panel.show(node_of(LayerKind::Dense));
    panel.mirror("units", json!(99));
    panel.mirror("layerName", json!("hidden"));
    let held = panel.snapshot().unwrap();
    assert_eq!(held.props().units(), Some(99));
    assert_eq!(held.data.layer_name, "hidden");
}

#[test]
fn mirror_without_snapshot_is_noop() {
    let mut panel = PropertiesPanel::new();
    panel.mirror("units", json!(1));
    assert!(panel.snapshot().is_none());
}

#[test]
fn mirror_status_marks_trained() {
    let mut panel = PropertiesPanel::new();
    panel.show(node_of(LayerKind::Dense));
    panel.mirror_status(LayerStatus::Trained);
    assert_eq!(panel.snapshot().unwrap().props().status(), LayerStatus::Trained);
}

#[test]
fn mirror_position_only_for_same_node() {
    let mut panel = PropertiesPanel::new();
    panel.show(node_of(LayerKind::Dense));
    let mut other = node_of(LayerKind::Dense);
    other.id = "node-7".into();
    other.position = Position::new(9.0, 9.0);
    panel.mirror_position(&other);
    assert_eq!(panel.snapshot().unwrap().position, Position::default());

    let mut same = node_of(LayerKind::Dense);
    same.position = Position::new(3.0, 4.0);
    panel.mirror_position(&same);
    assert_eq!(panel.snapshot().unwrap().position, Position::new(3.0, 4.0));
}

// =============================================================
// ModelSummary
// =============================================================

#[test]
fn summary_reads_node_attributes() {
    let summary = ModelSummary::for_node(&node_of(LayerKind::Conv2D), 2);
    assert_eq!(summary.total_params, 320);
    assert_eq!(summary.connections, 2);
    assert_eq!(summary.estimated_memory, "0.15 MB");
    assert_eq!(summary.status, LayerStatus::Ready);
}

#[test]
fn summary_serializes_camel_case() {
    let summary = ModelSummary::for_node(&node_of(LayerKind::Flatten), 0);
    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["totalParams"], json!(0));
    assert_eq!(value["estimatedMemory"], json!("0.05 MB"));
    assert_eq!(value["status"], json!("Ready"));
}

#[test]
fn type_selector_options_have_unique_kinds() {
    assert_eq!(LAYER_TYPE_OPTIONS.len(), 18);
    for (i, (kind, _)) in LAYER_TYPE_OPTIONS.iter().enumerate() {
        assert!(LAYER_TYPE_OPTIONS[i + 1..].iter().all(|(other, _)| other != kind));
    }
}
