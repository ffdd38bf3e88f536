use serde_json::json;

use super::*;

fn titles(sections: &[VisibleSection]) -> Vec<&'static str> {
    sections.iter().map(|s| s.section.title).collect()
}

fn names(section: &VisibleSection) -> Vec<&'static str> {
    section.items.iter().map(|b| b.display_name).collect()
}

// =============================================================
// Catalog
// =============================================================

#[test]
fn catalog_has_six_sections_in_order() {
    let titles: Vec<&str> = CATALOG.iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["Input", "Core Layers", "Pooling & Norm", "Activations", "Outputs", "Operations"]);
}

#[test]
fn every_catalog_block_is_a_builtin_kind() {
    for section in CATALOG {
        for block in section.items {
            assert!(!matches!(block.kind, LayerKind::Custom(_)), "{}", block.display_name);
        }
    }
}

#[test]
fn find_block_by_kind() {
    let block = find_block(&LayerKind::Dense).unwrap();
    assert_eq!(block.display_name, "Dense Layer");
    assert!(find_block(&LayerKind::Custom("X".into())).is_none());
}

#[test]
fn click_config_uses_display_name_as_label() {
    let config = find_block(&LayerKind::Input).unwrap().click_config();
    assert_eq!(config["label"], json!("Input Layer"));
    assert_eq!(config["units"], json!(784));
}

#[test]
fn drag_payload_carries_type_and_encoded_defaults() {
    let payload = find_block(&LayerKind::Conv2D).unwrap().drag_payload();
    assert_eq!(payload.kind, "Conv2D");
    let config: serde_json::Value = serde_json::from_str(payload.config.as_deref().unwrap()).unwrap();
    assert_eq!(config["kernelSize"], json!("3x3"));
    assert!(config.get("label").is_none());
}

// =============================================================
// Search and sections
// =============================================================

#[test]
fn initial_sections_open() {
    let palette = Palette::new();
    assert!(palette.is_open("Input"));
    assert!(palette.is_open("Core Layers"));
    assert!(!palette.is_open("Outputs"));
}

#[test]
fn empty_query_shows_everything() {
    let sections = Palette::new().visible_sections();
    assert_eq!(sections.len(), 6);
    assert_eq!(sections.iter().map(|s| s.items.len()).sum::<usize>(), 24);
}

#[test]
fn search_matches_display_name_case_insensitively() {
    let mut palette = Palette::new();
    palette.set_query("POOL");
    let sections = palette.visible_sections();
    assert_eq!(titles(&sections), vec!["Pooling & Norm"]);
    assert_eq!(names(&sections[0]), vec!["MaxPooling2D", "AveragePooling2D"]);
}

#[test]
fn search_matches_type_name() {
    let mut palette = Palette::new();
    palette.set_query("regularization");
    let sections = palette.visible_sections();
    assert_eq!(titles(&sections), vec!["Activations"]);
    assert_eq!(names(&sections[0]), vec!["L1/L2 Regularization"]);
}

#[test]
fn section_title_match_keeps_section_with_no_items() {
    let mut palette = Palette::new();
    palette.set_query("operations");
    let sections = palette.visible_sections();
    assert_eq!(titles(&sections), vec!["Operations"]);
    assert!(sections[0].items.is_empty());
}

#[test]
fn non_empty_query_forces_sections_open() {
    let mut palette = Palette::new();
    palette.set_query("softmax");
    let sections = palette.visible_sections();
    assert!(sections.iter().all(|s| s.open));
    assert!(palette.is_open("Outputs"));
}

#[test]
fn no_match_yields_no_sections() {
    let mut palette = Palette::new();
    palette.set_query("transformer");
    assert!(palette.visible_sections().is_empty());
}

#[test]
fn toggle_section_flips_open_state() {
    let mut palette = Palette::new();
    palette.toggle_section("Input");
    assert!(!palette.is_open("Input"));
    palette.toggle_section("Outputs");
    assert!(palette.is_open("Outputs"));
    palette.set_section_open("Outputs", true);
    palette.toggle_section("Outputs");
    assert!(!palette.is_open("Outputs"));
}

// =============================================================
// DragPayload decoding
// =============================================================

#[test]
fn decode_reads_type_and_config() {
    let payload = DragPayload { kind: "Dense".into(), config: Some("{\"units\":128}".into()) };
    let (kind, config) = payload.decode().unwrap();
    assert_eq!(kind, LayerKind::Dense);
    assert_eq!(config["units"], json!(128));
}

#[test]
fn decode_empty_type_is_ignored() {
    let payload = DragPayload { kind: String::new(), config: Some("{}".into()) };
    assert!(payload.decode().is_none());
}

#[test]
fn decode_garbled_config_degrades_to_empty() {
    let payload = DragPayload { kind: "Dense".into(), config: Some("{not json".into()) };
    let (kind, config) = payload.decode().unwrap();
    assert_eq!(kind, LayerKind::Dense);
    assert!(config.is_empty());
}

#[test]
fn decode_non_object_config_degrades_to_empty() {
    let payload = DragPayload { kind: "Dense".into(), config: Some("[1, 2]".into()) };
    assert!(payload.decode().unwrap().1.is_empty());
}

#[test]
fn decode_blank_or_missing_config() {
    let blank = DragPayload { kind: "Add".into(), config: Some("   ".into()) };
    assert!(blank.decode().unwrap().1.is_empty());
    let missing = DragPayload { kind: "Add".into(), config: None };
    assert!(missing.decode().unwrap().1.is_empty());
}

#[test]
fn decode_unknown_type_is_custom() {
    let payload = DragPayload { kind: "Attention".into(), config: None };
    assert_eq!(payload.decode().unwrap().0, LayerKind::Custom("Attention".into()));
}
