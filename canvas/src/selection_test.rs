use super::*;

#[test]
fn default_is_idle() {
    assert!(Selection::default().is_idle());
}

#[test]
fn node_and_edge_accessors_are_exclusive() {
    let node = Selection::NodeSelected("n1".into());
    assert_eq!(node.node(), Some("n1"));
    assert_eq!(node.edge(), None);

    let edge = Selection::EdgeSelected("n1-n2".into());
    assert_eq!(edge.node(), None);
    assert_eq!(edge.edge(), Some("n1-n2"));
}

#[test]
fn forget_node_only_clears_matching_node() {
    let mut sel = Selection::NodeSelected("n1".into());
    assert!(!sel.forget_node("n2"));
    assert_eq!(sel.node(), Some("n1"));
    assert!(sel.forget_node("n1"));
    assert!(sel.is_idle());
}

#[test]
fn forget_edge_ignores_node_selection() {
    let mut sel = Selection::NodeSelected("n1".into());
    assert!(!sel.forget_edge("n1"));
    assert_eq!(sel.node(), Some("n1"));
}

#[test]
fn chrome_panel_needs_node_and_open_flag() {
    let node = Selection::NodeSelected("n1".into());
    assert!(Chrome::derive(&node, true).properties_panel);
    assert!(!Chrome::derive(&node, false).properties_panel);
    assert!(!Chrome::derive(&Selection::Idle, true).properties_panel);
}

#[test]
fn chrome_edge_actions_follow_edge_selection() {
    let edge = Selection::EdgeSelected("e".into());
    let chrome = Chrome::derive(&edge, true);
    assert!(chrome.edge_actions);
    assert!(!chrome.properties_panel);
}

#[test]
fn selection_serializes_tagged() {
    let json = serde_json::to_value(Selection::NodeSelected("n2".into())).unwrap();
    assert_eq!(json, serde_json::json!({"state": "node_selected", "id": "n2"}));
    let idle = serde_json::to_value(Selection::Idle).unwrap();
    assert_eq!(idle, serde_json::json!({"state": "idle"}));
}
