use super::*;

#[test]
fn every_builtin_kind_has_a_specific_template() {
    for kind in LayerKind::BUILTIN {
        assert_ne!(RenderTemplate::for_kind(&kind), RenderTemplate::Default, "{kind}");
    }
}

#[test]
fn custom_kind_falls_back_to_default_template() {
    let kind = LayerKind::Custom("Attention".into());
    assert_eq!(RenderTemplate::for_kind(&kind), RenderTemplate::Default);
}

#[test]
fn template_serializes_camel_case() {
    let json = serde_json::to_string(&RenderTemplate::CoreLayer).unwrap();
    assert_eq!(json, "\"coreLayer\"");
}

#[test]
fn accent_colors_match_selector() {
    assert_eq!(accent_color(&LayerKind::Input), "green");
    assert_eq!(accent_color(&LayerKind::Dense), "blue");
    assert_eq!(accent_color(&LayerKind::Conv2D), "purple");
    assert_eq!(accent_color(&LayerKind::Flatten), "gray");
}
