use super::*;

#[test]
fn builtin_maps_check_and_cross() {
    let map = GlyphIconMap::builtin();
    assert_eq!(map.icon_for("✅").unwrap(), "verifica.png");
    assert_eq!(map.icon_for("❌").unwrap(), "fechar.png");
    assert_eq!(map.len(), 2);
}

#[test]
fn unknown_glyph_is_render_error() {
    let err = GlyphIconMap::builtin().icon_for("★").unwrap_err();
    assert!(err.to_string().contains("render error:"));
}

#[test]
fn deserializes_from_plain_object() {
    let map: GlyphIconMap = serde_json::from_str(r#"{"★":"star.svg"}"#).unwrap();
    assert_eq!(map.icon_for("★").unwrap(), "star.svg");
    assert!(map.icon_for("✅").is_err());
}
