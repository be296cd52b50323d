use super::*;

#[test]
fn plan9_has_256_distinct_colors_with_black_and_white() {
    let p = Palette::plan9();
    assert_eq!(p.len(), 256);
    assert_eq!(p.color(0), Rgb8::BLACK);
    assert_eq!(p.color(255), Rgb8::WHITE);

    let mut seen = std::collections::HashSet::new();
    for c in p.colors() {
        seen.insert(*c);
    }
    assert_eq!(seen.len(), 256);
}

#[test]
fn plan9_known_entries() {
    let p = Palette::plan9();
    assert_eq!(p.color(1), Rgb8::new(0x00, 0x00, 0x44));
    assert_eq!(p.color(17), Rgb8::new(0x11, 0x11, 0x11));
    assert_eq!(p.color(0xcc), Rgb8::new(0xcc, 0xcc, 0xcc));
    assert_eq!(p.color(240), Rgb8::new(0xff, 0x00, 0x00));
}

#[test]
fn web_safe_cube_fills_a_full_table() {
    let p = Palette::web_safe();
    assert_eq!(p.len(), 256);
    assert_eq!(p.color(1), Rgb8::new(0, 0, 0x33));
    assert_eq!(p.color(215), Rgb8::WHITE);
    assert!(p.colors()[216..].iter().all(|&c| c == Rgb8::WHITE));
    assert_eq!(p.nearest(Rgb8::WHITE), 215);
}

#[test]
fn short_tables_pad_to_a_power_of_two_with_the_last_color() {
    let p = Palette::new(vec![Rgb8::BLACK, Rgb8::new(9, 9, 9), Rgb8::WHITE]).unwrap();
    assert_eq!(p.len(), 4);
    assert_eq!(p.color(3), Rgb8::WHITE);
    assert_eq!(p.nearest(Rgb8::new(250, 250, 250)), 2);
}

#[test]
fn nearest_is_exact_for_members_and_closest_otherwise() {
    let p = Palette::plan9();
    for (idx, c) in p.colors().iter().enumerate() {
        assert_eq!(p.nearest(*c) as usize, idx);
    }
    assert_eq!(p.nearest(Rgb8::new(250, 252, 251)), 255);
    assert_eq!(p.nearest(Rgb8::new(3, 2, 1)), 0);
}

#[test]
fn new_rejects_empty_and_oversized() {
    assert!(Palette::new(vec![]).is_err());
    assert!(Palette::new(vec![Rgb8::BLACK; 257]).is_err());
    assert_eq!(Palette::new(vec![Rgb8::WHITE]).unwrap().len(), 2);
}

#[test]
fn rgb_bytes_are_triples() {
    let p = Palette::new(vec![Rgb8::new(1, 2, 3), Rgb8::new(4, 5, 6)]).unwrap();
    assert_eq!(p.to_rgb_bytes(), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn kind_builds_shared_instances() {
    let a = PaletteKind::Plan9.build();
    assert_eq!(a.len(), 256);
    assert_eq!(PaletteKind::WebSafe.build().len(), 256);
    let kind: PaletteKind = serde_json::from_str("\"websafe\"").unwrap();
    assert_eq!(kind, PaletteKind::WebSafe);
}
