use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GifTextError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        GifTextError::segmentation("x")
            .to_string()
            .contains("segmentation error:")
    );
    assert!(
        GifTextError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        GifTextError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        GifTextError::config("x")
            .to_string()
            .contains("config error:")
    );
    assert!(GifTextError::io("x").to_string().contains("io error:"));
    assert!(
        GifTextError::cancelled("x")
            .to_string()
            .contains("cancelled:")
    );
}

#[test]
fn kind_maps_to_stage() {
    assert_eq!(GifTextError::decode("x").kind(), ErrorKind::Decode);
    assert_eq!(GifTextError::encode("x").kind().stage(), "encode");
    assert_eq!(
        GifTextError::segmentation("x").kind().stage(),
        "segmentation"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GifTextError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[test]
fn of_kind_round_trips_kind() {
    for kind in [
        ErrorKind::Decode,
        ErrorKind::Segmentation,
        ErrorKind::Render,
        ErrorKind::Encode,
        ErrorKind::Config,
        ErrorKind::Io,
        ErrorKind::Cancelled,
        ErrorKind::Other,
    ] {
        let err = GifTextError::of_kind(kind, "frame 2: boom");
        assert_eq!(err.kind(), kind);
        assert!(err.to_string().contains("frame 2: boom"));
    }
}
