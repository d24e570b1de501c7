use super::*;

#[test]
fn defaults_match_output_contract() {
    let cfg = VideoConfig::default();
    assert_eq!(cfg.canvas(), Canvas { width: 1280, height: 720 });
    assert_eq!(cfg.fps().unwrap(), Fps { num: 30, den: 1 });
    assert_eq!(cfg.chunk_interval(), Duration::from_millis(500));
    assert_eq!(cfg.image_timeout(), Duration::from_secs(2));
    assert_eq!(cfg.file_name, "ai-tool-video.webm");
    cfg.validate().unwrap();
}

#[test]
fn empty_json_is_default() {
    let cfg: VideoConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, VideoConfig::default());
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<VideoConfig>(r#"{"widht": 640}"#).is_err());
}

#[test]
fn validate_rejects_odd_and_zero_values() {
    let odd = VideoConfig {
        width: 641,
        ..VideoConfig::default()
    };
    assert!(odd.validate().is_err());

    let zero_fps = VideoConfig {
        fps: 0,
        ..VideoConfig::default()
    };
    assert!(zero_fps.validate().is_err());

    let zero_interval = VideoConfig {
        chunk_interval_ms: 0,
        ..VideoConfig::default()
    };
    assert!(zero_interval.validate().is_err());
}

#[test]
fn from_path_reads_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(&path, r#"{"width": 640, "height": 360, "badge_label": "News"}"#).unwrap();
    let cfg = VideoConfig::from_path(&path).unwrap();
    assert_eq!(cfg.width, 640);
    assert_eq!(cfg.height, 360);
    assert_eq!(cfg.badge_label, "News");
    assert_eq!(cfg.fps, 30);
}

#[test]
fn explicit_font_without_bold_reuses_regular() {
    let cfg = VideoConfig {
        font: Some(PathBuf::from("fonts/Inter.ttf")),
        ..VideoConfig::default()
    };
    let (regular, bold) = cfg.resolve_fonts().unwrap();
    assert_eq!(regular, PathBuf::from("fonts/Inter.ttf"));
    assert_eq!(bold, regular);
}
