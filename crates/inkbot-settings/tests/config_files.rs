use inkbot_settings::{Config, SettingsError};
use std::path::PathBuf;

#[test]
fn test_toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inkbot.toml");

    let mut config = Config::default();
    config.device.host = "10.0.0.7".to_string();
    config.device.ack_timeout_ms = Some(1500);
    config.drawing.scale = 0.5;
    config.output.export_dir = Some(PathBuf::from("/tmp/inkbot"));
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("inkbot.json");

    let mut config = Config::default();
    config.device.port = 2000;
    config.save_to_file(&path).unwrap();

    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    std::fs::write(&path, "[device]\nhost = \"127.0.0.1\"\n").unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.device.host, "127.0.0.1");
    assert_eq!(loaded.device.port, 1025);
    assert_eq!(loaded.drawing, Config::default().drawing);
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[drawing]\nscale = -2.0\n").unwrap();

    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::Config(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::LoadError { .. }));
}

#[test]
fn test_explicit_path_wins_over_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("explicit.json");
    std::fs::write(&path, r#"{"device": {"port": 4242}}"#).unwrap();
    let loaded = Config::load_or_default(Some(&path)).unwrap();
    assert_eq!(loaded.device.port, 4242);
}
