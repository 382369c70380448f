use carrier_tracker::{AuthMode, MatchPolicy, TrackerConfig, TrackerError};

#[test]
fn test_defaults_match_companion_api() {
    let config = TrackerConfig::default();
    assert_eq!(config.oauth.redirect_uri, "http://localhost:8000/callback");
    assert_eq!(config.oauth.scope, "capi");
    assert_eq!(config.api.profile_path, "/v4/profile");
    assert_eq!(config.files.token_file, "tokens.json");
    assert_eq!(config.files.delimiter_char(), ';');
    assert_eq!(config.timing.poll_interval_seconds, 60);
    assert_eq!(config.matching.policy, MatchPolicy::Exact);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_or_create_writes_defaults_then_reads_them_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("carrier_tracker.toml");
    let path = path.to_str().unwrap();

    let created = TrackerConfig::load_or_create(path).expect("create");
    assert!(std::path::Path::new(path).exists());

    let loaded = TrackerConfig::load_or_create(path).expect("load");
    assert_eq!(loaded.oauth.token_url, created.oauth.token_url);
    assert_eq!(loaded.files.materials_file, created.files.materials_file);
}

#[test]
fn test_partial_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("partial.toml");
    std::fs::write(
        &path,
        "[oauth]\nclient_id = \"abc\"\nmode = \"hybrid\"\n\n[matching]\npolicy = \"contains\"\n\n[timing]\npoll_interval_seconds = 30\n",
    )
    .unwrap();

    let config = TrackerConfig::load_or_create(path.to_str().unwrap()).expect("load");
    assert_eq!(config.oauth.client_id, "abc");
    assert_eq!(config.oauth.mode, AuthMode::Hybrid);
    assert_eq!(config.matching.policy, MatchPolicy::Contains);
    assert_eq!(config.timing.poll_interval_seconds, 30);
    assert_eq!(config.timing.error_retry_delay_seconds, 60);
    assert_eq!(config.api.base_url, carrier_tracker::DEFAULT_API_BASE_URL);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[oauth\nclient_id = ").unwrap();

    let err = TrackerConfig::load_or_create(path.to_str().unwrap()).expect_err("should fail");
    assert!(matches!(err, TrackerError::Config(_)));
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = TrackerConfig::default();
    config.timing.poll_interval_seconds = 0;
    assert!(config.validate().is_err());

    let mut config = TrackerConfig::default();
    config.files.delimiter = ";;".to_string();
    assert!(config.validate().is_err());

    let mut config = TrackerConfig::default();
    config.oauth.redirect_uri = "https://example.com/callback".to_string();
    assert!(config.validate().is_err());

    let mut config = TrackerConfig::default();
    config.oauth.client_id = "  ".to_string();
    assert!(config.validate().is_err());
}
