// Configuration loading tests

use ecg_assistant::Config;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("assistant.toml");
    fs::write(
        &path,
        r#"
[service]
name = "ward-7-headset"

[backend]
base_url = "http://10.0.0.5:8000"
request_timeout_ms = 2500

[signal]
length = 120
"#,
    )
    .unwrap();

    let cfg = Config::load(path.to_str().unwrap()).unwrap();

    assert_eq!(cfg.backend.base_url, "http://10.0.0.5:8000");
    assert_eq!(cfg.request_timeout(), Duration::from_millis(2500));
    assert_eq!(cfg.signal.length, 120);

    let session = cfg.session_config();
    assert_eq!(session.request_timeout, Duration::from_millis(2500));
    assert_eq!(session.signal_length, 120);
    assert!(session.session_id.starts_with("session-"));
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist");

    let cfg = Config::load(path.to_str().unwrap()).unwrap();

    assert_eq!(cfg.backend.base_url, "http://127.0.0.1:8000");
    assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.signal.length, 187);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.toml");
    fs::write(&path, "[backend]\nrequest_timeout_ms = 750\n").unwrap();

    let cfg = Config::load(path.to_str().unwrap()).unwrap();

    assert_eq!(cfg.request_timeout(), Duration::from_millis(750));
    assert_eq!(cfg.signal.length, 187);
}

#[test]
fn test_environment_overrides_service_name() {
    // Process-wide; service.name is asserted nowhere else
    std::env::set_var("ECG_ASSISTANT__SERVICE__NAME", "from-env");

    let dir = TempDir::new().unwrap();
    let cfg = Config::load(dir.path().join("none").to_str().unwrap()).unwrap();

    assert_eq!(cfg.service.name, "from-env");
    std::env::remove_var("ECG_ASSISTANT__SERVICE__NAME");
}
