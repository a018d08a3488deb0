use super::settings::Settings;
use super::{load_config_from, HubSettings};
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn missing_file(dir: &TempDir) -> String {
    dir.path().join("absent").to_str().unwrap().to_string()
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 14902);
    assert_eq!(settings.hub.sweep_interval(), Duration::from_secs(1));
    assert_eq!(settings.hub.event_capacity, 64);
    assert_eq!(settings.hub.delivery_capacity, 16);
    assert_eq!(settings.hub.enqueue_timeout(), None);
    assert_eq!(settings.log.level, "info");
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let cfg = temp_env::with_vars_unset(
        ["BROLLY__SERVER__PORT", "BROLLY__HUB__ENQUEUE_TIMEOUT_MS"],
        || load_config_from(&missing_file(&tmp)),
    )
    .expect("load_config failed");
    assert_eq!(cfg, Settings::default());
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("brolly.toml");
    let toml = r#"
        [server]
        host = "0.0.0.0"
        port = 9000

        [hub]
        sweep_interval_ms = 250
        delivery_capacity = 1
        enqueue_timeout_ms = 500

        [log]
        level = "debug"
    "#;
    fs::write(&path, toml).expect("write config file");

    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config failed");
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(
        cfg.hub,
        HubSettings {
            sweep_interval_ms: 250,
            event_capacity: 64,
            delivery_capacity: 1,
            enqueue_timeout_ms: Some(500),
        }
    );
    assert_eq!(cfg.log.level, "debug");
}

#[test]
#[serial]
fn environment_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let cfg = temp_env::with_vars(
        [
            ("BROLLY__SERVER__PORT", Some("15000")),
            ("BROLLY__HUB__ENQUEUE_TIMEOUT_MS", Some("75")),
        ],
        || load_config_from(&missing_file(&tmp)),
    )
    .expect("load_config failed");
    assert_eq!(cfg.server.port, 15000);
    assert_eq!(cfg.hub.enqueue_timeout(), Some(Duration::from_millis(75)));
    assert_eq!(cfg.server.host, "127.0.0.1");
}

#[test]
#[serial]
fn zero_capacity_is_rejected() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("bad.toml");
    fs::write(&path, "[hub]\ndelivery_capacity = 0\n").expect("write config file");

    let err = load_config_from(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("delivery_capacity"));
}
