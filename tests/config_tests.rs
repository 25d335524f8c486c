// Config loading and validation tests

use starlink_pingmon::config::AppConfig;
use std::collections::HashMap;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_without_environment() {
    let config = AppConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config.dish_target(), "192.168.100.1:9200");
    assert_eq!(config.poll_interval(), Duration::from_secs(2));
    assert_eq!(config.monitoring.alert_threshold, 0.1);
    assert_eq!(config.listen_addr(), "0.0.0.0:9877");
    assert_eq!(config.dish_timeout(), Duration::from_secs(10));
    assert_eq!(config.log_filter(), "info");
}

#[test]
fn environment_overrides_apply() {
    let config = AppConfig::from_lookup(lookup(&[
        ("DISH_IP", "10.0.0.5"),
        ("DISH_PORT", "9201"),
        ("POLL_INTERVAL", "0.5"),
        ("ALERT_THRESHOLD", "0.25"),
        ("HTTP_PORT", "9100"),
        ("LOG_LEVEL", "DEBUG"),
    ]))
    .unwrap();
    assert_eq!(config.dish_target(), "10.0.0.5:9201");
    assert_eq!(config.poll_interval(), Duration::from_millis(500));
    assert_eq!(config.monitoring.alert_threshold, 0.25);
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.log_filter(), "debug");
}

#[test]
fn python_style_log_levels_are_accepted() {
    for (level, directive) in [("WARNING", "warn"), ("CRITICAL", "error"), ("info", "info")] {
        let config = AppConfig::from_lookup(lookup(&[("LOG_LEVEL", level)])).unwrap();
        assert_eq!(config.log_filter(), directive);
    }
}

#[test]
fn unknown_log_level_is_rejected() {
    let err = AppConfig::from_lookup(lookup(&[("LOG_LEVEL", "LOUD")])).unwrap_err();
    assert!(err.to_string().contains("logging.level"));
}

#[test]
fn unparsable_value_names_the_variable() {
    let err = AppConfig::from_lookup(lookup(&[("POLL_INTERVAL", "soon")])).unwrap_err();
    assert!(err.to_string().contains("POLL_INTERVAL"));
}

#[test]
fn invalid_ranges_are_rejected() {
    for vars in [
        [("POLL_INTERVAL", "0")],
        [("POLL_INTERVAL", "-1")],
        [("POLL_INTERVAL", "NaN")],
        [("ALERT_THRESHOLD", "1.5")],
        [("HTTP_PORT", "0")],
        [("DISH_PORT", "0")],
        [("DISH_TIMEOUT", "0")],
    ] {
        assert!(
            AppConfig::from_lookup(lookup(&vars)).is_err(),
            "{vars:?} should be rejected"
        );
    }
}

#[test]
fn toml_partial_config_fills_defaults() {
    let config = AppConfig::load_from_str(
        r#"
[dish]
ip = "192.168.1.50"

[monitoring]
poll_interval_secs = 5.0
"#,
    )
    .unwrap();
    assert_eq!(config.dish_target(), "192.168.1.50:9200");
    assert_eq!(config.poll_interval(), Duration::from_secs(5));
    assert_eq!(config.monitoring.alert_threshold, 0.1);
    assert_eq!(config.server.port, 9877);
}

#[test]
fn toml_invalid_values_are_rejected() {
    let err = AppConfig::load_from_str(
        r#"
[monitoring]
alert_threshold = 2.0
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("alert_threshold"));
}

fn write_config(dir: &tempfile::TempDir, contents: &str) -> String {
    let path = dir.path().join("pingmon.toml");
    std::fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn config_file_values_are_used() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
host = "127.0.0.1"
port = 9999

[logging]
level = "WARNING"
"#,
    );
    let config = AppConfig::load_with(Some(&path), lookup(&[])).unwrap();
    assert_eq!(config.listen_addr(), "127.0.0.1:9999");
    assert_eq!(config.log_filter(), "warn");
    assert_eq!(config.dish_target(), "192.168.100.1:9200");
}

#[test]
fn environment_overrides_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
port = 9999

[monitoring]
poll_interval_secs = 5.0
alert_threshold = 0.2
"#,
    );
    let config = AppConfig::load_with(
        Some(&path),
        lookup(&[("HTTP_PORT", "9100"), ("POLL_INTERVAL", "1")]),
    )
    .unwrap();
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.poll_interval(), Duration::from_secs(1));
    assert_eq!(config.monitoring.alert_threshold, 0.2);
}

#[test]
fn missing_config_file_names_the_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let path = path.to_str().unwrap();
    let err = AppConfig::load_with(Some(path), lookup(&[])).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("reading config file"), "{message}");
    assert!(message.contains(path), "{message}");
}

#[test]
fn unparsable_config_file_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_config(&dir, "[server]\nport = \"high\"\n");
    let err = AppConfig::load_with(Some(&path), lookup(&[])).unwrap_err();
    assert!(format!("{err:#}").contains("parsing config file"));
}

#[test]
fn no_config_file_means_defaults_plus_environment() {
    let config = AppConfig::load_with(None, lookup(&[("DISH_IP", "10.1.1.1")])).unwrap();
    assert_eq!(config.dish_target(), "10.1.1.1:9200");
    assert_eq!(config.server.port, 9877);
}
