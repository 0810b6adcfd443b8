//! Tests for config loading from files and the environment

use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use vendorlist::config::Config;

const ENV_VARS: &[&str] = &[
    "VENDORLIST_REFRESH_INTERVAL_MS",
    "VENDORLIST_RETRY_INTERVAL_MS",
    "VENDORLIST_LANGUAGE",
    "VENDORLIST_OVERRIDE_URL",
    "VENDORLIST_VERSION",
    "VENDORLIST_REQUEST_TIMEOUT",
    "VENDORLIST_USER_AGENT",
    "VENDORLIST_LOG_LEVEL",
    "VENDORLIST_LOG_FORMAT",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[vendor_list]
refresh_interval_ms = 3600000
retry_interval_ms = 60000
language = "fr"
override_url = "https://cdn.example.com/pubvendors.json"

[http]
request_timeout_secs = 15
user_agent = "vendorlist-test"

[logging]
level = "debug"
format = "json"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.request_timeout(), Duration::from_secs(15));
    assert_eq!(config.logging.format, "json");

    let refresh = config.refresh_config().unwrap();
    assert_eq!(refresh.refresh_interval, Duration::from_secs(3600));
    assert_eq!(refresh.language.unwrap().code(), "fr");
    assert_eq!(
        refresh.override_url.unwrap().as_str(),
        "https://cdn.example.com/pubvendors.json"
    );
}

#[test]
fn test_config_from_file_rejects_invalid_version() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[vendor_list]
refresh_interval_ms = 1000
retry_interval_ms = 1000
version = 0

[http]
request_timeout_secs = 15
user_agent = "vendorlist-test"

[logging]
level = "info"
format = "text"
"#
    )
    .unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_config_from_missing_file() {
    let result = Config::from_file(std::path::Path::new("/nonexistent/vendorlist.toml"));
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear_env();
    let config = Config::from_env().unwrap();
    let refresh = config.refresh_config().unwrap();

    assert_eq!(refresh.refresh_interval, Duration::from_secs(3600));
    assert_eq!(refresh.retry_interval, Duration::from_secs(60));
    assert_eq!(refresh.language, None);
    assert_eq!(refresh.version, None);
}

#[test]
#[serial]
fn test_config_from_env_overrides() {
    clear_env();
    std::env::set_var("VENDORLIST_REFRESH_INTERVAL_MS", "120000");
    std::env::set_var("VENDORLIST_LANGUAGE", "es");
    std::env::set_var("VENDORLIST_VERSION", "51");

    let config = Config::from_env().unwrap();
    clear_env();

    let refresh = config.refresh_config().unwrap();
    assert_eq!(refresh.refresh_interval, Duration::from_secs(120));
    assert_eq!(refresh.language.unwrap().code(), "es");
    assert_eq!(refresh.version, Some(51));
}

#[test]
#[serial]
fn test_config_from_env_rejects_non_numeric_version() {
    clear_env();
    std::env::set_var("VENDORLIST_VERSION", "latest");

    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_config_from_env_rejects_malformed_interval() {
    clear_env();
    std::env::set_var("VENDORLIST_RETRY_INTERVAL_MS", "soon");

    let result = Config::from_env();
    clear_env();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("VENDORLIST_RETRY_INTERVAL_MS"));
}
