use super::*;
use serial_test::serial;

fn clear_env() {
    for var in [
        "VERISTOCK_PORT",
        "VERISTOCK_BIND_ADDR",
        "VERISTOCK_STORAGE_PATH",
        "VERISTOCK_CLIP_MODEL_PATH",
        "VERISTOCK_AGGREGATOR_URL",
        "VERISTOCK_AGGREGATOR_TIMEOUT_SECS",
        "VERISTOCK_IMAGE_TIMEOUT_SECS",
    ] {
        unsafe { env::remove_var(var) };
    }
}

#[test]
#[serial]
fn defaults_without_env() {
    clear_env();
    let config = Config::from_env().expect("defaults should load");
    assert_eq!(config.port, 8080);
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");
    assert_eq!(config.aggregator_url, DEFAULT_AGGREGATOR_URL);
    assert!(config.clip_model_path.is_none());
    assert_eq!(config.aggregator_timeout, Duration::from_secs(30));
}

#[test]
#[serial]
fn port_override() {
    clear_env();
    unsafe { env::set_var("VERISTOCK_PORT", "9001") };
    let config = Config::from_env().expect("should load");
    assert_eq!(config.port, 9001);
    clear_env();
}

#[test]
#[serial]
fn zero_port_rejected() {
    clear_env();
    unsafe { env::set_var("VERISTOCK_PORT", "0") };
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPort { .. }));
    clear_env();
}

#[test]
#[serial]
fn malformed_port_rejected() {
    clear_env();
    unsafe { env::set_var("VERISTOCK_PORT", "not-a-port") };
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::PortParseError { .. }));
    clear_env();
}

#[test]
#[serial]
fn bind_addr_override() {
    clear_env();
    unsafe { env::set_var("VERISTOCK_BIND_ADDR", "0.0.0.0") };
    let config = Config::from_env().expect("should load");
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0");
    clear_env();
}

#[test]
#[serial]
fn invalid_bind_addr_rejected() {
    clear_env();
    unsafe { env::set_var("VERISTOCK_BIND_ADDR", "localhost") };
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    clear_env();
}

#[test]
#[serial]
fn empty_clip_path_treated_as_unset() {
    clear_env();
    unsafe { env::set_var("VERISTOCK_CLIP_MODEL_PATH", "   ") };
    let config = Config::from_env().expect("should load");
    assert!(config.clip_model_path.is_none());
    clear_env();
}

#[test]
#[serial]
fn timeout_overrides() {
    clear_env();
    unsafe { env::set_var("VERISTOCK_AGGREGATOR_TIMEOUT_SECS", "5") };
    unsafe { env::set_var("VERISTOCK_IMAGE_TIMEOUT_SECS", "7") };
    let config = Config::from_env().expect("should load");
    assert_eq!(config.aggregator_timeout, Duration::from_secs(5));
    assert_eq!(config.image_timeout, Duration::from_secs(7));
    clear_env();
}

#[test]
fn validate_rejects_non_http_aggregator_url() {
    let config = Config {
        aggregator_url: "ftp://example.com".to_string(),
        ..Config::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUrl { .. })
    ));
}

#[test]
fn validate_rejects_missing_clip_dir() {
    let config = Config {
        clip_model_path: Some(PathBuf::from("/definitely/not/here")),
        ..Config::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn validate_accepts_defaults() {
    let config = Config::default();
    config.validate().expect("defaults should validate");
}
