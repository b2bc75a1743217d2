use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "BAZAAR_ENV"));
}

#[test]
fn build_app_config_defaults_to_local_only() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("empty env is valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.api_base_url.is_none());
    assert!(!cfg.has_remote());
    assert!(cfg.demo_user.is_none());
    assert_eq!(cfg.request_timeout_secs, 10);
    assert_eq!(cfg.user_agent, "bazaar/0.1 (commerce-data-layer)");
    assert_eq!(cfg.max_retries, 0);
    assert_eq!(cfg.retry_backoff_base_ms, 250);
    assert_eq!(cfg.local_store_dir.to_str(), Some("./.bazaar"));
    assert_eq!(cfg.catalog_path.to_str(), Some("./config/catalog.yaml"));
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
}

#[test]
fn build_app_config_reads_remote_settings() {
    let mut map = HashMap::new();
    map.insert("BAZAAR_API_BASE_URL", "https://api.example.com");
    map.insert("BAZAAR_DEMO_USER", "demo-42");
    map.insert("BAZAAR_MAX_RETRIES", "2");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_base_url.as_deref(), Some("https://api.example.com"));
    assert_eq!(cfg.demo_user.as_deref(), Some("demo-42"));
    assert_eq!(cfg.max_retries, 2);
    assert!(cfg.has_remote());
}

#[test]
fn build_app_config_blank_base_url_is_unset() {
    let mut map = HashMap::new();
    map.insert("BAZAAR_API_BASE_URL", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.api_base_url.is_none());
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map = HashMap::new();
    map.insert("BAZAAR_API_BASE_URL", "ftp://example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BAZAAR_API_BASE_URL"),
        "expected InvalidEnvVar(BAZAAR_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("BAZAAR_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BAZAAR_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(BAZAAR_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("BAZAAR_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BAZAAR_BIND_ADDR"),
        "expected InvalidEnvVar(BAZAAR_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_demo_user() {
    let mut map = HashMap::new();
    map.insert("BAZAAR_DEMO_USER", "secret-demo-identity");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret-demo-identity"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn config_errors_name_the_offending_variable() {
    let mut map = HashMap::new();
    map.insert("BAZAAR_MAX_RETRIES", "-1");
    let err = build_app_config(lookup_from_map(&map)).unwrap_err();
    let ConfigError::InvalidEnvVar { var, .. } = &err;
    assert_eq!(var, "BAZAAR_MAX_RETRIES");
    assert!(err.to_string().contains("BAZAAR_MAX_RETRIES"), "{err}");
}
