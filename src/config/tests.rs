// Author: Dustin Pilgrim
// License: MIT

#[cfg(test)]
use super::*;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_from_string() {
    let config_content = r#"{
        "app": {
            "name": "TestApp",
            "version": "1.0.0",
            "debug": true,
            "server": {"host": "localhost", "port": 8080},
            "features": ["auth", "logging"]
        }
    }"#;
    let config = ResolvedConfig::from_str(config_content).expect("Failed to parse config");

    let app_name: String = config.get("app.name").expect("Failed to get app.name");
    assert_eq!(app_name, "TestApp");

    let host: String = config.get("app.server.host").expect("Failed to get host");
    assert_eq!(host, "localhost");

    let port: u16 = config.get("app.server.port").expect("Failed to get port");
    assert_eq!(port, 8080);

    let debug: bool = config.get("app.debug").expect("Failed to get debug");
    assert!(debug);

    let features: Vec<String> = config.get("app.features").expect("Failed to get features");
    assert_eq!(features, vec!["auth", "logging"]);

    let second: String = config.get("app.features[1]").expect("Failed to get indexed feature");
    assert_eq!(second, "logging");

    assert!(config.has("app.name"));
    assert!(!config.has("app.nonexistent"));

    let server_keys = config.get_keys("app.server").expect("Failed to get server keys");
    assert_eq!(server_keys, vec!["host", "port"]);
}

#[test]
fn test_command_string_is_resolved() {
    let config = ResolvedConfig::from_str(
        r#"[
            ["$object", "defaults"],
            ["$set", "timeout", 30],
            ["$object", "server", "defaults"],
            ["$set", "port", 8080]
        ]"#,
    )
    .expect("Failed to resolve config");

    assert_eq!(config.get::<u64>("server.timeout").unwrap(), 30);
    assert_eq!(config.get::<u16>("server.port").unwrap(), 8080);
    assert!(!config.has("defaults.port"));
    assert_eq!(config.source(), "<value>");
}

#[test]
fn test_command_errors_surface_from_loaders() {
    let err = ResolvedConfig::from_value(json!([["$set", "a", "b"], ["$set", "a", "b", true]])).unwrap_err();
    assert_eq!(err.code(), Some(203));

    let err = ResolvedConfig::from_str("[[\"$set\", ").unwrap_err();
    assert_eq!(err.code(), Some(303));
}

#[test]
fn test_deserialize_struct() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Server {
        host: String,
        port: u16,
        #[serde(default)]
        tls: bool,
    }

    let config = ResolvedConfig::from_value(json!({
        "servers": [
            {"host": "alpha", "port": 1},
            {"host": "beta", "port": 2, "tls": true}
        ]
    }))
    .unwrap();

    let servers: Vec<Server> = config.get("servers").unwrap();
    assert_eq!(servers.len(), 2);

    let beta: Server = config.get("servers[1]").unwrap();
    assert_eq!(
        beta,
        Server { host: "beta".into(), port: 2, tls: true }
    );
}

#[test]
fn test_optional_and_default() {
    let config = ResolvedConfig::from_value(json!({"server": {"port": 8080}})).unwrap();

    assert_eq!(config.get_optional::<u16>("server.port").unwrap(), Some(8080));
    assert_eq!(config.get_optional::<u16>("server.timeout").unwrap(), None);
    assert!(config.get_optional::<String>("server.port").is_err());

    assert_eq!(config.get_or("server.timeout", 30u64), 30);
    assert_eq!(config.get_or("server.port", 1u16), 8080);
}

#[test]
fn test_type_mismatch_error() {
    let config = ResolvedConfig::from_value(json!({"port": "eighty"})).unwrap();
    match config.get::<u16>("port") {
        Err(CmdError::TypeError { path, code, .. }) => {
            assert_eq!(path, "port");
            assert_eq!(code, Some(407));
        }
        other => panic!("Expected TypeError, got {:?}", other),
    }
}

#[test]
fn test_missing_path_error() {
    let config = ResolvedConfig::from_value(json!({"list": [1, 2]})).unwrap();
    assert!(matches!(config.get_value("list[5]"), Err(CmdError::NotFound { code: Some(404), .. })));
    assert!(matches!(config.get::<i32>("nope"), Err(CmdError::NotFound { .. })));
    assert_eq!(config.get_keys("list").unwrap_err().code(), Some(406));
}

#[test]
fn test_snake_and_kebab_keys() {
    let config = ResolvedConfig::from_value(json!({
        "monitor_media": true,
        "idle-timeout": 300
    }))
    .unwrap();

    assert!(config.get::<bool>("monitor-media").unwrap());
    assert_eq!(config.get::<u32>("idle_timeout").unwrap(), 300);
    assert!(config.get_value("idle_timeout").is_err());
}

#[test]
fn test_root_value() {
    let config = ResolvedConfig::from_value(json!({"a": 1})).unwrap();
    assert_eq!(config.get_value("").unwrap(), json!({"a": 1}));
    assert_eq!(config.root(), &json!({"a": 1}));
    assert_eq!(config.into_value(), json!({"a": 1}));
}

#[test]
fn test_string_enum_validation() {
    let config = ResolvedConfig::from_value(json!({
        "theme": {"border": "Rounded", "invalid": "bad_value"}
    }))
    .unwrap();

    let border = config.get_string_enum("theme.border", &["plain", "rounded", "thick"]);
    assert_eq!(border.unwrap(), "Rounded");

    let invalid = config.get_string_enum("theme.invalid", &["good", "better"]);
    assert!(matches!(invalid, Err(CmdError::ValidationError { code: Some(451), .. })));
}

#[test]
fn test_get_validated() {
    let config = ResolvedConfig::from_value(json!({"workers": 4, "retries": 99})).unwrap();

    let workers: u32 = config
        .get_validated("workers", |w: &u32| (1..=16).contains(w), "1 to 16")
        .unwrap();
    assert_eq!(workers, 4);

    let err = config
        .get_validated("retries", |r: &u32| *r <= 10, "0 to 10")
        .unwrap_err();
    assert_eq!(err.code(), Some(450));
}

#[test]
fn test_order_preservation() {
    let config = ResolvedConfig::from_str(r#"{"nested": {"gamma": 3, "alpha": 1, "beta": 2}}"#).unwrap();
    let keys = config.get_keys("nested").unwrap();
    assert_eq!(keys, vec!["gamma", "alpha", "beta"]);
}

// ===== File loading =====

#[test]
fn test_from_file_resolves_includes_next_to_it() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("defaults.json"),
        r#"[["$object", "server"], ["$set", "host", "localhost"], ["$set", "port", 80]]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("app.json"),
        r#"[["$include", "defaults.json"], ["$set", "port", 8080]]"#,
    )
    .unwrap();

    let config = ResolvedConfig::from_file(dir.path().join("app.json")).expect("Failed to load config");
    assert_eq!(config.get::<String>("server.host").unwrap(), "localhost");
    assert_eq!(config.get::<u16>("server.port").unwrap(), 8080);
    assert!(config.source().ends_with("app.json"));
}

#[test]
fn test_from_file_plain_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.json");
    fs::write(&path, r#"{"name": "plain"}"#).unwrap();

    let config = ResolvedConfig::from_file(&path).unwrap();
    assert_eq!(config.get::<String>("name").unwrap(), "plain");
}

#[test]
fn test_from_file_with_fallback() {
    let dir = TempDir::new().unwrap();
    let fallback = dir.path().join("fallback.json");
    fs::write(&fallback, r#"{"source": "fallback"}"#).unwrap();

    let config = ResolvedConfig::from_file_with_fallback(dir.path().join("missing.json"), fallback.clone())
        .expect("Fallback should load");
    assert_eq!(config.get::<String>("source").unwrap(), "fallback");

    let err = ResolvedConfig::from_file_with_fallback(dir.path().join("missing.json"), dir.path().join("gone.json"))
        .unwrap_err();
    assert!(matches!(err, CmdError::FileError { code: Some(301), .. }));
}

#[test]
fn test_fallback_not_used_for_command_errors() {
    let dir = TempDir::new().unwrap();
    let primary = dir.path().join("primary.json");
    let fallback = dir.path().join("fallback.json");
    fs::write(&primary, r#"[["$include", "missing.json"]]"#).unwrap();
    fs::write(&fallback, r#"{"source": "fallback"}"#).unwrap();

    let err = ResolvedConfig::from_file_with_fallback(primary, fallback).unwrap_err();
    assert!(matches!(err, CmdError::IncludeError { .. }));
}

#[test]
fn test_from_resolver() {
    let resolver = MemoryResolver::new().with_document("base.json", json!({"level": "info"}));
    let config = ResolvedConfig::from_resolver(
        &resolver,
        "app.json",
        json!([["$include", "base.json"], ["$set", "name", "svc"]]),
    )
    .unwrap();
    assert_eq!(config.get::<String>("level").unwrap(), "info");
    assert_eq!(config.source(), "app.json");
}
