use occi_domain::config::{ApiConfig, LoggingConfig, OcciConfig, ServerConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8000);
    assert!(server.address.is_unspecified());
    assert!(server.ssl.is_none());

    let occi = OcciConfig::default();
    assert_eq!(occi.base_url, "http://localhost:8000");
    assert_eq!(occi.discovery_path, "-/");
    assert!(occi.users.is_empty());

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(!logging.json);
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "occi": {
            "base_url": "https://cloud.example.org/api",
            "users": [{ "identity": "alice", "secret": "wonderland" }]
        },
        "logging": { "level": "debug", "directory": "/tmp/occi" }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.occi.base_url, "https://cloud.example.org/api");
    assert_eq!(cfg.occi.discovery_path, "-/");
    assert_eq!(cfg.occi.users[0].identity, "alice");
    assert_eq!(cfg.logging.directory, Some(std::path::PathBuf::from("/tmp/occi")));
}

#[test]
fn api_config_clones_cheaply_and_mutates_on_write() {
    let original = ApiConfig::default();
    let mut copy = original.clone();
    copy.server.port = 9000;

    assert_eq!(original.server.port, 8000);
    assert_eq!(copy.server.port, 9000);
}
