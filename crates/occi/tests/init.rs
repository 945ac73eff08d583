#![cfg(feature = "server")]

use occi::domain::config::{ApiConfig, UserCredentials};

#[tokio::test]
async fn state_serves_infrastructure_and_users() {
    let mut config = ApiConfig::default();
    config.occi.base_url = "http://occi.example.org/api/".to_owned();
    config.occi.users = vec![UserCredentials { identity: "alice".to_owned(), secret: "s3cret".to_owned() }];

    let state = occi::init(&config).unwrap();
    assert_eq!(state.translator.base_path(), "/api");
    assert!(state.registry().lookup_location("compute/").is_some());
    assert!(state.registry().contains("http://schemas.ogf.org/occi/infrastructure#network"));

    assert!(state.store.auth_user("alice", Some("s3cret"), Some("Basic")).await.is_some());
    assert!(state.store.auth_user("alice", Some("nope"), Some("Basic")).await.is_none());
}
