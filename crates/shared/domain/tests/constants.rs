use occi_domain::constants::{CORE_SCHEME, DISCOVERY_PATH, INFRASTRUCTURE_SCHEME, media};

#[test]
fn schemes_end_with_fragment_marker() {
    assert!(CORE_SCHEME.ends_with('#'));
    assert!(INFRASTRUCTURE_SCHEME.ends_with('#'));
}

#[test]
fn discovery_path_is_relative_collection() {
    assert!(!DISCOVERY_PATH.starts_with('/'));
    assert!(DISCOVERY_PATH.ends_with('/'));
    assert!(media::TEXT_PLAIN_UTF8.starts_with(media::TEXT_PLAIN));
}
