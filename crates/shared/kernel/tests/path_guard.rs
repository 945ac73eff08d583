use occi_kernel::prelude::*;

#[test]
fn path_guard_rejects_relative_segments() {
    assert_eq!(PathGuard::sanitize("//network/n1").unwrap(), "network/n1");

    let err = PathGuard::sanitize("/network/./n1").unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().contains("relative segment"));
}
