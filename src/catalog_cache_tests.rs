// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn empty_ref_yields_no_key() {
    assert_eq!(cache_key("redhat-operators", ""), None);
}

#[test]
fn key_combines_catalog_name_and_ref() {
    let key = cache_key("redhat-operators", "registry.io/catalog@sha256:abc").unwrap();
    assert!(key.starts_with("redhat-operators_"));
    assert!(key.contains("registry.io_catalog_sha256_abc"));
}

#[test]
fn distinct_refs_yield_distinct_keys() {
    let a = cache_key("cat", "img@sha256:aaa").unwrap();
    let b = cache_key("cat", "img@sha256:bbb").unwrap();
    assert_ne!(a, b);
}
