// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn secret_name_is_namespaced_by_release() {
    assert_eq!(SecretReleaseStore::secret_name("my-ext"), "clusterextension-release-my-ext");
}

#[tokio::test]
async fn unimplemented_resolver_fails_terminal() {
    let err = UnimplementedResolver
        .resolve(&ResolveRequest {
            package_name: "pkg".to_string(),
            channels: vec![],
            version: String::new(),
            installed: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Terminal { .. }));
}

#[tokio::test]
async fn unimplemented_puller_fails_transient() {
    let err = UnimplementedImagePuller.pull("img@sha256:aaa").await.unwrap_err();
    assert!(matches!(err, PullError::Transient(_)));
}
