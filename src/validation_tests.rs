// SPDX-License-Identifier: MIT

use super::*;
use crate::crd::{
    CatalogSource, ClusterExtensionConfig, ClusterExtensionInstall, ClusterExtensionSource,
    CrdUpgradeSafety, Preflight, ServiceAccountReference,
};

fn valid_spec() -> ClusterExtensionSpec {
    ClusterExtensionSpec {
        source: ClusterExtensionSource {
            source_type: "Catalog".to_string(),
            catalog: Some(CatalogSource {
                package_name: "prometheus".to_string(),
                channels: vec!["stable".to_string()],
                version: "1.0.0".to_string(),
                selector: None,
            }),
        },
        install: Some(ClusterExtensionInstall {
            namespace: "prometheus-system".to_string(),
            service_account: ServiceAccountReference {
                name: "prometheus-installer".to_string(),
            },
            preflight: Some(Preflight {
                crd_upgrade_safety: Some(CrdUpgradeSafety {
                    enforcement: "Strict".to_string(),
                }),
            }),
        }),
        config: None,
    }
}

#[test]
fn valid_spec_passes() {
    assert!(validate_cluster_extension_spec(&valid_spec()).is_ok());
}

#[test]
fn rejects_non_catalog_source_type() {
    let mut spec = valid_spec();
    spec.source.source_type = "Bundle".to_string();
    assert_eq!(
        validate_cluster_extension_spec(&spec),
        Err(ValidationError::UnsupportedSourceType)
    );
}

#[test]
fn rejects_missing_catalog_source() {
    let mut spec = valid_spec();
    spec.source.catalog = None;
    assert_eq!(
        validate_cluster_extension_spec(&spec),
        Err(ValidationError::MissingCatalogSource)
    );
}

#[test]
fn rejects_invalid_package_name() {
    let mut spec = valid_spec();
    spec.source.catalog.as_mut().unwrap().package_name = "Not_Valid!".to_string();
    assert!(matches!(
        validate_cluster_extension_spec(&spec),
        Err(ValidationError::InvalidPackageName(_))
    ));
}

#[test]
fn rejects_invalid_channel_name() {
    let mut spec = valid_spec();
    spec.source.catalog.as_mut().unwrap().channels = vec!["Bad Channel".to_string()];
    assert!(matches!(
        validate_cluster_extension_spec(&spec),
        Err(ValidationError::InvalidChannelName { index: 0, .. })
    ));
}

#[test]
fn rejects_malformed_version() {
    let mut spec = valid_spec();
    spec.source.catalog.as_mut().unwrap().version = "1.0.0 - 2.0.0".to_string();
    assert!(matches!(
        validate_cluster_extension_spec(&spec),
        Err(ValidationError::InvalidVersion(_))
    ));
}

#[test]
fn rejects_invalid_namespace() {
    let mut spec = valid_spec();
    spec.install.as_mut().unwrap().namespace = "Not_A_Label".to_string();
    assert!(matches!(
        validate_cluster_extension_spec(&spec),
        Err(ValidationError::InvalidNamespace(_))
    ));
}

#[test]
fn rejects_install_without_preflight() {
    let mut spec = valid_spec();
    spec.install.as_mut().unwrap().preflight = None;
    assert_eq!(
        validate_cluster_extension_spec(&spec),
        Err(ValidationError::MissingPreflight)
    );
}

#[test]
fn rejects_empty_inline_config() {
    let mut spec = valid_spec();
    spec.config = Some(ClusterExtensionConfig {
        inline: serde_json::Map::new(),
    });
    assert_eq!(
        validate_cluster_extension_spec(&spec),
        Err(ValidationError::EmptyInlineConfig)
    );
}

#[test]
fn accepts_spec_without_install() {
    let mut spec = valid_spec();
    spec.install = None;
    assert!(validate_cluster_extension_spec(&spec).is_ok());
}
