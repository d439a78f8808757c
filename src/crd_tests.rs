// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn label_selector_empty_matches_everything() {
    let sel = LabelSelector::default();
    assert!(sel.is_empty());

    let sel = LabelSelector {
        match_labels: Some(BTreeMap::new()),
    };
    assert!(sel.is_empty());
}

#[test]
fn label_selector_with_labels_is_not_empty() {
    let mut labels = BTreeMap::new();
    labels.insert("foo".to_string(), "bar".to_string());
    let sel = LabelSelector {
        match_labels: Some(labels),
    };
    assert!(!sel.is_empty());
}

#[test]
fn cluster_extension_spec_roundtrips_through_json() {
    let spec = ClusterExtensionSpec {
        source: ClusterExtensionSource {
            source_type: "Catalog".to_string(),
            catalog: Some(CatalogSource {
                package_name: "prometheus".to_string(),
                channels: vec!["stable".to_string()],
                version: ">=1.0.0".to_string(),
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
    };

    let json = serde_json::to_string(&spec).expect("serialize");
    let back: ClusterExtensionSpec = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.source.source_type, "Catalog");
    assert_eq!(
        back.install.unwrap().service_account.name,
        "prometheus-installer"
    );
}

#[test]
fn condition_serializes_with_camel_case_fields() {
    let cond = Condition {
        r#type: "Installed".to_string(),
        status: "True".to_string(),
        reason: "Succeeded".to_string(),
        message: String::new(),
        last_transition_time: "2026-01-01T00:00:00Z".to_string(),
        observed_generation: Some(3),
    };
    let json = serde_json::to_value(&cond).expect("serialize");
    assert_eq!(json["observedGeneration"], 3);
    assert_eq!(json["lastTransitionTime"], "2026-01-01T00:00:00Z");
}

#[test]
fn catalog_source_defaults_channels_and_version_when_absent() {
    let json = serde_json::json!({
        "packageName": "prometheus",
    });
    let source: CatalogSource = serde_json::from_value(json).expect("deserialize");
    assert!(source.channels.is_empty());
    assert!(source.version.is_empty());
    assert!(source.selector.is_none());
}
