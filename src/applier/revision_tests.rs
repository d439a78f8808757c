// SPDX-License-Identifier: MIT

use super::*;
use crate::crd::ClusterExtensionRevisionStatus;
use crate::revision_states::RevisionMetadata;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

fn cer_with_bundle(bundle_name: &str, version: &str) -> ClusterExtensionRevision {
    let mut annotations = BTreeMap::new();
    annotations.insert(ANNOTATION_BUNDLE_NAME.to_string(), bundle_name.to_string());
    annotations.insert(ANNOTATION_BUNDLE_VERSION.to_string(), version.to_string());

    ClusterExtensionRevision {
        metadata: ObjectMeta {
            name: Some("rev-1".to_string()),
            annotations: Some(annotations),
            ..Default::default()
        },
        spec: ClusterExtensionRevisionSpec {
            revision: 1,
            lifecycle_state: LifecycleState::Active,
            phases: Vec::new(),
            previous: Vec::new(),
            progress_deadline_minutes: None,
        },
        status: Some(ClusterExtensionRevisionStatus { conditions: Vec::new() }),
    }
}

fn resolved(bundle_name: &str, version: &str) -> ResolvedBundle {
    ResolvedBundle {
        bundle: RevisionMetadata {
            bundle_name: bundle_name.to_string(),
            version: version.to_string(),
            image: "img@sha256:deadbeef".to_string(),
            package: "prometheus".to_string(),
            revision_name: None,
        },
        deprecation: None,
    }
}

#[test]
fn matches_when_bundle_name_and_version_equal() {
    let cer = cer_with_bundle("prometheus.v1.0.0", "1.0.0");
    assert!(bundle_annotations_match(&cer, &resolved("prometheus.v1.0.0", "1.0.0")));
}

#[test]
fn does_not_match_on_version_bump() {
    let cer = cer_with_bundle("prometheus.v1.0.0", "1.0.0");
    assert!(!bundle_annotations_match(&cer, &resolved("prometheus.v1.0.0", "1.0.1")));
}

#[test]
fn does_not_match_on_bundle_name_change() {
    let cer = cer_with_bundle("prometheus.v1.0.0", "1.0.0");
    assert!(!bundle_annotations_match(&cer, &resolved("prometheus.v2.0.0", "2.0.0")));
}
