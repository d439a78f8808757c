// SPDX-License-Identifier: MIT

use super::*;
use crate::crd::{ClusterExtensionRevisionSpec, ClusterExtensionRevisionStatus, Condition};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

fn cer(
    name: &str,
    revision: i64,
    lifecycle_state: LifecycleState,
    succeeded: bool,
    bundle_name: &str,
) -> ClusterExtensionRevision {
    let mut annotations = BTreeMap::new();
    annotations.insert(ANNOTATION_BUNDLE_NAME.to_string(), bundle_name.to_string());
    annotations.insert(ANNOTATION_BUNDLE_VERSION.to_string(), "1.0.0".to_string());

    let conditions = if succeeded {
        vec![Condition {
            r#type: TYPE_SUCCEEDED.to_string(),
            status: "True".to_string(),
            reason: "RolloutSuccess".to_string(),
            message: String::new(),
            last_transition_time: "2026-01-01T00:00:00Z".to_string(),
            observed_generation: Some(1),
        }]
    } else {
        Vec::new()
    };

    ClusterExtensionRevision {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            annotations: Some(annotations),
            ..Default::default()
        },
        spec: ClusterExtensionRevisionSpec {
            revision,
            lifecycle_state,
            phases: Vec::new(),
            previous: Vec::new(),
            progress_deadline_minutes: None,
        },
        status: Some(ClusterExtensionRevisionStatus { conditions }),
    }
}

#[test]
fn archived_revisions_are_dropped() {
    let revisions = vec![cer("rev-1", 1, LifecycleState::Archived, true, "pkg.v1")];
    let states = project_revision_states(&revisions);
    assert!(states.installed.is_none());
    assert!(states.rolling_out.is_empty());
}

#[test]
fn succeeded_revision_becomes_installed() {
    let revisions = vec![cer("rev-1", 1, LifecycleState::Active, true, "pkg.v1")];
    let states = project_revision_states(&revisions);
    assert_eq!(states.installed.unwrap().bundle_name, "pkg.v1");
    assert!(states.rolling_out.is_empty());
}

#[test]
fn non_succeeded_revisions_append_to_rolling_out_in_revision_order() {
    let revisions = vec![
        cer("rev-2", 2, LifecycleState::Active, false, "pkg.v2"),
        cer("rev-1", 1, LifecycleState::Active, true, "pkg.v1"),
        cer("rev-3", 3, LifecycleState::Active, false, "pkg.v3"),
    ];
    let states = project_revision_states(&revisions);
    assert_eq!(states.installed.unwrap().bundle_name, "pkg.v1");
    assert_eq!(states.rolling_out.len(), 2);
    assert_eq!(states.rolling_out[0].bundle_name, "pkg.v2");
    assert_eq!(states.rolling_out[1].bundle_name, "pkg.v3");
}
