// SPDX-License-Identifier: MIT

use super::*;
use crate::crd::{ClusterExtension, ClusterExtensionSource, ClusterExtensionSpec};
use crate::revision_states::RevisionMetadata;

fn state_with(resolved: Option<ResolvedBundle>, installed: Option<RevisionMetadata>) -> ReconcileState {
    let ce = ClusterExtension::new(
        "demo",
        ClusterExtensionSpec {
            source: ClusterExtensionSource {
                source_type: "Catalog".to_string(),
                catalog: None,
            },
            install: None,
            config: None,
        },
    );
    let mut state = ReconcileState::new(ce);
    state.resolved = resolved;
    state.revision_states.installed = installed;
    state
}

fn metadata(bundle_name: &str, version: &str) -> RevisionMetadata {
    RevisionMetadata {
        bundle_name: bundle_name.to_string(),
        version: version.to_string(),
        image: "img@sha256:deadbeef".to_string(),
        package: "prometheus".to_string(),
        revision_name: None,
    }
}

fn resolved(bundle_name: &str, version: &str) -> ResolvedBundle {
    ResolvedBundle {
        bundle: metadata(bundle_name, version),
        deprecation: None,
    }
}

#[test]
fn matches_when_no_installed_bundle() {
    let state = state_with(Some(resolved("a", "1.0.0")), None);
    assert!(!resolved_matches_installed(&state));
}

#[test]
fn matches_when_name_and_version_equal() {
    let state = state_with(Some(resolved("a", "1.0.0")), Some(metadata("a", "1.0.0")));
    assert!(resolved_matches_installed(&state));
}

#[test]
fn does_not_match_on_version_change() {
    let state = state_with(Some(resolved("a", "1.1.0")), Some(metadata("a", "1.0.0")));
    assert!(!resolved_matches_installed(&state));
}

#[test]
fn does_not_match_when_nothing_resolved() {
    let state = state_with(None, Some(metadata("a", "1.0.0")));
    assert!(!resolved_matches_installed(&state));
}
