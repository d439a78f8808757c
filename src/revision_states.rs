// SPDX-License-Identifier: MIT

//! RevisionStatesGetter (C2).
//!
//! Derives the `{Installed, RollingOut[]}` view of a `ClusterExtension` from
//! whichever backend is actually driving its rollouts. Two variants share
//! one contract: a release-log variant for the release-based applier, and a
//! revision-list variant for the revision-based applier.

use async_trait::async_trait;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use thiserror::Error;

use crate::condition::find_condition;
use crate::crd::{ClusterExtension, ClusterExtensionRevision, LifecycleState};
use crate::external::ReleaseStore;
use crate::labels::{
    ANNOTATION_BUNDLE_NAME, ANNOTATION_BUNDLE_REFERENCE, ANNOTATION_BUNDLE_VERSION,
    ANNOTATION_PACKAGE_NAME, OWNER_NAME_LABEL,
};
use crate::reasons::TYPE_SUCCEEDED;

/// Identity of the bundle an installed or rolling-out revision refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevisionMetadata {
    pub bundle_name: String,
    pub version: String,
    pub image: String,
    pub package: String,
    pub revision_name: Option<String>,
}

/// `{Installed, RollingOut[]}` projection for a CE.
#[derive(Clone, Debug, Default)]
pub struct RevisionStates {
    pub installed: Option<RevisionMetadata>,
    pub rolling_out: Vec<RevisionMetadata>,
}

/// Distinguished error recognized up-stream by the pipeline (§4.5 step 2).
#[derive(Debug, Error)]
pub enum RevisionStatesError {
    #[error("service account not found for install identity")]
    ServiceAccountNotFound,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait RevisionStatesGetter: Send + Sync {
    async fn get(&self, ce: &ClusterExtension) -> Result<RevisionStates, RevisionStatesError>;
}

/// Consults the release history of an external release store: the
/// most-recent entry in state `"deployed"` is recovered from its labels.
/// `RollingOut` always stays empty — the release backend has no notion of a
/// mid-flight rollout distinct from "installed".
pub struct ReleaseLogRevisionStatesGetter {
    pub release_store: std::sync::Arc<dyn ReleaseStore>,
}

#[async_trait]
impl RevisionStatesGetter for ReleaseLogRevisionStatesGetter {
    async fn get(&self, ce: &ClusterExtension) -> Result<RevisionStates, RevisionStatesError> {
        let release_name = ce.name_any();
        let history = self.release_store.history(&release_name).await?;

        let installed = history
            .iter()
            .rev()
            .find(|entry| entry.state == "deployed")
            .map(|entry| RevisionMetadata {
                bundle_name: entry.labels.get(ANNOTATION_BUNDLE_NAME).cloned().unwrap_or_default(),
                version: entry.labels.get(ANNOTATION_BUNDLE_VERSION).cloned().unwrap_or_default(),
                image: entry.labels.get(ANNOTATION_BUNDLE_REFERENCE).cloned().unwrap_or_default(),
                package: entry.labels.get(ANNOTATION_PACKAGE_NAME).cloned().unwrap_or_default(),
                revision_name: None,
            });

        Ok(RevisionStates {
            installed,
            rolling_out: Vec::new(),
        })
    }
}

/// Lists `ClusterExtensionRevision`s owned by the CE, sorted ascending by
/// `spec.revision`, dropping archived ones. A CER with `Succeeded=True`
/// becomes `Installed`; all others append to `RollingOut` in revision order.
pub struct RevisionListRevisionStatesGetter {
    pub client: Client,
}

#[async_trait]
impl RevisionStatesGetter for RevisionListRevisionStatesGetter {
    async fn get(&self, ce: &ClusterExtension) -> Result<RevisionStates, RevisionStatesError> {
        let api: Api<ClusterExtensionRevision> = Api::all(self.client.clone());
        let label_selector = format!("{OWNER_NAME_LABEL}={}", ce.name_any());
        let params = ListParams::default().labels(&label_selector);

        let revisions: Vec<ClusterExtensionRevision> = api
            .list(&params)
            .await
            .map_err(|err| RevisionStatesError::Other(err.into()))?
            .items;

        Ok(project_revision_states(&revisions))
    }
}

/// Pure projection of a CE's owned CERs into `{Installed, RollingOut[]}`.
/// Archived CERs are dropped; the rest are sorted ascending by
/// `spec.revision` before classification.
#[must_use]
pub fn project_revision_states(revisions: &[ClusterExtensionRevision]) -> RevisionStates {
    let mut sorted: Vec<&ClusterExtensionRevision> = revisions
        .iter()
        .filter(|cer| cer.spec.lifecycle_state != LifecycleState::Archived)
        .collect();
    sorted.sort_by_key(|cer| cer.spec.revision);

    let mut states = RevisionStates::default();
    for cer in sorted {
        let annotations = cer.annotations();
        let metadata = RevisionMetadata {
            bundle_name: annotations.get(ANNOTATION_BUNDLE_NAME).cloned().unwrap_or_default(),
            version: annotations.get(ANNOTATION_BUNDLE_VERSION).cloned().unwrap_or_default(),
            image: annotations.get(ANNOTATION_BUNDLE_REFERENCE).cloned().unwrap_or_default(),
            package: annotations.get(ANNOTATION_PACKAGE_NAME).cloned().unwrap_or_default(),
            revision_name: Some(cer.name_any()),
        };

        let succeeded = cer
            .status
            .as_ref()
            .and_then(|status| find_condition(&status.conditions, TYPE_SUCCEEDED))
            .is_some_and(|c| c.status == "True");

        if succeeded && states.installed.is_none() {
            states.installed = Some(metadata);
        } else {
            states.rolling_out.push(metadata);
        }
    }

    states
}

#[cfg(test)]
#[path = "revision_states_tests.rs"]
mod revision_states_tests;
