// SPDX-License-Identifier: MIT

//! Revision-based applier (C7b half of the applier contract).
//!
//! Computes the desired `ClusterExtensionRevision` from a resolved bundle; if
//! it differs from the latest non-archived revision, creates a new one
//! numbered `max(existing) + 1` with `previous` set to every prior
//! non-archived revision. Convergence itself is the revision engine's job
//! (C7b proper, driven by [`crate::cer_controller`]), so a freshly created
//! revision always reports `rollout_succeeded = false` until a later
//! reconcile observes it has succeeded.

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::{Api, ListParams, PostParams};
use kube::{Resource, ResourceExt};

use crate::applier::{ApplyError, ApplyOutcome, Applier};
use crate::condition::is_true;
use crate::context::Context;
use crate::crd::{
    ClusterExtension, ClusterExtensionRevision, ClusterExtensionRevisionSpec, LifecycleState, Phase,
    PreviousRevisionRef,
};
use crate::external::{ImageFilesystem, ResolvedBundle};
use crate::labels::{
    ANNOTATION_BUNDLE_NAME, ANNOTATION_BUNDLE_REFERENCE, ANNOTATION_BUNDLE_VERSION, ANNOTATION_PACKAGE_NAME,
    ANNOTATION_SERVICE_ACCOUNT_NAME, ANNOTATION_SERVICE_ACCOUNT_NAMESPACE, OWNER_LABEL, OWNER_NAME_LABEL,
};
use crate::reasons::TYPE_SUCCEEDED;

pub struct RevisionApplier;

#[async_trait]
impl Applier for RevisionApplier {
    async fn apply(
        &self,
        ctx: &Context,
        ce: &ClusterExtension,
        resolved: &ResolvedBundle,
        image_fs: Option<&dyn ImageFilesystem>,
    ) -> Result<ApplyOutcome, ApplyError> {
        let api: Api<ClusterExtensionRevision> = Api::all(ctx.client.clone());
        let label_selector = format!("{OWNER_NAME_LABEL}={}", ce.name_any());
        let params = ListParams::default().labels(&label_selector);
        let revisions = api.list(&params).await.map_err(|err| ApplyError::Transient(err.into()))?.items;

        let mut active: Vec<&ClusterExtensionRevision> =
            revisions.iter().filter(|cer| cer.spec.lifecycle_state != LifecycleState::Archived).collect();
        active.sort_by_key(|cer| cer.spec.revision);

        let latest = active.last().copied();
        if let Some(latest) = latest {
            if bundle_annotations_match(latest, resolved) {
                let succeeded = latest.status.as_ref().is_some_and(|s| is_true(&s.conditions, TYPE_SUCCEEDED));
                return Ok(ApplyOutcome {
                    rollout_succeeded: succeeded,
                    message: (!succeeded).then(|| format!("revision {} is rolling out", latest.name_any())),
                });
            }
        }

        let Some(install) = ce.spec.install.as_ref() else {
            return Err(ApplyError::Transient(anyhow::anyhow!("ClusterExtension has no install target")));
        };

        let next_revision = active.iter().map(|cer| cer.spec.revision).max().unwrap_or(0) + 1;
        let previous: Vec<PreviousRevisionRef> = active
            .iter()
            .map(|cer| PreviousRevisionRef {
                name: cer.name_any(),
                uid: cer.uid().unwrap_or_default(),
            })
            .collect();

        let objects = image_fs.map(|fs| fs.objects().to_vec()).unwrap_or_default();
        let phases = vec![Phase {
            name: "install".to_string(),
            objects,
        }];

        let mut labels = BTreeMap::new();
        labels.insert(OWNER_NAME_LABEL.to_string(), ce.name_any());
        labels.insert(OWNER_LABEL.to_string(), ce.name_any());

        let mut annotations = BTreeMap::new();
        annotations.insert(ANNOTATION_BUNDLE_NAME.to_string(), resolved.bundle.bundle_name.clone());
        annotations.insert(ANNOTATION_BUNDLE_VERSION.to_string(), resolved.bundle.version.clone());
        annotations.insert(ANNOTATION_BUNDLE_REFERENCE.to_string(), resolved.bundle.image.clone());
        annotations.insert(ANNOTATION_PACKAGE_NAME.to_string(), resolved.bundle.package.clone());
        annotations.insert(ANNOTATION_SERVICE_ACCOUNT_NAME.to_string(), install.service_account.name.clone());
        annotations.insert(ANNOTATION_SERVICE_ACCOUNT_NAMESPACE.to_string(), install.namespace.clone());

        let owner_reference = OwnerReference {
            api_version: ClusterExtension::api_version(&()).to_string(),
            kind: ClusterExtension::kind(&()).to_string(),
            name: ce.name_any(),
            uid: ce.uid().unwrap_or_default(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        };

        let name = format!("{}-{next_revision}", ce.name_any());
        let mut revision = ClusterExtensionRevision::new(
            &name,
            ClusterExtensionRevisionSpec {
                revision: next_revision,
                lifecycle_state: LifecycleState::Active,
                phases,
                previous,
                progress_deadline_minutes: Some(ctx.settings.default_progress_deadline.as_secs() as i64 / 60),
            },
        );
        revision.meta_mut().labels = Some(labels);
        revision.meta_mut().annotations = Some(annotations);
        revision.meta_mut().owner_references = Some(vec![owner_reference]);

        api.create(&PostParams::default(), &revision).await.map_err(|err| ApplyError::Transient(err.into()))?;

        Ok(ApplyOutcome {
            rollout_succeeded: false,
            message: Some(format!("revision {name} created, waiting for engine to converge")),
        })
    }
}

fn bundle_annotations_match(cer: &ClusterExtensionRevision, resolved: &ResolvedBundle) -> bool {
    let annotations = cer.annotations();
    annotations.get(ANNOTATION_BUNDLE_NAME).is_some_and(|v| v == &resolved.bundle.bundle_name)
        && annotations.get(ANNOTATION_BUNDLE_VERSION).is_some_and(|v| v == &resolved.bundle.version)
}

#[cfg(test)]
#[path = "revision_tests.rs"]
mod revision_tests;
