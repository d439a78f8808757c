// SPDX-License-Identifier: MIT

//! Release-based applier (C7a).
//!
//! Applies a bundle's manifests as one phase via the revision engine's
//! apply/probe machinery, then writes a single, replacement rollout record
//! to the external release store. There is no notion of a mid-flight
//! revision distinct from "installed": either this apply attempt converges
//! the objects or it doesn't.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;

use crate::applier::{ApplyError, ApplyOutcome, Applier};
use crate::context::Context;
use crate::crd::{ClusterExtension, Phase};
use crate::engine;
use crate::external::{ContentManager, ImageFilesystem, ReleaseHistoryEntry, ReleaseStore, ResolvedBundle};
use crate::labels::{
    ANNOTATION_BUNDLE_NAME, ANNOTATION_BUNDLE_REFERENCE, ANNOTATION_BUNDLE_VERSION, ANNOTATION_PACKAGE_NAME,
    OWNER_LABEL,
};
use crate::probe::ProbeRegistry;

pub struct ReleaseApplier {
    pub release_store: Arc<dyn ReleaseStore>,
    pub content_manager: Arc<dyn ContentManager>,
}

#[async_trait]
impl Applier for ReleaseApplier {
    async fn apply(
        &self,
        ctx: &Context,
        ce: &ClusterExtension,
        resolved: &ResolvedBundle,
        image_fs: Option<&dyn ImageFilesystem>,
    ) -> Result<ApplyOutcome, ApplyError> {
        let Some(install) = ce.spec.install.as_ref() else {
            return Err(ApplyError::Transient(anyhow::anyhow!("ClusterExtension has no install target")));
        };

        let Some(image_fs) = image_fs else {
            // Resolved bundle is identical to what's installed; reuse existing content.
            return Ok(ApplyOutcome {
                rollout_succeeded: true,
                message: None,
            });
        };

        let client = ctx
            .scoped_clients
            .get_or_create(
                &ctx.base_config,
                ctx.token_minter.as_ref(),
                &install.namespace,
                &install.service_account.name,
            )
            .await
            .map_err(ApplyError::Permission)?;

        let release_name = ce.name_any();
        let phase = Phase {
            name: "release".to_string(),
            objects: image_fs.objects().to_vec(),
        };
        let registry = ProbeRegistry::with_defaults();
        let phase_results = engine::apply_phases(&client, &install.namespace, std::slice::from_ref(&phase), &registry)
            .await
            .map_err(|err| ApplyError::Transient(err.into()))?;

        let object_refs: Vec<String> = phase_results
            .iter()
            .flat_map(|phase| {
                phase.objects.iter().map(|object| format!("{}/{}/{}", object.kind, object.namespace, object.name))
            })
            .collect();
        self.content_manager
            .watch_objects(&release_name, &object_refs)
            .await
            .map_err(ApplyError::Transient)?;

        let mut labels = BTreeMap::new();
        labels.insert(OWNER_LABEL.to_string(), ce.name_any());
        labels.insert(ANNOTATION_BUNDLE_NAME.to_string(), resolved.bundle.bundle_name.clone());
        labels.insert(ANNOTATION_BUNDLE_VERSION.to_string(), resolved.bundle.version.clone());
        labels.insert(ANNOTATION_BUNDLE_REFERENCE.to_string(), resolved.bundle.image.clone());
        labels.insert(ANNOTATION_PACKAGE_NAME.to_string(), resolved.bundle.package.clone());

        self.release_store
            .record(
                &release_name,
                ReleaseHistoryEntry {
                    state: "deployed".to_string(),
                    labels,
                },
            )
            .await
            .map_err(ApplyError::Transient)?;

        Ok(ApplyOutcome {
            rollout_succeeded: engine::is_complete(&phase_results),
            message: engine::probe_failure_message(&phase_results),
        })
    }
}
