// SPDX-License-Identifier: MIT

//! `ClusterExtension` reconciliation (C9).
//!
//! Runs the reconcile step pipeline (§4.5), then patches only `status` and,
//! separately, finalizers — never `spec` or the rest of `metadata` (§7). A
//! reconcile step that would mutate either of those is a programming error,
//! not a recoverable one, so it panics rather than silently writing it.

use std::sync::Arc;

use kube::api::{Api, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use serde_json::json;

use crate::applier::release::ReleaseApplier;
use crate::applier::revision::RevisionApplier;
use crate::applier::Applier;
use crate::context::Context;
use crate::crd::ClusterExtension;
use crate::labels::FINALIZER_CLUSTER_EXTENSION;
use crate::pipeline;
use crate::reconcilers::finalizers::{ensure_cluster_finalizer, remove_cluster_finalizer};
use crate::settings::InstallBackend;

pub async fn reconcile(ce: Arc<ClusterExtension>, ctx: Arc<Context>) -> anyhow::Result<Action> {
    if ce.metadata.deletion_timestamp.is_some() {
        return reconcile_deletion(&ce, &ctx).await;
    }

    ensure_cluster_finalizer(&ctx.client, ce.as_ref(), FINALIZER_CLUSTER_EXTENSION).await?;

    let applier: Box<dyn Applier> = match ctx.settings.install_backend {
        InstallBackend::Release => Box::new(ReleaseApplier {
            release_store: ctx.release_store.clone(),
            content_manager: ctx.content_manager.clone(),
        }),
        InstallBackend::Revision => Box::new(RevisionApplier),
    };

    let original = (*ce).clone();
    let (updated, action) = pipeline::run(&ctx, original, applier.as_ref()).await;

    assert_no_forbidden_mutation(&ce, &updated);

    let api: Api<ClusterExtension> = Api::all(ctx.client.clone());
    let patch = json!({ "status": updated.status });
    api.patch_status(&ce.name_any(), &PatchParams::default(), &Patch::Merge(&patch)).await?;

    Ok(action)
}

async fn reconcile_deletion(ce: &ClusterExtension, ctx: &Context) -> anyhow::Result<Action> {
    if ce
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.contains(&FINALIZER_CLUSTER_EXTENSION.to_string()))
    {
        if let Some(install) = ce.spec.install.as_ref() {
            ctx.scoped_clients.evict_namespace(&install.namespace);
        }
        remove_cluster_finalizer(&ctx.client, ce, FINALIZER_CLUSTER_EXTENSION).await?;
    }
    Ok(Action::await_change())
}

/// Panics if a reconcile step mutated `spec` or `metadata` beyond what this
/// function itself owns (nothing — the pipeline never touches either).
fn assert_no_forbidden_mutation(original: &ClusterExtension, updated: &ClusterExtension) {
    let original_spec = serde_json::to_value(&original.spec).expect("serializing ClusterExtensionSpec");
    let updated_spec = serde_json::to_value(&updated.spec).expect("serializing ClusterExtensionSpec");
    assert_eq!(original_spec, updated_spec, "reconcile step mutated ClusterExtension.spec");

    let mut original_meta = original.metadata.clone();
    let mut updated_meta = updated.metadata.clone();
    original_meta.finalizers = None;
    updated_meta.finalizers = None;
    let original_meta = serde_json::to_value(&original_meta).expect("serializing ObjectMeta");
    let updated_meta = serde_json::to_value(&updated_meta).expect("serializing ObjectMeta");
    assert_eq!(original_meta, updated_meta, "reconcile step mutated ClusterExtension.metadata");
}
