// SPDX-License-Identifier: MIT

//! `ClusterExtensionRevision` reconciliation (C8).
//!
//! Drives the revision engine (C7b) for `Active` revisions, leaves `Paused`
//! ones reporting whatever they last converged to, tears down `Archived`
//! ones, and removes the teardown finalizer on deletion. A revision with no
//! controller owner reference pointing at a live `ClusterExtension` is
//! orphaned — its finalizer is removed unconditionally so garbage
//! collection can proceed.

use std::time::Duration;

use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Client, Resource, ResourceExt};
use serde_json::json;
use tracing::{error, info};

use crate::condition::set_condition;
use crate::constants::PROBE_VALIDATION_REQUEUE_SECS;
use crate::context::Context;
use crate::crd::{ClusterExtensionRevision, LifecycleState};
use crate::engine::{self, EngineError};
use crate::labels::{
    ANNOTATION_SERVICE_ACCOUNT_NAME, ANNOTATION_SERVICE_ACCOUNT_NAMESPACE, FINALIZER_REVISION_TEARDOWN,
};
use crate::probe::ProbeRegistry;
use crate::reasons::{
    REASON_ARCHIVED, REASON_PROBE_FAILURE, REASON_PROBES_SUCCEEDED, REASON_PROGRESS_DEADLINE_EXCEEDED,
    REASON_RECONCILING, REASON_RETRYING, REASON_ROLLING_OUT, REASON_ROLLOUT_SUCCESS, REASON_SUCCEEDED, TYPE_AVAILABLE,
    TYPE_IN_TRANSITION, TYPE_PROGRESSING, TYPE_SUCCEEDED,
};
use crate::reconcilers::finalizers::{ensure_cluster_finalizer, handle_cluster_deletion, FinalizerCleanup};

#[async_trait]
impl FinalizerCleanup for ClusterExtensionRevision {
    async fn cleanup(&self, client: &Client) -> anyhow::Result<()> {
        let Some(namespace) = install_namespace(self) else {
            return Ok(());
        };
        engine::teardown_phases(client, &namespace, &self.spec.phases).await?;
        Ok(())
    }
}

pub async fn reconcile(cer: std::sync::Arc<ClusterExtensionRevision>, ctx: std::sync::Arc<Context>) -> anyhow::Result<Action> {
    if cer.metadata.deletion_timestamp.is_some() {
        handle_cluster_deletion(&ctx.client, cer.as_ref(), FINALIZER_REVISION_TEARDOWN).await?;
        return Ok(Action::await_change());
    }

    if !owning_cluster_extension_exists(&ctx, &cer) {
        let _ = crate::reconcilers::finalizers::remove_cluster_finalizer(&ctx.client, cer.as_ref(), FINALIZER_REVISION_TEARDOWN).await;
        return Ok(Action::await_change());
    }

    ensure_cluster_finalizer(&ctx.client, cer.as_ref(), FINALIZER_REVISION_TEARDOWN).await?;

    match cer.spec.lifecycle_state {
        LifecycleState::Archived => reconcile_archived(&ctx, &cer).await,
        LifecycleState::Paused => Ok(Action::requeue(ctx.settings.stable_requeue_interval)),
        LifecycleState::Active => reconcile_active(&ctx, &cer).await,
    }
}

fn owning_cluster_extension_exists(ctx: &Context, cer: &ClusterExtensionRevision) -> bool {
    let Some(owner_name) = cer
        .meta()
        .owner_references
        .as_ref()
        .and_then(|owners| owners.iter().find(|o| o.controller == Some(true)))
        .map(|o| o.name.clone())
    else {
        return false;
    };
    ctx.stores.cluster_extensions.state().iter().any(|ce| ce.name_any() == owner_name)
}

fn install_namespace(cer: &ClusterExtensionRevision) -> Option<String> {
    cer.annotations().get(ANNOTATION_SERVICE_ACCOUNT_NAMESPACE).cloned()
}

async fn reconcile_archived(ctx: &Context, cer: &ClusterExtensionRevision) -> anyhow::Result<Action> {
    if let Some(namespace) = install_namespace(cer) {
        if let Err(err) = engine::teardown_phases(&ctx.client, &namespace, &cer.spec.phases).await {
            error!(revision = %cer.name_any(), error = %err, "tearing down archived revision");
            return Ok(Action::requeue(ctx.settings.error_requeue_interval));
        }
    }

    let api: Api<ClusterExtensionRevision> = Api::all(ctx.client.clone());
    let mut conditions = cer.status.clone().unwrap_or_default().conditions;
    let observed_generation = cer.metadata.generation.unwrap_or(0);
    set_condition(&mut conditions, TYPE_AVAILABLE, "False", REASON_ARCHIVED, "", observed_generation);
    set_condition(&mut conditions, TYPE_PROGRESSING, "False", REASON_ARCHIVED, "", observed_generation);
    set_condition(&mut conditions, TYPE_SUCCEEDED, "False", REASON_ARCHIVED, "", observed_generation);
    set_condition(&mut conditions, TYPE_IN_TRANSITION, "False", REASON_ARCHIVED, "", observed_generation);

    let patch = json!({ "status": { "conditions": conditions } });
    api.patch_status(&cer.name_any(), &PatchParams::default(), &Patch::Merge(&patch)).await?;

    Ok(Action::await_change())
}

async fn reconcile_active(ctx: &Context, cer: &ClusterExtensionRevision) -> anyhow::Result<Action> {
    let Some(namespace) = install_namespace(cer) else {
        return Err(anyhow::anyhow!(
            "revision {} has no {ANNOTATION_SERVICE_ACCOUNT_NAMESPACE} annotation",
            cer.name_any()
        ));
    };
    let service_account_name = cer
        .annotations()
        .get(ANNOTATION_SERVICE_ACCOUNT_NAME)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("revision {} has no {ANNOTATION_SERVICE_ACCOUNT_NAME} annotation", cer.name_any()))?;

    let client = ctx
        .scoped_clients
        .get_or_create(&ctx.base_config, ctx.token_minter.as_ref(), &namespace, &service_account_name)
        .await?;

    let registry = ProbeRegistry::with_defaults();
    let phase_results = match engine::apply_phases(&client, &namespace, &cer.spec.phases, &registry).await {
        Ok(results) => results,
        Err(err @ EngineError::PhaseValidationError { .. }) => {
            let api: Api<ClusterExtensionRevision> = Api::all(ctx.client.clone());
            let mut conditions = cer.status.clone().unwrap_or_default().conditions;
            let observed_generation = cer.metadata.generation.unwrap_or(0);
            let message = err.to_string();
            set_condition(&mut conditions, TYPE_PROGRESSING, "True", REASON_RETRYING, &message, observed_generation);
            let patch = json!({ "status": { "conditions": conditions } });
            api.patch_status(&cer.name_any(), &PatchParams::default(), &Patch::Merge(&patch)).await?;
            return Ok(Action::requeue(Duration::from_secs(PROBE_VALIDATION_REQUEUE_SECS)));
        }
        Err(err) => return Err(anyhow::Error::from(err)),
    };

    let succeeded = engine::is_complete(&phase_results);
    let failure_message = engine::probe_failure_message(&phase_results);
    let already_succeeded = cer
        .status
        .as_ref()
        .is_some_and(|s| s.conditions.iter().any(|c| c.r#type == TYPE_SUCCEEDED && c.status == "True"));

    let progress_deadline = Duration::from_secs(
        cer.spec.progress_deadline_minutes.map(|m| (m.max(0) as u64) * 60).unwrap_or(ctx.settings.default_progress_deadline.as_secs()),
    );
    let age = cer
        .metadata
        .creation_timestamp
        .as_ref()
        .map(|ts| (chrono::Utc::now() - ts.0).to_std().unwrap_or(Duration::ZERO))
        .unwrap_or(Duration::ZERO);
    let deadline_exceeded = !succeeded && !already_succeeded && engine::progress_deadline_exceeded(age, progress_deadline);

    let mut conditions = cer.status.clone().unwrap_or_default().conditions;
    let observed_generation = cer.metadata.generation.unwrap_or(0);

    let is_succeeded = succeeded || already_succeeded;
    set_condition(
        &mut conditions,
        TYPE_AVAILABLE,
        if succeeded { "True" } else { "False" },
        if deadline_exceeded {
            REASON_PROGRESS_DEADLINE_EXCEEDED
        } else if succeeded {
            REASON_PROBES_SUCCEEDED
        } else {
            REASON_PROBE_FAILURE
        },
        failure_message.as_deref().unwrap_or(""),
        observed_generation,
    );
    set_condition(
        &mut conditions,
        TYPE_SUCCEEDED,
        if is_succeeded { "True" } else { "False" },
        if is_succeeded { REASON_ROLLOUT_SUCCESS } else { REASON_RECONCILING },
        "",
        observed_generation,
    );
    set_condition(
        &mut conditions,
        TYPE_IN_TRANSITION,
        if is_succeeded { "False" } else { "True" },
        if is_succeeded { REASON_ROLLOUT_SUCCESS } else { REASON_RECONCILING },
        "",
        observed_generation,
    );
    set_condition(
        &mut conditions,
        TYPE_PROGRESSING,
        if deadline_exceeded { "False" } else { "True" },
        if deadline_exceeded {
            REASON_PROGRESS_DEADLINE_EXCEEDED
        } else if is_succeeded {
            REASON_SUCCEEDED
        } else {
            REASON_ROLLING_OUT
        },
        "",
        observed_generation,
    );

    let api: Api<ClusterExtensionRevision> = Api::all(ctx.client.clone());
    let patch = json!({ "status": { "conditions": conditions } });
    api.patch_status(&cer.name_any(), &PatchParams::default(), &Patch::Merge(&patch)).await?;

    if is_succeeded && !already_succeeded {
        archive_predecessors(ctx, cer).await;
    }

    if is_succeeded {
        Ok(Action::requeue(ctx.settings.stable_requeue_interval))
    } else if deadline_exceeded {
        Ok(Action::requeue(ctx.settings.error_requeue_interval))
    } else {
        Ok(Action::requeue(progress_deadline.saturating_sub(age)))
    }
}

/// Best-effort archive of every revision `cer` supersedes; failures are
/// logged, not propagated, since the next successful reconcile retries.
async fn archive_predecessors(ctx: &Context, cer: &ClusterExtensionRevision) {
    let api: Api<ClusterExtensionRevision> = Api::all(ctx.client.clone());
    for previous in &cer.spec.previous {
        let patch = json!({ "spec": { "lifecycleState": "Archived" } });
        if let Err(err) = api.patch(&previous.name, &PatchParams::default(), &Patch::Merge(&patch)).await {
            error!(revision = %previous.name, error = %err, "archiving predecessor revision");
        } else {
            info!(revision = %previous.name, "archived predecessor revision");
        }
    }
}
