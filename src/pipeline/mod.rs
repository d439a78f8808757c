// SPDX-License-Identifier: MIT

//! The ordered reconcile step pipeline (§4.5) for `ClusterExtension`.
//!
//! `retrieve_states` → `resolve` → `unpack` → apply, threaded through a
//! single mutable [`ReconcileState`]. Each step either advances the
//! pipeline or short-circuits with a requeue [`Action`], having already
//! written every condition that step owns so the caller can always patch
//! a complete status regardless of where the pipeline stopped. Finalizer
//! handling and deletion are the caller's concern ([`crate::ce_controller`]):
//! they decide whether the pipeline runs at all for a given reconcile.

pub mod resolve;
pub mod retrieve_states;
pub mod unpack;

use std::time::Duration;

use kube::runtime::controller::Action;

use crate::applier::{ApplyError, Applier};
use crate::condition::set_condition;
use crate::constants::ROLLING_OUT_REQUEUE_SECS;
use crate::context::Context;
use crate::crd::{BundleMetadata, ClusterExtension, Condition, InstallStatus};
use crate::external::{ImageFilesystem, ResolvedBundle};
use crate::reasons::{
    REASON_RETRYING, REASON_ROLLING_OUT, REASON_ROLLOUT_SUCCESS, REASON_SERVICE_ACCOUNT_NOT_FOUND, TYPE_INSTALLED,
    TYPE_PROGRESSING,
};
use crate::revision_states::RevisionStates;

/// Mutable state threaded through the reconcile step pipeline.
pub struct ReconcileState {
    pub ce: ClusterExtension,
    pub observed_generation: i64,
    pub revision_states: RevisionStates,
    pub resolved: Option<ResolvedBundle>,
    pub image_fs: Option<Box<dyn ImageFilesystem>>,
}

impl ReconcileState {
    fn new(ce: ClusterExtension) -> Self {
        let observed_generation = ce.metadata.generation.unwrap_or(0);
        Self {
            ce,
            observed_generation,
            revision_states: RevisionStates::default(),
            resolved: None,
            image_fs: None,
        }
    }

    /// The in-progress condition list, creating `status` if absent.
    pub fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.ce.status.get_or_insert_with(Default::default).conditions
    }
}

/// Runs steps 2-5 of the pipeline (§4.5): RetrieveRevisionStates,
/// ResolveBundle, UnpackBundle, ApplyBundle. Returns the `ce` with its
/// status conditions updated, and the `Action` the controller should
/// return from its reconcile function.
pub async fn run(ctx: &Context, ce: ClusterExtension, applier: &dyn Applier) -> (ClusterExtension, Action) {
    let mut state = ReconcileState::new(ce);

    if let Some(action) = retrieve_states::run(ctx, &mut state).await {
        return (state.ce, action);
    }
    if let Some(action) = resolve::run(ctx, &mut state).await {
        return (state.ce, action);
    }
    if let Some(action) = unpack::run(ctx, &mut state).await {
        return (state.ce, action);
    }

    let action = apply(ctx, &mut state, applier).await;
    (state.ce, action)
}

async fn apply(ctx: &Context, state: &mut ReconcileState, applier: &dyn Applier) -> Action {
    if state.ce.spec.install.is_none() {
        return Action::requeue(ctx.settings.stable_requeue_interval);
    }
    let Some(resolved) = state.resolved.clone() else {
        return Action::requeue(ctx.settings.error_requeue_interval);
    };

    let ce_snapshot = state.ce.clone();
    let result = applier.apply(ctx, &ce_snapshot, &resolved, state.image_fs.as_deref()).await;
    let observed_generation = state.observed_generation;

    match result {
        Ok(outcome) => {
            if outcome.rollout_succeeded {
                record_installed(state, &resolved);
            }
            let message = outcome.message.unwrap_or_default();
            set_condition(
                state.conditions_mut(),
                TYPE_INSTALLED,
                if outcome.rollout_succeeded { "True" } else { "False" },
                if outcome.rollout_succeeded { REASON_ROLLOUT_SUCCESS } else { REASON_ROLLING_OUT },
                &message,
                observed_generation,
            );
            set_condition(
                state.conditions_mut(),
                TYPE_PROGRESSING,
                if outcome.rollout_succeeded { "False" } else { "True" },
                if outcome.rollout_succeeded { REASON_ROLLOUT_SUCCESS } else { REASON_ROLLING_OUT },
                &message,
                observed_generation,
            );
            if outcome.rollout_succeeded {
                Action::requeue(ctx.settings.stable_requeue_interval)
            } else {
                Action::requeue(Duration::from_secs(ROLLING_OUT_REQUEUE_SECS))
            }
        }
        Err(err) => {
            let reason = match &err {
                ApplyError::Permission(_) => REASON_SERVICE_ACCOUNT_NOT_FOUND,
                ApplyError::Transient(_) => REASON_RETRYING,
            };
            let message = err.to_string();
            set_condition(state.conditions_mut(), TYPE_INSTALLED, "False", reason, &message, observed_generation);
            set_condition(state.conditions_mut(), TYPE_PROGRESSING, "True", reason, &message, observed_generation);
            Action::requeue(ctx.settings.error_requeue_interval)
        }
    }
}

fn record_installed(state: &mut ReconcileState, resolved: &ResolvedBundle) {
    state.ce.status.get_or_insert_with(Default::default).install = Some(InstallStatus {
        bundle: BundleMetadata {
            name: resolved.bundle.bundle_name.clone(),
            version: resolved.bundle.version.clone(),
        },
    });
}
