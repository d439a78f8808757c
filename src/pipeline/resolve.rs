// SPDX-License-Identifier: MIT

//! Step 3: ResolveBundle (§4.5).
//!
//! Short-circuits when a revision is already rolling out: re-resolving
//! while one rollout is in flight would only race the engine that's
//! converging it. Otherwise asks the external [`Resolver`]; on failure,
//! probes catalog existence (C4) and consults [`resolve_policy`] (C6) to
//! decide between falling back to the installed bundle and retrying.
//! Either way, [`evaluate_deprecation`] (C3) always runs before this step
//! returns, since it owns four of the six canonical conditions.

use std::time::Duration;

use kube::runtime::controller::Action;

use crate::catalog_prober::{self, CatalogProbeError};
use crate::condition::set_condition;
use crate::constants::{RETRYING_REQUEUE_SECS, ROLLING_OUT_REQUEUE_SECS};
use crate::context::Context;
use crate::crd::LabelSelector;
use crate::deprecation::evaluate_deprecation;
use crate::external::{ResolveError, ResolveRequest, ResolvedBundle};
use crate::reasons::{
    REASON_BLOCKED, REASON_INSTALLING, REASON_RETRYING, REASON_ROLLING_OUT, REASON_ROLLOUT_SUCCESS,
    TYPE_INSTALLED, TYPE_PROGRESSING,
};
use crate::resolve_policy::{self, CatalogProbeOutcome, ResolvePolicyDecision};

use super::ReconcileState;

pub async fn run(ctx: &Context, state: &mut ReconcileState) -> Option<Action> {
    if !state.revision_states.rolling_out.is_empty() {
        return Some(report_rolling_out(ctx, state));
    }

    let Some(catalog) = state.ce.spec.source.catalog.clone() else {
        return Some(report_blocked(state, ctx, "source.catalog is required when sourceType is Catalog"));
    };

    let request = ResolveRequest {
        package_name: catalog.package_name.clone(),
        channels: catalog.channels.clone(),
        version: catalog.version.clone(),
        installed: state.revision_states.installed.clone(),
    };

    match ctx.resolver.resolve(&request).await {
        Ok(resolved) => {
            let installed_bundle_name = state.revision_states.installed.as_ref().map(|m| m.bundle_name.as_str());
            let observed_generation = state.observed_generation;
            evaluate_deprecation(
                state.conditions_mut(),
                installed_bundle_name,
                resolved.deprecation.as_ref(),
                true,
                &catalog.channels,
                observed_generation,
            );
            state.resolved = Some(resolved);
            None
        }
        Err(ResolveError::Terminal { reason }) => Some(report_blocked(state, ctx, &reason)),
        Err(ResolveError::Transient(err)) => Some(handle_transient_failure(ctx, state, &catalog.version, err.to_string()).await),
    }
}

fn report_rolling_out(ctx: &Context, state: &mut ReconcileState) -> Action {
    let names: Vec<String> = state
        .revision_states
        .rolling_out
        .iter()
        .map(|m| m.revision_name.clone().unwrap_or_else(|| m.bundle_name.clone()))
        .collect();
    let message = format!("waiting for {} to roll out", names.join(", "));
    let installed = state.revision_states.installed.is_some();
    let observed_generation = state.observed_generation;

    set_condition(
        state.conditions_mut(),
        TYPE_INSTALLED,
        if installed { "True" } else { "False" },
        if installed { REASON_ROLLOUT_SUCCESS } else { REASON_INSTALLING },
        "",
        observed_generation,
    );
    set_condition(state.conditions_mut(), TYPE_PROGRESSING, "True", REASON_ROLLING_OUT, &message, observed_generation);

    Action::requeue(Duration::from_secs(ROLLING_OUT_REQUEUE_SECS))
}

fn report_blocked(state: &mut ReconcileState, ctx: &Context, message: &str) -> Action {
    let observed_generation = state.observed_generation;
    set_condition(state.conditions_mut(), TYPE_INSTALLED, "False", REASON_BLOCKED, message, observed_generation);
    set_condition(state.conditions_mut(), TYPE_PROGRESSING, "False", REASON_BLOCKED, message, observed_generation);
    let installed_bundle_name = state.revision_states.installed.as_ref().map(|m| m.bundle_name.as_str());
    evaluate_deprecation(state.conditions_mut(), installed_bundle_name, None, false, &[], observed_generation);
    Action::requeue(ctx.settings.error_requeue_interval)
}

async fn handle_transient_failure(
    ctx: &Context,
    state: &mut ReconcileState,
    requested_version: &str,
    message: String,
) -> Action {
    let selector = state.ce.spec.source.catalog.as_ref().and_then(|c| c.selector.clone()).unwrap_or(LabelSelector {
        match_labels: None,
    });

    let probe_outcome = match catalog_prober::catalog_exists(&ctx.client, &selector).await {
        Ok(true) => CatalogProbeOutcome::Exists,
        Ok(false) => CatalogProbeOutcome::Absent,
        Err(CatalogProbeError::Api(_)) => CatalogProbeOutcome::ErrorChecking,
    };

    let installed_version = state.revision_states.installed.as_ref().map(|m| m.version.as_str());
    let decision = resolve_policy::decide(installed_version, requested_version, probe_outcome);
    let observed_generation = state.observed_generation;
    let installed_bundle_name = state.revision_states.installed.as_ref().map(|m| m.bundle_name.as_str());

    match decision {
        ResolvePolicyDecision::FallBack => {
            if let Some(installed) = state.revision_states.installed.clone() {
                state.resolved = Some(ResolvedBundle {
                    bundle: installed,
                    deprecation: None,
                });
            }
            set_condition(
                state.conditions_mut(),
                TYPE_INSTALLED,
                "True",
                REASON_ROLLOUT_SUCCESS,
                "falling back to installed bundle after a resolution failure",
                observed_generation,
            );
            set_condition(state.conditions_mut(), TYPE_PROGRESSING, "False", REASON_ROLLOUT_SUCCESS, "", observed_generation);
            evaluate_deprecation(state.conditions_mut(), installed_bundle_name, None, false, &[], observed_generation);
            Action::requeue(ctx.settings.stable_requeue_interval)
        }
        ResolvePolicyDecision::Retry => {
            set_condition(
                state.conditions_mut(),
                TYPE_INSTALLED,
                if installed_bundle_name.is_some() { "True" } else { "False" },
                if installed_bundle_name.is_some() { REASON_ROLLOUT_SUCCESS } else { REASON_RETRYING },
                &message,
                observed_generation,
            );
            set_condition(state.conditions_mut(), TYPE_PROGRESSING, "True", REASON_RETRYING, &message, observed_generation);
            evaluate_deprecation(state.conditions_mut(), installed_bundle_name, None, false, &[], observed_generation);
            Action::requeue(Duration::from_secs(RETRYING_REQUEUE_SECS))
        }
    }
}
