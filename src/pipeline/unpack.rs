// SPDX-License-Identifier: MIT

//! Step 4: UnpackBundle (§4.5).
//!
//! Pulls the resolved bundle's content image unless it's identical, by
//! name and version, to what's already installed — in which case the
//! applier is expected to reuse existing content and `image_fs` stays
//! `None` (§4.5 step 4, mirrored by both [`crate::applier::release`] and
//! [`crate::applier::revision`]).

use kube::runtime::controller::Action;

use crate::condition::set_condition;
use crate::context::Context;
use crate::external::PullError;
use crate::reasons::{REASON_RETRYING, REASON_ROLLOUT_SUCCESS, TYPE_INSTALLED, TYPE_PROGRESSING};

use super::ReconcileState;

pub async fn run(ctx: &Context, state: &mut ReconcileState) -> Option<Action> {
    let Some(resolved) = state.resolved.clone() else {
        return None;
    };

    if resolved_matches_installed(state) {
        state.image_fs = None;
        return None;
    }

    match ctx.puller.pull(&resolved.bundle.image).await {
        Ok(image_fs) => {
            state.image_fs = Some(image_fs);
            None
        }
        Err(PullError::Permission { source, .. }) => {
            let observed_generation = state.observed_generation;
            let message = source.to_string();
            let installed = state.revision_states.installed.is_some();
            set_condition(
                state.conditions_mut(),
                TYPE_INSTALLED,
                if installed { "True" } else { "False" },
                if installed { REASON_ROLLOUT_SUCCESS } else { REASON_RETRYING },
                "",
                observed_generation,
            );
            set_condition(state.conditions_mut(), TYPE_PROGRESSING, "True", REASON_RETRYING, &message, observed_generation);
            Some(Action::requeue(ctx.settings.error_requeue_interval))
        }
        Err(PullError::Transient(err)) => {
            let observed_generation = state.observed_generation;
            let message = err.to_string();
            let installed = state.revision_states.installed.is_some();
            set_condition(
                state.conditions_mut(),
                TYPE_INSTALLED,
                if installed { "True" } else { "False" },
                if installed { REASON_ROLLOUT_SUCCESS } else { REASON_RETRYING },
                "",
                observed_generation,
            );
            set_condition(state.conditions_mut(), TYPE_PROGRESSING, "True", REASON_RETRYING, &message, observed_generation);
            Some(Action::requeue(ctx.settings.error_requeue_interval))
        }
    }
}

fn resolved_matches_installed(state: &ReconcileState) -> bool {
    let (Some(resolved), Some(installed)) = (&state.resolved, &state.revision_states.installed) else {
        return false;
    };
    resolved.bundle.bundle_name == installed.bundle_name && resolved.bundle.version == installed.version
}

#[cfg(test)]
#[path = "unpack_tests.rs"]
mod unpack_tests;
