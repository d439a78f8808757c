// SPDX-License-Identifier: MIT

//! Step 2: RetrieveRevisionStates (§4.5).
//!
//! Asks the backend-appropriate [`RevisionStatesGetter`] for the CE's
//! `{Installed, RollingOut[]}` view. A missing service account is the one
//! error this step distinguishes by name (§4.5/§7); everything else is
//! surfaced generically and retried.

use kube::runtime::controller::Action;

use crate::condition::set_condition;
use crate::context::Context;
use crate::deprecation::evaluate_deprecation;
use crate::reasons::{REASON_RETRYING, REASON_SERVICE_ACCOUNT_NOT_FOUND, TYPE_INSTALLED, TYPE_PROGRESSING};
use crate::revision_states::{
    ReleaseLogRevisionStatesGetter, RevisionListRevisionStatesGetter, RevisionStatesError, RevisionStatesGetter,
};
use crate::settings::InstallBackend;

use super::ReconcileState;

pub async fn run(ctx: &Context, state: &mut ReconcileState) -> Option<Action> {
    let getter: Box<dyn RevisionStatesGetter> = match ctx.settings.install_backend {
        InstallBackend::Release => Box::new(ReleaseLogRevisionStatesGetter {
            release_store: ctx.release_store.clone(),
        }),
        InstallBackend::Revision => Box::new(RevisionListRevisionStatesGetter {
            client: ctx.client.clone(),
        }),
    };

    match getter.get(&state.ce).await {
        Ok(states) => {
            state.revision_states = states;
            None
        }
        Err(RevisionStatesError::ServiceAccountNotFound) => {
            let observed_generation = state.observed_generation;
            set_condition(
                state.conditions_mut(),
                TYPE_INSTALLED,
                "Unknown",
                REASON_SERVICE_ACCOUNT_NOT_FOUND,
                "service account not found for install identity",
                observed_generation,
            );
            set_condition(
                state.conditions_mut(),
                TYPE_PROGRESSING,
                "True",
                REASON_RETRYING,
                "service account not found for install identity",
                observed_generation,
            );
            evaluate_deprecation(state.conditions_mut(), None, None, false, &[], observed_generation);
            Some(Action::requeue(ctx.settings.error_requeue_interval))
        }
        Err(RevisionStatesError::Other(err)) => {
            let observed_generation = state.observed_generation;
            let message = err.to_string();
            set_condition(state.conditions_mut(), TYPE_INSTALLED, "Unknown", REASON_RETRYING, &message, observed_generation);
            set_condition(state.conditions_mut(), TYPE_PROGRESSING, "True", REASON_RETRYING, &message, observed_generation);
            evaluate_deprecation(state.conditions_mut(), None, None, false, &[], observed_generation);
            Some(Action::requeue(ctx.settings.error_requeue_interval))
        }
    }
}
