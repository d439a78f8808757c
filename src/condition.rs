// SPDX-License-Identifier: MIT

//! Condition Writer (C1).
//!
//! Every condition mutation in the controller funnels through [`set_condition`].
//! It truncates oversized messages and preserves `lastTransitionTime` when the
//! observable part of a condition (`status`, `reason`, `message`) hasn't
//! changed. That idempotency is what keeps a stable reconcile from writing a
//! new status every requeue and retriggering itself.

use chrono::Utc;

use crate::constants::{MAX_CONDITION_MESSAGE_BYTES, TRUNCATION_SUFFIX};
use crate::crd::Condition;

/// Truncates `message` to fit within [`MAX_CONDITION_MESSAGE_BYTES`], appending
/// [`TRUNCATION_SUFFIX`] when truncation occurs.
///
/// Byte length exactly at the limit is left untouched; only strictly longer
/// messages are truncated.
#[must_use]
pub fn truncate_message(message: &str) -> String {
    if message.len() <= MAX_CONDITION_MESSAGE_BYTES {
        return message.to_string();
    }
    let budget = MAX_CONDITION_MESSAGE_BYTES - TRUNCATION_SUFFIX.len();
    let mut cut = budget.min(message.len());
    while cut > 0 && !message.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{TRUNCATION_SUFFIX}", &message[..cut])
}

/// Upserts a condition of `condition_type` into `conditions`, in place.
///
/// Returns `true` if the write changed anything observable (a fresh entry,
/// or a transition to a different `{status, reason, message}`). On a no-op
/// update the existing `lastTransitionTime` is preserved verbatim.
pub fn set_condition(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: i64,
) -> bool {
    let message = truncate_message(message);
    let existing = conditions.iter().position(|c| c.r#type == condition_type);

    let unchanged = existing.is_some_and(|i| {
        let c = &conditions[i];
        c.status == status && c.reason == reason && c.message == message
    });

    let last_transition_time = if unchanged {
        conditions[existing.unwrap()].last_transition_time.clone()
    } else {
        Utc::now().to_rfc3339()
    };

    let new_condition = Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: reason.to_string(),
        message,
        last_transition_time,
        observed_generation: Some(observed_generation),
    };

    match existing {
        Some(i) => {
            let changed = conditions[i] != new_condition;
            conditions[i] = new_condition;
            changed
        }
        None => {
            conditions.push(new_condition);
            true
        }
    }
}

/// Looks up a condition by type.
#[must_use]
pub fn find_condition<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// `true` when a condition of `condition_type` is present with `status == "True"`.
#[must_use]
pub fn is_true(conditions: &[Condition], condition_type: &str) -> bool {
    find_condition(conditions, condition_type).is_some_and(|c| c.status == "True")
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod condition_tests;
