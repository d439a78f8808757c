// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for the `olm.example.io` resources.
//!
//! # Reconciliation Architecture
//!
//! The controller follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor resource changes via the Kubernetes API
//! 2. **Reconcile** - Compare desired state (CRD spec) with actual state
//! 3. **Apply** - Apply resolved content via server-side apply
//! 4. **Status** - Report reconciliation results back to Kubernetes
//!
//! # Available Controllers
//!
//! - [`crate::ce_controller`] - `ClusterExtension` reconciliation: runs the
//!   resolve/unpack/apply pipeline and publishes the CE's aggregate status.
//! - [`crate::cer_controller`] - `ClusterExtensionRevision` reconciliation:
//!   drives the revision engine and archives superseded revisions.
//!
//! This module holds the pieces shared by both: finalizer management, retry
//! backoff, and the generation/status-change helpers below.

pub mod finalizers;
pub mod retry;

/// Check if a resource's spec has changed by comparing generation with `observed_generation`.
///
/// This is the standard Kubernetes pattern for determining if reconciliation is needed.
/// The `metadata.generation` field is incremented by Kubernetes only when the spec changes,
/// while `status.observed_generation` is set by the controller after processing a spec.
///
/// # Arguments
///
/// * `current_generation` - The resource's current `metadata.generation`
/// * `observed_generation` - The controller's last `status.observed_generation`
///
/// # Returns
///
/// * `true` - Reconciliation is needed (spec changed or first reconciliation)
/// * `false` - No reconciliation needed (spec unchanged, status-only update)
#[must_use]
pub fn should_reconcile(current_generation: Option<i64>, observed_generation: Option<i64>) -> bool {
    match (current_generation, observed_generation) {
        (Some(current), Some(observed)) => current != observed,
        (Some(_), None) => true, // First reconciliation
        _ => false,              // No generation tracking available
    }
}

/// Check if a status value has actually changed compared to the current status.
///
/// This helper prevents unnecessary status updates that would trigger reconciliation loops:
/// status updates trigger "object updated" events which would otherwise cause a new
/// reconciliation, and then another status update, forever.
#[must_use]
pub fn status_changed<T: PartialEq>(current_value: &Option<T>, new_value: &Option<T>) -> bool {
    current_value != new_value
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
