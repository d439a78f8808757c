// SPDX-License-Identifier: MIT

//! Resolve-Error Policy (C6).
//!
//! When resolution fails, decides between falling back to the currently
//! installed bundle and retrying, based on whether anything is installed,
//! whether the requested version is pinned to it, and whether any catalog
//! exists to retry against.

use crate::version::is_range_expression;

/// Outcome of probing for catalog existence (C4), threaded through so this
/// module stays a pure function of its inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogProbeOutcome {
    Exists,
    Absent,
    /// The probe itself failed (treated the same as "exists": can't tell, so retry).
    ErrorChecking,
}

/// What the pipeline should do after a resolution failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvePolicyDecision {
    /// Retry: surface the resolution error; `Installed` is left unchanged.
    Retry,
    /// Fall back to the installed bundle; clear the error; the engine
    /// maintains the currently installed state as the reconcile's target.
    FallBack,
}

/// Decides between falling back to `installed` and retrying.
///
/// `requested_version` is "pinned" (§6 glossary) when, trimmed, it equals
/// the installed version string exactly; a pin that disagrees with what's
/// installed can never be satisfied by falling back, so it always retries.
#[must_use]
pub fn decide(
    installed_version: Option<&str>,
    requested_version: &str,
    catalog_probe: CatalogProbeOutcome,
) -> ResolvePolicyDecision {
    let Some(installed_version) = installed_version else {
        return ResolvePolicyDecision::Retry;
    };

    let requested_is_pinned_mismatch =
        requested_version_conflicts_with_installed(requested_version, installed_version);
    if requested_is_pinned_mismatch {
        return ResolvePolicyDecision::Retry;
    }

    match catalog_probe {
        CatalogProbeOutcome::ErrorChecking | CatalogProbeOutcome::Exists => ResolvePolicyDecision::Retry,
        CatalogProbeOutcome::Absent => ResolvePolicyDecision::FallBack,
    }
}

/// A requested version "conflicts" with the installed one when it is a
/// non-empty, non-range literal pin that differs from the installed version
/// — i.e. the request pins to something other than what's running, and a
/// fall-back to the installed bundle would not satisfy it. A range
/// expression (§4.6: "a range is never pinned") can never conflict this way;
/// it falls through to the catalog-probe decision instead.
fn requested_version_conflicts_with_installed(requested_version: &str, installed_version: &str) -> bool {
    let requested = requested_version.trim();
    if requested.is_empty() || is_range_expression(requested) {
        return false;
    }
    requested != installed_version.trim()
}

#[cfg(test)]
#[path = "resolve_policy_tests.rs"]
mod resolve_policy_tests;
