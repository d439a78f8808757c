// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn nothing_installed_always_retries() {
    assert_eq!(decide(None, "", CatalogProbeOutcome::Absent), ResolvePolicyDecision::Retry);
    assert_eq!(decide(None, "1.0.0", CatalogProbeOutcome::Absent), ResolvePolicyDecision::Retry);
}

#[test]
fn version_pin_mismatch_during_outage_always_retries() {
    // S3: CE requests 1.0.1, installed 1.0.0, regardless of catalog probe outcome.
    assert_eq!(
        decide(Some("1.0.0"), "1.0.1", CatalogProbeOutcome::Absent),
        ResolvePolicyDecision::Retry
    );
    assert_eq!(
        decide(Some("1.0.0"), "1.0.1", CatalogProbeOutcome::Exists),
        ResolvePolicyDecision::Retry
    );
}

#[test]
fn error_checking_catalogs_retries() {
    assert_eq!(
        decide(Some("1.0.0"), "", CatalogProbeOutcome::ErrorChecking),
        ResolvePolicyDecision::Retry
    );
}

#[test]
fn catalogs_exist_is_transient_and_retries() {
    assert_eq!(
        decide(Some("1.0.0"), "", CatalogProbeOutcome::Exists),
        ResolvePolicyDecision::Retry
    );
}

#[test]
fn no_catalogs_falls_back_to_installed() {
    // S2: installed 1.0.0, no version pin, no catalogs.
    assert_eq!(
        decide(Some("1.0.0"), "", CatalogProbeOutcome::Absent),
        ResolvePolicyDecision::FallBack
    );
}

#[test]
fn requested_equal_to_installed_behaves_like_absent() {
    assert_eq!(
        decide(Some("1.0.0"), " 1.0.0 ", CatalogProbeOutcome::Absent),
        ResolvePolicyDecision::FallBack
    );
}

#[test]
fn range_version_during_outage_falls_back() {
    // A range request is never "pinned" (§4.6), so a catalog outage with no
    // catalogs to retry against still falls back to the installed bundle,
    // even though the range string differs from the installed version.
    assert_eq!(
        decide(Some("1.0.0"), ">=1.0.0", CatalogProbeOutcome::Absent),
        ResolvePolicyDecision::FallBack
    );
}

#[test]
fn range_version_during_outage_with_catalogs_present_retries() {
    assert_eq!(
        decide(Some("1.0.0"), ">=1.0.0", CatalogProbeOutcome::Exists),
        ResolvePolicyDecision::Retry
    );
}
