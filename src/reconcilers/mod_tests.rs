// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn should_reconcile_on_first_reconciliation() {
    assert!(should_reconcile(Some(1), None));
}

#[test]
fn should_reconcile_when_generation_changed() {
    assert!(should_reconcile(Some(2), Some(1)));
}

#[test]
fn should_not_reconcile_when_generation_unchanged() {
    assert!(!should_reconcile(Some(2), Some(2)));
}

#[test]
fn should_not_reconcile_without_generation_tracking() {
    assert!(!should_reconcile(None, None));
}

#[test]
fn status_changed_detects_difference() {
    assert!(status_changed(&Some(1), &Some(2)));
    assert!(status_changed(&None, &Some(1)));
    assert!(!status_changed(&Some(1), &Some(1)));
    assert!(!status_changed::<i32>(&None, &None));
}
