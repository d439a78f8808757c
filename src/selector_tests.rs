// SPDX-License-Identifier: MIT

use super::*;

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn absent_selector_matches_everything() {
    let selector = LabelSelector { match_labels: None };
    assert!(matches_selector(&selector, &labels(&[("a", "b")])));
    assert!(matches_selector(&selector, &BTreeMap::new()));
}

#[test]
fn empty_match_labels_matches_everything() {
    let selector = LabelSelector {
        match_labels: Some(BTreeMap::new()),
    };
    assert!(matches_selector(&selector, &labels(&[("a", "b")])));
}

#[test]
fn matches_when_all_pairs_present() {
    let selector = LabelSelector {
        match_labels: Some(labels(&[("team", "platform")])),
    };
    assert!(matches_selector(&selector, &labels(&[("team", "platform"), ("env", "prod")])));
}

#[test]
fn does_not_match_when_value_differs() {
    let selector = LabelSelector {
        match_labels: Some(labels(&[("team", "platform")])),
    };
    assert!(!matches_selector(&selector, &labels(&[("team", "other")])));
}

#[test]
fn does_not_match_when_key_missing() {
    let selector = LabelSelector {
        match_labels: Some(labels(&[("team", "platform")])),
    };
    assert!(!matches_selector(&selector, &labels(&[("env", "prod")])));
}
