// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn absent_selector_yields_no_label_filter() {
    let selector = LabelSelector { match_labels: None };
    assert_eq!(label_selector_string(&selector), None);
}

#[test]
fn empty_match_labels_yields_no_label_filter() {
    let selector = LabelSelector {
        match_labels: Some(std::collections::BTreeMap::new()),
    };
    assert_eq!(label_selector_string(&selector), None);
}

#[test]
fn match_labels_render_as_comma_joined_equals_pairs() {
    let mut labels = std::collections::BTreeMap::new();
    labels.insert("team".to_string(), "platform".to_string());
    let selector = LabelSelector {
        match_labels: Some(labels),
    };
    assert_eq!(label_selector_string(&selector).as_deref(), Some("team=platform"));
}
