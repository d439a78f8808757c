// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn message_at_exact_limit_is_not_truncated() {
    let message = "a".repeat(MAX_CONDITION_MESSAGE_BYTES);
    let result = truncate_message(&message);
    assert_eq!(result.len(), MAX_CONDITION_MESSAGE_BYTES);
    assert!(!result.ends_with(TRUNCATION_SUFFIX));
}

#[test]
fn message_one_byte_over_limit_is_truncated_with_suffix() {
    let message = "a".repeat(MAX_CONDITION_MESSAGE_BYTES + 1);
    let result = truncate_message(&message);
    assert_eq!(result.len(), MAX_CONDITION_MESSAGE_BYTES);
    assert!(result.ends_with(TRUNCATION_SUFFIX));
}

#[test]
fn first_write_creates_a_new_condition() {
    let mut conditions = Vec::new();
    let changed = set_condition(&mut conditions, "Installed", "True", "Succeeded", "ok", 1);
    assert!(changed);
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].observed_generation, Some(1));
}

#[test]
fn identical_rewrite_preserves_last_transition_time() {
    let mut conditions = Vec::new();
    set_condition(&mut conditions, "Installed", "True", "Succeeded", "ok", 1);
    let first_time = conditions[0].last_transition_time.clone();

    let changed = set_condition(&mut conditions, "Installed", "True", "Succeeded", "ok", 2);
    assert!(!changed);
    assert_eq!(conditions[0].last_transition_time, first_time);
    assert_eq!(conditions[0].observed_generation, Some(2));
}

#[test]
fn status_change_updates_timestamp() {
    let mut conditions = Vec::new();
    set_condition(&mut conditions, "Installed", "False", "Retrying", "pending", 1);
    let first_time = conditions[0].last_transition_time.clone();

    std::thread::sleep(std::time::Duration::from_millis(2));
    let changed = set_condition(&mut conditions, "Installed", "True", "Succeeded", "ok", 2);
    assert!(changed);
    assert_ne!(conditions[0].last_transition_time, first_time);
}

#[test]
fn message_only_change_is_observable_and_updates_timestamp() {
    let mut conditions = Vec::new();
    set_condition(&mut conditions, "Installed", "True", "Succeeded", "first", 1);
    let first_time = conditions[0].last_transition_time.clone();

    std::thread::sleep(std::time::Duration::from_millis(2));
    let changed = set_condition(&mut conditions, "Installed", "True", "Succeeded", "second", 1);
    assert!(changed);
    assert_ne!(conditions[0].last_transition_time, first_time);
}

#[test]
fn find_condition_and_is_true_reflect_status() {
    let mut conditions = Vec::new();
    set_condition(&mut conditions, "Progressing", "False", "Succeeded", "", 1);
    assert!(find_condition(&conditions, "Progressing").is_some());
    assert!(!is_true(&conditions, "Progressing"));
    assert!(!is_true(&conditions, "Installed"));
}
