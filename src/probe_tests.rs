// SPDX-License-Identifier: MIT

use super::*;
use serde_json::json;

fn healthy_deployment() -> serde_json::Value {
    json!({
        "kind": "Deployment",
        "metadata": { "generation": 3 },
        "spec": { "replicas": 2 },
        "status": {
            "observedGeneration": 3,
            "updatedReplicas": 2,
            "conditions": [{"type": "Available", "status": "True"}]
        }
    })
}

#[test]
fn unknown_kind_always_passes() {
    let registry = ProbeRegistry::with_defaults();
    let object = json!({"kind": "WidgetFrobnicator"});
    assert!(registry.run(&object).success);
}

#[test]
fn healthy_deployment_passes() {
    let registry = ProbeRegistry::with_defaults();
    assert!(registry.run(&healthy_deployment()).success);
}

#[test]
fn stale_observed_generation_fails() {
    let registry = ProbeRegistry::with_defaults();
    let mut object = healthy_deployment();
    object["status"]["observedGeneration"] = json!(2);
    let result = registry.run(&object);
    assert!(!result.success);
    assert!(result.messages.iter().any(|m| m.contains("observedGeneration")));
}

#[test]
fn missing_available_condition_fails() {
    let registry = ProbeRegistry::with_defaults();
    let mut object = healthy_deployment();
    object["status"]["conditions"] = json!([]);
    let result = registry.run(&object);
    assert!(!result.success);
}

#[test]
fn replica_mismatch_fails() {
    let registry = ProbeRegistry::with_defaults();
    let mut object = healthy_deployment();
    object["status"]["updatedReplicas"] = json!(1);
    let result = registry.run(&object);
    assert!(!result.success);
}

#[test]
fn custom_probe_can_be_registered() {
    let mut registry = ProbeRegistry::with_defaults();
    registry.register("ConfigMap", |_| ProbeResult::fail(vec!["always fails".to_string()]));
    let result = registry.run(&json!({"kind": "ConfigMap"}));
    assert!(!result.success);
}
