// SPDX-License-Identifier: MIT

//! Probe registry (§9 re-architecture note): `{probeType -> predicate(obj) -> (bool, messages)}`.
//!
//! The Revision Engine (C7b) runs one probe per managed object to decide
//! whether it has become available. Consumers treat an object `kind` with
//! no registered probe as passing — the engine can't assess objects it
//! doesn't understand, so it gets out of the way instead of blocking a
//! rollout on an opaque type.

use std::collections::HashMap;

/// Outcome of running a probe against a live object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub success: bool,
    pub messages: Vec<String>,
}

impl ProbeResult {
    #[must_use]
    pub fn pass() -> Self {
        Self {
            success: true,
            messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn fail(messages: Vec<String>) -> Self {
        Self {
            success: false,
            messages,
        }
    }
}

type ProbeFn = fn(&serde_json::Value) -> ProbeResult;

/// Keyed by object `kind`. An object whose `kind` has no registered probe
/// always passes.
pub struct ProbeRegistry {
    probes: HashMap<&'static str, ProbeFn>,
}

impl Default for ProbeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProbeRegistry {
    /// A registry with the built-in probes the engine ships with.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut probes: HashMap<&'static str, ProbeFn> = HashMap::new();
        probes.insert("Deployment", probe_replicated_workload);
        Self { probes }
    }

    /// Registers (or overrides) the probe used for `kind`.
    pub fn register(&mut self, kind: &'static str, probe: ProbeFn) {
        self.probes.insert(kind, probe);
    }

    /// Runs the probe registered for `object`'s `kind`. Objects of an
    /// unrecognized kind pass unconditionally.
    #[must_use]
    pub fn run(&self, object: &serde_json::Value) -> ProbeResult {
        let kind = object.get("kind").and_then(serde_json::Value::as_str);
        match kind.and_then(|k| self.probes.get(k)) {
            Some(probe) => probe(object),
            None => ProbeResult::pass(),
        }
    }
}

/// Progress for a replicated workload (e.g. a `Deployment`): `true` when
/// `observedGeneration == generation`, an `Available=True` condition is
/// present, and `updatedReplicas == spec.replicas`.
fn probe_replicated_workload(object: &serde_json::Value) -> ProbeResult {
    let generation = object.pointer("/metadata/generation").and_then(serde_json::Value::as_i64);
    let observed_generation = object
        .pointer("/status/observedGeneration")
        .and_then(serde_json::Value::as_i64);

    let mut messages = Vec::new();

    if generation != observed_generation {
        messages.push("observedGeneration has not caught up to generation".to_string());
    }

    let available = object
        .pointer("/status/conditions")
        .and_then(serde_json::Value::as_array)
        .is_some_and(|conditions| {
            conditions.iter().any(|c| {
                c.get("type").and_then(serde_json::Value::as_str) == Some("Available")
                    && c.get("status").and_then(serde_json::Value::as_str) == Some("True")
            })
        });
    if !available {
        messages.push("Available condition is not True".to_string());
    }

    let spec_replicas = object.pointer("/spec/replicas").and_then(serde_json::Value::as_i64).unwrap_or(1);
    let updated_replicas = object.pointer("/status/updatedReplicas").and_then(serde_json::Value::as_i64).unwrap_or(0);
    if updated_replicas != spec_replicas {
        messages.push(format!("updatedReplicas ({updated_replicas}) != spec.replicas ({spec_replicas})"));
    }

    if messages.is_empty() {
        ProbeResult::pass()
    } else {
        ProbeResult::fail(messages)
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod probe_tests;
