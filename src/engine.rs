// SPDX-License-Identifier: MIT

//! Revision Engine (C7b): applies a `ClusterExtensionRevision`'s phases in
//! order and probes each object to decide whether the rollout is complete,
//! failing, or still in progress.
//!
//! Pure status aggregation ([`is_complete`], [`probe_failure_message`]) is
//! kept separate from the I/O that applies objects to the cluster
//! ([`apply_phases`]) so the former is exhaustively unit-testable without a
//! live API server.

use std::time::Duration;

use kube::api::{ApiResource, DeleteParams, DynamicObject, Patch, PatchParams};
use kube::{Api, Client};
use thiserror::Error;

use crate::crd::Phase;
use crate::probe::{ProbeRegistry, ProbeResult};

/// Where server-side apply attributes field ownership.
pub const FIELD_MANAGER: &str = "clusterextension-operator";

/// Probe outcome for one object within a phase.
#[derive(Clone, Debug)]
pub struct ObjectProbeResult {
    pub kind: String,
    pub api_version: String,
    pub namespace: String,
    pub name: String,
    pub probe: ProbeResult,
}

/// Probe outcomes for every object in one phase, in manifest order.
#[derive(Clone, Debug)]
pub struct PhaseResult {
    pub name: String,
    pub objects: Vec<ObjectProbeResult>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("phase {phase:?} object has no apiVersion/kind: {object}")]
    PhaseValidationError { phase: String, object: String },

    #[error("applying object: {0}")]
    Apply(#[from] kube::Error),
}

/// Applies every phase's objects via server-side apply, in order, then
/// probes each one. Returns per-phase, per-object probe results.
pub async fn apply_phases(
    client: &Client,
    namespace: &str,
    phases: &[Phase],
    registry: &ProbeRegistry,
) -> Result<Vec<PhaseResult>, EngineError> {
    let mut results = Vec::with_capacity(phases.len());

    for phase in phases {
        let mut object_results = Vec::with_capacity(phase.objects.len());
        for object in &phase.objects {
            let applied = apply_one(client, namespace, phase, object).await?;
            let probe = registry.run(&applied);
            object_results.push(ObjectProbeResult {
                kind: applied.get("kind").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                api_version: applied.get("apiVersion").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                namespace: applied
                    .pointer("/metadata/namespace")
                    .and_then(|v| v.as_str())
                    .unwrap_or(namespace)
                    .to_string(),
                name: applied.pointer("/metadata/name").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                probe,
            });
        }
        results.push(PhaseResult {
            name: phase.name.clone(),
            objects: object_results,
        });
    }

    Ok(results)
}

async fn apply_one(
    client: &Client,
    namespace: &str,
    phase: &Phase,
    object: &serde_json::Value,
) -> Result<serde_json::Value, EngineError> {
    let api_version = object
        .get("apiVersion")
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::PhaseValidationError {
            phase: phase.name.clone(),
            object: object.to_string(),
        })?;
    let kind = object
        .get("kind")
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::PhaseValidationError {
            phase: phase.name.clone(),
            object: object.to_string(),
        })?;

    let (group, version) = match api_version.split_once('/') {
        Some((g, v)) => (g, v),
        None => ("", api_version),
    };
    let plural = format!("{}s", kind.to_lowercase());
    let gvk = kube::core::GroupVersionKind {
        group: group.to_string(),
        version: version.to_string(),
        kind: kind.to_string(),
    };
    let api_resource = ApiResource::from_gvk_with_plural(&gvk, &plural);

    let api: Api<DynamicObject> = Api::namespaced_with(client.clone(), namespace, &api_resource);

    let name = object
        .pointer("/metadata/name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::PhaseValidationError {
            phase: phase.name.clone(),
            object: object.to_string(),
        })?;

    let params = PatchParams::apply(FIELD_MANAGER).force();
    let applied = api.patch(name, &params, &Patch::Apply(object)).await?;
    serde_json::to_value(&applied.data).map_err(|err| EngineError::Apply(kube::Error::SerdeError(err)))
}

/// Whether every object across every phase passed its probe.
#[must_use]
pub fn is_complete(phase_results: &[PhaseResult]) -> bool {
    phase_results
        .iter()
        .all(|phase| phase.objects.iter().all(|o| o.probe.success))
}

/// Builds the `Available=False/ProbeFailure` message: one line per failing
/// phase, naming the first failing object in that phase, its probe
/// messages joined with `" and "`, lines joined with `"\n"` across phases.
#[must_use]
pub fn probe_failure_message(phase_results: &[PhaseResult]) -> Option<String> {
    let lines: Vec<String> = phase_results
        .iter()
        .filter_map(|phase| {
            phase.objects.iter().find(|o| !o.probe.success).map(|failing| {
                format!(
                    "Object {}.{} {}/{}: {}",
                    failing.kind,
                    failing.api_version,
                    failing.namespace,
                    failing.name,
                    failing.probe.messages.join(" and ")
                )
            })
        })
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Deletes every object across every phase, releasing the cluster state an
/// Archived or deleted `ClusterExtensionRevision` no longer owns. A missing
/// object is not an error — tearing down is idempotent.
pub async fn teardown_phases(client: &Client, namespace: &str, phases: &[Phase]) -> Result<(), EngineError> {
    for phase in phases {
        for object in &phase.objects {
            teardown_one(client, namespace, phase, object).await?;
        }
    }
    Ok(())
}

async fn teardown_one(client: &Client, namespace: &str, phase: &Phase, object: &serde_json::Value) -> Result<(), EngineError> {
    let api_version = object
        .get("apiVersion")
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::PhaseValidationError {
            phase: phase.name.clone(),
            object: object.to_string(),
        })?;
    let kind = object
        .get("kind")
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::PhaseValidationError {
            phase: phase.name.clone(),
            object: object.to_string(),
        })?;
    let name = object
        .pointer("/metadata/name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::PhaseValidationError {
            phase: phase.name.clone(),
            object: object.to_string(),
        })?;

    let (group, version) = match api_version.split_once('/') {
        Some((g, v)) => (g, v),
        None => ("", api_version),
    };
    let plural = format!("{}s", kind.to_lowercase());
    let gvk = kube::core::GroupVersionKind {
        group: group.to_string(),
        version: version.to_string(),
        kind: kind.to_string(),
    };
    let api_resource = ApiResource::from_gvk_with_plural(&gvk, &plural);
    let api: Api<DynamicObject> = Api::namespaced_with(client.clone(), namespace, &api_resource);

    match api.delete(name, &DeleteParams::default()).await {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(ref response)) if response.code == 404 => Ok(()),
        Err(err) => Err(EngineError::Apply(err)),
    }
}

/// Whether `now - creation_timestamp` exceeds `progress_deadline`.
#[must_use]
pub fn progress_deadline_exceeded(age: Duration, progress_deadline: Duration) -> bool {
    age > progress_deadline
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
