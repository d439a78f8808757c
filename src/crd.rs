// SPDX-License-Identifier: MIT

//! Custom Resource Definitions for the operator-lifecycle controller.
//!
//! # Resource Types
//!
//! - [`ClusterExtension`] — user-declared intent to install one package from a
//!   catalog into a namespace with a service-account identity.
//! - [`ClusterExtensionRevision`] — one immutable rollout attempt of a bundle,
//!   owned by a `ClusterExtension`.
//! - [`Catalog`] — a cluster-scoped source of bundles, addressable by label
//!   selector, that produces a resolved content image reference at runtime.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label selector to match Kubernetes resources.
///
/// An empty selector matches all objects.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Map of {key,value} pairs, ANDed together.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,
}

impl LabelSelector {
    /// An empty selector matches every object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.match_labels.as_ref().is_none_or(BTreeMap::is_empty)
    }
}

/// A Kubernetes-convention status condition.
///
/// `observedGeneration` lets consumers tell whether a condition reflects the
/// most recently observed spec generation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition, e.g. "Installed", "Progressing", "Available".
    pub r#type: String,

    /// Status of the condition: "True", "False", or "Unknown".
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    pub reason: String,

    /// Human-readable message with details about the transition.
    #[serde(default)]
    pub message: String,

    /// Last time the condition transitioned from one status to another (RFC3339).
    pub last_transition_time: String,

    /// `metadata.generation` this condition was computed against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

// ============================================================================
// ClusterExtension
// ============================================================================

/// Declares that one specific package from a catalog should be installed
/// cluster-wide under the given namespace/service-account identity.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "olm.example.io",
    version = "v1",
    kind = "ClusterExtension",
    shortname = "clext",
    shortname = "clexts",
    doc = "ClusterExtension declares intent to install one package from a catalog, cluster-wide.",
    printcolumn = r#"{"name":"Package","type":"string","jsonPath":".spec.source.catalog.packageName"}"#,
    printcolumn = r#"{"name":"Installed","type":"string","jsonPath":".status.conditions[?(@.type=='Installed')].status"}"#,
    printcolumn = r#"{"name":"Progressing","type":"string","jsonPath":".status.conditions[?(@.type=='Progressing')].status"}"#
)]
#[kube(status = "ClusterExtensionStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionSpec {
    /// Where the installed content comes from.
    pub source: ClusterExtensionSource,

    /// Target namespace and identity used to install the resolved content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<ClusterExtensionInstall>,

    /// Optional inline configuration values passed through to the content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ClusterExtensionConfig>,
}

/// Source descriptor: `{sourceType, catalog}`.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionSource {
    /// Only `"Catalog"` is currently accepted.
    pub source_type: String,

    /// Catalog-backed package request. Required when `sourceType == "Catalog"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogSource>,
}

/// A catalog-backed package request.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSource {
    /// DNS-1123 subdomain, ≤253 chars.
    pub package_name: String,

    /// Declared channels to resolve against; each a DNS-1123 subdomain, ≤253 chars.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,

    /// Empty, or a recognized version-range expression, ≤64 chars.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Restricts which `Catalog` objects are considered. Empty/absent = any catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
}

/// Install target: namespace plus the identity used to apply content.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionInstall {
    /// DNS-1123 label, ≤63 chars.
    pub namespace: String,

    /// Identity used to mint a scoped client for applying content.
    pub service_account: ServiceAccountReference,

    /// Required whenever `install` is present; enforced by validation, not
    /// the type, since CRD schemas admit objects an external webhook rejects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preflight: Option<Preflight>,
}

/// Reference to the `ServiceAccount` used to install content.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountReference {
    /// DNS-1123 subdomain, ≤253 chars.
    pub name: String,
}

/// Preflight checks run before applying content.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Preflight {
    /// CRD-upgrade-safety preflight check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crd_upgrade_safety: Option<CrdUpgradeSafety>,
}

/// Enforcement policy for the CRD-upgrade-safety preflight check.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrdUpgradeSafety {
    /// e.g. "Strict" or "None".
    pub enforcement: String,
}

/// Inline configuration passed through to the content, e.g. a Helm `values`-like object.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionConfig {
    /// A non-empty JSON object.
    pub inline: serde_json::Map<String, serde_json::Value>,
}

/// Status of a `ClusterExtension`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionStatus {
    /// Always contains the six canonical condition types after a reconcile
    /// (`Installed`, `Progressing`, `Deprecated`, `PackageDeprecated`,
    /// `ChannelDeprecated`, `BundleDeprecated`).
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// The bundle currently considered installed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallStatus>,
}

/// Identity of the bundle a `ClusterExtension` or `ClusterExtensionRevision` refers to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    /// Bundle name, e.g. `"prometheus.v1.0.0"`.
    pub name: String,

    /// Bundle version, e.g. `"1.0.0"`.
    pub version: String,
}

/// `{bundle, ...}` envelope recorded on `ClusterExtensionStatus.install`.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallStatus {
    /// Installed bundle identity.
    pub bundle: BundleMetadata,
}

// ============================================================================
// ClusterExtensionRevision
// ============================================================================

/// One immutable rollout attempt of a bundle, owned by exactly one `ClusterExtension`.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "olm.example.io",
    version = "v1",
    kind = "ClusterExtensionRevision",
    shortname = "cer",
    shortname = "cers",
    doc = "ClusterExtensionRevision is one immutable rollout attempt of a bundle, owned by a ClusterExtension.",
    printcolumn = r#"{"name":"Revision","type":"integer","jsonPath":".spec.revision"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".spec.lifecycleState"}"#,
    printcolumn = r#"{"name":"Succeeded","type":"string","jsonPath":".status.conditions[?(@.type=='Succeeded')].status"}"#
)]
#[kube(status = "ClusterExtensionRevisionStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionRevisionSpec {
    /// Monotonically increasing within the owning `ClusterExtension`.
    pub revision: i64,

    /// Active, Paused, or Archived.
    pub lifecycle_state: LifecycleState,

    /// Ordered phases of objects to apply.
    #[serde(default)]
    pub phases: Vec<Phase>,

    /// Older active/paused revisions this one supersedes.
    #[serde(default)]
    pub previous: Vec<PreviousRevisionRef>,

    /// Wall-clock budget, in minutes, before an in-transition revision is
    /// reported as having exceeded its progress deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_deadline_minutes: Option<i64>,
}

/// Lifecycle state of a `ClusterExtensionRevision`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum LifecycleState {
    /// The engine actively reconciles this revision's objects toward healthy.
    Active,
    /// The engine reports state but does not converge objects.
    Paused,
    /// The engine tears down this revision's objects; never reconciled forward.
    Archived,
}

/// An ordered group of objects applied together.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Phase name, used in probe-failure messages.
    pub name: String,

    /// Unstructured manifests belonging to this phase.
    #[serde(default)]
    pub objects: Vec<serde_json::Value>,
}

/// Reference to an older revision this one supersedes.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviousRevisionRef {
    /// Name of the older `ClusterExtensionRevision`.
    pub name: String,

    /// UID of the older `ClusterExtensionRevision`, for owner-safe patching.
    pub uid: String,
}

/// Status of a `ClusterExtensionRevision`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterExtensionRevisionStatus {
    /// Carries `Available`, `Progressing`, `Succeeded`, and optionally `InTransition`.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

// ============================================================================
// Catalog
// ============================================================================

/// A cluster-scoped source of bundles, addressable by label selector.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "olm.example.io",
    version = "v1",
    kind = "Catalog",
    shortname = "catalog",
    shortname = "catalogs",
    doc = "Catalog is a cluster-scoped source of bundles."
)]
#[kube(status = "CatalogStatus")]
#[serde(rename_all = "camelCase")]
pub struct CatalogSpec {
    /// Where the catalog's content image comes from.
    pub source: CatalogImageSource,
}

/// Declared (unresolved) image source for a catalog.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogImageSource {
    /// Content image reference, possibly a tag that still needs resolving to a digest.
    #[serde(rename = "ref")]
    pub image_ref: String,
}

/// Status of a `Catalog`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Set once the declared source has been resolved to a concrete reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_source: Option<ResolvedCatalogSource>,
}

/// The concrete, resolved source of a catalog's content.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCatalogSource {
    pub image: ResolvedImageSource,
}

/// The resolved image reference backing a catalog.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedImageSource {
    #[serde(rename = "ref")]
    pub image_ref: String,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
