// SPDX-License-Identifier: MIT

//! Common label and annotation constants used across reconcilers.
//!
//! This module defines standard Kubernetes labels and operator-specific
//! labels/annotations to ensure consistency across all resources created by,
//! or consulted by, the controller.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the tool managing a resource.
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of the application.
pub const K8S_NAME: &str = "app.kubernetes.io/name";

/// Standard label for a unique name identifying the instance of an application.
pub const K8S_INSTANCE: &str = "app.kubernetes.io/instance";

// ============================================================================
// Ownership labels (§4 "Ownership")
// ============================================================================

/// Label on a `ClusterExtensionRevision` naming the owning `ClusterExtension`.
///
/// Enables list-by-selector in addition to the controller ownerRef.
pub const OWNER_NAME_LABEL: &str = "olm.example.io/owner-name";

/// Label stamped on every object a revision applies, naming the owning CE.
pub const OWNER_LABEL: &str = "olm.example.io/owner";

// ============================================================================
// ClusterExtensionRevision identity annotations (§6)
// ============================================================================

/// Annotation carrying the resolved bundle name.
pub const ANNOTATION_BUNDLE_NAME: &str = "olm.example.io/bundle-name";

/// Annotation carrying the resolved bundle version.
pub const ANNOTATION_BUNDLE_VERSION: &str = "olm.example.io/bundle-version";

/// Annotation carrying the resolved bundle's content image reference.
pub const ANNOTATION_BUNDLE_REFERENCE: &str = "olm.example.io/bundle-reference";

/// Annotation carrying the package name the bundle belongs to.
pub const ANNOTATION_PACKAGE_NAME: &str = "olm.example.io/package-name";

/// Annotation carrying the install service account name.
pub const ANNOTATION_SERVICE_ACCOUNT_NAME: &str = "olm.example.io/service-account-name";

/// Annotation carrying the install service account namespace.
pub const ANNOTATION_SERVICE_ACCOUNT_NAMESPACE: &str = "olm.example.io/service-account-namespace";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer gating `ClusterExtension` deletion until the pipeline's registered
/// cleanup hooks have run.
pub const FINALIZER_CLUSTER_EXTENSION: &str = "olm.example.io/clusterextension-finalizer";

/// Teardown finalizer gating `ClusterExtensionRevision` deletion until the
/// revision engine releases owned cluster state.
pub const FINALIZER_REVISION_TEARDOWN: &str = "olm.example.io/revision-teardown-finalizer";
