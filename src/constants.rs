// SPDX-License-Identifier: MIT

//! Global constants for the clusterextension operator.
//!
//! This module contains all numeric and string constants used throughout the
//! codebase. Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all operator CRDs
pub const API_GROUP: &str = "olm.example.io";

/// API version for all operator CRDs
pub const API_VERSION: &str = "v1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "olm.example.io/v1";

/// Kind name for `ClusterExtension` resource
pub const KIND_CLUSTER_EXTENSION: &str = "ClusterExtension";

/// Kind name for `ClusterExtensionRevision` resource
pub const KIND_CLUSTER_EXTENSION_REVISION: &str = "ClusterExtensionRevision";

/// Kind name for `Catalog` resource
pub const KIND_CATALOG: &str = "Catalog";

// ============================================================================
// Condition Writer Constants (C1)
// ============================================================================

/// Maximum byte length of a condition message before truncation.
pub const MAX_CONDITION_MESSAGE_BYTES: usize = 32_768;

/// Suffix appended to a truncated condition message.
pub const TRUNCATION_SUFFIX: &str = "\n\n... [message truncated]";

// ============================================================================
// Validation Constants
// ============================================================================

/// Maximum length of `source.catalog.packageName`.
pub const MAX_PACKAGE_NAME_LEN: usize = 253;

/// Maximum length of `source.catalog.version`.
pub const MAX_VERSION_LEN: usize = 64;

/// Maximum length of a single `source.catalog.channels[i]` entry.
pub const MAX_CHANNEL_NAME_LEN: usize = 253;

/// Maximum length of `install.namespace` (a DNS-1123 label).
pub const MAX_NAMESPACE_LEN: usize = 63;

/// Maximum length of `install.serviceAccount.name`.
pub const MAX_SERVICE_ACCOUNT_NAME_LEN: usize = 253;

// ============================================================================
// Engine / Progress Constants (C7b, C8)
// ============================================================================

/// Flat requeue interval after a probe or validation error on a CER.
pub const PROBE_VALIDATION_REQUEUE_SECS: u64 = 10;

/// Default progress deadline applied to a CER when the spec omits one.
pub const DEFAULT_PROGRESS_DEADLINE_MINUTES: i64 = 10;

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors.
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration while a resolution/apply error is being retried.
pub const RETRYING_REQUEUE_SECS: u64 = 15;

/// Requeue interval used while a rollout is actively progressing.
pub const ROLLING_OUT_REQUEUE_SECS: u64 = 5;

/// Requeue interval once a CE/CER has reached a stable, succeeded state.
pub const STABLE_REQUEUE_SECS: u64 = 300;

// ============================================================================
// Leader Election Constants
// ============================================================================

/// Default leader election lease duration.
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;

/// Default leader election renew deadline.
pub const DEFAULT_LEASE_RENEW_DEADLINE_SECS: u64 = 10;

/// Default leader election retry period.
pub const DEFAULT_LEASE_RETRY_PERIOD_SECS: u64 = 2;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for the Tokio runtime.
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for the Prometheus metrics HTTP server.
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for the Prometheus metrics endpoint.
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for the metrics HTTP server.
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
