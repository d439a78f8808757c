// SPDX-License-Identifier: MIT

//! Canonical condition `type` and `reason` strings (§7).

// ============================================================================
// ClusterExtension condition types
// ============================================================================

pub const TYPE_INSTALLED: &str = "Installed";
pub const TYPE_PROGRESSING: &str = "Progressing";
pub const TYPE_DEPRECATED: &str = "Deprecated";
pub const TYPE_PACKAGE_DEPRECATED: &str = "PackageDeprecated";
pub const TYPE_CHANNEL_DEPRECATED: &str = "ChannelDeprecated";
pub const TYPE_BUNDLE_DEPRECATED: &str = "BundleDeprecated";

// ============================================================================
// ClusterExtensionRevision condition types
// ============================================================================

pub const TYPE_AVAILABLE: &str = "Available";
pub const TYPE_SUCCEEDED: &str = "Succeeded";
pub const TYPE_IN_TRANSITION: &str = "InTransition";

// ============================================================================
// Reasons
// ============================================================================

pub const REASON_SUCCEEDED: &str = "Succeeded";
pub const REASON_FAILED: &str = "Failed";
pub const REASON_RETRYING: &str = "Retrying";
pub const REASON_BLOCKED: &str = "Blocked";
pub const REASON_ROLLING_OUT: &str = "RollingOut";
pub const REASON_ROLLOUT_IN_PROGRESS: &str = "RolloutInProgress";
pub const REASON_INSTALLING: &str = "Installing";
pub const REASON_UPGRADING: &str = "Upgrading";
pub const REASON_ABSENT: &str = "Absent";
pub const REASON_DEPRECATED: &str = "Deprecated";
pub const REASON_NOT_DEPRECATED: &str = "NotDeprecated";
pub const REASON_DEPRECATION_STATUS_UNKNOWN: &str = "DeprecationStatusUnknown";
pub const REASON_PROGRESS_DEADLINE_EXCEEDED: &str = "ProgressDeadlineExceeded";
pub const REASON_SERVICE_ACCOUNT_NOT_FOUND: &str = "ServiceAccountNotFound";

/// CER-only reasons.
pub const REASON_PROBES_SUCCEEDED: &str = "ProbesSucceeded";
pub const REASON_PROBE_FAILURE: &str = "ProbeFailure";
pub const REASON_ARCHIVED: &str = "Archived";
pub const REASON_RECONCILING: &str = "Reconciling";
pub const REASON_ROLLOUT_SUCCESS: &str = "RolloutSuccess";
