// SPDX-License-Identifier: MIT

//! Applier (C7a / C7b): the step that takes a resolved bundle and makes it
//! live in the cluster.
//!
//! Two backends share one contract (§9: "tagged variants behind a common
//! Applier ... selected at wiring time by a feature flag"):
//!
//! - [`release::ReleaseApplier`] writes a single, replacement rollout record.
//! - [`revision::RevisionApplier`] creates a new, immutable
//!   `ClusterExtensionRevision` and leaves convergence to the revision engine.

pub mod release;
pub mod revision;

use async_trait::async_trait;
use thiserror::Error;

use crate::context::Context;
use crate::crd::ClusterExtension;
use crate::external::{ImageFilesystem, ResolvedBundle};

/// Outcome of an apply attempt, backend-agnostic.
#[derive(Clone, Debug, Default)]
pub struct ApplyOutcome {
    /// True only when the resulting installed state equals the desired bundle.
    pub rollout_succeeded: bool,

    /// Human-readable detail, e.g. a probe-failure or rolling-out message.
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApplyError {
    /// There is no way to recover without a human fixing the identity/RBAC;
    /// propagated unchanged so the pipeline can surface it.
    #[error("permission denied applying bundle: {0}")]
    Permission(#[source] anyhow::Error),

    #[error(transparent)]
    Transient(#[from] anyhow::Error),
}

/// Applies a resolved bundle, backend-specific in how but not in contract.
#[async_trait]
pub trait Applier: Send + Sync {
    /// `image_fs` is `None` when the resolved bundle is identical to the
    /// installed one (§4.5 step 4): the applier is expected to reuse existing
    /// content rather than re-apply it.
    async fn apply(
        &self,
        ctx: &Context,
        ce: &ClusterExtension,
        resolved: &ResolvedBundle,
        image_fs: Option<&dyn ImageFilesystem>,
    ) -> Result<ApplyOutcome, ApplyError>;
}
