// SPDX-License-Identifier: MIT

//! Trait seams for collaborators this controller depends on but does not
//! implement: the package resolver algorithm, the image puller/cache, the
//! token-minting identity system, and the content manager that watches and
//! garbage-collects applied objects. Each is out of scope per the design;
//! only the shape the pipeline calls through is defined here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::revision_states::RevisionMetadata;

/// What the resolver is asked to find: a package request plus the bundle
/// currently installed, if any (used as a resolution hint/anchor).
#[derive(Clone, Debug)]
pub struct ResolveRequest {
    pub package_name: String,
    pub channels: Vec<String>,
    pub version: String,
    pub installed: Option<RevisionMetadata>,
}

/// Error returned by a [`Resolver`]. The pipeline only needs to distinguish
/// terminal (do-not-retry) failures from transient ones; [`crate::resolve_policy`]
/// decides what to do with a transient failure.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Policy rejected the request outright (e.g. blocked, invalid config);
    /// retrying will not help.
    #[error("resolution blocked: {reason}")]
    Terminal { reason: String },

    /// Catalog data unavailable, network failure, etc. — may succeed on retry.
    #[error(transparent)]
    Transient(#[from] anyhow::Error),
}

/// Resolves a package request against catalog content.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, request: &ResolveRequest) -> Result<ResolvedBundle, ResolveError>;
}

/// The outcome of a successful resolution.
#[derive(Clone, Debug)]
pub struct ResolvedBundle {
    pub bundle: RevisionMetadata,
    pub deprecation: Option<crate::deprecation::Deprecation>,
}

/// A read-only view over a pulled bundle's filesystem contents.
///
/// Opaque to the controller beyond the manifests it carries; only the
/// applier inspects anything past that.
pub trait ImageFilesystem: Send + Sync {
    fn image_ref(&self) -> &str;

    /// Unstructured manifests extracted from the bundle's filesystem content,
    /// applied by the engine in the order returned.
    fn objects(&self) -> &[serde_json::Value];
}

#[derive(Debug, Error)]
pub enum PullError {
    #[error("permission denied pulling {image_ref}: {source}")]
    Permission { image_ref: String, source: anyhow::Error },

    #[error(transparent)]
    Transient(#[from] anyhow::Error),
}

/// Pulls a content image into a virtual filesystem view, backed by an
/// on-disk cache shared across reconciles.
#[async_trait]
pub trait ImagePuller: Send + Sync {
    async fn pull(&self, image_ref: &str) -> Result<Box<dyn ImageFilesystem>, PullError>;
}

/// Mints a short-lived, scoped credential for a `(namespace, serviceAccount)`
/// identity. Implementations must not cache tokens past their advertised
/// lifetime; the controller caches the minted *client*, not the token.
#[async_trait]
pub trait TokenMinter: Send + Sync {
    async fn mint(&self, namespace: &str, service_account_name: &str) -> anyhow::Result<String>;
}

/// One entry in a release store's history for a given release name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReleaseHistoryEntry {
    pub state: String,
    pub labels: BTreeMap<String, String>,
}

/// Read/write access to the release-based backend's rollout history. `history`
/// is used by the release-log [`crate::revision_states::RevisionStatesGetter`]
/// variant; `record` is used by the release-based applier (C7a) to write a
/// single, replacement rollout record.
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    async fn history(&self, release_name: &str) -> anyhow::Result<Vec<ReleaseHistoryEntry>>;

    async fn record(&self, release_name: &str, entry: ReleaseHistoryEntry) -> anyhow::Result<()>;
}

/// Registers watches for objects an applier just wrote, and (out of scope)
/// garbage-collects objects that fall out of a bundle's manifest set.
#[async_trait]
pub trait ContentManager: Send + Sync {
    async fn watch_objects(&self, owner: &str, object_refs: &[String]) -> anyhow::Result<()>;
}
