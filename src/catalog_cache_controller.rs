// SPDX-License-Identifier: MIT

//! Catalog-Cache Reconciler (C10, §4.9).
//!
//! Reacts to `Catalog` events: populates the on-disk cache entry for a
//! catalog's resolved image ref once one appears, and evicts it when the
//! catalog is deleted. Unlike the CE/CER controllers this CRD's own status
//! (`status.resolvedSource`) is written by a separate, out-of-scope catalog
//! controller — this reconciler only ever reads it.

use std::sync::Arc;

use kube::runtime::controller::Action;
use kube::ResourceExt;

use crate::context::Context;
use crate::crd::Catalog;

/// What to do with the on-disk cache for one `Catalog` event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheAction {
    /// No resolved ref yet; wait for another event.
    Noop,
    /// Populate the cache entry for `image_ref`.
    Populate { image_ref: String },
    /// The catalog is gone; evict whatever entry it last resolved to.
    Evict { image_ref: String },
}

/// Pure decision: given a catalog's deletion state and resolved ref, what
/// should the cache do.
#[must_use]
pub fn decide(catalog: &Catalog) -> CacheAction {
    let image_ref = catalog.status.as_ref().and_then(|status| status.resolved_source.as_ref()).map(|rs| rs.image.image_ref.clone());

    match (catalog.metadata.deletion_timestamp.is_some(), image_ref) {
        (true, Some(image_ref)) if !image_ref.is_empty() => CacheAction::Evict { image_ref },
        (true, _) => CacheAction::Noop,
        (false, Some(image_ref)) if !image_ref.is_empty() => CacheAction::Populate { image_ref },
        (false, _) => CacheAction::Noop,
    }
}

pub async fn reconcile(catalog: Arc<Catalog>, ctx: Arc<Context>) -> anyhow::Result<Action> {
    let name = catalog.name_any();

    match decide(&catalog) {
        CacheAction::Noop => {}
        CacheAction::Populate { image_ref } => {
            ctx.catalog_cache.populate(&name, &image_ref).await?;
            tracing::debug!(catalog = %name, image_ref, "populated catalog cache entry");
        }
        CacheAction::Evict { image_ref } => {
            ctx.catalog_cache.evict(&name, &image_ref).await?;
            tracing::debug!(catalog = %name, image_ref, "evicted catalog cache entry");
        }
    }

    Ok(Action::requeue(ctx.settings.stable_requeue_interval))
}

#[cfg(test)]
#[path = "catalog_cache_controller_tests.rs"]
mod catalog_cache_controller_tests;
