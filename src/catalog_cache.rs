// SPDX-License-Identifier: MIT

//! On-disk Catalog Content Cache (C10, §4.9).
//!
//! Tracks, per `(catalogName, ref)` pair, a marker that a resolved bundle
//! image is still referenced by at least one `ClusterExtension`. Populated
//! when a CE's `status.resolvedSource.image.ref` newly resolves against a
//! catalog, evicted when it changes away — a no-op in both directions when
//! the ref is empty, since nothing has resolved yet.

use std::path::PathBuf;

use tokio::fs;

/// Cache directory layout rooted at `base_dir`.
#[derive(Clone, Debug)]
pub struct CatalogCache {
    base_dir: PathBuf,
}

impl CatalogCache {
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    /// Marks `(catalog_name, image_ref)` as referenced. No-op when
    /// `image_ref` is empty.
    pub async fn populate(&self, catalog_name: &str, image_ref: &str) -> std::io::Result<()> {
        let Some(path) = self.entry_path(catalog_name, image_ref) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, []).await
    }

    /// Removes the marker for `(catalog_name, image_ref)`, if present.
    /// No-op when `image_ref` is empty.
    pub async fn evict(&self, catalog_name: &str, image_ref: &str) -> std::io::Result<()> {
        let Some(path) = self.entry_path(catalog_name, image_ref) else {
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn entry_path(&self, catalog_name: &str, image_ref: &str) -> Option<PathBuf> {
        cache_key(catalog_name, image_ref).map(|key| self.base_dir.join(key))
    }
}

/// Filesystem-safe key for `(catalog_name, image_ref)`, or `None` when
/// `image_ref` is empty (nothing has resolved yet, so there's nothing to
/// cache).
#[must_use]
pub fn cache_key(catalog_name: &str, image_ref: &str) -> Option<String> {
    if image_ref.is_empty() {
        return None;
    }
    Some(format!("{}_{}", sanitize(catalog_name), sanitize(image_ref)))
}

fn sanitize(s: &str) -> String {
    s.chars().map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' }).collect()
}

#[cfg(test)]
#[path = "catalog_cache_tests.rs"]
mod catalog_cache_tests;
