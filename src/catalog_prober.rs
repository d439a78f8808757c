// SPDX-License-Identifier: MIT

//! Catalog-Existence Prober (C4).
//!
//! Reports whether any `Catalog` matching a CE's label selector exists,
//! treating "the Catalog kind isn't registered" (the catalog controller
//! isn't installed in this cluster) as "no catalogs" rather than an error.

use kube::api::ListParams;
use kube::{Api, Client};
use thiserror::Error;

use crate::crd::{Catalog, LabelSelector};

#[derive(Debug, Error)]
pub enum CatalogProbeError {
    #[error("listing catalogs: {0}")]
    Api(#[from] kube::Error),
}

fn label_selector_string(selector: &LabelSelector) -> Option<String> {
    let match_labels = selector.match_labels.as_ref()?;
    if match_labels.is_empty() {
        return None;
    }
    Some(
        match_labels
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// `true` iff a list of `Catalog` objects restricted to `selector` (or
/// unrestricted, when the selector is empty/absent) returns at least one
/// result.
pub async fn catalog_exists(client: &Client, selector: &LabelSelector) -> Result<bool, CatalogProbeError> {
    let api: Api<Catalog> = Api::all(client.clone());
    let mut params = ListParams::default().limit(1);
    if let Some(label_selector) = label_selector_string(selector) {
        params = params.labels(&label_selector);
    }

    match api.list(&params).await {
        Ok(list) => Ok(!list.items.is_empty()),
        Err(kube::Error::Api(ref response)) if response.code == 404 => Ok(false),
        Err(err) => Err(CatalogProbeError::Api(err)),
    }
}

#[cfg(test)]
#[path = "catalog_prober_tests.rs"]
mod catalog_prober_tests;
