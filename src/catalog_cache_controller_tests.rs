// SPDX-License-Identifier: MIT

use super::*;
use crate::crd::{CatalogImageSource, CatalogSpec, CatalogStatus, ResolvedCatalogSource, ResolvedImageSource};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};

fn catalog(resolved_ref: Option<&str>, deleting: bool) -> Catalog {
    Catalog {
        metadata: ObjectMeta {
            name: Some("my-catalog".to_string()),
            deletion_timestamp: deleting.then(|| Time(chrono::Utc::now())),
            ..Default::default()
        },
        spec: CatalogSpec { source: CatalogImageSource { image_ref: "registry/catalog:latest".to_string() } },
        status: Some(CatalogStatus {
            conditions: vec![],
            resolved_source: resolved_ref.map(|image_ref| ResolvedCatalogSource {
                image: ResolvedImageSource { image_ref: image_ref.to_string() },
            }),
        }),
    }
}

#[test]
fn no_resolved_ref_is_noop() {
    assert_eq!(decide(&catalog(None, false)), CacheAction::Noop);
}

#[test]
fn resolved_ref_populates() {
    assert_eq!(
        decide(&catalog(Some("registry/catalog@sha256:aaa"), false)),
        CacheAction::Populate { image_ref: "registry/catalog@sha256:aaa".to_string() }
    );
}

#[test]
fn deletion_with_resolved_ref_evicts() {
    assert_eq!(
        decide(&catalog(Some("registry/catalog@sha256:aaa"), true)),
        CacheAction::Evict { image_ref: "registry/catalog@sha256:aaa".to_string() }
    );
}

#[test]
fn deletion_without_resolved_ref_is_noop() {
    assert_eq!(decide(&catalog(None, true)), CacheAction::Noop);
}
