// SPDX-License-Identifier: MIT

//! CE admission validation (§6): DNS-1123 shape checks plus the
//! cross-field rules a `ClusterExtension` must satisfy before a reconcile
//! ever sees it.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::constants::{
    MAX_CHANNEL_NAME_LEN, MAX_NAMESPACE_LEN, MAX_PACKAGE_NAME_LEN, MAX_SERVICE_ACCOUNT_NAME_LEN,
};
use crate::crd::ClusterExtensionSpec;
use crate::version::{validate_version_range, VersionRangeError};

static DNS_1123_SUBDOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9.]*[a-z0-9])?$").expect("static DNS-1123 subdomain regex is valid")
});

static DNS_1123_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("static DNS-1123 label regex is valid")
});

/// Errors a `ClusterExtension` spec can fail admission with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("source.sourceType must be \"Catalog\"")]
    UnsupportedSourceType,

    #[error("source.catalog is required when sourceType is \"Catalog\"")]
    MissingCatalogSource,

    #[error("source.catalog.packageName is required")]
    MissingPackageName,

    #[error("source.catalog.packageName is not a valid DNS-1123 subdomain, or exceeds {MAX_PACKAGE_NAME_LEN} characters: {0:?}")]
    InvalidPackageName(String),

    #[error("source.catalog.channels[{index}] is not a valid DNS-1123 subdomain, or exceeds {MAX_CHANNEL_NAME_LEN} characters: {value:?}")]
    InvalidChannelName { index: usize, value: String },

    #[error("source.catalog.version is invalid: {0}")]
    InvalidVersion(#[from] VersionRangeError),

    #[error("install.namespace is not a valid DNS-1123 label, or exceeds {MAX_NAMESPACE_LEN} characters: {0:?}")]
    InvalidNamespace(String),

    #[error("install.serviceAccount.name is not a valid DNS-1123 subdomain, or exceeds {MAX_SERVICE_ACCOUNT_NAME_LEN} characters: {0:?}")]
    InvalidServiceAccountName(String),

    #[error("install.preflight is required when install is set")]
    MissingPreflight,

    #[error("config.inline must have at least one property")]
    EmptyInlineConfig,
}

fn is_dns_1123_subdomain(value: &str, max_len: usize) -> bool {
    !value.is_empty() && value.len() <= max_len && DNS_1123_SUBDOMAIN_RE.is_match(value)
}

fn is_dns_1123_label(value: &str, max_len: usize) -> bool {
    !value.is_empty() && value.len() <= max_len && DNS_1123_LABEL_RE.is_match(value)
}

/// Validates a `ClusterExtensionSpec` against the admission rules in §6.
///
/// This mirrors what a CRD's OpenAPI schema and any admission webhook would
/// reject before the object ever reaches a reconcile; the controller itself
/// also runs it defensively since nothing guarantees those gates are wired
/// up in every deployment.
pub fn validate_cluster_extension_spec(spec: &ClusterExtensionSpec) -> Result<(), ValidationError> {
    if spec.source.source_type != "Catalog" {
        return Err(ValidationError::UnsupportedSourceType);
    }
    let catalog = spec
        .source
        .catalog
        .as_ref()
        .ok_or(ValidationError::MissingCatalogSource)?;

    if catalog.package_name.is_empty() {
        return Err(ValidationError::MissingPackageName);
    }
    if !is_dns_1123_subdomain(&catalog.package_name, MAX_PACKAGE_NAME_LEN) {
        return Err(ValidationError::InvalidPackageName(catalog.package_name.clone()));
    }
    for (index, channel) in catalog.channels.iter().enumerate() {
        if !is_dns_1123_subdomain(channel, MAX_CHANNEL_NAME_LEN) {
            return Err(ValidationError::InvalidChannelName {
                index,
                value: channel.clone(),
            });
        }
    }
    validate_version_range(&catalog.version)?;

    if let Some(install) = &spec.install {
        if !is_dns_1123_label(&install.namespace, MAX_NAMESPACE_LEN) {
            return Err(ValidationError::InvalidNamespace(install.namespace.clone()));
        }
        if !is_dns_1123_subdomain(&install.service_account.name, MAX_SERVICE_ACCOUNT_NAME_LEN) {
            return Err(ValidationError::InvalidServiceAccountName(
                install.service_account.name.clone(),
            ));
        }
        if install.preflight.is_none() {
            return Err(ValidationError::MissingPreflight);
        }
    }

    if let Some(config) = &spec.config {
        if config.inline.is_empty() {
            return Err(ValidationError::EmptyInlineConfig);
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
