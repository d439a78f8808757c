// SPDX-License-Identifier: MIT

//! Deprecation Evaluator (C3).
//!
//! A pure function of `(installedBundleName, deprecation entries,
//! hasCatalogData, CE-declared channels)` that always produces all four
//! deprecation conditions, written through the idempotent condition writer
//! so repeated calls with equal inputs don't churn timestamps.

use crate::condition::set_condition;
use crate::crd::Condition;
use crate::reasons::{
    REASON_ABSENT, REASON_DEPRECATED, REASON_DEPRECATION_STATUS_UNKNOWN, REASON_NOT_DEPRECATED,
    TYPE_BUNDLE_DEPRECATED, TYPE_CHANNEL_DEPRECATED, TYPE_DEPRECATED, TYPE_PACKAGE_DEPRECATED,
};

const STATUS_TRUE: &str = "True";
const STATUS_FALSE: &str = "False";
const STATUS_UNKNOWN: &str = "Unknown";

/// The kind of thing a [`DeprecationEntry`] names as deprecated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeprecationSchema {
    Package,
    Channel,
    Bundle,
}

/// One deprecation entry surfaced by a catalog for a resolved package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeprecationEntry {
    pub schema: DeprecationSchema,
    pub name: String,
    pub message: String,
}

/// The full set of deprecation entries a catalog reports for a package.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deprecation {
    pub entries: Vec<DeprecationEntry>,
}

/// Evaluates and writes all four deprecation conditions onto `conditions`.
pub fn evaluate_deprecation(
    conditions: &mut Vec<Condition>,
    installed_bundle_name: Option<&str>,
    deprecation: Option<&Deprecation>,
    has_catalog_data: bool,
    ce_channels: &[String],
    observed_generation: i64,
) {
    if !has_catalog_data {
        set_condition(
            conditions,
            TYPE_PACKAGE_DEPRECATED,
            STATUS_UNKNOWN,
            REASON_DEPRECATION_STATUS_UNKNOWN,
            "",
            observed_generation,
        );
        set_condition(
            conditions,
            TYPE_CHANNEL_DEPRECATED,
            STATUS_UNKNOWN,
            REASON_DEPRECATION_STATUS_UNKNOWN,
            "",
            observed_generation,
        );
        let (bundle_reason, bundle_message) = if installed_bundle_name.is_some() {
            (REASON_DEPRECATION_STATUS_UNKNOWN, "")
        } else {
            (REASON_ABSENT, "no bundle installed yet")
        };
        set_condition(
            conditions,
            TYPE_BUNDLE_DEPRECATED,
            STATUS_UNKNOWN,
            bundle_reason,
            bundle_message,
            observed_generation,
        );
        set_condition(
            conditions,
            TYPE_DEPRECATED,
            STATUS_UNKNOWN,
            REASON_DEPRECATION_STATUS_UNKNOWN,
            "",
            observed_generation,
        );
        return;
    }

    let empty = Vec::new();
    let entries = deprecation.map_or(&empty, |d| &d.entries);

    let package_messages: Vec<&str> = entries
        .iter()
        .filter(|e| e.schema == DeprecationSchema::Package)
        .map(|e| e.message.as_str())
        .collect();
    let package_deprecated = !package_messages.is_empty();
    let package_message = package_messages.join("\n");

    let channel_messages: Vec<&str> = entries
        .iter()
        .filter(|e| e.schema == DeprecationSchema::Channel && ce_channels.iter().any(|c| c == &e.name))
        .map(|e| e.message.as_str())
        .collect();
    let channel_deprecated = !channel_messages.is_empty();
    let channel_message = channel_messages.join("\n");

    let (bundle_status, bundle_reason, bundle_message) = match installed_bundle_name {
        None => (STATUS_UNKNOWN, REASON_ABSENT, "no bundle installed yet".to_string()),
        Some(name) => {
            let bundle_messages: Vec<&str> = entries
                .iter()
                .filter(|e| e.schema == DeprecationSchema::Bundle && e.name == name)
                .map(|e| e.message.as_str())
                .collect();
            if bundle_messages.is_empty() {
                (STATUS_FALSE, REASON_NOT_DEPRECATED, String::new())
            } else {
                (STATUS_TRUE, REASON_DEPRECATED, bundle_messages.join("\n"))
            }
        }
    };
    let bundle_deprecated = bundle_status == STATUS_TRUE;

    set_condition(
        conditions,
        TYPE_PACKAGE_DEPRECATED,
        if package_deprecated { STATUS_TRUE } else { STATUS_FALSE },
        if package_deprecated { REASON_DEPRECATED } else { REASON_NOT_DEPRECATED },
        &package_message,
        observed_generation,
    );
    set_condition(
        conditions,
        TYPE_CHANNEL_DEPRECATED,
        if channel_deprecated { STATUS_TRUE } else { STATUS_FALSE },
        if channel_deprecated { REASON_DEPRECATED } else { REASON_NOT_DEPRECATED },
        &channel_message,
        observed_generation,
    );
    set_condition(
        conditions,
        TYPE_BUNDLE_DEPRECATED,
        bundle_status,
        bundle_reason,
        &bundle_message,
        observed_generation,
    );

    let deprecated = package_deprecated || channel_deprecated || bundle_deprecated;
    let deprecated_message = [package_message.as_str(), channel_message.as_str(), bundle_message.as_str()]
        .into_iter()
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    set_condition(
        conditions,
        TYPE_DEPRECATED,
        if deprecated { STATUS_TRUE } else { STATUS_FALSE },
        if deprecated { REASON_DEPRECATED } else { REASON_NOT_DEPRECATED },
        &deprecated_message,
        observed_generation,
    );
}

#[cfg(test)]
#[path = "deprecation_tests.rs"]
mod deprecation_tests;
