// SPDX-License-Identifier: MIT

//! Version-range grammar validation and pin-equality checks (§6).
//!
//! The actual resolution of a range against catalog bundle versions is the
//! external resolver's job; this module only validates that a requested
//! range is syntactically well-formed, and decides whether a requested
//! version string is "pinned" to an installed one.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::MAX_VERSION_LEN;

/// A single comparator + version-core item, e.g. `">=1.2.x"` or `"1.0.0"`.
static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^
        (==|!=|=>|>=|=<|<=|~>|~|\^|=|<|>)?  # optional comparator
        \s*
        v?                                    # optional leading v
        (?:\d+|[xX*])                         # major
        (?:\.(?:\d+|[xX*]))?                  # minor
        (?:\.(?:\d+|[xX*]))?                  # patch
        (?:-[0-9A-Za-z.-]+)?                  # pre-release
        (?:\+[0-9A-Za-z.-]+)?                 # build metadata
        $
        ",
    )
    .expect("static version item regex is valid")
});

/// Leading comparator on a single version-range item (§6's operator set).
static LEADING_COMPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(==|!=|=>|>=|=<|<=|~>|~|\^|=|<|>)").expect("static comparator regex is valid"));

/// A token that separates OR-groups (`||`) or AND-joined items (`,` / whitespace)
/// splits cleanly; a literal hyphen-range token like `"-"` never matches
/// [`ITEM_RE`] and is rejected by construction.
fn split_or_groups(expr: &str) -> Vec<&str> {
    expr.split("||").collect()
}

fn split_and_items(group: &str) -> Vec<&str> {
    group
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Validates a `source.catalog.version` expression against the recognized
/// grammar. Empty strings are valid (no version constraint).
pub fn validate_version_range(expr: &str) -> Result<(), VersionRangeError> {
    if expr.is_empty() {
        return Ok(());
    }
    if expr.len() > MAX_VERSION_LEN {
        return Err(VersionRangeError::TooLong {
            len: expr.len(),
            max: MAX_VERSION_LEN,
        });
    }
    for group in split_or_groups(expr) {
        let items = split_and_items(group);
        if items.is_empty() {
            return Err(VersionRangeError::Malformed {
                expr: expr.to_string(),
            });
        }
        for item in items {
            if !ITEM_RE.is_match(item) {
                return Err(VersionRangeError::Malformed {
                    expr: expr.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Error returned by [`validate_version_range`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VersionRangeError {
    #[error("version expression exceeds max length: {len} > {max}")]
    TooLong { len: usize, max: usize },

    #[error("version expression does not match the recognized grammar: {expr:?}")]
    Malformed { expr: String },
}

/// True when `expr` is a version *range* rather than a single literal
/// version: more than one OR/AND-joined item, an explicit comparator
/// (`{=, ==, !=, =>, >=, =<, <=, >, <, ~, ~>, ^}`), or a wildcard `x`/`X`/`*`
/// component. A range is never "pinned" (§6 glossary), even one that
/// currently resolves to a single version.
#[must_use]
pub fn is_range_expression(expr: &str) -> bool {
    let expr = expr.trim();
    if expr.is_empty() {
        return false;
    }
    let groups = split_or_groups(expr);
    if groups.len() > 1 {
        return true;
    }
    let items = split_and_items(groups[0]);
    if items.len() != 1 {
        return true;
    }
    let item = items[0];
    LEADING_COMPARATOR_RE.is_match(item) || item.contains(['x', 'X', '*'])
}

/// A requested version is "pinned" when, after trimming whitespace from both
/// sides, it is exactly equal to the installed version string AND contains
/// no range operator — a range expression (even one resolving to a single
/// version) is never pinned, regardless of string equality.
#[must_use]
pub fn is_pinned(requested: &str, installed: &str) -> bool {
    let requested = requested.trim();
    requested == installed.trim() && !is_range_expression(requested)
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod version_tests;
