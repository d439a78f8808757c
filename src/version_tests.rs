// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn empty_expression_is_valid() {
    assert!(validate_version_range("").is_ok());
}

#[test]
fn plain_version_is_valid() {
    assert!(validate_version_range("1.2.3").is_ok());
}

#[test]
fn comparators_are_accepted() {
    for expr in ["=1.2.3", "==1.2.3", "!=1.2.3", ">=1.2.3", "<=1.2.3", "=<1.2.3", "=>1.2.3", ">1.2.3", "<1.2.3", "~1.2.3", "~>1.2.3", "^1.2.3"] {
        assert!(validate_version_range(expr).is_ok(), "expected {expr} to be valid");
    }
}

#[test]
fn wildcards_in_minor_and_patch_are_accepted() {
    assert!(validate_version_range("1.x").is_ok());
    assert!(validate_version_range("1.2.*").is_ok());
    assert!(validate_version_range("1.X.X").is_ok());
}

#[test]
fn pre_release_and_metadata_are_accepted() {
    assert!(validate_version_range("1.2.3-alpha.1").is_ok());
    assert!(validate_version_range("1.2.3+build.5").is_ok());
    assert!(validate_version_range("1.2.3-rc.1+build.5").is_ok());
}

#[test]
fn leading_v_is_accepted() {
    assert!(validate_version_range("v1.2.3").is_ok());
    assert!(validate_version_range(">=v1.2.3").is_ok());
}

#[test]
fn whitespace_and_comma_combine_as_and() {
    assert!(validate_version_range(">=1.0.0, <2.0.0").is_ok());
    assert!(validate_version_range(">=1.0.0 <2.0.0").is_ok());
}

#[test]
fn double_pipe_combines_as_or() {
    assert!(validate_version_range("1.0.0 || 2.0.0").is_ok());
}

#[test]
fn hyphen_range_is_rejected() {
    assert!(validate_version_range("1.0.0 - 2.0.0").is_err());
}

#[test]
fn garbage_is_rejected() {
    assert!(validate_version_range("not-a-version").is_err());
    assert!(validate_version_range("1.2.3.4.5").is_err());
}

#[test]
fn too_long_expression_is_rejected() {
    let expr = "1".repeat(MAX_VERSION_LEN + 1);
    assert_eq!(
        validate_version_range(&expr),
        Err(VersionRangeError::TooLong {
            len: expr.len(),
            max: MAX_VERSION_LEN
        })
    );
}

#[test]
fn pinned_compares_trimmed_strings() {
    assert!(is_pinned(" 1.2.3 ", " 1.2.3 "));
    assert!(is_pinned("1.2.3", "1.2.3"));
    assert!(!is_pinned("1.2.3", "1.2.4"));
}

#[test]
fn range_expression_is_never_pinned_to_a_different_literal_string() {
    assert!(!is_pinned(">=1.0.0", "1.0.0"));
}

#[test]
fn range_expression_is_never_pinned_even_to_an_identical_string() {
    // A range is never "pinned" (§6 glossary), even if the installed
    // version happens to be recorded as the same range string.
    assert!(!is_pinned(">=1.0.0", ">=1.0.0"));
}

#[test]
fn plain_versions_are_not_range_expressions() {
    assert!(!is_range_expression("1.2.3"));
    assert!(!is_range_expression("v1.2.3"));
    assert!(!is_range_expression(""));
}

#[test]
fn comparators_make_a_range_expression() {
    for expr in [">=1.0.0", "<=1.0.0", "~1.0.0", "~>1.0.0", "^1.0.0", "=1.0.0"] {
        assert!(is_range_expression(expr), "expected {expr} to be a range expression");
    }
}

#[test]
fn wildcards_make_a_range_expression() {
    assert!(is_range_expression("1.x"));
    assert!(is_range_expression("1.2.*"));
}

#[test]
fn multiple_items_make_a_range_expression() {
    assert!(is_range_expression(">=1.0.0, <2.0.0"));
    assert!(is_range_expression("1.0.0 || 2.0.0"));
}
