// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn default_settings_have_sane_values() {
    let settings = Settings::default();
    assert_eq!(settings.error_requeue_interval, Duration::from_secs(ERROR_REQUEUE_DURATION_SECS));
    assert!(settings.kube_qps > 0.0);
    assert_eq!(settings.install_backend, InstallBackend::Revision);
}

#[test]
fn install_backend_parses_case_insensitively() {
    assert_eq!("release".parse::<InstallBackend>().unwrap(), InstallBackend::Release);
    assert_eq!("Revision".parse::<InstallBackend>().unwrap(), InstallBackend::Revision);
    assert!("bogus".parse::<InstallBackend>().is_err());
}

#[test]
fn env_minutes_parses_whole_minutes_as_seconds() {
    std::env::set_var("CLUSTEREXTENSION_TEST_MINUTES", "5");
    assert_eq!(env_minutes("CLUSTEREXTENSION_TEST_MINUTES"), Some(Duration::from_secs(300)));
    std::env::remove_var("CLUSTEREXTENSION_TEST_MINUTES");
}

#[test]
fn env_minutes_is_none_when_unset_or_unparsable() {
    assert_eq!(env_minutes("CLUSTEREXTENSION_DOES_NOT_EXIST"), None);
    std::env::set_var("CLUSTEREXTENSION_TEST_MINUTES_BAD", "not-a-number");
    assert_eq!(env_minutes("CLUSTEREXTENSION_TEST_MINUTES_BAD"), None);
    std::env::remove_var("CLUSTEREXTENSION_TEST_MINUTES_BAD");
}
