//! Config file and environment overrides feeding CLI settings.

use std::fs;

use fanout_config::{ConfigError, FanoutConfig, MAX_CONCURRENT_ENV, ONLY_FIRST_N_ENV};
use tempfile::tempdir;

use crate::common::settings_with;

#[test]
fn file_values_fill_unset_flags() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[run]\nmax_concurrent = 4\nonly_first_n = 12\n\n[command]\ntimeout_secs = 5\n",
    )
    .unwrap();

    let config = FanoutConfig::load_from(&path).unwrap().unwrap();
    let settings = settings_with(&config, &["-n", "3", "--", "echo"]);
    assert_eq!(settings.max_concurrent, 4);
    assert_eq!(settings.only_first_n, Some(3));
    assert_eq!(
        settings.template.timeout().map(|timeout| timeout.as_secs()),
        Some(5)
    );
}

#[test]
fn environment_beats_file_and_flags_beat_environment() {
    let mut config =
        FanoutConfig::parse("[run]\nmax_concurrent = 4\nonly_first_n = 12\n").unwrap();
    config
        .apply_env_overrides(|name| match name {
            MAX_CONCURRENT_ENV => Some("6".to_string()),
            ONLY_FIRST_N_ENV => Some("2".to_string()),
            _ => None,
        })
        .unwrap();

    let from_env = settings_with(&config, &["--", "echo"]);
    assert_eq!(from_env.max_concurrent, 6);
    assert_eq!(from_env.only_first_n, Some(2));

    let from_flag = settings_with(&config, &["-j", "1", "--", "echo"]);
    assert_eq!(from_flag.max_concurrent, 1);
}

#[test]
fn broken_config_file_reports_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[run]\nmax_concurrent = \"many\"\n").unwrap();

    let err = FanoutConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), Some(path.as_path()));
}
