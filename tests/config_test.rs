// tests/config_test.rs
use release_train::config::{load_config, Config};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.remote, "origin");
    assert_eq!(config.manifest, PathBuf::from("package.json"));
    assert_eq!(config.labels.major, vec!["major".to_string()]);
    assert_eq!(config.labels.minor, vec!["minor".to_string()]);
    assert_eq!(config.labels.patch, vec!["patch".to_string()]);
    assert_eq!(
        config.messages.bump("1.2.5", "main"),
        "chore: bump version to 1.2.5 for main"
    );
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
remote = "upstream"
manifest = "packages/app/package.json"

[labels]
minor = ["minor", "feature"]

[messages]
bump = "release: {version} on {branch}"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.remote, "upstream");
    assert_eq!(config.manifest, PathBuf::from("packages/app/package.json"));
    assert_eq!(
        config.labels.minor,
        vec!["minor".to_string(), "feature".to_string()]
    );
    // Unset tiers keep their defaults
    assert_eq!(config.labels.major, vec!["major".to_string()]);
    assert_eq!(config.messages.bump("2.0.0", "main"), "release: 2.0.0 on main");
    assert_eq!(
        config.messages.sync("main", "beta", "2.0.0"),
        "chore: sync main into beta (2.0.0)"
    );
}

#[test]
fn test_git_identity_can_be_disabled() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[git]\nuser_name = \"\"\n")
        .unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.git.identity(), None);
    assert!(Config::default().git.identity().is_some());
}

#[test]
fn test_invalid_config_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"remote = [not toml").unwrap();
    temp_file.flush().unwrap();

    let result = load_config(Some(temp_file.path().to_str().unwrap()));
    assert!(result.is_err());
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let result = load_config(Some("/nonexistent/releasetrain.toml"));
    assert!(result.is_err());
}
