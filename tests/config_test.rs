// tests/config_test.rs
use git_deploy::config::{load_config, Config, CONFIG_FILE_NAME};
use git_deploy::release::ReleaseSettings;
use git_deploy::DeployError;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(toml_content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_from_file() {
    let temp_file = write_config(
        r##"
[release]
branches = ["trunk"]
remote = "upstream"
tag_prefix = "release-"

[changelog]
width = 100
heading = "# {tag} ({date})"
entry = "* {subject} by {author}"
date_format = "%Y-%m-%d"

[publish]
enabled = false
program = "gh-enterprise"
"##,
    );

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.release.branches, vec!["trunk"]);
    assert_eq!(config.release.remote, "upstream");
    assert_eq!(config.release.tag_prefix, "release-");
    assert_eq!(config.changelog.width, 100);
    assert_eq!(config.changelog.date_format, "%Y-%m-%d");
    assert!(!config.publish.enabled);
    assert_eq!(config.publish.program, "gh-enterprise");

    let settings = ReleaseSettings::from_config(&config);
    assert_eq!(settings.release_branches, vec!["trunk"]);
    assert_eq!(settings.render_width, 100);
    assert!(!settings.publish);
}

#[test]
fn test_empty_file_uses_defaults() {
    let temp_file = write_config("");
    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_unknown_placeholder_rejected() {
    let temp_file = write_config("[changelog]\nheading = \"## {version}\"\n");
    let result = load_config(Some(temp_file.path().to_str().unwrap()));

    let err = result.unwrap_err();
    assert!(matches!(err, DeployError::Config(_)));
    assert!(err.to_string().contains("{version}"));
}

#[test]
fn test_bad_date_format_rejected() {
    let temp_file = write_config("[changelog]\ndate_format = \"%Q\"\n");
    assert!(load_config(Some(temp_file.path().to_str().unwrap())).is_err());
}

#[test]
fn test_wrong_value_type_rejected() {
    let temp_file = write_config("[publish]\nenabled = \"sometimes\"\n");
    let result = load_config(Some(temp_file.path().to_str().unwrap()));
    assert!(matches!(result, Err(DeployError::Config(_))));
}

#[test]
#[serial]
fn test_working_directory_file_is_found() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[release]\nremote = \"mirror\"\n",
    )
    .unwrap();

    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();
    let result = load_config(None);
    env::set_current_dir(previous).unwrap();

    assert_eq!(result.unwrap().release.remote, "mirror");
}
