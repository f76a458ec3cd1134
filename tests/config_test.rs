//! Integration tests for Settings loading with layered precedence.
//!
//! Every layer is given explicitly (temp directories, an in-memory
//! environment), so the developer's own config and `PFWGEN_*` variables
//! do not leak in.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use pfwgen::application::{ApplicationError, Layout, OutputFormat};
use pfwgen::config::{env_source, local_config_path, Settings};

fn env_of(pairs: &[(&str, &str)]) -> config::Environment {
    let map: config::Map<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    env_source().source(Some(map))
}

fn load_local(dir: &Path) -> Result<Settings, ApplicationError> {
    Settings::load_from(None, Some(dir), env_of(&[]))
}

#[test]
fn given_no_local_config_when_load_then_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();

    // Act
    let settings = load_local(dir.path()).expect("load settings");

    // Assert
    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_config_when_load_then_specified_keys_override_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "layout = \"indented\"\nindent = \"\\t\"\n",
    )
    .unwrap();

    // Act
    let settings = load_local(dir.path()).expect("load settings");

    // Assert
    assert_eq!(settings.layout, Layout::Indented);
    assert_eq!(settings.indent, "\t");
    assert_eq!(settings.format, OutputFormat::Script, "unspecified key keeps default");
    assert!(!settings.verbose);
}

#[test]
fn given_unknown_layout_when_load_then_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "layout = \"spiral\"\n").unwrap();

    // Act
    let result = load_local(dir.path());

    // Assert
    match result {
        Err(ApplicationError::Config { message }) => {
            assert!(message.contains(".pfwgen.toml"), "{message}")
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn given_global_and_local_config_when_load_then_local_wins() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global_path = global_dir.path().join("pfwgen.toml");
    fs::write(&global_path, "format = \"xml\"\nlayout = \"indented\"\n").unwrap();
    let local_dir = TempDir::new().unwrap();
    fs::write(local_config_path(local_dir.path()), "layout = \"flat\"\n").unwrap();

    // Act
    let settings =
        Settings::load_from(Some(global_path.as_path()), Some(local_dir.path()), env_of(&[]))
            .expect("load settings");

    // Assert
    assert_eq!(settings.format, OutputFormat::Xml, "global layer applies");
    assert_eq!(settings.layout, Layout::Flat, "local layer overrides global");
}

#[test]
fn given_env_override_when_load_then_env_wins_over_local() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "format = \"xml\"\n").unwrap();

    // Act
    let env = env_of(&[("PFWGEN_FORMAT", "raw")]);
    let settings = Settings::load_from(None, Some(dir.path()), env).expect("load settings");

    // Assert
    assert_eq!(settings.format, OutputFormat::Raw);
}

#[test]
fn given_settings_when_compile_options_then_style_follows_settings() {
    // Arrange
    let settings = Settings {
        format: OutputFormat::Xml,
        layout: Layout::Indented,
        indent: "  ".into(),
        verbose: true,
    };

    // Act
    let options = settings.compile_options();

    // Assert
    assert_eq!(options.format, OutputFormat::Xml);
    assert_eq!(options.style.layout, Layout::Indented);
    assert_eq!(options.style.indent, "  ");
    assert!(options.verbose);
}
