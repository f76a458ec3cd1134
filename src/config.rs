//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pfwgen/pfwgen.toml`
//! 3. Local config: `<dir>/.pfwgen.toml` (usually the working directory)
//! 4. Environment variables: `PFWGEN_*` prefix
//!
//! Command-line flags are applied on top by the CLI.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, CompileOptions, Layout, OutputFormat, ScriptStyle};

/// Unified configuration for pfwgen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Output format when no format flag is given
    pub format: OutputFormat,
    /// Script text layout
    pub layout: Layout,
    /// Indentation unit of the indented layout
    pub indent: String,
    /// Surface parse warnings (empty lines, comments) on stderr
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Script,
            layout: Layout::Flat,
            indent: "    ".to_string(),
            verbose: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub format: Option<OutputFormat>,
    pub layout: Option<Layout>,
    pub indent: Option<String>,
    pub verbose: Option<bool>,
}

/// Get the XDG config directory for pfwgen.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pfwgen").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pfwgen.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".pfwgen.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins if Some.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            format: overlay.format.unwrap_or(self.format),
            layout: overlay.layout.unwrap_or(self.layout),
            indent: overlay
                .indent
                .clone()
                .unwrap_or_else(|| self.indent.clone()),
            verbose: overlay.verbose.unwrap_or(self.verbose),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.pfwgen.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_dir, env_source())
    }

    /// Load with explicit layer sources: a global file (if it exists), a
    /// local directory and an environment source.
    pub fn load_from(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        Self::apply_env_overrides(current, env)
    }

    /// Apply `PFWGEN_*` variables from `source` as explicit overrides.
    pub fn apply_env_overrides(
        mut settings: Self,
        source: Environment,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(source)
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value(&config, "format")? {
            settings.format = val;
        }
        if let Some(val) = env_value(&config, "layout")? {
            settings.layout = val;
        }
        if let Some(val) = env_value(&config, "indent")? {
            settings.indent = val;
        }
        if let Some(val) = env_value(&config, "verbose")? {
            settings.verbose = val;
        }

        Ok(settings)
    }

    /// Compile options derived from these settings.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            format: self.format,
            style: ScriptStyle {
                layout: self.layout,
                indent: self.indent.clone(),
            },
            verbose: self.verbose,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pfwgen configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/pfwgen/pfwgen.toml
#   Local:  ./.pfwgen.toml
#   Env:    PFWGEN_* environment variables
#   Flags:  --pfw/--xml/--raw, --layout, --verbose

# Output format: "script", "xml" or "raw"
# format = "script"

# Script layout: "flat" (one command per line) or "indented"
# layout = "flat"

# Indentation unit of the indented layout
# indent = "    "

# Print warnings for skipped empty and comment lines
# verbose = false
"#
        .to_string()
    }
}

/// `PFWGEN_FORMAT` etc.; `__` separates nested keys.
pub fn env_source() -> Environment {
    Environment::with_prefix("PFWGEN")
        .prefix_separator("_")
        .separator("__")
}

/// Read one key; a missing key is `None`, a malformed one an error.
fn env_value<T: DeserializeOwned>(
    config: &Config,
    key: &str,
) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env_source().source(Some(map))
    }

    #[test]
    fn given_no_config_when_defaults_then_script_flat() {
        let settings = Settings::default();
        assert_eq!(settings.format, OutputFormat::Script);
        assert_eq!(settings.layout, Layout::Flat);
        assert_eq!(settings.indent, "    ");
        assert!(!settings.verbose);
    }

    #[test]
    fn test_merge_with_overlay_wins_when_specified() {
        let base = Settings::default();
        let overlay = RawSettings {
            layout: Some(Layout::Indented),
            indent: Some("\t".into()),
            ..RawSettings::default()
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.layout, Layout::Indented);
        assert_eq!(merged.indent, "\t");
        assert_eq!(merged.format, OutputFormat::Script);
    }

    #[test]
    fn test_env_overrides_replace_values() {
        let settings = Settings::apply_env_overrides(
            Settings::default(),
            env_of(&[("PFWGEN_FORMAT", "xml"), ("PFWGEN_VERBOSE", "true")]),
        )
        .unwrap();
        assert_eq!(settings.format, OutputFormat::Xml);
        assert!(settings.verbose);
        assert_eq!(settings.layout, Layout::Flat);
    }

    #[test]
    fn test_env_override_with_unknown_format_is_config_error() {
        let result = Settings::apply_env_overrides(
            Settings::default(),
            env_of(&[("PFWGEN_FORMAT", "yaml")]),
        );
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn test_to_toml_round_trips_through_raw_settings() {
        let settings = Settings {
            layout: Layout::Indented,
            ..Settings::default()
        };
        let text = settings.to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }

    #[test]
    fn test_template_parses_as_empty_overlay() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.format.is_none());
        assert!(raw.layout.is_none());
    }
}
