//! Configuration for the NodePreview worker tools
//!
//! The configuration is a small TOML file holding the toolchain paths used to
//! build the extension module and defaults for the thumbnail commands.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use which::which;

/// Environment variable that points at an explicit config file
pub const CONFIG_ENV: &str = "NODEPREVIEW_CONFIG";

/// Pointer file placed next to the default config location
pub const POINTER_FILE: &str = ".nodepreview_config_path";

/// Thumbnail edge length used when neither the CLI nor the config sets one
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 128;

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const KNOWN_KEYS: &[&str] = &["compiler", "python", "output-dir", "thumbnail-size"];

const COMPILER_CANDIDATES: &[&str] = &["c++", "g++", "clang++"];
const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0}. Supported keys: {keys}", keys = KNOWN_KEYS.join(", "))]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("{0} not found on PATH (tried: {1})")]
    ToolNotFound(&'static str, String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_size: Option<u32>,

    /// Where this config was loaded from; `save` writes back there
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl Config {
    /// Resolve the config file path
    ///
    /// Order: `NODEPREVIEW_CONFIG`, then the pointer file next to the
    /// default location, then the platform default.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let default = Self::default_path()?;

        if let Some(parent) = default.parent() {
            let pointer = parent.join(POINTER_FILE);
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return Ok(PathBuf::from(trimmed));
                }
            }
        }

        Ok(default)
    }

    /// Platform default config path, ignoring overrides
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        #[cfg(not(target_os = "windows"))]
        let dir = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".config");

        #[cfg(target_os = "windows")]
        let dir = dirs::config_dir().ok_or(ConfigError::NoHomeDir)?;

        Ok(dir.join("nodepreview").join("nodepreview.toml"))
    }

    /// Path of the pointer file used by `config path <new>`
    pub fn pointer_path() -> Result<PathBuf, ConfigError> {
        let default = Self::default_path()?;
        Ok(default
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(POINTER_FILE))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path()?)
    }

    /// Load from a specific path, returning defaults if the file is absent
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str::<Config>(&content)?
        } else {
            Config::default()
        };
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        match &self.source {
            Some(path) => self.save_to_path(path),
            None => self.save_to_path(&Self::path()?),
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "compiler" => self.compiler.clone(),
            "python" => self.python.clone(),
            "output-dir" => self.output_dir.clone(),
            "thumbnail-size" => self.thumbnail_size.map(|s| s.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "compiler" => self.compiler = Some(value),
            "python" => self.python = Some(value),
            "output-dir" => self.output_dir = Some(value),
            "thumbnail-size" => {
                let size = value
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.clone(),
                    })?;
                self.thumbnail_size = Some(size);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.compiler.is_none()
            && self.python.is_none()
            && self.output_dir.is_none()
            && self.thumbnail_size.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.thumbnail_size.unwrap_or(DEFAULT_THUMBNAIL_SIZE)
    }

    /// Output directory for built artifacts, `build` under the cwd by default
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_deref()
            .map_or_else(|| PathBuf::from("build"), PathBuf::from)
    }

    /// Return the configured C++ compiler, discovering one on PATH if needed
    ///
    /// A stored path that no longer exists is dropped and rediscovered.
    pub fn ensure_compiler(&mut self) -> Result<PathBuf, ConfigError> {
        ensure_tool(&mut self.compiler, "C++ compiler", COMPILER_CANDIDATES)
    }

    /// Return the configured Python interpreter, discovering one on PATH if needed
    pub fn ensure_python(&mut self) -> Result<PathBuf, ConfigError> {
        ensure_tool(&mut self.python, "Python interpreter", PYTHON_CANDIDATES)
    }
}

fn ensure_tool(
    slot: &mut Option<String>,
    label: &'static str,
    candidates: &[&str],
) -> Result<PathBuf, ConfigError> {
    if let Some(ref stored) = slot {
        let stored_path = PathBuf::from(stored);
        if stored_path.exists() {
            return Ok(stored_path);
        }
        // Bare program names are resolved through PATH
        if let Ok(resolved) = which(stored) {
            return Ok(resolved);
        }
        *slot = None;
    }

    for candidate in candidates {
        if let Ok(path) = which(candidate) {
            *slot = Some(path.to_string_lossy().trim().to_string());
            return Ok(path);
        }
    }

    Err(ConfigError::ToolNotFound(label, candidates.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::default();
        assert!(config.is_empty());
        assert_eq!(config.thumbnail_size(), DEFAULT_THUMBNAIL_SIZE);
    }

    #[test]
    fn test_config_set_get() {
        let mut config = Config::default();
        assert!(config.set("output-dir", "/tmp/out".to_string()).is_ok());
        assert_eq!(config.get("output-dir"), Some("/tmp/out".to_string()));
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/out"));
        assert!(!config.is_empty());
    }

    #[test]
    fn test_config_thumbnail_size_validation() {
        let mut config = Config::default();
        assert!(config.set("thumbnail-size", "256".to_string()).is_ok());
        assert_eq!(config.thumbnail_size(), 256);

        let err = config.set("thumbnail-size", "0".to_string());
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
        let err = config.set("thumbnail-size", "big".to_string());
        assert!(matches!(err, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(config.thumbnail_size(), 256);
    }

    #[test]
    fn test_config_unknown_key() {
        let mut config = Config::default();
        let result = config.set("unknown-key", "value".to_string());
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
        assert_eq!(config.get("unknown-key"), None);
    }

    #[test]
    fn test_values_iter_order() {
        let mut config = Config::default();
        let _ = config.set("thumbnail-size", "64".to_string());
        let _ = config.set("compiler", "clang++".to_string());
        let values = config.values_iter();
        assert_eq!(
            values,
            vec![
                ("compiler", "clang++".to_string()),
                ("thumbnail-size", "64".to_string())
            ]
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("nested").join("nodepreview.toml");

        let mut config = Config::default();
        let _ = config.set("python", "/usr/bin/python3".to_string());
        let _ = config.set("thumbnail-size", "96".to_string());
        assert!(config.save_to_path(&path).is_ok());

        let content = fs::read_to_string(&path).unwrap_or_default();
        assert!(content.contains("thumbnail-size = 96"));

        let loaded = Config::load_from_path(&path);
        assert!(loaded.is_ok());
        let loaded = loaded.unwrap_or_default();
        assert_eq!(loaded.python.as_deref(), Some("/usr/bin/python3"));
        assert_eq!(loaded.thumbnail_size(), 96);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let loaded = Config::load_from_path(&temp_dir.path().join("absent.toml"));
        assert!(loaded.is_ok_and(|c| c.is_empty()));
    }

    #[test]
    fn test_stale_compiler_is_dropped() {
        let mut config = Config {
            compiler: Some("/definitely/not/a/compiler-12345".to_string()),
            ..Default::default()
        };
        // Either rediscovered on PATH or reported missing; the stale path never survives
        let _ = config.ensure_compiler();
        assert_ne!(
            config.compiler.as_deref(),
            Some("/definitely/not/a/compiler-12345")
        );
    }
}
