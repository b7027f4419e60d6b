//! Session configuration.
//!
//! Every section carries `#[serde(default)]`, so a config file only needs
//! the keys it wants to change:
//!
//! ```toml
//! [buffer]
//! undo_limit = 500
//! auto_detect_encodings = ["utf-8", "euc-jp"]
//!
//! [kill_ring]
//! max = 60
//!
//! [attributes]
//! indent_level = 4
//!
//! [[modes]]
//! name = "markdown"
//! file_name = '\.md\z'
//! ```

use gapmacs_buffer::{AttributeValue, BufferConfig, FileFormat, KillRing, encoding_for_label};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Buffer behavior settings
    pub buffer: BufferSettings,

    /// Kill ring settings
    pub kill_ring: KillRingSettings,

    /// Attributes copied into every new buffer
    pub attributes: BTreeMap<String, AttributeValue>,

    /// Extra modes, tried before the built-in ones
    pub modes: Vec<ModeSettings>,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("gapmacs").join("config.toml"))
    }

    /// Writes the config to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Buffer behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferSettings {
    /// Undo history limit
    pub undo_limit: usize,

    /// Encoding labels tried in order when loading a file
    pub auto_detect_encodings: Vec<String>,

    /// Line ending for buffers that have none yet
    pub default_file_format: FileFormat,
}

impl BufferSettings {
    /// Resolves the settings into a [`BufferConfig`].
    pub fn to_buffer_config(&self) -> Result<BufferConfig, ConfigError> {
        let auto_detect_encodings = self
            .auto_detect_encodings
            .iter()
            .map(|label| {
                encoding_for_label(label).map_err(|_| ConfigError::UnknownEncoding(label.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BufferConfig {
            undo_limit: self.undo_limit,
            auto_detect_encodings,
            default_file_format: self.default_file_format,
        })
    }
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            undo_limit: 1000,
            auto_detect_encodings: ["utf-8", "euc-jp", "windows-31j", "windows-1252"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_file_format: FileFormat::Unix,
        }
    }
}

/// Kill ring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KillRingSettings {
    /// Maximum number of kills kept
    pub max: usize,
}

impl Default for KillRingSettings {
    fn default() -> Self {
        Self {
            max: KillRing::DEFAULT_MAX,
        }
    }
}

/// A mode entry declared in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSettings {
    pub name: String,

    /// Regex matched against the file's base name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Regex matched against a `#!` first line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("Unknown encoding in config: {0}")]
    UnknownEncoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapmacs_buffer::Encoding;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.buffer.undo_limit, 1000);
        assert_eq!(config.kill_ring.max, 30);
        assert_eq!(config.buffer.default_file_format, FileFormat::Unix);
        let buffer_config = config.buffer.to_buffer_config().unwrap();
        let names: Vec<&str> = buffer_config
            .auto_detect_encodings
            .iter()
            .map(|e| e.name())
            .collect();
        assert_eq!(names, ["UTF-8", "EUC-JP", "Shift_JIS", "windows-1252"]);
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [buffer]
            undo_limit = 4
            default_file_format = "dos"

            [attributes]
            indent_level = 4
            indent_tabs_mode = false

            [[modes]]
            name = "markdown"
            file_name = '\.md\z'
            "#,
        )
        .unwrap();
        assert_eq!(config.buffer.undo_limit, 4);
        assert_eq!(config.buffer.auto_detect_encodings.len(), 4);
        assert_eq!(config.buffer.default_file_format, FileFormat::Dos);
        assert_eq!(config.kill_ring.max, 30);
        assert_eq!(config.attributes["indent_level"], AttributeValue::Int(4));
        assert_eq!(config.attributes["indent_tabs_mode"], AttributeValue::Bool(false));
        assert_eq!(config.modes[0].name, "markdown");
        assert!(config.modes[0].interpreter.is_none());
    }

    #[test]
    fn test_unknown_encoding() {
        let settings = BufferSettings {
            auto_detect_encodings: vec!["utf-8".into(), "klingon".into()],
            ..BufferSettings::default()
        };
        assert!(matches!(
            settings.to_buffer_config(),
            Err(ConfigError::UnknownEncoding(label)) if label == "klingon"
        ));
        let settings = BufferSettings {
            auto_detect_encodings: vec!["latin1".into()],
            ..BufferSettings::default()
        };
        let resolved = settings.to_buffer_config().unwrap();
        assert_eq!(
            resolved.auto_detect_encodings,
            vec![Encoding::for_label(b"latin1").unwrap()]
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.kill_ring.max = 5;
        config.attributes.insert("tab_width".into(), AttributeValue::Int(4));
        config.modes.push(ModeSettings {
            name: "shell".into(),
            file_name: None,
            interpreter: Some("sh".into()),
        });
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.kill_ring.max, 5);
        assert_eq!(loaded.attributes["tab_width"], AttributeValue::Int(4));
        assert_eq!(loaded.modes[0].interpreter.as_deref(), Some("sh"));
        assert!(Config::load_from(dir.path().join("missing.toml")).is_err());
    }
}
