//! Validator configuration
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (dot.toml)
//! - Environment variables (DOT__*)
//!
//! ## Example config file (dot.toml):
//! ```toml
//! [limits]
//! max_frames = 50
//! max_hooks_per_frame = 20
//! max_concepts = 100
//!
//! [validation]
//! include_warnings = true
//!
//! [output]
//! format = "text"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration for the validator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Soft size limits behind the advisory rules
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Thresholds above which a WARN is emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_frames")]
    pub max_frames: usize,

    #[serde(default = "default_max_hooks_per_frame")]
    pub max_hooks_per_frame: usize,

    #[serde(default = "default_max_concepts")]
    pub max_concepts: usize,
}

/// Rule engine switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Evaluate WARN-severity rules
    #[serde(default = "default_true")]
    pub include_warnings: bool,
}

/// Presentation settings used by the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Diagnostic rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_max_frames() -> usize {
    50
}

fn default_max_hooks_per_frame() -> usize {
    20
}

fn default_max_concepts() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_frames: default_max_frames(),
            max_hooks_per_frame: default_max_hooks_per_frame(),
            max_concepts: default_max_concepts(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            include_warnings: true,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` (required if given) on
    /// top of the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["dot.toml", ".dot.toml", "config/dot.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "dot-organize", "dot") {
            let xdg_config = config_dir.config_dir().join("dot.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // DOT__LIMITS__MAX_FRAMES=80
        builder = builder.add_source(
            Environment::with_prefix("DOT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        std::fs::write(path, self.to_toml()?)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> std::io::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
