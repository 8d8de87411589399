//! # Configuration
//!
//! Settings for logging, device creation and the presentation window.
//! Every section has sensible defaults, so a config file only needs to name
//! the values it changes. Files are read in TOML or RON depending on their
//! extension; nothing is ever written back.
//!
//! ```toml
//! [engine]
//! log_level = "debug"
//!
//! [device]
//! application_name = "Clear"
//! enable_validation = true
//!
//! [window]
//! width = 1280
//! height = 720
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match path.extension().and_then(|extension| extension.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Parse configuration from TOML text
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values parsed but are not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log level when `RUST_LOG` is not set
    pub log_level: String,
}

impl EngineConfig {
    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// The log level as a filter
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Unknown log level '{}'", self.log_level)))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Instance and device creation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Application name reported to the driver
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Whether to enable Vulkan validation layers; `None` enables them in debug builds
    pub enable_validation: Option<bool>,
}

impl DeviceConfig {
    /// Create a device configuration for `app_name`
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            application_version: (1, 0, 0),
            enable_validation: None,
        }
    }

    /// Set application version
    pub const fn with_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.application_version = (major, minor, patch);
        self
    }

    /// Enable or disable validation layers
    pub const fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = Some(enabled);
        self
    }

    /// Whether validation is requested for this build
    pub fn validation_enabled(&self) -> bool {
        self.enable_validation.unwrap_or(cfg!(debug_assertions))
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new("Awki Application")
    }
}

/// Presentation window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Initial width in screen coordinates
    pub width: u32,
    /// Initial height in screen coordinates
    pub height: u32,
    /// Whether the user may resize the window
    pub resizable: bool,
}

impl WindowConfig {
    /// Set the initial size
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Awki".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Device creation configuration
    pub device: DeviceConfig,
    /// Window configuration
    pub window: WindowConfig,
}

impl ApplicationConfig {
    /// Create a configuration whose application and window are named `app_name`
    pub fn new(app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        Self {
            engine: EngineConfig::default(),
            device: DeviceConfig::new(app_name.clone()),
            window: WindowConfig {
                title: app_name,
                ..WindowConfig::default()
            },
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.device.application_name.is_empty() {
            return Err("Application name cannot be empty".to_string());
        }
        if self.window.title.is_empty() {
            return Err("Window title cannot be empty".to_string());
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(format!(
                "Window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            ));
        }
        self.engine.level_filter().map_err(|e| e.to_string())?;
        Ok(())
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApplicationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.level_filter().unwrap(), log::LevelFilter::Info);
        assert_eq!(config.device.validation_enabled(), cfg!(debug_assertions));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ApplicationConfig::from_toml_str(
            r#"
            [device]
            application_name = "Clear"
            enable_validation = false

            [window]
            width = 640
            "#,
        )
        .unwrap();

        assert_eq!(config.device.application_name, "Clear");
        assert!(!config.device.validation_enabled());
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ApplicationConfig::new("Clear");
        config.window = config.window.with_size(0, 720);
        assert!(config.validate().is_err());

        let mut config = ApplicationConfig::new("");
        config.window.title = "Clear".to_string();
        assert!(config.validate().is_err());

        let mut config = ApplicationConfig::new("Clear");
        config.engine = config.engine.with_log_level("chatty");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_ron_file() {
        let path = std::env::temp_dir().join(format!("awki_rhi_config_{}.ron", std::process::id()));
        std::fs::write(
            &path,
            r#"(
                engine: (log_level: "warn"),
                window: (title: "Ron", width: 320, height: 240, resizable: false),
            )"#,
        )
        .unwrap();

        let config = ApplicationConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.engine.level_filter().unwrap(), log::LevelFilter::Warn);
        assert_eq!(config.window.title, "Ron");
        assert!(!config.window.resizable);
        assert_eq!(config.device, DeviceConfig::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let path =
            std::env::temp_dir().join(format!("awki_rhi_config_{}.json", std::process::id()));
        std::fs::write(&path, "{}").unwrap();

        let result = ApplicationConfig::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
