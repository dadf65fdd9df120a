use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::planner::DEFAULT_STUDY_HOURS;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width_percent: u16,
    #[serde(default = "default_study_hours")]
    pub default_study_hours: f64,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

/// Where the timetable service lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,
    /// No timeout when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_add_subject")]
    pub add_subject: String,
    #[serde(default = "default_delete_subject")]
    pub delete_subject: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_edit_hours")]
    pub edit_hours: String,
    #[serde(default = "default_generate")]
    pub generate: String,
    /// Generate without leaving the subject form
    #[serde(default = "default_generate_in_form")]
    pub generate_in_form: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_next_field")]
    pub next_field: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_undo")]
    pub undo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_accent")]
    pub accent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sidebar_width_percent: default_sidebar_width(),
            default_study_hours: default_study_hours(),
            log_level: None,
            service: ServiceConfig::default(),
            key_bindings: KeyBindings::default(),
            current_theme: default_current_theme(),
            themes: HashMap::new(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint_path: default_endpoint_path(),
            timeout_secs: None,
        }
    }
}

impl ServiceConfig {
    /// Full URL of the generate endpoint, joined without doubling slashes
    pub fn endpoint_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.endpoint_path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            add_subject: default_add_subject(),
            delete_subject: default_delete_subject(),
            edit: default_edit(),
            edit_hours: default_edit_hours(),
            generate: default_generate(),
            generate_in_form: default_generate_in_form(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            next_field: default_next_field(),
            help: default_help(),
            undo: default_undo(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            accent: default_accent(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("default".to_string(), Theme::default());

        themes.insert("light".to_string(), Theme {
            fg: "black".to_string(),
            bg: "white".to_string(),
            highlight_bg: "blue".to_string(),
            highlight_fg: "white".to_string(),
            accent: "magenta".to_string(),
        });

        themes.insert("green".to_string(), Theme {
            fg: "green".to_string(),
            bg: "black".to_string(),
            highlight_bg: "yellow".to_string(),
            highlight_fg: "black".to_string(),
            accent: "lightgreen".to_string(),
        });

        themes.insert("monochrome".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "white".to_string(),
            highlight_fg: String::new(),
            accent: "gray".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_sidebar_width() -> u16 {
    30
}

fn default_study_hours() -> f64 {
    DEFAULT_STUDY_HOURS
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_endpoint_path() -> String {
    "/generate-timetable".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_add_subject() -> String {
    "a".to_string()
}

fn default_delete_subject() -> String {
    "d".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_edit_hours() -> String {
    "h".to_string()
}

fn default_generate() -> String {
    "g".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_next_field() -> String {
    "Tab".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_undo() -> String {
    "Ctrl+z".to_string()
}

fn default_generate_in_form() -> String {
    "Ctrl+g".to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_accent() -> String {
    "cyan".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from the profile's config directory, creating a
    /// default file if none exists yet
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            let mut config = Config::default();
            if let Err(ref e) = config.save_to_path(&config_path) {
                warn!(path = %config_path.display(), error = %e, "load_with_profile: failed to write default config");
            }
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// TOML accepts `nan` and `inf`; the request body cannot carry them
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_study_hours.is_finite() {
            return Err(ConfigError::InvalidValue(format!(
                "default_study_hours must be a finite number, got {}",
                self.default_study_hours
            )));
        }
        Ok(())
    }

    /// Read only the log level, before logging is initialised. Errors are
    /// swallowed; the full load reports them later.
    pub fn load_log_level(config_path: Option<&Path>, profile: utils::Profile) -> Option<String> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path(profile).ok()?,
        };
        let contents = fs::read_to_string(path).ok()?;
        let config: Config = toml::from_str(&contents).ok()?;
        config.log_level
    }

    pub fn save_to_path(&mut self, path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the currently active theme
    /// If highlight_fg is not set (empty string), it will be calculated from highlight_bg
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{parse_color, get_contrast_text_color, format_color_for_display};

        let mut theme = if let Some(theme) = self.themes.get(&self.current_theme) {
            theme.clone()
        } else if let Some(theme) = Theme::get_preset_themes().get(&self.current_theme) {
            theme.clone()
        } else {
            Theme::default()
        };

        if theme.highlight_fg.is_empty() {
            let highlight_bg_color = parse_color(&theme.highlight_bg);
            let calculated_fg = get_contrast_text_color(highlight_bg_color);
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.default_study_hours, 5.0);
        assert_eq!(config.service.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.service.endpoint_path, "/generate-timetable");
        assert_eq!(config.service.timeout_secs, None);
        assert_eq!(config.key_bindings.generate, "g");
        assert_eq!(config.key_bindings.generate_in_form, "Ctrl+g");
        assert_eq!(config.config_version, Some(CURRENT_CONFIG_VERSION));
    }

    #[test]
    fn test_endpoint_url_joins_slashes() {
        let service = ServiceConfig {
            base_url: "http://planner.local:9000/".to_string(),
            endpoint_path: "generate-timetable".to_string(),
            timeout_secs: None,
        };
        assert_eq!(service.endpoint_url(), "http://planner.local:9000/generate-timetable");
        assert_eq!(
            ServiceConfig::default().endpoint_url(),
            "http://127.0.0.1:8000/generate-timetable"
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
default_study_hours = 3.5

[service]
base_url = "http://10.0.0.2:8080"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();

        assert_eq!(config.default_study_hours, 3.5);
        assert_eq!(config.service.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.service.endpoint_path, "/generate-timetable");
        assert_eq!(config.key_bindings.quit, "q");
        assert_eq!(config.current_theme, "default");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.log_level = Some("debug".to_string());
        config.service.timeout_secs = Some(15);
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.log_level.as_deref(), Some("debug"));
        assert_eq!(loaded.service, config.service);
    }

    #[test]
    fn test_load_log_level_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = \"trace\"\n").unwrap();

        assert_eq!(
            Config::load_log_level(Some(path.as_path()), utils::Profile::Dev).as_deref(),
            Some("trace")
        );
        assert_eq!(
            Config::load_log_level(Some(dir.path().join("missing.toml").as_path()), utils::Profile::Dev),
            None
        );
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_study_hours = [").unwrap();

        assert!(matches!(Config::load_from_path(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_active_theme_fallbacks() {
        let mut config = Config::default();
        assert_eq!(config.get_active_theme().highlight_bg, "blue");

        config.current_theme = "monochrome".to_string();
        // Empty highlight_fg is derived from the white highlight background
        assert_eq!(config.get_active_theme().highlight_fg, "black");

        config.current_theme = "gone".to_string();
        assert_eq!(config.get_active_theme().fg, "white");
    }

    #[test]
    fn test_non_finite_default_hours_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        for value in ["nan", "inf", "-inf"] {
            fs::write(&path, format!("default_study_hours = {}", value)).unwrap();
            assert!(
                matches!(Config::load_from_path(&path), Err(ConfigError::InvalidValue(_))),
                "{} should be rejected",
                value
            );
        }

        fs::write(&path, "default_study_hours = 0.0").unwrap();
        assert_eq!(Config::load_from_path(&path).unwrap().default_study_hours, 0.0);
    }
}
