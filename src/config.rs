//! Configuration for NovaScript.
//!
//! Settings are read from `novascript.toml` and layered as
//! file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [backend]
//! api_base = "https://generativelanguage.googleapis.com/v1beta"
//! news_model = "gemini-3-flash-preview"
//! script_model = "gemini-3-pro-preview"
//! image_model = "gemini-3-pro-image-preview"
//! aspect_ratio = "16:9"
//! timeout_secs = 120
//!
//! [defaults]
//! resolution = "1K"
//!
//! [teleprompter]
//! chars_per_tick = 8
//! tick_millis = 12
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::ImageResolution;

pub const CONFIG_FILE_NAME: &str = "novascript.toml";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

const ASPECT_RATIOS: [&str; 5] = ["1:1", "3:4", "4:3", "9:16", "16:9"];

/// Model endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSection {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model used for headline search and summaries
    #[serde(default = "default_news_model")]
    pub news_model: String,
    #[serde(default = "default_script_model")]
    pub script_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_news_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_script_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_image_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            news_model: default_news_model(),
            script_model: default_script_model(),
            image_model: default_image_model(),
            aspect_ratio: default_aspect_ratio(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Default run settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub resolution: ImageResolution,
}

/// Typewriter reveal settings for the teleprompter view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleprompterSection {
    #[serde(default = "default_chars_per_tick")]
    pub chars_per_tick: usize,
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

fn default_chars_per_tick() -> usize {
    8
}

fn default_tick_millis() -> u64 {
    12
}

impl Default for TeleprompterSection {
    fn default() -> Self {
        Self {
            chars_per_tick: default_chars_per_tick(),
            tick_millis: default_tick_millis(),
        }
    }
}

/// The complete novascript.toml structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovaToml {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    #[serde(default)]
    pub teleprompter: TeleprompterSection,
}

impl NovaToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse novascript.toml")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize novascript.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !ASPECT_RATIOS.contains(&self.backend.aspect_ratio.as_str()) {
            warnings.push(format!(
                "Unknown aspect_ratio '{}': expected one of {}",
                self.backend.aspect_ratio,
                ASPECT_RATIOS.join(", ")
            ));
        }
        if !self.backend.api_base.starts_with("http://")
            && !self.backend.api_base.starts_with("https://")
        {
            warnings.push(format!(
                "api_base '{}' is not an http(s) URL",
                self.backend.api_base
            ));
        }
        if self.backend.timeout_secs == 0 {
            warnings.push("timeout_secs is 0; every request will time out".to_string());
        }
        if self.teleprompter.chars_per_tick == 0 {
            warnings.push("teleprompter.chars_per_tick is 0; typewriter would never finish".to_string());
        }

        warnings
    }
}

/// Resolved configuration: novascript.toml merged with environment and CLI.
#[derive(Debug, Clone)]
pub struct NovaConfig {
    /// File the settings were loaded from, if any
    pub source: Option<PathBuf>,
    pub toml: NovaToml,
    /// API key from the environment, if set
    pub api_key: Option<String>,
    pub verbose: bool,
}

impl NovaConfig {
    /// Load configuration.
    ///
    /// Lookup order for the file: `explicit`, `./novascript.toml`, then
    /// `<config dir>/novascript/novascript.toml`. Missing files fall back to
    /// defaults, but an explicit path must exist.
    pub fn load(explicit: Option<&Path>, verbose: bool) -> Result<Self> {
        let source = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::discover(),
        };

        let mut toml = match &source {
            Some(path) => NovaToml::load(path)?,
            None => NovaToml::default(),
        };

        if let Ok(base) = std::env::var("NOVASCRIPT_API_BASE")
            && !base.trim().is_empty()
        {
            toml.backend.api_base = base;
        }

        let api_key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty());

        Ok(Self {
            source,
            toml,
            api_key,
            verbose,
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        let global = dirs::config_dir()?.join("novascript").join(CONFIG_FILE_NAME);
        global.exists().then_some(global)
    }

    /// Resolution to use, preferring the CLI value over the file default.
    pub fn resolution(&self, cli: Option<ImageResolution>) -> ImageResolution {
        cli.unwrap_or(self.toml.defaults.resolution)
    }

    pub fn backend(&self) -> &BackendSection {
        &self.toml.backend
    }
}
