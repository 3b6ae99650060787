use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::block::Color;
use crate::error::ConfigError;

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Environment variable consulted for the API token when none is configured.
pub const TOKEN_ENV: &str = "NOTION_TOKEN";

/// Runtime settings. Read once at startup and never mutated during a run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub notion_api_token: String,
    pub default_color: Color,
    pub enable_equation_blocks: bool,
    /// Abort on the first construct a converter cannot handle instead of skipping it.
    pub strict: bool,
    pub api_base_url: String,
    pub notion_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notion_api_token: String::new(),
            default_color: Color::Default,
            enable_equation_blocks: true,
            strict: false,
            api_base_url: "https://api.notion.com/v1".to_string(),
            notion_version: "2022-06-28".to_string(),
        }
    }
}

impl Settings {
    /// Settings bundled into the binary.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load settings from a TOML file, or return the compiled defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::compiled_default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Fill in the token from the environment when the file left it empty.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.notion_api_token.is_empty() {
            if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.is_empty()) {
                self.notion_api_token = token;
            }
        }
        self
    }

    pub fn has_token(&self) -> bool {
        !self.notion_api_token.trim().is_empty()
    }
}

/// Default settings file location, relative to the working directory.
pub fn default_path() -> PathBuf {
    PathBuf::from("mdnotion.toml")
}
