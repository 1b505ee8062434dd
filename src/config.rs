use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::views::aggregate::DEFAULT_TARGET;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub gateway: GatewayConfig,
  #[serde(default)]
  pub dashboard: DashboardConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
  /// Base URL of the remote store
  pub url: String,
  /// Request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  30
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
  /// Registrations each region aims for; zero is rejected when parsing
  #[serde(default = "default_target")]
  pub target: NonZeroU32,
}

impl Default for DashboardConfig {
  fn default() -> Self {
    Self {
      target: default_target(),
    }
  }
}

fn default_target() -> NonZeroU32 {
  DEFAULT_TARGET
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Filter directive used when RUST_LOG is not set (e.g. "info", "gram_sync=debug")
  #[serde(default = "default_level")]
  pub level: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_level(),
    }
  }
}

fn default_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./gram.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/gram/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/gram/config.yaml\n\
         with at least:\n\n  gateway:\n    url: https://store.example.org/api"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("gram.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("gram").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Get the gateway bearer token from the environment, if set.
  pub fn get_gateway_token() -> Option<String> {
    std::env::var("GRAM_GATEWAY_TOKEN")
      .ok()
      .filter(|token| !token.trim().is_empty())
  }
}
