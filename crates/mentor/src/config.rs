//! Configuration management for the dashboard
//!
//! Resolution order, later wins: built-in defaults, JSON config file,
//! `MENTOR_*` environment variables, then command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://smart-learning-system.onrender.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

pub const CONFIG_ENV: &str = "MENTOR_CONFIG";
pub const BASE_URL_ENV: &str = "MENTOR_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "MENTOR_TIMEOUT_SECS";

/// What a view does when a secondary section (insights, predictions) fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionFailurePolicy {
  /// Show the failure as a banner in place of the section
  #[default]
  Surface,
  /// Keep the failure in state but render the section as empty
  Quiet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
  /// Root of the Smart Learning API, without a trailing slash
  pub api_base_url: String,
  /// Upper bound for any single request, in seconds
  pub timeout_secs: u64,
  /// Failure policy for the insight and prediction sections
  pub insight_failures: SectionFailurePolicy,
}

impl Default for DashboardConfig {
  fn default() -> Self {
    Self {
      api_base_url: DEFAULT_API_BASE_URL.to_string(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
      insight_failures: SectionFailurePolicy::default(),
    }
  }
}

impl DashboardConfig {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
      .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
  }

  /// `<config dir>/mentor/config.json`
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mentor").join("config.json"))
  }

  /// Resolve the full configuration from the process environment.
  ///
  /// An explicit path must exist. `MENTOR_CONFIG` is treated the same way.
  /// The default path is used only when present.
  pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
    Self::load_with(explicit, |key| std::env::var(key).ok())
  }

  /// Same as [`DashboardConfig::load`] with an injectable environment lookup
  pub fn load_with<F>(explicit: Option<&Path>, env: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let from_env = env(CONFIG_ENV).map(PathBuf::from);
    let path = explicit.map(Path::to_path_buf).or(from_env);

    let mut config = match path {
      Some(path) => Self::load_from_file(&path)?,
      None => match Self::default_path().filter(|p| p.exists()) {
        Some(path) => Self::load_from_file(&path)?,
        None => Self::default(),
      },
    };

    config.apply_overrides(env)?;
    config.validate()
  }

  /// Apply `MENTOR_API_BASE_URL` / `MENTOR_TIMEOUT_SECS`
  pub fn apply_overrides<F>(&mut self, env: F) -> Result<(), ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(url) = env(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
      self.api_base_url = url;
    }
    if let Some(raw) = env(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
      self.timeout_secs = parse_timeout(&raw)?;
    }
    Ok(())
  }

  pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
    self.api_base_url = url.into();
    self
  }

  pub fn with_timeout_secs(mut self, secs: u64) -> Self {
    self.timeout_secs = secs;
    self
  }

  pub fn with_insight_failures(mut self, policy: SectionFailurePolicy) -> Self {
    self.insight_failures = policy;
    self
  }

  /// Check the base URL and timeout, normalising the URL's trailing slash
  pub fn validate(mut self) -> Result<Self, ConfigError> {
    if self.timeout_secs == 0 {
      return Err(ConfigError::invalid_timeout("0"));
    }

    let trimmed = self.api_base_url.trim().trim_end_matches('/').to_string();
    let parsed = Url::parse(&trimmed)
      .map_err(|e| ConfigError::invalid_base_url(&self.api_base_url, e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(ConfigError::invalid_base_url(&self.api_base_url, "scheme must be http or https"));
    }
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
      return Err(ConfigError::invalid_base_url(&self.api_base_url, "URL has no host"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
      return Err(ConfigError::invalid_base_url(
        &self.api_base_url,
        "query strings and fragments are not allowed",
      ));
    }

    self.api_base_url = trimmed;
    Ok(self)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

pub fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
  match raw.trim().parse::<u64>() {
    Ok(secs) if secs > 0 => Ok(secs),
    _ => Err(ConfigError::invalid_timeout(raw)),
  }
}
