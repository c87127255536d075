//! Error taxonomy for the dashboard.
//!
//! Every fetch failure ends up stored in a view's state as a [`FetchError`];
//! nothing here is meant to reach a global handler. Legitimate empty results
//! are states, not errors.

use std::path::PathBuf;
use thiserror::Error;

/// Generic text shown when the server rejects a login without saying why
pub const INVALID_CREDENTIALS: &str = "Invalid student ID or password.";

/// Generic text shown when the server could not be reached at all
pub const CONNECTION_FAILED: &str = "Could not connect to the server.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
  #[error("Network error: {message}")]
  Transport { message: String },

  #[error("Request timed out after {secs}s")]
  Timeout { secs: u64 },

  #[error("Server returned {status}: {message}")]
  Server { status: u16, message: String },

  #[error("Malformed response from {endpoint}: {message}")]
  Malformed { endpoint: String, message: String },
}

impl FetchError {
  pub fn transport(message: impl Into<String>) -> Self {
    Self::Transport { message: message.into() }
  }

  pub fn server(status: u16, message: impl Into<String>) -> Self {
    Self::Server { status, message: message.into() }
  }

  pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Malformed { endpoint: endpoint.into(), message: message.into() }
  }

  /// Banner text for a failed section
  pub fn user_message(&self) -> String {
    match self {
      FetchError::Transport { .. } => CONNECTION_FAILED.to_string(),
      FetchError::Timeout { secs } => format!("The server did not answer within {secs}s."),
      FetchError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
      FetchError::Server { status, .. } => format!("The server returned an error ({status})."),
      FetchError::Malformed { .. } => "The server sent data this dashboard cannot read.".to_string(),
    }
  }
}

impl From<reqwest::Error> for FetchError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      let endpoint = err.url().map(|u| u.path().to_string()).unwrap_or_default();
      FetchError::malformed(endpoint, err.to_string())
    } else {
      FetchError::transport(err.to_string())
    }
  }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoginError {
  #[error("Student ID and password are both required.")]
  MissingCredentials,

  #[error("{message}")]
  Rejected { message: String },

  #[error("{}", CONNECTION_FAILED)]
  Connection,

  #[error("Login timed out after {secs}s")]
  TimedOut { secs: u64 },

  #[error("Login service unavailable ({status}): {message}")]
  Unavailable { status: u16, message: String },

  #[error("Unexpected login response: {message}")]
  Malformed { message: String },
}

impl LoginError {
  pub fn rejected(message: Option<String>) -> Self {
    let message = message
      .filter(|m| !m.trim().is_empty())
      .unwrap_or_else(|| INVALID_CREDENTIALS.to_string());
    Self::Rejected { message }
  }

  /// True when the user should fix what they typed, false when the problem is
  /// on the wire or the server and a persistent banner fits better.
  pub fn is_credential_problem(&self) -> bool {
    matches!(self, LoginError::MissingCredentials | LoginError::Rejected { .. })
  }
}

impl From<FetchError> for LoginError {
  fn from(err: FetchError) -> Self {
    match err {
      FetchError::Transport { .. } => LoginError::Connection,
      FetchError::Timeout { secs } => LoginError::TimedOut { secs },
      FetchError::Server { status, message } => LoginError::Unavailable { status, message },
      FetchError::Malformed { message, .. } => LoginError::Malformed { message },
    }
  }
}

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to read config file {path}: {source}")]
  Read { path: PathBuf, source: std::io::Error },

  #[error("Failed to parse config file {path}: {source}")]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("Invalid API base URL '{url}': {reason}")]
  InvalidBaseUrl { url: String, reason: String },

  #[error("Invalid timeout '{value}': must be a whole number of seconds greater than zero")]
  InvalidTimeout { value: String },

  #[error("Failed to create HTTP client: {message}")]
  HttpClient { message: String },
}

impl ConfigError {
  pub fn invalid_base_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::InvalidBaseUrl { url: url.into(), reason: reason.into() }
  }

  pub fn invalid_timeout(value: impl Into<String>) -> Self {
    Self::InvalidTimeout { value: value.into() }
  }
}
