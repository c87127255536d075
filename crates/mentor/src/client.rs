//! HTTP client for the Smart Learning REST API
//!
//! [`DashboardApi`] is the seam every view talks through. [`ApiClient`] is the
//! reqwest implementation; tests substitute fakes or mocks.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, debug_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

use crate::config::DashboardConfig;
use crate::error::{ConfigError, FetchError, LoginError};
use crate::models::{
  ErrorBody, Insight, InsightsResponse, LoginRequest, LoginResponse, Prediction,
  PredictionsResponse, ProgressRecord, RecommendationsResponse, ScheduledCourse, StudentIdentity,
};
use crate::unicode;

/// Longest slice of a non-JSON error body carried into a [`FetchError`]
const ERROR_BODY_LIMIT: usize = 200;

/// HTTP method types for REST API calls
#[derive(Debug, Copy, Clone)]
enum HttpMethod {
  Get,
  Post,
}

impl std::fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let method_str = match self {
      HttpMethod::Get => "GET",
      HttpMethod::Post => "POST",
    };
    write!(f, "{method_str}")
  }
}

/// Everything the dashboard needs from the backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
  /// `POST /api/login`
  async fn login(&self, student_id: &str, password: &str) -> Result<StudentIdentity, LoginError>;

  /// `GET /api/progress/{id}`
  async fn progress(&self, student_id: &str) -> Result<Vec<ProgressRecord>, FetchError>;

  /// `GET /api/insight`
  async fn insights(&self) -> Result<Vec<Insight>, FetchError>;

  /// `GET /api/predict/{id}`
  async fn predictions(&self, student_id: &str) -> Result<Vec<Prediction>, FetchError>;

  /// `GET /api/recommendation/{id}`
  async fn recommendations(&self, student_id: &str) -> Result<RecommendationsResponse, FetchError>;

  /// `GET /api/current-schedule/{id}`
  async fn current_schedule(&self, student_id: &str) -> Result<Vec<ScheduledCourse>, FetchError>;
}

/// HTTP client for the Smart Learning REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  base: Url,
  timeout: Duration,
}

// Client Constructor
// ==================
impl ApiClient {
  /// Build a client from a validated configuration
  pub fn new(config: &DashboardConfig) -> Result<Self, ConfigError> {
    let base = Url::parse(&config.api_base_url)
      .map_err(|e| ConfigError::invalid_base_url(&config.api_base_url, e.to_string()))?;
    if base.cannot_be_a_base() {
      return Err(ConfigError::invalid_base_url(&config.api_base_url, "URL cannot be a base"));
    }

    let client = Client::builder()
      .connect_timeout(config.timeout())
      .user_agent(concat!("mentor/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| ConfigError::HttpClient { message: e.to_string() })?;

    Ok(Self { client, base, timeout: config.timeout() })
  }

  /// Absolute URL for `segments` under the base path, each segment percent-encoded
  pub fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }
}

// HTTP Request Helpers
// ====================
impl ApiClient {
  /// Send a request and read the whole body, bounded by the configured timeout
  async fn execute_with_timeout(
    &self,
    request: RequestBuilder,
  ) -> Result<(StatusCode, Vec<u8>), FetchError> {
    let secs = self.timeout.as_secs();
    let exchange = async {
      let response = request.send().await?;
      let status = response.status();
      let body = response.bytes().await?;
      Ok::<_, reqwest::Error>((status, body.to_vec()))
    };

    match timeout(self.timeout, exchange).await {
      Err(_) => Err(FetchError::Timeout { secs }),
      Ok(Err(e)) if e.is_timeout() => Err(FetchError::Timeout { secs }),
      Ok(Err(e)) => Err(e.into()),
      Ok(Ok(exchange)) => Ok(exchange),
    }
  }

  /// Helper to make a GET request and return the repaired, typed body
  async fn get_json<R>(&self, segments: &[&str]) -> Result<R, FetchError>
  where
    R: DeserializeOwned,
  {
    let url = self.endpoint(segments);
    let span = debug_span!(
      "fetch",
      method = %HttpMethod::Get,
      endpoint = %url.path(),
      cycle = %Uuid::new_v4()
    );
    self.get_json_in_span(url).instrument(span).await
  }

  async fn get_json_in_span<R>(&self, url: Url) -> Result<R, FetchError>
  where
    R: DeserializeOwned,
  {
    let endpoint = url.path().to_string();
    debug!("sending request");
    let (status, body) = self
      .execute_with_timeout(self.client.get(url))
      .await
      .inspect_err(|e| warn!(error = %e, "request failed"))?;
    debug!(status = status.as_u16(), bytes = body.len(), "response received");

    parse_response(status, &body, &endpoint).inspect_err(|e| warn!(error = %e, "response rejected"))
  }

  async fn login_in_span(
    &self,
    student_id: &str,
    password: &str,
  ) -> Result<StudentIdentity, LoginError> {
    let url = self.endpoint(&["api", "login"]);
    let request = LoginRequest { student_id, password };
    let (status, body) = self
      .execute_with_timeout(self.client.post(url).json(&request))
      .await
      .inspect_err(|e| warn!(error = %e, "login request failed"))?;
    debug!(status = status.as_u16(), "login response received");

    let parsed = decode_repaired(&body)
      .and_then(|v| serde_json::from_value::<LoginResponse>(v).map_err(|e| e.to_string()));

    match parsed {
      Ok(LoginResponse { success: true, student: Some(student), .. }) => Ok(student),
      Ok(LoginResponse { success: true, student: None, .. }) => {
        Err(LoginError::Malformed { message: "success without a student record".to_string() })
      }
      Ok(LoginResponse { success: false, .. }) if status.is_server_error() => {
        Err(FetchError::server(status.as_u16(), error_text(&body)).into())
      }
      Ok(LoginResponse { success: false, message, .. }) => Err(LoginError::rejected(message)),
      Err(message) if status.is_success() => Err(LoginError::Malformed { message }),
      Err(_) => Err(FetchError::server(status.as_u16(), error_text(&body)).into()),
    }
  }
}

/// Turn a status + body into typed data.
///
/// Non-2xx statuses become [`FetchError::Server`] carrying the backend's
/// `message`/`error` text. 2xx bodies are repaired for escaped Unicode before
/// typed decoding.
fn parse_response<R>(status: StatusCode, body: &[u8], endpoint: &str) -> Result<R, FetchError>
where
  R: DeserializeOwned,
{
  if !status.is_success() {
    return Err(FetchError::server(status.as_u16(), error_text(body)));
  }

  let value = decode_repaired(body).map_err(|e| FetchError::malformed(endpoint, e))?;
  serde_json::from_value(value).map_err(|e| FetchError::malformed(endpoint, e.to_string()))
}

fn decode_repaired(body: &[u8]) -> Result<Value, String> {
  let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
  Ok(unicode::repair(value))
}

fn error_text(body: &[u8]) -> String {
  if let Some(text) = serde_json::from_slice::<ErrorBody>(body).ok().and_then(ErrorBody::text) {
    return unicode::repair_str(&text).into_owned();
  }

  let raw = String::from_utf8_lossy(body);
  raw.trim().chars().take(ERROR_BODY_LIMIT).collect()
}

// Client Methods
// ==============
#[async_trait]
impl DashboardApi for ApiClient {
  async fn login(&self, student_id: &str, password: &str) -> Result<StudentIdentity, LoginError> {
    let span = debug_span!(
      "fetch",
      method = %HttpMethod::Post,
      endpoint = "/api/login",
      cycle = %Uuid::new_v4()
    );
    self.login_in_span(student_id, password).instrument(span).await
  }

  async fn progress(&self, student_id: &str) -> Result<Vec<ProgressRecord>, FetchError> {
    self.get_json(&["api", "progress", student_id]).await
  }

  async fn insights(&self) -> Result<Vec<Insight>, FetchError> {
    let response: InsightsResponse = self.get_json(&["api", "insight"]).await?;
    Ok(response.insights)
  }

  async fn predictions(&self, student_id: &str) -> Result<Vec<Prediction>, FetchError> {
    let response: PredictionsResponse = self.get_json(&["api", "predict", student_id]).await?;
    Ok(response.predictions)
  }

  async fn recommendations(&self, student_id: &str) -> Result<RecommendationsResponse, FetchError> {
    self.get_json(&["api", "recommendation", student_id]).await
  }

  async fn current_schedule(&self, student_id: &str) -> Result<Vec<ScheduledCourse>, FetchError> {
    self.get_json(&["api", "current-schedule", student_id]).await
  }
}
