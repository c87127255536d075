//! Domain and wire types for the Smart Learning API.
//!
//! Wire shapes follow the backend's JSON exactly; domain types are the
//! snapshots views keep in state. Every fetch replaces its snapshot.

use serde::{Deserialize, Deserializer, Serialize};

/// A logged-in student, handed from the session gate to every view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentIdentity {
  #[serde(alias = "student_id", deserialize_with = "string_or_number")]
  pub id: String,
  #[serde(rename = "name")]
  pub display_name: String,
  #[serde(default)]
  pub major: Option<String>,
}

impl StudentIdentity {
  pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self { id: id.into(), display_name: display_name.into(), major: None }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressRecord {
  pub course: String,
  #[serde(deserialize_with = "percent")]
  pub progress: f64,
}

pub type Insight = String;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
  pub course: String,
  #[serde(deserialize_with = "percent")]
  pub predicted_progress: f64,
  #[serde(deserialize_with = "percent")]
  pub risk: f64,
  #[serde(default)]
  pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recommendation {
  pub course: String,
  #[serde(deserialize_with = "percent")]
  pub progress: f64,
  #[serde(default)]
  pub roadmap: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCourse {
  pub course: String,
  #[serde(deserialize_with = "percent")]
  pub progress: f64,
  #[serde(default)]
  pub teacher_name: Option<String>,
  #[serde(default)]
  pub subject_code: Option<String>,
}

/// One entry in a course card's lesson list.
///
/// Lessons are display artifacts. `match_score` is cosmetic and regenerated
/// on every load; nothing may sort or key on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
  pub title: String,
  pub note: String,
  pub match_score: Option<u8>,
  pub document: Option<String>,
  pub video: Option<String>,
  pub ai_advisor: bool,
}

// Wire envelopes
// ==============

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
  pub student_id: &'a str,
  pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
  pub success: bool,
  #[serde(default)]
  pub student: Option<StudentIdentity>,
  #[serde(default)]
  pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InsightsResponse {
  #[serde(default)]
  pub insights: Vec<Insight>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionsResponse {
  #[serde(default)]
  pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
  #[serde(default)]
  pub recommendations: Vec<Recommendation>,
  #[serde(default)]
  pub message: String,
}

/// Error body the backend sends with non-2xx statuses
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub error: Option<String>,
}

impl ErrorBody {
  pub fn text(self) -> Option<String> {
    self.message.or(self.error).filter(|m| !m.trim().is_empty())
  }
}

// Field helpers
// =============

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
  Number(f64),
  Text(String),
}

/// Percentage in `[0, 100]`. Numeric strings are accepted; out-of-range values
/// are clamped with a warning.
fn percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = match NumberOrString::deserialize(deserializer)? {
    NumberOrString::Number(n) => n,
    NumberOrString::Text(s) => s
      .trim()
      .parse::<f64>()
      .map_err(|_| serde::de::Error::custom(format!("expected a percentage, got '{s}'")))?,
  };

  if !raw.is_finite() {
    return Err(serde::de::Error::custom("percentage is not a finite number"));
  }

  let clamped = raw.clamp(0.0, 100.0);
  if clamped != raw {
    tracing::warn!(value = raw, "percentage outside 0..=100, clamping");
  }
  Ok(clamped)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Id {
    Text(String),
    Int(i64),
  }

  Ok(match Id::deserialize(deserializer)? {
    Id::Text(s) => s,
    Id::Int(n) => n.to_string(),
  })
}
