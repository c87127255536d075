//! Login gate: turns an id and password into a [`StudentIdentity`]

use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::client::DashboardApi;
use crate::error::LoginError;
use crate::models::StudentIdentity;

pub struct SessionGate {
  api: Arc<dyn DashboardApi>,
}

impl SessionGate {
  pub fn new(api: Arc<dyn DashboardApi>) -> Self {
    Self { api }
  }

  /// Submit credentials once. Blank input fails locally without a request.
  pub async fn submit(&self, student_id: &str, password: &str) -> Result<StudentIdentity, LoginError> {
    let student_id = student_id.trim();
    if student_id.is_empty() || password.is_empty() {
      return Err(LoginError::MissingCredentials);
    }

    let span = info_span!("login", student_id = %student_id);
    async {
      let identity = self.api.login(student_id, password).await?;
      info!(name = %identity.display_name, "login accepted");
      Ok(identity)
    }
    .instrument(span)
    .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::client::MockDashboardApi;
  use crate::error::{CONNECTION_FAILED, INVALID_CREDENTIALS};
  use mockall::predicate::eq;

  fn gate(mock: MockDashboardApi) -> SessionGate {
    SessionGate::new(Arc::new(mock))
  }

  #[tokio::test]
  async fn test_success_yields_identity() {
    let mut mock = MockDashboardApi::new();
    mock
      .expect_login()
      .with(eq("S1"), eq("pw"))
      .times(1)
      .returning(|_, _| Ok(StudentIdentity::new("S1", "A")));

    let identity = gate(mock).submit(" S1 ", "pw").await.unwrap();
    assert_eq!(identity, StudentIdentity::new("S1", "A"));
  }

  #[tokio::test]
  async fn test_blank_credentials_never_reach_the_server() {
    let mut mock = MockDashboardApi::new();
    mock.expect_login().never();
    let gate = gate(mock);

    assert_eq!(gate.submit("", "pw").await.unwrap_err(), LoginError::MissingCredentials);
    assert_eq!(gate.submit("   ", "pw").await.unwrap_err(), LoginError::MissingCredentials);
    assert_eq!(gate.submit("S1", "").await.unwrap_err(), LoginError::MissingCredentials);
  }

  #[tokio::test]
  async fn test_rejection_carries_server_message() {
    let mut mock = MockDashboardApi::new();
    mock.expect_login().returning(|_, _| Err(LoginError::rejected(Some("bad pw".to_string()))));

    let err = gate(mock).submit("S1", "nope").await.unwrap_err();
    assert_eq!(err.to_string(), "bad pw");
    assert!(err.is_credential_problem());
  }

  #[tokio::test]
  async fn test_rejection_without_message_uses_generic_text() {
    let mut mock = MockDashboardApi::new();
    mock.expect_login().returning(|_, _| Err(LoginError::rejected(None)));

    let err = gate(mock).submit("S1", "nope").await.unwrap_err();
    assert_eq!(err.to_string(), INVALID_CREDENTIALS);
  }

  #[tokio::test]
  async fn test_connection_failure_is_not_a_credential_problem() {
    let mut mock = MockDashboardApi::new();
    mock.expect_login().returning(|_, _| Err(LoginError::Connection));

    let err = gate(mock).submit("S1", "pw").await.unwrap_err();
    assert_eq!(err.to_string(), CONNECTION_FAILED);
    assert!(!err.is_credential_problem());
  }
}
