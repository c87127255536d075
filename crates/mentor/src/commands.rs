//! CLI command handlers.
//!
//! Each handler loads the views it needs, waits for them to settle, and prints
//! the rendered result to stdout. Section failures are part of the rendered
//! output; only login failures and configuration problems return `Err`.

use anyhow::{anyhow, Context as _, Result};
use std::sync::Arc;

use crate::client::{ApiClient, DashboardApi};
use crate::config::DashboardConfig;
use crate::models::StudentIdentity;
use crate::render;
use crate::views::{ProgressView, RecommendationView, ScheduleView, SessionGate};

/// Resolved configuration plus the API handle every command shares
pub struct Context {
  pub config: DashboardConfig,
  pub api: Arc<dyn DashboardApi>,
}

impl Context {
  pub fn new(config: DashboardConfig) -> Result<Self> {
    let client = ApiClient::new(&config).context("Failed to set up the API client")?;
    Ok(Self { config, api: Arc::new(client) })
  }

  pub fn with_api(config: DashboardConfig, api: Arc<dyn DashboardApi>) -> Self {
    Self { config, api }
  }
}

/// Identity from command-line flags; the display name defaults to the id
pub fn identity_from_args(student_id: &str, name: Option<&str>) -> StudentIdentity {
  let student_id = student_id.trim();
  let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(student_id);
  StudentIdentity::new(student_id, name)
}

fn read_password(password: Option<String>) -> Result<String> {
  match password {
    Some(password) => Ok(password),
    None => rpassword::prompt_password("Password: ").context("Failed to read password"),
  }
}

pub async fn login(ctx: &Context, student_id: &str, password: Option<String>) -> Result<StudentIdentity> {
  let password = read_password(password)?;
  chalk::stamped(&format!("Signing in as {}", student_id.trim()));

  let gate = SessionGate::new(Arc::clone(&ctx.api));
  match gate.submit(student_id, &password).await {
    Ok(identity) => {
      chalk::success(&format!("Welcome, {}", identity.display_name));
      Ok(identity)
    }
    Err(err) => {
      if err.is_credential_problem() {
        chalk::warn(&err.to_string());
      } else {
        chalk::error(&err.to_string());
      }
      Err(anyhow!(err).context("Login failed"))
    }
  }
}

pub async fn show_login(ctx: &Context, student_id: &str, password: Option<String>) -> Result<()> {
  let identity = login(ctx, student_id, password).await?;
  print!("{}", render::header(&identity));
  Ok(())
}

pub async fn progress(ctx: &Context, identity: &StudentIdentity) -> Result<()> {
  chalk::stamped("Loading progress");
  let mut view = ProgressView::new(Arc::clone(&ctx.api)).with_failure_policy(ctx.config.insight_failures);
  view.load(identity);
  view.settle().await;
  print!("{}", render::progress_view(&view.state(), view.failure_policy()));
  Ok(())
}

pub async fn recommend(ctx: &Context, identity: &StudentIdentity, open: Option<usize>) -> Result<()> {
  chalk::stamped("Loading recommendations");
  let mut view = RecommendationView::new(Arc::clone(&ctx.api));
  view.load(identity);
  view.settle().await;
  open_card(open, |i| view.select(i));
  print!("{}", render::recommendation_view(&view.state()));
  Ok(())
}

pub async fn schedule(ctx: &Context, identity: Option<&StudentIdentity>, open: Option<usize>) -> Result<()> {
  chalk::stamped("Loading current courses");
  let mut view = ScheduleView::new(Arc::clone(&ctx.api));
  view.load(identity);
  view.settle().await;
  open_card(open, |i| view.select(i));
  print!("{}", render::schedule_view(&view.state()));
  Ok(())
}

/// `--open` counts from 1
fn open_card<F: FnOnce(usize) -> bool>(open: Option<usize>, select: F) {
  let Some(number) = open else { return };
  let opened = number.checked_sub(1).map(select).unwrap_or(false);
  if !opened {
    chalk::warn(&format!("No course card {number} to open"));
  }
}

/// Sign in, then show every view for the signed-in student
pub async fn dashboard(ctx: &Context, student_id: &str, password: Option<String>) -> Result<()> {
  let identity = login(ctx, student_id, password).await?;

  let mut progress = ProgressView::new(Arc::clone(&ctx.api)).with_failure_policy(ctx.config.insight_failures);
  let mut recommendations = RecommendationView::new(Arc::clone(&ctx.api));
  let mut schedule = ScheduleView::new(Arc::clone(&ctx.api));

  progress.load(&identity);
  recommendations.load(&identity);
  schedule.load(Some(&identity));
  tokio::join!(progress.settle(), recommendations.settle(), schedule.settle());

  print!("{}", render::progress_view(&progress.state(), progress.failure_policy()));
  print!("{}", render::recommendation_view(&recommendations.state()));
  print!("{}", render::schedule_view(&schedule.state()));
  Ok(())
}

pub fn show_config(config: &DashboardConfig) -> Result<()> {
  let rendered = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
  println!("{rendered}");
  if let Some(path) = DashboardConfig::default_path() {
    chalk::info(&format!("Default config file: {}", path.display()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_identity_from_args() {
    assert_eq!(identity_from_args(" S1 ", None), StudentIdentity::new("S1", "S1"));
    assert_eq!(identity_from_args("S1", Some("An")), StudentIdentity::new("S1", "An"));
    assert_eq!(identity_from_args("S1", Some("  ")), StudentIdentity::new("S1", "S1"));
  }

  #[test]
  fn test_open_card_counts_from_one() {
    let mut seen = None;
    open_card(Some(2), |i| {
      seen = Some(i);
      true
    });
    assert_eq!(seen, Some(1));

    let mut called = false;
    open_card(Some(0), |_| {
      called = true;
      true
    });
    assert!(!called);
  }
}
