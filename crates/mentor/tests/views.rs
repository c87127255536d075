use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mentor::models::{
  Insight, Prediction, ProgressRecord, Recommendation, RecommendationsResponse, ScheduledCourse,
};
use mentor::views::{
  placeholder_lessons, ProgressSummary, ProgressView, RecommendationView, ScheduleState,
  ScheduleView, Section, StatusBand,
};
use mentor::{DashboardApi, FetchError, LoginError, StudentIdentity};

/// Canned backend with a per-student response delay
#[derive(Default)]
struct FakeApi {
  delays: HashMap<String, Duration>,
  progress: HashMap<String, Vec<ProgressRecord>>,
  insights_error: Option<FetchError>,
  predictions_error: Option<FetchError>,
  recommendations: HashMap<String, Vec<Recommendation>>,
  schedule: HashMap<String, Vec<ScheduledCourse>>,
  calls: AtomicUsize,
}

impl FakeApi {
  fn delay_for(mut self, student_id: &str, secs: u64) -> Self {
    self.delays.insert(student_id.to_string(), Duration::from_secs(secs));
    self
  }

  fn with_progress(mut self, student_id: &str, values: &[(&str, f64)]) -> Self {
    let records = values
      .iter()
      .map(|(course, progress)| ProgressRecord { course: course.to_string(), progress: *progress })
      .collect();
    self.progress.insert(student_id.to_string(), records);
    self
  }

  async fn respond(&self, student_id: &str) {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.delays.get(student_id) {
      tokio::time::sleep(*delay).await;
    }
  }

  fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl DashboardApi for FakeApi {
  async fn login(&self, student_id: &str, _password: &str) -> Result<StudentIdentity, LoginError> {
    self.respond(student_id).await;
    Ok(StudentIdentity::new(student_id, student_id))
  }

  async fn progress(&self, student_id: &str) -> Result<Vec<ProgressRecord>, FetchError> {
    self.respond(student_id).await;
    Ok(self.progress.get(student_id).cloned().unwrap_or_default())
  }

  async fn insights(&self) -> Result<Vec<Insight>, FetchError> {
    self.respond("").await;
    match &self.insights_error {
      Some(err) => Err(err.clone()),
      None => Ok(vec!["Students who review weekly finish 20% faster.".to_string()]),
    }
  }

  async fn predictions(&self, student_id: &str) -> Result<Vec<Prediction>, FetchError> {
    self.respond(student_id).await;
    match &self.predictions_error {
      Some(err) => Err(err.clone()),
      None => Ok(vec![Prediction {
        course: "CS101".to_string(),
        predicted_progress: 70.0,
        risk: 15.0,
        advice: "Keep going".to_string(),
      }]),
    }
  }

  async fn recommendations(&self, student_id: &str) -> Result<RecommendationsResponse, FetchError> {
    self.respond(student_id).await;
    Ok(RecommendationsResponse {
      recommendations: self.recommendations.get(student_id).cloned().unwrap_or_default(),
      message: format!("for {student_id}"),
    })
  }

  async fn current_schedule(&self, student_id: &str) -> Result<Vec<ScheduledCourse>, FetchError> {
    self.respond(student_id).await;
    Ok(self.schedule.get(student_id).cloned().unwrap_or_default())
  }
}

fn student(id: &str) -> StudentIdentity {
  StudentIdentity::new(id, format!("Student {id}"))
}

#[tokio::test(start_paused = true)]
async fn test_slow_response_for_previous_student_is_discarded() {
  let api = Arc::new(
    FakeApi::default()
      .delay_for("A", 10)
      .delay_for("B", 1)
      .with_progress("A", &[("Old", 10.0)])
      .with_progress("B", &[("New", 90.0)]),
  );
  let mut view = ProgressView::new(api);

  view.load(&student("A"));
  tokio::time::sleep(Duration::from_secs(2)).await;
  view.load(&student("B"));
  view.settle().await;

  let state = view.state();
  assert_eq!(state.student.as_ref().map(|s| s.id.as_str()), Some("B"));
  assert_eq!(state.bar_series().labels, vec!["New"]);

  // Well past A's delay: nothing of A's may show up.
  tokio::time::sleep(Duration::from_secs(30)).await;
  let state = view.state();
  assert_eq!(state.bar_series().labels, vec!["New"]);
  assert_eq!(state.summary(), Some(ProgressSummary::Mean(90.0)));
}

#[tokio::test(start_paused = true)]
async fn test_schedule_reload_keeps_latest_student() {
  let mut api = FakeApi::default().delay_for("A", 10);
  api.schedule.insert(
    "A".to_string(),
    vec![ScheduledCourse { course: "Old".to_string(), progress: 1.0, teacher_name: None, subject_code: None }],
  );
  let mut view = ScheduleView::new(Arc::new(api));

  view.load(Some(&student("A")));
  view.load(Some(&student("B")));
  view.settle().await;
  tokio::time::sleep(Duration::from_secs(30)).await;

  match view.state() {
    ScheduleState::Loaded { student, message, board } => {
      assert_eq!(student.id, "B");
      assert_eq!(message, "No courses found for this term.");
      assert!(board.is_empty());
    }
    other => panic!("Expected Loaded state, got: {other:?}"),
  }
}

#[tokio::test(start_paused = true)]
async fn test_one_failing_section_leaves_the_others_loaded() {
  let api = FakeApi {
    insights_error: Some(FetchError::server(500, "insight model offline")),
    ..FakeApi::default()
  }
  .with_progress("S1", &[("CS101", 80.0), ("MA201", 90.0)]);
  let mut view = ProgressView::new(Arc::new(api));

  view.load(&student("S1"));
  view.settle().await;

  let state = view.state();
  assert!(state.is_settled());
  assert_eq!(state.insights.error(), Some(&FetchError::server(500, "insight model offline")));
  assert_eq!(state.predictions.loaded().map(Vec::len), Some(1));
  assert_eq!(state.summary(), Some(ProgressSummary::Mean(85.0)));
  assert_eq!(state.summary().and_then(|s| s.band()), Some(StatusBand::Excellent));
}

#[tokio::test(start_paused = true)]
async fn test_no_progress_records_is_no_data() {
  let mut view = ProgressView::new(Arc::new(FakeApi::default()));
  view.load(&student("S1"));
  view.settle().await;

  let state = view.state();
  assert_eq!(state.summary(), Some(ProgressSummary::NoData));
  assert!(state.donut_series().values.is_empty());
  assert!(matches!(state.records, Section::Loaded(ref r) if r.is_empty()));
}

#[tokio::test(start_paused = true)]
async fn test_schedule_without_identity_makes_no_request() {
  let api = Arc::new(FakeApi::default());
  let mut view = ScheduleView::new(api.clone());

  view.load(None);
  view.settle().await;
  assert_eq!(view.state(), ScheduleState::NoIdentity);

  view.load(Some(&StudentIdentity::new("  ", "Nobody")));
  view.settle().await;
  assert_eq!(view.state(), ScheduleState::NoIdentity);
  assert_eq!(api.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_blank_student_id_makes_no_request() {
  let api = Arc::new(FakeApi::default());
  let blank = StudentIdentity::new("  ", "Nobody");

  let mut progress = ProgressView::new(api.clone());
  progress.load(&blank);
  progress.settle().await;
  let state = progress.state();
  assert!(state.student.is_none());
  assert!(matches!(state.records, Section::Idle));
  assert!(matches!(state.insights, Section::Idle));
  assert!(matches!(state.predictions, Section::Idle));

  let mut recommendations = RecommendationView::with_rng(api.clone(), StdRng::seed_from_u64(3));
  recommendations.load(&blank);
  recommendations.settle().await;
  let state = recommendations.state();
  assert!(state.student.is_none());
  assert!(matches!(state.page, Section::Idle));

  assert_eq!(api.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_single_course_schedule() {
  let mut api = FakeApi::default();
  api.schedule.insert(
    "S1".to_string(),
    vec![ScheduledCourse { course: "CS101".to_string(), progress: 50.0, teacher_name: None, subject_code: None }],
  );
  let mut view = ScheduleView::new(Arc::new(api));

  view.load(Some(&student("S1")));
  view.settle().await;

  let state = view.state();
  let ScheduleState::Loaded { message, board, .. } = &state else {
    panic!("Expected Loaded state, got: {state:?}");
  };
  assert_eq!(message, "Found 1 course this term.");
  assert_eq!(board.cards[0].progress, 50.0);
  assert_eq!(board.cards[0].lessons, placeholder_lessons());
  assert_eq!(board.cards[0].lecturer_label(), "N/A");
}

#[tokio::test(start_paused = true)]
async fn test_empty_recommendations_are_all_clear() {
  let mut view = RecommendationView::with_rng(Arc::new(FakeApi::default()), StdRng::seed_from_u64(3));
  view.load(&student("S1"));
  view.settle().await;

  let state = view.state();
  let page = state.page.loaded().expect("page loaded");
  assert!(page.is_all_clear());
  assert_eq!(page.message, "for S1");
}

#[tokio::test(start_paused = true)]
async fn test_reload_closes_the_overlay() {
  let mut api = FakeApi::default();
  api.recommendations.insert(
    "S1".to_string(),
    vec![Recommendation {
      course: "Physics".to_string(),
      progress: 40.0,
      roadmap: vec!["Review kinematics".to_string()],
    }],
  );
  let mut view = RecommendationView::with_rng(Arc::new(api), StdRng::seed_from_u64(3));

  view.load(&student("S1"));
  view.settle().await;
  assert!(view.select(0));
  assert!(!view.select(4));
  assert!(view.select(0));
  assert!(view.state().page.loaded().is_some_and(|p| p.board.is_open()));

  view.load(&student("S1"));
  view.settle().await;
  let state = view.state();
  let page = state.page.loaded().expect("page loaded");
  assert!(!page.board.is_open());
  assert_eq!(page.board.cards[0].lessons[0].title, "Chapter 1");
}
