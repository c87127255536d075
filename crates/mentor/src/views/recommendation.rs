//! Course recommendations with a synthesised lesson roadmap per course

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, debug_span, Instrument};

use super::{CourseBoard, CourseCard, Section, SharedState, TaskSet};
use crate::client::DashboardApi;
use crate::models::{Lesson, RecommendationsResponse, StudentIdentity};

/// Placeholder link for lesson material the backend does not provide yet
pub const LESSON_LINK: &str = "#";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationPage {
  pub message: String,
  pub board: CourseBoard,
}

impl RecommendationPage {
  pub fn from_response<R: Rng>(response: RecommendationsResponse, rng: &mut R) -> Self {
    let cards = response
      .recommendations
      .into_iter()
      .map(|rec| {
        let lessons = synthesize_lessons(&rec.roadmap, rng);
        CourseCard::new(rec.course, rec.progress, lessons)
      })
      .collect();
    Self { message: response.message, board: CourseBoard::new(cards) }
  }

  /// Nothing to improve on
  pub fn is_all_clear(&self) -> bool {
    self.board.is_empty()
  }
}

/// One "Chapter N" lesson per roadmap entry, with a cosmetic match score in 70..=79
pub fn synthesize_lessons<R: Rng>(roadmap: &[String], rng: &mut R) -> Vec<Lesson> {
  roadmap
    .iter()
    .enumerate()
    .map(|(i, step)| Lesson {
      title: format!("Chapter {}", i + 1),
      note: step.clone(),
      match_score: Some(rng.random_range(70..=79)),
      document: Some(LESSON_LINK.to_string()),
      video: Some(LESSON_LINK.to_string()),
      ai_advisor: false,
    })
    .collect()
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationState {
  pub student: Option<StudentIdentity>,
  pub page: Section<RecommendationPage>,
}

pub struct RecommendationView {
  api: Arc<dyn DashboardApi>,
  rng: StdRng,
  state: SharedState<RecommendationState>,
  tasks: TaskSet,
}

impl RecommendationView {
  pub fn new(api: Arc<dyn DashboardApi>) -> Self {
    Self::with_rng(api, StdRng::from_os_rng())
  }

  /// Use a specific generator for match scores
  pub fn with_rng(api: Arc<dyn DashboardApi>, rng: StdRng) -> Self {
    Self { api, rng, state: SharedState::new(RecommendationState::default()), tasks: TaskSet::new() }
  }

  pub fn load(&mut self, identity: &StudentIdentity) {
    let generation = self.tasks.begin();
    if identity.id.trim().is_empty() {
      debug!("blank student id, skipping recommendation fetch");
      self.state.update(|s| *s = RecommendationState::default());
      return;
    }

    self.state.update(|s| {
      *s = RecommendationState { student: Some(identity.clone()), page: Section::Loading }
    });

    let span = debug_span!(
      "section",
      section = "recommendations",
      student_id = %identity.id,
      generation = generation.tag()
    );
    let mut rng = StdRng::from_rng(&mut self.rng);
    let (api, state, id) = (Arc::clone(&self.api), self.state.clone(), identity.id.clone());
    self.tasks.spawn(
      async move {
        let page = api
          .recommendations(&id)
          .await
          .map(|response| RecommendationPage::from_response(response, &mut rng));
        state.apply(&generation, |s| s.page = Section::from_result(page));
      }
      .instrument(span),
    );
  }

  pub async fn settle(&mut self) {
    self.tasks.settle().await;
  }

  pub fn state(&self) -> RecommendationState {
    self.state.snapshot()
  }

  /// Open the detail overlay for card `index`; false when out of range or not loaded
  pub fn select(&self, index: usize) -> bool {
    let mut opened = false;
    self.state.update(|s| {
      if let Section::Loaded(page) = &mut s.page {
        opened = page.board.select(index).is_some();
      }
    });
    opened
  }

  pub fn close(&self) {
    self.state.update(|s| {
      if let Section::Loaded(page) = &mut s.page {
        page.board.close();
      }
    });
  }
}
