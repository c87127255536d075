//! Courses the student is taking this term

use std::sync::Arc;
use tracing::{debug, debug_span, Instrument};

use super::{CourseBoard, CourseCard, SharedState, TaskSet};
use crate::client::DashboardApi;
use crate::error::FetchError;
use crate::models::{Lesson, ScheduledCourse, StudentIdentity};
use crate::views::recommendation::LESSON_LINK;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScheduleState {
  /// No student to load for; nothing was requested
  #[default]
  NoIdentity,
  Loading { student: StudentIdentity },
  Loaded { student: StudentIdentity, message: String, board: CourseBoard },
  Failed { student: StudentIdentity, error: FetchError },
}

impl ScheduleState {
  pub fn student(&self) -> Option<&StudentIdentity> {
    match self {
      ScheduleState::NoIdentity => None,
      ScheduleState::Loading { student }
      | ScheduleState::Loaded { student, .. }
      | ScheduleState::Failed { student, .. } => Some(student),
    }
  }

  pub fn board(&self) -> Option<&CourseBoard> {
    match self {
      ScheduleState::Loaded { board, .. } => Some(board),
      _ => None,
    }
  }
}

/// Summary line for a term with `count` courses
pub fn schedule_message(count: usize) -> String {
  match count {
    0 => "No courses found for this term.".to_string(),
    1 => "Found 1 course this term.".to_string(),
    n => format!("Found {n} courses this term."),
  }
}

/// Lesson list shown on every schedule card until the backend serves real lessons
pub fn placeholder_lessons() -> Vec<Lesson> {
  vec![
    Lesson {
      title: "Assignments".to_string(),
      note: "Assignment list (PDF/DOCX)".to_string(),
      match_score: None,
      document: Some(LESSON_LINK.to_string()),
      video: None,
      ai_advisor: false,
    },
    Lesson {
      title: "Quiz".to_string(),
      note: "Quiz links (Google Form/Kahoot)".to_string(),
      match_score: None,
      document: None,
      video: Some(LESSON_LINK.to_string()),
      ai_advisor: false,
    },
    Lesson {
      title: "AI Advisor".to_string(),
      note: "Chat with the AI about this course".to_string(),
      match_score: None,
      document: None,
      video: None,
      ai_advisor: true,
    },
  ]
}

pub fn board_for(courses: Vec<ScheduledCourse>, lessons: fn() -> Vec<Lesson>) -> CourseBoard {
  let cards = courses
    .into_iter()
    .map(|c| CourseCard::new(c.course, c.progress, lessons()).with_teaching(c.teacher_name, c.subject_code))
    .collect();
  CourseBoard::new(cards)
}

pub struct ScheduleView {
  api: Arc<dyn DashboardApi>,
  lessons: fn() -> Vec<Lesson>,
  state: SharedState<ScheduleState>,
  tasks: TaskSet,
}

impl ScheduleView {
  pub fn new(api: Arc<dyn DashboardApi>) -> Self {
    Self {
      api,
      lessons: placeholder_lessons,
      state: SharedState::new(ScheduleState::default()),
      tasks: TaskSet::new(),
    }
  }

  /// Replace the lesson source used for every card
  pub fn with_lessons(mut self, lessons: fn() -> Vec<Lesson>) -> Self {
    self.lessons = lessons;
    self
  }

  pub fn load(&mut self, identity: Option<&StudentIdentity>) {
    let generation = self.tasks.begin();

    let Some(student) = identity.filter(|s| !s.id.trim().is_empty()).cloned() else {
      debug!("no student identity, skipping schedule fetch");
      self.state.update(|s| *s = ScheduleState::NoIdentity);
      return;
    };

    self.state.update(|s| *s = ScheduleState::Loading { student: student.clone() });

    let span = debug_span!(
      "section",
      section = "schedule",
      student_id = %student.id,
      generation = generation.tag()
    );
    let (api, state, lessons) = (Arc::clone(&self.api), self.state.clone(), self.lessons);
    self.tasks.spawn(
      async move {
        let next = match api.current_schedule(&student.id).await {
          Ok(courses) => ScheduleState::Loaded {
            message: schedule_message(courses.len()),
            board: board_for(courses, lessons),
            student,
          },
          Err(error) => ScheduleState::Failed { student, error },
        };
        state.apply(&generation, |s| *s = next);
      }
      .instrument(span),
    );
  }

  pub async fn settle(&mut self) {
    self.tasks.settle().await;
  }

  pub fn state(&self) -> ScheduleState {
    self.state.snapshot()
  }

  /// Open the detail overlay for card `index`; false when out of range or not loaded
  pub fn select(&self, index: usize) -> bool {
    let mut opened = false;
    self.state.update(|s| {
      if let ScheduleState::Loaded { board, .. } = s {
        opened = board.select(index).is_some();
      }
    });
    opened
  }

  pub fn close(&self) {
    self.state.update(|s| {
      if let ScheduleState::Loaded { board, .. } = s {
        board.close();
      }
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::views::card::NOT_AVAILABLE;

  #[test]
  fn test_messages_are_singular_and_plural() {
    assert_eq!(schedule_message(0), "No courses found for this term.");
    assert_eq!(schedule_message(1), "Found 1 course this term.");
    assert_eq!(schedule_message(4), "Found 4 courses this term.");
  }

  #[test]
  fn test_placeholder_lessons() {
    let lessons = placeholder_lessons();
    assert_eq!(lessons.len(), 3);
    assert!(lessons.iter().all(|l| l.match_score.is_none()));
    assert!(lessons[2].ai_advisor);
    assert_eq!(lessons[0].document.as_deref(), Some(LESSON_LINK));
  }

  #[test]
  fn test_board_uses_lesson_source_and_fallbacks() {
    let courses = vec![ScheduledCourse {
      course: "CS101".to_string(),
      progress: 50.0,
      teacher_name: None,
      subject_code: Some("CSE123".to_string()),
    }];
    let board = board_for(courses, placeholder_lessons);
    let card = &board.cards[0];
    assert_eq!(card.progress, 50.0);
    assert_eq!(card.lessons, placeholder_lessons());
    assert_eq!(card.lecturer_label(), NOT_AVAILABLE);
    assert_eq!(card.code_label(), "CSE123");
  }

  #[test]
  fn test_custom_lesson_source() {
    fn none() -> Vec<Lesson> {
      Vec::new()
    }
    let courses = vec![ScheduledCourse {
      course: "CS101".to_string(),
      progress: 50.0,
      teacher_name: None,
      subject_code: None,
    }];
    assert!(board_for(courses, none).cards[0].lessons.is_empty());
  }
}
