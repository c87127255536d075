//! Terminal rendering of view state.
//!
//! Every function returns a `String`; printing is the caller's business.

use chalk::draw::{bar, fit, gauge, wrap_text};
use colored::*;
use console::measure_text_width;
use url::Url;

use crate::config::SectionFailurePolicy;
use crate::error::FetchError;
use crate::models::{Insight, Lesson, Prediction, StudentIdentity};
use crate::views::{
  BarSeries, CourseBoard, CourseCard, CourseDetailOverlay, ProgressState, ProgressSummary,
  RecommendationState, ScheduleState, Section, StatusBand,
};

const AVATAR_ENDPOINT: &str = "https://ui-avatars.com/api/";
const BAR_WIDTH: usize = 24;
const LABEL_WIDTH: usize = 28;
const TEXT_WIDTH: usize = 72;

/// Avatar image for a display name
pub fn avatar_url(name: &str) -> String {
  let params = [("name", name), ("background", "1976d2"), ("color", "fff")];
  match Url::parse_with_params(AVATAR_ENDPOINT, &params) {
    Ok(url) => url.to_string(),
    Err(_) => AVATAR_ENDPOINT.to_string(),
  }
}

pub fn header(student: &StudentIdentity) -> String {
  let mut out = format!("{}\n", student.display_name.bold());
  out.push_str(&format!("  Student ID: {}\n", student.id.bold()));
  if let Some(major) = student.major.as_deref().filter(|m| !m.trim().is_empty()) {
    out.push_str(&format!("  Major: {major}\n"));
  }
  out.push_str(&format!("  Avatar: {}\n", avatar_url(&student.display_name).dimmed()));
  out
}

fn heading(title: &str) -> String {
  format!("\n{}\n", chalk::banner(&title.bold().to_string(), Some(measure_text_width(title)), '-'))
}

fn failure(err: &FetchError) -> String {
  format!("  {} {}\n", "!".red().bold(), err.user_message().red())
}

fn loading() -> String {
  format!("  {}\n", "Loading...".dimmed())
}

// Progress
// ========

/// One line per course: label, bar, percentage
pub fn bar_chart(series: &BarSeries) -> String {
  let mut out = String::new();
  for (label, value) in series.labels.iter().zip(&series.values) {
    out.push_str(&format!(
      "  {} {} {:>5.1}%\n",
      fit(label, LABEL_WIDTH),
      bar(*value, 100.0, BAR_WIDTH).blue(),
      value
    ));
  }
  out
}

pub fn summary(summary: ProgressSummary) -> String {
  match summary {
    ProgressSummary::NoData => format!("  {}\n", "No progress recorded yet.".dimmed()),
    ProgressSummary::Mean(mean) => {
      let mut out = format!("  {}\n", gauge(mean, BAR_WIDTH).blue());
      out.push_str(&format!("  Completed {mean:.1}% / Remaining {:.1}%\n", 100.0 - mean));
      out.push_str(&format!("  Average: {}\n", format!("{mean:.1}%").bold()));
      out
    }
  }
}

pub fn status_line(band: StatusBand) -> String {
  let message = match band {
    StatusBand::Excellent => band.message().green(),
    StatusBand::Good => band.message().yellow(),
    StatusBand::NeedsReinforcement => band.message().red(),
  };
  format!("  {message}\n")
}

pub fn insights(section: &Section<Vec<Insight>>, policy: SectionFailurePolicy) -> String {
  match section {
    Section::Idle => String::new(),
    Section::Loading => loading(),
    Section::Failed(err) if policy == SectionFailurePolicy::Surface => failure(err),
    Section::Failed(_) => String::new(),
    Section::Loaded(items) if items.is_empty() => format!("  {}\n", "No insights yet.".dimmed()),
    Section::Loaded(items) => items.iter().map(|i| bullet(i)).collect(),
  }
}

pub fn predictions(section: &Section<Vec<Prediction>>, policy: SectionFailurePolicy) -> String {
  match section {
    Section::Idle => String::new(),
    Section::Loading => loading(),
    Section::Failed(err) if policy == SectionFailurePolicy::Surface => failure(err),
    Section::Failed(_) => String::new(),
    Section::Loaded(items) if items.is_empty() => format!("  {}\n", "No predictions yet.".dimmed()),
    Section::Loaded(items) => items
      .iter()
      .map(|p| {
        let line = format!(
          "{}: predicted {:.1}% ({:.1}% risk). {}",
          p.course, p.predicted_progress, p.risk, p.advice
        );
        bullet(line.trim_end())
      })
      .collect(),
  }
}

fn bullet(text: &str) -> String {
  let mut out = String::new();
  for (i, line) in wrap_text(text, TEXT_WIDTH).iter().enumerate() {
    let marker = if i == 0 { "•" } else { " " };
    out.push_str(&format!("  {marker} {line}\n"));
  }
  out
}

pub fn progress_view(state: &ProgressState, policy: SectionFailurePolicy) -> String {
  let mut out = String::new();
  if let Some(student) = &state.student {
    out.push_str(&header(student));
  }

  out.push_str(&heading("Learning progress"));
  match &state.records {
    Section::Idle => {}
    Section::Loading => out.push_str(&loading()),
    Section::Failed(err) => out.push_str(&failure(err)),
    Section::Loaded(_) => out.push_str(&bar_chart(&state.bar_series())),
  }

  if let Some(mean) = state.summary() {
    out.push_str(&heading("Progress overview"));
    out.push_str(&summary(mean));
    if let Some(band) = mean.band() {
      out.push_str(&status_line(band));
    }
  }

  out.push_str(&heading("AI analysis"));
  out.push_str(&insights(&state.insights, policy));

  out.push_str(&heading("Next week forecast"));
  out.push_str(&predictions(&state.predictions, policy));
  out
}

// Course cards
// ============

pub fn course_card(index: usize, card: &CourseCard) -> String {
  let mut out = format!("  [{}] {}\n", index + 1, card.title.bold());
  out.push_str(&format!("      {}\n", gauge(card.progress, BAR_WIDTH).blue()));
  if card.shows_teaching {
    out.push_str(&format!("      Lecturer: {}  Code: {}\n", card.lecturer_label(), card.code_label()));
  }
  out.push_str(&format!("      {} lessons\n", card.lessons.len()).dimmed().to_string());
  out
}

pub fn course_board(board: &CourseBoard) -> String {
  let mut out: String = board.cards.iter().enumerate().map(|(i, c)| course_card(i, c)).collect();
  if let Some(overlay) = board.overlay() {
    out.push_str(&detail_overlay(&overlay));
  }
  out
}

fn lesson(lesson: &Lesson) -> String {
  let mut title = lesson.title.bold().to_string();
  if let Some(score) = lesson.match_score {
    title.push_str(&format!(" ({score}% match)").dimmed().to_string());
  }
  if lesson.ai_advisor {
    title.push_str(&" [AI]".cyan().to_string());
  }

  let mut out = format!("    - {title}\n");
  for line in wrap_text(&lesson.note, TEXT_WIDTH - 6) {
    out.push_str(&format!("      {line}\n"));
  }
  let links: Vec<String> = [("document", &lesson.document), ("video", &lesson.video)]
    .iter()
    .filter_map(|(kind, link)| link.as_ref().map(|l| format!("{kind}: {l}")))
    .collect();
  if !links.is_empty() {
    out.push_str(&format!("      {}\n", links.join("  ").dimmed()));
  }
  out
}

pub fn detail_overlay(overlay: &CourseDetailOverlay<'_>) -> String {
  let card = overlay.card;
  let title = format!("{} ({:.1}%)", card.title, card.progress);
  let mut out = format!("\n{}\n", chalk::banner(&title, None, '='));
  if card.shows_teaching {
    out.push_str(&format!("  Lecturer: {}\n  Code: {}\n", card.lecturer_label(), card.code_label()));
  }
  if overlay.lessons().is_empty() {
    out.push_str(&format!("    {}\n", "No lessons.".dimmed()));
  }
  for item in overlay.lessons() {
    out.push_str(&lesson(item));
  }
  out
}

// Pages
// =====

pub fn recommendation_view(state: &RecommendationState) -> String {
  let mut out = heading("Suggested learning path");
  if let Some(student) = &state.student {
    out.push_str(&format!(
      "  Hello {}, these are the courses to focus on:\n",
      student.display_name.bold()
    ));
  }

  match &state.page {
    Section::Idle => {}
    Section::Loading => out.push_str(&loading()),
    Section::Failed(err) => out.push_str(&failure(err)),
    Section::Loaded(page) => {
      if !page.message.trim().is_empty() {
        out.push_str(&format!("  {}\n", page.message.italic()));
      }
      if page.is_all_clear() {
        out.push_str(&format!(
          "  {}\n",
          "No courses need improvement. Keep up the good work!".green()
        ));
      } else {
        out.push_str(&course_board(&page.board));
      }
    }
  }
  out
}

pub fn schedule_view(state: &ScheduleState) -> String {
  let mut out = heading("Current courses (this term)");
  match state {
    ScheduleState::NoIdentity => {
      out.push_str(&format!("  {}\n", "Log in to see your courses.".dimmed()));
    }
    ScheduleState::Loading { .. } => out.push_str(&loading()),
    ScheduleState::Failed { error, .. } => out.push_str(&failure(error)),
    ScheduleState::Loaded { student, message, board } => {
      out.push_str(&format!("  Hello {}, here are your courses:\n", student.display_name.bold()));
      out.push_str(&format!("  {}\n", message.italic()));
      out.push_str(&course_board(board));
    }
  }
  out
}
