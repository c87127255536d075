//! Course cards and the detail overlay shared by the recommendation and
//! schedule views. Holds nothing beyond the cards and which one is open.

use crate::models::Lesson;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub struct CourseCard {
  pub title: String,
  pub progress: f64,
  pub lecturer: Option<String>,
  pub code: Option<String>,
  /// Schedule cards show lecturer and code, falling back to "N/A"
  pub shows_teaching: bool,
  pub lessons: Vec<Lesson>,
}

impl CourseCard {
  pub fn new(title: impl Into<String>, progress: f64, lessons: Vec<Lesson>) -> Self {
    Self { title: title.into(), progress, lecturer: None, code: None, shows_teaching: false, lessons }
  }

  /// Attach lecturer and subject code; blank values count as missing
  pub fn with_teaching(mut self, lecturer: Option<String>, code: Option<String>) -> Self {
    self.lecturer = lecturer.filter(|v| !v.trim().is_empty());
    self.code = code.filter(|v| !v.trim().is_empty());
    self.shows_teaching = true;
    self
  }

  pub fn lecturer_label(&self) -> &str {
    self.lecturer.as_deref().unwrap_or(NOT_AVAILABLE)
  }

  pub fn code_label(&self) -> &str {
    self.code.as_deref().unwrap_or(NOT_AVAILABLE)
  }
}

/// Read-only view of the selected card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseDetailOverlay<'a> {
  pub index: usize,
  pub card: &'a CourseCard,
}

impl CourseDetailOverlay<'_> {
  pub fn lessons(&self) -> &[Lesson] {
    &self.card.lessons
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseBoard {
  pub cards: Vec<CourseCard>,
  pub selected: Option<usize>,
}

impl CourseBoard {
  pub fn new(cards: Vec<CourseCard>) -> Self {
    Self { cards, selected: None }
  }

  pub fn len(&self) -> usize {
    self.cards.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }

  /// Open the overlay for `index`. Out-of-range indexes close it.
  pub fn select(&mut self, index: usize) -> Option<&CourseCard> {
    self.selected = (index < self.cards.len()).then_some(index);
    self.selected.and_then(|i| self.cards.get(i))
  }

  pub fn close(&mut self) {
    self.selected = None;
  }

  pub fn is_open(&self) -> bool {
    self.overlay().is_some()
  }

  pub fn overlay(&self) -> Option<CourseDetailOverlay<'_>> {
    let index = self.selected?;
    self.cards.get(index).map(|card| CourseDetailOverlay { index, card })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn board() -> CourseBoard {
    CourseBoard::new(vec![CourseCard::new("CS101", 50.0, vec![]), CourseCard::new("MA201", 80.0, vec![])])
  }

  #[test]
  fn test_select_and_close() {
    let mut board = board();
    assert!(!board.is_open());

    let card = board.select(1).unwrap();
    assert_eq!(card.title, "MA201");
    assert_eq!(board.overlay().unwrap().index, 1);

    board.close();
    assert!(board.overlay().is_none());
  }

  #[test]
  fn test_out_of_range_select_stays_closed() {
    let mut board = board();
    board.select(0);
    assert!(board.select(5).is_none());
    assert!(!board.is_open());
  }

  #[test]
  fn test_missing_teaching_details_fall_back() {
    let card = CourseCard::new("CS101", 50.0, vec![])
      .with_teaching(Some("  ".to_string()), Some("CSE123".to_string()));
    assert_eq!(card.lecturer_label(), NOT_AVAILABLE);
    assert_eq!(card.code_label(), "CSE123");
    assert!(card.shows_teaching);
    assert!(!CourseCard::new("CS101", 50.0, vec![]).shows_teaching);
  }
}
