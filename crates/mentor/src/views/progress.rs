//! Progress overview: course progress, AI insights, and next-week predictions.
//!
//! The three sections load independently; a failure in one leaves the others
//! untouched.

use std::sync::Arc;
use tracing::{debug, debug_span, Instrument};

use super::{Section, SharedState, TaskSet};
use crate::client::DashboardApi;
use crate::config::SectionFailurePolicy;
use crate::models::{Insight, Prediction, ProgressRecord, StudentIdentity};

pub const DONUT_LABELS: [&str; 2] = ["Completed", "Remaining"];

/// Mean progress over all records, or nothing to average
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressSummary {
  Mean(f64),
  NoData,
}

impl ProgressSummary {
  pub fn from_records(records: &[ProgressRecord]) -> Self {
    if records.is_empty() {
      return ProgressSummary::NoData;
    }
    let total: f64 = records.iter().map(|r| r.progress).sum();
    ProgressSummary::Mean(round_tenths(total / records.len() as f64))
  }

  pub fn mean(&self) -> Option<f64> {
    match self {
      ProgressSummary::Mean(mean) => Some(*mean),
      ProgressSummary::NoData => None,
    }
  }

  pub fn band(&self) -> Option<StatusBand> {
    self.mean().map(StatusBand::for_mean)
  }
}

/// One decimal place, halves away from zero
fn round_tenths(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBand {
  Excellent,
  Good,
  NeedsReinforcement,
}

impl StatusBand {
  /// Lower bounds are inclusive
  pub fn for_mean(mean: f64) -> Self {
    if mean >= 85.0 {
      StatusBand::Excellent
    } else if mean >= 65.0 {
      StatusBand::Good
    } else {
      StatusBand::NeedsReinforcement
    }
  }

  pub fn message(&self) -> &'static str {
    match self {
      StatusBand::Excellent => "Excellent! You are keeping up outstanding form.",
      StatusBand::Good => "Good. A little more push and you will reach the top.",
      StatusBand::NeedsReinforcement => "Needs reinforcement in the foundation courses.",
    }
  }
}

/// Bar chart input: one label per value, server order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
  pub labels: Vec<String>,
  pub values: Vec<f64>,
}

impl BarSeries {
  pub fn from_records(records: &[ProgressRecord]) -> Self {
    let (labels, values) = records.iter().map(|r| (r.course.clone(), r.progress)).unzip();
    Self { labels, values }
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }
}

/// Completed vs remaining share of the mean
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonutSeries {
  pub labels: Vec<String>,
  pub values: Vec<f64>,
}

impl DonutSeries {
  pub fn from_summary(summary: ProgressSummary) -> Self {
    match summary {
      ProgressSummary::NoData => Self::default(),
      ProgressSummary::Mean(mean) => Self {
        labels: DONUT_LABELS.iter().map(|l| l.to_string()).collect(),
        values: vec![mean, round_tenths(100.0 - mean)],
      },
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressState {
  pub student: Option<StudentIdentity>,
  pub records: Section<Vec<ProgressRecord>>,
  pub insights: Section<Vec<Insight>>,
  pub predictions: Section<Vec<Prediction>>,
}

impl ProgressState {
  /// Present once the progress section has loaded
  pub fn summary(&self) -> Option<ProgressSummary> {
    self.records.loaded().map(|records| ProgressSummary::from_records(records))
  }

  pub fn bar_series(&self) -> BarSeries {
    self.records.loaded().map(|r| BarSeries::from_records(r)).unwrap_or_default()
  }

  pub fn donut_series(&self) -> DonutSeries {
    self.summary().map(DonutSeries::from_summary).unwrap_or_default()
  }

  pub fn is_settled(&self) -> bool {
    self.records.is_settled() && self.insights.is_settled() && self.predictions.is_settled()
  }
}

pub struct ProgressView {
  api: Arc<dyn DashboardApi>,
  policy: SectionFailurePolicy,
  state: SharedState<ProgressState>,
  tasks: TaskSet,
}

impl ProgressView {
  pub fn new(api: Arc<dyn DashboardApi>) -> Self {
    Self {
      api,
      policy: SectionFailurePolicy::default(),
      state: SharedState::new(ProgressState::default()),
      tasks: TaskSet::new(),
    }
  }

  pub fn with_failure_policy(mut self, policy: SectionFailurePolicy) -> Self {
    self.policy = policy;
    self
  }

  /// How insight and prediction failures should be shown
  pub fn failure_policy(&self) -> SectionFailurePolicy {
    self.policy
  }

  /// Start fetching all three sections for `identity`, replacing prior state
  pub fn load(&mut self, identity: &StudentIdentity) {
    let generation = self.tasks.begin();
    if identity.id.trim().is_empty() {
      debug!("blank student id, skipping progress fetch");
      self.state.update(|s| *s = ProgressState::default());
      return;
    }

    self.state.update(|s| {
      *s = ProgressState {
        student: Some(identity.clone()),
        records: Section::Loading,
        insights: Section::Loading,
        predictions: Section::Loading,
      }
    });

    let tag = generation.tag();
    let span =
      |section: &'static str| debug_span!("section", section, student_id = %identity.id, generation = tag);

    let (api, state, gen, id) =
      (Arc::clone(&self.api), self.state.clone(), generation.clone(), identity.id.clone());
    self.tasks.spawn(
      async move {
        let result = api.progress(&id).await;
        state.apply(&gen, |s| s.records = Section::from_result(result));
      }
      .instrument(span("progress")),
    );

    let (api, state, gen) = (Arc::clone(&self.api), self.state.clone(), generation.clone());
    self.tasks.spawn(
      async move {
        let result = api.insights().await;
        state.apply(&gen, |s| s.insights = Section::from_result(result));
      }
      .instrument(span("insights")),
    );

    let (api, state, gen, id) =
      (Arc::clone(&self.api), self.state.clone(), generation, identity.id.clone());
    self.tasks.spawn(
      async move {
        let result = api.predictions(&id).await;
        state.apply(&gen, |s| s.predictions = Section::from_result(result));
      }
      .instrument(span("predictions")),
    );
  }

  /// Wait for the current load to finish
  pub async fn settle(&mut self) {
    self.tasks.settle().await;
  }

  pub fn state(&self) -> ProgressState {
    self.state.snapshot()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn records(values: &[f64]) -> Vec<ProgressRecord> {
    values
      .iter()
      .enumerate()
      .map(|(i, v)| ProgressRecord { course: format!("C{i}"), progress: *v })
      .collect()
  }

  #[test]
  fn test_mean_and_bands() {
    let summary = ProgressSummary::from_records(&records(&[80.0, 90.0]));
    assert_eq!(summary, ProgressSummary::Mean(85.0));
    assert_eq!(summary.band(), Some(StatusBand::Excellent));
  }

  #[test]
  fn test_band_boundaries_are_inclusive() {
    assert_eq!(StatusBand::for_mean(85.0), StatusBand::Excellent);
    assert_eq!(StatusBand::for_mean(84.9), StatusBand::Good);
    assert_eq!(StatusBand::for_mean(65.0), StatusBand::Good);
    assert_eq!(StatusBand::for_mean(64.9), StatusBand::NeedsReinforcement);
  }

  #[test]
  fn test_mean_is_rounded_before_banding() {
    // 84.96 rounds to 85.0, so the band follows the displayed value.
    let summary = ProgressSummary::from_records(&records(&[84.92, 85.0]));
    assert_eq!(summary, ProgressSummary::Mean(85.0));
    assert_eq!(summary.band(), Some(StatusBand::Excellent));

    let summary = ProgressSummary::from_records(&records(&[70.0, 71.0, 71.0]));
    assert_eq!(summary, ProgressSummary::Mean(70.7));
  }

  #[test]
  fn test_no_records_is_no_data() {
    let summary = ProgressSummary::from_records(&[]);
    assert_eq!(summary, ProgressSummary::NoData);
    assert_eq!(summary.band(), None);
    assert!(DonutSeries::from_summary(summary).values.is_empty());
  }

  #[test]
  fn test_bar_series_keeps_server_order() {
    let series = BarSeries::from_records(&[
      ProgressRecord { course: "Z".to_string(), progress: 10.0 },
      ProgressRecord { course: "A".to_string(), progress: 90.0 },
    ]);
    assert_eq!(series.labels, vec!["Z", "A"]);
    assert_eq!(series.values, vec![10.0, 90.0]);
    assert_eq!(series.len(), 2);
  }

  #[test]
  fn test_donut_series() {
    let donut = DonutSeries::from_summary(ProgressSummary::Mean(72.5));
    assert_eq!(donut.labels, vec!["Completed", "Remaining"]);
    assert_eq!(donut.values, vec![72.5, 27.5]);
  }

  #[test]
  fn test_state_without_records_has_no_summary() {
    let state = ProgressState { records: Section::Loading, ..Default::default() };
    assert!(state.summary().is_none());
    assert!(state.bar_series().is_empty());
    assert!(!state.is_settled());
  }
}
