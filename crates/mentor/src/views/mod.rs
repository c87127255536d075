//! View state machines.
//!
//! Each view owns a [`TaskSet`] and a [`SharedState`]. `load` opens a new
//! generation, aborts whatever the previous one still had in flight, and
//! spawns one task per section. A task writes its result only while its
//! generation is still current, so a slow answer for an old student can never
//! overwrite state for the student shown now.

pub mod card;
pub mod progress;
pub mod recommendation;
pub mod schedule;
pub mod session;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::FetchError;

pub use card::{CourseBoard, CourseCard, CourseDetailOverlay};
pub use progress::{BarSeries, DonutSeries, ProgressState, ProgressSummary, ProgressView, StatusBand};
pub use recommendation::{RecommendationPage, RecommendationState, RecommendationView};
pub use schedule::{placeholder_lessons, ScheduleState, ScheduleView};
pub use session::SessionGate;

/// Load state of one independently fetched section
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
  Idle,
  Loading,
  Loaded(T),
  Failed(FetchError),
}

impl<T> Default for Section<T> {
  fn default() -> Self {
    Section::Idle
  }
}

impl<T> Section<T> {
  pub fn from_result(result: Result<T, FetchError>) -> Self {
    match result {
      Ok(value) => Section::Loaded(value),
      Err(err) => Section::Failed(err),
    }
  }

  pub fn loaded(&self) -> Option<&T> {
    match self {
      Section::Loaded(value) => Some(value),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&FetchError> {
    match self {
      Section::Failed(err) => Some(err),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self, Section::Loading)
  }

  /// Loaded or failed
  pub fn is_settled(&self) -> bool {
    matches!(self, Section::Loaded(_) | Section::Failed(_))
  }
}

/// Tag handed to every task spawned for one `load` call
#[derive(Debug, Clone)]
pub struct Generation {
  tag: u64,
  current: Arc<AtomicU64>,
}

impl Generation {
  pub fn tag(&self) -> u64 {
    self.tag
  }

  pub fn is_current(&self) -> bool {
    self.current.load(Ordering::SeqCst) == self.tag
  }
}

/// In-flight fetches of one view plus its generation counter.
///
/// Dropping the set aborts everything still running.
#[derive(Debug, Default)]
pub struct TaskSet {
  generation: Arc<AtomicU64>,
  handles: Vec<JoinHandle<()>>,
}

impl TaskSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Abort the previous generation and open a new one
  pub fn begin(&mut self) -> Generation {
    self.abort_all();
    let tag = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    Generation { tag, current: Arc::clone(&self.generation) }
  }

  /// Spawn a task on the current tokio runtime and track its handle
  pub fn spawn<F>(&mut self, task: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    self.handles.push(tokio::spawn(task));
  }

  pub fn current(&self) -> u64 {
    self.generation.load(Ordering::SeqCst)
  }

  /// Number of tracked tasks that have not finished yet
  pub fn in_flight(&self) -> usize {
    self.handles.iter().filter(|h| !h.is_finished()).count()
  }

  pub fn abort_all(&mut self) {
    for handle in self.handles.drain(..) {
      handle.abort();
    }
  }

  /// Wait until every task of the current generation has finished
  pub async fn settle(&mut self) {
    let handles = std::mem::take(&mut self.handles);
    for result in futures::future::join_all(handles).await {
      if let Err(e) = result {
        if e.is_panic() {
          tracing::error!(error = %e, "view task panicked");
        }
      }
    }
  }
}

impl Drop for TaskSet {
  fn drop(&mut self) {
    self.abort_all();
  }
}

/// View state shared between the view and its fetch tasks
#[derive(Debug, Default)]
pub struct SharedState<S> {
  inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedState<S> {
  fn clone(&self) -> Self {
    Self { inner: Arc::clone(&self.inner) }
  }
}

impl<S> SharedState<S> {
  pub fn new(state: S) -> Self {
    Self { inner: Arc::new(Mutex::new(state)) }
  }

  fn lock(&self) -> MutexGuard<'_, S> {
    // Writers never leave the state half-updated, so a poisoned lock is still usable.
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Replace or edit the state unconditionally
  pub fn update<F>(&self, edit: F)
  where
    F: FnOnce(&mut S),
  {
    edit(&mut self.lock());
  }

  /// Edit the state only if `generation` is still current. Returns whether it applied.
  pub fn apply<F>(&self, generation: &Generation, edit: F) -> bool
  where
    F: FnOnce(&mut S),
  {
    let mut guard = self.lock();
    if !generation.is_current() {
      debug!(generation = generation.tag(), "dropping stale result");
      return false;
    }
    edit(&mut guard);
    true
  }
}

impl<S: Clone> SharedState<S> {
  pub fn snapshot(&self) -> S {
    self.lock().clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[test]
  fn test_section_accessors() {
    let loaded: Section<u8> = Section::from_result(Ok(3));
    assert_eq!(loaded.loaded(), Some(&3));
    assert!(loaded.is_settled());

    let failed: Section<u8> = Section::from_result(Err(FetchError::Timeout { secs: 1 }));
    assert_eq!(failed.error(), Some(&FetchError::Timeout { secs: 1 }));
    assert!(failed.loaded().is_none());

    assert!(Section::<u8>::Loading.is_loading());
    assert!(!Section::<u8>::default().is_settled());
  }

  #[test]
  fn test_generations_advance() {
    let mut tasks = TaskSet::new();
    let first = tasks.begin();
    assert!(first.is_current());

    let second = tasks.begin();
    assert!(!first.is_current());
    assert!(second.is_current());
    assert_eq!(tasks.current(), second.tag());
  }

  #[test]
  fn test_stale_generation_does_not_apply() {
    let mut tasks = TaskSet::new();
    let state = SharedState::new(0u32);

    let old = tasks.begin();
    let new = tasks.begin();

    assert!(!state.apply(&old, |s| *s = 1));
    assert!(state.apply(&new, |s| *s = 2));
    assert_eq!(state.snapshot(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_begin_aborts_in_flight_tasks() {
    let mut tasks = TaskSet::new();
    let state = SharedState::new(Vec::<u64>::new());

    let first = tasks.begin();
    let shared = state.clone();
    tasks.spawn(async move {
      tokio::time::sleep(Duration::from_secs(10)).await;
      shared.update(|s| s.push(first.tag()));
    });

    let second = tasks.begin();
    let shared = state.clone();
    tasks.spawn(async move {
      shared.apply(&second, |s| s.push(second.tag()));
    });

    tasks.settle().await;
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(state.snapshot(), vec![2]);
  }

  #[tokio::test(start_paused = true)]
  async fn test_drop_aborts_tasks() {
    let state = SharedState::new(false);
    {
      let mut tasks = TaskSet::new();
      let shared = state.clone();
      tasks.begin();
      tasks.spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        shared.update(|s| *s = true);
      });
      assert_eq!(tasks.in_flight(), 1);
    }

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!state.snapshot());
  }
}
