//! In-memory path store with optimistic concurrency.
//!
//! Each `PracticePath` carries a `version`. Writers work on a snapshot taken under the read lock and
//! commit under the write lock only if the stored version is still the one they read. A lost race
//! re-reads and reapplies the same single transition.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::{PathRecord, PathStatus};
use crate::error::PathError;

#[derive(Clone)]
pub struct PathStore {
  paths: Arc<RwLock<HashMap<Uuid, PathRecord>>>,
  max_retries: usize,
}

impl PathStore {
  pub fn new(max_retries: usize) -> Self {
    Self { paths: Arc::new(RwLock::new(HashMap::new())), max_retries: max_retries.max(1) }
  }

  /// Store a freshly generated path in one step.
  #[instrument(level = "debug", skip(self, record), fields(id = %record.path.id, problems = record.problems.len()))]
  pub async fn insert(&self, record: PathRecord) {
    self.paths.write().await.insert(record.path.id, record);
  }

  pub async fn get(&self, id: Uuid) -> Result<PathRecord, PathError> {
    self
      .paths
      .read()
      .await
      .get(&id)
      .cloned()
      .ok_or_else(|| PathError::NotFound(format!("Practice path {id}")))
  }

  /// Summaries, most recently updated first, optionally filtered by status.
  pub async fn list(&self, status: Option<PathStatus>) -> Vec<PathRecord> {
    let mut out: Vec<PathRecord> = self
      .paths
      .read()
      .await
      .values()
      .filter(|r| status.map_or(true, |s| r.path.status == s))
      .cloned()
      .collect();
    out.sort_by(|a, b| b.path.updated_at.cmp(&a.path.updated_at).then(a.path.id.cmp(&b.path.id)));
    out
  }

  pub async fn remove(&self, id: Uuid) -> Result<(), PathError> {
    self
      .paths
      .write()
      .await
      .remove(&id)
      .map(|_| ())
      .ok_or_else(|| PathError::NotFound(format!("Practice path {id}")))
  }

  /// Apply `op` to a snapshot and commit it if nobody else committed in between.
  /// `op` returns its result plus whether the record actually changed; unchanged records are not written.
  /// Returns the result together with the record as stored afterwards.
  #[instrument(level = "debug", skip(self, op), fields(%id))]
  pub async fn apply<T, F>(&self, id: Uuid, mut op: F) -> Result<(T, PathRecord), PathError>
  where
    F: FnMut(&mut PathRecord) -> Result<(T, bool), PathError>,
  {
    for attempt in 1..=self.max_retries {
      let mut working = self.get(id).await?;
      let seen = working.path.version;
      let (out, changed) = op(&mut working)?;
      if !changed {
        return Ok((out, working));
      }

      let mut paths = self.paths.write().await;
      let Some(stored) = paths.get_mut(&id) else {
        return Err(PathError::NotFound(format!("Practice path {id}")));
      };
      if stored.path.version == seen {
        working.path.version = seen + 1;
        *stored = working.clone();
        debug!(target: "progression", %id, version = seen + 1, attempt, "Committed");
        return Ok((out, working));
      }
      warn!(target: "progression", %id, seen, current = stored.path.version, attempt, "Version conflict; reapplying");
    }
    Err(PathError::Conflict(id))
  }

  /// Test hook: bump the stored version as if another writer committed.
  #[cfg(test)]
  pub fn bump_version(&self, id: Uuid) {
    let mut paths = self.paths.try_write().expect("store is not locked");
    if let Some(r) = paths.get_mut(&id) {
      r.path.version += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{GenerationRequest, Problem, TrainingMode};
  use crate::generator::{build_record, PathPlan};
  use crate::progression::{self, Transition};
  use chrono::Utc;

  fn record(n: i64, forced: bool) -> PathRecord {
    let req = GenerationRequest {
      name: Some("walk".into()),
      topics: ["dp".to_string()].into(),
      min_rating: 800,
      max_rating: 1600,
      mode: TrainingMode::Revision,
      problem_count: n as u32,
      forced_mode: forced,
      exclude_ids: Default::default(),
    };
    let problems = (1..=n)
      .map(|i| Problem {
        id: i,
        contest_id: i,
        index: "B".into(),
        name: format!("P{i}"),
        rating: Some(800 + i as i32 * 100),
        solved_count: 10,
        tags: ["dp".to_string()].into(),
      })
      .collect();
    build_record(Uuid::new_v4(), &req, PathPlan { problems, bands: Vec::new(), warning: None }, Utc::now())
  }

  #[tokio::test]
  async fn commit_bumps_version_and_noop_does_not() {
    let store = PathStore::new(4);
    let r = record(3, true);
    let id = r.path.id;
    store.insert(r).await;

    let (t, committed) = store
      .apply(id, |rec| progression::mark_solved(rec, 1, Utc::now()).map(Transition::applied))
      .await
      .unwrap();
    assert_eq!(t.path.current_position, 1);
    assert_eq!(committed.path.version, 1);
    assert_eq!(store.get(id).await.unwrap().path.version, 1);

    let (t, current) = store
      .apply(id, |rec| progression::mark_solved(rec, 1, Utc::now()).map(Transition::applied))
      .await
      .unwrap();
    assert!(!t.changed);
    assert_eq!(current.path.version, 1);
    assert_eq!(store.get(id).await.unwrap().path.version, 1);
  }

  #[tokio::test]
  async fn conflicting_writer_triggers_reapply() {
    let store = PathStore::new(4);
    let r = record(3, false);
    let id = r.path.id;
    store.insert(r).await;

    let mut calls = 0;
    let hook = store.clone();
    let t = store
      .apply(id, |rec| {
        calls += 1;
        if calls == 1 {
          // simulate a concurrent commit landing between snapshot and write
          hook.bump_version(id);
        }
        progression::skip(rec, 2, Utc::now()).map(Transition::applied)
      })
      .await;
    let (t, committed) = t.unwrap();
    assert_eq!(calls, 2);
    assert_eq!(t.path.current_position, 1);
    assert_eq!(committed.path.version, 2);
    assert_eq!(store.get(id).await.unwrap().path.version, 2);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn parallel_solves_on_one_path_never_double_count() {
    let store = PathStore::new(64);
    let r = record(20, false);
    let id = r.path.id;
    store.insert(r).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
      for pid in 1..=20i64 {
        let s = store.clone();
        handles.push(tokio::spawn(async move {
          s.apply(id, |rec| progression::mark_solved(rec, pid, Utc::now()).map(Transition::applied))
            .await
        }));
      }
    }
    for h in handles {
      h.await.unwrap().unwrap();
    }
    let stored = store.get(id).await.unwrap();
    assert_eq!(stored.path.current_position, 20);
    assert_eq!(stored.path.status, PathStatus::Completed);
    progression::check_invariants(&stored).unwrap();
  }

  #[tokio::test]
  async fn list_filters_and_remove_forgets() {
    let store = PathStore::new(2);
    let a = record(2, false);
    let mut b = record(2, false);
    b.path.status = PathStatus::Paused;
    let (a_id, b_id) = (a.path.id, b.path.id);
    store.insert(a).await;
    store.insert(b).await;

    assert_eq!(store.list(None).await.len(), 2);
    let paused = store.list(Some(PathStatus::Paused)).await;
    assert_eq!(paused.len(), 1);
    assert_eq!(paused[0].path.id, b_id);

    store.remove(a_id).await.unwrap();
    assert!(matches!(store.get(a_id).await, Err(PathError::NotFound(_))));
    assert!(matches!(store.remove(a_id).await, Err(PathError::NotFound(_))));
  }
}
