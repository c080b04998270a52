//! Progress state machine for a stored path.
//!
//! Per problem: `locked -> unlocked -> {attempted, solved, skipped}`; solved and skipped are final.
//! The "current" problem is never stored: it is `PathRecord::frontier()`, the first open problem.
//! Every transition runs on a working copy and is checked by `check_invariants` before it is
//! handed back, so a failed transition leaves the caller's record untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{PathProblem, PathRecord, PathStatus, PracticePath, ProblemStatus};
use crate::error::PathError;

/// Result of one progression call. `changed == false` means a retried call hit a final state.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
  pub path: PracticePath,
  pub problem: PathProblem,
  pub changed: bool,
}

impl Transition {
  /// Shape expected by `PathStore::apply`: the result plus whether anything changed.
  pub fn applied(self) -> (Self, bool) {
    let changed = self.changed;
    (self, changed)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolution {
  Solve,
  Skip,
}

pub fn mark_solved(record: &mut PathRecord, problem_id: i64, now: DateTime<Utc>) -> Result<Transition, PathError> {
  let idx = index_by_problem(record, problem_id)?;
  resolve(record, idx, Resolution::Solve, now)
}

pub fn skip(record: &mut PathRecord, position: u32, now: DateTime<Utc>) -> Result<Transition, PathError> {
  let idx = index_by_position(record, position)?;
  resolve(record, idx, Resolution::Skip, now)
}

/// `unlocked -> attempted`. Repeating it, or calling it on a finished problem, changes nothing.
pub fn record_attempt(record: &mut PathRecord, problem_id: i64, now: DateTime<Utc>) -> Result<Transition, PathError> {
  let idx = index_by_problem(record, problem_id)?;
  let status = record.problems[idx].status;
  if status == ProblemStatus::Attempted || status.is_terminal() {
    return Ok(unchanged(record, idx));
  }
  ensure_active(&record.path)?;
  ensure_open(record, idx)?;

  let mut next = record.clone();
  next.problems[idx].status = ProblemStatus::Attempted;
  next.path.updated_at = now;
  commit(record, next, idx)
}

/// Pause, resume or abandon. Completed paths are final; `completed` itself is never set by hand.
pub fn set_status(record: &mut PathRecord, status: PathStatus, now: DateTime<Utc>) -> Result<bool, PathError> {
  if record.path.status == status {
    return Ok(false);
  }
  if status == PathStatus::Completed {
    return Err(PathError::InvalidTransition("a path completes only by resolving its last problem".into()));
  }
  if record.path.status == PathStatus::Completed {
    return Err(PathError::InvalidTransition("completed paths cannot change status".into()));
  }
  info!(target: "progression", path = %record.path.id, from = ?record.path.status, to = ?status, "Path status changed");
  record.path.status = status;
  record.path.updated_at = now;
  Ok(true)
}

fn resolve(record: &mut PathRecord, idx: usize, how: Resolution, now: DateTime<Utc>) -> Result<Transition, PathError> {
  if record.problems[idx].status.is_terminal() {
    debug!(target: "progression", path = %record.path.id, position = record.problems[idx].position, "Already resolved; returning existing state");
    return Ok(unchanged(record, idx));
  }
  ensure_active(&record.path)?;
  ensure_open(record, idx)?;

  let mut next = record.clone();
  {
    let pp = &mut next.problems[idx];
    match how {
      Resolution::Solve => {
        pp.status = ProblemStatus::Solved;
        pp.solved_at = Some(now);
      }
      Resolution::Skip => pp.status = ProblemStatus::Skipped,
    }
  }
  next.path.current_position += 1;
  next.path.updated_at = now;

  if next.path.forced_mode {
    if let Some(locked) = next.problems.iter_mut().find(|pp| pp.status == ProblemStatus::Locked) {
      locked.status = ProblemStatus::Unlocked;
      locked.unlocked_at = Some(now);
    }
  }
  if next.path.current_position == next.path.total_problems {
    next.path.status = PathStatus::Completed;
    next.path.completed_at = Some(now);
  }

  info!(
    target: "progression",
    path = %next.path.id,
    position = next.problems[idx].position,
    outcome = ?how,
    current = next.path.current_position,
    total = next.path.total_problems,
    "Problem resolved"
  );
  commit(record, next, idx)
}

fn commit(record: &mut PathRecord, next: PathRecord, idx: usize) -> Result<Transition, PathError> {
  check_invariants(&next)?;
  *record = next;
  Ok(Transition {
    path: record.path.clone(),
    problem: record.problems[idx].clone(),
    changed: true,
  })
}

fn unchanged(record: &PathRecord, idx: usize) -> Transition {
  Transition {
    path: record.path.clone(),
    problem: record.problems[idx].clone(),
    changed: false,
  }
}

fn index_by_problem(record: &PathRecord, problem_id: i64) -> Result<usize, PathError> {
  record
    .problems
    .iter()
    .position(|pp| pp.problem.id == problem_id)
    .ok_or_else(|| PathError::NotFound(format!("Problem {problem_id} in path {}", record.path.id)))
}

fn index_by_position(record: &PathRecord, position: u32) -> Result<usize, PathError> {
  record
    .problems
    .iter()
    .position(|pp| pp.position == position)
    .ok_or_else(|| PathError::NotFound(format!("Position {position} in path {}", record.path.id)))
}

fn ensure_active(path: &PracticePath) -> Result<(), PathError> {
  match path.status {
    PathStatus::Active => Ok(()),
    other => Err(PathError::InvalidTransition(format!("path is {other:?}, not active").to_lowercase())),
  }
}

/// The problem must be open; in forced mode it must also be the frontier.
fn ensure_open(record: &PathRecord, idx: usize) -> Result<(), PathError> {
  let pp = &record.problems[idx];
  if record.path.forced_mode {
    let frontier = record.frontier().map(|f| f.position);
    if frontier != Some(pp.position) {
      return Err(PathError::NotCurrent { position: pp.position, frontier });
    }
  }
  if !pp.status.is_open() {
    return Err(PathError::InvalidTransition(format!(
      "problem at position {} is {:?}",
      pp.position, pp.status
    )));
  }
  Ok(())
}

/// Structural checks that must hold after every transition.
pub fn check_invariants(record: &PathRecord) -> Result<(), PathError> {
  let path = &record.path;
  if path.total_problems as usize != record.problems.len() {
    return Err(PathError::InvariantViolated(format!(
      "total_problems {} but {} problems stored",
      path.total_problems,
      record.problems.len()
    )));
  }
  if path.current_position > path.total_problems {
    return Err(PathError::InvariantViolated("current_position beyond total_problems".into()));
  }
  let resolved = record.problems.iter().filter(|pp| pp.status.is_terminal()).count() as u32;
  if resolved != path.current_position {
    return Err(PathError::InvariantViolated(format!(
      "current_position {} but {} problems resolved",
      path.current_position, resolved
    )));
  }
  let full = path.current_position == path.total_problems;
  if full != (path.status == PathStatus::Completed) {
    return Err(PathError::InvariantViolated(format!(
      "status {:?} with {}/{} resolved",
      path.status, path.current_position, path.total_problems
    )));
  }
  if record.problems.iter().enumerate().any(|(i, pp)| pp.position != i as u32 + 1) {
    return Err(PathError::InvariantViolated("positions are not contiguous from 1".into()));
  }
  if path.forced_mode {
    let open = record.problems.iter().filter(|pp| pp.status.is_open()).count();
    if open > 1 {
      return Err(PathError::InvariantViolated(format!("{open} open problems in a forced path")));
    }
  }
  Ok(())
}
