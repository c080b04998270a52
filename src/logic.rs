//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Generating and storing a new path
//!   - Progression events (solve / skip / attempt) through the optimistic store
//!   - Path management (list, detail, rename, pause/resume/abandon, delete)
//!   - Graded hints (coach when configured, local fallback otherwise)

use chrono::Utc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::coach::{clamp_level, local_hint};
use crate::domain::{GenerationRequest, PathRecord, PathStatus, ProblemStatus};
use crate::error::PathError;
use crate::generator::build_record;
use crate::progression::{self, Transition};
use crate::protocol::{to_detail, to_summary, to_transition_out, HintOut, PathDetailOut, PathOut, PathUpdateIn, TransitionOut};
use crate::state::AppState;

#[instrument(level = "info", skip(state, req), fields(mode = req.mode.as_str(), topics = req.topics.len(), count = req.problem_count, forced = req.forced_mode))]
pub async fn create_path(state: &AppState, req: GenerationRequest) -> Result<PathDetailOut, PathError> {
  let mut rng = state.rng();
  let plan = state.generator.generate(&req, &mut rng)?;
  let warning = plan.warning.clone();
  let record = build_record(Uuid::new_v4(), &req, plan, Utc::now());
  let detail = to_detail(&record, warning);
  info!(target: "generation", id = %record.path.id, total = record.path.total_problems, "Path created");
  state.store.insert(record).await;
  Ok(detail)
}

pub async fn get_path(state: &AppState, path_id: Uuid) -> Result<PathDetailOut, PathError> {
  let record = state.store.get(path_id).await?;
  Ok(to_detail(&record, None))
}

pub async fn list_paths(state: &AppState, status: Option<PathStatus>) -> Vec<PathOut> {
  state.store.list(status).await.iter().map(to_summary).collect()
}

#[instrument(level = "info", skip(state, update))]
pub async fn update_path(state: &AppState, path_id: Uuid, update: PathUpdateIn) -> Result<PathOut, PathError> {
  let name = match update.name.as_deref().map(str::trim) {
    Some("") => return Err(PathError::InvalidRequest("name must not be empty".into())),
    Some(n) => Some(n.to_string()),
    None => None,
  };
  let ((), committed) = state
    .store
    .apply(path_id, |rec| {
      let now = Utc::now();
      let mut changed = false;
      if let Some(n) = &name {
        if &rec.path.name != n {
          rec.path.name = n.clone();
          rec.path.updated_at = now;
          changed = true;
        }
      }
      if let Some(s) = update.status {
        changed |= progression::set_status(rec, s, now)?;
      }
      Ok(((), changed))
    })
    .await?;
  Ok(to_summary(&committed))
}

#[instrument(level = "info", skip(state))]
pub async fn delete_path(state: &AppState, path_id: Uuid) -> Result<(), PathError> {
  state.store.remove(path_id).await?;
  info!(target: "progression", %path_id, "Path deleted");
  Ok(())
}

#[instrument(level = "info", skip(state))]
pub async fn solve(state: &AppState, path_id: Uuid, problem_id: i64) -> Result<TransitionOut, PathError> {
  progress(state, path_id, |rec| progression::mark_solved(rec, problem_id, Utc::now())).await
}

#[instrument(level = "info", skip(state))]
pub async fn skip(state: &AppState, path_id: Uuid, position: u32) -> Result<TransitionOut, PathError> {
  progress(state, path_id, |rec| progression::skip(rec, position, Utc::now())).await
}

#[instrument(level = "info", skip(state))]
pub async fn attempt(state: &AppState, path_id: Uuid, problem_id: i64) -> Result<TransitionOut, PathError> {
  progress(state, path_id, |rec| progression::record_attempt(rec, problem_id, Utc::now())).await
}

async fn progress<F>(state: &AppState, path_id: Uuid, mut op: F) -> Result<TransitionOut, PathError>
where
  F: FnMut(&mut PathRecord) -> Result<Transition, PathError>,
{
  match state.store.apply(path_id, |rec| op(rec).map(Transition::applied)).await {
    Ok((t, committed)) => Ok(to_transition_out(t, &committed)),
    Err(e) => {
      warn!(target: "progression", %path_id, error = %e, "Progression rejected");
      Err(e)
    }
  }
}

/// Hint for the problem at `position`. Locked problems get no hints; asking on an open one counts
/// as an attempt.
#[instrument(level = "info", skip(state))]
pub async fn hint(state: &AppState, path_id: Uuid, position: u32, level: Option<u8>) -> Result<HintOut, PathError> {
  let level = clamp_level(level);
  let record = state.store.get(path_id).await?;
  let pp = record
    .problem_at(position)
    .cloned()
    .ok_or_else(|| PathError::NotFound(format!("Position {position} in path {path_id}")))?;

  if pp.status == ProblemStatus::Locked {
    return Err(PathError::NotCurrent { position, frontier: record.frontier().map(|f| f.position) });
  }
  let status = if pp.status == ProblemStatus::Unlocked && record.path.status == PathStatus::Active {
    attempt(state, path_id, pp.problem.id).await?.problem.status
  } else {
    pp.status
  };

  if let Some(coach) = &state.coach {
    match coach.hint(&state.prompts, &pp.problem, status, level).await {
      Ok(text) => return Ok(HintOut { position, level, text, source: "coach" }),
      Err(e) => error!(target: "coach", %path_id, position, error = %e, "Coach hint failed; using local hint."),
    }
  }
  Ok(HintOut { position, level, text: local_hint(&pp.problem, level), source: "local" })
}
