//! Domain models: catalog problems, generation requests, practice paths and their problems.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A judge problem as supplied by the catalog. Read-only for the engine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
  pub id: i64,
  pub contest_id: i64,
  pub index: String,
  pub name: String,
  #[serde(default)] pub rating: Option<i32>,
  #[serde(default)] pub solved_count: u32,
  #[serde(default)] pub tags: BTreeSet<String>,
}

/// Which way the rating distribution of a path leans.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMode {
  /// Front-loaded toward easy bands.
  Learning,
  /// Uniform over the range.
  Revision,
  /// Back-loaded toward hard bands.
  Challenge,
}
impl Default for TrainingMode {
  fn default() -> Self { TrainingMode::Learning }
}

impl TrainingMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      TrainingMode::Learning => "learning",
      TrainingMode::Revision => "revision",
      TrainingMode::Challenge => "challenge",
    }
  }
}

/// Everything needed to generate one path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
  #[serde(default)] pub name: Option<String>,
  pub topics: BTreeSet<String>,
  pub min_rating: i32,
  pub max_rating: i32,
  #[serde(default)] pub mode: TrainingMode,
  pub problem_count: u32,
  #[serde(default)] pub forced_mode: bool,
  #[serde(default)] pub exclude_ids: BTreeSet<i64>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
  Active,
  Paused,
  Completed,
  Abandoned,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProblemStatus {
  Locked,
  Unlocked,
  Attempted,
  Solved,
  Skipped,
}

impl ProblemStatus {
  /// Solved and skipped problems never change again.
  pub fn is_terminal(self) -> bool {
    matches!(self, ProblemStatus::Solved | ProblemStatus::Skipped)
  }

  /// Unlocked or attempted: the problem is available to work on.
  pub fn is_open(self) -> bool {
    matches!(self, ProblemStatus::Unlocked | ProblemStatus::Attempted)
  }
}

/// Path summary. `version` is bumped by the store on every committed change.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PracticePath {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  pub topics: BTreeSet<String>,
  pub min_rating: i32,
  pub max_rating: i32,
  pub mode: TrainingMode,
  pub forced_mode: bool,
  pub total_problems: u32,
  pub current_position: u32,
  pub status: PathStatus,
  pub version: u64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default)] pub completed_at: Option<DateTime<Utc>>,
}

impl PracticePath {
  pub fn progress_pct(&self) -> f64 {
    if self.total_problems == 0 {
      return 0.0;
    }
    let pct = self.current_position as f64 / self.total_problems as f64 * 100.0;
    (pct * 10.0).round() / 10.0
  }
}

/// One slot of a path. Positions are 1-indexed and contiguous.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathProblem {
  pub position: u32,
  pub problem: Problem,
  pub status: ProblemStatus,
  #[serde(default)] pub unlocked_at: Option<DateTime<Utc>>,
  #[serde(default)] pub solved_at: Option<DateTime<Utc>>,
}

/// A path together with its ordered problems; the unit the store keeps.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PathRecord {
  pub path: PracticePath,
  pub problems: Vec<PathProblem>,
}

impl PathRecord {
  pub fn problem_at(&self, position: u32) -> Option<&PathProblem> {
    self.problems.iter().find(|pp| pp.position == position)
  }

  /// The first open problem by position. In forced mode it is the only one.
  pub fn frontier(&self) -> Option<&PathProblem> {
    self.problems.iter().find(|pp| pp.status.is_open())
  }
}
