//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{GenerationRequest, PathProblem, PathRecord, PathStatus, PracticePath, TrainingMode};
use crate::generator::PartialFulfillment;
use crate::progression::Transition;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    GeneratePath {
        request: GenerationRequest,
    },
    Solve {
        #[serde(rename = "pathId")]
        path_id: Uuid,
        #[serde(rename = "problemId")]
        problem_id: i64,
    },
    Skip {
        #[serde(rename = "pathId")]
        path_id: Uuid,
        position: u32,
    },
    Attempt {
        #[serde(rename = "pathId")]
        path_id: Uuid,
        #[serde(rename = "problemId")]
        problem_id: i64,
    },
    Hint {
        #[serde(rename = "pathId")]
        path_id: Uuid,
        position: u32,
        #[serde(default)]
        level: Option<u8>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Path {
        path: PathDetailOut,
    },
    Progress {
        result: TransitionOut,
    },
    Hint {
        hint: HintOut,
    },
    Error {
        error: &'static str,
        message: String,
    },
}

/// Path summary as returned by list/update endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathOut {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub topics: Vec<String>,
    pub min_rating: i32,
    pub max_rating: i32,
    pub mode: TrainingMode,
    pub forced_mode: bool,
    pub current_position: u32,
    pub total_problems: u32,
    pub status: PathStatus,
    pub progress_pct: f64,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Position of the first open problem, if any.
    pub current_problem: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDetailOut {
    #[serde(flatten)]
    pub summary: PathOut,
    pub problems: Vec<PathProblem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<PartialFulfillment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOut {
    pub path: PathOut,
    pub problem: PathProblem,
    pub changed: bool,
}

fn summary(path: &PracticePath, current_problem: Option<u32>) -> PathOut {
    PathOut {
        id: path.id,
        name: path.name.clone(),
        description: path.description.clone(),
        topics: path.topics.iter().cloned().collect(),
        min_rating: path.min_rating,
        max_rating: path.max_rating,
        mode: path.mode,
        forced_mode: path.forced_mode,
        current_position: path.current_position,
        total_problems: path.total_problems,
        status: path.status,
        progress_pct: path.progress_pct(),
        version: path.version,
        created_at: path.created_at,
        updated_at: path.updated_at,
        completed_at: path.completed_at,
        current_problem,
    }
}

pub fn to_summary(r: &PathRecord) -> PathOut {
    summary(&r.path, r.frontier().map(|f| f.position))
}

pub fn to_detail(r: &PathRecord, warning: Option<PartialFulfillment>) -> PathDetailOut {
    PathDetailOut {
        summary: to_summary(r),
        problems: r.problems.clone(),
        warning,
    }
}

/// The path summary comes from `committed`, which carries the post-commit version.
pub fn to_transition_out(t: Transition, committed: &PathRecord) -> TransitionOut {
    TransitionOut {
        path: to_summary(committed),
        problem: t.problem,
        changed: t.changed,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<PathStatus>,
}

#[derive(Serialize)]
pub struct PathListOut {
    pub paths: Vec<PathOut>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathUpdateIn {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<PathStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ProblemRefIn {
    #[serde(rename = "problemId")]
    pub problem_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct HintQuery {
    pub position: u32,
    pub level: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct HintOut {
    pub position: u32,
    pub level: u8,
    pub text: String,
    /// "coach" or "local".
    pub source: &'static str,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
