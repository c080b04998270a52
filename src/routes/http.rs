//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Errors surface as `PathError`, which renders its own status code and JSON body;
//! extractor rejections are folded into it as `invalid_request`.

use std::sync::Arc;
use axum::{
  extract::{FromRequest, FromRequestParts, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::GenerationRequest;
use crate::error::PathError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

/// `Json` whose rejection is a `PathError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(PathError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(PathError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(PathError))]
pub struct ApiPath<T>(pub T);

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body), fields(mode = body.mode.as_str(), count = body.problem_count))]
pub async fn http_create_path(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<GenerationRequest>,
) -> Result<impl IntoResponse, PathError> {
  let detail = create_path(&state, body).await?;
  info!(target: "generation", id = %detail.summary.id, partial = detail.warning.is_some(), "HTTP path created");
  Ok((StatusCode::CREATED, Json(detail)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_paths(
  State(state): State<Arc<AppState>>,
  ApiQuery(q): ApiQuery<ListQuery>,
) -> impl IntoResponse {
  let paths = list_paths(&state, q.status).await;
  let total = paths.len();
  Json(PathListOut { paths, total })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_path(
  State(state): State<Arc<AppState>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PathDetailOut>, PathError> {
  Ok(Json(get_path(&state, id).await?))
}

#[instrument(level = "info", skip(state, body), fields(rename = body.name.is_some(), status = ?body.status))]
pub async fn http_update_path(
  State(state): State<Arc<AppState>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<PathUpdateIn>,
) -> Result<Json<PathOut>, PathError> {
  Ok(Json(update_path(&state, id, body).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_path(
  State(state): State<Arc<AppState>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, PathError> {
  delete_path(&state, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, body), fields(problem_id = body.problem_id))]
pub async fn http_solve(
  State(state): State<Arc<AppState>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<ProblemRefIn>,
) -> Result<Json<TransitionOut>, PathError> {
  let out = solve(&state, id, body.problem_id).await?;
  info!(target: "progression", %id, changed = out.changed, pos = out.path.current_position, "HTTP solve applied");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_skip(
  State(state): State<Arc<AppState>>,
  ApiPath((id, position)): ApiPath<(Uuid, u32)>,
) -> Result<Json<TransitionOut>, PathError> {
  let out = skip(&state, id, position).await?;
  info!(target: "progression", %id, position, changed = out.changed, "HTTP skip applied");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(problem_id = body.problem_id))]
pub async fn http_attempt(
  State(state): State<Arc<AppState>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<ProblemRefIn>,
) -> Result<Json<TransitionOut>, PathError> {
  Ok(Json(attempt(&state, id, body.problem_id).await?))
}

#[instrument(level = "info", skip(state), fields(position = q.position, level = ?q.level))]
pub async fn http_hint(
  State(state): State<Arc<AppState>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiQuery(q): ApiQuery<HintQuery>,
) -> Result<Json<HintOut>, PathError> {
  let out = hint(&state, id, q.position, q.level).await?;
  info!(target: "coach", %id, position = out.position, level = out.level, source = out.source, "HTTP hint served");
  Ok(Json(out))
}
