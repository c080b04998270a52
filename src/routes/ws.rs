//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::error::PathError;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "cpath_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "cpath_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "cpath_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { error: "invalid_request", message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "error": "internal_error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "cpath_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "cpath_backend", "WebSocket disconnected");
}

fn ws_error(e: PathError) -> ServerWsMessage {
  ServerWsMessage::Error { error: e.code(), message: e.to_string() }
}

async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  let reply = match msg {
    ClientWsMessage::Ping => Ok(ServerWsMessage::Pong),

    ClientWsMessage::GeneratePath { request } => create_path(state, request).await.map(|path| {
      info!(target: "generation", id = %path.summary.id, partial = path.warning.is_some(), "WS path created");
      ServerWsMessage::Path { path }
    }),

    ClientWsMessage::Solve { path_id, problem_id } => solve(state, path_id, problem_id)
      .await
      .map(|result| ServerWsMessage::Progress { result }),

    ClientWsMessage::Skip { path_id, position } => skip(state, path_id, position)
      .await
      .map(|result| ServerWsMessage::Progress { result }),

    ClientWsMessage::Attempt { path_id, problem_id } => attempt(state, path_id, problem_id)
      .await
      .map(|result| ServerWsMessage::Progress { result }),

    ClientWsMessage::Hint { path_id, position, level } => hint(state, path_id, position, level)
      .await
      .map(|hint| ServerWsMessage::Hint { hint }),
  };
  reply.unwrap_or_else(ws_error)
}
