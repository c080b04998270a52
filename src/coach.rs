//! Optional coaching client (OpenAI-compatible chat completions) for graded hints.
//!
//! Hint ladder: 1 = vague nudge, 2 = general direction, 3 = key insight,
//! 4 = step-by-step reasoning without code, 5 = full solution.
//! Calls are instrumented and log model names, latencies and token usage (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{Problem, ProblemStatus};
use crate::util::{fill_template, trunc_for_log};

pub const MIN_HINT_LEVEL: u8 = 1;
pub const MAX_HINT_LEVEL: u8 = 5;

pub fn clamp_level(level: Option<u8>) -> u8 {
  level.unwrap_or(MIN_HINT_LEVEL).clamp(MIN_HINT_LEVEL, MAX_HINT_LEVEL)
}

#[derive(Clone)]
pub struct Coach {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Coach {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// Plain-text chat completion.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_plain(&self, system: &str, user: &str, temperature: f32) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      max_tokens: Some(1024),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "cpath-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      return Err(format!("Coach HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(target: "coach", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Coach usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();
    if text.is_empty() {
      return Err("empty completion".into());
    }
    Ok(text)
  }

  /// One hint at `level` for `problem`.
  #[instrument(level = "info", skip(self, prompts, problem), fields(problem = problem.id))]
  pub async fn hint(
    &self,
    prompts: &Prompts,
    problem: &Problem,
    status: ProblemStatus,
    level: u8,
  ) -> Result<String, String> {
    let (level_s, rating, tags, status_s) = prompt_vars(problem, status, level);
    let vars = [
      ("level", level_s.as_str()),
      ("name", problem.name.as_str()),
      ("rating", rating.as_str()),
      ("tags", tags.as_str()),
      ("status", status_s.as_str()),
    ];
    let system = fill_template(&prompts.hint_system, &vars);
    let user = fill_template(&prompts.hint_user_template, &vars);

    let start = Instant::now();
    let result = self.chat_plain(&system, &user, 0.3).await;
    let elapsed = start.elapsed();
    match &result {
      Ok(text) => info!(target: "coach", ?elapsed, chars = text.len(), "Hint received"),
      Err(e) => error!(target: "coach", ?elapsed, error = %e, "Hint call failed"),
    }
    result
  }
}

fn prompt_vars(problem: &Problem, status: ProblemStatus, level: u8) -> (String, String, String, String) {
  let rating = problem.rating.map(|r| r.to_string()).unwrap_or_else(|| "unrated".into());
  let tags = problem.tags.iter().cloned().collect::<Vec<_>>().join(", ");
  let status = format!("{:?}", status).to_lowercase();
  (level.to_string(), rating, tags, status)
}

/// Tag-driven hint used when no coach is configured or the call fails.
pub fn local_hint(problem: &Problem, level: u8) -> String {
  let tags: Vec<&str> = problem.tags.iter().map(String::as_str).collect();
  let main = tags.first().copied().unwrap_or("implementation");
  match level {
    1 => "Re-read the constraints: the input size tells you which complexity is acceptable.".into(),
    2 => format!("This one is usually approached with {}.", tags.join(" / ").replace('-', " ")),
    3 => format!("Work out what state or invariant a {} solution has to track, and prove it on the samples.", main.replace('-', " ")),
    4 => format!(
      "Write down the {} formulation step by step: define the quantity you compute, how it is built from smaller pieces, and the order you fill it in. Check the edge cases before coding.",
      main.replace('-', " ")
    ),
    _ => format!(
      "Full solutions are only available from the coach. Look up the editorial for contest {} problem {}.",
      problem.contest_id, problem.index
    ),
  }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an API error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn problem() -> Problem {
    Problem {
      id: 19,
      contest_id: 455,
      index: "A".into(),
      name: "Boredom".into(),
      rating: Some(1500),
      solved_count: 80_000,
      tags: ["dp".to_string(), "greedy".to_string()].into(),
    }
  }

  #[test]
  fn levels_are_clamped() {
    assert_eq!(clamp_level(None), 1);
    assert_eq!(clamp_level(Some(0)), 1);
    assert_eq!(clamp_level(Some(3)), 3);
    assert_eq!(clamp_level(Some(9)), 5);
  }

  #[test]
  fn local_hints_escalate() {
    let p = problem();
    assert!(local_hint(&p, 2).contains("dp / greedy"));
    assert!(local_hint(&p, 5).contains("contest 455 problem A"));
  }

  #[test]
  fn prompt_vars_render_readably() {
    let (level, rating, tags, status) = prompt_vars(&problem(), ProblemStatus::Attempted, 2);
    assert_eq!((level.as_str(), rating.as_str(), tags.as_str(), status.as_str()), ("2", "1500", "dp, greedy", "attempted"));
  }

  #[test]
  fn api_error_message_extracted() {
    let body = r#"{"error":{"message":"quota exceeded","type":"insufficient_quota"}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("quota exceeded"));
    assert_eq!(extract_api_error("not json"), None);
  }
}
