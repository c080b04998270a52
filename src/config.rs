//! Loading service configuration (generation tuning, coach prompts, extra catalog problems) from TOML.
//!
//! See `AppConfig`, `GenerationConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

/// What to do when the pool cannot fill the requested problem count.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
  /// Return a shorter path with a warning attached.
  #[default]
  Partial,
  /// Fail generation outright.
  Reject,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub generation: GenerationConfig,
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub problems: Vec<ProblemCfg>,
}

/// Knobs of the generation pipeline and the progression store.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
  pub band_width: u32,
  pub oversample_factor: usize,
  /// Added to every educational score before weighted sampling.
  pub score_floor: f64,
  pub jitter_window: usize,
  /// Largest allowed growth of local roughness (squared rating steps) for a jitter swap.
  pub jitter_tolerance: f64,
  pub shortfall: ShortfallPolicy,
  /// Fixed RNG seed. Unset means a fresh entropy seed per request.
  pub seed: Option<u64>,
  pub max_problem_count: u32,
  /// Inclusive bounds every requested rating range must stay within.
  pub min_problem_rating: i32,
  pub max_problem_rating: i32,
  pub max_commit_retries: usize,
}

impl Default for GenerationConfig {
  fn default() -> Self {
    Self {
      band_width: 100,
      oversample_factor: 3,
      score_floor: 1.0,
      jitter_window: 3,
      jitter_tolerance: 5_000.0,
      shortfall: ShortfallPolicy::Partial,
      seed: None,
      max_problem_count: 100,
      min_problem_rating: 800,
      max_problem_rating: 3500,
      max_commit_retries: 8,
    }
  }
}

/// Catalog entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ProblemCfg {
  pub id: i64,
  pub contest_id: i64,
  pub index: String,
  pub name: String,
  #[serde(default)] pub rating: Option<i32>,
  #[serde(default)] pub solved_count: u32,
  #[serde(default)] pub tags: Vec<String>,
}

/// Prompts used by the coach. `{level}`, `{name}`, `{rating}`, `{tags}` and `{status}`
/// are substituted before the call.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub hint_system: String,
  pub hint_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      hint_system: "You are a competitive programming coach. Help the student think; never hand out a full solution below level 5. The hint level is {level}/5: 1 = vague nudge, 2 = general direction, 3 = key insight, 4 = step-by-step reasoning without code, 5 = full solution.".into(),
      hint_user_template: "Problem: {name}\nRating: {rating}\nTags: {tags}\nStudent status: {status}\nGive a level {level} hint. Keep it short.".into(),
    }
  }
}

/// Attempt to load `AppConfig` from PATH_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("PATH_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "cpath_backend", %path, problems = cfg.problems.len(), "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "cpath_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "cpath_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
