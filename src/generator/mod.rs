//! Path generation pipeline.
//!
//! Flow:
//! 1) Validate the request (before touching the catalog).
//! 2) Fetch candidates from the catalog.
//! 3) Partition into rating bands, 4) compute per-band quotas from the mode.
//! 5) Score and sample each band, 6) sequence into the final ramp.
//!
//! The output `PathPlan` is a pure function of request, candidates, config and RNG state.
//! Turning a plan into a stored `PathRecord` happens in `build_record`.

pub mod bands;
pub mod quota;
pub mod sampler;
pub mod scoring;
pub mod sequencer;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::catalog::{CandidateQuery, CatalogReader};
use crate::config::{GenerationConfig, ShortfallPolicy};
use crate::domain::{GenerationRequest, PathProblem, PathRecord, PathStatus, PracticePath, Problem, ProblemStatus};
use crate::error::PathError;
use sampler::SamplerSettings;
use sequencer::SequencerSettings;

/// Attached to a plan that came out shorter than requested. Not an error.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartialFulfillment {
  pub requested: u32,
  pub fulfilled: u32,
  pub short_bands: Vec<(i32, i32)>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BandSummary {
  pub low: i32,
  pub high: i32,
  pub candidates: usize,
  pub quota: u32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathPlan {
  /// Final order; position 1 is the first element.
  pub problems: Vec<Problem>,
  pub bands: Vec<BandSummary>,
  pub warning: Option<PartialFulfillment>,
}

pub struct PathGenerator {
  catalog: Arc<dyn CatalogReader>,
  settings: GenerationConfig,
}

impl PathGenerator {
  pub fn new(catalog: Arc<dyn CatalogReader>, settings: GenerationConfig) -> Self {
    Self { catalog, settings }
  }

  pub fn validate(&self, req: &GenerationRequest) -> Result<(), PathError> {
    if req.topics.iter().all(|t| t.trim().is_empty()) {
      return Err(PathError::InvalidRequest("topics must not be empty".into()));
    }
    if req.min_rating >= req.max_rating {
      return Err(PathError::InvalidRequest(format!(
        "minRating ({}) must be below maxRating ({})",
        req.min_rating, req.max_rating
      )));
    }
    let (lo, hi) = (self.settings.min_problem_rating, self.settings.max_problem_rating);
    if req.min_rating < lo || req.max_rating > hi {
      return Err(PathError::InvalidRequest(format!(
        "rating range {}-{} must lie within {lo}-{hi}",
        req.min_rating, req.max_rating
      )));
    }
    if req.problem_count == 0 {
      return Err(PathError::InvalidRequest("problemCount must be positive".into()));
    }
    if req.problem_count > self.settings.max_problem_count {
      return Err(PathError::InvalidRequest(format!(
        "problemCount ({}) exceeds the limit of {}",
        req.problem_count, self.settings.max_problem_count
      )));
    }
    Ok(())
  }

  #[instrument(level = "info", skip(self, req, rng), fields(mode = req.mode.as_str(), min = req.min_rating, max = req.max_rating, count = req.problem_count))]
  pub fn generate<R: Rng + ?Sized>(&self, req: &GenerationRequest, rng: &mut R) -> Result<PathPlan, PathError> {
    self.validate(req)?;

    let query = CandidateQuery {
      topics: &req.topics,
      min_rating: req.min_rating,
      max_rating: req.max_rating,
      exclude_ids: &req.exclude_ids,
    };
    let candidates = self.catalog.find_candidates(&query)?;

    let bands = bands::partition(&candidates, req.min_rating, req.max_rating, self.settings.band_width);
    if bands.iter().all(|b| b.problems.is_empty()) {
      warn!(target: "generation", bands = bands.len(), "No candidates in any band");
      return Err(PathError::InsufficientCandidates {
        empty_bands: bands.iter().map(|b| (b.low, b.high)).collect(),
        requested: req.problem_count,
        available: 0,
      });
    }

    let quotas = quota::band_quotas(bands.len(), req.problem_count, req.mode);
    let summaries: Vec<BandSummary> = bands
      .iter()
      .zip(&quotas)
      .map(|(b, &q)| BandSummary { low: b.low, high: b.high, candidates: b.problems.len(), quota: q })
      .collect();

    let sampler_settings = SamplerSettings {
      oversample_factor: self.settings.oversample_factor,
      score_floor: self.settings.score_floor,
    };
    let outcome = sampler::sample_bands(&bands, &quotas, &sampler_settings, rng);

    let sequencer_settings = SequencerSettings {
      window: self.settings.jitter_window,
      tolerance: self.settings.jitter_tolerance,
    };
    let problems = sequencer::sequence(outcome.selected, &sequencer_settings, rng);

    let fulfilled = problems.len() as u32;
    if problems.is_empty() {
      warn!(target: "generation", requested = req.problem_count, "Quotas landed only on empty bands");
      return Err(PathError::InsufficientCandidates {
        empty_bands: outcome.short_bands,
        requested: req.problem_count,
        available: 0,
      });
    }
    let warning = if fulfilled < req.problem_count {
      if self.settings.shortfall == ShortfallPolicy::Reject {
        warn!(target: "generation", requested = req.problem_count, fulfilled, "Shortfall rejected by policy");
        return Err(PathError::InsufficientCandidates {
          empty_bands: bands.iter().filter(|b| b.problems.is_empty()).map(|b| (b.low, b.high)).collect(),
          requested: req.problem_count,
          available: fulfilled,
        });
      }
      warn!(target: "generation", requested = req.problem_count, fulfilled, short_bands = outcome.short_bands.len(), "Partial fulfillment");
      Some(PartialFulfillment {
        requested: req.problem_count,
        fulfilled,
        short_bands: outcome.short_bands,
      })
    } else {
      None
    };

    info!(target: "generation", candidates = candidates.len(), bands = summaries.len(), selected = fulfilled, "Path plan ready");
    Ok(PathPlan { problems, bands: summaries, warning })
  }
}

fn mode_title(req: &GenerationRequest) -> String {
  let mut chars = req.mode.as_str().chars();
  match chars.next() {
    Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}

/// Default path name: "Learning: dp, greedy".
pub fn default_name(req: &GenerationRequest) -> String {
  format!("{}: {}", mode_title(req), req.topics.iter().cloned().collect::<Vec<_>>().join(", "))
}

/// Materialize a plan as a fresh active path. Forced mode opens only position 1.
pub fn build_record(id: Uuid, req: &GenerationRequest, plan: PathPlan, now: DateTime<Utc>) -> PathRecord {
  let topics = req.topics.iter().cloned().collect::<Vec<_>>().join(", ");
  let description = format!(
    "{} path for {} ({}-{})",
    mode_title(req),
    topics,
    req.min_rating,
    req.max_rating
  );
  let name = req
    .name
    .as_ref()
    .map(|n| n.trim().to_string())
    .filter(|n| !n.is_empty())
    .unwrap_or_else(|| default_name(req));

  let problems: Vec<PathProblem> = plan
    .problems
    .into_iter()
    .enumerate()
    .map(|(i, problem)| {
      let open = !req.forced_mode || i == 0;
      PathProblem {
        position: i as u32 + 1,
        problem,
        status: if open { ProblemStatus::Unlocked } else { ProblemStatus::Locked },
        unlocked_at: open.then_some(now),
        solved_at: None,
      }
    })
    .collect();

  let path = PracticePath {
    id,
    name,
    description,
    topics: req.topics.clone(),
    min_rating: req.min_rating,
    max_rating: req.max_rating,
    mode: req.mode,
    forced_mode: req.forced_mode,
    total_problems: problems.len() as u32,
    current_position: 0,
    status: PathStatus::Active,
    version: 0,
    created_at: now,
    updated_at: now,
    completed_at: None,
  };
  PathRecord { path, problems }
}
