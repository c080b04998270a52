//! Score-weighted sampling of each band's quota, with shortfall carried toward easier bands.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::bands::RatingBand;
use super::scoring::educational_score;
use crate::domain::Problem;

#[derive(Clone, Copy, Debug)]
pub struct SamplerSettings {
  pub oversample_factor: usize,
  /// Added to every score so zero-scored problems can still be drawn.
  pub score_floor: f64,
}

impl Default for SamplerSettings {
  fn default() -> Self {
    Self { oversample_factor: 3, score_floor: 1.0 }
  }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleOutcome {
  /// Drawn problems, easiest band first.
  pub selected: Vec<Problem>,
  /// Problems nobody could supply, even after falling back to easier bands.
  pub shortfall: u32,
  /// `[low, high)` of every band that could not cover what it was asked for.
  pub short_bands: Vec<(i32, i32)>,
}

/// Problems of a band ranked by educational score (ties: lower id first).
pub fn ranked(problems: &[Problem]) -> Vec<(f64, &Problem)> {
  let mut scored: Vec<(f64, &Problem)> = problems.iter().map(|p| (educational_score(p), p)).collect();
  scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.id.cmp(&b.1.id)));
  scored
}

/// Walk bands hardest to easiest. A band that cannot meet `quota + carried` gives all it has
/// and passes the rest down to the next easier band.
pub fn sample_bands<R: Rng + ?Sized>(
  bands: &[RatingBand],
  quotas: &[u32],
  settings: &SamplerSettings,
  rng: &mut R,
) -> SampleOutcome {
  let mut per_band: Vec<Vec<Problem>> = vec![Vec::new(); bands.len()];
  let mut short_bands = Vec::new();
  let mut carry: usize = 0;

  for (idx, band) in bands.iter().enumerate().rev() {
    let wanted = quotas.get(idx).copied().unwrap_or(0) as usize + carry;
    if wanted == 0 {
      continue;
    }
    let available = band.problems.len();
    if available < wanted {
      per_band[idx] = band.problems.clone();
      carry = wanted - available;
      short_bands.push((band.low, band.high));
      debug!(target: "generation", low = band.low, high = band.high, wanted, available, carry, "Band short; carrying to easier band");
      continue;
    }
    carry = 0;
    per_band[idx] = draw(&band.problems, wanted, settings, rng);
  }

  short_bands.reverse();
  SampleOutcome {
    selected: per_band.into_iter().flatten().collect(),
    shortfall: carry as u32,
    short_bands,
  }
}

/// Draw `k` problems from the top `k × oversample` by score, weighted by score + floor,
/// without replacement.
fn draw<R: Rng + ?Sized>(problems: &[Problem], k: usize, settings: &SamplerSettings, rng: &mut R) -> Vec<Problem> {
  let scored = ranked(problems);
  let pool_size = (k * settings.oversample_factor.max(1)).min(scored.len());
  let pool = &scored[..pool_size];
  let floor = settings.score_floor.max(f64::MIN_POSITIVE);

  match pool.choose_multiple_weighted(rng, k, |(score, _)| score + floor) {
    Ok(chosen) => chosen.map(|(_, p)| (*p).clone()).collect(),
    Err(e) => {
      warn!(target: "generation", error = %e, "Weighted draw failed; taking top-ranked problems");
      pool.iter().take(k).map(|(_, p)| (*p).clone()).collect()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::generator::bands::partition;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use std::collections::HashSet;

  fn problem(id: i64, rating: i32, solved: u32) -> Problem {
    Problem {
      id,
      contest_id: id,
      index: "A".into(),
      name: format!("P{id}"),
      rating: Some(rating),
      solved_count: solved,
      tags: ["dp".to_string()].into(),
    }
  }

  #[test]
  fn meets_quotas_without_duplicates() {
    let pool: Vec<Problem> = (0..40).map(|i| problem(i, 800 + (i as i32 % 4) * 100, i as u32 * 10)).collect();
    let bands = partition(&pool, 800, 1200, 100);
    let mut rng = StdRng::seed_from_u64(11);
    let out = sample_bands(&bands, &[3, 2, 2, 1], &SamplerSettings::default(), &mut rng);
    assert_eq!(out.selected.len(), 8);
    assert_eq!(out.shortfall, 0);
    assert!(out.short_bands.is_empty());
    let ids: HashSet<i64> = out.selected.iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 8);
  }

  #[test]
  fn short_band_falls_back_to_easier_band() {
    // hardest band has one problem but wants three
    let pool = vec![
      problem(1, 800, 5),
      problem(2, 810, 5),
      problem(3, 820, 5),
      problem(4, 830, 5),
      problem(5, 900, 5),
    ];
    let bands = partition(&pool, 800, 1000, 100);
    let mut rng = StdRng::seed_from_u64(3);
    let out = sample_bands(&bands, &[1, 3], &SamplerSettings::default(), &mut rng);
    assert_eq!(out.selected.len(), 4);
    assert_eq!(out.shortfall, 0);
    assert_eq!(out.short_bands, vec![(900, 1000)]);
    assert!(out.selected.iter().any(|p| p.id == 5));
  }

  #[test]
  fn shortfall_reported_when_easiest_band_exhausted() {
    let pool = vec![problem(1, 800, 5), problem(2, 950, 5)];
    let bands = partition(&pool, 800, 1000, 100);
    let mut rng = StdRng::seed_from_u64(3);
    let out = sample_bands(&bands, &[2, 3], &SamplerSettings::default(), &mut rng);
    assert_eq!(out.selected.len(), 2);
    assert_eq!(out.shortfall, 3);
    assert_eq!(out.short_bands, vec![(800, 900), (900, 1000)]);
  }

  #[test]
  fn draws_only_from_oversampled_top() {
    // quota 1 with factor 2: only the two best-scored problems are eligible
    let pool = vec![problem(1, 800, 1_000_000), problem(2, 800, 100_000), problem(3, 800, 0), problem(4, 800, 0)];
    let bands = partition(&pool, 800, 900, 100);
    let settings = SamplerSettings { oversample_factor: 2, score_floor: 1.0 };
    for seed in 0..50 {
      let mut rng = StdRng::seed_from_u64(seed);
      let out = sample_bands(&bands, &[1], &settings, &mut rng);
      assert!(matches!(out.selected[0].id, 1 | 2), "seed {seed} drew {}", out.selected[0].id);
    }
  }

  #[test]
  fn zero_scored_problems_remain_eligible() {
    let zero = |id| Problem { solved_count: 0, rating: Some(800), tags: Default::default(), ..problem(id, 800, 0) };
    let pool: Vec<Problem> = (1..=3).map(zero).collect();
    let bands = partition(&pool, 800, 900, 100);
    let mut seen = HashSet::new();
    for seed in 0..200 {
      let mut rng = StdRng::seed_from_u64(seed);
      let out = sample_bands(&bands, &[1], &SamplerSettings::default(), &mut rng);
      seen.insert(out.selected[0].id);
    }
    assert_eq!(seen.len(), 3);
  }

  #[test]
  fn same_seed_same_draw() {
    let pool: Vec<Problem> = (0..30).map(|i| problem(i, 800 + (i as i32 % 3) * 100, (i as u32 + 1) * 37)).collect();
    let bands = partition(&pool, 800, 1100, 100);
    let a = sample_bands(&bands, &[2, 2, 2], &SamplerSettings::default(), &mut StdRng::seed_from_u64(99));
    let b = sample_bands(&bands, &[2, 2, 2], &SamplerSettings::default(), &mut StdRng::seed_from_u64(99));
    assert_eq!(a, b);
  }
}
