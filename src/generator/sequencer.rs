//! Final ordering: rating ramp with bounded local jitter.

use std::cmp::Ordering;

use rand::Rng;

use super::scoring::educational_score;
use crate::domain::Problem;

#[derive(Clone, Copy, Debug)]
pub struct SequencerSettings {
  pub window: usize,
  pub tolerance: f64,
}

impl Default for SequencerSettings {
  fn default() -> Self {
    Self { window: 3, tolerance: 5_000.0 }
  }
}

/// Ascending rating (unrated last); equal ratings put the better-vetted problem first.
fn ramp_order(a: &Problem, b: &Problem) -> Ordering {
  let by_rating = match (a.rating, b.rating) {
    (Some(x), Some(y)) => x.cmp(&y),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  };
  by_rating
    .then_with(|| educational_score(b).total_cmp(&educational_score(a)))
    .then(a.id.cmp(&b.id))
}

/// Sum of squared rating steps over `seq[from..=to]`; unrated problems count as steps of zero.
fn roughness(seq: &[Problem], from: usize, to: usize) -> f64 {
  (from..to)
    .filter_map(|i| match (seq[i].rating, seq[i + 1].rating) {
      (Some(x), Some(y)) => Some(((y - x) as f64).powi(2)),
      _ => None,
    })
    .sum()
}

/// Sort into a difficulty ramp, then try one random swap per window of `window` problems.
/// A swap stays only if the roughness of the window plus its neighbours grows by at most `tolerance`.
/// Unrated problems never move.
pub fn sequence<R: Rng + ?Sized>(mut problems: Vec<Problem>, settings: &SequencerSettings, rng: &mut R) -> Vec<Problem> {
  problems.sort_by(ramp_order);
  let w = settings.window;
  if w < 2 || problems.len() < 2 {
    return problems;
  }

  let mut start = 0;
  while start < problems.len() {
    let end = (start + w).min(problems.len());
    if end - start >= 2 {
      let i = rng.gen_range(start..end);
      let j = rng.gen_range(start..end);
      if i != j && problems[i].rating.is_some() && problems[j].rating.is_some() {
        let from = start.saturating_sub(1);
        let to = end.min(problems.len() - 1);
        let before = roughness(&problems, from, to);
        problems.swap(i, j);
        if roughness(&problems, from, to) - before > settings.tolerance {
          problems.swap(i, j);
        }
      }
    }
    start = end;
  }
  problems
}
