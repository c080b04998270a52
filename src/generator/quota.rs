//! Per-band quotas from the training mode.

use crate::domain::TrainingMode;

impl TrainingMode {
  /// Unnormalized weight of band `i` (1 = easiest) out of `n`.
  pub fn band_weight(self, i: u64, n: u64) -> u64 {
    match self {
      TrainingMode::Learning => learning_weight(i, n),
      TrainingMode::Revision => revision_weight(i, n),
      TrainingMode::Challenge => challenge_weight(i, n),
    }
  }
}

fn learning_weight(i: u64, n: u64) -> u64 {
  n - i + 1
}

fn revision_weight(_i: u64, _n: u64) -> u64 {
  1
}

fn challenge_weight(i: u64, _n: u64) -> u64 {
  i
}

/// Split `problem_count` across `bands` bands. The result always sums to `problem_count`:
/// floors first, then leftover units go to the largest fractional remainders (lowest index on ties).
pub fn band_quotas(bands: usize, problem_count: u32, mode: TrainingMode) -> Vec<u32> {
  if bands == 0 {
    return Vec::new();
  }
  let n = bands as u64;
  let total = problem_count as u64;
  let weights: Vec<u64> = (1..=n).map(|i| mode.band_weight(i, n)).collect();
  let weight_sum: u64 = weights.iter().sum();

  let mut quotas = Vec::with_capacity(bands);
  let mut remainders = Vec::with_capacity(bands);
  for (idx, w) in weights.iter().enumerate() {
    let scaled = total * w;
    quotas.push((scaled / weight_sum) as u32);
    remainders.push((scaled % weight_sum, idx));
  }

  let assigned: u64 = quotas.iter().map(|&q| q as u64).sum();
  let mut leftover = total - assigned;
  remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
  for (_, idx) in remainders {
    if leftover == 0 {
      break;
    }
    quotas[idx] += 1;
    leftover -= 1;
  }
  quotas
}
