//! Fixed-width rating bands over the requested range.

use crate::domain::Problem;

/// `[low, high)` rating interval plus the candidates that fall into it.
#[derive(Clone, Debug, PartialEq)]
pub struct RatingBand {
  pub low: i32,
  pub high: i32,
  pub problems: Vec<Problem>,
}

/// Split `candidates` into bands of `width` covering `[min_rating, max_rating]`.
/// Empty bands are kept; `max_rating` lands in the last band; unrated or
/// out-of-range problems are dropped.
pub fn partition(candidates: &[Problem], min_rating: i32, max_rating: i32, width: u32) -> Vec<RatingBand> {
  let width = width.max(1) as i64;
  let span = (max_rating as i64 - min_rating as i64).max(0);
  let count = ((span + width - 1) / width).max(1);

  let mut bands: Vec<RatingBand> = (0..count)
    .map(|k| {
      let low = min_rating as i64 + k * width;
      RatingBand { low: low as i32, high: (low + width) as i32, problems: Vec::new() }
    })
    .collect();

  for p in candidates {
    let Some(r) = p.rating else { continue };
    if r < min_rating || r > max_rating {
      continue;
    }
    let k = ((r as i64 - min_rating as i64) / width).min(count - 1) as usize;
    bands[k].problems.push(p.clone());
  }
  bands
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rated(id: i64, rating: Option<i32>) -> Problem {
    Problem {
      id,
      contest_id: 1,
      index: "A".into(),
      name: String::new(),
      rating,
      solved_count: 0,
      tags: Default::default(),
    }
  }

  #[test]
  fn covers_range_including_empty_bands() {
    let pool = vec![rated(1, Some(800)), rated(2, Some(1150)), rated(3, Some(1200)), rated(4, None), rated(5, Some(1300))];
    let bands = partition(&pool, 800, 1200, 100);
    let bounds: Vec<(i32, i32)> = bands.iter().map(|b| (b.low, b.high)).collect();
    assert_eq!(bounds, vec![(800, 900), (900, 1000), (1000, 1100), (1100, 1200)]);
    assert_eq!(bands[0].problems.len(), 1);
    assert!(bands[1].problems.is_empty());
    // 1150 and the inclusive upper bound 1200 both land in the last band
    assert_eq!(bands[3].problems.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 3]);
  }

  #[test]
  fn narrow_range_is_one_band() {
    let bands = partition(&[rated(1, Some(850))], 800, 850, 100);
    assert_eq!(bands.len(), 1);
    assert_eq!(bands[0].problems.len(), 1);
  }

  #[test]
  fn partial_last_band_rounds_up() {
    let bands = partition(&[], 800, 1050, 100);
    assert_eq!(bands.len(), 3);
    assert_eq!(bands[2].low, 1000);
  }
}
