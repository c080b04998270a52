//! Educational score: how good a problem is as practice material.

use crate::domain::Problem;

const POPULARITY_CAP: f64 = 50.0;
const RATED_BONUS: f64 = 20.0;
const FOCUSED_TAGS_BONUS: f64 = 10.0;

/// `min(50, 10·log2(1 + solved)) + 20 if rated + 10 if it carries 2 or 3 tags`.
pub fn educational_score(problem: &Problem) -> f64 {
  let popularity = (10.0 * (1.0 + problem.solved_count as f64).log2()).min(POPULARITY_CAP);
  let rated = if problem.rating.is_some() { RATED_BONUS } else { 0.0 };
  let focused = if (2..=3).contains(&problem.tags.len()) { FOCUSED_TAGS_BONUS } else { 0.0 };
  popularity + rated + focused
}

#[cfg(test)]
mod tests {
  use super::*;

  fn problem(solved: u32, rating: Option<i32>, tags: &[&str]) -> Problem {
    Problem {
      id: 1,
      contest_id: 1,
      index: "A".into(),
      name: String::new(),
      rating,
      solved_count: solved,
      tags: tags.iter().map(|t| t.to_string()).collect(),
    }
  }

  #[test]
  fn unknown_unrated_untagged_scores_zero() {
    assert_eq!(educational_score(&problem(0, None, &[])), 0.0);
  }

  #[test]
  fn popularity_is_log_scaled_and_capped() {
    // log2(1 + 7) = 3
    assert!((educational_score(&problem(7, None, &["dp"])) - 30.0).abs() < 1e-9);
    assert_eq!(educational_score(&problem(1_000_000, None, &["dp"])), 50.0);
  }

  #[test]
  fn bonuses_for_rating_and_tag_sweet_spot() {
    assert_eq!(educational_score(&problem(0, Some(800), &["dp", "greedy"])), 30.0);
    assert_eq!(educational_score(&problem(0, Some(800), &["a", "b", "c", "d"])), 20.0);
    assert_eq!(educational_score(&problem(0, None, &["a", "b", "c"])), 10.0);
  }
}
