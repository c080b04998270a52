//! Problem catalog seam.
//!
//! The engine only ever asks the catalog for candidates; ingestion/sync from the judge
//! lives elsewhere. `InMemoryCatalog` is the shipped implementation (seeds + TOML bank).

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, instrument};

use crate::config::ProblemCfg;
use crate::domain::Problem;
use crate::error::PathError;
use crate::util::slugify;

/// Filters for one candidate fetch. Rating bounds are inclusive.
#[derive(Clone, Debug)]
pub struct CandidateQuery<'a> {
  pub topics: &'a BTreeSet<String>,
  pub min_rating: i32,
  pub max_rating: i32,
  pub exclude_ids: &'a BTreeSet<i64>,
}

pub trait CatalogReader: Send + Sync {
  /// Rated problems sharing at least one topic with the query, inside the rating range,
  /// minus excluded ids. No duplicates.
  fn find_candidates(&self, query: &CandidateQuery<'_>) -> Result<Vec<Problem>, PathError>;
}

pub struct InMemoryCatalog {
  problems: BTreeMap<i64, Problem>,
}

impl InMemoryCatalog {
  pub fn new(problems: impl IntoIterator<Item = Problem>) -> Self {
    let mut map = BTreeMap::new();
    for mut p in problems {
      p.tags = p.tags.iter().map(|t| slugify(t)).collect();
      // First one wins, so configured problems shadow seeds with the same id.
      map.entry(p.id).or_insert(p);
    }
    Self { problems: map }
  }

  /// Configured bank first, then built-in seeds.
  pub fn from_sources(bank: &[ProblemCfg], seeds: Vec<Problem>) -> Self {
    let configured = bank.iter().map(|c| Problem {
      id: c.id,
      contest_id: c.contest_id,
      index: c.index.clone(),
      name: c.name.clone(),
      rating: c.rating,
      solved_count: c.solved_count,
      tags: c.tags.iter().cloned().collect(),
    });
    let catalog = Self::new(configured.chain(seeds));
    info!(target: "cpath_backend", configured = bank.len(), total = catalog.len(), "Catalog ready");
    catalog
  }

  pub fn len(&self) -> usize {
    self.problems.len()
  }
}

impl CatalogReader for InMemoryCatalog {
  #[instrument(level = "debug", skip(self, query), fields(topics = query.topics.len(), min = query.min_rating, max = query.max_rating))]
  fn find_candidates(&self, query: &CandidateQuery<'_>) -> Result<Vec<Problem>, PathError> {
    let wanted: BTreeSet<String> = query.topics.iter().map(|t| slugify(t)).collect();
    let out: Vec<Problem> = self
      .problems
      .values()
      .filter(|p| matches!(p.rating, Some(r) if r >= query.min_rating && r <= query.max_rating))
      .filter(|p| !query.exclude_ids.contains(&p.id))
      .filter(|p| p.tags.iter().any(|t| wanted.contains(t)))
      .cloned()
      .collect();
    debug!(target: "generation", candidates = out.len(), "Catalog candidates fetched");
    Ok(out)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn problem(id: i64, rating: Option<i32>, tags: &[&str]) -> Problem {
    Problem {
      id,
      contest_id: id,
      index: "A".into(),
      name: format!("P{id}"),
      rating,
      solved_count: 10,
      tags: tags.iter().map(|t| t.to_string()).collect(),
    }
  }

  #[test]
  fn filters_by_topic_range_and_exclusions() {
    let catalog = InMemoryCatalog::new(vec![
      problem(1, Some(800), &["dp"]),
      problem(2, Some(1300), &["dp"]),
      problem(3, Some(900), &["greedy"]),
      problem(4, None, &["dp"]),
      problem(5, Some(1200), &["dp", "math"]),
      problem(6, Some(1000), &["Dynamic Programming"]),
    ]);
    let topics: BTreeSet<String> = ["dp".to_string(), "dynamic programming".to_string()].into();
    let exclude: BTreeSet<i64> = [5].into();
    let q = CandidateQuery { topics: &topics, min_rating: 800, max_rating: 1200, exclude_ids: &exclude };
    let ids: Vec<i64> = catalog.find_candidates(&q).unwrap().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 6]);
  }

  #[test]
  fn configured_problems_shadow_seeds() {
    let bank = vec![ProblemCfg {
      id: 1,
      contest_id: 9,
      index: "Z".into(),
      name: "Override".into(),
      rating: Some(900),
      solved_count: 1,
      tags: vec!["dp".into()],
    }];
    let catalog = InMemoryCatalog::from_sources(&bank, vec![problem(1, Some(800), &["dp"]), problem(2, Some(800), &["dp"])]);
    assert_eq!(catalog.len(), 2);
    let topics: BTreeSet<String> = ["dp".to_string()].into();
    let none = BTreeSet::new();
    let q = CandidateQuery { topics: &topics, min_rating: 800, max_rating: 1000, exclude_ids: &none };
    let found = catalog.find_candidates(&q).unwrap();
    assert_eq!(found[0].name, "Override");
  }
}
