//! Built-in catalog problems so the service is useful without an external catalog.

use crate::domain::Problem;

// (id, contest, index, name, rating, solved, tags)
type SeedRow = (i64, i64, &'static str, &'static str, Option<i32>, u32, &'static [&'static str]);

const SEED_ROWS: &[SeedRow] = &[
  (1, 4, "A", "Watermelon", Some(800), 420_000, &["brute-force", "math"]),
  (2, 71, "A", "Way Too Long Words", Some(800), 360_000, &["strings"]),
  (3, 231, "A", "Team", Some(800), 330_000, &["brute-force", "greedy"]),
  (4, 158, "A", "Next Round", Some(800), 300_000, &["implementation", "special"]),
  (5, 50, "A", "Domino piling", Some(800), 250_000, &["greedy", "math"]),
  (6, 282, "A", "Bit++", Some(800), 290_000, &["implementation"]),
  (7, 339, "A", "Helpful Maths", Some(800), 230_000, &["greedy", "implementation", "sorting", "strings"]),
  (8, 1, "A", "Theatre Square", Some(1000), 210_000, &["math"]),
  (9, 266, "B", "Queue at the School", Some(800), 150_000, &["constructive-algorithms", "graph-matchings", "implementation", "shortest-paths"]),
  (10, 160, "A", "Twins", Some(900), 140_000, &["greedy", "sortings"]),
  (11, 1352, "A", "Sum of Round Numbers", Some(800), 60_000, &["implementation", "math"]),
  (12, 122, "A", "Lucky Division", Some(1000), 110_000, &["brute-force", "number-theory"]),
  (13, 363, "B", "Fence", Some(1100), 60_000, &["brute-force", "dp"]),
  (14, 1005, "B", "Delete from the Left", Some(900), 40_000, &["brute-force", "implementation", "strings"]),
  (15, 327, "A", "Flipping Game", Some(1200), 45_000, &["brute-force", "dp", "implementation"]),
  (16, 977, "B", "Two-gram", Some(900), 38_000, &["implementation", "strings"]),
  (17, 1409, "B", "Minimum Product", Some(1100), 30_000, &["brute-force", "greedy", "math"]),
  (18, 189, "A", "Cut Ribbon", Some(1300), 95_000, &["brute-force", "dp"]),
  (19, 455, "A", "Boredom", Some(1500), 80_000, &["dp"]),
  (20, 1195, "C", "Basketball Exercise", Some(1400), 30_000, &["dp"]),
  (21, 474, "D", "Flowers", Some(1700), 28_000, &["dp"]),
  (22, 166, "E", "Tetrahedron", Some(1500), 22_000, &["dp", "math", "matrices"]),
  (23, 550, "A", "Two Substrings", Some(1500), 50_000, &["brute-force", "dp", "greedy", "implementation", "strings"]),
  (24, 1025, "B", "Weakened Common Divisor", Some(1600), 12_000, &["brute-force", "greedy", "number-theory"]),
  (25, 466, "A", "Cheap Travel", Some(1200), 60_000, &["implementation"]),
  (26, 279, "B", "Books", Some(1400), 55_000, &["binary-search", "brute-force", "implementation", "two-pointers"]),
  (27, 706, "B", "Interesting drink", Some(1100), 70_000, &["binary-search", "dp", "implementation"]),
  (28, 474, "B", "Worms", Some(1200), 55_000, &["binary-search", "implementation"]),
  (29, 371, "C", "Hamburgers", Some(1600), 25_000, &["binary-search", "brute-force"]),
  (30, 1201, "C", "Maximum Median", Some(1400), 30_000, &["binary-search", "greedy", "math", "sortings"]),
  (31, 580, "C", "Kefa and Park", Some(1500), 45_000, &["dfs-and-similar", "graphs", "trees"]),
  (32, 1144, "F", "Graph Without Long Directed Paths", Some(1700), 15_000, &["dfs-and-similar", "graphs"]),
  (33, 520, "B", "Two Buttons", Some(1400), 50_000, &["dfs-and-similar", "graphs", "greedy", "implementation", "math", "shortest-paths"]),
  (34, 1033, "A", "King Escape", Some(1000), 20_000, &["dfs-and-similar", "graphs", "implementation"]),
  (35, 1093, "A", "Dice Rolling", Some(800), 25_000, &["math"]),
  (36, 1343, "B", "Balanced Array", Some(800), 40_000, &["constructive-algorithms", "math"]),
  (37, 1399, "C", "Boats Competition", Some(1200), 25_000, &["brute-force", "greedy", "two-pointers"]),
  (38, 1343, "C", "Alternating Subsequence", Some(1200), 35_000, &["dp", "greedy", "two-pointers"]),
  (39, 1366, "A", "Shovels and Swords", Some(1100), 40_000, &["binary-search", "greedy", "math"]),
  (40, 1324, "D", "Pair of Topics", Some(1400), 30_000, &["binary-search", "sortings", "two-pointers"]),
  (41, 1077, "C", "Good Array", Some(1300), 25_000, &["implementation"]),
  (42, 1029, "A", "Many Equal Substrings", Some(1300), 18_000, &["implementation", "strings"]),
  (43, 1373, "B", "01 Game", Some(900), 22_000, &["games"]),
  (44, 1660, "C", "Get an Even String", Some(1300), 14_000, &["dp", "greedy", "strings"]),
  (45, 1370, "A", "Maximum GCD", Some(800), 45_000, &["greedy", "implementation", "math", "number-theory"]),
  (46, 1, "B", "Spreadsheets", Some(1600), 30_000, &["implementation", "math"]),
  (47, 1475, "B", "New Year's Number", Some(900), 30_000, &["brute-force", "dp", "math"]),
  (48, 1800, "A", "Is It a Cat?", None, 10_000, &["implementation", "strings"]),
];

/// Minimal catalog that keeps the service useful without a configured problem bank.
pub fn seed_problems() -> Vec<Problem> {
  SEED_ROWS
    .iter()
    .map(|&(id, contest_id, index, name, rating, solved_count, tags)| Problem {
      id,
      contest_id,
      index: index.into(),
      name: name.into(),
      rating,
      solved_count,
      tags: tags.iter().map(|t| t.to_string()).collect(),
    })
    .collect()
}
