//! # Search
//!
//! Best-first search engine plus the weighted and anytime drivers built on it.

pub mod anytime;
pub mod config;
pub mod engine;
pub mod node;
pub mod tt;

pub use anytime::{
    fval_function, iterative_astar, iterative_gbfs, weighted_astar, AnytimeResult, AnytimeSearch,
    Improvement,
};
pub use config::SolverConfig;
pub use engine::{CostBound, CycleCheck, SearchEngine, SearchResult, SearchStats, Strategy, Termination};
pub use node::{SearchNode, Solution};
pub use tt::HeuristicCache;

use crate::core::SokobanState;
use crate::error::SolverError;
use crate::heuristic::Heuristic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// 重み付き A* を 1 回
    WeightedAStar,
    IterativeAStar,
    IterativeGbfs,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::WeightedAStar,
        Algorithm::IterativeAStar,
        Algorithm::IterativeGbfs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::WeightedAStar => "weighted_astar",
            Algorithm::IterativeAStar => "iterative_astar",
            Algorithm::IterativeGbfs => "iterative_gbfs",
        }
    }
}

impl Algorithm {
    /// 設定済みのドライバで解く。WeightedAStar は 1 反復の結果として返す。
    pub fn run(
        self,
        initial: &SokobanState,
        heuristic: &mut dyn Heuristic,
        weight: f64,
        timebound: Duration,
    ) -> AnytimeResult {
        match self {
            Algorithm::WeightedAStar => {
                let start = Instant::now();
                let search = weighted_astar(initial, heuristic, weight, timebound);
                let mut result = AnytimeResult {
                    iterations: 1,
                    total_expanded: search.stats.expanded,
                    ..AnytimeResult::default()
                };
                if let Some(solution) = search.solution {
                    result.offer(solution, search.stats, Some(weight), start.elapsed());
                }
                result
            }
            Algorithm::IterativeAStar => iterative_astar(initial, heuristic, weight, timebound),
            Algorithm::IterativeGbfs => iterative_gbfs(initial, heuristic, timebound),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "weighted_astar" | "wastar" => Ok(Algorithm::WeightedAStar),
            "iterative_astar" | "astar" => Ok(Algorithm::IterativeAStar),
            "iterative_gbfs" | "gbfs" => Ok(Algorithm::IterativeGbfs),
            _ => Err(SolverError::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_names() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert_eq!("gbfs".parse::<Algorithm>().unwrap(), Algorithm::IterativeGbfs);
        assert_eq!(
            "Weighted-AStar".parse::<Algorithm>().unwrap(),
            Algorithm::WeightedAStar
        );
        assert!("dfs".parse::<Algorithm>().is_err());
    }
}
