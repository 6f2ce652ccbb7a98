//! Heuristic trait for state evaluation
//!
//! Defines a common interface for the estimates consumed by the search engine.

pub mod alternate;
pub mod deadlock;
pub mod manhattan;

pub use alternate::AlternateHeuristic;
pub use deadlock::{detect_deadlock, DeadlockReason, Wall};
pub use manhattan::ManhattanHeuristic;

use crate::core::SokobanState;
use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estimate returned for states that can provably never reach the goal.
pub const INFINITE_COST: f64 = f64::INFINITY;

/// Trait for estimating the remaining cost of a state
pub trait Heuristic: Send + Sync {
    /// Estimate the number of moves left until every box is stored
    ///
    /// Returns:
    ///   - `0.0` at a goal state
    ///   - a non-negative finite estimate otherwise
    ///   - `INFINITE_COST` when the state is a proven deadlock
    fn estimate(&mut self, state: &SokobanState) -> f64;

    /// Get heuristic name for logging and cache binding
    fn name(&self) -> &str;
}

/// Makes A* behave like uniform cost search.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&mut self, _state: &SokobanState) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "zero"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeuristicKind {
    Zero,
    Manhattan,
    Alternate,
}

impl HeuristicKind {
    pub const ALL: [HeuristicKind; 3] = [
        HeuristicKind::Zero,
        HeuristicKind::Manhattan,
        HeuristicKind::Alternate,
    ];

    pub fn build(self) -> Box<dyn Heuristic> {
        match self {
            HeuristicKind::Zero => Box::new(ZeroHeuristic),
            HeuristicKind::Manhattan => Box::new(ManhattanHeuristic),
            HeuristicKind::Alternate => Box::new(AlternateHeuristic::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HeuristicKind::Zero => "zero",
            HeuristicKind::Manhattan => "manhattan",
            HeuristicKind::Alternate => "alternate",
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HeuristicKind {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zero" => Ok(HeuristicKind::Zero),
            "manhattan" => Ok(HeuristicKind::Manhattan),
            "alternate" | "deadlock" => Ok(HeuristicKind::Alternate),
            _ => Err(SolverError::UnknownHeuristic(s.to_string())),
        }
    }
}
