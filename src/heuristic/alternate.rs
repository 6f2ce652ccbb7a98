//! # Deadlock-Aware Distance Heuristic
//!
//! Trades admissibility for pruning power. A state that `detect_deadlock`
//! rejects scores `INFINITE_COST`; otherwise the estimate is the sum of:
//!
//! 1. **Congestion**: +1 for every box orthogonally adjacent to an unsolved box.
//! 2. **Box to storage**: greedy assignment in ascending box order, each box
//!    taking the nearest free storage cell (Manhattan distance plus obstacles
//!    inside the bounding rectangle). A storage cell is used at most once.
//! 3. **Robot to box**: for every unsolved box, the nearest robot's distance
//!    plus obstacles inside their bounding rectangle.

use super::deadlock::detect_deadlock;
use super::{Heuristic, INFINITE_COST};
use crate::core::{Position, SokobanState};
use std::collections::BTreeSet;

#[derive(Debug, Default, Clone)]
pub struct AlternateHeuristic {
    /// `estimate` が実際に計算してデッドロックと判定した回数の累計。
    /// キャッシュから返された値は数えないので、探索中の枝刈り数は
    /// `SearchStats::dead_states` を見ること。
    pub deadlocks: usize,
}

impl AlternateHeuristic {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Heuristic for AlternateHeuristic {
    fn estimate(&mut self, state: &SokobanState) -> f64 {
        if detect_deadlock(state).is_some() {
            self.deadlocks += 1;
            return INFINITE_COST;
        }
        distance_estimate(state) as f64
    }

    fn name(&self) -> &str {
        "alternate"
    }
}

fn congestion(state: &SokobanState, unsolved: &[Position]) -> u32 {
    unsolved
        .iter()
        .map(|b| b.neighbors().iter().filter(|n| state.has_box(**n)).count() as u32)
        .sum()
}

/// 最小距離の候補を選ぶ (同距離なら先に現れた方)
fn nearest<'a, I>(from: Position, candidates: I) -> Option<(Position, u32)>
where
    I: IntoIterator<Item = &'a Position>,
{
    candidates
        .into_iter()
        .map(|c| (*c, from.manhattan(*c)))
        .fold(None, |best, (c, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((c, d)),
        })
}

fn distance_estimate(state: &SokobanState) -> u32 {
    let layout = &state.layout;
    let unsolved: Vec<Position> = state.unsolved_boxes().collect();

    let mut total = congestion(state, &unsolved);

    let mut free_storage: BTreeSet<Position> = layout
        .storage
        .iter()
        .copied()
        .filter(|s| !state.has_box(*s))
        .collect();
    for &b in &unsolved {
        // |storage| >= |boxes| が保証されているので空にはならない
        if let Some((s, d)) = nearest(b, &free_storage) {
            free_storage.remove(&s);
            total += d + layout.obstacles_between(b, s);
        }
    }

    for &b in &unsolved {
        if let Some((r, d)) = nearest(b, &state.robots) {
            total += d + layout.obstacles_between(r, b);
        }
    }

    total
}
