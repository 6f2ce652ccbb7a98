use super::config::SolverConfig;
use super::node::{on_path, trace_path, SearchNode, Solution};
use super::tt::HeuristicCache;
use crate::core::{SokobanState, StateKey};
use crate::heuristic::Heuristic;
use crate::logic::successors;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

pub type FvalFn = Box<dyn Fn(&SearchNode) -> f64 + Send + Sync>;

/// キューの優先度の決め方 (小さいほど先に展開)
pub enum Strategy {
    /// h のみ
    BestFirst,
    /// g のみ
    UniformCost,
    /// g + h
    AStar,
    Custom(FvalFn),
}

impl Strategy {
    fn priority(&self, node: &SearchNode) -> f64 {
        match self {
            Strategy::BestFirst => node.hval,
            Strategy::UniformCost => node.gval as f64,
            Strategy::AStar => node.gval as f64 + node.hval,
            Strategy::Custom(f) => f(node),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::BestFirst => "best_first",
            Strategy::UniformCost => "uniform_cost",
            Strategy::AStar => "astar",
            Strategy::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleCheck {
    None,
    /// 祖先と同じ状態を捨てる
    Path,
    /// 既により小さいか同じ g で到達した状態を捨てる
    Full,
}

/// (g, h, g + h) の上限 (両端を含む)。超えた後続状態は刈る。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBound {
    pub g: Option<u32>,
    pub h: Option<f64>,
    pub f: Option<f64>,
}

impl CostBound {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_g(g: u32) -> Self {
        CostBound {
            g: Some(g),
            ..Self::default()
        }
    }

    pub fn with_f(f: f64) -> Self {
        CostBound {
            f: Some(f),
            ..Self::default()
        }
    }

    fn exceeds_g(&self, gval: u32) -> bool {
        self.g.is_some_and(|b| gval > b)
    }

    fn exceeds_h_or_f(&self, gval: u32, hval: f64) -> bool {
        self.h.is_some_and(|b| hval > b) || self.f.is_some_and(|b| gval as f64 + hval > b)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Solved,
    /// キューが空になった (コスト上限の範囲に解が無い)
    #[default]
    Exhausted,
    TimedOut,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub expanded: usize,
    pub generated: usize,
    pub pruned_cycle: usize,
    pub pruned_cost: usize,
    pub dead_states: usize,
    pub cache_hits: usize,
    pub elapsed: Duration,
    pub termination: Termination,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub solution: Option<Solution>,
    pub stats: SearchStats,
}

struct OpenEntry {
    priority: f64,
    seq: u64,
    index: usize,
}

// BinaryHeap は最大ヒープなので逆順に比較する。同じ優先度なら先に入れた方。
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

pub struct SearchEngine {
    strategy: Strategy,
    cycle_check: CycleCheck,
    cache: Option<HeuristicCache>,
}

impl SearchEngine {
    pub fn new(strategy: Strategy, cycle_check: CycleCheck) -> Self {
        Self {
            strategy,
            cycle_check,
            cache: None,
        }
    }

    pub fn from_config(strategy: Strategy, config: &SolverConfig) -> Self {
        let engine = Self::new(strategy, config.search.cycle_check);
        if config.cache.enabled {
            engine.with_cache(HeuristicCache::new(
                config.cache.size_mb,
                config.cache.zobrist_seed,
            ))
        } else {
            engine
        }
    }

    pub fn with_cache(mut self, cache: HeuristicCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&HeuristicCache> {
        self.cache.as_ref()
    }

    pub fn take_cache(&mut self) -> Option<HeuristicCache> {
        self.cache.take()
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    fn evaluate(
        &mut self,
        heuristic: &mut dyn Heuristic,
        state: &SokobanState,
        stats: &mut SearchStats,
    ) -> f64 {
        let Some(cache) = self.cache.as_mut() else {
            return heuristic.estimate(state);
        };
        let Some(hash) = cache.hash(state) else {
            return heuristic.estimate(state);
        };
        if let Some(hval) = cache.get(hash) {
            stats.cache_hits += 1;
            return hval;
        }
        let hval = heuristic.estimate(state);
        cache.store(hash, hval);
        hval
    }

    /// `initial` からゴールを探す。時間切れは展開の合間に確認する。
    pub fn search(
        &mut self,
        initial: &SokobanState,
        heuristic: &mut dyn Heuristic,
        timebound: Duration,
        costbound: CostBound,
    ) -> SearchResult {
        let start = Instant::now();
        let mut stats = SearchStats::default();

        if let Some(cache) = self.cache.as_mut() {
            cache.bind(heuristic.name(), initial);
        }

        let mut nodes: Vec<SearchNode> = Vec::new();
        let mut open = BinaryHeap::new();
        let mut closed: HashMap<StateKey, u32> = HashMap::new();
        let mut seq = 0u64;
        let mut solution = None;

        let root_h = self.evaluate(heuristic, initial, &mut stats);
        let termination = if root_h.is_infinite() && !initial.is_goal() {
            stats.dead_states += 1;
            Termination::Exhausted
        } else {
            nodes.push(SearchNode::root(initial.clone(), root_h));
            if self.cycle_check == CycleCheck::Full {
                closed.insert(initial.key(), 0);
            }
            open.push(OpenEntry {
                priority: self.strategy.priority(&nodes[0]),
                seq,
                index: 0,
            });
            seq += 1;

            loop {
                let Some(entry) = open.pop() else {
                    break Termination::Exhausted;
                };
                let index = entry.index;

                // より良い g で再登録済みの古いエントリは飛ばす
                if self.cycle_check == CycleCheck::Full {
                    let node = &nodes[index];
                    if closed
                        .get(&node.state.key())
                        .is_some_and(|&g| g < node.gval)
                    {
                        continue;
                    }
                }

                if nodes[index].state.is_goal() {
                    solution = Some(trace_path(&nodes, index));
                    break Termination::Solved;
                }

                if start.elapsed() >= timebound {
                    break Termination::TimedOut;
                }

                stats.expanded += 1;
                let gval = nodes[index].gval + 1;

                for (action, succ) in successors(&nodes[index].state) {
                    stats.generated += 1;

                    if costbound.exceeds_g(gval) {
                        stats.pruned_cost += 1;
                        continue;
                    }

                    match self.cycle_check {
                        CycleCheck::None => {}
                        CycleCheck::Path => {
                            if on_path(&nodes, index, &succ) {
                                stats.pruned_cycle += 1;
                                continue;
                            }
                        }
                        CycleCheck::Full => {
                            let key = succ.key();
                            if closed.get(&key).is_some_and(|&g| g <= gval) {
                                stats.pruned_cycle += 1;
                                continue;
                            }
                            closed.insert(key, gval);
                        }
                    }

                    let hval = self.evaluate(heuristic, &succ, &mut stats);
                    if hval.is_infinite() {
                        stats.dead_states += 1;
                        continue;
                    }
                    if costbound.exceeds_h_or_f(gval, hval) {
                        stats.pruned_cost += 1;
                        continue;
                    }

                    nodes.push(SearchNode {
                        state: succ,
                        gval,
                        hval,
                        parent: Some(index),
                        action: Some(action),
                    });
                    let child = nodes.len() - 1;
                    open.push(OpenEntry {
                        priority: self.strategy.priority(&nodes[child]),
                        seq,
                        index: child,
                    });
                    seq += 1;
                }
            }
        };

        stats.elapsed = start.elapsed();
        stats.termination = termination;
        debug!(
            "{} search ({}): {:?} after {} expansions, {} generated",
            self.strategy.name(),
            heuristic.name(),
            termination,
            stats.expanded,
            stats.generated
        );

        SearchResult { solution, stats }
    }
}
