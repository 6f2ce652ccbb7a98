//! # Anytime Search Drivers
//!
//! Restart-based anytime search over `SearchEngine`. Every restart receives
//! the time left in the budget and a g bound one below the incumbent, so
//! any solution it returns is strictly cheaper. `iterative_astar` prunes on
//! g + h only above the incumbent cost itself. The incumbent is replaced only
//! on strict improvement; ties and regressions are rejected.
//!
//! `iterative_astar` also anneals the heuristic weight geometrically
//! (`weight_decay`, never below `weight_floor`) from greedy towards A*.

use super::config::SolverConfig;
use super::engine::{CostBound, CycleCheck, SearchEngine, SearchResult, SearchStats, Strategy};
use super::node::{SearchNode, Solution};
use super::tt::HeuristicCache;
use crate::core::SokobanState;
use crate::heuristic::Heuristic;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// f = g + weight * h
pub fn fval_function(node: &SearchNode, weight: f64) -> f64 {
    node.gval as f64 + weight * node.hval
}

pub fn weighted_strategy(weight: f64) -> Strategy {
    Strategy::Custom(Box::new(move |node| fval_function(node, weight)))
}

/// 重み付き A* を 1 回だけ実行する
pub fn weighted_astar(
    initial: &SokobanState,
    heuristic: &mut dyn Heuristic,
    weight: f64,
    timebound: Duration,
) -> SearchResult {
    let mut engine = SearchEngine::from_config(weighted_strategy(weight), SolverConfig::get());
    engine.search(initial, heuristic, timebound, CostBound::unbounded())
}

pub fn iterative_astar(
    initial: &SokobanState,
    heuristic: &mut dyn Heuristic,
    weight: f64,
    timebound: Duration,
) -> AnytimeResult {
    AnytimeSearch::from_config(SolverConfig::get()).iterative_astar(
        initial, heuristic, weight, timebound,
    )
}

pub fn iterative_gbfs(
    initial: &SokobanState,
    heuristic: &mut dyn Heuristic,
    timebound: Duration,
) -> AnytimeResult {
    AnytimeSearch::from_config(SolverConfig::get()).iterative_gbfs(initial, heuristic, timebound)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Improvement {
    pub iteration: usize,
    pub gval: u32,
    /// GBFS では None
    pub weight: Option<f64>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct AnytimeResult {
    pub best: Option<Solution>,
    /// best を見つけた探索の統計
    pub stats: Option<SearchStats>,
    /// 採用した解のコスト履歴 (狭義単調減少)
    pub improvements: Vec<Improvement>,
    pub iterations: usize,
    pub total_expanded: usize,
}

impl AnytimeResult {
    pub fn best_cost(&self) -> Option<u32> {
        self.best.as_ref().map(|s| s.gval)
    }

    /// 現在の最良解より真に安い場合のみ採用する
    pub fn offer(
        &mut self,
        solution: Solution,
        stats: SearchStats,
        weight: Option<f64>,
        elapsed: Duration,
    ) -> bool {
        if let Some(best) = self.best_cost() {
            if solution.gval >= best {
                debug!("rejected solution of cost {} (best {})", solution.gval, best);
                return false;
            }
        }

        info!(
            "iteration {}: accepted solution of cost {}{}",
            self.iterations,
            solution.gval,
            weight.map(|w| format!(" (weight {:.3})", w)).unwrap_or_default()
        );
        self.improvements.push(Improvement {
            iteration: self.iterations,
            gval: solution.gval,
            weight,
            elapsed,
        });
        self.best = Some(solution);
        self.stats = Some(stats);
        true
    }

    /// 次の探索に渡す上限。0 コストの解はそれ以上良くならない。
    fn next_limit(&self) -> Option<Option<u32>> {
        match self.best_cost() {
            None => Some(None),
            Some(0) => None,
            Some(c) => Some(Some(c - 1)),
        }
    }
}

pub struct AnytimeSearch {
    pub weight_decay: f64,
    pub weight_floor: f64,
    pub cycle_check: CycleCheck,
    cache: Option<HeuristicCache>,
}

impl AnytimeSearch {
    pub fn new(weight_decay: f64, weight_floor: f64, cycle_check: CycleCheck) -> Self {
        Self {
            weight_decay,
            weight_floor,
            cycle_check,
            cache: None,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        let search = Self::new(
            config.search.weight_decay,
            config.search.weight_floor,
            config.search.cycle_check,
        );
        if config.cache.enabled {
            search.with_cache(HeuristicCache::new(
                config.cache.size_mb,
                config.cache.zobrist_seed,
            ))
        } else {
            search
        }
    }

    /// 再探索の間で共有するキャッシュ (同じヒューリスティックなので中身を使い回せる)
    pub fn with_cache(mut self, cache: HeuristicCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn run(
        &mut self,
        strategy: Strategy,
        initial: &SokobanState,
        heuristic: &mut dyn Heuristic,
        timebound: Duration,
        costbound: CostBound,
    ) -> SearchResult {
        let mut engine = SearchEngine::new(strategy, self.cycle_check);
        if let Some(cache) = self.cache.take() {
            engine = engine.with_cache(cache);
        }
        let result = engine.search(initial, heuristic, timebound, costbound);
        self.cache = engine.take_cache();
        result
    }

    pub fn iterative_astar(
        &mut self,
        initial: &SokobanState,
        heuristic: &mut dyn Heuristic,
        weight: f64,
        timebound: Duration,
    ) -> AnytimeResult {
        let start = Instant::now();
        let mut result = AnytimeResult::default();
        let mut weight = weight.max(self.weight_floor);

        while start.elapsed() < timebound {
            let Some(limit) = result.next_limit() else {
                break;
            };
            // f は現在の最良コストまで許す (h が過大評価でも安い解を刈らない)。
            // 解は g の上限で最良より真に安いものに限られる。
            let costbound = limit
                .map(|c| CostBound {
                    g: Some(c),
                    h: None,
                    f: Some(c as f64 + 1.0),
                })
                .unwrap_or_default();

            let remaining = timebound.saturating_sub(start.elapsed());
            let search = self.run(
                weighted_strategy(weight),
                initial,
                heuristic,
                remaining,
                costbound,
            );
            result.iterations += 1;
            result.total_expanded += search.stats.expanded;

            let Some(solution) = search.solution else {
                break;
            };
            if !result.offer(solution, search.stats, Some(weight), start.elapsed()) {
                break;
            }
            weight = (weight * self.weight_decay).max(self.weight_floor);
        }

        result
    }

    pub fn iterative_gbfs(
        &mut self,
        initial: &SokobanState,
        heuristic: &mut dyn Heuristic,
        timebound: Duration,
    ) -> AnytimeResult {
        let start = Instant::now();
        let mut result = AnytimeResult::default();

        while start.elapsed() < timebound {
            let Some(limit) = result.next_limit() else {
                break;
            };
            let costbound = limit.map(CostBound::with_g).unwrap_or_default();

            let remaining = timebound.saturating_sub(start.elapsed());
            let search = self.run(
                Strategy::BestFirst,
                initial,
                heuristic,
                remaining,
                costbound,
            );
            result.iterations += 1;
            result.total_expanded += search.stats.expanded;

            let Some(solution) = search.solution else {
                break;
            };
            if !result.offer(solution, search.stats, None, start.elapsed()) {
                break;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{setup_from_strings, Action, Direction};
    use crate::heuristic::{AlternateHeuristic, ManhattanHeuristic, ZeroHeuristic};
    use crate::logic::replay;
    use crate::search::engine::Termination;

    const BUDGET: Duration = Duration::from_secs(5);

    fn solution_of_cost(gval: u32) -> Solution {
        let state = setup_from_strings(&["-@$-."]).unwrap();
        Solution {
            path: vec![state],
            actions: vec![Action::new(0, Direction::Right); gval as usize],
            gval,
        }
    }

    fn searcher() -> AnytimeSearch {
        AnytimeSearch::new(0.6, 1.0, CycleCheck::Full)
    }

    #[test]
    fn test_fval_function() {
        let state = setup_from_strings(&["-@$-."]).unwrap();
        let mut node = SearchNode::root(state, 4.0);
        node.gval = 3;
        assert_eq!(fval_function(&node, 1.0), 7.0);
        assert_eq!(fval_function(&node, 2.5), 13.0);
        assert_eq!(weighted_strategy(0.0).name(), "custom");
    }

    #[test]
    fn test_offer_accepts_only_strict_improvements() {
        let mut result = AnytimeResult::default();
        let stats = SearchStats::default();
        assert!(result.offer(solution_of_cost(10), stats.clone(), None, Duration::ZERO));
        assert!(!result.offer(solution_of_cost(10), stats.clone(), None, Duration::ZERO));
        assert!(!result.offer(solution_of_cost(12), stats.clone(), None, Duration::ZERO));
        assert!(result.offer(solution_of_cost(7), stats.clone(), None, Duration::ZERO));
        assert!(result.offer(solution_of_cost(0), stats.clone(), None, Duration::ZERO));

        let costs: Vec<u32> = result.improvements.iter().map(|i| i.gval).collect();
        assert_eq!(costs, vec![10, 7, 0]);
        assert_eq!(result.best_cost(), Some(0));
        assert_eq!(result.next_limit(), None);
    }

    #[test]
    fn test_iterative_astar_reaches_optimum() {
        let state = setup_from_strings(&["------", "-@$-.-", "--$-.-", "------", "------"]).unwrap();
        let result = searcher().iterative_astar(&state, &mut ManhattanHeuristic, 10.0, BUDGET);

        let best = result.best.as_ref().expect("solvable");
        assert!(replay(&state, &best.actions).unwrap().is_goal());
        // 最後の反復は解無しで終わる
        assert_eq!(result.iterations, result.improvements.len() + 1);
        assert!(result
            .improvements
            .windows(2)
            .all(|w| w[1].gval < w[0].gval));

        // 一様コスト探索の最適値と一致する
        let mut engine = SearchEngine::new(Strategy::AStar, CycleCheck::Full);
        let optimal = engine
            .search(&state, &mut ZeroHeuristic, BUDGET, CostBound::unbounded())
            .solution
            .unwrap();
        assert_eq!(best.gval, optimal.gval);
    }

    #[test]
    fn test_weight_decays_to_floor() {
        let state = setup_from_strings(&["-------", "-#-$-.-", "-@-$-.-", "-#-----", "-------"]).unwrap();
        let result = searcher().iterative_astar(&state, &mut AlternateHeuristic::new(), 10.0, BUDGET);
        let weights: Vec<f64> = result.improvements.iter().filter_map(|i| i.weight).collect();
        assert_eq!(weights.first().copied(), Some(10.0));
        assert!(weights.windows(2).all(|w| w[1] < w[0] || w[1] == 1.0));
        assert!(weights.iter().all(|&w| w >= 1.0));
    }

    #[test]
    fn test_iterative_gbfs_improves_monotonically() {
        let state = setup_from_strings(&["@----", "-$--.", "-$--.", "@----"]).unwrap();
        let result = searcher().iterative_gbfs(&state, &mut AlternateHeuristic::new(), BUDGET);

        let best = result.best.as_ref().expect("solvable");
        assert!(replay(&state, &best.actions).unwrap().is_goal());
        assert!(result
            .improvements
            .windows(2)
            .all(|w| w[1].gval < w[0].gval));
        assert!(result.improvements.iter().all(|i| i.weight.is_none()));
        assert_eq!(result.best_cost(), result.improvements.last().map(|i| i.gval));
    }

    #[test]
    fn test_solved_start_stops_after_one_iteration() {
        let state = setup_from_strings(&["---", "-*-", "-@-"]).unwrap();
        let result = searcher().iterative_gbfs(&state, &mut ManhattanHeuristic, BUDGET);
        assert_eq!(result.best_cost(), Some(0));
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_unsolvable_returns_nothing() {
        let state = setup_from_strings(&["$---", "----", "-@.-", "----"]).unwrap();
        let result = searcher().iterative_astar(&state, &mut AlternateHeuristic::new(), 5.0, BUDGET);
        assert!(result.best.is_none());
        assert!(result.improvements.is_empty());
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_overestimating_heuristic_still_finds_cheaper_solution() {
        // alternate は障害物やロボットの距離を足すので過大評価する。
        // 14 手の解は途中で g + h = 15 の節点を通る。
        let state = setup_from_strings(&[".@--", "#-$-", "----", ".-$-", "----"]).unwrap();
        let result = searcher().iterative_astar(&state, &mut AlternateHeuristic::new(), 10.0, BUDGET);

        let best = result.best.as_ref().expect("solvable");
        assert!(replay(&state, &best.actions).unwrap().is_goal());
        assert!(best.gval <= 14);
        assert!(result
            .improvements
            .windows(2)
            .all(|w| w[1].gval < w[0].gval));

        // 最後の反復と同じ上限で、より安い解がもう残っていない
        let mut engine = SearchEngine::new(Strategy::AStar, CycleCheck::Full);
        let check = engine.search(
            &state,
            &mut AlternateHeuristic::new(),
            BUDGET,
            CostBound {
                g: Some(best.gval - 1),
                h: None,
                f: Some(best.gval as f64),
            },
        );
        assert!(check.solution.is_none());
        assert_eq!(check.stats.termination, Termination::Exhausted);
    }

    #[test]
    fn test_zero_budget_runs_nothing() {
        let state = setup_from_strings(&["-@$-."]).unwrap();
        let result = searcher().iterative_gbfs(&state, &mut ManhattanHeuristic, Duration::ZERO);
        assert!(result.best.is_none());
        assert_eq!(result.iterations, 0);
    }
}
