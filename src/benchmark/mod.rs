//! # Benchmark
//!
//! Solves a batch of puzzles with one algorithm/heuristic pair and collects
//! per-problem results. Problems are independent, so with `parallel` each one
//! runs on its own rayon worker with its own heuristic instance.

use crate::core::Problem;
use crate::heuristic::HeuristicKind;
use crate::search::Algorithm;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const REPORT_DIR: &str = "benchmark_reports";

#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub algorithm: Algorithm,
    pub heuristic: HeuristicKind,
    pub weight: f64,
    /// 1 問あたりの制限時間
    pub timebound: Duration,
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemResult {
    pub name: String,
    pub solved: bool,
    pub cost: Option<u32>,
    pub improvements: usize,
    pub expanded: usize,
    pub time_ms: u128,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkStats {
    pub total_problems: usize,
    pub solved: usize,
    /// 解けた問題のみの平均
    pub avg_cost: f64,
    pub avg_expanded: f64,
    pub avg_time_ms: f64,
    pub algorithm: String,
    pub heuristic: String,
    pub results: Vec<ProblemResult>,
}

impl BenchmarkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: ProblemResult) {
        self.total_problems += 1;
        if result.solved {
            self.solved += 1;
        }
        self.results.push(result);
        self.recalculate_averages();
    }

    fn recalculate_averages(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let n = self.results.len() as f64;
        let total_expanded: usize = self.results.iter().map(|r| r.expanded).sum();
        let total_time: u128 = self.results.iter().map(|r| r.time_ms).sum();
        self.avg_expanded = total_expanded as f64 / n;
        self.avg_time_ms = total_time as f64 / n;

        let costs: Vec<u32> = self.results.iter().filter_map(|r| r.cost).collect();
        self.avg_cost = if costs.is_empty() {
            0.0
        } else {
            costs.iter().map(|&c| c as f64).sum::<f64>() / costs.len() as f64
        };
    }
}

fn solve_one(problem: &Problem, config: &BenchmarkConfig) -> anyhow::Result<ProblemResult> {
    let state = problem.state()?;
    let mut heuristic = config.heuristic.build();

    let start = Instant::now();
    let outcome = config
        .algorithm
        .run(&state, heuristic.as_mut(), config.weight, config.timebound);
    let elapsed = start.elapsed();

    info!(
        "{}: {} ({} expanded, {:.2}s)",
        problem.name,
        outcome
            .best_cost()
            .map(|c| format!("cost {}", c))
            .unwrap_or_else(|| "unsolved".to_string()),
        outcome.total_expanded,
        elapsed.as_secs_f64()
    );

    Ok(ProblemResult {
        name: problem.name.to_string(),
        solved: outcome.best.is_some(),
        cost: outcome.best_cost(),
        improvements: outcome.improvements.len(),
        expanded: outcome.total_expanded,
        time_ms: elapsed.as_millis(),
    })
}

pub fn run_benchmark(
    config: &BenchmarkConfig,
    problems: &[Problem],
) -> anyhow::Result<BenchmarkStats> {
    let mut stats = BenchmarkStats::new();
    stats.algorithm = config.algorithm.to_string();
    stats.heuristic = config.heuristic.to_string();

    let results: Vec<ProblemResult> = if config.parallel {
        problems
            .par_iter()
            .map(|p| solve_one(p, config))
            .collect::<anyhow::Result<_>>()?
    } else {
        problems
            .iter()
            .map(|p| solve_one(p, config))
            .collect::<anyhow::Result<_>>()?
    };

    // 並列でも入力順に集計する
    for result in results {
        stats.add_result(result);
    }
    Ok(stats)
}

pub fn save_report(stats: &BenchmarkStats) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(REPORT_DIR)?;

    let path = PathBuf::from(format!(
        "{}/bench_{}_{}_{}.json",
        REPORT_DIR,
        stats.algorithm,
        stats.heuristic,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = std::fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, stats)?;
    Ok(path)
}
