use clap::{Parser, Subcommand};
use log::{debug, info};
use sokoban_aho_ai::benchmark::{run_benchmark, save_report, BenchmarkConfig};
use sokoban_aho_ai::core::{resolve_problem, PROBLEMS};
use sokoban_aho_ai::display::{print_solution, print_state};
use sokoban_aho_ai::heuristic::{detect_deadlock, Heuristic, HeuristicKind};
use sokoban_aho_ai::search::{Algorithm, SolverConfig};
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(version, about = "Sokoban solver with deadlock-aware heuristics and anytime search.")]
struct Cli {
    #[arg(short, long, global = true, help = "Shows search progress (debug log).")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solves one problem (built-in index/name or puzzle file).
    Solve {
        problem: String,

        #[arg(short, long, default_value = "iterative_astar")]
        algorithm: Algorithm,

        #[arg(long, default_value = "alternate")]
        heuristic: HeuristicKind,

        #[arg(short, long, help = "Initial weight (defaults to solver_config.json).")]
        weight: Option<f64>,

        #[arg(short, long, help = "Time limit in seconds (defaults to solver_config.json).")]
        timebound: Option<f64>,

        #[arg(long, help = "Prints every step of the solution.")]
        show: bool,
    },
    /// Solves every built-in problem.
    Bench {
        #[arg(short, long, default_value = "iterative_astar")]
        algorithm: Algorithm,

        #[arg(long, default_value = "alternate")]
        heuristic: HeuristicKind,

        #[arg(short, long)]
        timebound: Option<f64>,

        #[arg(long, help = "Solves problems on all cores.")]
        parallel: bool,

        #[arg(long, help = "Writes a JSON report to benchmark_reports/.")]
        save: bool,
    },
    /// Prints a problem.
    Show { problem: String },
    /// Lists the built-in problems.
    List,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = SolverConfig::get();
    debug!("config: {:?}", config);

    match cli.command {
        Command::Solve {
            problem,
            algorithm,
            heuristic,
            weight,
            timebound,
            show,
        } => {
            let (name, state) = resolve_problem(&problem)?;
            let weight = weight.unwrap_or(config.search.initial_weight);
            let timebound = timebound
                .map(|s| Duration::from_secs_f64(s.max(0.0)))
                .unwrap_or_else(|| config.search.timebound());

            info!(
                "solving {} with {} / {} (weight {}, {:.1}s)",
                name,
                algorithm,
                heuristic,
                weight,
                timebound.as_secs_f64()
            );
            print_state(&state);

            let mut h = heuristic.build();
            let start = Instant::now();
            let result = algorithm.run(&state, h.as_mut(), weight, timebound);
            let elapsed = start.elapsed();

            for improvement in &result.improvements {
                println!(
                    "  iteration {:>3}: cost {:>4} at {:.3}s",
                    improvement.iteration,
                    improvement.gval,
                    improvement.elapsed.as_secs_f64()
                );
            }

            match &result.best {
                Some(solution) => {
                    println!(
                        "Solved {} in {} moves ({} iterations, {} expanded, {:.2}s)",
                        name,
                        solution.gval,
                        result.iterations,
                        result.total_expanded,
                        elapsed.as_secs_f64()
                    );
                    if let Some(stats) = &result.stats {
                        debug!("stats of best search: {:?}", stats);
                    }
                    if show {
                        print_solution(solution);
                    } else {
                        let moves: Vec<String> =
                            solution.actions.iter().map(|a| a.to_string()).collect();
                        println!("{}", moves.join(", "));
                    }
                }
                None => {
                    println!(
                        "No solution for {} ({} expanded, {:.2}s)",
                        name,
                        result.total_expanded,
                        elapsed.as_secs_f64()
                    );
                }
            }
        }
        Command::Bench {
            algorithm,
            heuristic,
            timebound,
            parallel,
            save,
        } => {
            let bench = BenchmarkConfig {
                algorithm,
                heuristic,
                weight: config.search.initial_weight,
                timebound: timebound
                    .map(|s| Duration::from_secs_f64(s.max(0.0)))
                    .unwrap_or_else(|| config.search.timebound()),
                parallel,
            };
            let stats = run_benchmark(&bench, PROBLEMS)?;

            println!("=== Benchmark: {} / {} ===", stats.algorithm, stats.heuristic);
            for r in &stats.results {
                println!(
                    "{:<12} {:>8} {:>10} expanded {:>8}ms",
                    r.name,
                    r.cost.map_or("-".to_string(), |c| c.to_string()),
                    r.expanded,
                    r.time_ms
                );
            }
            println!(
                "Solved {}/{} (avg cost {:.1}, avg expanded {:.1}, avg time {:.1}ms)",
                stats.solved,
                stats.total_problems,
                stats.avg_cost,
                stats.avg_expanded,
                stats.avg_time_ms
            );

            if save {
                let path = save_report(&stats)?;
                println!("Report saved to {}", path.display());
            }
        }
        Command::Show { problem } => {
            let (name, state) = resolve_problem(&problem)?;
            println!("{} ({}x{})", name, state.width(), state.height());
            print_state(&state);
            for kind in HeuristicKind::ALL {
                println!("  h_{:<10} {}", kind.name(), kind.build().estimate(&state));
            }
            if let Some(reason) = detect_deadlock(&state) {
                println!("  deadlock: {}", reason);
            }
        }
        Command::List => {
            for (i, p) in PROBLEMS.iter().enumerate() {
                println!("{:>2}. {}", i, p.name);
            }
        }
    }

    Ok(())
}

fn init_logger(verbose: bool) {
    use simplelog::*;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // 二重初期化は無視する
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}
