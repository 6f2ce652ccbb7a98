//! Prints one JSON line describing a puzzle
//!
//! Used by analysis scripts to compare heuristic estimates across problems.

use sokoban_aho_ai::core::{resolve_problem, PROBLEMS};
use sokoban_aho_ai::heuristic::{detect_deadlock, Heuristic, HeuristicKind};
use std::collections::BTreeMap;
use std::env;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: dump_problem <problem|puzzle_file>");
        eprintln!(
            "Built-in problems: {}",
            PROBLEMS.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
        );
        std::process::exit(1);
    }

    let (name, state) = resolve_problem(&args[1])?;

    // JSON は inf を表せないので null になる
    let estimates: BTreeMap<&str, Option<f64>> = HeuristicKind::ALL
        .iter()
        .map(|kind| {
            let h = kind.build().estimate(&state);
            (kind.name(), h.is_finite().then_some(h))
        })
        .collect();

    let output = serde_json::json!({
        "name": name,
        "layout": &*state.layout,
        "robots": &state.robots,
        "boxes": &state.boxes,
        "is_goal": state.is_goal(),
        "estimates": estimates,
        "deadlock": detect_deadlock(&state).map(|r| r.to_string()),
    });

    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
