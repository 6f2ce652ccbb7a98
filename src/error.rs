use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("The puzzle has no rows.")]
    EmptyPuzzle,
    #[error("Row {row} has width {found}, expected {expected}.")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown tile {tile:?} at row {row}, column {col}.")]
    UnknownTile { tile: char, row: usize, col: usize },
    #[error("The puzzle has no robot.")]
    NoRobot,
    #[error("Unknown problem: {0}")]
    UnknownProblem(String),
    #[error("Unknown algorithm: {0} (expected weighted-astar, iterative-astar or iterative-gbfs)")]
    UnknownAlgorithm(String),
    #[error("Unknown heuristic: {0} (expected zero, manhattan or alternate)")]
    UnknownHeuristic(String),
    #[error("Could not read file")]
    Io(#[from] std::io::Error),
    #[error("Malformed JSON")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;
