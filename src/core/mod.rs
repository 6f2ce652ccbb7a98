pub mod board;
pub mod setup;
pub mod types;

pub use board::{Layout, SokobanState, StateKey};
pub use setup::{
    find_problem, load_puzzle_file, parse_puzzle, resolve_problem, setup_from_strings, Problem,
    PROBLEMS,
};
pub use types::{Action, Direction, Position};
