pub mod benchmark;
pub mod core;
pub mod display;
pub mod error;
pub mod heuristic;
pub mod logic;
pub mod search;
