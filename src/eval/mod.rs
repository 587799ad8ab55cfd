//! Position evaluation

pub mod heuristic;

pub use heuristic::{evaluate, evaluate_position, outcome_score, WIN_SCORE};
