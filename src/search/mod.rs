//! Search module for Fanorona AI
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Alpha-Beta minimax
//! - Monte Carlo Tree Search
//! - Markov-chain move predictor

pub mod markov;
pub mod mcts;
pub mod minimax;
pub mod tt;
pub mod zobrist;

pub use markov::{GamePhase, MarkovModel, MarkovTransition, PositionPattern, MODEL_VERSION};
pub use mcts::{MctsConfig, MctsResult, MctsSearcher};
pub use minimax::{SearchResult, SearchStats, Searcher};
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use zobrist::ZobristKeys;
