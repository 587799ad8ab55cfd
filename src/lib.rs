//! Fanorona AI Engine
//!
//! A rules engine and AI for Fanorona, the Madagascan capture game:
//! - 5x9 board of 45 nodes, diagonals only through strong nodes
//! - Capture by approach (percussion) or withdrawal (aspiration)
//! - Mandatory capture, with optional multi-step capture chains
//! - A side with no pieces or no legal move loses
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Board, topology, moves and lightweight snapshots
//! - [`rules`]: Capture detection, move generation, chains, game over
//! - [`eval`]: Static position evaluation
//! - [`search`]: Zobrist hashing, transposition table, minimax, MCTS, Markov
//! - [`engine`]: AI engine selecting a strategy per side
//! - [`game`]: Turn driver owning the live board
//!
//! # Quick Start
//!
//! ```
//! use fanorona::{AiEngine, Difficulty, Game, Player, StrategyKind};
//!
//! let mut game = Game::new();
//! let mut engine = AiEngine::new(StrategyKind::Minimax, Difficulty::Easy, Player::White);
//!
//! let mv = engine.find_best_move(game.board());
//! assert!(mv.is_capture());
//! game.play_move(&mv).unwrap();
//!
//! // Keep capturing while the chain allows it
//! while let Some(next) = engine.find_chain_continuation(game.board(), game.chain()) {
//!     game.play_move(&next).unwrap();
//! }
//! if game.chain().is_active() {
//!     game.stop_chain();
//! }
//! assert_eq!(game.to_move(), Player::Black);
//! ```
//!
//! # Strategies
//!
//! 1. Alpha-beta minimax with a transposition table (depth 2/4/6)
//! 2. Monte Carlo Tree Search with UCB1 and random playouts
//! 3. Markov-chain predictor learned from finished games
//! 4. Hybrid: Markov while the board is crowded, minimax in the endgame

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod game;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, CaptureKind, Direction, Move, Player, Pos};
pub use engine::{AiEngine, Difficulty, EngineConfig, MoveResult, SearchType, StrategyKind};
pub use error::{ModelError, MoveError, TableError};
pub use game::Game;
pub use rules::{CaptureChain, GameOutcome};
