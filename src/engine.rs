//! Main AI Engine integrating all search components
//!
//! The engine owns one search strategy, chosen at construction:
//!
//! 1. **Minimax**: alpha-beta with a transposition table, depth by difficulty
//! 2. **MCTS**: Monte Carlo Tree Search, iterations by difficulty
//! 3. **Markov**: learned move predictor, no search
//! 4. **Hybrid**: Markov while the board is crowded, minimax once material
//!    drops below the hybrid threshold
//!
//! Every strategy sees the same candidate list, produced by the rules
//! module, so a strategy can only ever pick a legal move.
//!
//! # Example
//!
//! ```
//! use fanorona::board::{Board, Player};
//! use fanorona::engine::{AiEngine, Difficulty, StrategyKind};
//!
//! let mut engine = AiEngine::new(StrategyKind::Minimax, Difficulty::Easy, Player::White);
//! let board = Board::standard();
//!
//! let result = engine.find_best_move_with_stats(&board);
//! println!("Best move: {:?}", result.best_move);
//! println!("Search type: {:?}", result.search_type);
//! println!("Time: {}ms", result.time_ms);
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::board::{Board, Move, Occupancy, Player};
use crate::error::ModelError;
use crate::rules::{generate_moves, CaptureChain};
use crate::search::{
    MarkovModel, MctsConfig, MctsSearcher, SearchStats, Searcher, TTStats, ZobristKeys,
};

/// Which search strategy an engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Minimax,
    Mcts,
    Markov,
    Hybrid,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Minimax => "minimax",
            StrategyKind::Mcts => "mcts",
            StrategyKind::Markov => "markov",
            StrategyKind::Hybrid => "hybrid",
        })
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimax" | "alphabeta" => Ok(StrategyKind::Minimax),
            "mcts" => Ok(StrategyKind::Mcts),
            "markov" => Ok(StrategyKind::Markov),
            "hybrid" => Ok(StrategyKind::Hybrid),
            other => Err(format!(
                "unknown strategy '{other}' (expected minimax, mcts, markov or hybrid)"
            )),
        }
    }
}

/// Playing strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Minimax depth: 2, 4 or 6 plies.
    #[must_use]
    pub fn minimax_depth(self) -> i8 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 4,
            Difficulty::Hard => 6,
        }
    }

    /// MCTS iterations per move.
    #[must_use]
    pub fn mcts_iterations(self) -> u32 {
        match self {
            Difficulty::Easy => 250,
            Difficulty::Medium => 1000,
            Difficulty::Hard => 3000,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        })
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!(
                "unknown difficulty '{other}' (expected easy, medium or hard)"
            )),
        }
    }
}

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Transposition table size in megabytes
    pub tt_size_mb: usize,
    /// Minimax search depth
    pub minimax_depth: i8,
    /// MCTS iterations per move
    pub mcts_iterations: u32,
    /// Maximum plies per MCTS playout
    pub mcts_rollout_depth: u32,
    /// UCB1 exploration constant
    pub mcts_exploration: f64,
    /// Seed for Zobrist keys and the MCTS RNG
    pub seed: u64,
    /// Cooperative per-move time limit
    pub time_limit: Option<Duration>,
    /// Hybrid switches from Markov to minimax below this many pieces
    pub hybrid_threshold: u32,
    /// Markov model hash buckets
    pub markov_buckets: usize,
}

impl EngineConfig {
    /// Defaults with depth and iterations taken from `difficulty`.
    #[must_use]
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self {
            tt_size_mb: 16,
            minimax_depth: difficulty.minimax_depth(),
            mcts_iterations: difficulty.mcts_iterations(),
            mcts_rollout_depth: 50,
            mcts_exploration: std::f64::consts::SQRT_2,
            seed: crate::search::zobrist::DEFAULT_SEED,
            time_limit: None,
            hybrid_threshold: 15,
            markov_buckets: 1024,
        }
    }

    fn mcts(&self) -> MctsConfig {
        MctsConfig {
            iterations: self.mcts_iterations,
            rollout_depth: self.mcts_rollout_depth,
            exploration: self.mcts_exploration,
            seed: self.seed,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Medium)
    }
}

/// Strategy that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Minimax,
    Mcts,
    Markov,
    /// No candidate moves
    NoMove,
}

/// Result of a move search with detailed statistics.
#[derive(Debug, Clone)]
pub struct MoveResult {
    /// Best move found, `None` when there are no legal moves
    pub best_move: Option<Move>,
    /// Minimax score, MCTS win rate or Markov score, depending on strategy
    pub score: f64,
    /// Strategy that chose the move
    pub search_type: SearchType,
    /// Time taken in milliseconds
    pub time_ms: u64,
    /// Nodes searched (minimax) or iterations run (MCTS)
    pub nodes: u64,
    /// The post-search validation replaced the chosen move
    pub fell_back: bool,
}

impl MoveResult {
    #[inline]
    fn no_move(time_ms: u64) -> Self {
        Self {
            best_move: None,
            score: 0.0,
            search_type: SearchType::NoMove,
            time_ms,
            nodes: 0,
            fell_back: false,
        }
    }
}

enum Strategy {
    Minimax(Searcher),
    Mcts(MctsSearcher),
    Markov(MarkovModel),
    Hybrid {
        book: MarkovModel,
        endgame: Searcher,
    },
}

/// Main AI engine for one side.
///
/// # Example
///
/// ```
/// use fanorona::board::{Board, Player};
/// use fanorona::engine::{AiEngine, Difficulty, StrategyKind};
///
/// let mut engine = AiEngine::new(StrategyKind::Mcts, Difficulty::Easy, Player::Black);
/// let mut board = Board::standard();
///
/// let mv = engine.find_best_move(&board);
/// assert!(mv.is_valid());
/// board.apply_move(&mv);
/// ```
pub struct AiEngine {
    player: Player,
    kind: StrategyKind,
    config: EngineConfig,
    strategy: Strategy,
}

impl AiEngine {
    /// Create an engine with defaults for `difficulty`.
    #[must_use]
    pub fn new(kind: StrategyKind, difficulty: Difficulty, player: Player) -> Self {
        Self::with_config(kind, player, EngineConfig::for_difficulty(difficulty))
    }

    /// Create an engine with explicit configuration.
    #[must_use]
    pub fn with_config(kind: StrategyKind, player: Player, config: EngineConfig) -> Self {
        let keys = ZobristKeys::new(config.seed);
        let strategy = match kind {
            StrategyKind::Minimax => Strategy::Minimax(Searcher::new(config.tt_size_mb, keys)),
            StrategyKind::Mcts => Strategy::Mcts(MctsSearcher::new(config.mcts(), keys)),
            StrategyKind::Markov => Strategy::Markov(MarkovModel::new(config.markov_buckets, keys)),
            StrategyKind::Hybrid => Strategy::Hybrid {
                book: MarkovModel::new(config.markov_buckets, keys.clone()),
                endgame: Searcher::new(config.tt_size_mb, keys),
            },
        };
        Self {
            player,
            kind,
            config,
            strategy,
        }
    }

    #[inline]
    pub fn player(&self) -> Player {
        self.player
    }

    #[inline]
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Best move for this engine's side, or [`Move::invalid`] when there is
    /// none.
    #[must_use]
    pub fn find_best_move(&mut self, board: &Board) -> Move {
        self.find_best_move_with_stats(board)
            .best_move
            .unwrap_or_else(Move::invalid)
    }

    /// Best move with search statistics.
    #[must_use]
    pub fn find_best_move_with_stats(&mut self, board: &Board) -> MoveResult {
        let candidates = generate_moves(board, self.player);
        self.choose(board, &candidates, &CaptureChain::new())
    }

    /// Pick how to extend an active capture chain. `None` when the chain is
    /// inactive or cannot continue, which ends the turn.
    #[must_use]
    pub fn find_chain_continuation(&mut self, board: &Board, chain: &CaptureChain) -> Option<Move> {
        let candidates = chain.continuations(board);
        if candidates.is_empty() {
            return None;
        }
        self.choose(board, &candidates, chain).best_move
    }

    fn choose(&mut self, board: &Board, candidates: &[Move], chain: &CaptureChain) -> MoveResult {
        let start = Instant::now();
        if candidates.is_empty() {
            log::debug!("{} ({}) has no legal move", self.player, self.kind);
            return MoveResult::no_move(0);
        }

        let player = self.player;
        let depth = self.config.minimax_depth;
        let time_limit = self.config.time_limit;
        let crowded = board.total_pieces() >= self.config.hybrid_threshold;

        let mut result = match &mut self.strategy {
            Strategy::Minimax(searcher) => minimax_result(
                searcher.search_candidates(board, player, depth, candidates, chain, time_limit),
            ),
            Strategy::Hybrid { endgame, .. } if !crowded => minimax_result(
                endgame.search_candidates(board, player, depth, candidates, chain, time_limit),
            ),
            Strategy::Mcts(mcts) => {
                let found = mcts.search_candidates(board, player, candidates, time_limit);
                MoveResult {
                    best_move: found.best_move,
                    score: found.win_rate,
                    search_type: SearchType::Mcts,
                    time_ms: 0,
                    nodes: u64::from(found.iterations),
                    fell_back: false,
                }
            }
            Strategy::Markov(model) | Strategy::Hybrid { book: model, .. } => {
                let (best_move, score) = match model.best_of(board, player, candidates) {
                    Some((mv, score)) => (Some(mv), score),
                    None => (None, 0.0),
                };
                MoveResult {
                    best_move,
                    score,
                    search_type: SearchType::Markov,
                    time_ms: 0,
                    nodes: candidates.len() as u64,
                    fell_back: false,
                }
            }
        };
        result.time_ms = start.elapsed().as_millis() as u64;

        if let Some(mv) = &result.best_move {
            log::debug!(
                "{} ({:?}) plays {mv} score {:.3} in {}ms",
                self.player,
                result.search_type,
                result.score,
                result.time_ms
            );
        }
        result
    }

    /// Feed a finished game to the Markov model, if this engine has one.
    /// Returns the number of moves learned.
    pub fn learn_from_game(&mut self, moves: &[Move], winner: Option<Player>) -> usize {
        match self.markov_model_mut() {
            Some(model) => model.learn_from_game(moves, winner),
            None => 0,
        }
    }

    /// The engine's Markov model (Markov and Hybrid strategies).
    pub fn markov_model(&self) -> Option<&MarkovModel> {
        match &self.strategy {
            Strategy::Markov(model) | Strategy::Hybrid { book: model, .. } => Some(model),
            _ => None,
        }
    }

    fn markov_model_mut(&mut self) -> Option<&mut MarkovModel> {
        match &mut self.strategy {
            Strategy::Markov(model) | Strategy::Hybrid { book: model, .. } => Some(model),
            _ => None,
        }
    }

    /// Save the Markov model to `path`.
    pub fn save_model(&self, path: &Path) -> Result<(), ModelError> {
        self.markov_model().ok_or(ModelError::NoModel)?.save(path)
    }

    /// Replace the Markov model with the one stored at `path`.
    pub fn load_model(&mut self, path: &Path) -> Result<(), ModelError> {
        let slot = self.markov_model_mut().ok_or(ModelError::NoModel)?;
        *slot = MarkovModel::load(path)?;
        Ok(())
    }

    /// Clear the transposition table cache.
    ///
    /// Call this when starting a new game to avoid stale positions.
    pub fn clear_cache(&mut self) {
        if let Some(searcher) = self.searcher_mut() {
            searcher.clear_tt();
        }
    }

    /// Get transposition table statistics (zero for strategies without one).
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.searcher().map(Searcher::tt_stats).unwrap_or_default()
    }

    /// Cumulative minimax statistics, if this engine runs minimax.
    pub fn search_stats(&self) -> Option<&SearchStats> {
        self.searcher().map(Searcher::stats)
    }

    fn searcher(&self) -> Option<&Searcher> {
        match &self.strategy {
            Strategy::Minimax(searcher) | Strategy::Hybrid { endgame: searcher, .. } => {
                Some(searcher)
            }
            _ => None,
        }
    }

    fn searcher_mut(&mut self) -> Option<&mut Searcher> {
        match &mut self.strategy {
            Strategy::Minimax(searcher) | Strategy::Hybrid { endgame: searcher, .. } => {
                Some(searcher)
            }
            _ => None,
        }
    }
}

fn minimax_result(result: crate::search::SearchResult) -> MoveResult {
    MoveResult {
        best_move: result.best_move,
        score: f64::from(result.score),
        search_type: SearchType::Minimax,
        time_ms: 0,
        nodes: result.nodes,
        fell_back: result.fell_back,
    }
}
