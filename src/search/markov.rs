//! Markov-chain move predictor
//!
//! A learned table of `position pattern -> move -> frequency`, built by
//! replaying finished games. Choosing a move is a single pass over the
//! legal moves: each scores its observed probability (or a fixed
//! exploration score when never seen) plus a bonus for capturing.
//!
//! Models persist with bincode inside a versioned envelope that also
//! records the Zobrist seed the pattern hashes were computed with.
//!
//! # Example
//!
//! ```
//! use fanorona::board::{Board, Player};
//! use fanorona::rules::generate_moves;
//! use fanorona::search::{MarkovModel, ZobristKeys};
//!
//! let mut model = MarkovModel::new(64, ZobristKeys::default());
//! let board = Board::standard();
//! let opening = generate_moves(&board, Player::White)[0].clone();
//!
//! model.learn_from_game(&[opening.clone()], Some(Player::White));
//!
//! let pattern = model.pattern(&board, Player::White);
//! assert!(model.get_move_probability(&pattern, &opening) > 0.0);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Move, Occupancy, Player, Pos};
use crate::error::ModelError;
use crate::rules::{detect_capture, generate_moves};

use super::ZobristKeys;

/// Persisted model format version
pub const MODEL_VERSION: u32 = 1;

/// Score of a move never observed in this pattern
pub const EXPLORATION_SCORE: f64 = 0.2;

/// Added to the score of capturing moves
pub const CAPTURE_BONUS: f64 = 0.3;

/// Coarse game stage by material on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// 30 or more pieces
    Opening,
    /// 15 to 29 pieces
    Midgame,
    /// Fewer than 15 pieces
    Endgame,
}

impl GamePhase {
    pub fn from_total(total: u32) -> Self {
        match total {
            30.. => GamePhase::Opening,
            15..=29 => GamePhase::Midgame,
            _ => GamePhase::Endgame,
        }
    }
}

/// Summary of a position the model keys transitions on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionPattern {
    /// Occupancy hash with side to move folded in
    pub hash: u64,
    pub phase: GamePhase,
    pub white: u32,
    pub black: u32,
    pub to_move: Player,
    /// The move that led here captured
    pub last_capture: bool,
}

impl PositionPattern {
    pub fn from_board<B: Occupancy + ?Sized>(
        board: &B,
        to_move: Player,
        keys: &ZobristKeys,
    ) -> Self {
        Self {
            hash: keys.hash_with_side(board, to_move),
            phase: GamePhase::from_total(board.total_pieces()),
            white: board.piece_count(Player::White),
            black: board.piece_count(Player::Black),
            to_move,
            last_capture: board.last_move_captured(),
        }
    }
}

/// One observed `pattern --move--> pattern` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkovTransition {
    pub from: PositionPattern,
    pub from_pos: Pos,
    pub to_pos: Pos,
    pub to: PositionPattern,
    /// Times observed
    pub frequency: u32,
    /// Times the mover went on to win
    pub wins: u32,
    /// `frequency / games_seen`, capped at 1
    pub probability: f64,
}

impl MarkovTransition {
    #[inline]
    fn matches(&self, pattern: &PositionPattern, from: Pos, to: Pos) -> bool {
        self.from_pos == from && self.to_pos == to && self.from == *pattern
    }
}

#[derive(Serialize, Deserialize)]
struct ModelFile {
    version: u32,
    key_seed: u64,
    games_seen: u32,
    buckets: Vec<Vec<MarkovTransition>>,
}

/// Learned move predictor.
#[derive(Debug, Clone)]
pub struct MarkovModel {
    buckets: Vec<Vec<MarkovTransition>>,
    keys: ZobristKeys,
    games_seen: u32,
    learning: bool,
}

impl MarkovModel {
    /// Empty model with `buckets` hash buckets (at least one).
    #[must_use]
    pub fn new(buckets: usize, keys: ZobristKeys) -> Self {
        Self {
            buckets: vec![Vec::new(); buckets.max(1)],
            keys,
            games_seen: 0,
            learning: true,
        }
    }

    #[inline]
    pub fn games_seen(&self) -> u32 {
        self.games_seen
    }

    /// Distinct transitions stored.
    pub fn transition_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    #[inline]
    pub fn is_learning(&self) -> bool {
        self.learning
    }

    /// Freeze or unfreeze the model; a frozen model ignores finished games.
    pub fn set_learning(&mut self, learning: bool) {
        self.learning = learning;
    }

    #[inline]
    pub fn keys(&self) -> &ZobristKeys {
        &self.keys
    }

    /// Pattern of `board` with `to_move` to play.
    pub fn pattern<B: Occupancy + ?Sized>(&self, board: &B, to_move: Player) -> PositionPattern {
        PositionPattern::from_board(board, to_move, &self.keys)
    }

    #[inline]
    fn bucket(&self, pattern: &PositionPattern) -> usize {
        (pattern.hash % self.buckets.len() as u64) as usize
    }

    /// Count one more observation of `mv` from `from` to `to`.
    pub fn record_transition(
        &mut self,
        from: PositionPattern,
        mv: &Move,
        to: PositionPattern,
        mover_won: bool,
    ) {
        let idx = self.bucket(&from);
        let bucket = &mut self.buckets[idx];
        match bucket.iter_mut().find(|t| t.matches(&from, mv.from, mv.to)) {
            Some(t) => {
                t.frequency += 1;
                if mover_won {
                    t.wins += 1;
                }
            }
            None => bucket.push(MarkovTransition {
                from,
                from_pos: mv.from,
                to_pos: mv.to,
                to,
                frequency: 1,
                wins: u32::from(mover_won),
                probability: 0.0,
            }),
        }
    }

    fn recompute_probabilities(&mut self) {
        let games = f64::from(self.games_seen.max(1));
        for t in self.buckets.iter_mut().flatten() {
            t.probability = (f64::from(t.frequency) / games).min(1.0);
        }
    }

    /// Replay a finished game from the standard opening and record every
    /// move. The mover of each move is whoever owns its origin, so capture
    /// chains replay naturally. Replay stops at the first move that is not
    /// a step of a live piece. Returns the number of moves recorded.
    pub fn learn_from_game(&mut self, moves: &[Move], winner: Option<Player>) -> usize {
        if !self.learning {
            return 0;
        }
        self.games_seen += 1;

        let mut board = Board::standard();
        let mut recorded = 0;
        for mv in moves {
            let Some(mover) = board.get(mv.from) else {
                log::warn!("markov: replay stopped at move {recorded}: no piece on {}", mv.from);
                break;
            };
            let Some(replayed) = detect_capture(&board, mv.from, mv.to) else {
                log::warn!("markov: replay stopped at move {recorded}: {mv} is not a step");
                break;
            };
            let before = self.pattern(&board, mover);
            board.apply_move(&replayed);
            let after = self.pattern(&board, mover.opponent());
            self.record_transition(before, &replayed, after, winner == Some(mover));
            recorded += 1;
        }

        self.recompute_probabilities();
        log::info!(
            "markov: learned {recorded} moves (games seen {}, transitions {})",
            self.games_seen,
            self.transition_count()
        );
        recorded
    }

    /// Learned probability of playing `mv` in `pattern`; 0 when never seen.
    pub fn get_move_probability(&self, pattern: &PositionPattern, mv: &Move) -> f64 {
        self.buckets[self.bucket(pattern)]
            .iter()
            .find(|t| t.matches(pattern, mv.from, mv.to))
            .map_or(0.0, |t| t.probability)
    }

    /// Selection score of `mv` in `pattern`.
    pub fn move_score(&self, pattern: &PositionPattern, mv: &Move) -> f64 {
        let learned = self.get_move_probability(pattern, mv);
        let base = if learned > 0.0 { learned } else { EXPLORATION_SCORE };
        if mv.is_capture() {
            base + CAPTURE_BONUS
        } else {
            base
        }
    }

    /// Highest scoring candidate, the first one on ties.
    pub fn best_of<B: Occupancy + ?Sized>(
        &self,
        board: &B,
        player: Player,
        candidates: &[Move],
    ) -> Option<(Move, f64)> {
        let pattern = self.pattern(board, player);
        let mut best: Option<(&Move, f64)> = None;
        for mv in candidates {
            let score = self.move_score(&pattern, mv);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((mv, score));
            }
        }
        best.map(|(mv, score)| (mv.clone(), score))
    }

    /// Best legal move of `player` with its score.
    pub fn find_best_move<B: Occupancy + ?Sized>(
        &self,
        board: &B,
        player: Player,
    ) -> Option<(Move, f64)> {
        let candidates = generate_moves(board, player);
        self.best_of(board, player, &candidates)
    }

    /// Write the model to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let file = ModelFile {
            version: MODEL_VERSION,
            key_seed: self.keys.seed(),
            games_seen: self.games_seen,
            buckets: self.buckets.clone(),
        };
        let bytes = bincode::serialize(&file)?;
        fs::write(path, bytes).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "markov: saved {} transitions to {}",
            self.transition_count(),
            path.display()
        );
        Ok(())
    }

    /// Read a model written by [`MarkovModel::save`]. The model uses the
    /// Zobrist keys it was trained with.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // The version leads the envelope; check it before decoding the rest
        let version: u32 = bincode::deserialize(&bytes)?;
        if version != MODEL_VERSION {
            return Err(ModelError::Version {
                found: version,
                expected: MODEL_VERSION,
            });
        }
        let file: ModelFile = bincode::deserialize(&bytes)?;
        let mut buckets = file.buckets;
        if buckets.is_empty() {
            buckets.push(Vec::new());
        }
        let model = Self {
            buckets,
            keys: ZobristKeys::new(file.key_seed),
            games_seen: file.games_seen,
            learning: true,
        };
        log::info!(
            "markov: loaded {} transitions ({} games) from {}",
            model.transition_count(),
            model.games_seen,
            path.display()
        );
        Ok(model)
    }
}
