//! Turn driver
//!
//! [`Game`] owns the live board and enforces turn order, capture chains and
//! the ply limit. It is the only place the live board is mutated.

use crate::board::{Board, Move, Player, Pos};
use crate::error::MoveError;
use crate::rules::{
    check_game_over, generate_moves, has_additional_captures, validate_move, CaptureChain,
    GameOutcome,
};

/// Plies after which an unfinished game is declared drawn
pub const DEFAULT_TURN_LIMIT: u32 = 200;

/// A game in progress.
///
/// # Example
///
/// ```
/// use fanorona::board::{Player, Pos};
/// use fanorona::game::Game;
///
/// let mut game = Game::new();
/// let mv = game.play(Pos::new(1, 4), Pos::new(2, 4)).unwrap();
/// assert!(mv.is_capture());
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    to_move: Player,
    chain: CaptureChain,
    history: Vec<Move>,
    outcome: GameOutcome,
    plies: u32,
    turn_limit: u32,
}

impl Game {
    /// Standard opening, White to move.
    #[must_use]
    pub fn new() -> Self {
        Self::from_board(Board::standard(), Player::White)
    }

    #[must_use]
    pub fn with_turn_limit(turn_limit: u32) -> Self {
        let mut game = Self::new();
        game.turn_limit = turn_limit;
        game
    }

    /// Start from an arbitrary position.
    #[must_use]
    pub fn from_board(board: Board, to_move: Player) -> Self {
        let outcome = check_game_over(&board);
        Self {
            board,
            to_move,
            chain: CaptureChain::new(),
            history: Vec::new(),
            outcome,
            plies: 0,
            turn_limit: DEFAULT_TURN_LIMIT,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[inline]
    pub fn chain(&self) -> &CaptureChain {
        &self.chain
    }

    /// Every move played, chain steps included, in order.
    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    #[inline]
    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.outcome.is_finished()
    }

    #[inline]
    pub fn plies(&self) -> u32 {
        self.plies
    }

    #[inline]
    pub fn turn_limit(&self) -> u32 {
        self.turn_limit
    }

    /// Moves the side to move may play now: chain continuations while a
    /// chain is active, otherwise the normal legal moves.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return Vec::new();
        }
        if self.chain.is_active() {
            self.chain.continuations(&self.board)
        } else {
            generate_moves(&self.board, self.to_move)
        }
    }

    /// Play one step for the side to move.
    ///
    /// After a capture the turn stays with the mover while the piece can
    /// capture again; otherwise it passes to the opponent.
    pub fn play(&mut self, from: Pos, to: Pos) -> Result<Move, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let mv = validate_move(&self.board, from, to, self.to_move, &self.chain)?;

        self.board.apply_move(&mv);
        self.history.push(mv.clone());
        self.plies += 1;

        if mv.is_capture() {
            self.chain.record(&mv);
            if has_additional_captures(&self.board, mv.to, &self.chain) {
                return Ok(mv);
            }
        }
        self.end_turn();
        Ok(mv)
    }

    /// Play a move produced by an engine or the move generator.
    #[inline]
    pub fn play_move(&mut self, mv: &Move) -> Result<Move, MoveError> {
        self.play(mv.from, mv.to)
    }

    /// Stop an active capture chain and pass the turn. Returns `false` when
    /// no chain is active.
    pub fn stop_chain(&mut self) -> bool {
        if !self.chain.is_active() || self.is_over() {
            return false;
        }
        self.end_turn();
        true
    }

    fn end_turn(&mut self) {
        self.chain.reset();
        self.to_move = self.to_move.opponent();
        self.outcome = check_game_over(&self.board);
        if !self.outcome.is_finished() && self.plies >= self.turn_limit {
            log::info!("turn limit of {} plies reached, game drawn", self.turn_limit);
            self.outcome = GameOutcome::Draw;
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
