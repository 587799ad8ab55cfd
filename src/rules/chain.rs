//! Capture-chain state and move validation
//!
//! Once a piece captures, the same piece may keep capturing in the same
//! turn, as long as it never lands on a node it already visited this turn
//! and never captures twice in a row along the same direction. Continuing
//! is optional; stopping ends the turn. Paika moves are never legal while
//! a chain is active.

use smallvec::SmallVec;

use crate::board::{Direction, Move, Occupancy, Player, Pos};
use crate::error::MoveError;

use super::capture::{detect_capture, has_any_capture_available, moves_from};

/// Per-turn capture chain bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureChain {
    /// Node of the capturing piece, set after the first capture
    piece: Option<Pos>,
    /// Direction of the most recent capture
    last_direction: Option<Direction>,
    /// Nodes occupied by the capturing piece this turn, in order
    visited: SmallVec<[Pos; 16]>,
}

impl CaptureChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a capture has been made this turn.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.piece.is_some()
    }

    /// Current node of the capturing piece.
    #[inline]
    pub fn piece(&self) -> Option<Pos> {
        self.piece
    }

    #[inline]
    pub fn last_direction(&self) -> Option<Direction> {
        self.last_direction
    }

    #[inline]
    pub fn visited(&self) -> &[Pos] {
        &self.visited
    }

    #[inline]
    pub fn has_visited(&self, pos: Pos) -> bool {
        self.visited.contains(&pos)
    }

    /// Forget the chain; called at every turn boundary.
    pub fn reset(&mut self) {
        self.piece = None;
        self.last_direction = None;
        self.visited.clear();
    }

    /// Record an applied capture. Paika moves end the chain.
    pub fn record(&mut self, mv: &Move) {
        if !mv.is_capture() {
            self.reset();
            return;
        }
        if self.visited.is_empty() {
            self.visited.push(mv.from);
        }
        self.visited.push(mv.to);
        self.piece = Some(mv.to);
        self.last_direction = mv.direction();
    }

    /// Check `mv` against the chain constraints only.
    pub fn check(&self, mv: &Move) -> Result<(), MoveError> {
        let Some(expected) = self.piece else {
            return Ok(());
        };
        if mv.from != expected {
            return Err(MoveError::WrongChainPiece {
                expected,
                actual: mv.from,
            });
        }
        if !mv.is_capture() {
            return Err(MoveError::ChainNeedsCapture);
        }
        if self.has_visited(mv.to) {
            return Err(MoveError::Revisited(mv.to));
        }
        if let Some(dir) = mv.direction() {
            if self.last_direction == Some(dir) {
                return Err(MoveError::RepeatedDirection(dir));
            }
        }
        Ok(())
    }

    /// Captures that may extend the chain from its current node.
    ///
    /// Empty when no chain is active.
    pub fn continuations<B: Occupancy + ?Sized>(&self, board: &B) -> Vec<Move> {
        match self.piece {
            Some(pos) => moves_from(board, pos)
                .filter(|mv| self.check(mv).is_ok())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Whether the piece on `pos` can extend `chain` with another capture.
pub fn has_additional_captures<B: Occupancy + ?Sized>(
    board: &B,
    pos: Pos,
    chain: &CaptureChain,
) -> bool {
    moves_from(board, pos).any(|mv| {
        mv.is_capture() && !chain.has_visited(mv.to) && mv.direction() != chain.last_direction()
    })
}

/// Validate the step `from -> to` for `player`, returning the classified
/// move on success.
///
/// Outside a chain, a paika is rejected while any capture is available.
/// Inside a chain, only captures by the chain piece that respect the
/// no-revisit and no-repeated-direction rules are accepted.
pub fn validate_move<B: Occupancy + ?Sized>(
    board: &B,
    from: Pos,
    to: Pos,
    player: Player,
    chain: &CaptureChain,
) -> Result<Move, MoveError> {
    if !from.is_on_board() {
        return Err(MoveError::OffBoard(from));
    }
    if !to.is_on_board() {
        return Err(MoveError::OffBoard(to));
    }
    if board.owner(from) != Some(player) {
        return Err(MoveError::NotOwnPiece { pos: from, player });
    }
    if !board.is_empty(to) {
        return Err(MoveError::Occupied(to));
    }
    let mv = detect_capture(board, from, to).ok_or(MoveError::NotAdjacent { from, to })?;

    if chain.is_active() {
        chain.check(&mv)?;
    } else if !mv.is_capture() && has_any_capture_available(board, player) {
        return Err(MoveError::CaptureRequired);
    }
    Ok(mv)
}

/// Boolean form of [`validate_move`].
#[inline]
pub fn is_move_valid<B: Occupancy + ?Sized>(
    board: &B,
    from: Pos,
    to: Pos,
    player: Player,
    chain: &CaptureChain,
) -> bool {
    validate_move(board, from, to, player, chain).is_ok()
}
