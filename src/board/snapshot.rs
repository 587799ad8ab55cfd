//! Flat, pointer-free board projection for tree search
//!
//! A snapshot is a plain array of signed owner bytes plus piece counts and
//! a Zobrist hash kept up to date on every applied move, so MCTS can create
//! and drop thousands of speculative positions without touching the live
//! game's pieces.

use crate::search::ZobristKeys;

use super::{Board, Move, Occupancy, Player, Pos, NODE_COUNT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// +1 white, -1 black, 0 empty
    cells: [i8; NODE_COUNT],
    counts: [u32; 2],
    hash: u64,
    last_capture: bool,
}

impl BoardSnapshot {
    /// Project a board.
    pub fn from_board(board: &Board, keys: &ZobristKeys) -> Self {
        let mut cells = [0i8; NODE_COUNT];
        for (idx, cell) in cells.iter_mut().enumerate() {
            if let Some(player) = board.get(Pos::from_index(idx)) {
                *cell = player.sign();
            }
        }
        Self {
            cells,
            counts: [board.count(Player::White), board.count(Player::Black)],
            hash: keys.hash(board),
            last_capture: board.last_move_captured(),
        }
    }

    /// Occupancy hash, maintained incrementally.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Apply a move, updating counts and hash. Ignores the same malformed
    /// moves as [`Board::apply_move`]. Returns the number of pieces captured.
    pub fn apply_move(&mut self, mv: &Move, keys: &ZobristKeys) -> usize {
        if !mv.is_valid() {
            return 0;
        }
        let Some(mover) = self.owner(mv.from) else {
            return 0;
        };
        if !self.is_empty(mv.to) {
            return 0;
        }

        self.cells[mv.from.to_index()] = 0;
        self.cells[mv.to.to_index()] = mover.sign();
        self.hash ^= keys.piece(mv.from, mover) ^ keys.piece(mv.to, mover);

        let victim = mover.opponent();
        let mut captured = 0;
        for &pos in &mv.captured {
            if self.owner(pos) == Some(victim) {
                self.cells[pos.to_index()] = 0;
                self.counts[victim.index()] -= 1;
                self.hash ^= keys.piece(pos, victim);
                captured += 1;
            }
        }
        self.last_capture = captured > 0;
        captured
    }
}

impl Occupancy for BoardSnapshot {
    #[inline]
    fn owner(&self, pos: Pos) -> Option<Player> {
        if !pos.is_on_board() {
            return None;
        }
        Player::from_sign(self.cells[pos.to_index()])
    }

    #[inline]
    fn piece_count(&self, player: Player) -> u32 {
        self.counts[player.index()]
    }

    #[inline]
    fn last_move_captured(&self) -> bool {
        self.last_capture
    }
}

/// Project `board` into a snapshot.
pub fn to_snapshot(board: &Board, keys: &ZobristKeys) -> BoardSnapshot {
    BoardSnapshot::from_board(board, keys)
}

/// Apply `mv` to a snapshot in place.
pub fn apply_move_to_snapshot(
    snapshot: &mut BoardSnapshot,
    mv: &Move,
    keys: &ZobristKeys,
) -> usize {
    snapshot.apply_move(mv, keys)
}
