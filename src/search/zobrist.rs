//! Zobrist hashing for position identification
//!
//! One random key per (node, color) plus a side-to-move key. The position
//! hash is the XOR of the keys of every live piece, so it depends on
//! occupancy only; callers that need the side to move fold in
//! [`ZobristKeys::side`] themselves.
//!
//! # Example
//!
//! ```
//! use fanorona::board::{Board, Player, Pos};
//! use fanorona::search::ZobristKeys;
//!
//! let keys = ZobristKeys::new(7);
//! let mut a = Board::new();
//! let mut b = Board::new();
//!
//! // Same occupancy, different construction order
//! a.place_piece(Pos::new(0, 0), Player::White);
//! a.place_piece(Pos::new(4, 8), Player::Black);
//! b.place_piece(Pos::new(4, 8), Player::Black);
//! b.place_piece(Pos::new(0, 0), Player::White);
//!
//! assert_eq!(keys.hash(&a), keys.hash(&b));
//! ```

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::board::{Move, Occupancy, Player, Pos, NODE_COUNT};

/// Seed used by [`ZobristKeys::default`]
pub const DEFAULT_SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Zobrist key table.
///
/// Constructed explicitly and handed to whoever hashes positions; two
/// tables built from the same seed are identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZobristKeys {
    seed: u64,
    /// Keys per node: [node][color]
    pieces: [[u64; 2]; NODE_COUNT],
    /// XORed when Black is to move
    black_to_move: u64,
}

impl ZobristKeys {
    /// Generate keys from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut pieces = [[0u64; 2]; NODE_COUNT];
        for node in pieces.iter_mut() {
            node[0] = rng.random();
            node[1] = rng.random();
        }
        Self {
            seed,
            pieces,
            black_to_move: rng.random(),
        }
    }

    /// Seed the keys were generated from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Key for a piece of `player` on `pos`; zero off the board.
    #[inline]
    #[must_use]
    pub fn piece(&self, pos: Pos, player: Player) -> u64 {
        if !pos.is_on_board() {
            return 0;
        }
        self.pieces[pos.to_index()][player.index()]
    }

    /// Side-to-move key: nonzero only for Black.
    #[inline]
    #[must_use]
    pub fn side(&self, to_move: Player) -> u64 {
        match to_move {
            Player::White => 0,
            Player::Black => self.black_to_move,
        }
    }

    /// Full occupancy hash.
    #[must_use]
    pub fn hash<B: Occupancy + ?Sized>(&self, board: &B) -> u64 {
        let mut h = 0u64;
        for idx in 0..NODE_COUNT {
            let pos = Pos::from_index(idx);
            if let Some(player) = board.owner(pos) {
                h ^= self.pieces[idx][player.index()];
            }
        }
        h
    }

    /// Occupancy hash with the side to move folded in, as used for
    /// transposition table keys.
    #[inline]
    #[must_use]
    pub fn hash_with_side<B: Occupancy + ?Sized>(&self, board: &B, to_move: Player) -> u64 {
        self.hash(board) ^ self.side(to_move)
    }

    /// Incrementally update an occupancy hash for `mv` played by `mover`.
    ///
    /// Assumes every id in `mv.captured` holds an opponent piece, which
    /// holds for moves produced by the rules module.
    #[inline]
    #[must_use]
    pub fn update_move(&self, hash: u64, mv: &Move, mover: Player) -> u64 {
        let mut h = hash ^ self.piece(mv.from, mover) ^ self.piece(mv.to, mover);
        for &pos in &mv.captured {
            h ^= self.piece(pos, mover.opponent());
        }
        h
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::rules::generate_moves;

    #[test]
    fn test_zobrist_empty_board() {
        let keys = ZobristKeys::default();
        let board = Board::new();

        assert_eq!(keys.hash(&board), 0);
        assert_eq!(keys.hash_with_side(&board, Player::White), 0);
        assert_ne!(keys.hash_with_side(&board, Player::Black), 0);
    }

    #[test]
    fn test_zobrist_deterministic() {
        let a = ZobristKeys::new(42);
        let b = ZobristKeys::new(42);
        let board = Board::standard();

        assert_eq!(a, b);
        assert_eq!(a.hash(&board), b.hash(&board));
    }

    #[test]
    fn test_zobrist_seed_changes_keys() {
        let board = Board::standard();
        assert_ne!(
            ZobristKeys::new(1).hash(&board),
            ZobristKeys::new(2).hash(&board)
        );
    }

    #[test]
    fn test_zobrist_ignores_side_to_move() {
        let keys = ZobristKeys::default();
        let board = Board::standard();
        // Plain hash is a function of occupancy only
        assert_eq!(keys.hash(&board), keys.hash(&board.clone()));
        assert_ne!(
            keys.hash_with_side(&board, Player::White),
            keys.hash_with_side(&board, Player::Black)
        );
    }

    #[test]
    fn test_zobrist_relocation_changes_hash() {
        let keys = ZobristKeys::default();
        let mut board = Board::new();
        board.place_piece(Pos::new(1, 1), Player::White);
        let before = keys.hash(&board);

        board.apply_move(&Move::paika(Pos::new(1, 1), Pos::new(1, 2)));
        assert_ne!(keys.hash(&board), before);
    }

    #[test]
    fn test_zobrist_incremental_matches_full() {
        let keys = ZobristKeys::default();
        let mut board = Board::standard();
        let mut mover = Player::White;

        for _ in 0..6 {
            let moves = generate_moves(&board, mover);
            let Some(mv) = moves.first() else { break };
            let before = keys.hash(&board);
            board.apply_move(mv);
            assert_eq!(keys.update_move(before, mv, mover), keys.hash(&board));
            mover = mover.opponent();
        }
    }

    #[test]
    fn test_zobrist_same_position_different_path() {
        let keys = ZobristKeys::default();
        let mut a = Board::new();
        let mut b = Board::new();

        a.place_piece(Pos::new(0, 0), Player::White);
        a.apply_move(&Move::paika(Pos::new(0, 0), Pos::new(0, 1)));

        b.place_piece(Pos::new(0, 1), Player::White);

        assert_eq!(keys.hash(&a), keys.hash(&b));
    }
}
