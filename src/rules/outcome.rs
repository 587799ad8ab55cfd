//! Win detection

use crate::board::{Occupancy, Player};

use super::movegen::has_legal_move;

/// Result of [`check_game_over`].
///
/// `Draw` and `Ongoing` both have no winner; only `Draw` ends the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Ongoing,
    Winner(Player),
    Draw,
}

impl GameOutcome {
    #[inline]
    pub fn is_finished(self) -> bool {
        !matches!(self, GameOutcome::Ongoing)
    }

    #[inline]
    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Winner(player) => Some(player),
            _ => None,
        }
    }
}

/// A side is out of the game with no pieces or no legal move.
fn is_eliminated<B: Occupancy + ?Sized>(board: &B, player: Player) -> bool {
    board.piece_count(player) == 0 || !has_legal_move(board, player)
}

/// Decide the game from position alone.
///
/// A side wins when its opponent has no pieces or cannot move. When both
/// sides are stuck at once the game is drawn.
pub fn check_game_over<B: Occupancy + ?Sized>(board: &B) -> GameOutcome {
    let white_out = is_eliminated(board, Player::White);
    let black_out = is_eliminated(board, Player::Black);
    match (white_out, black_out) {
        (false, false) => GameOutcome::Ongoing,
        (true, true) => GameOutcome::Draw,
        (true, false) => GameOutcome::Winner(Player::Black),
        (false, true) => GameOutcome::Winner(Player::White),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Pos};

    #[test]
    fn test_opening_is_ongoing() {
        let outcome = check_game_over(&Board::standard());
        assert_eq!(outcome, GameOutcome::Ongoing);
        assert!(!outcome.is_finished());
        assert_eq!(outcome.winner(), None);
    }

    #[test]
    fn test_no_pieces_loses() {
        let mut board = Board::new();
        board.place_piece(Pos::new(2, 4), Player::Black);

        let outcome = check_game_over(&board);
        assert_eq!(outcome, GameOutcome::Winner(Player::Black));
        assert!(outcome.is_finished());
    }

    #[test]
    fn test_blocked_side_loses() {
        let mut board = Board::new();
        board.place_piece(Pos::new(0, 0), Player::White);
        board.place_piece(Pos::new(0, 1), Player::Black);
        board.place_piece(Pos::new(1, 0), Player::Black);
        board.place_piece(Pos::new(1, 1), Player::Black);

        assert_eq!(check_game_over(&board), GameOutcome::Winner(Player::Black));
    }

    #[test]
    fn test_empty_board_is_draw() {
        let outcome = check_game_over(&Board::new());
        assert_eq!(outcome, GameOutcome::Draw);
        assert!(outcome.is_finished());
        assert_eq!(outcome.winner(), None);
    }

    #[test]
    fn test_mutual_block_is_draw() {
        // Fill every node; nobody can move
        let mut board = Board::new();
        for idx in 0..crate::board::NODE_COUNT {
            let player = if idx % 2 == 0 { Player::White } else { Player::Black };
            board.place_piece(Pos::from_index(idx), player);
        }
        assert_eq!(check_game_over(&board), GameOutcome::Draw);
    }
}
