//! Heuristic evaluation function for Fanorona positions
//!
//! Positions are scored from the perspective of one side:
//! - Material difference (dominant term)
//! - Pieces standing on strong nodes, which have more lines to capture along
//! - Centrality, since edge pieces are easier to trap
//!
//! Finished games score `WIN_SCORE`, shifted by ply so that faster wins and
//! slower losses are preferred.

use crate::board::{Occupancy, Player, Pos, NODE_COUNT};
use crate::rules::{check_game_over, GameOutcome};

/// Score of a won position at ply 0
pub const WIN_SCORE: i32 = 1_000_000;

/// Value of one piece
pub const MATERIAL_WEIGHT: i32 = 100;

/// Bonus per piece on a strong node
pub const STRONG_NODE_BONUS: i32 = 4;

/// Bonus per step closer to the center row and column
const CENTER_WEIGHT: i32 = 1;

/// Center node
const CENTER: Pos = Pos { row: 2, col: 4 };

#[inline]
fn center_bonus(pos: Pos) -> i32 {
    let dr = (i32::from(pos.row) - i32::from(CENTER.row)).abs();
    let dc = (i32::from(pos.col) - i32::from(CENTER.col)).abs();
    // Max distance is 2 + 4
    (6 - dr - dc) * CENTER_WEIGHT
}

/// Positional terms for one side.
fn position_score<B: Occupancy + ?Sized>(board: &B, player: Player) -> i32 {
    let mut score = 0;
    for idx in 0..NODE_COUNT {
        let pos = Pos::from_index(idx);
        if board.owner(pos) != Some(player) {
            continue;
        }
        if pos.is_strong() {
            score += STRONG_NODE_BONUS;
        }
        score += center_bonus(pos);
    }
    score
}

/// Static evaluation from `player`'s perspective, ignoring game end.
///
/// Symmetric: `evaluate(b, White) == -evaluate(b, Black)`.
#[must_use]
pub fn evaluate<B: Occupancy + ?Sized>(board: &B, player: Player) -> i32 {
    let opponent = player.opponent();
    let material =
        (board.piece_count(player) as i32 - board.piece_count(opponent) as i32) * MATERIAL_WEIGHT;
    let position = position_score(board, player) - position_score(board, opponent);
    material + position
}

/// Score of a decided outcome for `player`, reached `ply` moves from the root.
#[must_use]
pub fn outcome_score(outcome: GameOutcome, player: Player, ply: i32) -> i32 {
    match outcome {
        GameOutcome::Winner(w) if w == player => WIN_SCORE - ply,
        GameOutcome::Winner(_) => -WIN_SCORE + ply,
        GameOutcome::Draw | GameOutcome::Ongoing => 0,
    }
}

/// Full evaluation: outcome score for finished games, heuristic otherwise.
#[must_use]
pub fn evaluate_position<B: Occupancy + ?Sized>(board: &B, player: Player, ply: i32) -> i32 {
    match check_game_over(board) {
        GameOutcome::Ongoing => evaluate(board, player),
        outcome => outcome_score(outcome, player, ply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn test_evaluate_opening_is_balanced() {
        let board = Board::standard();
        assert_eq!(evaluate(&board, Player::White), 0);
        assert_eq!(evaluate(&board, Player::Black), 0);
    }

    #[test]
    fn test_evaluate_symmetric() {
        let mut board = Board::standard();
        board.remove_piece(Pos::new(4, 4));
        board.remove_piece(Pos::new(3, 0));

        assert_eq!(
            evaluate(&board, Player::White),
            -evaluate(&board, Player::Black)
        );
    }

    #[test]
    fn test_material_dominates() {
        let mut board = Board::standard();
        board.remove_piece(Pos::new(4, 8));
        let score = evaluate(&board, Player::White);
        assert!(score >= MATERIAL_WEIGHT - STRONG_NODE_BONUS - 6);
        assert!(score > 0);
    }

    #[test]
    fn test_strong_node_preferred() {
        let mut strong = Board::new();
        strong.place_piece(Pos::new(1, 1), Player::White);
        let mut weak = Board::new();
        weak.place_piece(Pos::new(1, 0), Player::White);

        assert!(evaluate(&strong, Player::White) > evaluate(&weak, Player::White));
    }

    #[test]
    fn test_outcome_score_prefers_fast_wins() {
        let win = GameOutcome::Winner(Player::White);
        assert!(outcome_score(win, Player::White, 1) > outcome_score(win, Player::White, 3));
        assert!(outcome_score(win, Player::Black, 1) < outcome_score(win, Player::Black, 3));
        assert_eq!(outcome_score(GameOutcome::Draw, Player::White, 2), 0);
    }

    #[test]
    fn test_evaluate_position_detects_wins() {
        let mut board = Board::new();
        board.place_piece(Pos::new(2, 4), Player::White);

        assert_eq!(evaluate_position(&board, Player::White, 0), WIN_SCORE);
        assert_eq!(evaluate_position(&board, Player::Black, 2), -WIN_SCORE + 2);
    }
}
