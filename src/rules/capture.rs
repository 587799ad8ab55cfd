//! Capture detection for Fanorona
//!
//! A piece stepping along a line captures by approach (percussion): the
//! unbroken run of opposing pieces directly beyond its destination. Failing
//! that it captures by withdrawal (aspiration): the unbroken run directly
//! behind its origin. Percussion is tested first; a step with neither is a
//! paika move.

use smallvec::SmallVec;

use crate::board::{topology, CaptureKind, Direction, Move, Occupancy, Player, Pos};

/// Collect the contiguous run of `victim` pieces starting one step past
/// `start` along `dir`, nearest first.
fn scan_run<B: Occupancy + ?Sized>(
    board: &B,
    start: Pos,
    dir: Direction,
    victim: Player,
) -> SmallVec<[Pos; 8]> {
    let topo = topology();
    let mut run = SmallVec::new();
    let mut cur = start;
    while topo.has_line(cur, dir) {
        let Some(next) = cur.offset(dir) else { break };
        if board.owner(next) != Some(victim) {
            break;
        }
        run.push(next);
        cur = next;
    }
    run
}

/// Classify the step `from -> to` for the piece standing on `from`.
///
/// Returns `None` when the step is not a move at all: off-board nodes,
/// empty origin, occupied destination, or no line between the two.
pub fn detect_capture<B: Occupancy + ?Sized>(board: &B, from: Pos, to: Pos) -> Option<Move> {
    if !from.is_on_board() || !to.is_on_board() {
        return None;
    }
    let mover = board.owner(from)?;
    if !board.is_empty(to) || !topology().are_adjacent(from, to) {
        return None;
    }
    let dir = from.direction_to(to)?;
    let victim = mover.opponent();

    let approach = scan_run(board, to, dir, victim);
    if !approach.is_empty() {
        return Some(Move {
            from,
            to,
            kind: CaptureKind::Percussion,
            captured: approach,
        });
    }

    let withdrawal = scan_run(board, from, dir.reversed(), victim);
    if !withdrawal.is_empty() {
        return Some(Move {
            from,
            to,
            kind: CaptureKind::Aspiration,
            captured: withdrawal,
        });
    }

    Some(Move::paika(from, to))
}

/// Every legal step of the piece on `from`, in ascending destination order.
pub fn moves_from<B: Occupancy + ?Sized>(board: &B, from: Pos) -> impl Iterator<Item = Move> + '_ {
    topology()
        .neighbors(from)
        .iter()
        .filter_map(move |&to| detect_capture(board, from, to))
}

/// Capturing steps of the piece on `from`.
pub fn capture_moves_from<B: Occupancy + ?Sized>(board: &B, from: Pos) -> Vec<Move> {
    moves_from(board, from).filter(Move::is_capture).collect()
}

/// Whether the piece on `from` has any capturing step.
pub fn has_capture_from<B: Occupancy + ?Sized>(board: &B, from: Pos) -> bool {
    moves_from(board, from).any(|mv| mv.is_capture())
}

/// Whether any piece of `player` can capture.
pub fn has_any_capture_available<B: Occupancy + ?Sized>(board: &B, player: Player) -> bool {
    topology()
        .iter()
        .filter(|node| board.owner(node.pos) == Some(player))
        .any(|node| has_capture_from(board, node.pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn test_percussion_three_in_a_row() {
        let mut board = Board::new();
        // W _ B B B _ on row 2
        board.place_piece(Pos::new(2, 1), Player::White);
        board.place_piece(Pos::new(2, 3), Player::Black);
        board.place_piece(Pos::new(2, 4), Player::Black);
        board.place_piece(Pos::new(2, 5), Player::Black);

        let mv = detect_capture(&board, Pos::new(2, 1), Pos::new(2, 2)).unwrap();
        assert_eq!(mv.kind, CaptureKind::Percussion);
        assert_eq!(
            mv.captured.as_slice(),
            &[Pos::new(2, 3), Pos::new(2, 4), Pos::new(2, 5)]
        );
    }

    #[test]
    fn test_percussion_stops_at_gap() {
        let mut board = Board::new();
        // W _ B _ B
        board.place_piece(Pos::new(0, 0), Player::White);
        board.place_piece(Pos::new(0, 2), Player::Black);
        board.place_piece(Pos::new(0, 4), Player::Black);

        let mv = detect_capture(&board, Pos::new(0, 0), Pos::new(0, 1)).unwrap();
        assert_eq!(mv.kind, CaptureKind::Percussion);
        assert_eq!(mv.captured.as_slice(), &[Pos::new(0, 2)]);
    }

    #[test]
    fn test_percussion_stops_at_own_piece() {
        let mut board = Board::new();
        // W _ B W B
        board.place_piece(Pos::new(0, 0), Player::White);
        board.place_piece(Pos::new(0, 2), Player::Black);
        board.place_piece(Pos::new(0, 3), Player::White);
        board.place_piece(Pos::new(0, 4), Player::Black);

        let mv = detect_capture(&board, Pos::new(0, 0), Pos::new(0, 1)).unwrap();
        assert_eq!(mv.captured.as_slice(), &[Pos::new(0, 2)]);
    }

    #[test]
    fn test_aspiration() {
        let mut board = Board::new();
        // B B W _ : white withdraws to the right, capturing both blacks
        board.place_piece(Pos::new(1, 0), Player::Black);
        board.place_piece(Pos::new(1, 1), Player::Black);
        board.place_piece(Pos::new(1, 2), Player::White);

        let mv = detect_capture(&board, Pos::new(1, 2), Pos::new(1, 3)).unwrap();
        assert_eq!(mv.kind, CaptureKind::Aspiration);
        assert_eq!(mv.captured.as_slice(), &[Pos::new(1, 1), Pos::new(1, 0)]);
    }

    #[test]
    fn test_percussion_has_priority() {
        let mut board = Board::new();
        // B W _ B : both approach and withdrawal are possible
        board.place_piece(Pos::new(0, 0), Player::Black);
        board.place_piece(Pos::new(0, 1), Player::White);
        board.place_piece(Pos::new(0, 3), Player::Black);

        let mv = detect_capture(&board, Pos::new(0, 1), Pos::new(0, 2)).unwrap();
        assert_eq!(mv.kind, CaptureKind::Percussion);
        assert_eq!(mv.captured.as_slice(), &[Pos::new(0, 3)]);
    }

    #[test]
    fn test_diagonal_capture_on_strong_line() {
        let mut board = Board::new();
        board.place_piece(Pos::new(0, 0), Player::White);
        board.place_piece(Pos::new(2, 2), Player::Black);
        board.place_piece(Pos::new(3, 3), Player::Black);

        let mv = detect_capture(&board, Pos::new(0, 0), Pos::new(1, 1)).unwrap();
        assert_eq!(mv.kind, CaptureKind::Percussion);
        assert_eq!(mv.captured.as_slice(), &[Pos::new(2, 2), Pos::new(3, 3)]);
    }

    #[test]
    fn test_no_diagonal_from_weak_node() {
        let mut board = Board::new();
        board.place_piece(Pos::new(0, 1), Player::White);
        board.place_piece(Pos::new(2, 3), Player::Black);

        // (0,1) -> (1,2) is not a line
        assert!(detect_capture(&board, Pos::new(0, 1), Pos::new(1, 2)).is_none());
    }

    #[test]
    fn test_paika() {
        let mut board = Board::new();
        board.place_piece(Pos::new(2, 4), Player::White);
        board.place_piece(Pos::new(0, 0), Player::Black);

        let mv = detect_capture(&board, Pos::new(2, 4), Pos::new(2, 5)).unwrap();
        assert_eq!(mv.kind, CaptureKind::Paika);
        assert!(mv.captured.is_empty());
    }

    #[test]
    fn test_not_a_move() {
        let board = Board::standard();
        // Occupied destination
        assert!(detect_capture(&board, Pos::new(0, 0), Pos::new(0, 1)).is_none());
        // Empty origin
        assert!(detect_capture(&board, Pos::new(2, 4), Pos::new(1, 4)).is_none());
        // Off board
        assert!(detect_capture(&board, Pos::INVALID, Pos::new(2, 4)).is_none());
        // Two steps away
        assert!(detect_capture(&board, Pos::new(0, 4), Pos::new(2, 4)).is_none());
    }

    #[test]
    fn test_capture_runs_lie_on_the_move_line() {
        let board = Board::standard();
        for from in board.occupied_by(Player::White).collect::<Vec<_>>() {
            for mv in moves_from(&board, from) {
                let dir = mv.direction().unwrap();
                let (anchor, step) = match mv.kind {
                    CaptureKind::Percussion => (mv.to, dir),
                    CaptureKind::Aspiration => (mv.from, dir.reversed()),
                    CaptureKind::Paika => continue,
                };
                let mut expected = anchor;
                for &pos in &mv.captured {
                    expected = expected.offset(step).unwrap();
                    assert_eq!(pos, expected);
                }
            }
        }
    }

    #[test]
    fn test_withdrawal_mirrors_approach() {
        // W _ B B: stepping back from the run withdraws from the same pieces
        let mut board = Board::new();
        board.place_piece(Pos::new(2, 0), Player::White);
        board.place_piece(Pos::new(2, 2), Player::Black);
        board.place_piece(Pos::new(2, 3), Player::Black);

        let forward = detect_capture(&board, Pos::new(2, 0), Pos::new(2, 1)).unwrap();
        assert_eq!(forward.kind, CaptureKind::Percussion);

        let mut moved = board.clone();
        moved.apply_move(&Move::paika(Pos::new(2, 0), Pos::new(2, 1)));
        let back = detect_capture(&moved, Pos::new(2, 1), Pos::new(2, 0)).unwrap();
        assert_ne!(back.kind, CaptureKind::Percussion);
        assert_eq!(back.kind, CaptureKind::Aspiration);
        assert_eq!(back.captured, forward.captured);
    }

    #[test]
    fn test_has_capture_from_and_any() {
        let board = Board::standard();
        // e2 -> e3 approaches e4, e5
        assert!(has_capture_from(&board, Pos::new(1, 4)));
        assert!(!has_capture_from(&board, Pos::new(0, 0)));
        assert!(has_any_capture_available(&board, Player::White));
        assert!(has_any_capture_available(&board, Player::Black));

        let caps = capture_moves_from(&board, Pos::new(1, 4));
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].captured.as_slice(), &[Pos::new(3, 4), Pos::new(4, 4)]);
    }
}
