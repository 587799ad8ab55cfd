//! Move generation
//!
//! Captures are mandatory: when any piece of the side to move can capture,
//! only capturing moves are generated. Ordering is deterministic, origins
//! by ascending node id and destinations by ascending neighbor id, so that
//! every search strategy breaks ties the same way.

use crate::board::{topology, Move, Occupancy, Player};

use super::capture::moves_from;

/// Every step of every `player` piece, captures and paikas mixed.
///
/// Ignores the mandatory-capture rule; rollouts use this where full
/// legality is not worth the filtering.
pub fn generate_pseudo_moves<B: Occupancy + ?Sized>(board: &B, player: Player) -> Vec<Move> {
    let mut moves = Vec::with_capacity(32);
    for node in topology().iter() {
        if board.owner(node.pos) == Some(player) {
            moves.extend(moves_from(board, node.pos));
        }
    }
    moves
}

/// Legal moves for `player`: only captures when any exist, otherwise
/// every paika step.
pub fn generate_moves<B: Occupancy + ?Sized>(board: &B, player: Player) -> Vec<Move> {
    let mut moves = generate_pseudo_moves(board, player);
    if moves.iter().any(Move::is_capture) {
        moves.retain(Move::is_capture);
    }
    moves
}

/// Whether `player` has at least one legal move.
pub fn has_legal_move<B: Occupancy + ?Sized>(board: &B, player: Player) -> bool {
    // Captures need an empty destination too, so an empty neighbor suffices.
    let topo = topology();
    topo.iter()
        .filter(|node| board.owner(node.pos) == Some(player))
        .any(|node| topo.neighbors(node.pos).iter().any(|&n| board.is_empty(n)))
}
