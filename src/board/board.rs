//! Board structure with slot-owned pieces

use std::fmt;

use super::{Move, Occupancy, Player, Pos, COLS, NODE_COUNT, PIECES_PER_SIDE, ROWS};

/// A piece owned by the board. Captured pieces stay in their slot with
/// `alive == false` until a later placement reuses it; nothing outside the
/// board holds references to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub id: u8,
    pub owner: Player,
    pub pos: Pos,
    pub alive: bool,
}

/// Middle row of the opening layout; the center node starts empty.
const MIDDLE_ROW: [Option<Player>; COLS] = [
    Some(Player::Black),
    Some(Player::White),
    Some(Player::Black),
    Some(Player::White),
    None,
    Some(Player::Black),
    Some(Player::White),
    Some(Player::Black),
    Some(Player::White),
];

/// Game board: node occupancy plus the pieces it owns.
#[derive(Debug, Clone)]
pub struct Board {
    /// Every piece ever placed, indexed by `Piece::id`
    pieces: Vec<Piece>,
    /// Piece slot occupying each node
    cells: [Option<u8>; NODE_COUNT],
    /// Live pieces per side
    counts: [u32; 2],
    /// Whether the last applied move captured anything
    last_capture: bool,
}

impl Board {
    /// Empty board, used to build test positions.
    pub fn new() -> Self {
        Self {
            pieces: Vec::with_capacity(PIECES_PER_SIDE * 2),
            cells: [None; NODE_COUNT],
            counts: [0; 2],
            last_capture: false,
        }
    }

    /// Standard opening: White on rows 0-1, Black on rows 3-4, the middle
    /// row alternating with the center empty.
    pub fn standard() -> Self {
        let mut board = Self::new();
        for row in 0..ROWS as u8 {
            for col in 0..COLS as u8 {
                let owner = match row {
                    0 | 1 => Some(Player::White),
                    2 => MIDDLE_ROW[col as usize],
                    _ => Some(Player::Black),
                };
                if let Some(player) = owner {
                    board.place_piece(Pos::new(row, col), player);
                }
            }
        }
        board
    }

    /// Get the owner of the piece at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Option<Player> {
        self.piece_at(pos).map(|p| p.owner)
    }

    /// Live piece at position
    #[inline]
    pub fn piece_at(&self, pos: Pos) -> Option<&Piece> {
        if !pos.is_on_board() {
            return None;
        }
        let slot = self.cells[pos.to_index()]?;
        self.pieces.get(slot as usize).filter(|p| p.alive)
    }

    /// All pieces, including captured ones.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Positions of `player`'s live pieces in ascending node id.
    pub fn occupied_by(&self, player: Player) -> impl Iterator<Item = Pos> + '_ {
        (0..NODE_COUNT)
            .map(Pos::from_index)
            .filter(move |&pos| self.get(pos) == Some(player))
    }

    /// Place a new piece. Returns false if the node is off-board or taken.
    pub fn place_piece(&mut self, pos: Pos, player: Player) -> bool {
        if !pos.is_on_board() || self.cells[pos.to_index()].is_some() {
            return false;
        }
        let piece = Piece {
            id: 0,
            owner: player,
            pos,
            alive: true,
        };
        // Dead slots are reused, so there are never more slots than nodes
        let slot = match self.pieces.iter().position(|p| !p.alive) {
            Some(slot) => {
                self.pieces[slot] = piece;
                slot
            }
            None => {
                self.pieces.push(piece);
                self.pieces.len() - 1
            }
        };
        let id = slot as u8;
        self.pieces[slot].id = id;
        self.cells[pos.to_index()] = Some(id);
        self.counts[player.index()] += 1;
        true
    }

    /// Capture the piece at `pos`: it turns dead and leaves the node.
    pub fn remove_piece(&mut self, pos: Pos) -> Option<Player> {
        if !pos.is_on_board() {
            return None;
        }
        let slot = self.cells[pos.to_index()].take()?;
        let piece = self.pieces.get_mut(slot as usize)?;
        piece.alive = false;
        self.counts[piece.owner.index()] -= 1;
        Some(piece.owner)
    }

    /// Relocate the moving piece and capture every listed opponent piece.
    ///
    /// Structurally invalid moves (off-board ids, empty origin, occupied
    /// destination) are ignored. Returns the number of pieces captured.
    pub fn apply_move(&mut self, mv: &Move) -> usize {
        if !mv.is_valid() {
            return 0;
        }
        let (from, to) = (mv.from.to_index(), mv.to.to_index());
        let Some(slot) = self.cells[from] else {
            return 0;
        };
        if self.cells[to].is_some() {
            return 0;
        }

        self.cells[from] = None;
        self.cells[to] = Some(slot);
        let mover = match self.pieces.get_mut(slot as usize) {
            Some(piece) => {
                piece.pos = mv.to;
                piece.owner
            }
            None => return 0,
        };

        let mut captured = 0;
        for &pos in &mv.captured {
            if self.get(pos) == Some(mover.opponent()) && self.remove_piece(pos).is_some() {
                captured += 1;
            }
        }
        self.last_capture = captured > 0;
        captured
    }

    /// Live pieces of a side
    #[inline]
    pub fn count(&self, player: Player) -> u32 {
        self.counts[player.index()]
    }

    /// Occupancy-only equality (piece ids and history are ignored).
    pub fn same_position(&self, other: &Board) -> bool {
        (0..NODE_COUNT)
            .map(Pos::from_index)
            .all(|pos| self.get(pos) == other.get(pos))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Occupancy for Board {
    #[inline]
    fn owner(&self, pos: Pos) -> Option<Player> {
        self.get(pos)
    }

    #[inline]
    fn piece_count(&self, player: Player) -> u32 {
        self.count(player)
    }

    #[inline]
    fn last_move_captured(&self) -> bool {
        self.last_capture
    }
}

/// Row 5 at the top, `W`/`B` for pieces and `.` for empty nodes.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS as u8).rev() {
            write!(f, "{} ", row + 1)?;
            for col in 0..COLS as u8 {
                let c = match self.get(Pos::new(row, col)) {
                    Some(Player::White) => 'W',
                    Some(Player::Black) => 'B',
                    None => '.',
                };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h i")
    }
}
