//! Board representation for Fanorona

pub mod board;
pub mod snapshot;
pub mod topology;


use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// Re-exports
pub use board::{Board, Piece};
pub use snapshot::{apply_move_to_snapshot, to_snapshot, BoardSnapshot};
pub use topology::{topology, Node, Topology};

/// Board height (rows 0-4)
pub const ROWS: usize = 5;
/// Board width (columns 0-8)
pub const COLS: usize = 9;
pub const NODE_COUNT: usize = ROWS * COLS; // 45

/// Pieces each side starts with in the standard layout
pub const PIECES_PER_SIDE: usize = 22;

/// Upper bound on pieces removed by one move (a side never has more)
pub const MAX_CAPTURED: usize = PIECES_PER_SIDE;

/// The two sides. `White` holds rows 0-1 at the start, `Black` rows 3-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// Get opponent
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// Dense index for per-side tables
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::White => 0,
            Player::Black => 1,
        }
    }

    /// Signed byte used by snapshots (+1 white, -1 black)
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Player::White => 1,
            Player::Black => -1,
        }
    }

    #[inline]
    pub fn from_sign(sign: i8) -> Option<Player> {
        match sign {
            1 => Some(Player::White),
            -1 => Some(Player::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => f.write_str("White"),
            Player::Black => f.write_str("Black"),
        }
    }
}

/// Intersection on the 5x9 grid. Node id = `row * COLS + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    /// Sentinel used by invalid moves
    pub const INVALID: Pos = Pos {
        row: u8::MAX,
        col: u8::MAX,
    };

    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < ROWS as u8 && col < COLS as u8);
        Self { row, col }
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.row as usize * COLS + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / COLS) as u8,
            col: (idx % COLS) as u8,
        }
    }

    /// Checked conversion from a node id.
    #[inline]
    pub fn try_from_index(idx: usize) -> Option<Self> {
        (idx < NODE_COUNT).then(|| Self::from_index(idx))
    }

    #[inline]
    pub fn is_valid(row: i32, col: i32) -> bool {
        row >= 0 && row < ROWS as i32 && col >= 0 && col < COLS as i32
    }

    #[inline]
    pub fn is_on_board(self) -> bool {
        (self.row as usize) < ROWS && (self.col as usize) < COLS
    }

    /// Strong nodes carry diagonal lines.
    #[inline]
    pub fn is_strong(self) -> bool {
        (u16::from(self.row) + u16::from(self.col)) % 2 == 0
    }

    /// Step one node along `dir`, if that stays on the board.
    #[inline]
    pub fn offset(self, dir: Direction) -> Option<Pos> {
        let r = i32::from(self.row) + i32::from(dir.dr);
        let c = i32::from(self.col) + i32::from(dir.dc);
        if Self::is_valid(r, c) {
            Some(Pos::new(r as u8, c as u8))
        } else {
            None
        }
    }

    /// Unit vector from `self` to an adjacent `other`.
    #[inline]
    pub fn direction_to(self, other: Pos) -> Option<Direction> {
        let dr = i32::from(other.row) - i32::from(self.row);
        let dc = i32::from(other.col) - i32::from(self.col);
        if (dr, dc) == (0, 0) || dr.abs() > 1 || dc.abs() > 1 {
            return None;
        }
        Some(Direction::new(dr as i8, dc as i8))
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}

/// Board coordinates as `a1`..`i5` (column letter, 1-based row).
impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_on_board() {
            return f.write_str("--");
        }
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

/// Unit step (Δrow, Δcol) along a board line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub dr: i8,
    pub dc: i8,
}

impl Direction {
    /// All eight directions, orthogonal first.
    pub const ALL: [Direction; 8] = [
        Direction { dr: -1, dc: 0 },
        Direction { dr: 0, dc: -1 },
        Direction { dr: 0, dc: 1 },
        Direction { dr: 1, dc: 0 },
        Direction { dr: -1, dc: -1 },
        Direction { dr: -1, dc: 1 },
        Direction { dr: 1, dc: -1 },
        Direction { dr: 1, dc: 1 },
    ];

    #[inline]
    pub const fn new(dr: i8, dc: i8) -> Self {
        Self { dr, dc }
    }

    #[inline]
    pub fn reversed(self) -> Self {
        Self {
            dr: -self.dr,
            dc: -self.dc,
        }
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        self.dr != 0 && self.dc != 0
    }
}

/// How a move removes pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    /// Non-capturing move
    Paika,
    /// Captures the run beyond the destination
    Percussion,
    /// Captures the run behind the origin
    Aspiration,
}

impl CaptureKind {
    #[inline]
    pub fn is_capture(self) -> bool {
        !matches!(self, CaptureKind::Paika)
    }
}

/// A single step of one piece, with the pieces it removes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Pos,
    pub to: Pos,
    pub kind: CaptureKind,
    /// Captured nodes, nearest first
    pub captured: SmallVec<[Pos; 8]>,
}

impl Move {
    #[inline]
    pub fn paika(from: Pos, to: Pos) -> Self {
        Self {
            from,
            to,
            kind: CaptureKind::Paika,
            captured: SmallVec::new(),
        }
    }

    /// The "no move" value: both ends are [`Pos::INVALID`].
    #[inline]
    pub fn invalid() -> Self {
        Self::paika(Pos::INVALID, Pos::INVALID)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.from.is_on_board() && self.to.is_on_board()
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.kind.is_capture()
    }

    #[inline]
    pub fn captured_count(&self) -> usize {
        self.captured.len()
    }

    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.from.direction_to(self.to)
    }

    /// Same origin and destination, ignoring capture details.
    #[inline]
    pub fn same_step(&self, from: Pos, to: Pos) -> bool {
        self.from == from && self.to == to
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = match self.kind {
            CaptureKind::Paika => '-',
            CaptureKind::Percussion => 'x',
            CaptureKind::Aspiration => '<',
        };
        write!(f, "{}{}{}", self.from, sep, self.to)?;
        if !self.captured.is_empty() {
            write!(f, " ({})", self.captured.len())?;
        }
        Ok(())
    }
}

/// Read access to node occupancy, shared by [`Board`] and [`BoardSnapshot`]
/// so the rules work on both.
pub trait Occupancy {
    /// Owner of the live piece at `pos`; `None` for empty or off-board nodes.
    fn owner(&self, pos: Pos) -> Option<Player>;

    /// Live pieces of `player`.
    fn piece_count(&self, player: Player) -> u32;

    /// Whether the most recently applied move captured anything.
    fn last_move_captured(&self) -> bool;

    #[inline]
    fn is_empty(&self, pos: Pos) -> bool {
        pos.is_on_board() && self.owner(pos).is_none()
    }

    #[inline]
    fn total_pieces(&self) -> u32 {
        self.piece_count(Player::White) + self.piece_count(Player::Black)
    }
}
