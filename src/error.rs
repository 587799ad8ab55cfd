//! Error types
//!
//! The search entry points never fail: they fall back to the invalid move
//! sentinel. These errors cover move submission, explicit validation,
//! table allocation and model persistence.

use std::path::PathBuf;

use thiserror::Error;

use crate::board::{Direction, Player, Pos};

/// Why a requested move is not legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("node {0} is off the board")]
    OffBoard(Pos),
    #[error("no {player} piece on {pos}")]
    NotOwnPiece { pos: Pos, player: Player },
    #[error("destination {0} is occupied")]
    Occupied(Pos),
    #[error("{from} and {to} are not connected by a line")]
    NotAdjacent { from: Pos, to: Pos },
    #[error("a capture is available, so paika moves are not allowed")]
    CaptureRequired,
    #[error("the capturing piece is on {expected}, not {actual}")]
    WrongChainPiece { expected: Pos, actual: Pos },
    #[error("{0} was already visited during this capture chain")]
    Revisited(Pos),
    #[error("cannot capture twice in a row along {0:?}")]
    RepeatedDirection(Direction),
    #[error("only captures may continue a capture chain")]
    ChainNeedsCapture,
    #[error("the game is over")]
    GameOver,
}

/// Transposition table could not be allocated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("cannot allocate {slots} slots ({size_mb} MB) for the transposition table")]
    Allocation { size_mb: usize, slots: usize },
}

/// Markov model persistence failures.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model encoding: {0}")]
    Codec(#[from] bincode::Error),
    #[error("model version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("this engine has no Markov model")]
    NoModel,
}
