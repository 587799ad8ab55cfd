//! Game rules for Fanorona
//!
//! This module implements the rule set:
//! - Capture classification (percussion and aspiration)
//! - Move generation with mandatory capture
//! - Capture chains (no revisits, no repeated direction)
//! - Win and draw detection

pub mod capture;
pub mod chain;
pub mod movegen;
pub mod outcome;

// Re-exports for convenient access
pub use capture::{
    capture_moves_from, detect_capture, has_any_capture_available, has_capture_from, moves_from,
};
pub use chain::{has_additional_captures, is_move_valid, validate_move, CaptureChain};
pub use movegen::{generate_moves, generate_pseudo_moves, has_legal_move};
pub use outcome::{check_game_over, GameOutcome};
