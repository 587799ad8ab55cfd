//! Alpha-Beta minimax with a transposition table
//!
//! Scores are always from the searching player's point of view: the
//! maximizing nodes are that player's turns. Each ply passes the turn, and
//! terminal nodes (depth exhausted or game decided) are scored by
//! [`evaluate_position`].
//!
//! Only exact table entries searched at least as deep are used to cut a
//! node short; bound entries still contribute their best move to ordering.
//!
//! # Example
//!
//! ```
//! use fanorona::board::{Board, Player};
//! use fanorona::search::{Searcher, ZobristKeys};
//!
//! let mut searcher = Searcher::new(1, ZobristKeys::default());
//! let board = Board::standard();
//!
//! let result = searcher.search(&board, Player::White, 2);
//! let best = result.best_move.expect("the opening has moves");
//! assert!(best.is_capture());
//! ```

use std::time::{Duration, Instant};

use crate::board::{Board, Move, Player};
use crate::eval::{evaluate_position, WIN_SCORE};
use crate::rules::{check_game_over, generate_moves, validate_move, CaptureChain};

use super::{EntryType, TTStats, TranspositionTable, ZobristKeys};

/// Infinity score for alpha-beta bounds
const INF: i32 = WIN_SCORE + 1_000;

/// Scores beyond this magnitude are decided games carrying a ply distance
const WIN_THRESHOLD: i32 = WIN_SCORE - 1_000;

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Total TT probes
    pub tt_probes: u64,
    /// TT probes that returned a usable exact score
    pub tt_hits: u64,
    /// Alpha-beta cutoffs
    pub cutoffs: u64,
    /// Root moves that failed post-search validation
    pub validation_fallbacks: u64,
}

impl SearchStats {
    /// TT hit rate in percent
    pub fn tt_hit_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_hits as f64 / self.tt_probes as f64 * 100.0
        }
    }
}

/// Search result containing the best move found and associated statistics.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move found, `None` when there was nothing to choose from
    pub best_move: Option<Move>,
    /// Score of the best move for the searching player
    pub score: i32,
    /// Nominal search depth
    pub depth: i8,
    /// Nodes visited by this search
    pub nodes: u64,
    /// Root moves actually evaluated before the deadline
    pub root_moves_searched: usize,
    /// Whether the chosen move was replaced by the first candidate
    pub fell_back: bool,
}

impl SearchResult {
    fn empty(depth: i8) -> Self {
        Self {
            best_move: None,
            score: 0,
            depth,
            nodes: 0,
            root_moves_searched: 0,
            fell_back: false,
        }
    }
}

/// Flip a bound when converting a score between the two players' views.
#[inline]
fn flip(entry_type: EntryType) -> EntryType {
    match entry_type {
        EntryType::Exact => EntryType::Exact,
        EntryType::LowerBound => EntryType::UpperBound,
        EntryType::UpperBound => EntryType::LowerBound,
    }
}

/// Make a decided score relative to the node at `ply` before storing it.
#[inline]
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= WIN_THRESHOLD {
        score + ply
    } else if score <= -WIN_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`] for a node reached at `ply`.
#[inline]
fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= WIN_THRESHOLD {
        score - ply
    } else if score <= -WIN_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Alpha-Beta search engine with transposition table.
///
/// The table survives between searches; call [`Searcher::clear_tt`] for a
/// new game. When the table cannot be allocated the searcher runs without
/// one.
pub struct Searcher {
    keys: ZobristKeys,
    tt: Option<TranspositionTable>,
    nodes: u64,
    stats: SearchStats,
}

impl Searcher {
    /// Create a searcher with a `tt_size_mb` table.
    #[must_use]
    pub fn new(tt_size_mb: usize, keys: ZobristKeys) -> Self {
        let tt = match TranspositionTable::new(tt_size_mb) {
            Ok(tt) => Some(tt),
            Err(err) => {
                log::warn!("{err}; searching without a transposition table");
                None
            }
        };
        Self {
            keys,
            tt,
            nodes: 0,
            stats: SearchStats::default(),
        }
    }

    /// Create a searcher with no transposition table.
    #[must_use]
    pub fn without_table(keys: ZobristKeys) -> Self {
        Self {
            keys,
            tt: None,
            nodes: 0,
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn has_table(&self) -> bool {
        self.tt.is_some()
    }

    /// Cumulative statistics across searches.
    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Search every legal move of `player` to `depth` plies.
    #[must_use]
    pub fn search(&mut self, board: &Board, player: Player, depth: i8) -> SearchResult {
        self.search_timed(board, player, depth, None)
    }

    /// Like [`Searcher::search`], checking `time_limit` between root moves.
    #[must_use]
    pub fn search_timed(
        &mut self,
        board: &Board,
        player: Player,
        depth: i8,
        time_limit: Option<Duration>,
    ) -> SearchResult {
        let candidates = generate_moves(board, player);
        self.search_candidates(
            board,
            player,
            depth,
            &candidates,
            &CaptureChain::new(),
            time_limit,
        )
    }

    /// Search only `candidates` at the root.
    ///
    /// `chain` is the capture chain the candidates continue, used to
    /// re-validate the chosen move. The deadline is checked after each root
    /// move, so at least one candidate is always evaluated.
    #[must_use]
    pub fn search_candidates(
        &mut self,
        board: &Board,
        player: Player,
        depth: i8,
        candidates: &[Move],
        chain: &CaptureChain,
        time_limit: Option<Duration>,
    ) -> SearchResult {
        let depth = depth.max(1);
        let Some(first) = candidates.first() else {
            return SearchResult::empty(depth);
        };

        let start = Instant::now();
        let deadline = time_limit.map(|limit| start + limit);
        let nodes_before = self.nodes;

        let mut alpha = -INF;
        let beta = INF;
        let mut best_score = -INF;
        let mut best_move = first.clone();
        let mut searched = 0;

        for mv in candidates {
            let mut child = board.clone();
            child.apply_move(mv);
            let score = self.alpha_beta(&child, depth - 1, alpha, beta, false, player, 1);
            searched += 1;

            if score > best_score {
                best_score = score;
                best_move = mv.clone();
            }
            alpha = alpha.max(best_score);

            if deadline.is_some_and(|d| Instant::now() >= d) {
                log::debug!(
                    "minimax deadline after {searched}/{} root moves",
                    candidates.len()
                );
                break;
            }
        }

        let valid = matches!(
            validate_move(board, best_move.from, best_move.to, player, chain),
            Ok(ref checked) if *checked == best_move
        );
        let fell_back = !valid;
        if fell_back {
            log::warn!(
                "minimax chose {best_move}, which fails validation; falling back to {first}"
            );
            self.stats.validation_fallbacks += 1;
            best_move = first.clone();
        }

        let nodes = self.nodes - nodes_before;
        log::debug!(
            "minimax {player} depth {depth}: {best_move} score {best_score} nodes {nodes} in {:?}",
            start.elapsed()
        );

        SearchResult {
            best_move: Some(best_move),
            score: best_score,
            depth,
            nodes,
            root_moves_searched: searched,
            fell_back,
        }
    }

    /// Minimax value of `board` for `ai_player`, `ply` moves from the root.
    ///
    /// `maximizing` is true when `ai_player` is to move.
    #[allow(clippy::too_many_arguments)]
    pub fn alpha_beta(
        &mut self,
        board: &Board,
        depth: i8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        ai_player: Player,
        ply: i32,
    ) -> i32 {
        self.nodes += 1;

        if depth <= 0 || check_game_over(board).is_finished() {
            return evaluate_position(board, ai_player, ply);
        }

        let to_move = if maximizing {
            ai_player
        } else {
            ai_player.opponent()
        };
        // Table scores are stored from the side to move's point of view
        let sign = if maximizing { 1 } else { -1 };
        let hash = self.keys.hash_with_side(board, to_move);

        let mut tt_move = None;
        if let Some(tt) = &self.tt {
            self.stats.tt_probes += 1;
            if let Some(score) = tt.probe_exact(hash, depth) {
                self.stats.tt_hits += 1;
                return score_from_tt(score, ply) * sign;
            }
            tt_move = tt.get_best_move(hash).cloned();
        }

        let mut moves = generate_moves(board, to_move);
        if moves.is_empty() {
            return evaluate_position(board, ai_player, ply);
        }
        if let Some(tm) = tt_move {
            if let Some(idx) = moves.iter().position(|m| *m == tm) {
                moves[..=idx].rotate_right(1);
            }
        }

        let orig_alpha = alpha;
        let orig_beta = beta;
        let mut best = if maximizing { -INF } else { INF };
        let mut best_move = None;

        for mv in moves {
            let mut child = board.clone();
            child.apply_move(&mv);
            let score = self.alpha_beta(
                &child,
                depth - 1,
                alpha,
                beta,
                !maximizing,
                ai_player,
                ply + 1,
            );

            if maximizing {
                if score > best {
                    best = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(best);
            } else {
                if score < best {
                    best = score;
                    best_move = Some(mv);
                }
                beta = beta.min(best);
            }

            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }

        if let Some(tt) = &mut self.tt {
            let entry_type = if best <= orig_alpha {
                EntryType::UpperBound
            } else if best >= orig_beta {
                EntryType::LowerBound
            } else {
                EntryType::Exact
            };
            let entry_type = if maximizing { entry_type } else { flip(entry_type) };
            tt.store(hash, depth, score_to_tt(best * sign, ply), entry_type, best_move);
        }

        best
    }

    /// Get transposition table statistics (all zero without a table).
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.as_ref().map(TranspositionTable::stats).unwrap_or_default()
    }

    /// Clear the transposition table and statistics (for a new game).
    pub fn clear_tt(&mut self) {
        if let Some(tt) = &mut self.tt {
            tt.clear();
        }
        self.stats = SearchStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;

    fn searcher() -> Searcher {
        Searcher::new(1, ZobristKeys::default())
    }

    #[test]
    fn test_win_distance_relative_to_node() {
        let mut searcher = searcher();
        let mut board = Board::new();
        board.place_piece(Pos::new(2, 2), Player::White);
        board.place_piece(Pos::new(2, 4), Player::Black);

        let at_root = searcher.alpha_beta(&board, 2, -INF, INF, true, Player::White, 0);
        assert_eq!(at_root, WIN_SCORE - 1);

        // Same position deeper in the tree: the table hit must keep the
        // win one ply away from this node
        let hits = searcher.stats().tt_hits;
        let deeper = searcher.alpha_beta(&board, 2, -INF, INF, true, Player::White, 3);
        assert_eq!(searcher.stats().tt_hits, hits + 1);
        assert_eq!(deeper, WIN_SCORE - 4);

        // And from the losing side's view
        let losing = searcher.alpha_beta(&board, 2, -INF, INF, false, Player::Black, 5);
        assert_eq!(losing, -WIN_SCORE + 6);
    }

    #[test]
    fn test_score_tt_roundtrip_keeps_heuristic_scores() {
        assert_eq!(score_to_tt(250, 7), 250);
        assert_eq!(score_from_tt(-250, 7), -250);
        assert_eq!(score_from_tt(score_to_tt(WIN_SCORE - 3, 2), 2), WIN_SCORE - 3);
        assert_eq!(score_from_tt(score_to_tt(-WIN_SCORE + 3, 2), 2), -WIN_SCORE + 3);
    }

    #[test]
    fn test_search_opening_returns_capture() {
        let mut searcher = searcher();
        let board = Board::standard();

        let result = searcher.search(&board, Player::White, 2);
        let best = result.best_move.unwrap();
        assert!(best.is_capture());
        assert!(result.nodes > 0);
        assert!(!result.fell_back);
    }

    #[test]
    fn test_search_finds_winning_capture() {
        let mut searcher = searcher();
        let mut board = Board::new();
        board.place_piece(Pos::new(2, 2), Player::White);
        board.place_piece(Pos::new(2, 4), Player::Black);

        let result = searcher.search(&board, Player::White, 2);
        let best = result.best_move.unwrap();
        assert!(best.same_step(Pos::new(2, 2), Pos::new(2, 3)));
        assert_eq!(result.score, WIN_SCORE - 1);
    }

    #[test]
    fn test_search_no_moves() {
        let mut searcher = searcher();
        let mut board = Board::new();
        board.place_piece(Pos::new(0, 0), Player::White);
        board.place_piece(Pos::new(0, 1), Player::Black);
        board.place_piece(Pos::new(1, 0), Player::Black);
        board.place_piece(Pos::new(1, 1), Player::Black);

        let result = searcher.search(&board, Player::White, 4);
        assert!(result.best_move.is_none());
        assert_eq!(result.nodes, 0);
    }

    #[test]
    fn test_search_deterministic() {
        let board = Board::standard();
        let a = searcher().search(&board, Player::Black, 3);
        let b = searcher().search(&board, Player::Black, 3);

        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.score, b.score);
        assert_eq!(a.nodes, b.nodes);
    }

    #[test]
    fn test_table_does_not_change_shallow_result() {
        let board = Board::standard();
        let with = searcher().search(&board, Player::White, 2);
        let without = Searcher::without_table(ZobristKeys::default())
            .search(&board, Player::White, 2);

        assert_eq!(with.best_move, without.best_move);
        assert_eq!(with.score, without.score);
    }

    #[test]
    fn test_search_populates_table() {
        let mut searcher = searcher();
        searcher.search(&Board::standard(), Player::White, 3);

        assert!(searcher.tt_stats().used > 0);
        assert!(searcher.stats().tt_probes > 0);

        searcher.clear_tt();
        assert_eq!(searcher.tt_stats().used, 0);
        assert_eq!(searcher.stats(), &SearchStats::default());
    }

    #[test]
    fn test_without_table_reports_empty_stats() {
        let mut searcher = Searcher::without_table(ZobristKeys::default());
        assert!(!searcher.has_table());
        let result = searcher.search(&Board::standard(), Player::White, 2);
        assert!(result.best_move.is_some());
        assert_eq!(searcher.tt_stats(), TTStats::default());
    }

    #[test]
    fn test_candidates_restrict_root() {
        let mut searcher = searcher();
        let board = Board::standard();
        let moves = generate_moves(&board, Player::White);
        let only = vec![moves[moves.len() - 1].clone()];

        let result =
            searcher.search_candidates(&board, Player::White, 2, &only, &CaptureChain::new(), None);
        assert_eq!(result.best_move.as_ref(), only.first());
        assert_eq!(result.root_moves_searched, 1);
    }

    #[test]
    fn test_zero_time_limit_still_moves() {
        let mut searcher = searcher();
        let board = Board::standard();

        let result = searcher.search_timed(&board, Player::White, 2, Some(Duration::ZERO));
        assert_eq!(result.root_moves_searched, 1);
        assert_eq!(result.best_move, generate_moves(&board, Player::White).first().cloned());
    }

    #[test]
    fn test_invalid_candidate_falls_back() {
        let mut searcher = searcher();
        let mut board = Board::new();
        board.place_piece(Pos::new(2, 2), Player::White);
        board.place_piece(Pos::new(2, 4), Player::Black);
        board.place_piece(Pos::new(4, 8), Player::Black);

        let legal = generate_moves(&board, Player::White);
        assert_eq!(legal.len(), 1);
        // Claims to wipe out every black piece with a paika step
        let bogus = Move {
            from: Pos::new(2, 2),
            to: Pos::new(2, 1),
            kind: crate::board::CaptureKind::Percussion,
            captured: [Pos::new(2, 4), Pos::new(4, 8)].into_iter().collect(),
        };
        let candidates = vec![legal[0].clone(), bogus];

        let result = searcher.search_candidates(
            &board,
            Player::White,
            1,
            &candidates,
            &CaptureChain::new(),
            None,
        );
        assert!(result.fell_back);
        assert_eq!(result.best_move, Some(legal[0].clone()));
        assert_eq!(searcher.stats().validation_fallbacks, 1);
    }
}
