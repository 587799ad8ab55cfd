//! Monte Carlo Tree Search
//!
//! Standard MCTS phases over an index arena of [`BoardSnapshot`]s:
//! 1. **Selection**: descend through fully expanded nodes by UCB1
//! 2. **Expansion**: materialize every child on first visit, then hand
//!    out unvisited children one per iteration
//! 3. **Simulation**: random playout, biased toward captures, cut off at
//!    a fixed depth and scored by material when undecided
//! 4. **Backpropagation**: rewards flip perspective at every level
//!
//! The live board is only read once to build the root snapshot. The arena
//! is dropped when the search returns.
//!
//! # Example
//!
//! ```
//! use fanorona::board::{Board, Player};
//! use fanorona::search::{MctsConfig, MctsSearcher, ZobristKeys};
//!
//! let config = MctsConfig { iterations: 200, ..MctsConfig::default() };
//! let mut mcts = MctsSearcher::new(config, ZobristKeys::default());
//!
//! let result = mcts.search(&Board::standard(), Player::White);
//! assert!(result.best_move.is_some());
//! ```

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::board::{to_snapshot, Board, BoardSnapshot, Move, Occupancy, Player};
use crate::rules::{check_game_over, generate_moves, generate_pseudo_moves, GameOutcome};

use super::ZobristKeys;

/// Probability of picking a capture during playouts when one exists
const CAPTURE_BIAS: f64 = 0.7;

/// MCTS parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Iterations per search
    pub iterations: u32,
    /// Maximum plies per playout
    pub rollout_depth: u32,
    /// UCB1 exploration constant
    pub exploration: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            rollout_depth: 50,
            exploration: std::f64::consts::SQRT_2,
            seed: super::zobrist::DEFAULT_SEED,
        }
    }
}

/// Outcome of one MCTS search.
#[derive(Debug, Clone)]
pub struct MctsResult {
    /// Most visited root child, `None` when there were no candidates
    pub best_move: Option<Move>,
    /// Average reward of the chosen child for the searching player
    pub win_rate: f64,
    /// Visits of the chosen child
    pub visits: u32,
    /// Iterations completed
    pub iterations: u32,
    /// Nodes allocated in the arena
    pub nodes: usize,
    /// Whether node allocation failed and the search stopped early
    pub aborted: bool,
}

struct MctsNode {
    snapshot: BoardSnapshot,
    /// Move that led here (`None` at the root)
    mv: Option<Move>,
    parent: Option<usize>,
    children: Vec<usize>,
    visits: u32,
    /// Sum of rewards for the player who moved into this node
    reward: f64,
    /// Side to move at this node
    to_move: Player,
    /// Children have been materialized
    expanded: bool,
    /// Index into `children` of the next child never visited
    next_unvisited: usize,
    terminal: bool,
}

impl MctsNode {
    fn new(
        snapshot: BoardSnapshot,
        mv: Option<Move>,
        parent: Option<usize>,
        to_move: Player,
    ) -> Self {
        let terminal = check_game_over(&snapshot).is_finished();
        Self {
            snapshot,
            mv,
            parent,
            children: Vec::new(),
            visits: 0,
            reward: 0.0,
            to_move,
            expanded: false,
            next_unvisited: 0,
            terminal,
        }
    }

    #[inline]
    fn is_fully_expanded(&self) -> bool {
        self.expanded && self.next_unvisited >= self.children.len()
    }

    /// UCB1 score; unvisited nodes come first.
    #[inline]
    fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = f64::from(self.visits);
        self.reward / visits + exploration * (f64::from(parent_visits).ln() / visits).sqrt()
    }
}

/// Allocation failure inside the arena.
struct ArenaFull;

/// MCTS engine. The RNG is seeded once at construction, so two searchers
/// built from the same config and keys play identically.
pub struct MctsSearcher {
    config: MctsConfig,
    keys: ZobristKeys,
    rng: Xoshiro256PlusPlus,
}

impl MctsSearcher {
    #[must_use]
    pub fn new(config: MctsConfig, keys: ZobristKeys) -> Self {
        let rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        Self { config, keys, rng }
    }

    #[inline]
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Search every legal move of `player`.
    #[must_use]
    pub fn search(&mut self, board: &Board, player: Player) -> MctsResult {
        let candidates = generate_moves(board, player);
        self.search_candidates(board, player, &candidates, None)
    }

    /// Search with the root restricted to `candidates`, checking
    /// `time_limit` between iterations.
    #[must_use]
    pub fn search_candidates(
        &mut self,
        board: &Board,
        player: Player,
        candidates: &[Move],
        time_limit: Option<Duration>,
    ) -> MctsResult {
        let mut result = MctsResult {
            best_move: candidates.first().cloned(),
            win_rate: 0.0,
            visits: 0,
            iterations: 0,
            nodes: 0,
            aborted: false,
        };
        if candidates.len() <= 1 {
            return result;
        }

        let start = Instant::now();
        let deadline = time_limit.map(|limit| start + limit);

        let root_snapshot = to_snapshot(board, &self.keys);
        let mut arena = Vec::new();
        if arena.try_reserve(candidates.len() + 1).is_err() {
            log::warn!("mcts: cannot allocate the root; playing the first candidate");
            result.aborted = true;
            return result;
        }
        arena.push(MctsNode::new(root_snapshot, None, None, player));
        // Root children come from the candidate list, not from move generation
        for mv in candidates {
            let mut snapshot = arena[0].snapshot.clone();
            snapshot.apply_move(mv, &self.keys);
            let idx = arena.len();
            arena.push(MctsNode::new(snapshot, Some(mv.clone()), Some(0), player.opponent()));
            arena[0].children.push(idx);
        }
        arena[0].expanded = true;
        arena[0].terminal = false;

        while result.iterations < self.config.iterations {
            let leaf = self.select(&arena);
            let leaf = match self.expand(&mut arena, leaf) {
                Ok(leaf) => leaf,
                Err(ArenaFull) => {
                    log::warn!(
                        "mcts: node allocation failed after {} iterations; stopping early",
                        result.iterations
                    );
                    result.aborted = true;
                    break;
                }
            };
            let perspective = arena[leaf].to_move.opponent();
            let reward = self.rollout(&arena[leaf].snapshot, arena[leaf].to_move, perspective);
            backpropagate(&mut arena, leaf, reward);
            result.iterations += 1;

            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
        }

        // Robust child: most visits, first one on ties
        let mut best = arena[0].children[0];
        for &child in &arena[0].children[1..] {
            if arena[child].visits > arena[best].visits {
                best = child;
            }
        }
        let node = &arena[best];
        if node.visits > 0 {
            result.best_move = node.mv.clone();
            result.visits = node.visits;
            result.win_rate = node.reward / f64::from(node.visits);
        }
        result.nodes = arena.len();

        log::debug!(
            "mcts {player}: {} iterations, {} nodes, best {:?} ({} visits, {:.3}) in {:?}",
            result.iterations,
            result.nodes,
            result.best_move.as_ref().map(ToString::to_string),
            result.visits,
            result.win_rate,
            start.elapsed()
        );
        result
    }

    /// Descend from the root while nodes are fully expanded.
    fn select(&self, arena: &[MctsNode]) -> usize {
        let mut current = 0;
        loop {
            let node = &arena[current];
            if node.terminal || !node.is_fully_expanded() || node.children.is_empty() {
                return current;
            }
            let mut best = node.children[0];
            let mut best_score = f64::NEG_INFINITY;
            for &child in &node.children {
                let score = arena[child].ucb1(node.visits, self.config.exploration);
                if score > best_score {
                    best_score = score;
                    best = child;
                }
            }
            current = best;
        }
    }

    /// Materialize children on first call and return the next unvisited
    /// one. Terminal and childless nodes are returned as-is.
    fn expand(&self, arena: &mut Vec<MctsNode>, idx: usize) -> Result<usize, ArenaFull> {
        if arena[idx].terminal {
            return Ok(idx);
        }
        if !arena[idx].expanded {
            let to_move = arena[idx].to_move;
            let moves = generate_moves(&arena[idx].snapshot, to_move);
            arena.try_reserve(moves.len()).map_err(|_| ArenaFull)?;
            let mut children = Vec::new();
            children.try_reserve(moves.len()).map_err(|_| ArenaFull)?;
            for mv in moves {
                let mut snapshot = arena[idx].snapshot.clone();
                snapshot.apply_move(&mv, &self.keys);
                children.push(arena.len());
                arena.push(MctsNode::new(snapshot, Some(mv), Some(idx), to_move.opponent()));
            }
            let node = &mut arena[idx];
            node.children = children;
            node.expanded = true;
        }

        let node = &mut arena[idx];
        match node.children.get(node.next_unvisited) {
            Some(&child) => {
                node.next_unvisited += 1;
                Ok(child)
            }
            None => Ok(idx),
        }
    }

    /// Random playout from `snapshot` with `to_move` to play; returns the
    /// reward for `perspective` in `[0, 1]`.
    fn rollout(&mut self, snapshot: &BoardSnapshot, to_move: Player, perspective: Player) -> f64 {
        let mut snap = snapshot.clone();
        let mut mover = to_move;

        for _ in 0..self.config.rollout_depth {
            if snap.piece_count(Player::White) == 0 || snap.piece_count(Player::Black) == 0 {
                break;
            }
            let moves = generate_pseudo_moves(&snap, mover);
            if moves.is_empty() {
                break;
            }
            let captures: Vec<&Move> = moves.iter().filter(|m| m.is_capture()).collect();
            let pick = if !captures.is_empty() && self.rng.random_bool(CAPTURE_BIAS) {
                captures[self.rng.random_range(0..captures.len())]
            } else {
                &moves[self.rng.random_range(0..moves.len())]
            };
            snap.apply_move(pick, &self.keys);
            mover = mover.opponent();
        }

        rollout_reward(&snap, perspective)
    }
}

/// 1 for a win, 0 for a loss, otherwise 0.5 shifted by material share.
fn rollout_reward(snapshot: &BoardSnapshot, perspective: Player) -> f64 {
    match check_game_over(snapshot) {
        GameOutcome::Winner(winner) if winner == perspective => 1.0,
        GameOutcome::Winner(_) => 0.0,
        GameOutcome::Draw => 0.5,
        GameOutcome::Ongoing => {
            let mine = f64::from(snapshot.piece_count(perspective));
            let theirs = f64::from(snapshot.piece_count(perspective.opponent()));
            let total = mine + theirs;
            if total == 0.0 {
                0.5
            } else {
                0.5 + 0.5 * (mine - theirs) / total
            }
        }
    }
}

/// Add `reward` along the path to the root, flipping it at each level.
fn backpropagate(arena: &mut [MctsNode], leaf: usize, mut reward: f64) {
    let mut current = Some(leaf);
    while let Some(idx) = current {
        let node = &mut arena[idx];
        node.visits += 1;
        node.reward += reward;
        reward = 1.0 - reward;
        current = node.parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;

    fn config(iterations: u32, seed: u64) -> MctsConfig {
        MctsConfig {
            iterations,
            seed,
            ..MctsConfig::default()
        }
    }

    #[test]
    fn test_mcts_opening_move_is_legal() {
        let board = Board::standard();
        let mut mcts = MctsSearcher::new(config(300, 1), ZobristKeys::default());

        let result = mcts.search(&board, Player::White);
        let best = result.best_move.unwrap();
        assert!(generate_moves(&board, Player::White).contains(&best));
        assert_eq!(result.iterations, 300);
        assert!(result.visits > 0);
        assert!((0.0..=1.0).contains(&result.win_rate));
        assert!(!result.aborted);
    }

    #[test]
    fn test_mcts_deterministic_with_seed() {
        let board = Board::standard();
        let a = MctsSearcher::new(config(400, 42), ZobristKeys::default())
            .search(&board, Player::Black);
        let b = MctsSearcher::new(config(400, 42), ZobristKeys::default())
            .search(&board, Player::Black);

        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.visits, b.visits);
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.win_rate, b.win_rate);
    }

    #[test]
    fn test_mcts_single_candidate_short_circuits() {
        let mut board = Board::new();
        board.place_piece(Pos::new(2, 2), Player::White);
        board.place_piece(Pos::new(2, 4), Player::Black);
        let mut mcts = MctsSearcher::new(config(1000, 3), ZobristKeys::default());

        let result = mcts.search(&board, Player::White);
        assert!(result.best_move.unwrap().same_step(Pos::new(2, 2), Pos::new(2, 3)));
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_mcts_no_candidates() {
        let mut mcts = MctsSearcher::new(config(10, 3), ZobristKeys::default());
        let result = mcts.search_candidates(&Board::standard(), Player::White, &[], None);
        assert!(result.best_move.is_none());
    }

    #[test]
    fn test_mcts_prefers_winning_capture() {
        let mut board = Board::new();
        // c3 -> d3 takes both black pieces; e1 -> e2 takes only e3
        board.place_piece(Pos::new(2, 2), Player::White);
        board.place_piece(Pos::new(0, 4), Player::White);
        board.place_piece(Pos::new(2, 4), Player::Black);
        board.place_piece(Pos::new(2, 5), Player::Black);

        let moves = generate_moves(&board, Player::White);
        assert_eq!(moves.len(), 2);

        let mut mcts = MctsSearcher::new(config(500, 9), ZobristKeys::default());
        let result = mcts.search(&board, Player::White);
        let best = result.best_move.unwrap();
        assert!(best.same_step(Pos::new(2, 2), Pos::new(2, 3)));
        assert_eq!(result.win_rate, 1.0);
    }

    #[test]
    fn test_mcts_zero_time_limit_runs_one_iteration() {
        let board = Board::standard();
        let candidates = generate_moves(&board, Player::White);
        let mut mcts = MctsSearcher::new(config(1000, 5), ZobristKeys::default());

        let result =
            mcts.search_candidates(&board, Player::White, &candidates, Some(Duration::ZERO));
        assert_eq!(result.iterations, 1);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn test_rollout_reward_bounds() {
        let keys = ZobristKeys::default();
        let snap = to_snapshot(&Board::standard(), &keys);
        assert_eq!(rollout_reward(&snap, Player::White), 0.5);

        let mut board = Board::new();
        board.place_piece(Pos::new(2, 4), Player::White);
        let won = to_snapshot(&board, &keys);
        assert_eq!(rollout_reward(&won, Player::White), 1.0);
        assert_eq!(rollout_reward(&won, Player::Black), 0.0);
    }

    #[test]
    fn test_backpropagate_flips_reward() {
        let keys = ZobristKeys::default();
        let snap = to_snapshot(&Board::standard(), &keys);
        let mut arena = vec![
            MctsNode::new(snap.clone(), None, None, Player::White),
            MctsNode::new(snap.clone(), None, Some(0), Player::Black),
            MctsNode::new(snap, None, Some(1), Player::White),
        ];

        backpropagate(&mut arena, 2, 0.75);
        assert_eq!(arena[2].reward, 0.75);
        assert_eq!(arena[1].reward, 0.25);
        assert_eq!(arena[0].reward, 0.75);
        assert!(arena.iter().all(|n| n.visits == 1));
    }

    #[test]
    fn test_ucb1_unvisited_first() {
        let keys = ZobristKeys::default();
        let snap = to_snapshot(&Board::standard(), &keys);
        let mut node = MctsNode::new(snap, None, None, Player::White);
        assert_eq!(node.ucb1(10, 1.4), f64::INFINITY);

        node.visits = 4;
        node.reward = 2.0;
        let expected = 0.5 + 1.4 * (10f64.ln() / 4.0).sqrt();
        assert!((node.ucb1(10, 1.4) - expected).abs() < 1e-12);
    }
}
