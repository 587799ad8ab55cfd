//! Fanorona self-play driver
//!
//! Pits two engines against each other and optionally trains a Markov
//! model from the finished game.
//!
//! ## Usage
//!
//! - `fanorona` - minimax (White) against MCTS (Black)
//! - `fanorona --white markov --black hybrid --model book.bin --learn`
//! - `RUST_LOG=debug fanorona` - per-search details

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use fanorona::game::DEFAULT_TURN_LIMIT;
use fanorona::search::zobrist::DEFAULT_SEED;
use fanorona::{AiEngine, Difficulty, EngineConfig, Game, GameOutcome, Player, StrategyKind};

/// Fanorona engine self-play
#[derive(Parser, Debug)]
#[command(name = "fanorona")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Strategy for White: minimax, mcts, markov or hybrid
    #[arg(long, default_value = "minimax")]
    white: StrategyKind,

    /// Strategy for Black: minimax, mcts, markov or hybrid
    #[arg(long, default_value = "mcts")]
    black: StrategyKind,

    /// Difficulty for both sides: easy, medium or hard
    #[arg(short, long, default_value = "easy")]
    difficulty: Difficulty,

    /// Seed for hashing keys and MCTS playouts
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Plies before the game is declared drawn
    #[arg(long, default_value_t = DEFAULT_TURN_LIMIT)]
    turn_limit: u32,

    /// Per-move time limit in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Markov model file, loaded if it exists
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Learn from the finished game and save the model to --model
    #[arg(long)]
    learn: bool,

    /// Do not print the board after each turn
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn engine(&self, player: Player) -> AiEngine {
        let (kind, seed) = match player {
            Player::White => (self.white, self.seed),
            Player::Black => (self.black, self.seed.wrapping_add(1)),
        };
        let config = EngineConfig {
            seed,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            ..EngineConfig::for_difficulty(self.difficulty)
        };
        AiEngine::with_config(kind, player, config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut white = cli.engine(Player::White);
    let mut black = cli.engine(Player::Black);

    if let Some(path) = cli.model.as_deref().filter(|p| p.exists()) {
        for engine in [&mut white, &mut black] {
            if engine.markov_model().is_some() {
                engine
                    .load_model(path)
                    .with_context(|| format!("loading model for {}", engine.player()))?;
            }
        }
    }

    log::info!(
        "{} ({}) vs {} ({}), {}",
        Player::White,
        cli.white,
        Player::Black,
        cli.black,
        cli.difficulty
    );

    let mut game = Game::with_turn_limit(cli.turn_limit);
    if !cli.quiet {
        println!("{}", game.board());
    }

    while !game.is_over() {
        let player = game.to_move();
        let engine = match player {
            Player::White => &mut white,
            Player::Black => &mut black,
        };

        let result = engine.find_best_move_with_stats(game.board());
        let Some(mv) = result.best_move else {
            bail!("{player} has no move but the game is not over");
        };
        game.play_move(&mv)
            .with_context(|| format!("{player} ({}) chose {mv}", engine.kind()))?;
        log::info!(
            "ply {:3} {player}: {mv} ({:?}, score {:.2}, {} nodes, {}ms)",
            game.plies(),
            result.search_type,
            result.score,
            result.nodes,
            result.time_ms
        );
        if result.fell_back {
            log::warn!("{player}: search result failed validation, played fallback");
        }

        while let Some(next) = engine.find_chain_continuation(game.board(), game.chain()) {
            game.play_move(&next)
                .with_context(|| format!("{player} chain step {next}"))?;
            log::info!("ply {:3} {player}: {next} (chain)", game.plies());
        }
        if game.chain().is_active() {
            game.stop_chain();
        }

        if !cli.quiet {
            println!("{}", game.board());
        }
    }

    match game.outcome() {
        GameOutcome::Winner(winner) => println!("{winner} wins after {} plies", game.plies()),
        GameOutcome::Draw => println!("Draw after {} plies", game.plies()),
        GameOutcome::Ongoing => {}
    }
    for engine in [&white, &black] {
        let stats = engine.tt_stats();
        if stats.size > 0 {
            log::debug!(
                "{} table: {}/{} slots used ({}%)",
                engine.player(),
                stats.used,
                stats.size,
                stats.usage_percent
            );
        }
    }

    if cli.learn {
        let winner = game.outcome().winner();
        let mut learner = [white, black]
            .into_iter()
            .find(|engine| engine.markov_model().is_some())
            .context("--learn needs a markov or hybrid engine")?;
        learner.learn_from_game(game.history(), winner);

        let path = cli.model.as_deref().context("--learn needs --model")?;
        learner
            .save_model(path)
            .with_context(|| format!("saving model to {}", path.display()))?;
        println!("Model saved to {}", path.display());
    }

    Ok(())
}
