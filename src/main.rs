use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use xiangqi_core::engine::config::{Difficulty, EngineConfig};
use xiangqi_core::engine::search::AlphaBetaEngine;
use xiangqi_core::engine::Searcher;
use xiangqi_core::logic::board::{Board, Color};
use xiangqi_core::logic::generator::{GameOutcome, MoveGenerator};
use xiangqi_core::worker::{error_reply, handle_json};

#[derive(Parser)]
#[command(name = "xiangqi")]
#[command(about = "Xiangqi rules and search engine", long_about = None)]
struct Cli {
    /// Engine configuration (JSON). Piece values are read as scale factors.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the legal moves of the side to move
    Moves {
        #[arg(long)]
        fen: String,
    },

    /// Search the best move for the side to move
    Best {
        #[arg(long)]
        fen: String,

        /// Search depth in plies; overrides --difficulty
        #[arg(long)]
        depth: Option<u8>,

        #[arg(long, value_enum)]
        difficulty: Option<Level>,

        /// Print the response in the worker's JSON format
        #[arg(long)]
        json: bool,
    },

    /// Answer `findBestMove` requests from stdin, one JSON object per line
    Serve,
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    Easy,
    Medium,
    Hard,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => Self::Easy,
            Level::Medium => Self::Medium,
            Level::Hard => Self::Hard,
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Arc::new(load_config(cli.config.as_deref())?);

    match cli.command {
        Commands::Moves { fen } => list_moves(&fen),
        Commands::Best {
            fen,
            depth,
            difficulty,
            json,
        } => {
            let depth = depth
                .or_else(|| difficulty.map(|level| Difficulty::from(level).depth()))
                .unwrap_or(config.default_depth);
            best_move(&fen, depth, json, config)
        }
        Commands::Serve => serve(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = EngineConfig::load_from_json(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!("loaded engine config from {}", path.display());
    Ok(config)
}

fn parse_fen(fen: &str) -> Result<(Board, Color)> {
    Board::from_fen(fen).with_context(|| format!("invalid FEN {fen:?}"))
}

fn list_moves(fen: &str) -> Result<()> {
    let (board, turn) = parse_fen(fen)?;
    let moves = MoveGenerator::new().generate_moves(&board, turn);
    println!("Legal moves for {turn:?} ({}):", moves.len());
    for mv in &moves {
        println!("  {mv}");
    }
    Ok(())
}

fn best_move(fen: &str, depth: u8, json: bool, config: Arc<EngineConfig>) -> Result<()> {
    if depth == 0 {
        bail!("search depth must be at least 1");
    }
    let (board, turn) = parse_fen(fen)?;

    if json {
        let request = serde_json::json!({
            "command": "findBestMove",
            "board": board,
            "depth": depth,
            "side": turn,
        });
        println!("{}", handle_json(&request.to_string(), &config)?);
        return Ok(());
    }

    match MoveGenerator::new().game_outcome(&board, turn) {
        GameOutcome::Checkmate { winner } => {
            println!("{turn:?} is checkmated, {winner:?} wins");
            return Ok(());
        }
        GameOutcome::Stalemate => {
            println!("{turn:?} has no legal move (stalemate)");
            return Ok(());
        }
        GameOutcome::Ongoing => {}
    }

    let mut engine = AlphaBetaEngine::new(config);
    let Some((mv, stats)) = engine.search(&board, turn, depth) else {
        bail!("search returned no move");
    };
    println!("Best move for {turn:?}: {mv}");
    println!(
        "Stats: depth={}, nodes={}, time={}ms",
        stats.depth, stats.nodes, stats.time_ms
    );
    Ok(())
}

fn serve(config: &Arc<EngineConfig>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("reading request")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match handle_json(line, config) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("bad request: {e}");
                error_reply(&e)
            }
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}
