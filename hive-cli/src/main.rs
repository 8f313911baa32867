//! Hive CLI - Command-line interface
//!
//! Commands:
//! - selfplay: Play one AI-vs-AI game from the empty board
//! - perft: Count move-tree leaves to check the move generator

mod perft_cmd;
mod selfplay;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hive")]
#[command(about = "Hive engine: minimax and MCTS players")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an AI-vs-AI game
    Selfplay(selfplay::SelfPlayArgs),
    /// Count leaf positions of the legal move tree
    Perft(perft_cmd::PerftArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Selfplay(args) => selfplay::run(args, cli.seed),
        Commands::Perft(args) => perft_cmd::run(args),
    }
}
