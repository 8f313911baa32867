//! Perft command - move generator smoke test and benchmark

use std::time::Instant;

use anyhow::{ensure, Result};
use clap::Args;

use hive_core::{perft, Game};

#[derive(Args)]
pub struct PerftArgs {
    /// Deepest ply to count
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Start from the spider/ant opening instead of the empty board
    #[arg(long)]
    pub opening: bool,
}

/// Count leaves at every depth up to `args.depth`
pub fn run(args: PerftArgs) -> Result<()> {
    ensure!(args.depth > 0, "perft depth must be at least 1");

    let game = if args.opening { Game::with_opening(true) } else { Game::new() };
    let mut board = game.board().clone();
    let color = game.to_move();

    tracing::info!("perft from {} position, {} to move", if args.opening { "opening" } else { "empty" }, color);

    for depth in 1..=args.depth {
        let start = Instant::now();
        let leaves = perft(&mut board, color, depth);
        let elapsed = start.elapsed();
        let rate = leaves as f64 / elapsed.as_secs_f64().max(1e-9);
        println!("depth {:>2}: {:>12} leaves  {:>10.3?}  ({:.0} leaves/s)", depth, leaves, elapsed, rate);
    }

    ensure!(&board == game.board(), "perft left the board modified");
    Ok(())
}
