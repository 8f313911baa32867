//! Self-play command - pit two engines against each other
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_config(), play_game(), report_result()
//! - Level 3: build_engine(), game loop bookkeeping
//! - Level 4: formatting utilities

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use hive_core::{Color, Engine, Game, GameResult, MinimaxAI, Move, SearchConfig};
use hive_mcts::{MctsConfig, MctsPlayer};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Which engine plays a side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Minimax,
    Mcts,
}

#[derive(Args)]
pub struct SelfPlayArgs {
    /// Engine playing Black
    #[arg(long, value_enum)]
    pub black: Option<EngineKind>,

    /// Engine playing White
    #[arg(long, value_enum)]
    pub white: Option<EngineKind>,

    /// Thinking time per move in milliseconds (overrides both engine configs)
    #[arg(long)]
    pub budget_ms: Option<u64>,

    /// Stop after this many plies and call it unfinished
    #[arg(long)]
    pub max_plies: Option<u32>,

    /// Self-play configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start from the spider/ant opening instead of the empty board
    #[arg(long)]
    pub opening: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything a self-play game needs, loadable from JSON
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfPlayConfig {
    pub black: EngineKind,
    pub white: EngineKind,
    pub max_plies: u32,
    pub opening: bool,
    pub search: SearchConfig,
    pub mcts: MctsConfig,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            black: EngineKind::Minimax,
            white: EngineKind::Mcts,
            max_plies: 200,
            opening: false,
            search: SearchConfig { time_budget_ms: 1_000, ..SearchConfig::default() },
            mcts: MctsConfig { time_budget_ms: 1_000, ..MctsConfig::default() },
        }
    }
}

impl SelfPlayConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading self-play config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing self-play config {}", path.display()))?;
        Ok(config)
    }

    #[cfg(test)]
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing self-play config {}", path.display()))?;
        Ok(())
    }

    fn engine(&self, color: Color) -> EngineKind {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }
}

/// Result of one game
#[derive(Clone, Debug)]
struct GameRecord {
    result: GameResult,
    plies: u32,
    /// `None` marks a pass
    moves: Vec<Option<Move>>,
    elapsed: Duration,
}

// ============================================================================
// MAIN ENTRY POINT (Level 1 - Orchestration)
// ============================================================================

/// Run the self-play command
pub fn run(args: SelfPlayArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(&args, seed)?;

    info!(
        "self-play: white {:?} vs black {:?}, max {} plies",
        config.white, config.black, config.max_plies
    );

    let record = play_game(&config);
    report_result(&config, &record, args.json)
}

// ============================================================================
// CONFIGURATION (Level 2)
// ============================================================================

/// File config first, then command-line overrides
fn load_config(args: &SelfPlayArgs, seed: Option<u64>) -> Result<SelfPlayConfig> {
    let mut config = match &args.config {
        Some(path) => SelfPlayConfig::load(path)?,
        None => SelfPlayConfig::default(),
    };

    if let Some(kind) = args.black {
        config.black = kind;
    }
    if let Some(kind) = args.white {
        config.white = kind;
    }
    if let Some(ms) = args.budget_ms {
        config.search.time_budget_ms = ms;
        config.mcts.time_budget_ms = ms;
    }
    if let Some(plies) = args.max_plies {
        config.max_plies = plies;
    }
    if let Some(seed) = seed {
        config.search.seed = seed;
        config.mcts.seed = seed;
    }
    config.opening |= args.opening;

    Ok(config)
}

// ============================================================================
// GAME PLAYING (Level 2/3)
// ============================================================================

/// Play one game to completion or the ply cap
fn play_game(config: &SelfPlayConfig) -> GameRecord {
    let start = Instant::now();
    let mut game = if config.opening { Game::with_opening(true) } else { Game::new() };
    let mut white = build_engine(config, Color::White);
    let mut black = build_engine(config, Color::Black);
    let mut moves = Vec::new();
    let mut passes = 0;

    while !game.result().is_over() && game.ply() < config.max_plies && passes < 2 {
        let color = game.to_move();
        let (engine, budget) = match color {
            Color::White => (&mut white, budget_for(config, Color::White)),
            Color::Black => (&mut black, budget_for(config, Color::Black)),
        };

        let mv = game.compute_ai_move(engine.as_mut(), budget);
        passes = if mv.is_some() { 0 } else { passes + 1 };
        moves.push(mv);
        debug!("after ply {}:\n{}", game.ply(), game.board());
    }

    let result = if passes >= 2 && !game.result().is_over() { GameResult::Draw } else { game.result() };

    GameRecord { result, plies: game.ply(), moves, elapsed: start.elapsed() }
}

/// Create the engine for one side; sides get distinct seeds
fn build_engine(config: &SelfPlayConfig, color: Color) -> Box<dyn Engine> {
    let offset = color.index() as u64;
    match config.engine(color) {
        EngineKind::Minimax => Box::new(MinimaxAI::new(SearchConfig {
            seed: config.search.seed.wrapping_add(offset),
            ..config.search.clone()
        })),
        EngineKind::Mcts => Box::new(MctsPlayer::new(MctsConfig {
            seed: config.mcts.seed.wrapping_add(offset),
            ..config.mcts.clone()
        })),
    }
}

fn budget_for(config: &SelfPlayConfig, color: Color) -> Duration {
    let ms = match config.engine(color) {
        EngineKind::Minimax => config.search.time_budget_ms,
        EngineKind::Mcts => config.mcts.time_budget_ms,
    };
    Duration::from_millis(ms)
}

// ============================================================================
// RESULTS REPORTING (Level 2)
// ============================================================================

fn report_result(config: &SelfPlayConfig, record: &GameRecord, json: bool) -> Result<()> {
    if json {
        print_json_result(config, record)
    } else {
        print_text_result(config, record);
        Ok(())
    }
}

// ============================================================================
// FORMATTING UTILITIES (Level 4)
// ============================================================================

fn result_label(result: GameResult) -> &'static str {
    match result {
        GameResult::Ongoing => "unfinished",
        GameResult::BlackWins => "black wins",
        GameResult::WhiteWins => "white wins",
        GameResult::Draw => "draw",
    }
}

fn move_label(mv: &Option<Move>) -> String {
    mv.map_or_else(|| "pass".to_string(), |m| m.to_string())
}

fn print_json_result(config: &SelfPlayConfig, record: &GameRecord) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        white: EngineKind,
        black: EngineKind,
        result: &'static str,
        winner: Option<String>,
        plies: u32,
        elapsed_ms: u128,
        moves: Vec<String>,
        config: &'a SelfPlayConfig,
    }

    let output = JsonOutput {
        white: config.white,
        black: config.black,
        result: result_label(record.result),
        winner: record.result.winner().map(|c| c.to_string()),
        plies: record.plies,
        elapsed_ms: record.elapsed.as_millis(),
        moves: record.moves.iter().map(move_label).collect(),
        config,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text_result(config: &SelfPlayConfig, record: &GameRecord) {
    println!("\n=== Self-Play Result ===");
    println!("White: {:?}", config.white);
    println!("Black: {:?}", config.black);
    println!();

    for (ply, mv) in record.moves.iter().enumerate() {
        let color = if ply % 2 == 0 { "white" } else { "black" };
        println!("{:>4}. {:<5} {}", ply + 1, color, move_label(mv));
    }

    println!();
    println!("Result: {}", result_label(record.result));
    println!("Plies:  {}", record.plies);
    println!("Time:   {:.1}s", record.elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SelfPlayArgs {
        SelfPlayArgs {
            black: None,
            white: None,
            budget_ms: None,
            max_plies: None,
            config: None,
            opening: false,
            json: false,
        }
    }

    #[test]
    fn test_config_partial_json() {
        let config: SelfPlayConfig = serde_json::from_str(r#"{"black": "mcts", "max_plies": 40}"#).unwrap();
        assert_eq!(config.black, EngineKind::Mcts);
        assert_eq!(config.white, EngineKind::Mcts);
        assert_eq!(config.max_plies, 40);
        assert_eq!(config.search.max_depth, 32);
    }

    #[test]
    fn test_command_line_overrides_file() {
        let path = std::env::temp_dir().join(format!("hive_selfplay_{}.json", std::process::id()));
        let file = SelfPlayConfig { max_plies: 10, ..SelfPlayConfig::default() };
        file.save(&path).unwrap();

        let args = SelfPlayArgs {
            white: Some(EngineKind::Minimax),
            budget_ms: Some(25),
            config: Some(path.clone()),
            ..args()
        };
        let config = load_config(&args, Some(99)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.max_plies, 10);
        assert_eq!(config.white, EngineKind::Minimax);
        assert_eq!(config.search.time_budget_ms, 25);
        assert_eq!(config.mcts.time_budget_ms, 25);
        assert_eq!(config.mcts.seed, 99);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = SelfPlayArgs { config: Some(PathBuf::from("/nonexistent/hive.json")), ..args() };
        assert!(load_config(&args, None).is_err());
    }

    #[test]
    fn test_short_game_respects_ply_cap() {
        let config = SelfPlayConfig {
            max_plies: 4,
            search: SearchConfig { time_budget_ms: 5, ..SearchConfig::default() },
            mcts: MctsConfig { time_budget_ms: 5, iterations_per_check: 2, rollout_depth: 6, ..MctsConfig::default() },
            ..SelfPlayConfig::default()
        };
        let record = play_game(&config);
        assert_eq!(record.plies, 4);
        assert_eq!(record.moves.len(), 4);
        assert_eq!(record.result, GameResult::Ongoing);
        assert!(record.moves.iter().all(|m| m.is_some()));
        assert!(record.moves[0].unwrap().is_placement());
    }
}
