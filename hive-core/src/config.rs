//! SearchConfig - tunables for the minimax player

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::eval::Heuristics;

/// Minimax player settings, loadable from JSON
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock budget per move in milliseconds
    pub time_budget_ms: u64,
    /// Deepest iteration iterative deepening may start
    pub max_depth: u32,
    /// RNG seed for move shuffling (fixed default keeps runs reproducible)
    pub seed: u64,
    pub heuristics: Heuristics,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 5_000,
            max_depth: 32,
            seed: 42,
            heuristics: Heuristics::default(),
        }
    }
}

impl SearchConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading search config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing search config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing search config {}", path.display()))?;
        Ok(())
    }
}
