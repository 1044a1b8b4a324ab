//! High score leaderboard
//!
//! Top 10 runs, persisted to LocalStorage in the browser and to a JSON file
//! natively.

use serde::{Deserialize, Serialize};

use crate::sim::GameState;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// How long the player lasted
    pub survived_ms: f64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Leaderboard, best first. Ties go to the longer survival.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "dino_dodge_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Index a run would be inserted at, if it makes the board
    fn slot_for(&self, score: u64, survived_ms: f64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let slot = self
            .entries
            .partition_point(|e| (e.score, e.survived_ms) >= (score, survived_ms));
        (slot < MAX_HIGH_SCORES).then_some(slot)
    }

    /// Rank (1-indexed) a run would get, if any
    pub fn potential_rank(&self, score: u64, survived_ms: f64) -> Option<usize> {
        self.slot_for(score, survived_ms).map(|slot| slot + 1)
    }

    /// Record a run. Returns its rank (1-indexed) if it made the board.
    pub fn add_score(&mut self, score: u64, survived_ms: f64, timestamp: f64) -> Option<usize> {
        let slot = self.slot_for(score, survived_ms)?;
        self.entries.insert(
            slot,
            HighScoreEntry {
                score,
                survived_ms,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    /// Record a finished run straight from the game state
    pub fn record(&mut self, state: &GameState, timestamp: f64) -> Option<usize> {
        let survived_ms = state.died_at_ms.unwrap_or(state.time_ms);
        let rank = self.add_score(state.score, survived_ms, timestamp);
        if let Some(rank) = rank {
            log::info!("New high score #{}: {}", rank, state.score);
        }
        rank
    }

    /// Restore best-first order and the cap after loading from storage
    fn normalized(mut self) -> Self {
        self.entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.survived_ms.total_cmp(&a.survived_ms))
        });
        self.entries.truncate(MAX_HIGH_SCORES);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let loaded = storage
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten())
            .and_then(|json| serde_json::from_str::<HighScores>(&json).ok());

        match loaded {
            Some(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores.normalized()
            }
            None => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Load high scores from a JSON file; a missing or corrupt file starts fresh
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(json) => match serde_json::from_str::<HighScores>(&json) {
                Ok(scores) => scores.normalized(),
                Err(e) => {
                    log::warn!("Ignoring corrupt high score file: {}", e);
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
