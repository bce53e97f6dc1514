use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sim::{INITIAL_LENGTH, SPAWN_HEAD};
use crate::snake::{Direction, Snake};
use crate::stage::Layout;
use crate::tile::TileKind;
use crate::BoardInt;

/// Smallest side length accepted. The starting snake must also clear the
/// partitions, which `validate` checks separately.
pub const MIN_SIDE: BoardInt = 10;

/// Runtime settings. Game rules are fixed; these only shape the board,
/// the pace and the randomness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play-area rows, border included
    pub rows: BoardInt,
    /// Play-area columns, border included
    pub cols: BoardInt,
    /// Pause between two ticks
    pub tick_interval_ms: u64,
    /// Fixed RNG seed; random when absent
    pub seed: Option<u64>,
    /// Give up on a random placement after this many samples
    pub max_placement_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 19,
            cols: 45,
            tick_interval_ms: 500,
            seed: None,
            max_placement_attempts: 10_000,
        }
    }
}

impl GameConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows < MIN_SIDE || self.cols < MIN_SIDE {
            return Err(GameError::Config(format!(
                "play area {}x{} is smaller than {}x{}",
                self.rows, self.cols, MIN_SIDE, MIN_SIDE
            )));
        }

        let size = (self.rows, self.cols);
        let spawn = Snake::new(SPAWN_HEAD, INITIAL_LENGTH, Direction::Right);
        for layout in Layout::ALL {
            if let Some(pos) = spawn.body().find(|pos| layout.tile_at(**pos, size) != TileKind::Empty) {
                return Err(GameError::Config(format!(
                    "play area {}x{} puts a {:?} wall under the starting snake at {:?}",
                    self.rows, self.cols, layout, pos
                )));
            }
        }

        if self.max_placement_attempts == 0 {
            return Err(GameError::Config("max_placement_attempts must be positive".into()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
