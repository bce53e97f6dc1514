//! The boundary between the game core and whatever shows it and feeds it keys.

use crate::error::Result;
use crate::snake::Direction;
use crate::tile::TileKind;
use crate::Coords;

/// A player gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Pause,
    Quit,
}

/// Mirrors the logical grid and the side panels. Drawing the same tile
/// twice must be harmless.
pub trait Display {
    fn draw_tile(&mut self, pos: Coords, tile: TileKind) -> Result<()>;

    fn report_score(&mut self, score: i32) -> Result<()>;

    fn report_mission(&mut self, stage: usize, text: &str) -> Result<()>;

    /// Shows a centered message box over the board.
    fn show_message(&mut self, lines: &[&str]) -> Result<()>;

    fn hide_message(&mut self) -> Result<()>;

    /// Clears everything drawn so far, for a new stage.
    fn clear(&mut self) -> Result<()>;

    /// Makes queued drawing visible.
    fn present(&mut self) -> Result<()>;
}

pub trait InputSource {
    /// Next pending gesture, without blocking.
    fn poll_command(&mut self) -> Result<Option<Command>>;

    /// Blocks until the player advances (`true`) or quits (`false`).
    fn wait_for_advance(&mut self) -> Result<bool>;
}
