//! One stage of play: the board, the snake on it, and the per-tick update.

use std::iter;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::grid::Grid;
use crate::hazards::{HazardKind, HazardRegistry};
use crate::snake::{Direction, Snake};
use crate::stage::{Layout, MissionKind, RunState, StageStatus};
use crate::tile::TileKind;
use crate::Coords;

pub const INITIAL_LENGTH: usize = 3;
pub const SPAWN_HEAD: Coords = (3, 5);
pub const MIN_LENGTH: usize = 3;
pub const LENGTH_CAP: usize = 20;
pub const GATE_MIN_LENGTH: usize = 5;
pub const GROWTH_ITEMS: usize = 4;
pub const POISON_ITEMS: usize = 2;
pub const GROWTH_SCORE: i32 = 10;
pub const POISON_PENALTY: i32 = 5;
pub const GATE_SCORE: i32 = 5;

/// What the snake ran into on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Moved,
    Grew,
    Poisoned,
    Teleported { exit: Coords },
    /// Wall, body or off the board, including what lies past a gate's exit.
    Fatal(Option<TileKind>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub collision: Collision,
    pub status: StageStatus,
}

pub struct Stage {
    index: usize,
    layout: Layout,
    grid: Grid,
    snake: Snake,
    hazards: HazardRegistry,
}

impl Stage {
    /// Fresh board for stage `index`: layout, a 3-piece snake heading
    /// right, and the full set of growth and poison items.
    pub fn new<R: Rng + ?Sized>(index: usize, config: &GameConfig, rng: &mut R) -> Result<Self> {
        let layout = Layout::for_stage(index);
        let mut grid = Grid::new(config.rows, config.cols);
        layout.paint(&mut grid)?;

        let snake = Snake::new(SPAWN_HEAD, INITIAL_LENGTH, Direction::Right);
        for pos in snake.body() {
            if grid.tile(*pos) != Some(TileKind::Empty) {
                return Err(GameError::Config(format!(
                    "starting snake at {:?} overlaps {:?}",
                    pos,
                    grid.tile(*pos)
                )));
            }
            grid.set(*pos, TileKind::SnakeBody)?;
        }

        let mut hazards = HazardRegistry::new(config.max_placement_attempts);
        hazards.populate(&mut grid, rng, GROWTH_ITEMS, POISON_ITEMS)?;

        info!(stage = index + 1, ?layout, "stage ready");
        Ok(Stage { index, layout, grid, snake, hazards })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn hazards(&self) -> &HazardRegistry {
        &self.hazards
    }

    /// Tiles changed since the last call, for the display.
    pub fn take_dirty(&mut self) -> Vec<Coords> {
        self.grid.take_dirty()
    }

    /// Advances the stage by one step and updates `run` with the score,
    /// mission progress and the stage status.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        run: &mut RunState,
        turn: Option<Direction>,
        rng: &mut R,
    ) -> Result<TickReport> {
        if let Some(dir) = turn {
            self.snake.set_heading(dir);
        }

        let next = self.snake.next_head().ok_or(GameError::EmptySnake)?;
        let collision = self.resolve(next, run, rng)?;

        if let Collision::Fatal(tile) = collision {
            info!(stage = self.index + 1, ?next, ?tile, "snake crashed");
            run.set_status(StageStatus::Failed);
            return Ok(TickReport { collision, status: StageStatus::Failed });
        }

        if self.snake.len() < MIN_LENGTH || run.score < 0 {
            info!(stage = self.index + 1, len = self.snake.len(), score = run.score, "stage failed");
            run.set_status(StageStatus::Failed);
            return Ok(TickReport { collision, status: StageStatus::Failed });
        }

        if self.hazards.traversal_done() {
            self.hazards.close_gates(&mut self.grid, self.layout)?;
            run.mission_mut().record(MissionKind::Gates);
        }

        self.hazards.age(&mut self.grid, rng)?;

        if self.hazards.gates().is_none() && self.snake.len() >= GATE_MIN_LENGTH {
            match self.hazards.open_gates(&mut self.grid, rng) {
                Ok(_) => {}
                Err(GameError::SamplingExhausted { attempts }) => {
                    warn!(attempts, "no room for gates, retrying next tick");
                }
                Err(e) => return Err(e),
            }
        }

        if run.mission().is_met(self.snake.len()) {
            info!(stage = self.index + 1, score = run.score, "stage completed");
            run.set_status(StageStatus::Completed);
        }

        Ok(TickReport { collision, status: run.status() })
    }

    fn resolve<R: Rng + ?Sized>(
        &mut self,
        next: Coords,
        run: &mut RunState,
        rng: &mut R,
    ) -> Result<Collision> {
        match self.grid.tile(next) {
            Some(TileKind::Empty) => {
                self.retract_tail()?;
                self.extend_head(next)?;
                self.hazards.advance_traversal(1);
                Ok(Collision::Moved)
            }
            Some(TileKind::Growth) => {
                self.hazards.consume(HazardKind::Growth, next, &mut self.grid, rng)?;
                run.score += GROWTH_SCORE;

                if self.snake.len() >= LENGTH_CAP {
                    self.retract_tail()?;
                }
                self.extend_head(next)?;

                run.mission_mut().record(MissionKind::Growth);
                Ok(Collision::Grew)
            }
            Some(TileKind::Poison) => {
                // The head stays where it is; only the tail goes.
                self.hazards.consume(HazardKind::Poison, next, &mut self.grid, rng)?;
                self.grid.set(next, TileKind::Empty)?;
                run.score -= POISON_PENALTY;

                self.retract_tail()?;
                self.hazards.advance_traversal(2);

                run.mission_mut().record(MissionKind::Poison);
                Ok(Collision::Poisoned)
            }
            Some(TileKind::Gate) => self.teleport(next, run, rng),
            other => Ok(Collision::Fatal(other)),
        }
    }

    fn teleport<R: Rng + ?Sized>(
        &mut self,
        entry: Coords,
        run: &mut RunState,
        rng: &mut R,
    ) -> Result<Collision> {
        let Some(pair) = self.hazards.gates() else {
            return Ok(Collision::Fatal(Some(TileKind::Gate)));
        };

        let exit = pair.exit_for(entry);
        let directions = self.exit_directions(exit);
        let Some((dir, landing)) = self.exit_landing(exit, &directions) else {
            let blocked = directions.first().and_then(|d| self.grid.tile(d.step(exit)));
            return Ok(Collision::Fatal(blocked));
        };

        // An item next to the exit is knocked elsewhere, not eaten
        if let Some(kind) = self.grid.tile(landing).and_then(HazardKind::from_tile) {
            self.hazards.consume(kind, landing, &mut self.grid, rng)?;
        }

        self.snake.set_heading(dir);
        run.score += GATE_SCORE;
        self.retract_tail()?;
        self.extend_head(landing)?;
        self.hazards.begin_traversal(self.snake.len());

        debug!(?entry, ?landing, heading = ?dir, "teleported");
        Ok(Collision::Teleported { exit: landing })
    }

    /// Directions the head may leave gate `exit` in, best first.
    ///
    /// A gate on the border always pushes the snake inward. Elsewhere the
    /// current heading is tried first, then the others clockwise, which can
    /// turn the snake right around.
    fn exit_directions(&self, exit: Coords) -> Vec<Direction> {
        let (rows, cols) = self.grid.size();

        let forced = if exit.1 == 0 {
            Some(Direction::Right)
        } else if exit.1 == cols - 1 {
            Some(Direction::Left)
        } else if exit.0 == 0 {
            Some(Direction::Down)
        } else if exit.0 == rows - 1 {
            Some(Direction::Up)
        } else {
            None
        };

        match forced {
            Some(dir) => vec![dir],
            None => iter::successors(Some(self.snake.heading()), |d| Some(d.clockwise()))
                .take(4)
                .collect(),
        }
    }

    /// First Empty tile next to `exit` along `directions`, else the first
    /// one holding an item. Walls, body and gates are never landed on.
    fn exit_landing(&self, exit: Coords, directions: &[Direction]) -> Option<(Direction, Coords)> {
        let tile_in = |dir: Direction| self.grid.tile(dir.step(exit));

        directions
            .iter()
            .find(|d| tile_in(**d) == Some(TileKind::Empty))
            .or_else(|| {
                directions
                    .iter()
                    .find(|d| tile_in(**d).and_then(HazardKind::from_tile).is_some())
            })
            .map(|d| (*d, d.step(exit)))
    }

    fn retract_tail(&mut self) -> Result<()> {
        let tail = self.snake.remove_piece()?;
        self.grid.set(tail, TileKind::Empty)
    }

    fn extend_head(&mut self, pos: Coords) -> Result<()> {
        self.grid.set(pos, TileKind::SnakeBody)?;
        self.snake.add_piece(pos);
        Ok(())
    }
}
