use std::collections::{HashMap, VecDeque};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use stage_snake::config::GameConfig;
use stage_snake::display::{Command, Display, InputSource};
use stage_snake::error::Result;
use stage_snake::game::SnakeGame;
use stage_snake::snake::Direction;
use stage_snake::stage::{Mission, MissionKind, RunState};
use stage_snake::tile::{TileKind, WallKind};
use stage_snake::Coords;

/// Remembers everything the game asked to show.
#[derive(Default)]
struct RecordingDisplay {
    board: HashMap<Coords, TileKind>,
    draws: usize,
    scores: Vec<i32>,
    missions: Vec<(usize, String)>,
    messages: Vec<Vec<String>>,
    hides: usize,
    clears: usize,
}

impl RecordingDisplay {
    fn saw_message(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.iter().any(|line| line == text))
    }
}

impl Display for RecordingDisplay {
    fn draw_tile(&mut self, pos: Coords, tile: TileKind) -> Result<()> {
        self.board.insert(pos, tile);
        self.draws += 1;
        Ok(())
    }

    fn report_score(&mut self, score: i32) -> Result<()> {
        self.scores.push(score);
        Ok(())
    }

    fn report_mission(&mut self, stage: usize, text: &str) -> Result<()> {
        self.missions.push((stage, text.to_string()));
        Ok(())
    }

    fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        self.messages.push(lines.iter().map(|l| l.to_string()).collect());
        Ok(())
    }

    fn hide_message(&mut self) -> Result<()> {
        self.hides += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.board.clear();
        self.clears += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Feeds one batch of commands per tick, then quits once the script runs out.
struct ScriptedInput {
    ticks: VecDeque<Vec<Command>>,
    batch: VecDeque<Command>,
    in_batch: bool,
    advances: VecDeque<bool>,
}

impl ScriptedInput {
    fn new(ticks: Vec<Vec<Command>>, advances: Vec<bool>) -> Self {
        ScriptedInput {
            ticks: ticks.into(),
            batch: VecDeque::new(),
            in_batch: false,
            advances: advances.into(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll_command(&mut self) -> Result<Option<Command>> {
        if !self.in_batch {
            match self.ticks.pop_front() {
                Some(batch) => {
                    self.batch = batch.into();
                    self.in_batch = true;
                }
                None => return Ok(Some(Command::Quit)),
            }
        }

        match self.batch.pop_front() {
            Some(command) => Ok(Some(command)),
            None => {
                self.in_batch = false;
                Ok(None)
            }
        }
    }

    fn wait_for_advance(&mut self) -> Result<bool> {
        Ok(self.advances.pop_front().unwrap_or(true))
    }
}

fn fast_config() -> GameConfig {
    GameConfig { tick_interval_ms: 0, seed: Some(42), ..Default::default() }
}

fn game(ticks: Vec<Vec<Command>>, advances: Vec<bool>) -> SnakeGame<RecordingDisplay, ScriptedInput, ChaCha8Rng> {
    SnakeGame::new(
        RecordingDisplay::default(),
        ScriptedInput::new(ticks, advances),
        ChaCha8Rng::seed_from_u64(42),
        fast_config(),
    )
}

#[test]
fn test_quit_at_first_intro() {
    let mut game = game(vec![], vec![false]);

    let summary = game.play().unwrap();

    assert_eq!(summary.score, 0);
    assert_eq!(summary.completed, vec![false; 4]);
    assert!(!summary.won());
    assert!(game.display().saw_message("Stage 1 will be started!"));
    assert_eq!(game.display().draws, 0);
    assert_eq!(game.display().clears, 1);
}

#[test]
fn test_stage_draws_full_board_first() {
    // One quiet tick, then the script runs out and the game quits
    let mut game = game(vec![vec![]], vec![]);

    game.play().unwrap();

    let display = game.display();
    assert!(display.draws >= 19 * 45);
    assert_eq!(display.board.get(&(0, 0)), Some(&TileKind::Wall(WallKind::Corner)));
    assert_eq!(display.board.get(&(0, 1)), Some(&TileKind::Wall(WallKind::Horizontal)));
    assert_eq!(display.board.get(&(1, 0)), Some(&TileKind::Wall(WallKind::Vertical)));
    assert_eq!(display.scores.first(), Some(&0));
    assert_eq!(display.missions.first().map(|m| m.0), Some(0));
}

#[test]
fn test_display_mirrors_snake_after_ticks() {
    let mut game = game(vec![vec![], vec![]], vec![]);

    game.play().unwrap();

    let display = game.display();
    let snake_tiles = display.board.values().filter(|t| **t == TileKind::SnakeBody).count();
    assert!(snake_tiles >= 2);
    assert!(display.scores.len() >= 2);
}

#[test]
fn test_crash_ends_the_run() {
    let script = vec![vec![Command::Turn(Direction::Up)], vec![], vec![], vec![], vec![]];
    let mut game = game(script, vec![]);

    let summary = game.play().unwrap();

    assert!(!summary.completed[0]);
    assert!(!summary.won());
    assert!(!game.display().saw_message("Stage 2 will be started!"));
    assert_eq!(game.display().scores.last(), Some(&summary.score));
}

#[test]
fn test_pause_shows_and_hides_message() {
    let script = vec![vec![Command::Pause], vec![], vec![Command::Pause], vec![]];
    let mut game = game(script, vec![]);

    game.play().unwrap();

    let display = game.display();
    assert!(display.saw_message("Paused"));
    // once after the stage intro, once on resume
    assert!(display.hides >= 2);
}

#[test]
fn test_summary_is_shown_at_the_end() {
    let mut game = game(vec![], vec![false]);

    let summary = game.play().unwrap();
    game.show_summary(&summary).unwrap();

    let display = game.display();
    assert!(display.saw_message("Game Over!"));
    assert!(display.saw_message("You scored 0 points!"));
    assert!(display.saw_message("Stage 4: not completed"));
}

#[test]
fn test_completed_stage_leads_to_next() {
    // Zero-target missions are met on the first tick
    let run = RunState::new(vec![
        Mission::new(MissionKind::Growth, 0),
        Mission::new(MissionKind::Poison, 0),
    ]);
    let mut game = game(vec![vec![], vec![]], vec![]);

    let summary = game.play_run(run).unwrap();

    assert_eq!(summary.completed, vec![true, true]);
    assert!(summary.won());

    let display = game.display();
    assert!(display.saw_message("Stage 2 will be started!"));
    assert_eq!(display.clears, 4);

    // Score and mission are reported together; the second stage opens with
    // the score the first one ended on
    let first_of_stage_2 = display.missions.iter().position(|m| m.0 == 1).unwrap();
    assert!(first_of_stage_2 > 0);
    assert_eq!(display.scores[first_of_stage_2], display.scores[first_of_stage_2 - 1]);
    assert_eq!(display.scores.last(), Some(&summary.score));

    // The second board is the split layout with a fresh snake
    assert_eq!(display.board.get(&(3, 22)), Some(&TileKind::Wall(WallKind::Vertical)));
    assert_eq!(display.board.get(&(3, 6)), Some(&TileKind::SnakeBody));
}

#[test]
fn test_one_turn_per_tick() {
    // Both turns arrive before the first tick; Right must wait a tick
    let script = vec![vec![Command::Turn(Direction::Up), Command::Turn(Direction::Right)]];
    let mut game = game(script, vec![]);

    game.play().unwrap();

    let display = game.display();
    assert_eq!(display.board.get(&(2, 5)), Some(&TileKind::SnakeBody));
}
