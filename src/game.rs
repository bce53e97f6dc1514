use std::thread::sleep;

use rand::Rng;
use tracing::info;

use crate::config::GameConfig;
use crate::display::{Command, Display, InputSource};
use crate::error::Result;
use crate::sim::Stage;
use crate::snake::Direction;
use crate::stage::{RunState, RunSummary, StageStatus, STAGE_COUNT};

/// Runs the stages one after another until one fails, the player quits,
/// or all of them are completed.
pub struct SnakeGame<D, I, R> {
    display: D,
    input: I,
    rng: R,
    config: GameConfig,
    paused: bool,
}

enum StageEnd {
    Finished(StageStatus),
    Quit,
}

impl<D: Display, I: InputSource, R: Rng> SnakeGame<D, I, R> {
    pub fn new(display: D, input: I, rng: R, config: GameConfig) -> Self {
        SnakeGame { display, input, rng, config, paused: false }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Terminal teardown goes through here once the run is over.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Plays a full run with a fresh random mission for every stage.
    pub fn play(&mut self) -> Result<RunSummary> {
        let run = RunState::random(STAGE_COUNT, &mut self.rng);
        self.play_run(run)
    }

    /// Plays the stages of `run` in order. The score carries from one stage
    /// to the next.
    pub fn play_run(&mut self, mut run: RunState) -> Result<RunSummary> {
        for index in 0..run.stage_count() {
            run.current = index;

            if !self.show_intro(index)? {
                info!(stage = index + 1, "quit before stage start");
                break;
            }

            match self.play_stage(index, &mut run)? {
                StageEnd::Finished(StageStatus::Completed) => continue,
                StageEnd::Finished(_) | StageEnd::Quit => break,
            }
        }

        let summary = run.summary();
        info!(score = summary.score, won = summary.won(), "run over");
        Ok(summary)
    }

    /// Shows the final results and waits for the player to dismiss them.
    pub fn show_summary(&mut self, summary: &RunSummary) -> Result<()> {
        self.display.clear()?;
        let lines = summary.lines();
        let mut lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        lines.push("");
        lines.push("Press ENTER to exit");
        self.display.show_message(&lines)?;
        self.display.present()?;

        self.input.wait_for_advance()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn show_intro(&mut self, index: usize) -> Result<bool> {
        self.display.clear()?;
        let title = format!("Stage {} will be started!", index + 1);
        self.display.show_message(&[&title, "", "Press ENTER to start", "or CTRL+C to quit"])?;
        self.display.present()?;

        let advance = self.input.wait_for_advance()?;
        self.display.hide_message()?;
        Ok(advance)
    }

    fn play_stage(&mut self, index: usize, run: &mut RunState) -> Result<StageEnd> {
        let mut stage = Stage::new(index, &self.config, &mut self.rng)?;
        run.set_status(StageStatus::Running);
        self.paused = false;

        self.display.clear()?;
        for pos in stage.grid().coords() {
            if let Some(tile) = stage.grid().tile(pos) {
                self.display.draw_tile(pos, tile)?;
            }
        }
        stage.take_dirty();
        self.report(run)?;
        self.display.present()?;

        loop {
            let mut turn: Option<Direction> = None;

            // At most one turn per tick; later ones wait for the next tick
            while let Some(command) = self.input.poll_command()? {
                match command {
                    Command::Turn(dir) => {
                        turn = Some(dir);
                        break;
                    }
                    Command::Pause => self.toggle_pause()?,
                    Command::Quit => return Ok(StageEnd::Quit),
                }
            }

            if self.paused {
                sleep(self.config.tick_interval());
                continue;
            }

            let report = stage.tick(run, turn, &mut self.rng)?;

            for pos in stage.take_dirty() {
                if let Some(tile) = stage.grid().tile(pos) {
                    self.display.draw_tile(pos, tile)?;
                }
            }
            self.report(run)?;
            self.display.present()?;

            if report.status != StageStatus::Running {
                return Ok(StageEnd::Finished(report.status));
            }

            sleep(self.config.tick_interval());
        }
    }

    fn report(&mut self, run: &RunState) -> Result<()> {
        self.display.report_score(run.score)?;
        self.display.report_mission(run.current, &run.mission().describe())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.display.show_message(&["Paused", "Press Esc to resume", "or CTRL+C to quit"])?;
        } else {
            self.display.hide_message()?;
        }
        self.display.present()?;

        self.paused = !self.paused;
        Ok(())
    }
}
