use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, poll, read};

use crate::Coords;
use crate::display::{Command, Display, InputSource};
use crate::error::Result;
use crate::snake::Direction;
use crate::tile::TileKind;

type TermInt = u16;
type ScreenCoords = (TermInt, TermInt);

/// Top-left screen cell of the play area.
const BOARD_ORIGIN: ScreenCoords = (3, 2);
/// Columns between the board's right edge and the side panel.
const PANEL_GAP: TermInt = 4;

/// Crossterm-backed display. Keeps a copy of everything drawn so message
/// boxes can be removed without redrawing the board.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    board: ScreenCoords,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: ScreenCoords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    /// `board` is the play-area size as (rows, cols).
    pub fn new(board: Coords) -> Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        let board = (board.1.max(0) as TermInt, board.0.max(0) as TermInt);
        Ok(TermManager { width, height, board, stdout, screen, current_msg: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn board_to_screen(pos: Coords) -> ScreenCoords {
        (BOARD_ORIGIN.0 + pos.1 as TermInt, BOARD_ORIGIN.1 + pos.0 as TermInt)
    }

    fn panel_x(&self) -> TermInt {
        BOARD_ORIGIN.0 + self.board.0 + PANEL_GAP
    }

    fn print_at(&mut self, pos: ScreenCoords, ch: char) -> Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        if let Some(i) = self.buffer_index(pos) {
            self.screen[i] = ch;
        }
        Ok(())
    }

    fn print_str_at(&mut self, pos: ScreenCoords, text: &str) -> Result<()> {
        for (x_diff, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + x_diff as TermInt, pos.1), ch)?;
        }
        Ok(())
    }

    /// Prints `text` padded to the rest of the row so older, longer text is erased.
    fn print_line_at(&mut self, pos: ScreenCoords, text: &str) -> Result<()> {
        let room = self.width.saturating_sub(pos.0) as usize;
        let line = format!("{text:<room$}", text = text, room = room);
        let line: String = line.chars().take(room).collect();
        self.print_str_at(pos, &line)
    }

    fn print_at_no_save(&mut self, pos: ScreenCoords, ch: char) -> Result<()> {
        // Message boxes are not kept in the buffer, so hiding them can restore what was under them
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        Ok(())
    }

    fn buffer_index(&self, pos: ScreenCoords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }
}

impl Display for TermManager {
    fn draw_tile(&mut self, pos: Coords, tile: TileKind) -> Result<()> {
        if pos.0 < 0 || pos.1 < 0 {
            return Ok(());
        }
        self.print_at(Self::board_to_screen(pos), tile.glyph())
    }

    fn report_score(&mut self, score: i32) -> Result<()> {
        let x = self.panel_x();
        self.print_line_at((x, BOARD_ORIGIN.1 + 1), &format!("Score: {}", score))
    }

    fn report_mission(&mut self, stage: usize, text: &str) -> Result<()> {
        let x = self.panel_x();
        self.print_line_at((x, BOARD_ORIGIN.1 + 4), &format!("Stage {}", stage + 1))?;
        self.print_line_at((x, BOARD_ORIGIN.1 + 5), text)
    }

    fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (BOARD_ORIGIN.0 + self.board.0 / 2, BOARD_ORIGIN.1 + self.board.1 / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        Ok(())
    }

    fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let pos = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(i) = self.buffer_index(pos) {
                    let ch = self.screen[i];
                    self.print_at_no_save(pos, ch)?;
                }
            }
        }

        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
        self.print_str_at((BOARD_ORIGIN.0, 0), "Snake Game")
    }

    fn present(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: ScreenCoords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> ScreenCoords {
        self.top_left
    }
}

/// Reads commands straight from the terminal's key events.
pub struct KeyboardInput;

impl InputSource for KeyboardInput {
    fn poll_command(&mut self) -> Result<Option<Command>> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(ev) = read()? {
                if let Some(command) = command_for(&ev) {
                    return Ok(Some(command));
                }
            }
        }

        Ok(None)
    }

    fn wait_for_advance(&mut self) -> Result<bool> {
        loop {
            if let Event::Key(ev) = read()? {
                if ev.code == KeyCode::Enter {
                    return Ok(true);
                }
                if command_for(&ev) == Some(Command::Quit) {
                    return Ok(false);
                }
            }
        }
    }
}

/// Key bindings: arrows or WASD to turn, Esc to pause, CTRL+C or q to quit.
pub fn command_for(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Command::Turn(Direction::Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Command::Turn(Direction::Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Command::Turn(Direction::Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Command::Turn(Direction::Right)),
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Esc => Some(Command::Pause),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
