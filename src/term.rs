use crate::{TermInt, Coords};
use crate::game::Controller;
use crate::snake::{Position, GRID_SIZE};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

const SNAKE_BODY: [char; 2] = ['█', '█'];
const FOOD: [char; 2] = ['(', ')'];
const EMPTY: [char; 2] = [' ', ' '];
const LOGO: &str = "~ S N A K E ~";

// Each grid cell is two columns wide so the board looks square
const BOARD_WIDTH: TermInt = GRID_SIZE as TermInt * 2 + 2;
const BOARD_HEIGHT: TermInt = GRID_SIZE as TermInt + 2;

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
    board_origin: Coords,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;

        // One extra row above the board for the score line
        if width < BOARD_WIDTH || height < BOARD_HEIGHT + 1 {
            bail!(
                "Terminal is {}x{}, the board needs at least {}x{}",
                width, height, BOARD_WIDTH, BOARD_HEIGHT + 1
            );
        }

        let board_origin = ((width - BOARD_WIDTH) / 2, (height - BOARD_HEIGHT - 1) / 2 + 1);
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None, board_origin })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        self.set_raw_mode(true)?;
        self.set_cursor_visibility(false)?;
        self.set_cursor_blink(false)?;
        self.clear()?;
        self.draw_borders()
    }

    pub fn restore(&mut self) -> Result<()> {
        self.set_raw_mode(false)?;
        self.set_cursor_visibility(true)?;
        self.set_cursor_blink(true)?;
        execute!(self.stdout, LeaveAlternateScreen).context("Error leaving alt screen")?;
        Ok(())
    }

    /// Waits for the next key press. Blocks indefinitely without a timeout,
    /// otherwise gives up with None once the timeout passes.
    pub fn next_key(&self, timeout: Option<Duration>) -> Result<Option<KeyEvent>> {
        match timeout {
            None => loop {
                if let Event::Key(ev) = read().context("Error reading event")? {
                    return Ok(Some(ev));
                }
            },
            Some(t) => {
                if poll(t).context("Error polling events")? {
                    if let Event::Key(ev) = read().context("Error reading event")? {
                        return Ok(Some(ev));
                    }
                }
                Ok(None)
            }
        }
    }

    /// Repaints the whole board from the controller's current state.
    pub fn draw(&mut self, game: &Controller) -> Result<()> {
        let state = game.state();

        for y in 1..=GRID_SIZE {
            for x in 1..=GRID_SIZE {
                self.print_cell(Position::new(x, y), EMPTY)?;
            }
        }

        if state.running {
            self.print_cell(state.food, FOOD)?;
        }

        for (i, pos) in state.snake.iter().enumerate() {
            let glyph = if i == 0 { [state.head_char(); 2] } else { SNAKE_BODY };
            self.print_cell(*pos, glyph)?;
        }

        self.print_status(state.score(), state.high_score)?;

        match game.prompt() {
            Some(prompt) => self.show_message(&[LOGO, "", prompt])?,
            None => self.hide_message()?,
        }

        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0 - msg_width / 2, center.1 - msg_height / 2);

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
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let (x, y) = (top_left.0 + x_diff, top_left.1 + y_diff);
                let ch = self.screen[self.width as usize * y as usize + x as usize];
                self.print_at_no_save((x, y), ch)?;
            }
        }

        self.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_borders(&mut self) -> Result<()> {
        let (left, top) = self.board_origin;
        let end_x = left + BOARD_WIDTH - 1;
        let end_y = top + BOARD_HEIGHT - 1;

        for x in left..=end_x {
            let ch = if x == left || x == end_x {'+'} else {'-'};
            self.print_at((x, top), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in top + 1..end_y {
            self.print_at((left, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    fn print_status(&mut self, score: u32, high_score: u32) -> Result<()> {
        let (left, top) = self.board_origin;
        let y = top - 1;
        let score_text = format!("Score {}", pad_score(score));
        // The high score only appears once there is one
        let high_text = if high_score > 0 { format!("High {}", pad_score(high_score)) } else { String::new() };
        let gap = BOARD_WIDTH as usize - score_text.len() - high_text.len();
        let line = format!("{}{}{}", score_text, " ".repeat(gap), high_text);

        for (x_diff, ch) in line.chars().enumerate() {
            self.print_at((left + x_diff as TermInt, y), ch)?;
        }
        Ok(())
    }

    fn print_cell(&mut self, pos: Position, glyph: [char; 2]) -> Result<()> {
        let (x, y) = self.cell_coords(pos);
        self.print_at((x, y), glyph[0])?;
        self.print_at((x + 1, y), glyph[1])
    }

    fn cell_coords(&self, pos: Position) -> Coords {
        let (left, top) = self.board_origin;
        (left + 1 + (pos.x as TermInt - 1) * 2, top + pos.y as TermInt)
    }

    fn print_at(&mut self, pos: Coords, ch: char) -> Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).context("Error printing")?;
        self.screen[self.width as usize * pos.1 as usize + pos.0 as usize] = ch;
        Ok(())
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) -> Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).context("Error printing")?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    fn set_raw_mode(&self, option: bool) -> Result<()> {
        let res = if option {
            terminal::enable_raw_mode()
        } else {
            terminal::disable_raw_mode()
        };

        res.context("Error setting raw mode")
    }

    fn set_cursor_blink(&mut self, option: bool) -> Result<()> {
        let res = if option {
            execute!(self.stdout, cursor::EnableBlinking)
        } else {
            execute!(self.stdout, cursor::DisableBlinking)
        };

        res.context("Error setting cursor blink")
    }

    fn set_cursor_visibility(&mut self, option: bool) -> Result<()> {
        let res = if option {
            execute!(self.stdout, cursor::Show)
        } else {
            execute!(self.stdout, cursor::Hide)
        };

        res.context("Error setting cursor visibility")
    }
}

/// Scores are shown as three digits, e.g. 007.
pub fn pad_score(score: u32) -> String {
    format!("{:03}", score)
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: Coords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> Coords {
        self.top_left
    }
}
