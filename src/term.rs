use crate::{TermInt, Coords};
use crate::errors::Result;
use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

/// A character together with its foreground colour.
type Cell = (char, Option<Color>);

const BLANK: Cell = (' ', None);

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Cell>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![BLANK; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None })
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

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    /// Collects key presses until `timeout` passes without a new event.
    pub fn read_key_events_queue(&self, timeout: Duration) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(timeout)? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Draws a rectangle outline with its top left corner at `origin`.
    pub fn draw_borders(&mut self, origin: Coords, size: Coords) -> Result<()> {
        let (width, height) = size;
        let end_x = origin.0 + width - 1;
        let end_y = origin.1 + height - 1;

        for x in origin.0..=end_x {
            let ch = if x == origin.0 || x == end_x {'+'} else {'-'};
            self.print_at((x, origin.1), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in origin.1 + 1..end_y {
            self.print_at((origin.0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    /// Writes a line of text starting at `pos`, cut at the screen edge.
    pub fn print_line(&mut self, pos: Coords, text: &str, color: Option<Color>) -> Result<()> {
        for (i, ch) in text.chars().enumerate() {
            let x = pos.0 + i as TermInt;
            if x >= self.width {
                break;
            }
            self.print_colored_at((x, pos.1), ch, color)?;
        }
        Ok(())
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_no_save((top_left.0 + x_diff, *y), BLANK)?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_no_save((top_left.0 + x_diff as TermInt, y), (ch, None))?;
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Put back what was under the box
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let pos = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(cell) = self.cell(pos) {
                    self.print_no_save(pos, cell)?;
                }
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: Coords, ch: char) -> Result<()> {
        self.print_colored_at(pos, ch, None)
    }

    pub fn print_colored_at(&mut self, pos: Coords, ch: char, color: Option<Color>) -> Result<()> {
        self.print_no_save(pos, (ch, color))?;
        if let Some(idx) = self.index(pos) {
            self.screen[idx] = (ch, color);
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![BLANK; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    // Skips the local buffer so a message box can be undone later
    fn print_no_save(&mut self, pos: Coords, cell: Cell) -> Result<()> {
        let (ch, color) = cell;
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1))?;
        match color {
            Some(c) => queue!(self.stdout, style::SetForegroundColor(c), style::Print(ch), style::ResetColor)?,
            None => queue!(self.stdout, style::Print(ch))?,
        }
        Ok(())
    }

    fn index(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn cell(&self, pos: Coords) -> Option<Cell> {
        self.index(pos).map(|idx| self.screen[idx])
    }
}
