use std::convert::TryFrom;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info};
use rand::rngs::ThreadRng;

use crate::{Coords, TermInt};
use crate::term::TermManager;
use crate::config::GameConfig;
use crate::errors::Error;
use crate::food::FoodVariant;
use crate::highscore::ScoreStore;
use crate::sim::{Event, Phase, Simulation};
use crate::snake::{Direction::{*, self}, Position};

const POLL_INTERVAL_MS: u64 = 5;
const BOARD_TOP: TermInt = 2;
// Terminal cells are about twice as tall as wide
const COLS_PER_CELL: TermInt = 2;

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Input {
    Turn(Direction),
    Reset,
    Pause,
    Quit,
    Ignored,
}

pub fn map_key(ev: &KeyEvent) -> Input {
    if is_ctrl_c(ev) {
        return Input::Quit;
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Input::Turn(Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Input::Turn(Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Input::Turn(Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Input::Turn(Right),
        KeyCode::Char(' ') => Input::Reset,
        KeyCode::Esc => Input::Pause,
        _ => Input::Ignored,
    }
}

pub struct SnakeGame<S: ScoreStore> {
    term: TermManager,
    sim: Simulation<S, ThreadRng>,
    paused: bool,
    origin: Coords,
    frame: Coords,
    half_cells: (i32, i32),
    drawn: Vec<Coords>,
}

impl<S: ScoreStore> SnakeGame<S> {
    pub fn new(config: GameConfig, store: S) -> Result<Self> {
        let term = TermManager::new().context("Failed to read terminal size")?;
        let half_cells = config.half_cells();
        let sim = Simulation::new(config, store, rand::thread_rng());

        Ok(SnakeGame { term, sim, paused: false, origin: (0, 0), frame: (0, 0), half_cells, drawn: vec![] })
    }

    pub fn initialize(&mut self) -> Result<()> {
        // Two status lines above the board
        let (need_w, need_h) = frame_size(self.half_cells)
            .and_then(|(w, h)| Some((w, h.checked_add(BOARD_TOP)?)))
            .ok_or_else(|| Error::Config("board has too many cells to draw in a terminal".into()))?;
        let (have_w, have_h) = self.term.get_terminal_size();

        if have_w < need_w || have_h < need_h {
            return Err(Error::TerminalTooSmall { have_w, have_h, need_w, need_h }.into());
        }

        self.frame = (need_w, need_h - BOARD_TOP);
        self.origin = ((have_w - need_w) / 2, BOARD_TOP);
        self.term.setup().context("Failed to set up terminal")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore().context("Failed to restore terminal")?;
        Ok(())
    }

    /// Runs until the player quits.
    pub fn run(&mut self) -> Result<()> {
        self.term.clear()?;
        self.term.draw_borders(self.origin, self.frame)?;
        self.draw_frame()?;

        if !self.show_intro()? {
            return Ok(());
        }

        loop {
            let frame_start = Instant::now();
            while frame_start.elapsed() < self.sim.delay() {
                let events = self.term.read_key_events_queue(Duration::from_millis(POLL_INTERVAL_MS))?;
                for key_ev in events.iter() {
                    if !self.handle_input(map_key(key_ev))? {
                        return Ok(());
                    }
                }
            }

            if self.paused { continue; }

            let score = self.sim.state().score;
            let body = self.sim.snake().body().to_vec();
            let events = self.sim.tick(Instant::now());
            self.on_events(&events, score, &body)?;
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn show_intro(&mut self) -> Result<bool> {
        let lines = &[
            "Welcome to Food Snake",
            "",
            "Arrow keys or WASD to move",
            "Space to restart, Esc to pause",
            "CTRL+C to quit",
            "",
            "Press any key to begin",
        ];

        self.term.show_message(lines)?;

        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(false);
        }

        self.term.hide_message()?;
        Ok(true)
    }

    /// Returns false when the player wants to leave.
    fn handle_input(&mut self, input: Input) -> Result<bool> {
        match input {
            Input::Quit => return Ok(false),
            Input::Pause => self.toggle_pause()?,
            Input::Reset if !self.paused => {
                self.sim.request_reset();
                self.term.hide_message()?;
                self.draw_frame()?;
            }
            Input::Turn(dir) if !self.paused => {
                if self.sim.phase() == Phase::Idle {
                    self.term.hide_message()?;
                }
                self.sim.turn(dir);
            }
            _ => {}
        }

        Ok(true)
    }

    fn on_events(&mut self, events: &[Event], score: u32, body: &[Position]) -> Result<()> {
        let mut crashed = false;

        for event in events {
            match event {
                Event::Collided(_) => crashed = true,
                Event::LeveledUp(level) => info!("reached level {}", level),
                Event::NewHighScore(record) => info!("new high score {}", record),
                Event::Ate(variant) => debug!("ate {} food", variant),
            }
        }

        if crashed {
            self.game_over(score, body)?;
        } else if !self.term.has_message() {
            self.draw_frame()?;
        }

        Ok(())
    }

    fn game_over(&mut self, score: u32, body: &[Position]) -> Result<()> {
        for pos in body {
            if let Some(at) = self.screen_pos(*pos) {
                self.term.print_at(at, DEAD_SNAKE_CHAR)?;
            }
        }
        self.draw_status()?;

        let score_line = format!("Score: {}", score);
        let record_line = format!("Record: {}", self.sim.state().high_score);
        self.term.show_message(&[
            "Game over!",
            score_line.as_str(),
            record_line.as_str(),
            "",
            "Move to play again,",
            "or CTRL+C to quit.",
        ])?;

        // The crash marks stay until the next frame clears them
        let marks: Vec<Coords> = body.iter().filter_map(|p| self.screen_pos(*p)).collect();
        self.drawn.extend(marks);
        Ok(())
    }

    fn draw_frame(&mut self) -> Result<()> {
        for at in std::mem::take(&mut self.drawn) {
            self.term.print_at(at, ' ')?;
        }

        let foods: Vec<(Position, FoodVariant)> =
            self.sim.foods().iter().map(|f| (f.position, f.variant)).collect();
        for (pos, variant) in foods {
            if let Some(at) = self.screen_pos(pos) {
                self.term.print_colored_at(at, FOOD_CHAR, Some(variant.color()))?;
                self.drawn.push(at);
            }
        }

        // Tail first so the head ends up on top of stacked segments
        let body = self.sim.snake().body().to_vec();
        let head_char = self.sim.snake().head_char();
        for (i, pos) in body.iter().enumerate().rev() {
            if let Some(at) = self.screen_pos(*pos) {
                let ch = if i == 0 {head_char} else {SNAKE_BODY_CHAR};
                self.term.print_at(at, ch)?;
                self.drawn.push(at);
            }
        }

        self.draw_status()?;
        self.term.flush()?;
        Ok(())
    }

    fn draw_status(&mut self) -> Result<()> {
        let state = self.sim.state();
        let mut status = format!(
            "Score: {}  Level: {}  Record: {}",
            state.score, state.level, state.high_score
        );
        if self.paused {
            status.push_str("  [paused]");
        }
        let (width, _) = self.term.get_terminal_size();
        let status = format!("{:<width$}", status, width = width as usize);
        self.term.print_line((0, 0), &status, None)?;

        let mut x = 0;
        for variant in FoodVariant::ALL.iter() {
            let entry = format!("{} {} {:+}  ", FOOD_CHAR, variant, variant.profile().score);
            self.term.print_line((x, 1), &entry, Some(variant.color()))?;
            x += entry.chars().count() as TermInt;
        }

        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        debug!("paused: {}", self.paused);
        self.draw_status()?;
        self.term.flush()?;
        Ok(())
    }

    /// Terminal cell of a board position, if it is on the board. Only valid
    /// once `initialize` has checked that the frame fits the terminal.
    fn screen_pos(&self, pos: Position) -> Option<Coords> {
        let (hx, hy) = self.half_cells;
        let cell_size = self.sim.config().cell_size;
        let col = pos.x / cell_size + hx;
        let row = hy - pos.y / cell_size;

        if col < 0 || col > 2 * hx || row < 0 || row > 2 * hy {
            return None;
        }

        Some((
            self.origin.0 + 1 + col as TermInt * COLS_PER_CELL,
            self.origin.1 + 1 + row as TermInt,
        ))
    }
}

/// Outer size of the board frame, border included. `None` if it doesn't fit
/// in terminal coordinates.
fn frame_size(half_cells: (i32, i32)) -> Option<Coords> {
    let (hx, hy) = half_cells;
    let cols = TermInt::try_from(2 * hx + 1).ok()?.checked_mul(COLS_PER_CELL)?.checked_add(2)?;
    let rows = TermInt::try_from(2 * hy + 1).ok()?.checked_add(2)?;
    Some((cols, rows))
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
