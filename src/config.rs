use std::time::Duration;

use crate::errors::{Error, Result};

/// Board geometry and gameplay constants.
///
/// Coordinates are in board units with (0, 0) at the centre of the board.
/// The snake moves one `cell_size` per tick and anything closer than one
/// cell counts as touching.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub board_width: i32,
    pub board_height: i32,
    pub cell_size: i32,
    /// Tick interval at level 1
    pub initial_delay: Duration,
    /// Floor for the delay of speed-up effects
    pub min_delay: Duration,
    pub effect_duration: Duration,
    pub max_level: u32,
    pub points_per_level: u32,
    /// Multiplier applied to the base delay on every level-up
    pub level_speedup: f64,
    pub food_count: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board_width: 600,
            board_height: 600,
            cell_size: 20,
            initial_delay: Duration::from_millis(100),
            min_delay: Duration::from_millis(20),
            effect_duration: Duration::from_secs(5),
            max_level: 5,
            points_per_level: 100,
            level_speedup: 0.8,
            food_count: 3,
        }
    }
}

impl GameConfig {
    pub fn new(board_width: i32, board_height: i32, cell_size: i32) -> Self {
        GameConfig { board_width, board_height, cell_size, ..Default::default() }
    }

    /// Largest coordinate the head may occupy on the x axis.
    pub fn limit_x(&self) -> i32 {
        play_limit(self.board_width, self.cell_size)
    }

    /// Largest coordinate the head may occupy on the y axis.
    pub fn limit_y(&self) -> i32 {
        play_limit(self.board_height, self.cell_size)
    }

    /// Number of cells between the centre and the last playable cell, per axis.
    pub fn half_cells(&self) -> (i32, i32) {
        (self.limit_x() / self.cell_size, self.limit_y() / self.cell_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell_size <= 0 {
            return Err(Error::Config(format!("cell size must be positive, got {}", self.cell_size)));
        }

        for (name, value) in [("width", self.board_width), ("height", self.board_height)].iter() {
            if *value <= 0 || value % (2 * self.cell_size) != 0 {
                return Err(Error::Config(format!(
                    "board {} must be a positive multiple of {} (twice the cell size), got {}",
                    name, 2 * self.cell_size, value
                )));
            }
        }

        let (hx, hy) = self.half_cells();
        if hx < 1 || hy < 1 {
            return Err(Error::Config("board must have at least 3 playable cells per axis".into()));
        }

        if self.food_count == 0 {
            return Err(Error::Config("at least one food item is required".into()));
        }

        if self.max_level == 0 {
            return Err(Error::Config("max level must be at least 1".into()));
        }

        Ok(())
    }
}

/// Half the board extent minus a one cell margin.
pub fn play_limit(extent: i32, cell_size: i32) -> i32 {
    extent / 2 - cell_size
}
