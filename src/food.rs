use std::fmt;
use std::time::Instant;

use crossterm::style::Color;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GameConfig;
use crate::snake::{Position, Snake};
use crate::state::GameState;
use FoodVariant::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FoodVariant {
    Poisonous,
    Fit,
    Fatty,
    Royal,
}

/// Temporary change of the tick interval.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpeedEffect {
    /// Base delay doubled
    Slow,
    /// Base delay halved, floored at the minimum delay
    Fast,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EffectProfile {
    pub score: i32,
    pub segments: i32,
    pub speed: Option<SpeedEffect>,
}

/// What applying a food actually changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EffectResult {
    pub score_delta: i32,
    pub segment_delta: i32,
    pub speed: Option<SpeedEffect>,
}

impl FoodVariant {
    pub const ALL: [FoodVariant; 4] = [Poisonous, Fit, Fatty, Royal];

    pub fn profile(&self) -> EffectProfile {
        match self {
            Poisonous => EffectProfile { score: -1, segments: -1, speed: None },
            Fit => EffectProfile { score: 1, segments: 1, speed: None },
            Fatty => EffectProfile { score: 3, segments: 3, speed: Some(SpeedEffect::Slow) },
            Royal => EffectProfile { score: 5, segments: 5, speed: Some(SpeedEffect::Fast) },
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Poisonous => Color::Magenta,
            Fit => Color::Green,
            Fatty => Color::Yellow,
            Royal => Color::Rgb { r: 255, g: 165, b: 0 },
        }
    }
}

impl fmt::Display for FoodVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Poisonous => "poisonous",
            Fit => "fit",
            Fatty => "fatty",
            Royal => "royal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Food {
    pub position: Position,
    pub variant: FoodVariant,
}

impl Food {
    pub fn new(position: Position, variant: FoodVariant) -> Self {
        Food { position, variant }
    }

    pub fn apply_effect(&self, snake: &mut Snake, state: &mut GameState, now: Instant) -> EffectResult {
        let profile = self.variant.profile();

        let score_before = state.score;
        state.add_score(profile.score);

        let len_before = snake.len();
        if profile.segments < 0 {
            for _ in 0..-profile.segments {
                snake.shrink();
            }
        } else {
            for _ in 0..profile.segments {
                snake.grow();
            }
        }

        if let Some(speed) = profile.speed {
            state.apply_speed_effect(speed, now);
        }

        let result = EffectResult {
            score_delta: state.score as i32 - score_before as i32,
            segment_delta: snake.len() as i32 - len_before as i32,
            speed: profile.speed,
        };
        debug!("{} food applied: {:?}", self.variant, result);
        result
    }
}

/// Places new food on random grid cells inside the playable margin.
#[derive(Debug, Clone)]
pub struct FoodFactory {
    cell_size: i32,
    half_cells: (i32, i32),
}

impl FoodFactory {
    pub fn new(config: &GameConfig) -> Self {
        FoodFactory { cell_size: config.cell_size, half_cells: config.half_cells() }
    }

    pub fn create<R: Rng + ?Sized>(&self, variant: FoodVariant, rng: &mut R) -> Food {
        let (hx, hy) = self.half_cells;
        let x = rng.gen_range(-hx..=hx) * self.cell_size;
        let y = rng.gen_range(-hy..=hy) * self.cell_size;
        Food::new(Position::new(x, y), variant)
    }

    pub fn create_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Food {
        let variant = *FoodVariant::ALL.choose(rng).unwrap_or(&Fit);
        self.create(variant, rng)
    }
}
