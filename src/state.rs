use std::cmp::max;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::GameConfig;
use crate::food::SpeedEffect;

/// Score, level and pacing of the current run.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub score: u32,
    pub level: u32,
    /// Delay given by the level alone
    pub base_delay: Duration,
    /// Delay actually used between ticks
    pub effective_delay: Duration,
    pub effect_end: Option<Instant>,
    pub high_score: u32,

    initial_delay: Duration,
    min_delay: Duration,
    effect_duration: Duration,
    max_level: u32,
    points_per_level: u32,
    level_speedup: f64,
}

impl GameState {
    pub fn new(config: &GameConfig, high_score: u32) -> Self {
        GameState {
            score: 0,
            level: 1,
            base_delay: config.initial_delay,
            effective_delay: config.initial_delay,
            effect_end: None,
            high_score,
            initial_delay: config.initial_delay,
            min_delay: config.min_delay,
            effect_duration: config.effect_duration,
            max_level: config.max_level,
            points_per_level: config.points_per_level,
            level_speedup: config.level_speedup,
        }
    }

    /// Adds a possibly negative delta, never going below zero.
    pub fn add_score(&mut self, delta: i32) {
        if delta < 0 {
            self.score = self.score.saturating_sub(delta.unsigned_abs());
        } else {
            self.score = self.score.saturating_add(delta as u32);
        }
    }

    /// Starts a timed speed change. A newer effect replaces the pending one.
    pub fn apply_speed_effect(&mut self, effect: SpeedEffect, now: Instant) {
        self.effective_delay = match effect {
            SpeedEffect::Slow => self.base_delay * 2,
            SpeedEffect::Fast => max(self.min_delay, self.base_delay / 2),
        };
        self.effect_end = Some(now + self.effect_duration);
    }

    /// Drops the timed effect once `now` is past its end.
    pub fn expire_effect(&mut self, now: Instant) {
        if let Some(end) = self.effect_end {
            if now > end {
                debug!("speed effect expired");
                self.effect_end = None;
                self.effective_delay = self.base_delay;
            }
        }
    }

    /// Moves up one level if the score reached the threshold. Returns the new
    /// level when that happens.
    pub fn check_level_up(&mut self) -> Option<u32> {
        if self.level >= self.max_level || self.score < self.level * self.points_per_level {
            return None;
        }

        self.level += 1;
        self.base_delay = self.base_delay.mul_f64(self.level_speedup);
        self.effective_delay = self.base_delay;
        info!("level up: {} (delay {:?})", self.level, self.base_delay);
        Some(self.level)
    }

    /// Records the score as the new high score if it beats it.
    pub fn commit_high_score(&mut self) -> bool {
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }

    /// Back to level 1 with no score and no effect. The high score survives.
    pub fn reset(&mut self) {
        self.score = 0;
        self.level = 1;
        self.base_delay = self.initial_delay;
        self.effective_delay = self.initial_delay;
        self.effect_end = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Duration, b: Duration) -> bool {
        (a.as_secs_f64() - b.as_secs_f64()).abs() < 1e-6
    }

    #[test]
    fn test_score_floor() {
        let mut state = GameState::new(&GameConfig::default(), 0);
        state.add_score(-1);
        assert_eq!(state.score, 0);
        state.add_score(5);
        state.add_score(-1);
        assert_eq!(state.score, 4);
    }

    #[test]
    fn test_level_up_once_per_threshold() {
        let mut state = GameState::new(&GameConfig::default(), 0);
        state.score = 99;
        assert_eq!(state.check_level_up(), None);

        state.score = 100;
        assert_eq!(state.check_level_up(), Some(2));
        assert!(close(state.base_delay, Duration::from_millis(80)));
        assert_eq!(state.effective_delay, state.base_delay);

        // 100 < 2 * 100
        assert_eq!(state.check_level_up(), None);
        assert_eq!(state.level, 2);
    }

    #[test]
    fn test_level_caps_at_max() {
        let mut state = GameState::new(&GameConfig::default(), 0);
        state.score = 10_000;

        let mut fired = vec![];
        for _ in 0..10 {
            if let Some(level) = state.check_level_up() {
                fired.push(level);
            }
        }

        assert_eq!(fired, vec![2, 3, 4, 5]);
        assert_eq!(state.level, 5);
        assert!(close(state.base_delay, Duration::from_secs_f64(0.1 * 0.8f64.powi(4))));
    }

    #[test]
    fn test_expire_only_after_end() {
        let mut state = GameState::new(&GameConfig::default(), 0);
        let now = Instant::now();
        state.apply_speed_effect(SpeedEffect::Slow, now);

        state.expire_effect(now + Duration::from_secs(4));
        assert_eq!(state.effective_delay, Duration::from_millis(200));
        assert!(state.effect_end.is_some());

        state.expire_effect(now + Duration::from_secs(6));
        assert_eq!(state.effective_delay, Duration::from_millis(100));
        assert!(state.effect_end.is_none());
    }

    #[test]
    fn test_commit_high_score() {
        let mut state = GameState::new(&GameConfig::default(), 100);
        state.score = 150;
        assert!(state.commit_high_score());
        assert_eq!(state.high_score, 150);

        state.score = 120;
        assert!(!state.commit_high_score());
        assert_eq!(state.high_score, 150);
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let mut state = GameState::new(&GameConfig::default(), 30);
        state.score = 250;
        state.check_level_up();
        state.apply_speed_effect(SpeedEffect::Fast, Instant::now());

        state.reset();

        assert_eq!(state, GameState::new(&GameConfig::default(), 30));
    }
}
