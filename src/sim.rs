use std::time::{Duration, Instant};

use log::{debug, info};
use rand::Rng;

use crate::config::GameConfig;
use crate::food::{Food, FoodFactory, FoodVariant};
use crate::highscore::ScoreStore;
use crate::snake::{Direction, Snake};
use crate::state::GameState;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the first direction
    Idle,
    Running,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

/// Things a tick did that the renderer may want to react to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    Ate(FoodVariant),
    Collided(Collision),
    LeveledUp(u32),
    NewHighScore(u32),
}

/// Owns the snake, the game state and the active food, and advances them
/// one tick at a time.
pub struct Simulation<S, R> {
    config: GameConfig,
    snake: Snake,
    state: GameState,
    foods: Vec<Food>,
    factory: FoodFactory,
    store: S,
    rng: R,
}

impl<S: ScoreStore, R: Rng> Simulation<S, R> {
    pub fn new(config: GameConfig, store: S, rng: R) -> Self {
        let high_score = store.load();
        let mut sim = Simulation {
            snake: Snake::new(config.cell_size),
            state: GameState::new(&config, high_score),
            foods: Vec::with_capacity(config.food_count),
            factory: FoodFactory::new(&config),
            config,
            store,
            rng,
        };
        sim.spawn_foods();
        sim
    }

    pub fn phase(&self) -> Phase {
        match self.snake.direction() {
            None => Phase::Idle,
            Some(_) => Phase::Running,
        }
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// How long to wait before the next tick.
    pub fn delay(&self) -> Duration {
        self.state.effective_delay
    }

    /// Queues a new heading for the next tick. Reversals are ignored.
    pub fn turn(&mut self, direction: Direction) {
        let was_idle = self.phase() == Phase::Idle;
        if self.snake.turn(direction) && was_idle {
            info!("game started heading {:?}", direction);
        }
    }

    /// Starts over without touching the high score.
    pub fn request_reset(&mut self) {
        info!("reset requested at score {}", self.state.score);
        self.restart();
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Event> {
        let mut events = vec![];

        if self.phase() == Phase::Idle {
            return events;
        }

        self.state.expire_effect(now);
        self.snake.advance();

        if let Some(collision) = self.collision() {
            info!("collided with {:?} at score {}", collision, self.state.score);
            events.push(Event::Collided(collision));
            if self.state.commit_high_score() {
                self.store.save(self.state.high_score);
                events.push(Event::NewHighScore(self.state.high_score));
            }
            self.restart();
            return events;
        }

        // First match only, even if several items overlap the head
        let head = self.snake.head();
        let radius = f64::from(self.config.cell_size);
        if let Some(i) = self.foods.iter().position(|f| head.distance(f.position) < radius) {
            let food = self.foods.remove(i);
            food.apply_effect(&mut self.snake, &mut self.state, now);
            let replacement = self.factory.create_random(&mut self.rng);
            self.foods.push(replacement);
            events.push(Event::Ate(food.variant));

            if let Some(level) = self.state.check_level_up() {
                events.push(Event::LeveledUp(level));
            }
        }

        events
    }

    fn collision(&self) -> Option<Collision> {
        if self.snake.check_wall_collision(self.config.board_width, self.config.board_height) {
            Some(Collision::Wall)
        } else if self.snake.check_self_collision() {
            Some(Collision::Body)
        } else {
            None
        }
    }

    fn restart(&mut self) {
        self.snake = Snake::new(self.config.cell_size);
        self.state.reset();
        self.spawn_foods();
    }

    fn spawn_foods(&mut self) {
        self.foods.clear();
        for _ in 0..self.config.food_count {
            let food = self.factory.create_random(&mut self.rng);
            self.foods.push(food);
        }
        debug!("spawned food: {:?}", self.foods);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::MemoryScoreStore;
    use crate::snake::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type TestSim = Simulation<MemoryScoreStore, StdRng>;

    fn sim_with(high_score: u32) -> TestSim {
        Simulation::new(GameConfig::default(), MemoryScoreStore::new(high_score), StdRng::seed_from_u64(3))
    }

    /// Foods far away in the corners so they never get eaten by accident.
    fn park_foods(sim: &mut TestSim) {
        sim.foods = vec![
            Food::new(Position::new(280, 280), FoodVariant::Fit),
            Food::new(Position::new(-280, 280), FoodVariant::Fit),
            Food::new(Position::new(-280, -280), FoodVariant::Fit),
        ];
    }

    #[test]
    fn test_starts_idle_with_full_food() {
        let sim = sim_with(0);
        assert_eq!(sim.phase(), Phase::Idle);
        assert_eq!(sim.foods().len(), 3);
        assert_eq!(sim.snake().len(), 1);
        assert_eq!(sim.state().level, 1);
    }

    #[test]
    fn test_loads_high_score_from_store() {
        let sim = sim_with(77);
        assert_eq!(sim.state().high_score, 77);
    }

    #[test]
    fn test_idle_tick_changes_nothing() {
        let mut sim = sim_with(0);
        let foods = sim.foods().to_vec();
        let now = Instant::now();

        for i in 0..10 {
            assert!(sim.tick(now + Duration::from_secs(i)).is_empty());
        }

        assert_eq!(sim.snake().body(), &[Position::ORIGIN]);
        assert_eq!(sim.foods(), foods.as_slice());
        assert_eq!(sim.phase(), Phase::Idle);
    }

    #[test]
    fn test_first_direction_starts_game() {
        let mut sim = sim_with(0);
        park_foods(&mut sim);
        sim.turn(Direction::Left);
        assert_eq!(sim.phase(), Phase::Running);

        sim.tick(Instant::now());
        assert_eq!(sim.snake().head(), Position::new(-20, 0));
    }

    #[test]
    fn test_reversal_ignored_while_running() {
        let mut sim = sim_with(0);
        park_foods(&mut sim);
        sim.turn(Direction::Up);
        sim.turn(Direction::Down);
        assert_eq!(sim.snake().direction(), Some(Direction::Up));

        sim.tick(Instant::now());
        assert_eq!(sim.snake().head(), Position::new(0, 20));
    }

    #[test]
    fn test_eating_fit_food() {
        let mut sim = sim_with(0);
        park_foods(&mut sim);
        sim.foods[1] = Food::new(Position::new(20, 0), FoodVariant::Fit);
        sim.turn(Direction::Right);

        let events = sim.tick(Instant::now());

        assert_eq!(events, vec![Event::Ate(FoodVariant::Fit)]);
        assert_eq!(sim.state().score, 1);
        assert_eq!(sim.snake().len(), 2);
        assert_eq!(sim.foods().len(), 3);
        assert_eq!(sim.foods()[0].position, Position::new(280, 280));
        assert_eq!(sim.foods()[1].position, Position::new(-280, -280));
    }

    #[test]
    fn test_only_first_overlapping_food_is_eaten() {
        let mut sim = sim_with(0);
        sim.foods = vec![
            Food::new(Position::new(20, 0), FoodVariant::Royal),
            Food::new(Position::new(20, 0), FoodVariant::Fit),
            Food::new(Position::new(-280, -280), FoodVariant::Fit),
        ];
        sim.turn(Direction::Right);

        let events = sim.tick(Instant::now());

        assert_eq!(events, vec![Event::Ate(FoodVariant::Royal)]);
        assert_eq!(sim.state().score, 5);
        assert_eq!(sim.foods().len(), 3);
        assert_eq!(sim.foods()[0], Food::new(Position::new(20, 0), FoodVariant::Fit));
    }

    #[test]
    fn test_fatty_effect_lapses_after_window() {
        let mut sim = sim_with(0);
        park_foods(&mut sim);
        sim.foods[0] = Food::new(Position::new(0, 20), FoodVariant::Fatty);
        sim.turn(Direction::Up);

        let start = Instant::now();
        sim.tick(start);
        assert_eq!(sim.delay(), Duration::from_millis(200));

        park_foods(&mut sim);
        sim.turn(Direction::Right);
        sim.tick(start + Duration::from_secs(4));
        assert_eq!(sim.delay(), Duration::from_millis(200));

        sim.tick(start + Duration::from_secs(6));
        assert_eq!(sim.delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_level_up_on_threshold() {
        let mut sim = sim_with(0);
        park_foods(&mut sim);
        sim.foods[0] = Food::new(Position::new(20, 0), FoodVariant::Royal);
        sim.state.score = 96;
        sim.turn(Direction::Right);

        let events = sim.tick(Instant::now());

        assert_eq!(events, vec![Event::Ate(FoodVariant::Royal), Event::LeveledUp(2)]);
        assert_eq!(sim.state().level, 2);
        assert_eq!(sim.state().effective_delay, sim.state().base_delay);
        assert!((sim.delay().as_secs_f64() - 0.08).abs() < 1e-6);
    }

    #[test]
    fn test_no_level_up_at_max_level() {
        let mut sim = sim_with(0);
        park_foods(&mut sim);
        sim.foods[0] = Food::new(Position::new(20, 0), FoodVariant::Fit);
        sim.state.level = 5;
        sim.state.score = 999;
        sim.turn(Direction::Right);

        let events = sim.tick(Instant::now());

        assert_eq!(events, vec![Event::Ate(FoodVariant::Fit)]);
        assert_eq!(sim.state().level, 5);
    }

    #[test]
    fn test_wall_collision_resets() {
        let mut sim = sim_with(0);
        park_foods(&mut sim);
        sim.snake = Snake::from_body(vec![Position::new(290, 0)], Some(Direction::Right), 20);
        sim.state.score = 40;
        sim.state.level = 2;

        let events = sim.tick(Instant::now());

        assert_eq!(events, vec![Event::Collided(Collision::Wall), Event::NewHighScore(40)]);
        assert_eq!(sim.snake().body(), &[Position::ORIGIN]);
        assert_eq!(sim.phase(), Phase::Idle);
        assert_eq!(sim.state().score, 0);
        assert_eq!(sim.state().level, 1);
        assert_eq!(sim.delay(), Duration::from_millis(100));
        assert_eq!(sim.foods().len(), 3);
    }

    #[test]
    fn test_self_collision_resets() {
        let mut sim = sim_with(0);
        park_foods(&mut sim);
        // Head turns back into its own body
        sim.snake = Snake::from_body(
            vec![
                Position::new(0, 0),
                Position::new(20, 0),
                Position::new(20, -20),
                Position::new(0, -20),
                Position::new(-20, -20),
            ],
            Some(Direction::Down),
            20,
        );

        let events = sim.tick(Instant::now());

        assert_eq!(events, vec![Event::Collided(Collision::Body)]);
        assert_eq!(sim.snake().len(), 1);
    }

    #[test]
    fn test_new_high_score_is_persisted() {
        let mut sim = sim_with(100);
        park_foods(&mut sim);
        sim.snake = Snake::from_body(vec![Position::new(280, 0)], Some(Direction::Right), 20);
        sim.state.score = 150;

        sim.tick(Instant::now());

        assert_eq!(sim.state().high_score, 150);
        assert_eq!(sim.store().saves(), &[150]);
    }

    #[test]
    fn test_lower_score_is_not_persisted() {
        let mut sim = sim_with(200);
        park_foods(&mut sim);
        sim.snake = Snake::from_body(vec![Position::new(280, 0)], Some(Direction::Right), 20);
        sim.state.score = 150;

        let events = sim.tick(Instant::now());

        assert_eq!(events, vec![Event::Collided(Collision::Wall)]);
        assert_eq!(sim.state().high_score, 200);
        assert!(sim.store().saves().is_empty());
    }

    #[test]
    fn test_request_reset() {
        let mut sim = sim_with(0);
        park_foods(&mut sim);
        sim.turn(Direction::Up);
        sim.tick(Instant::now());
        sim.state.score = 12;

        sim.request_reset();

        assert_eq!(sim.state().score, 0);
        assert_eq!(sim.state().high_score, 0);
        assert!(sim.store().saves().is_empty());
        assert_eq!(sim.phase(), Phase::Idle);
        assert_eq!(sim.snake().body(), &[Position::ORIGIN]);
        assert_eq!(sim.foods().len(), 3);
    }

    #[test]
    fn test_food_count_stays_constant() {
        let mut sim = sim_with(0);
        let now = Instant::now();

        for round in 0..50u64 {
            sim.turn(if round % 2 == 0 { Direction::Up } else { Direction::Right });
            // Drop food right in front of the head every tick
            let head = sim.snake().head();
            let next = match sim.snake().heading() {
                Some(Direction::Up) => Position::new(head.x, head.y + 20),
                _ => Position::new(head.x + 20, head.y),
            };
            sim.foods[0] = Food::new(next, FoodVariant::Poisonous);

            sim.tick(now + Duration::from_millis(round * 100));
            assert_eq!(sim.foods().len(), 3);
        }
    }
}
