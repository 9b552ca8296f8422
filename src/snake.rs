use crate::config::play_limit;
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn distance(&self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }

    fn step(&self, direction: Direction, cell_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx * cell_size, self.y + dy * cell_size)
    }
}

/// Heading of the snake. The y axis grows upwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    fn delta(&self) -> (i32, i32) {
        match self {
            Up => (0, 1),
            Down => (0, -1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

/// Chain of segments, head first. `direction` is `None` while the snake
/// waits for its first input.
#[derive(Debug, Clone)]
pub struct Snake {
    body: Vec<Position>,
    direction: Option<Direction>,
    pending: Option<Direction>,
    cell_size: i32,
}

impl Snake {
    pub fn new(cell_size: i32) -> Self {
        Snake { body: vec![Position::ORIGIN], direction: None, pending: None, cell_size }
    }

    pub fn body(&self) -> &[Position] {
        &self.body
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Direction of the last move.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Direction the next move will take.
    pub fn heading(&self) -> Option<Direction> {
        self.pending.or(self.direction)
    }

    /// Queues the heading for the next `advance`, last call wins. A snake at
    /// rest takes it at once. Returns false if the turn reverses either the
    /// last move or the queued heading, in which case it is ignored.
    pub fn turn(&mut self, new_direction: Direction) -> bool {
        let current = match self.direction {
            Some(current) => current,
            None => {
                self.direction = Some(new_direction);
                return true;
            }
        };

        let reverses = |d: Direction| d.opposite() == new_direction;
        if reverses(current) || self.pending.map_or(false, reverses) {
            return false;
        }

        self.pending = Some(new_direction);
        true
    }

    /// Follow-the-leader shift, tail first, then the head steps one cell.
    pub fn advance(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.direction = Some(pending);
        }

        let direction = match self.direction {
            Some(d) => d,
            None => return,
        };

        for i in (1..self.body.len()).rev() {
            self.body[i] = self.body[i - 1];
        }

        self.body[0] = self.body[0].step(direction, self.cell_size);
    }

    /// Appends a segment on top of the current tail. It gets pulled into
    /// place by the following moves.
    pub fn grow(&mut self) {
        let tail = *self.body.last().unwrap_or(&Position::ORIGIN);
        self.body.push(tail);
    }

    /// Drops the tail segment unless only the head is left.
    pub fn shrink(&mut self) -> bool {
        if self.body.len() > 1 {
            self.body.pop();
            true
        } else {
            false
        }
    }

    pub fn check_self_collision(&self) -> bool {
        let head = self.head();
        let radius = f64::from(self.cell_size);
        self.body[1..].iter().any(|seg| head.distance(*seg) < radius)
    }

    pub fn check_wall_collision(&self, board_width: i32, board_height: i32) -> bool {
        let head = self.head();
        let limit_x = play_limit(board_width, self.cell_size);
        let limit_y = play_limit(board_height, self.cell_size);

        head.x > limit_x || head.x < -limit_x || head.y > limit_y || head.y < -limit_y
    }

    pub fn head_char(&self) -> char {
        match self.heading() {
            Some(Up) => '^',
            Some(Down) => 'v',
            Some(Left) => '<',
            Some(Right) => '>',
            None => '@',
        }
    }

    #[cfg(test)]
    pub(crate) fn from_body(body: Vec<Position>, direction: Option<Direction>, cell_size: i32) -> Self {
        Snake { body, direction, pending: None, cell_size }
    }
}
