use std::collections::VecDeque;

use rand::Rng;

use Direction::*;

pub const GRID_SIZE: i32 = 20;
pub const START_DELAY_MS: u64 = 200;
const START_POS: Position = Position { x: 10, y: 10 };

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// A grid cell, 1-indexed on both axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn moved(self, direction: Direction) -> Self {
        match direction {
            Up => Position::new(self.x, self.y - 1),
            Down => Position::new(self.x, self.y + 1),
            Left => Position::new(self.x - 1, self.y),
            Right => Position::new(self.x + 1, self.y),
        }
    }

    pub fn in_bounds(self) -> bool {
        (1..=GRID_SIZE).contains(&self.x) && (1..=GRID_SIZE).contains(&self.y)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Collision {
    Boundary,
    SelfCollision,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Moved,
    Captured { delay_ms: u64 },
    Crashed(Collision),
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Head first.
    pub snake: VecDeque<Position>,
    pub food: Position,
    pub direction: Direction,
    pub delay_ms: u64,
    pub running: bool,
    pub high_score: u32,
}

impl GameState {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let snake: VecDeque<Position> = std::iter::once(START_POS).collect();
        let food = spawn_food(&snake, rng);

        GameState { snake, food, direction: Right, delay_ms: START_DELAY_MS, running: false, high_score: 0 }
    }

    /// Back to the starting layout. The high score survives.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        let high_score = self.high_score;
        *self = GameState::new(rng);
        self.high_score = high_score;
    }

    pub fn head(&self) -> Position {
        self.snake[0]
    }

    pub fn score(&self) -> u32 {
        self.snake.len() as u32 - 1
    }

    /// Returns true when the current score beat the stored record.
    pub fn record_high_score(&mut self) -> bool {
        let score = self.score();
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    /// Moves the snake one cell. A crash leaves the state as it was.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) -> Step {
        let new_head = self.head().moved(self.direction);

        if !new_head.in_bounds() {
            return Step::Crashed(Collision::Boundary);
        }

        // The tail still counts: it has not moved out of the way yet
        if self.snake.iter().skip(1).any(|seg| *seg == new_head) {
            return Step::Crashed(Collision::SelfCollision);
        }

        self.snake.push_front(new_head);

        if new_head == self.food {
            self.food = spawn_food(&self.snake, rng);
            self.delay_ms = next_delay(self.delay_ms);
            Step::Captured { delay_ms: self.delay_ms }
        } else {
            self.snake.pop_back();
            Step::Moved
        }
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

/// Picks a random free cell by resampling until one misses the snake.
/// Never returns if the snake covers the whole grid.
pub fn spawn_food<R: Rng>(snake: &VecDeque<Position>, rng: &mut R) -> Position {
    loop {
        let pos = Position::new(rng.gen_range(1..=GRID_SIZE), rng.gen_range(1..=GRID_SIZE));
        if !snake.contains(&pos) {
            return pos;
        }
    }
}

/// Tick delay after one more capture. Steps shrink as the game speeds up
/// and stop at 25ms.
pub fn next_delay(delay_ms: u64) -> u64 {
    match delay_ms {
        d if d > 150 => d - 5,
        d if d > 100 => d - 3,
        d if d > 50 => d - 2,
        d if d > 25 => d - 1,
        d => d,
    }
}
