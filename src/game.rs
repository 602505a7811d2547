use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;

use crate::food;
use crate::grid::Coords;
use crate::snake::{Direction, Snake};

pub const FOOD_SCORE: u32 = 10;

const BASE_DELAY_MS: u64 = 150;
const MIN_DELAY_MS: u64 = 50;
const POINTS_PER_MS: u64 = 20;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Running,
    Paused,
    Over,
}

/// What the player asked for, already decoded from whatever input device
/// produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    TogglePause,
    Quit,
}

/// What a single tick did to the round.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickResult {
    /// Paused or already over, nothing moved.
    Idle,
    Moved,
    Ate,
    Crashed,
    Quit,
    /// The snake covers every cell, so there is nowhere left for food.
    BoardFull,
}

/// Read-only snapshot handed to the renderer each tick.
pub struct View<'a> {
    pub snake: &'a Snake,
    pub food: Coords,
    pub score: u32,
    pub high_score: u32,
    pub state: GameState,
}

/// Per-round state. The high score lives with the caller since it outlives
/// any single round.
pub struct Game {
    snake: Snake,
    food: Coords,
    score: u32,
    state: GameState,
    won: bool,
    rng: StdRng,
}

impl Game {
    pub fn new(rng: StdRng) -> Self {
        let snake = Snake::new();
        let food = snake.head();
        let mut game = Game { snake, food, score: 0, state: GameState::Running, won: false, rng };
        game.reset();
        game
    }

    /// Starts a new round: fresh snake, fresh food, zero score, running.
    pub fn reset(&mut self) {
        self.snake = Snake::new();
        self.score = 0;
        self.won = false;
        self.state = GameState::Running;

        match food::place(&self.snake, &mut self.rng) {
            Some(pos) => self.food = pos,
            None => self.state = GameState::Over,
        }

        info!("New round, food at {:?}", self.food);
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Turn(dir) => self.snake.set_direction(dir),
            Command::TogglePause => match self.state {
                GameState::Running => {
                    self.state = GameState::Paused;
                    debug!("Paused at score {}", self.score);
                }
                GameState::Paused => {
                    self.state = GameState::Running;
                    debug!("Resumed");
                }
                GameState::Over => {}
            },
            Command::Quit => {
                if self.state != GameState::Over {
                    info!("Round quit at score {}", self.score);
                }
                self.state = GameState::Over;
            }
        }
    }

    /// One step of the round. Every queued command is applied first; among
    /// turns the last valid one wins.
    pub fn tick<I>(&mut self, commands: I) -> TickResult
    where
        I: IntoIterator<Item = Command>,
    {
        let mut quit = false;
        for command in commands {
            quit |= command == Command::Quit && self.state != GameState::Over;
            self.handle(command);
        }

        if quit {
            return TickResult::Quit;
        }
        if self.state != GameState::Running {
            return TickResult::Idle;
        }

        self.snake.advance();

        let mut result = TickResult::Moved;
        if self.snake.head() == self.food {
            self.snake.grow();
            self.score += FOOD_SCORE;
            result = TickResult::Ate;

            match food::place(&self.snake, &mut self.rng) {
                Some(pos) => {
                    debug!("Ate food, score {}, length {}, next food at {:?}", self.score, self.snake.len(), pos);
                    self.food = pos;
                }
                None => {
                    info!("Board full at score {}", self.score);
                    self.state = GameState::Over;
                    self.won = true;
                    return TickResult::BoardFull;
                }
            }
        }

        if self.snake.collided() {
            info!("Crashed at {:?} with score {}", self.snake.head(), self.score);
            self.state = GameState::Over;
            return TickResult::Crashed;
        }

        result
    }

    pub fn view(&self, high_score: u32) -> View<'_> {
        View {
            snake: &self.snake,
            food: self.food,
            score: self.score,
            high_score,
            state: self.state,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::Over
    }

    pub fn won(&self) -> bool {
        self.won
    }

    #[cfg(test)]
    pub(crate) fn set_food(&mut self, pos: Coords) {
        self.food = pos;
    }

    #[cfg(test)]
    pub(crate) fn set_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }
}

/// Delay between ticks: 150ms, one millisecond faster per 20 points, never
/// below 50ms.
pub fn tick_delay(score: u32) -> Duration {
    let ms = BASE_DELAY_MS.saturating_sub(score as u64 / POINTS_PER_MS);
    Duration::from_millis(ms.max(MIN_DELAY_MS))
}
