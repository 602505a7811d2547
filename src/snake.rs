use crate::grid::{self, Coords, CAPACITY};
use Direction::*;

pub const INITIAL_SNAKE_LENGTH: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn delta(self) -> (i16, i16) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right))
    }
}

/// Body segments with the head at index 0. Never holds more than
/// `CAPACITY` segments.
#[derive(Clone, Debug)]
pub struct Snake {
    body: Vec<Coords>,
    direction: Direction,
    pending: Direction,
}

impl Snake {
    /// Fresh snake in the middle of the board heading right, tail trailing
    /// to the left of the head.
    pub fn new() -> Self {
        let (mid_x, mid_y) = grid::center();
        let body = (0..INITIAL_SNAKE_LENGTH as i16)
            .map(|i| (mid_x - i, mid_y))
            .collect();

        Snake { body, direction: Right, pending: Right }
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    /// Queues a heading for the next `advance`. Checked against the heading
    /// the snake actually moved in, so a burst of keys between two moves
    /// can't fold it back onto its neck.
    pub fn set_direction(&mut self, new_direction: Direction) {
        if !new_direction.is_opposite(self.direction) {
            self.pending = new_direction;
        }
    }

    /// Rigid translation: each segment takes its predecessor's cell, then the
    /// head steps one cell along the heading.
    pub fn advance(&mut self) {
        self.direction = self.pending;

        for i in (1..self.body.len()).rev() {
            self.body[i] = self.body[i - 1];
        }

        let (dx, dy) = self.direction.delta();
        let head = &mut self.body[0];
        *head = (head.0 + dx, head.1 + dy);
    }

    /// Appends a copy of the last segment; the next `advance` drags it into
    /// a trailing cell. Returns false and leaves the snake alone at capacity.
    pub fn grow(&mut self) -> bool {
        if self.body.len() >= CAPACITY {
            return false;
        }

        let tail = self.body[self.body.len() - 1];
        self.body.push(tail);
        true
    }

    /// Only meaningful right after `advance`.
    pub fn collided(&self) -> bool {
        let head = self.head();
        !grid::in_bounds(head) || self.body[1..].contains(&head)
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }

    #[cfg(test)]
    pub(crate) fn from_segments(body: Vec<Coords>, direction: Direction) -> Self {
        Snake { body, direction, pending: direction }
    }
}
