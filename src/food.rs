use rand::Rng;

use crate::grid::{Coords, CAPACITY, HEIGHT, WIDTH};
use crate::snake::Snake;

/// Picks a uniformly random cell the snake doesn't cover. `None` once the
/// snake fills the whole board.
pub fn place<R: Rng + ?Sized>(snake: &Snake, rng: &mut R) -> Option<Coords> {
    if snake.len() >= CAPACITY {
        return None;
    }

    loop {
        let pos = (rng.gen_range(0..WIDTH), rng.gen_range(0..HEIGHT));
        if !snake.occupies(pos) {
            return Some(pos);
        }
    }
}
