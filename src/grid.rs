pub const WIDTH: i16 = 30;
pub const HEIGHT: i16 = 20;

/// Maximum number of segments the board can hold.
pub const CAPACITY: usize = WIDTH as usize * HEIGHT as usize;

/// Board cell as (x, y). Signed so a head that walks off the left or top
/// edge can still be represented before the collision check sees it.
pub type Coords = (i16, i16);

pub fn in_bounds(pos: Coords) -> bool {
    (0..WIDTH).contains(&pos.0) && (0..HEIGHT).contains(&pos.1)
}

pub fn center() -> Coords {
    (WIDTH / 2, HEIGHT / 2)
}
