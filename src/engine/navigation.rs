/// Arrow-key movement of the focus cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Next focus index on a `width` x `height` row-major grid.
///
/// Edges wrap like a torus: leaving the top re-enters at the bottom of the
/// same column, leaving the right edge re-enters at the start of the same row.
/// `width * height` must be non-zero and `current` must be in range.
pub fn resolve(direction: Direction, current: usize, width: usize, height: usize) -> usize {
    match direction {
        Direction::Up => {
            if current >= width {
                current - width
            } else {
                width * height - 1 - (width - 1 - current)
            }
        }
        Direction::Down => {
            if current < width * (height - 1) {
                current + width
            } else {
                current % width
            }
        }
        Direction::Left => {
            if current % width != 0 {
                current - 1
            } else {
                current + width - 1
            }
        }
        Direction::Right => {
            if current % width != width - 1 {
                current + 1
            } else {
                current + 1 - width
            }
        }
    }
}
