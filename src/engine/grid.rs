/// One question of the table: `x` times `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    pub answer: Option<u32>,
    pub is_correct: Option<bool>,
}

impl Cell {
    pub fn new(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            answer: None,
            is_correct: None,
        }
    }

    pub fn product(&self) -> u32 {
        self.x * self.y
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Factors shown along one axis of the table.
///
/// Currently always `1..=n`; callers only rely on getting `n` factors back,
/// so a shuffled or offset range can be swapped in later.
pub fn build_range(n: u16) -> Vec<u32> {
    (1..=u32::from(n)).collect()
}

/// Row-major cell collection: rows outer, columns inner.
///
/// The flat index of `(row_idx, col_idx)` is `row_idx * cols.len() + col_idx`
/// and everything else in the crate depends on that mapping.
pub fn build_cells(rows: &[u32], cols: &[u32]) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(rows.len() * cols.len());
    for &y in rows {
        for &x in cols {
            cells.push(Cell::new(x, y));
        }
    }
    cells
}

pub fn cell_index(row_idx: usize, col_idx: usize, num_cols: usize) -> usize {
    row_idx * num_cols + col_idx
}

/// Inverse of [`cell_index`]: `(row_idx, col_idx)`.
pub fn cell_position(index: usize, num_cols: usize) -> (usize, usize) {
    (index / num_cols, index % num_cols)
}
