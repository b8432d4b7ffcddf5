use serde::{Deserialize, Serialize};

/// A cell position on the board. `row` 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub col: i32,
    pub row: i32,
}

impl Pos {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn offset(self, dc: i32, dr: i32) -> Self {
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }

    /// True when `other` shares an edge with `self`.
    pub fn is_adjacent(self, other: Pos) -> bool {
        let dc = (self.col - other.col).abs();
        let dr = (self.row - other.row).abs();
        dc + dr == 1
    }

    /// The four edge neighbours, unfiltered (may be off the board).
    pub fn neighbors4(self) -> [Pos; 4] {
        [
            self.offset(0, -1),
            self.offset(1, 0),
            self.offset(0, 1),
            self.offset(-1, 0),
        ]
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.col, self.row)
    }
}

/// Rectangular board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims {
    pub cols: i32,
    pub rows: i32,
}

impl Dims {
    pub fn new(cols: i32, rows: i32) -> Self {
        assert!(cols > 0 && rows > 0, "Invalid board dimensions");
        Self { cols, rows }
    }

    pub fn contains(&self, p: Pos) -> bool {
        p.col >= 0 && p.row >= 0 && p.col < self.cols && p.row < self.rows
    }

    pub fn cell_count(&self) -> usize {
        (self.cols as usize) * (self.rows as usize)
    }

    /// Column-major traversal: every row of column 0, then column 1, ...
    pub fn iter_col_major(&self) -> impl Iterator<Item = Pos> + use<> {
        let cols = self.cols;
        let rows = self.rows;
        (0..cols).flat_map(move |col| (0..rows).map(move |row| Pos { col, row }))
    }
}
