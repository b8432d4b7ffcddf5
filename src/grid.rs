use thiserror::Error;

use crate::coords::{Dims, Pos};
use crate::tile::{Tile, TileKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Position {0} is outside the board")]
    OutOfBounds(Pos),
}

/// Fixed-size board of tile slots. A stored tile's `col`/`row` always
/// equal the slot it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    dims: Dims,
    slots: Vec<Option<Tile>>,
}

impl Grid {
    pub fn new(cols: i32, rows: i32) -> Self {
        let dims = Dims::new(cols, rows);
        Self {
            dims,
            slots: vec![None; dims.cell_count()],
        }
    }

    pub fn cols(&self) -> i32 {
        self.dims.cols
    }
    pub fn rows(&self) -> i32 {
        self.dims.rows
    }
    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn in_bounds(&self, p: Pos) -> bool {
        self.dims.contains(p)
    }

    fn index(&self, p: Pos) -> Result<usize, GridError> {
        if !self.in_bounds(p) {
            return Err(GridError::OutOfBounds(p));
        }
        Ok((p.row * self.dims.cols + p.col) as usize)
    }

    pub fn get(&self, p: Pos) -> Result<Option<&Tile>, GridError> {
        let i = self.index(p)?;
        Ok(self.slots[i].as_ref())
    }

    /// Like `get`, but treats off-board cells as empty.
    pub fn tile(&self, p: Pos) -> Option<&Tile> {
        self.get(p).ok().flatten()
    }

    /// Stores `slot` at `p`, rewriting the tile's coordinates to `p`.
    pub fn set(&mut self, p: Pos, slot: Option<Tile>) -> Result<(), GridError> {
        let i = self.index(p)?;
        self.slots[i] = slot.map(|mut t| {
            t.col = p.col;
            t.row = p.row;
            t
        });
        Ok(())
    }

    pub fn take(&mut self, p: Pos) -> Result<Option<Tile>, GridError> {
        let i = self.index(p)?;
        Ok(self.slots[i].take())
    }

    /// Exchanges two slots and keeps both tiles' coordinates in sync.
    pub fn swap(&mut self, a: Pos, b: Pos) -> Result<(), GridError> {
        let ia = self.index(a)?;
        let ib = self.index(b)?;
        self.slots.swap(ia, ib);
        for (i, p) in [(ia, a), (ib, b)] {
            if let Some(t) = self.slots[i].as_mut() {
                t.col = p.col;
                t.row = p.row;
            }
        }
        Ok(())
    }

    /// In-bounds edge neighbours of `p`.
    pub fn neighbors(&self, p: Pos) -> impl Iterator<Item = Pos> + '_ {
        p.neighbors4().into_iter().filter(move |n| self.in_bounds(*n))
    }

    /// Every cell, column-major.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        self.dims.iter_col_major()
    }

    /// Occupied tiles in column-major order.
    pub fn occupied(&self) -> Vec<Tile> {
        self.positions().filter_map(|p| self.tile(p).copied()).collect()
    }

    pub fn empty_cells(&self) -> Vec<Pos> {
        self.positions().filter(|p| self.tile(*p).is_none()).collect()
    }

    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|t| t.is_matchable() && t.kind == kind)
            .count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Checks that every stored tile knows where it is.
    pub fn coords_consistent(&self) -> bool {
        self.positions()
            .all(|p| self.tile(p).is_none_or(|t| t.pos() == p))
    }
}
