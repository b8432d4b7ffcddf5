use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BoardConfig;
use crate::coords::Pos;
use crate::factory::TileFactory;
use crate::grid::Grid;
use crate::tile::TileKind;

pub const EMPTY_CELL: char = '.';
pub const BONUS_CELL: char = '*';

#[derive(Debug, Error)]
pub enum LayoutError {
	#[error("Layout has no rows")]
	Empty,
	#[error("Row {row} has {got} cells, expected {expected}")]
	Ragged { row: usize, expected: usize, got: usize },
	#[error("Unknown symbol '{symbol}' at {pos}")]
	UnknownSymbol { symbol: char, pos: Pos },
	#[error("Symbol '{0}' matches more than one kind")]
	AmbiguousSymbol(char),
	#[error("Bonus cell at {0} but the board has no bonus kind")]
	NoBonusKind(Pos),
	#[error("Invalid layout JSON: {0}")]
	Json(#[from] serde_json::Error),
}

/// A hand-written board. Each row is a string with one symbol per cell:
/// a digit (kind index), the first letter of a kind name, `*` for the bonus
/// tile or `.` for an empty cell. Row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
	pub rows: Vec<String>,
}

impl BoardLayout {
	pub fn from_rows(rows: &[&str]) -> Self {
		Self { rows: rows.iter().map(|r| r.to_string()).collect() }
	}

	pub fn from_json(s: &str) -> Result<Self, LayoutError> {
		Ok(serde_json::from_str(s)?)
	}

	/// `(cols, rows)`, after checking the layout is rectangular.
	pub fn dims(&self) -> Result<(i32, i32), LayoutError> {
		let first = self.rows.first().ok_or(LayoutError::Empty)?;
		let expected = first.chars().count();
		if expected == 0 {
			return Err(LayoutError::Empty);
		}
		for (row, line) in self.rows.iter().enumerate() {
			let got = line.chars().count();
			if got != expected {
				return Err(LayoutError::Ragged { row, expected, got });
			}
		}
		Ok((expected as i32, self.rows.len() as i32))
	}

	/// Reads one layout symbol; `Ok(None)` is an empty cell.
	fn resolve(symbol: char, pos: Pos, config: &BoardConfig) -> Result<Option<TileKind>, LayoutError> {
		if symbol == EMPTY_CELL {
			return Ok(None);
		}
		if symbol == BONUS_CELL {
			return config.bonus_kind().map(Some).ok_or(LayoutError::NoBonusKind(pos));
		}
		if let Some(d) = symbol.to_digit(10) {
			if (d as usize) < config.kinds.len() {
				return Ok(Some(TileKind(d as u8)));
			}
			return Err(LayoutError::UnknownSymbol { symbol, pos });
		}
		let mut hits = config.kinds.iter().enumerate().filter(|(_, name)| {
			name.chars().next().is_some_and(|c| c.eq_ignore_ascii_case(&symbol))
		});
		match (hits.next(), hits.next()) {
			(Some((i, _)), None) => Ok(Some(TileKind(i as u8))),
			(Some(_), Some(_)) => Err(LayoutError::AmbiguousSymbol(symbol)),
			_ => Err(LayoutError::UnknownSymbol { symbol, pos }),
		}
	}

	/// Builds the grid, minting tile ids from `factory` so they never collide
	/// with tiles spawned later in the session.
	pub fn build(&self, config: &BoardConfig, factory: &mut TileFactory) -> Result<Grid, LayoutError> {
		let (cols, rows) = self.dims()?;
		let mut grid = Grid::new(cols, rows);
		for (r, line) in self.rows.iter().enumerate() {
			for (c, symbol) in line.chars().enumerate() {
				let pos = Pos::new(c as i32, r as i32);
				let tile = match Self::resolve(symbol, pos, config)? {
					None => None,
					Some(kind) if Some(kind) == config.bonus_kind() => factory.spawn_bonus(pos),
					Some(kind) => Some(factory.make(kind, pos)),
				};
				grid.set(pos, tile).map_err(|_| LayoutError::UnknownSymbol { symbol, pos })?;
			}
		}
		Ok(grid)
	}

	/// Renders a grid back into layout rows using kind indices.
	pub fn capture(grid: &Grid) -> Self {
		let rows = (0..grid.rows())
			.map(|row| {
				(0..grid.cols())
					.map(|col| match grid.tile(Pos::new(col, row)) {
						None => EMPTY_CELL,
						Some(t) if t.is_bonus() => BONUS_CELL,
						Some(t) => char::from_digit(t.kind.0 as u32, 10).unwrap_or('?'),
					})
					.collect()
			})
			.collect();
		Self { rows }
	}
}
