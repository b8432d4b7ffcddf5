use serde::{Deserialize, Serialize};

use crate::coords::Pos;

/// Index into the board's kind alphabet. The bonus kind, when configured,
/// sits one past the last regular kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKind(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialKind {
	Bonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
	pub id: TileId,
	pub kind: TileKind,
	pub col: i32,
	pub row: i32,
	pub special: Option<SpecialKind>,
}

impl Tile {
	pub fn new(id: TileId, kind: TileKind, pos: Pos) -> Self {
		Self { id, kind, col: pos.col, row: pos.row, special: None }
	}

	pub fn bonus(id: TileId, kind: TileKind, pos: Pos) -> Self {
		Self { id, kind, col: pos.col, row: pos.row, special: Some(SpecialKind::Bonus) }
	}

	pub fn pos(&self) -> Pos {
		Pos::new(self.col, self.row)
	}

	pub fn is_bonus(&self) -> bool {
		matches!(self.special, Some(SpecialKind::Bonus))
	}

	/// Bonus tiles never form runs.
	pub fn is_matchable(&self) -> bool {
		self.special.is_none()
	}

	pub fn matches_kind(&self, other: &Tile) -> bool {
		self.is_matchable() && other.is_matchable() && self.kind == other.kind
	}
}
