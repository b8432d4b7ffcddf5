use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::ScoringPolicy;
use crate::tile::TileKind;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Board must be at least 3x3, got {cols}x{rows}")]
	TooSmall { cols: i32, rows: i32 },
	#[error("Need at least 2 tile kinds, got {0}")]
	TooFewKinds(usize),
	#[error("Too many tile kinds: {0}")]
	TooManyKinds(usize),
	#[error("Duplicate tile kind: {0}")]
	DuplicateKind(String),
	#[error("Bonus kind {0} collides with a regular kind")]
	BonusCollides(String),
	#[error("Invalid config JSON: {0}")]
	Json(#[from] serde_json::Error),
}

fn default_rows() -> i32 {
	7
}
fn default_cols() -> i32 {
	5
}
fn default_kinds() -> Vec<String> {
	["APPLE", "BERRY", "CARROT", "PEAR"].iter().map(|s| s.to_string()).collect()
}

/// Everything needed to start a session: board size, kind alphabet,
/// optional bonus kind, seed and scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
	#[serde(default = "default_rows")]
	pub rows: i32,
	#[serde(default = "default_cols")]
	pub cols: i32,
	#[serde(default = "default_kinds")]
	pub kinds: Vec<String>,
	#[serde(default)]
	pub bonus: Option<String>,
	#[serde(default)]
	pub seed: u64,
	#[serde(default)]
	pub scoring: ScoringPolicy,
}

impl Default for BoardConfig {
	fn default() -> Self {
		Self::classic()
	}
}

impl BoardConfig {
	/// Seven rows, five columns, four fruits, no bonus tile.
	pub fn classic() -> Self {
		Self {
			rows: default_rows(),
			cols: default_cols(),
			kinds: default_kinds(),
			bonus: None,
			seed: 0,
			scoring: ScoringPolicy::default(),
		}
	}

	/// The classic board plus a bonus kind.
	pub fn with_bonus() -> Self {
		Self { bonus: Some("STAR".to_string()), ..Self::classic() }
	}

	pub fn sized(mut self, cols: i32, rows: i32) -> Self {
		self.cols = cols;
		self.rows = rows;
		self
	}

	pub fn seeded(mut self, seed: u64) -> Self {
		self.seed = seed;
		self
	}

	pub fn from_json(s: &str) -> Result<Self, ConfigError> {
		let cfg: BoardConfig = serde_json::from_str(s)?;
		cfg.validate()?;
		Ok(cfg)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.rows < 3 || self.cols < 3 {
			return Err(ConfigError::TooSmall { cols: self.cols, rows: self.rows });
		}
		self.validate_kinds()
	}

	/// Alphabet checks only; hand-built layouts may be smaller than 3x3.
	pub fn validate_kinds(&self) -> Result<(), ConfigError> {
		if self.kinds.len() < 2 {
			return Err(ConfigError::TooFewKinds(self.kinds.len()));
		}
		// one slot is reserved for the bonus kind
		if self.kinds.len() >= u8::MAX as usize {
			return Err(ConfigError::TooManyKinds(self.kinds.len()));
		}
		for (i, k) in self.kinds.iter().enumerate() {
			if self.kinds[..i].iter().any(|other| other.eq_ignore_ascii_case(k)) {
				return Err(ConfigError::DuplicateKind(k.clone()));
			}
		}
		if let Some(b) = &self.bonus {
			if self.kinds.iter().any(|k| k.eq_ignore_ascii_case(b)) {
				return Err(ConfigError::BonusCollides(b.clone()));
			}
		}
		Ok(())
	}

	/// The regular kinds, in declaration order.
	pub fn alphabet(&self) -> Vec<TileKind> {
		(0..self.kinds.len()).map(|i| TileKind(i as u8)).collect()
	}

	pub fn bonus_kind(&self) -> Option<TileKind> {
		self.bonus.as_ref().map(|_| TileKind(self.kinds.len() as u8))
	}

	pub fn kind_name(&self, kind: TileKind) -> &str {
		if Some(kind) == self.bonus_kind() {
			return self.bonus.as_deref().unwrap_or("BONUS");
		}
		self.kinds.get(kind.0 as usize).map(String::as_str).unwrap_or("?")
	}

	pub fn kind_by_name(&self, name: &str) -> Option<TileKind> {
		if self.bonus.as_deref().is_some_and(|b| b.eq_ignore_ascii_case(name)) {
			return self.bonus_kind();
		}
		self.kinds
			.iter()
			.position(|k| k.eq_ignore_ascii_case(name))
			.map(|i| TileKind(i as u8))
	}
}
