use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{BoardConfig, ConfigError};
use crate::coords::Pos;
use crate::factory::TileFactory;
use crate::grid::{Grid, GridError};
use crate::layout::{BoardLayout, LayoutError};
use crate::matcher::{self, MatchGroup};
use crate::port::{EngineEvent, NullPresentation, PresentationPort, ReshuffleMove, Step};
use crate::scoring::ScoringPolicy;
use crate::tile::{Tile, TileId, TileKind};

/// Reshuffle attempts before giving up on finding a playable layout.
pub const MAX_RESHUFFLE_ATTEMPTS: u32 = 1000;

#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Invalid config: {0}")]
	Config(#[from] ConfigError),
	#[error("Invalid layout: {0}")]
	Layout(#[from] LayoutError),
	#[error("Grid access failed: {0}")]
	Grid(#[from] GridError),
	#[error("No playable layout after {attempts} reshuffles")]
	ReshuffleExhausted { attempts: u32 },
}

/// Why a swap was refused, or what went wrong while resolving it.
#[derive(Debug, Error)]
pub enum SwapError {
	#[error("A resolution cycle is already running")]
	Busy,
	#[error("The session is over")]
	SessionOver,
	#[error("Position {0} is outside the board")]
	OutOfBounds(Pos),
	#[error("No tile at {0}")]
	EmptyCell(Pos),
	#[error("{0} and {1} are not adjacent")]
	NotAdjacent(Pos, Pos),
	#[error(transparent)]
	Engine(#[from] EngineError),
}

impl SwapError {
	/// True for input that was refused without touching the board.
	pub fn is_rejection(&self) -> bool {
		!matches!(self, SwapError::Engine(_))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
	Idle,
	SwapPending,
	Resolving,
	Reshuffling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropMove {
	pub id: TileId,
	pub col: i32,
	pub from_row: i32,
	pub to_row: i32,
}

/// What one remove/drop/refill pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
	pub groups: Vec<MatchGroup>,
	pub points: u32,
	pub removed: Vec<Tile>,
	pub bonuses: Vec<Tile>,
	pub drops: Vec<DropMove>,
	pub spawned: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusReport {
	pub kind: TileKind,
	pub cleared: Vec<Tile>,
	pub points: u32,
}

/// Everything that happened during one accepted swap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
	pub bonus: Option<BonusReport>,
	pub passes: Vec<PassReport>,
	pub reshuffled: bool,
}

impl CascadeReport {
	pub fn points(&self) -> u32 {
		let bonus = self.bonus.as_ref().map_or(0, |b| b.points);
		self.passes.iter().fold(bonus, |acc, p| acc.saturating_add(p.points))
	}

	pub fn tiles_removed(&self) -> usize {
		let bonus = self.bonus.as_ref().map_or(0, |b| b.cleared.len());
		bonus + self.passes.iter().map(|p| p.removed.len()).sum::<usize>()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
	/// No match: the tiles went back where they were.
	Reverted,
	Resolved(CascadeReport),
}

/// Mutable state of one play session. The factory lives here because its
/// RNG and last-spawned kind are part of what makes a session reproducible.
#[derive(Debug, Clone)]
pub struct Session {
	pub grid: Grid,
	pub score: u32,
	pub busy: bool,
	pub state: EngineState,
	pub over: bool,
	pub factory: TileFactory,
}

#[derive(Debug)]
pub struct Engine<P: PresentationPort = NullPresentation> {
	config: BoardConfig,
	scoring: ScoringPolicy,
	session: Session,
	port: P,
}

impl<P: PresentationPort> Engine<P> {
	/// Starts a session on a freshly filled board. Accidental matches from the
	/// fill are resolved without scoring, and a dead board is reshuffled.
	#[instrument(skip(config, port), fields(cols = config.cols, rows = config.rows, seed = config.seed))]
	pub fn initialize(config: BoardConfig, port: P) -> Result<Self, EngineError> {
		config.validate()?;
		let mut factory = TileFactory::new(config.alphabet(), config.bonus_kind(), config.seed);
		factory.reset();
		let grid = Grid::new(config.cols, config.rows);
		let mut engine = Self::assemble(config, grid, factory, port);

		let placed = engine.session.factory.fill(&mut engine.session.grid);
		for t in &placed {
			engine.port.animate_spawn(t);
		}
		engine.port.await_step(Step::Refill);

		engine.session.state = EngineState::Resolving;
		let mut settle = CascadeReport::default();
		engine.cascade(&mut settle, false)?;
		engine.ensure_playable()?;
		engine.finish_cycle();
		info!(tiles = placed.len(), "session initialized");
		Ok(engine)
	}

	/// Starts a session on a hand-built board. The board is taken as is: no
	/// initial resolution and no reshuffle.
	pub fn from_layout(mut config: BoardConfig, layout: &BoardLayout, port: P) -> Result<Self, EngineError> {
		let (cols, rows) = layout.dims()?;
		config.cols = cols;
		config.rows = rows;
		config.validate_kinds()?;
		let mut factory = TileFactory::new(config.alphabet(), config.bonus_kind(), config.seed);
		let grid = layout.build(&config, &mut factory)?;
		debug!(cols, rows, "session started from layout");
		Ok(Self::assemble(config, grid, factory, port))
	}

	/// Picks up a session previously taken out with [`Engine::into_session`].
	pub fn resume(config: BoardConfig, session: Session, port: P) -> Self {
		let scoring = config.scoring;
		Self { config, scoring, session, port }
	}

	fn assemble(config: BoardConfig, grid: Grid, factory: TileFactory, port: P) -> Self {
		let scoring = config.scoring;
		let session = Session {
			grid,
			score: 0,
			busy: false,
			state: EngineState::Idle,
			over: false,
			factory,
		};
		Self { config, scoring, session, port }
	}

	pub fn config(&self) -> &BoardConfig {
		&self.config
	}
	pub fn grid(&self) -> &Grid {
		&self.session.grid
	}
	pub fn session(&self) -> &Session {
		&self.session
	}
	pub fn into_session(self) -> Session {
		self.session
	}
	pub fn port(&self) -> &P {
		&self.port
	}
	pub fn port_mut(&mut self) -> &mut P {
		&mut self.port
	}
	pub fn score(&self) -> u32 {
		self.session.score
	}
	pub fn is_busy(&self) -> bool {
		self.session.busy
	}
	pub fn state(&self) -> EngineState {
		self.session.state
	}
	pub fn is_over(&self) -> bool {
		self.session.over
	}

	pub fn tile_at(&self, pos: Pos) -> Result<Option<&Tile>, GridError> {
		self.session.grid.get(pos)
	}

	pub fn has_legal_move(&self) -> bool {
		matcher::has_legal_move(&self.session.grid)
	}

	pub fn hint(&self) -> Option<(Pos, Pos)> {
		matcher::find_legal_move(&self.session.grid)
	}

	/// Stop accepting swaps. A cycle already in flight has finished by the
	/// time this can be called, since `attempt_swap` holds `&mut self`.
	pub fn time_up(&mut self) {
		if !self.session.over {
			info!(score = self.session.score, "time up");
		}
		self.session.over = true;
	}

	fn validate_swap(&self, a: Pos, b: Pos) -> Result<(), SwapError> {
		if self.session.over {
			return Err(SwapError::SessionOver);
		}
		if self.session.busy {
			return Err(SwapError::Busy);
		}
		for p in [a, b] {
			match self.session.grid.get(p) {
				Err(_) => return Err(SwapError::OutOfBounds(p)),
				Ok(None) => return Err(SwapError::EmptyCell(p)),
				Ok(Some(_)) => {}
			}
		}
		if !self.session.grid.neighbors(a).any(|n| n == b) {
			return Err(SwapError::NotAdjacent(a, b));
		}
		Ok(())
	}

	/// Swaps the tiles at `a` and `b` and runs the resulting cycle to
	/// completion. Refused swaps leave the board untouched.
	#[instrument(skip(self))]
	pub fn attempt_swap(&mut self, a: Pos, b: Pos) -> Result<SwapOutcome, SwapError> {
		if let Err(e) = self.validate_swap(a, b) {
			debug!(error = %e, "swap refused");
			return Err(e);
		}

		self.session.busy = true;
		self.session.state = EngineState::SwapPending;
		let result = self.run_cycle(a, b);
		self.finish_cycle();
		if let Err(e) = &result {
			error!(error = %e, "resolution cycle failed");
		}
		result.map_err(SwapError::from)
	}

	fn run_cycle(&mut self, a: Pos, b: Pos) -> Result<SwapOutcome, EngineError> {
		self.session.grid.swap(a, b)?;
		let (ta, tb) = self.tile_pair(b, a)?;
		self.port.animate_swap(&ta, &tb);
		self.port.await_step(Step::Swap);

		let mut report = CascadeReport::default();
		if ta.is_bonus() != tb.is_bonus() {
			let (bonus, other) = if ta.is_bonus() { (ta, tb) } else { (tb, ta) };
			self.session.state = EngineState::Resolving;
			report.bonus = Some(self.activate_bonus(bonus, other)?);
		} else if !matcher::has_matches(&self.session.grid) {
			self.session.grid.swap(a, b)?;
			let (ra, rb) = self.tile_pair(a, b)?;
			self.port.animate_reject(&ra, &rb);
			self.port.await_step(Step::Reject);
			debug!("no match, swap reverted");
			return Ok(SwapOutcome::Reverted);
		}

		self.session.state = EngineState::Resolving;
		self.cascade(&mut report, true)?;
		report.reshuffled = self.ensure_playable()?;
		info!(
			points = report.points(),
			removed = report.tiles_removed(),
			passes = report.passes.len(),
			score = self.session.score,
			"swap resolved"
		);
		Ok(SwapOutcome::Resolved(report))
	}

	fn finish_cycle(&mut self) {
		debug_assert!(self.session.grid.coords_consistent());
		self.session.busy = false;
		self.session.state = EngineState::Idle;
		self.port.emit(EngineEvent::BoardIdle);
	}

	fn tile_pair(&self, a: Pos, b: Pos) -> Result<(Tile, Tile), EngineError> {
		let grid = &self.session.grid;
		let ta = grid.get(a)?.copied().ok_or(GridError::OutOfBounds(a))?;
		let tb = grid.get(b)?.copied().ok_or(GridError::OutOfBounds(b))?;
		Ok((ta, tb))
	}

	fn add_score(&mut self, points: u32) {
		if points == 0 {
			return;
		}
		self.session.score = self.session.score.saturating_add(points);
		self.port.emit(EngineEvent::ScoreChanged(self.session.score));
	}

	/// Clears every tile of `other`'s kind plus the bonus tile, then drops
	/// and refills. The caller runs the cascade afterwards.
	fn activate_bonus(&mut self, bonus: Tile, other: Tile) -> Result<BonusReport, EngineError> {
		let kind = other.kind;
		let targets: Vec<Pos> = self
			.session
			.grid
			.positions()
			.filter(|p| {
				self.session
					.grid
					.tile(*p)
					.is_some_and(|t| t.id == bonus.id || (t.is_matchable() && t.kind == kind))
			})
			.collect();

		let mut cleared = Vec::with_capacity(targets.len());
		for p in targets {
			if let Some(t) = self.session.grid.take(p)? {
				cleared.push(t);
			}
		}
		self.port.animate_removal(&cleared);
		self.port.await_step(Step::Removal);

		let points = self.scoring.bonus(cleared.len());
		self.add_score(points);
		info!(kind = kind.0, cleared = cleared.len(), points, "bonus activated");

		self.drop_tiles()?;
		self.refill();
		Ok(BonusReport { kind, cleared, points })
	}

	/// Runs remove/drop/refill passes until the board has no match.
	fn cascade(&mut self, report: &mut CascadeReport, award: bool) -> Result<(), EngineError> {
		while let Some(pass) = self.resolve_pass(award)? {
			report.passes.push(pass);
		}
		Ok(())
	}

	/// One pass of the resolving loop. Returns `None` when the board has no
	/// match, in which case nothing changes.
	pub fn resolve_pass(&mut self, award: bool) -> Result<Option<PassReport>, EngineError> {
		let groups = matcher::find_matches(&self.session.grid);
		if groups.is_empty() {
			return Ok(None);
		}
		debug_assert!(matcher::groups_are_disjoint(&groups));

		let mut points = 0u32;
		let mut anchors = Vec::new();
		for g in &groups {
			points = points.saturating_add(self.scoring.group(g.len()));
			if g.len() >= 5 {
				if let Some(anchor) = g.anchor() {
					anchors.push(anchor.pos());
				}
			}
		}

		let mut removed = Vec::new();
		for p in groups.iter().flat_map(|g| g.positions()) {
			if let Some(t) = self.session.grid.take(p)? {
				removed.push(t);
			}
		}
		self.port.animate_removal(&removed);
		self.port.await_step(Step::Removal);
		if award {
			self.add_score(points);
		}

		let mut bonuses = Vec::new();
		for p in anchors {
			if let Some(t) = self.session.factory.spawn_bonus(p) {
				self.session.grid.set(p, Some(t))?;
				self.port.animate_spawn(&t);
				bonuses.push(t);
			}
		}
		if !bonuses.is_empty() {
			self.port.await_step(Step::BonusSpawn);
		}

		let drops = self.drop_tiles()?;
		let spawned = self.refill();
		debug!(
			groups = groups.len(),
			removed = removed.len(),
			bonuses = bonuses.len(),
			points,
			"pass resolved"
		);
		Ok(Some(PassReport { groups, points: if award { points } else { 0 }, removed, bonuses, drops, spawned }))
	}

	/// Gravity: each column is compacted towards the bottom, keeping order.
	fn drop_tiles(&mut self) -> Result<Vec<DropMove>, EngineError> {
		let grid = &mut self.session.grid;
		let mut drops = Vec::new();
		for col in 0..grid.cols() {
			let mut write = grid.rows() - 1;
			for row in (0..grid.rows()).rev() {
				let from = Pos::new(col, row);
				let Some(tile) = grid.tile(from).copied() else {
					continue;
				};
				if row != write {
					grid.take(from)?;
					grid.set(Pos::new(col, write), Some(tile))?;
					drops.push(DropMove { id: tile.id, col, from_row: row, to_row: write });
				}
				write -= 1;
			}
		}
		for d in &drops {
			if let Some(t) = self.session.grid.tile(Pos::new(d.col, d.to_row)) {
				self.port.animate_drop(t, d.from_row, d.to_row);
			}
		}
		if !drops.is_empty() {
			self.port.await_step(Step::Drop);
		}
		Ok(drops)
	}

	fn refill(&mut self) -> Vec<Tile> {
		let placed = self.session.factory.fill(&mut self.session.grid);
		for t in &placed {
			self.port.animate_spawn(t);
		}
		if !placed.is_empty() {
			self.port.await_step(Step::Refill);
		}
		placed
	}

	/// Reshuffles if no legal move remains. Returns whether it did.
	pub fn ensure_playable(&mut self) -> Result<bool, EngineError> {
		if self.has_legal_move() {
			return Ok(false);
		}
		warn!("no legal move left, reshuffling");
		self.reshuffle()?;
		Ok(true)
	}

	/// Permutes the tiles until the board is match-free and has a legal move.
	pub fn reshuffle(&mut self) -> Result<(), EngineError> {
		let previous = self.session.state;
		self.session.state = EngineState::Reshuffling;
		for attempt in 1..=MAX_RESHUFFLE_ATTEMPTS {
			let moves = self.shuffle_once()?;
			self.port.animate_reshuffle(&moves);
			self.port.await_step(Step::Reshuffle);
			let grid = &self.session.grid;
			if !matcher::has_matches(grid) && matcher::has_legal_move(grid) {
				info!(attempt, "board reshuffled");
				self.port.emit(EngineEvent::BoardReshuffled);
				self.session.state = previous;
				return Ok(());
			}
			debug!(attempt, "reshuffle unplayable, retrying");
		}
		error!(attempts = MAX_RESHUFFLE_ATTEMPTS, "reshuffle exhausted");
		self.session.state = previous;
		Err(EngineError::ReshuffleExhausted { attempts: MAX_RESHUFFLE_ATTEMPTS })
	}

	/// One Fisher-Yates permutation of the occupied cells, reassigned in
	/// column-major order.
	fn shuffle_once(&mut self) -> Result<Vec<ReshuffleMove>, EngineError> {
		let cells: Vec<Pos> = self
			.session
			.grid
			.positions()
			.filter(|p| self.session.grid.tile(*p).is_some())
			.collect();
		let mut tiles: Vec<Tile> = cells.iter().filter_map(|p| self.session.grid.tile(*p).copied()).collect();
		self.session.factory.shuffle(&mut tiles);

		let mut moves = Vec::new();
		for (to, tile) in cells.into_iter().zip(tiles) {
			if tile.pos() != to {
				moves.push(ReshuffleMove { id: tile.id, from: tile.pos(), to });
			}
			self.session.grid.set(to, Some(tile))?;
		}
		Ok(moves)
	}
}
