use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::trace;

use crate::coords::Pos;
use crate::grid::Grid;
use crate::tile::{Tile, TileId, TileKind};

/// Produces tiles for the initial fill, refills and bonus spawns.
///
/// All randomness in a session flows through the one seeded `StdRng`
/// held here, so a seed plus a sequence of swaps reproduces a game exactly.
#[derive(Debug, Clone)]
pub struct TileFactory {
    alphabet: Vec<TileKind>,
    bonus: Option<TileKind>,
    rng: StdRng,
    last_spawned: Option<TileKind>,
    next_id: u32,
}

impl TileFactory {
    pub fn new(alphabet: Vec<TileKind>, bonus: Option<TileKind>, seed: u64) -> Self {
        assert!(!alphabet.is_empty(), "TileFactory needs at least one kind");
        Self {
            alphabet,
            bonus,
            rng: StdRng::seed_from_u64(seed),
            last_spawned: None,
            next_id: 0,
        }
    }

    pub fn alphabet(&self) -> &[TileKind] {
        &self.alphabet
    }

    pub fn bonus_kind(&self) -> Option<TileKind> {
        self.bonus
    }

    pub fn last_spawned(&self) -> Option<TileKind> {
        self.last_spawned
    }

    /// Forget the streak state; called at session start.
    pub fn reset(&mut self) {
        self.last_spawned = None;
    }

    fn mint_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Kind shared by the two cells at `a` and `b`, if both hold matchable tiles
    /// of the same kind.
    fn pair_kind(grid: &Grid, a: Pos, b: Pos) -> Option<TileKind> {
        let t1 = grid.tile(a)?;
        let t2 = grid.tile(b)?;
        t1.matches_kind(t2).then_some(t1.kind)
    }

    /// Chooses a kind for `pos` that does not complete a run with the two
    /// cells to its left or the two cells above it.
    pub fn spawn_kind(&mut self, grid: &Grid, pos: Pos) -> TileKind {
        let mut candidates = self.alphabet.clone();

        let banned = [
            Self::pair_kind(grid, pos.offset(-1, 0), pos.offset(-2, 0)),
            Self::pair_kind(grid, pos.offset(0, -1), pos.offset(0, -2)),
        ];
        for kind in banned.into_iter().flatten() {
            candidates.retain(|k| *k != kind);
        }

        // Anti-streak: applied across the whole board, not per column.
        if let Some(last) = self.last_spawned {
            if candidates.len() > 1 && candidates.contains(&last) {
                candidates.retain(|k| *k != last);
            }
        }

        // Never block spawning: the fallback is the unrestricted alphabet.
        if candidates.is_empty() {
            candidates = self.alphabet.clone();
        }

        let kind = candidates[self.rng.gen_range(0..candidates.len())];
        trace!(col = pos.col, row = pos.row, kind = kind.0, "spawn kind chosen");
        self.last_spawned = Some(kind);
        kind
    }

    pub fn spawn(&mut self, grid: &Grid, pos: Pos) -> Tile {
        let kind = self.spawn_kind(grid, pos);
        self.make(kind, pos)
    }

    /// Mints a tile of a given kind without consulting the spawn rules.
    pub fn make(&mut self, kind: TileKind, pos: Pos) -> Tile {
        Tile::new(self.mint_id(), kind, pos)
    }

    /// Creates a bonus tile, or `None` if the board has no bonus kind.
    pub fn spawn_bonus(&mut self, pos: Pos) -> Option<Tile> {
        let kind = self.bonus?;
        Some(Tile::bonus(self.mint_id(), kind, pos))
    }

    /// Fills every empty cell, column by column, top to bottom. Returns the
    /// tiles placed, in placement order.
    pub fn fill(&mut self, grid: &mut Grid) -> Vec<Tile> {
        let mut placed = Vec::new();
        for pos in grid.empty_cells() {
            let tile = self.spawn(grid, pos);
            // empty_cells only yields in-bounds positions
            if grid.set(pos, Some(tile)).is_ok() {
                placed.push(tile);
            }
        }
        placed
    }

    /// Fisher-Yates shuffle driven by the session RNG.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
