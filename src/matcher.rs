//! Match detection over a [`Grid`].
//!
//! Runs of three or more matchable tiles of one kind are collected row by row
//! and column by column, then merged until no two groups share a cell. An
//! L, T or plus shape therefore comes back as a single group.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::coords::Pos;
use crate::grid::{Grid, GridError};
use crate::tile::{Tile, TileKind};

/// Length a run needs before it counts as a match.
pub const MIN_RUN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub kind: TileKind,
    pub tiles: Vec<Tile>,
}

impl MatchGroup {
    fn from_run(run: Vec<Tile>) -> Self {
        let kind = run[0].kind;
        Self { kind, tiles: run }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, p: Pos) -> bool {
        self.tiles.iter().any(|t| t.pos() == p)
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.tiles.iter().map(Tile::pos)
    }

    fn intersects(&self, other: &MatchGroup) -> bool {
        other.tiles.iter().any(|t| self.contains(t.pos()))
    }

    fn absorb(&mut self, other: MatchGroup) {
        for t in other.tiles {
            if !self.contains(t.pos()) {
                self.tiles.push(t);
            }
        }
    }

    /// Number of group members sharing an edge with `p`.
    pub fn in_group_neighbors(&self, p: Pos) -> usize {
        p.neighbors4().iter().filter(|n| self.contains(**n)).count()
    }

    /// How many runs pass through `p`: 1 for a plain run member, 2 where a
    /// horizontal and a vertical run cross.
    pub fn runs_through(&self, p: Pos) -> usize {
        [(1, 0), (0, 1)]
            .into_iter()
            .filter(|&(dc, dr)| self.stretch(p, dc, dr) >= MIN_RUN)
            .count()
    }

    /// Length of the unbroken line of members through `p` along one axis.
    fn stretch(&self, p: Pos, dc: i32, dr: i32) -> usize {
        if !self.contains(p) {
            return 0;
        }
        let mut len = 1;
        for sign in [1, -1] {
            let mut q = p.offset(sign * dc, sign * dr);
            while self.contains(q) {
                len += 1;
                q = q.offset(sign * dc, sign * dr);
            }
        }
        len
    }

    /// The member with the most in-group neighbours. Ties go to the member
    /// crossed by more runs, then to the one that appears first.
    pub fn anchor(&self) -> Option<Tile> {
        let mut best: Option<(Tile, (usize, usize))> = None;
        for t in &self.tiles {
            let key = (self.in_group_neighbors(t.pos()), self.runs_through(t.pos()));
            if best.is_none_or(|(_, b)| key > b) {
                best = Some((*t, key));
            }
        }
        best.map(|(t, _)| t)
    }
}

fn flush(run: &mut Vec<Tile>, out: &mut Vec<MatchGroup>) {
    if run.len() >= MIN_RUN {
        out.push(MatchGroup::from_run(std::mem::take(run)));
    } else {
        run.clear();
    }
}

fn scan_line(grid: &Grid, line: impl Iterator<Item = Pos>, out: &mut Vec<MatchGroup>) {
    let mut run: Vec<Tile> = Vec::new();
    for p in line {
        match grid.tile(p) {
            Some(t) if t.is_matchable() => {
                if run.last().is_some_and(|last| !last.matches_kind(t)) {
                    flush(&mut run, out);
                }
                run.push(*t);
            }
            _ => flush(&mut run, out),
        }
    }
    flush(&mut run, out);
}

/// Raw horizontal and vertical runs, before merging.
pub fn find_runs(grid: &Grid) -> Vec<MatchGroup> {
    let mut runs = Vec::new();
    for row in 0..grid.rows() {
        scan_line(grid, (0..grid.cols()).map(|col| Pos::new(col, row)), &mut runs);
    }
    for col in 0..grid.cols() {
        scan_line(grid, (0..grid.rows()).map(|row| Pos::new(col, row)), &mut runs);
    }
    runs
}

/// Merges groups that share a cell until every pair is disjoint.
pub fn merge_overlapping(groups: Vec<MatchGroup>) -> Vec<MatchGroup> {
    let mut merged: Vec<MatchGroup> = Vec::with_capacity(groups.len());
    for group in groups {
        let mut current = group;
        // Pull in every existing group that touches the incoming one; the
        // result may now touch others, so keep going until nothing changes.
        loop {
            let hit = merged.iter().position(|m| m.intersects(&current));
            match hit {
                Some(i) => {
                    let mut existing = merged.remove(i);
                    existing.absorb(current);
                    current = existing;
                }
                None => break,
            }
        }
        merged.push(current);
    }
    merged
}

/// All match groups on the board. Pure: the same grid always yields the same
/// groups, and no two returned groups share a tile.
pub fn find_matches(grid: &Grid) -> Vec<MatchGroup> {
    merge_overlapping(find_runs(grid))
}

pub fn has_matches(grid: &Grid) -> bool {
    !find_runs(grid).is_empty()
}

/// Whether swapping `a` and `b` would do something: complete a run, or pair
/// a bonus tile with an ordinary one.
/// `scratch` is swapped back before returning.
fn swap_is_productive(scratch: &mut Grid, a: Pos, b: Pos) -> Result<bool, GridError> {
    let (Some(ta), Some(tb)) = (scratch.tile(a), scratch.tile(b)) else {
        return Ok(false);
    };
    if ta.is_bonus() != tb.is_bonus() {
        return Ok(true);
    }
    scratch.swap(a, b)?;
    let productive = has_matches(scratch);
    scratch.swap(a, b)?;
    Ok(productive)
}

/// First productive swap in column-major order, checking the right and
/// lower neighbour of each cell. The grid passed in is never modified.
pub fn find_legal_move(grid: &Grid) -> Option<(Pos, Pos)> {
    let mut scratch = grid.clone();
    for p in grid.positions() {
        for q in [p.offset(1, 0), p.offset(0, 1)] {
            if grid.in_bounds(q) && matches!(swap_is_productive(&mut scratch, p, q), Ok(true)) {
                return Some((p, q));
            }
        }
    }
    None
}

pub fn has_legal_move(grid: &Grid) -> bool {
    find_legal_move(grid).is_some()
}

/// Sanity check used by tests and debug logging.
pub fn groups_are_disjoint(groups: &[MatchGroup]) -> bool {
    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|g| g.positions())
        .all(|p| seen.insert(p))
}
