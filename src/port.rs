//! Boundary between the engine and whatever draws the board.
//!
//! The engine calls the `animate_*` methods to request motion, then calls
//! [`PresentationPort::await_step`] once per step. That call is the barrier:
//! an implementation returns from it only when every animation requested
//! for the step has finished. Events sent through [`PresentationPort::emit`]
//! are fire-and-forget.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::coords::Pos;
use crate::tile::{Tile, TileId};

/// The logical phase an animation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Swap,
    Reject,
    Removal,
    BonusSpawn,
    Drop,
    Refill,
    Reshuffle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    ScoreChanged(u32),
    BoardIdle,
    BoardReshuffled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReshuffleMove {
    pub id: TileId,
    pub from: Pos,
    pub to: Pos,
}

pub trait PresentationPort {
    fn animate_swap(&mut self, _a: &Tile, _b: &Tile) {}
    fn animate_reject(&mut self, _a: &Tile, _b: &Tile) {}
    fn animate_removal(&mut self, _tiles: &[Tile]) {}
    fn animate_drop(&mut self, _tile: &Tile, _from_row: i32, _to_row: i32) {}
    fn animate_spawn(&mut self, _tile: &Tile) {}
    fn animate_reshuffle(&mut self, _moves: &[ReshuffleMove]) {}
    fn await_step(&mut self, _step: Step) {}
    fn emit(&mut self, _event: EngineEvent) {}
}

/// Discards everything. Useful for headless simulation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentation;

impl PresentationPort for NullPresentation {}

/// One recorded port call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortCall {
    Swap { a: TileId, b: TileId },
    Reject { a: TileId, b: TileId },
    Removal { tiles: Vec<TileId> },
    Drop { tile: TileId, col: i32, from_row: i32, to_row: i32 },
    Spawn { tile: TileId, pos: Pos, bonus: bool },
    Reshuffle { moves: Vec<ReshuffleMove> },
    Barrier(Step),
    Event(EngineEvent),
}

/// Keeps every call in order, for tests and replay dumps.
#[derive(Debug, Default, Clone)]
pub struct RecordingPresentation {
    pub calls: Vec<PortCall>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PortCall::Event(e) => Some(*e),
                _ => None,
            })
            .collect()
    }

    pub fn barriers(&self) -> Vec<Step> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PortCall::Barrier(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn removed(&self) -> Vec<TileId> {
        self.calls
            .iter()
            .flat_map(|c| match c {
                PortCall::Removal { tiles } => tiles.clone(),
                _ => Vec::new(),
            })
            .collect()
    }

    pub fn spawns(&self) -> Vec<(TileId, Pos, bool)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PortCall::Spawn { tile, pos, bonus } => Some((*tile, *pos, *bonus)),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.calls)
    }
}

impl PresentationPort for RecordingPresentation {
    fn animate_swap(&mut self, a: &Tile, b: &Tile) {
        self.calls.push(PortCall::Swap { a: a.id, b: b.id });
    }

    fn animate_reject(&mut self, a: &Tile, b: &Tile) {
        self.calls.push(PortCall::Reject { a: a.id, b: b.id });
    }

    fn animate_removal(&mut self, tiles: &[Tile]) {
        self.calls.push(PortCall::Removal {
            tiles: tiles.iter().map(|t| t.id).collect(),
        });
    }

    fn animate_drop(&mut self, tile: &Tile, from_row: i32, to_row: i32) {
        self.calls.push(PortCall::Drop {
            tile: tile.id,
            col: tile.col,
            from_row,
            to_row,
        });
    }

    fn animate_spawn(&mut self, tile: &Tile) {
        self.calls.push(PortCall::Spawn {
            tile: tile.id,
            pos: tile.pos(),
            bonus: tile.is_bonus(),
        });
    }

    fn animate_reshuffle(&mut self, moves: &[ReshuffleMove]) {
        self.calls.push(PortCall::Reshuffle {
            moves: moves.to_vec(),
        });
    }

    fn await_step(&mut self, step: Step) {
        self.calls.push(PortCall::Barrier(step));
    }

    fn emit(&mut self, event: EngineEvent) {
        self.calls.push(PortCall::Event(event));
    }
}

/// Logs each request through `tracing`; animations complete instantly.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresentation;

impl PresentationPort for TracingPresentation {
    fn animate_swap(&mut self, a: &Tile, b: &Tile) {
        debug!(a = %a.pos(), b = %b.pos(), "swap");
    }

    fn animate_reject(&mut self, a: &Tile, b: &Tile) {
        debug!(a = %a.pos(), b = %b.pos(), "swap rejected");
    }

    fn animate_removal(&mut self, tiles: &[Tile]) {
        debug!(count = tiles.len(), "removing tiles");
    }

    fn animate_drop(&mut self, tile: &Tile, from_row: i32, to_row: i32) {
        debug!(col = tile.col, from_row, to_row, "drop");
    }

    fn animate_spawn(&mut self, tile: &Tile) {
        debug!(pos = %tile.pos(), kind = tile.kind.0, bonus = tile.is_bonus(), "spawn");
    }

    fn animate_reshuffle(&mut self, moves: &[ReshuffleMove]) {
        debug!(moves = moves.len(), "reshuffle");
    }

    fn emit(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::ScoreChanged(score) => info!(score, "score changed"),
            EngineEvent::BoardIdle => debug!("board idle"),
            EngineEvent::BoardReshuffled => info!("board reshuffled"),
        }
    }
}
