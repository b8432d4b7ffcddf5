pub mod config;
pub mod coords;
pub mod engine;
pub mod factory;
pub mod grid;
pub mod hud;
pub mod layout;
pub mod matcher;
pub mod port;
pub mod scoring;
pub mod tile;

// Re-exports for convenience in tests and integration users.
pub use config::{BoardConfig, ConfigError};
pub use coords::{Dims, Pos};
pub use engine::{
	BonusReport, CascadeReport, DropMove, Engine, EngineError, EngineState, PassReport, Session, SwapError,
	SwapOutcome, MAX_RESHUFFLE_ATTEMPTS,
};
pub use factory::TileFactory;
pub use grid::{Grid, GridError};
pub use hud::{format_board, format_clock, format_hud};
pub use layout::{BoardLayout, LayoutError};
pub use matcher::{MatchGroup, find_legal_move, find_matches, groups_are_disjoint, has_legal_move};
pub use port::{
	EngineEvent, NullPresentation, PortCall, PresentationPort, RecordingPresentation, ReshuffleMove, Step,
	TracingPresentation,
};
pub use scoring::ScoringPolicy;
pub use tile::{SpecialKind, Tile, TileId, TileKind};
