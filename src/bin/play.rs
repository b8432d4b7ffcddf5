use std::path::PathBuf;

use clap::Parser;
use tilematch::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ---------- CLI ----------
/// Plays a match-3 session headlessly, always taking the first hinted move.
#[derive(Parser, Debug)]
#[command(name = "play", version)]
struct Cli {
	/// Board config as JSON; defaults to the classic 7x5 board.
	#[arg(long)]
	config: Option<PathBuf>,

	/// Overrides the config seed.
	#[arg(long)]
	seed: Option<u64>,

	/// Enables the bonus tile on the built-in board.
	#[arg(long)]
	bonus: bool,

	/// Session length in simulated seconds.
	#[arg(long, default_value_t = 30)]
	seconds: i64,

	/// Simulated seconds each move takes.
	#[arg(long, default_value_t = 2)]
	move_cost: i64,
}

fn load_config(cli: &Cli) -> Result<BoardConfig, Box<dyn std::error::Error>> {
	let mut config = match &cli.config {
		Some(path) => BoardConfig::from_json(&std::fs::read_to_string(path)?)?,
		None if cli.bonus => BoardConfig::with_bonus(),
		None => BoardConfig::classic(),
	};
	if let Some(seed) = cli.seed {
		config.seed = seed;
	}
	Ok(config)
}

fn print_board(engine: &Engine<TracingPresentation>, seconds_left: i64) {
	println!("{}", format_hud(engine.score(), seconds_left));
	for line in format_board(engine.grid(), engine.config()) {
		println!("  {}", line);
	}
	println!();
}

// ---------- Entry ----------
fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let cli = Cli::parse();
	let config = load_config(&cli)?;
	info!(cols = config.cols, rows = config.rows, seed = config.seed, "starting session");

	let mut engine = Engine::initialize(config, TracingPresentation)?;
	let mut seconds_left = cli.seconds;
	print_board(&engine, seconds_left);

	while seconds_left > 0 {
		let Some((a, b)) = engine.hint() else {
			warn!("no hint available");
			break;
		};
		match engine.attempt_swap(a, b) {
			Ok(SwapOutcome::Resolved(report)) => {
				println!(
					"{} <-> {}: +{} ({} tiles, {} passes{})",
					a,
					b,
					report.points(),
					report.tiles_removed(),
					report.passes.len(),
					if report.reshuffled { ", reshuffled" } else { "" }
				);
			}
			Ok(SwapOutcome::Reverted) => println!("{} <-> {}: no match", a, b),
			Err(e) if e.is_rejection() => warn!(error = %e, "swap refused"),
			Err(e) => return Err(e.into()),
		}
		seconds_left -= cli.move_cost.max(1);
		print_board(&engine, seconds_left);
	}

	engine.time_up();
	println!("Final score: {}", engine.score());
	Ok(())
}
