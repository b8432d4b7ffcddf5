use crate::config::BoardConfig;
use crate::coords::Pos;
use crate::grid::Grid;

/// `mm:ss`, clamped at zero.
pub fn format_clock(seconds_left: i64) -> String {
	let s = seconds_left.max(0);
	format!("{:02}:{:02}", s / 60, s % 60)
}

pub fn format_hud(score: u32, seconds_left: i64) -> String {
	format!("Score: {} | Time: {}", score, format_clock(seconds_left))
}

/// One line per row, one symbol per cell: the first letter of the kind
/// name, `*` for a bonus tile, `.` for an empty cell.
pub fn format_board(grid: &Grid, config: &BoardConfig) -> Vec<String> {
	(0..grid.rows())
		.map(|row| {
			(0..grid.cols())
				.map(|col| match grid.tile(Pos::new(col, row)) {
					None => '.',
					Some(t) if t.is_bonus() => '*',
					Some(t) => config.kind_name(t.kind).chars().next().unwrap_or('?'),
				})
				.collect()
		})
		.collect()
}
