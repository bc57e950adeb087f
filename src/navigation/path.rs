//! Turning a chain of searched nodes into a world space [GraphPath] and
//! straightening it.
//!
//! A raw grid path zig-zags along the 8 directions of movement. Building a
//! path collapses runs of cells travelling in the same direction so only the
//! corners remain. Smoothing then removes corners whenever an agent can walk
//! straight past them.
//!
//! ```text
//!  raw           built         smoothed
//!  s . . .       s . . .       s . . .
//!  . x . .       . . . .       . . . .
//!  . . x x e     . . x . e     . . . . e
//! ```
//!

use bevy::prelude::*;

use crate::prelude::*;

/// Ordered world space waypoints from the start of a path to its end
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphPath {
	/// Waypoints as `(x, y)` pairs
	waypoints: Vec<(f32, f32)>,
}

impl GraphPath {
	/// Create a new instance of [GraphPath]
	pub fn new(waypoints: Vec<Vec2>) -> Self {
		GraphPath {
			waypoints: waypoints.into_iter().map(|p| (p.x, p.y)).collect(),
		}
	}
	/// Build a path from searched nodes ordered from the end back to the
	/// start, as produced by [AStarSearch::path]. Node positions are the
	/// footprint centres when a `brush` is given. With `simplify` only the
	/// first cell, the last cell and the cells where the direction of travel
	/// changes are kept
	pub fn from_nodes(
		nodes: &[usize],
		grid: &NavGrid,
		brush: Option<&PathBrush>,
		simplify: bool,
	) -> Self {
		let cells: Vec<GridCell> = nodes.iter().rev().map(|n| grid.index_to_grid(*n)).collect();
		let direction = |from: GridCell, to: GridCell| Ordinal::cell_to_cell_direction(to, from);
		let mut waypoints = Vec::with_capacity(cells.len());
		for (i, cell) in cells.iter().enumerate() {
			let is_end = i == 0 || i + 1 == cells.len();
			if simplify
				&& !is_end && direction(cells[i - 1], *cell) == direction(*cell, cells[i + 1])
			{
				continue;
			}
			waypoints.push(grid.grid_to_position(*cell, brush));
		}
		GraphPath::new(waypoints)
	}
	/// Get the waypoints
	pub fn get_waypoints(&self) -> Vec<Vec2> {
		self.waypoints.iter().map(|(x, y)| Vec2::new(*x, *y)).collect()
	}
	/// Number of waypoints
	pub fn len(&self) -> usize {
		self.waypoints.len()
	}
	/// Are there no waypoints
	pub fn is_empty(&self) -> bool {
		self.waypoints.is_empty()
	}
	/// First waypoint
	pub fn first(&self) -> Option<Vec2> {
		self.waypoints.first().map(|(x, y)| Vec2::new(*x, *y))
	}
	/// Last waypoint
	pub fn last(&self) -> Option<Vec2> {
		self.waypoints.last().map(|(x, y)| Vec2::new(*x, *y))
	}
	/// Append a waypoint
	pub fn push(&mut self, waypoint: Vec2) {
		self.waypoints.push((waypoint.x, waypoint.y));
	}
	/// Sum of the lengths of every edge
	pub fn length(&self) -> f32 {
		self.get_waypoints()
			.windows(2)
			.map(|pair| pair[0].distance(pair[1]))
			.sum()
	}
	/// Remove waypoints that can be skipped. For each waypoint every later
	/// waypoint from two ahead onwards is tested with `line_of_sight` and
	/// when it passes all waypoints in between are dropped
	pub fn smooth(&mut self, mut line_of_sight: impl FnMut(Vec2, Vec2) -> bool) {
		let mut current = 0;
		while current + 2 < self.waypoints.len() {
			let mut next = current + 2;
			while next < self.waypoints.len() {
				let from = Vec2::new(self.waypoints[current].0, self.waypoints[current].1);
				let to = Vec2::new(self.waypoints[next].0, self.waypoints[next].1);
				if line_of_sight(from, to) {
					self.waypoints.drain(current + 1..next);
					next = current + 2;
				} else {
					next += 1;
				}
			}
			current += 1;
		}
	}
}

/// Can a footprint travel in a straight line from `start` to `end` without
/// touching an obstructed cell. The line is sampled every
/// `step_fraction * cell_size` world units with the first step split into
/// finer samples, the end position is tested too
pub fn has_line_of_sight(
	grid: &NavGrid,
	start: Vec2,
	end: Vec2,
	brush: Option<&PathBrush>,
	include_dynamic: bool,
	sampling: LineOfSightSampling,
) -> bool {
	let delta = end - start;
	let distance = delta.length();
	let step_length = grid.get_cell_size() * sampling.get_step_fraction();
	if distance <= f32::EPSILON || step_length <= 0.0 {
		return !grid.is_brush_obstructed(start, brush, include_dynamic);
	}
	let step = delta / distance * step_length;
	let steps = (distance / step_length) as usize;
	let subdivisions = sampling.get_first_step_subdivisions().max(1);
	let mut position = start;
	for i in 0..steps {
		if i == 0 {
			// finer sampling while leaving the start cell
			for _ in 0..subdivisions {
				if grid.is_brush_obstructed(position, brush, include_dynamic) {
					return false;
				}
				position += step / subdivisions as f32;
			}
		} else if grid.is_brush_obstructed(position, brush, include_dynamic) {
			return false;
		} else {
			position += step;
		}
	}
	!grid.is_brush_obstructed(end, brush, include_dynamic)
}

#[cfg(test)]
mod tests {
	use super::*;
	/// 32x32 cells of one world unit
	fn open_grid() -> NavGrid {
		let map = OcclusionMap::new(MapDimensions::new(Vec2::new(32.0, 32.0), UVec2::new(32, 32)));
		NavGrid::new(&map, 1.0)
	}
	#[test]
	fn build_without_simplify() {
		let grid = open_grid();
		let nodes: Vec<usize> = [(3, 0), (2, 0), (1, 0), (0, 0)]
			.iter()
			.map(|(x, y)| grid.grid_to_index(GridCell::new(*x, *y)))
			.collect();
		let path = GraphPath::from_nodes(&nodes, &grid, None, false);
		let actual = vec![
			Vec2::new(0.5, 0.5),
			Vec2::new(1.5, 0.5),
			Vec2::new(2.5, 0.5),
			Vec2::new(3.5, 0.5),
		];
		assert_eq!(actual, path.get_waypoints());
	}
	#[test]
	fn build_collapses_straight_runs() {
		let grid = open_grid();
		// east three times then south-east twice, listed end first
		let nodes: Vec<usize> = [(5, 2), (4, 1), (3, 0), (2, 0), (1, 0), (0, 0)]
			.iter()
			.map(|(x, y)| grid.grid_to_index(GridCell::new(*x, *y)))
			.collect();
		let path = GraphPath::from_nodes(&nodes, &grid, None, true);
		let actual = vec![
			Vec2::new(0.5, 0.5),
			Vec2::new(3.5, 0.5),
			Vec2::new(5.5, 2.5),
		];
		assert_eq!(actual, path.get_waypoints());
	}
	#[test]
	fn build_single_node() {
		let grid = open_grid();
		let nodes = vec![grid.grid_to_index(GridCell::new(4, 4))];
		let path = GraphPath::from_nodes(&nodes, &grid, None, true);
		assert_eq!(vec![Vec2::new(4.5, 4.5)], path.get_waypoints());
	}
	#[test]
	fn build_with_brush_offsets_positions() {
		let grid = open_grid();
		let brush = PathBrush::rectangle(2, 2);
		let nodes = vec![grid.grid_to_index(GridCell::new(4, 4))];
		let path = GraphPath::from_nodes(&nodes, &grid, Some(&brush), true);
		assert_eq!(vec![Vec2::new(5.0, 5.0)], path.get_waypoints());
	}
	#[test]
	fn line_of_sight_open() {
		let grid = open_grid();
		let sampling = LineOfSightSampling::default();
		assert!(has_line_of_sight(
			&grid,
			Vec2::new(1.5, 1.5),
			Vec2::new(20.5, 12.5),
			None,
			true,
			sampling
		));
	}
	#[test]
	fn line_of_sight_blocked() {
		let mut grid = open_grid();
		for row in 0..32 {
			grid.mark(GridCell::new(10, row));
		}
		let sampling = LineOfSightSampling::default();
		assert!(!has_line_of_sight(
			&grid,
			Vec2::new(1.5, 1.5),
			Vec2::new(20.5, 12.5),
			None,
			true,
			sampling
		));
	}
	#[test]
	fn line_of_sight_blocked_by_brush_width() {
		let mut grid = open_grid();
		grid.mark(GridCell::new(10, 7));
		let sampling = LineOfSightSampling::default();
		let start = Vec2::new(4.5, 5.5);
		let end = Vec2::new(20.5, 5.5);
		assert!(has_line_of_sight(&grid, start, end, None, true, sampling));
		let brush = PathBrush::from_radius(2.5, 1.0);
		assert!(!has_line_of_sight(&grid, start, end, Some(&brush), true, sampling));
	}
	#[test]
	fn smooth_open_path_to_single_edge() {
		let grid = open_grid();
		let mut path = GraphPath::new(vec![
			Vec2::new(1.5, 1.5),
			Vec2::new(5.5, 1.5),
			Vec2::new(9.5, 5.5),
			Vec2::new(9.5, 12.5),
			Vec2::new(14.5, 17.5),
		]);
		path.smooth(|a, b| has_line_of_sight(&grid, a, b, None, true, LineOfSightSampling::default()));
		let actual = vec![Vec2::new(1.5, 1.5), Vec2::new(14.5, 17.5)];
		assert_eq!(actual, path.get_waypoints());
	}
	#[test]
	fn smooth_keeps_corners_around_walls() {
		let mut grid = open_grid();
		// wall down column 10 leaving a gap at the bottom
		for row in 0..20 {
			grid.mark(GridCell::new(10, row));
		}
		let mut path = GraphPath::new(vec![
			Vec2::new(5.5, 5.5),
			Vec2::new(6.5, 15.5),
			Vec2::new(9.5, 21.5),
			Vec2::new(11.5, 21.5),
			Vec2::new(15.5, 5.5),
		]);
		let before = path.length();
		path.smooth(|a, b| has_line_of_sight(&grid, a, b, None, true, LineOfSightSampling::default()));
		assert!(path.len() >= 3);
		assert!(path.length() <= before);
		assert_eq!(Some(Vec2::new(5.5, 5.5)), path.first());
		assert_eq!(Some(Vec2::new(15.5, 5.5)), path.last());
		for pair in path.get_waypoints().windows(2) {
			assert!(has_line_of_sight(
				&grid,
				pair[0],
				pair[1],
				None,
				true,
				LineOfSightSampling::default()
			));
		}
	}
}
