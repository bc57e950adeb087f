//! Useful structures and tools used by the grids, brushes and searches
//!

use bevy::prelude::*;

/// Cost of moving between two orthogonally adjacent cells
pub const AXIS_COST: f32 = 10.0;
/// Cost of moving between two diagonally adjacent cells
pub const DIAGONAL_COST: f32 = 14.0;
/// Scales a straight line distance measured in cells into the same units as
/// [AXIS_COST] and [DIAGONAL_COST]. It sits just below `DIAGONAL_COST / √2`
/// so that a single diagonal step never costs less than the drop in the
/// heuristic
pub const HEURISTIC_SCALE: f32 = 9.89;
/// Largest number of cells a [crate::prelude::PathBrush] may span along either axis
pub const MAX_BRUSH_SIZE: i32 = 128;
/// Largest number of terrain grids along either axis of a [crate::prelude::Landscape]
pub const MAX_TERRAIN_GRID_COUNT: u32 = 256;

/// The 8 directions of movement across a grid. `North` points towards row
/// `0` and `West` towards column `0`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Reflect)]
pub enum Ordinal {
	North,
	NorthEast,
	East,
	SouthEast,
	South,
	SouthWest,
	West,
	NorthWest,
}

impl Ordinal {
	/// Every direction in a fixed clockwise order starting from [Ordinal::North]
	pub const ALL: [Ordinal; 8] = [
		Ordinal::North,
		Ordinal::NorthEast,
		Ordinal::East,
		Ordinal::SouthEast,
		Ordinal::South,
		Ordinal::SouthWest,
		Ordinal::West,
		Ordinal::NorthWest,
	];
	/// The `(column, row)` step taken when moving one cell in this direction
	pub fn get_offset(&self) -> (i32, i32) {
		match self {
			Ordinal::North => (0, -1),
			Ordinal::NorthEast => (1, -1),
			Ordinal::East => (1, 0),
			Ordinal::SouthEast => (1, 1),
			Ordinal::South => (0, 1),
			Ordinal::SouthWest => (-1, 1),
			Ordinal::West => (-1, 0),
			Ordinal::NorthWest => (-1, -1),
		}
	}
	/// Position of this direction within [Ordinal::ALL], handy for indexing
	/// per-direction lookup tables
	pub fn get_index(&self) -> usize {
		match self {
			Ordinal::North => 0,
			Ordinal::NorthEast => 1,
			Ordinal::East => 2,
			Ordinal::SouthEast => 3,
			Ordinal::South => 4,
			Ordinal::SouthWest => 5,
			Ordinal::West => 6,
			Ordinal::NorthWest => 7,
		}
	}
	/// Is this a diagonal direction
	pub fn is_diagonal(&self) -> bool {
		matches!(
			self,
			Ordinal::NorthEast | Ordinal::SouthEast | Ordinal::SouthWest | Ordinal::NorthWest
		)
	}
	/// Cost of a single step in this direction
	pub fn get_step_cost(&self) -> f32 {
		if self.is_diagonal() {
			DIAGONAL_COST
		} else {
			AXIS_COST
		}
	}
	/// For two cells next to each other find the [Ordinal] pointing from the
	/// `source` to the `target`, [None] if they are not adjacent
	pub fn cell_to_cell_direction(target: GridCell, source: GridCell) -> Option<Self> {
		let direction = (
			target.get_column() - source.get_column(),
			target.get_row() - source.get_row(),
		);
		Ordinal::ALL
			.into_iter()
			.find(|ordinal| ordinal.get_offset() == direction)
	}
}

/// ID of a cell within a [crate::prelude::NavGrid]. Coordinates are signed so
/// that brush cells hanging off the edge of the grid can still be described
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct GridCell((i32, i32));

impl GridCell {
	/// Create a new instance of [GridCell]
	pub fn new(column: i32, row: i32) -> Self {
		GridCell((column, row))
	}
	/// Get the column
	pub fn get_column(&self) -> i32 {
		self.0 .0
	}
	/// Get the row
	pub fn get_row(&self) -> i32 {
		self.0 .1
	}
	/// The neighbouring cell in the direction of `ordinal`
	pub fn step(&self, ordinal: Ordinal) -> GridCell {
		let (dx, dy) = ordinal.get_offset();
		GridCell::new(self.get_column() + dx, self.get_row() + dy)
	}
	/// This cell moved by `(dx, dy)`
	pub fn offset(&self, dx: i32, dy: i32) -> GridCell {
		GridCell::new(self.get_column() + dx, self.get_row() + dy)
	}
}

/// A rectangular window of cells, anything outside of it is treated as
/// obstructed while it is applied to a [crate::prelude::NavGrid]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Reflect)]
pub struct GridBoundary {
	/// Top-left column of the window
	column: i32,
	/// Top-left row of the window
	row: i32,
	/// Number of columns covered
	width: i32,
	/// Number of rows covered
	height: i32,
}

impl GridBoundary {
	/// Create a new instance of [GridBoundary]
	pub fn new(column: i32, row: i32, width: i32, height: i32) -> Self {
		GridBoundary {
			column,
			row,
			width,
			height,
		}
	}
	/// A window of `size` cells square whose origin sits `size * factor`
	/// cells up and left of the midpoint between `start` and `end`
	pub fn around(start: GridCell, end: GridCell, size: i32, factor: f32) -> Self {
		let shift = (size as f32 * factor) as i32;
		GridBoundary::new(
			(start.get_column() + end.get_column()) / 2 - shift,
			(start.get_row() + end.get_row()) / 2 - shift,
			size,
			size,
		)
	}
	/// Get the number of columns
	pub fn get_width(&self) -> i32 {
		self.width
	}
	/// Get the number of rows
	pub fn get_height(&self) -> i32 {
		self.height
	}
	/// Does the window contain `cell`
	pub fn contains(&self, cell: GridCell) -> bool {
		cell.get_column() >= self.column
			&& cell.get_column() < self.column + self.width
			&& cell.get_row() >= self.row
			&& cell.get_row() < self.row + self.height
	}
}

/// Walk the cells around `centre` in square rings of growing radius, starting
/// with the ring immediately next to it. Each ring of radius `r` yields `8r`
/// cells. The walk stops after the ring of radius `max_radius`
pub fn cells_inner_out(centre: GridCell, max_radius: i32) -> impl Iterator<Item = GridCell> {
	(1..=max_radius).flat_map(move |r| {
		(-r..r).flat_map(move |i| {
			[
				centre.offset(r, i),
				centre.offset(-r, i + 1),
				centre.offset(i + 1, r),
				centre.offset(i, -r),
			]
		})
	})
}

/// Rotate `point` anti-clockwise around the origin by `rotation` radians
pub fn rotate_vec2(point: Vec2, rotation: f32) -> Vec2 {
	let (sin, cos) = rotation.sin_cos();
	Vec2::new(point.x * cos - point.y * sin, point.x * sin + point.y * cos)
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn ordinal_offsets_are_unique() {
		let mut offsets: Vec<(i32, i32)> = Ordinal::ALL.iter().map(|o| o.get_offset()).collect();
		offsets.sort();
		offsets.dedup();
		assert_eq!(8, offsets.len());
	}
	#[test]
	fn ordinal_index_matches_all() {
		for (i, ordinal) in Ordinal::ALL.iter().enumerate() {
			assert_eq!(i, ordinal.get_index());
		}
	}
	#[test]
	fn ordinal_costs() {
		assert_eq!(AXIS_COST, Ordinal::East.get_step_cost());
		assert_eq!(DIAGONAL_COST, Ordinal::SouthWest.get_step_cost());
	}
	#[test]
	fn cell_to_cell_north() {
		let target = GridCell::new(6, 2);
		let source = GridCell::new(6, 3);
		let result = Ordinal::cell_to_cell_direction(target, source);
		let actual = Some(Ordinal::North);
		assert_eq!(actual, result);
	}
	#[test]
	fn cell_to_cell_south_east() {
		let target = GridCell::new(5, 5);
		let source = GridCell::new(4, 4);
		let result = Ordinal::cell_to_cell_direction(target, source);
		let actual = Some(Ordinal::SouthEast);
		assert_eq!(actual, result);
	}
	#[test]
	fn cell_to_cell_not_adjacent() {
		let target = GridCell::new(5, 7);
		let source = GridCell::new(4, 4);
		let result = Ordinal::cell_to_cell_direction(target, source);
		assert_eq!(None, result);
	}
	#[test]
	fn boundary_around_midpoint() {
		let start = GridCell::new(10, 10);
		let end = GridCell::new(30, 50);
		let result = GridBoundary::around(start, end, 64, 0.55);
		// midpoint (20, 30) shifted by 35
		let actual = GridBoundary::new(-15, -5, 64, 64);
		assert_eq!(actual, result);
	}
	#[test]
	fn boundary_contains() {
		let boundary = GridBoundary::new(2, 3, 4, 5);
		assert!(boundary.contains(GridCell::new(2, 3)));
		assert!(boundary.contains(GridCell::new(5, 7)));
		assert!(!boundary.contains(GridCell::new(6, 7)));
		assert!(!boundary.contains(GridCell::new(5, 8)));
		assert!(!boundary.contains(GridCell::new(1, 3)));
	}
	#[test]
	fn inner_out_first_ring() {
		let centre = GridCell::new(0, 0);
		let mut result: Vec<GridCell> = cells_inner_out(centre, 1).collect();
		result.sort();
		let mut actual = vec![];
		for ordinal in Ordinal::ALL {
			actual.push(centre.step(ordinal));
		}
		actual.sort();
		assert_eq!(actual, result);
	}
	#[test]
	fn inner_out_ring_sizes() {
		let centre = GridCell::new(10, 10);
		let result: Vec<GridCell> = cells_inner_out(centre, 3).collect();
		// rings of 8, 16 and 24 cells
		assert_eq!(48, result.len());
		let mut unique = result.clone();
		unique.sort();
		unique.dedup();
		assert_eq!(48, unique.len());
		assert!(!result.contains(&centre));
		assert_eq!(0, cells_inner_out(centre, 0).count());
	}
	#[test]
	fn rotate_quarter_turn() {
		let result = rotate_vec2(Vec2::new(1.0, 0.0), std::f32::consts::FRAC_PI_2);
		assert!((result - Vec2::new(0.0, 1.0)).length() < 1e-5);
	}
}
