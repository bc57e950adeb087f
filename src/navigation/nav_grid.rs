//! The [NavGrid] is a uniform grid laid over the terrain, each cell holding
//! two obstruction counters.
//!
//! The static counter tracks terrain and buildings, the dynamic counter tracks
//! the footprints of moving agents. Counters are reference counts so that
//! overlapping footprints can be added and removed in any order, a cell is
//! blocked while the relevant counter is above zero.
//!
//! Cells are indexed from the top-left corner of the map, i.e the world
//! origin, with columns growing along `x` and rows growing along `y` (or `z`
//! in 3d).
//!
//! ```text
//!  _____ _____ _____ _____
//! |(0,0)|(1,0)|(2,0)|(3,0)|
//! |_____|_____|_____|_____|
//! |(0,1)|(1,1)|(2,1)|(3,1)|
//! |_____|_____|_____|_____|
//! |(0,2)|(1,2)|(2,2)|(3,2)|
//! |_____|_____|_____|_____|
//! ```
//!

use std::sync::Arc;

use bevy::prelude::*;

use crate::prelude::*;

/// Grid of obstruction counters used as the search graph
#[derive(Clone, Debug)]
pub struct NavGrid {
	/// Number of columns
	width: i32,
	/// Number of rows
	height: i32,
	/// World units spanned by a single cell along either axis
	cell_size: f32,
	/// Terrain and building reference counts, row-major
	static_obstruction: Vec<u16>,
	/// Agent footprint reference counts, row-major
	dynamic_obstruction: Vec<u16>,
	/// Footprint used when generating edges
	brush: Option<Arc<PathBrush>>,
	/// Window outside of which every cell is obstructed
	boundary: Option<GridBoundary>,
	/// When `true` edge generation ignores the dynamic counters
	ignore_dynamic_obstacles: bool,
}

impl NavGrid {
	/// Create a new instance of [NavGrid] over a [Landscape]. The number of
	/// cells along each axis is the terrain grid count multiplied by
	/// `resolution`. Panics if the landscape dimensions are invalid, if the
	/// resolution produces an empty grid or if the cells would not be square
	pub fn new(landscape: &impl Landscape, resolution: f32) -> Self {
		let dimensions = MapDimensions::new(landscape.get_size(), landscape.get_grid_count());
		if resolution <= 0.0 {
			panic!("NavGrid resolution `{}` must be positive", resolution);
		}
		let count = dimensions.get_grid_count().as_vec2() * resolution;
		let width = count.x as i32;
		let height = count.y as i32;
		if width < 1 || height < 1 {
			panic!(
				"NavGrid resolution `{}` leaves no cells over a terrain of {:?} grids",
				resolution,
				dimensions.get_grid_count()
			);
		}
		let size = dimensions.get_size();
		let cell_x = size.x / width as f32;
		let cell_y = size.y / height as f32;
		if (cell_x - cell_y).abs() > cell_x.max(cell_y) * 1e-4 {
			panic!(
				"NavGrid cells must be square, found `{}` by `{}` world units",
				cell_x, cell_y
			);
		}
		let mut grid = NavGrid {
			width,
			height,
			cell_size: cell_x,
			static_obstruction: vec![0; (width * height) as usize],
			dynamic_obstruction: vec![0; (width * height) as usize],
			brush: None,
			boundary: None,
			ignore_dynamic_obstacles: false,
		};
		grid.seed_from_landscape(landscape, resolution);
		grid
	}
	/// Mark the static counter of cells covered by occluded terrain. Fine
	/// grids only test the centre of each cell, coarse grids sample each cell
	/// and mark it when at least half of the samples are occluded
	fn seed_from_landscape(&mut self, landscape: &impl Landscape, resolution: f32) {
		/// Samples taken along each axis of a terrain grid
		const SAMPLES_PER_TERRAIN_GRID: f32 = 8.0;
		let samples = ((SAMPLES_PER_TERRAIN_GRID / resolution) as i32).max(1);
		let step = self.cell_size / samples as f32;
		for row in 0..self.height {
			for column in 0..self.width {
				let cell = GridCell::new(column, row);
				let occluded = if resolution >= 2.0 {
					let centre = self.grid_to_position(cell, None);
					landscape.is_point_occluded(centre.x, centre.y)
				} else {
					let origin = Vec2::new(
						column as f32 * self.cell_size,
						row as f32 * self.cell_size,
					);
					let mut hits = 0;
					for i in 0..samples {
						for j in 0..samples {
							let x = origin.x + i as f32 * step;
							let y = origin.y + j as f32 * step;
							if landscape.is_point_occluded(x, y) {
								hits += 1;
							}
						}
					}
					hits * 2 >= samples * samples
				};
				if occluded {
					self.mark(cell);
				}
			}
		}
	}
	/// Get the number of columns
	pub fn get_width(&self) -> i32 {
		self.width
	}
	/// Get the number of rows
	pub fn get_height(&self) -> i32 {
		self.height
	}
	/// Get the world size of a cell
	pub fn get_cell_size(&self) -> f32 {
		self.cell_size
	}
	/// Get half the world size of a cell
	pub fn get_half_cell_size(&self) -> f32 {
		self.cell_size / 2.0
	}
	/// Get the active footprint
	pub fn get_brush(&self) -> Option<&PathBrush> {
		self.brush.as_deref()
	}
	/// Set the footprint used when generating edges
	pub fn set_brush(&mut self, brush: Option<Arc<PathBrush>>) {
		self.brush = brush;
	}
	/// Get the active boundary
	pub fn get_boundary(&self) -> Option<GridBoundary> {
		self.boundary
	}
	/// Restrict the grid to a window, anything outside of it is obstructed
	pub fn set_boundary(&mut self, boundary: Option<GridBoundary>) {
		self.boundary = boundary;
	}
	/// Are dynamic obstructions ignored when generating edges
	pub fn is_ignoring_dynamic_obstacles(&self) -> bool {
		self.ignore_dynamic_obstacles
	}
	/// Choose whether edge generation consults the dynamic counters
	pub fn set_ignore_dynamic_obstacles(&mut self, ignore: bool) {
		self.ignore_dynamic_obstacles = ignore;
	}
	/// Is the cell within the extents of the grid, the boundary is not considered
	pub fn is_in_grid(&self, cell: GridCell) -> bool {
		cell.get_column() >= 0
			&& cell.get_column() < self.width
			&& cell.get_row() >= 0
			&& cell.get_row() < self.height
	}
	/// Array position of a cell that is known to be in the grid
	fn slot(&self, cell: GridCell) -> usize {
		(cell.get_row() * self.width + cell.get_column()) as usize
	}
	/// Increment the static counter of a cell. Cells outside of the grid are ignored
	pub fn mark(&mut self, cell: GridCell) {
		if self.is_in_grid(cell) {
			let slot = self.slot(cell);
			self.static_obstruction[slot] = self.static_obstruction[slot].saturating_add(1);
		}
	}
	/// Decrement the static counter of a cell. Cells outside of the grid are ignored
	pub fn unmark(&mut self, cell: GridCell) {
		if self.is_in_grid(cell) {
			let slot = self.slot(cell);
			debug_assert!(
				self.static_obstruction[slot] > 0,
				"Unmarking static cell {:?} which has no marks",
				cell
			);
			self.static_obstruction[slot] = self.static_obstruction[slot].saturating_sub(1);
		}
	}
	/// Increment the dynamic counter of a cell. Cells outside of the grid are ignored
	pub fn mark_dynamic(&mut self, cell: GridCell) {
		if self.is_in_grid(cell) {
			let slot = self.slot(cell);
			self.dynamic_obstruction[slot] = self.dynamic_obstruction[slot].saturating_add(1);
		}
	}
	/// Decrement the dynamic counter of a cell. Cells outside of the grid are ignored
	pub fn unmark_dynamic(&mut self, cell: GridCell) {
		if self.is_in_grid(cell) {
			let slot = self.slot(cell);
			debug_assert!(
				self.dynamic_obstruction[slot] > 0,
				"Unmarking dynamic cell {:?} which has no marks",
				cell
			);
			self.dynamic_obstruction[slot] = self.dynamic_obstruction[slot].saturating_sub(1);
		}
	}
	/// Reset every dynamic counter to zero
	pub fn clear_dynamic(&mut self) {
		self.dynamic_obstruction.fill(0);
	}
	/// Get the static counter of a cell, `0` outside of the grid
	pub fn get_static_count(&self, cell: GridCell) -> u16 {
		if self.is_in_grid(cell) {
			self.static_obstruction[self.slot(cell)]
		} else {
			0
		}
	}
	/// Get the dynamic counter of a cell, `0` outside of the grid
	pub fn get_dynamic_count(&self, cell: GridCell) -> u16 {
		if self.is_in_grid(cell) {
			self.dynamic_obstruction[self.slot(cell)]
		} else {
			0
		}
	}
	/// A cell is obstructed when it lies outside the boundary or the grid, or
	/// when its static counter (or dynamic counter if `include_dynamic`) is
	/// above zero
	pub fn is_grid_obstructed(&self, cell: GridCell, include_dynamic: bool) -> bool {
		if let Some(boundary) = self.boundary {
			if !boundary.contains(cell) {
				return true;
			}
		}
		if !self.is_in_grid(cell) {
			return true;
		}
		let slot = self.slot(cell);
		self.static_obstruction[slot] > 0
			|| (include_dynamic && self.dynamic_obstruction[slot] > 0)
	}
	/// Is the cell under a world position obstructed. Positions outside of
	/// the grid are reported as free
	pub fn is_position_obstructed(&self, position: Vec2, include_dynamic: bool) -> bool {
		let cell = self.position_to_grid(position, None);
		if !self.is_in_grid(cell) {
			return false;
		}
		self.is_grid_obstructed(cell, include_dynamic)
	}
	/// Is any cell covered by `brush` centred on `position` obstructed.
	/// Without a brush only the cell under `position` is tested
	pub fn is_brush_obstructed(
		&self,
		position: Vec2,
		brush: Option<&PathBrush>,
		include_dynamic: bool,
	) -> bool {
		match brush {
			Some(brush) => {
				let anchor = self.position_to_grid(position, Some(brush));
				brush
					.cells_at(anchor)
					.any(|cell| self.is_grid_obstructed(cell, include_dynamic))
			}
			None => self.is_grid_obstructed(self.position_to_grid(position, None), include_dynamic),
		}
	}
	/// Cells covered by `brush` centred on `position`, may include cells
	/// outside of the grid
	pub fn cells_in_brush(&self, position: Vec2, brush: Option<&PathBrush>) -> Vec<GridCell> {
		let anchor = self.position_to_grid(position, brush);
		match brush {
			Some(brush) => brush.cells_at(anchor).collect(),
			None => vec![anchor],
		}
	}
	/// Index of a cell known to be in the grid
	pub fn grid_to_index(&self, cell: GridCell) -> usize {
		debug_assert!(self.is_in_grid(cell), "{:?} is outside of the grid", cell);
		self.slot(cell)
	}
	/// The cell of an index
	pub fn index_to_grid(&self, index: usize) -> GridCell {
		let index = index as i32;
		GridCell::new(index % self.width, index / self.width)
	}
	/// World position of a cell. With a brush the cell is treated as the
	/// brush anchor and the centre of the whole footprint is returned
	pub fn grid_to_position(&self, cell: GridCell, brush: Option<&PathBrush>) -> Vec2 {
		let half = self.get_half_cell_size();
		let mut position = Vec2::new(
			cell.get_column() as f32 * self.cell_size + half,
			cell.get_row() as f32 * self.cell_size + half,
		);
		if let Some(brush) = brush {
			position.x += brush.get_size_x() as f32 * half - half;
			position.y += brush.get_size_y() as f32 * half - half;
		}
		position
	}
	/// Cell under a world position. With a brush the position is treated as
	/// the centre of the footprint and the anchor cell is returned
	pub fn position_to_grid(&self, position: Vec2, brush: Option<&PathBrush>) -> GridCell {
		match brush {
			Some(brush) => GridCell::new(
				self.axis_to_anchor(position.x, brush.get_size_x()),
				self.axis_to_anchor(position.y, brush.get_size_y()),
			),
			None => GridCell::new(
				(position.x / self.cell_size).floor() as i32,
				(position.y / self.cell_size).floor() as i32,
			),
		}
	}
	/// Anchor coordinate along one axis of a footprint spanning `size` cells
	/// centred on `value`. Even footprints centre on a cell corner, odd ones
	/// on a cell centre
	fn axis_to_anchor(&self, value: f32, size: i32) -> i32 {
		let scaled = value / self.cell_size;
		if size % 2 == 0 {
			scaled.round() as i32 - size / 2
		} else {
			scaled.floor() as i32 - size / 2
		}
	}
	/// Index of the cell under a world position, [None] outside of the grid
	pub fn position_to_index(&self, position: Vec2, brush: Option<&PathBrush>) -> Option<usize> {
		let cell = self.position_to_grid(position, brush);
		if self.is_in_grid(cell) {
			Some(self.slot(cell))
		} else {
			None
		}
	}
	/// World position of the cell at `index`
	pub fn index_to_position(&self, index: usize, brush: Option<&PathBrush>) -> Vec2 {
		self.grid_to_position(self.index_to_grid(index), brush)
	}
	/// Is the anchor `cell` of the active brush able to step in the
	/// direction of `ordinal`
	fn can_step(&self, cell: GridCell, ordinal: Ordinal, include_dynamic: bool) -> bool {
		let next = cell.step(ordinal);
		if !self.is_in_grid(next) {
			return false;
		}
		match &self.brush {
			Some(brush) => !brush
				.get_leading_edge(ordinal)
				.iter()
				.any(|(dx, dy)| self.is_grid_obstructed(cell.offset(*dx, *dy), include_dynamic)),
			None => !self.is_grid_obstructed(next, include_dynamic),
		}
	}
}

impl Graph for NavGrid {
	fn node_count(&self) -> usize {
		(self.width * self.height) as usize
	}
	fn edges_of(&self, node: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
		let cell = self.index_to_grid(node);
		let include_dynamic = !self.ignore_dynamic_obstacles;
		Ordinal::ALL.into_iter().filter_map(move |ordinal| {
			if self.can_step(cell, ordinal, include_dynamic) {
				Some((self.slot(cell.step(ordinal)), ordinal.get_step_cost()))
			} else {
				None
			}
		})
	}
	fn heuristic(&self, from: usize, to: usize) -> f32 {
		let a = self.index_to_grid(from);
		let b = self.index_to_grid(to);
		let dx = (a.get_column() - b.get_column()) as f32;
		let dy = (a.get_row() - b.get_row()) as f32;
		(dx * dx + dy * dy).sqrt() * HEURISTIC_SCALE
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	/// 8x8 terrain of 8x8 world units
	fn open_map() -> OcclusionMap {
		OcclusionMap::new(MapDimensions::new(Vec2::new(8.0, 8.0), UVec2::new(8, 8)))
	}
	#[test]
	fn dimensions_from_resolution() {
		let grid = NavGrid::new(&open_map(), 4.0);
		assert_eq!(32, grid.get_width());
		assert_eq!(32, grid.get_height());
		assert_eq!(0.25, grid.get_cell_size());
		assert_eq!(1024, grid.node_count());
	}
	#[test]
	#[should_panic]
	fn cells_not_square() {
		let map = OcclusionMap::new(MapDimensions::new(Vec2::new(8.0, 16.0), UVec2::new(8, 8)));
		NavGrid::new(&map, 1.0);
	}
	#[test]
	#[should_panic]
	fn resolution_too_small() {
		NavGrid::new(&open_map(), 0.01);
	}
	#[test]
	fn seeded_from_cell_centres() {
		let mut map = open_map();
		map.set_occluded(2, 3, true);
		let grid = NavGrid::new(&map, 2.0);
		// terrain grid (2, 3) covers cells (4..6, 6..8)
		assert!(grid.is_grid_obstructed(GridCell::new(4, 6), false));
		assert!(grid.is_grid_obstructed(GridCell::new(5, 7), false));
		assert!(!grid.is_grid_obstructed(GridCell::new(6, 7), false));
		assert!(!grid.is_grid_obstructed(GridCell::new(3, 6), false));
	}
	#[test]
	fn seeded_from_samples() {
		let mut map = open_map();
		// half of the first coarse cell occluded
		map.set_occluded(0, 0, true);
		map.set_occluded(1, 0, true);
		map.set_occluded(0, 1, true);
		map.set_occluded(1, 1, true);
		map.set_occluded(0, 2, true);
		map.set_occluded(1, 2, true);
		map.set_occluded(0, 3, true);
		map.set_occluded(1, 3, true);
		// a quarter of the second
		map.set_occluded(4, 0, true);
		map.set_occluded(5, 0, true);
		map.set_occluded(4, 1, true);
		map.set_occluded(5, 1, true);
		let grid = NavGrid::new(&map, 0.25);
		assert_eq!(2, grid.get_width());
		assert!(grid.is_grid_obstructed(GridCell::new(0, 0), false));
		assert!(!grid.is_grid_obstructed(GridCell::new(1, 0), false));
	}
	#[test]
	fn mark_unmark_round_trip() {
		let mut grid = NavGrid::new(&open_map(), 1.0);
		let cell = GridCell::new(3, 3);
		grid.mark(cell);
		grid.mark(cell);
		grid.mark_dynamic(cell);
		assert_eq!(2, grid.get_static_count(cell));
		assert_eq!(1, grid.get_dynamic_count(cell));
		grid.unmark(cell);
		grid.unmark(cell);
		grid.unmark_dynamic(cell);
		assert_eq!(0, grid.get_static_count(cell));
		assert_eq!(0, grid.get_dynamic_count(cell));
		assert!(!grid.is_grid_obstructed(cell, true));
	}
	#[test]
	fn dynamic_only_when_included() {
		let mut grid = NavGrid::new(&open_map(), 1.0);
		let cell = GridCell::new(1, 1);
		grid.mark_dynamic(cell);
		assert!(grid.is_grid_obstructed(cell, true));
		assert!(!grid.is_grid_obstructed(cell, false));
		grid.clear_dynamic();
		assert!(!grid.is_grid_obstructed(cell, true));
	}
	#[test]
	fn outside_grid_is_obstructed() {
		let grid = NavGrid::new(&open_map(), 1.0);
		assert!(grid.is_grid_obstructed(GridCell::new(-1, 0), false));
		assert!(grid.is_grid_obstructed(GridCell::new(8, 0), false));
		assert!(!grid.is_position_obstructed(Vec2::new(-5.0, 1.0), true));
	}
	#[test]
	fn outside_boundary_is_obstructed() {
		let mut grid = NavGrid::new(&open_map(), 1.0);
		grid.set_boundary(Some(GridBoundary::new(2, 2, 3, 3)));
		assert!(grid.is_grid_obstructed(GridCell::new(1, 3), false));
		assert!(!grid.is_grid_obstructed(GridCell::new(3, 3), false));
		grid.set_boundary(None);
		assert!(!grid.is_grid_obstructed(GridCell::new(1, 3), false));
	}
	#[test]
	fn grid_position_conversions() {
		let grid = NavGrid::new(&open_map(), 1.0);
		let cell = GridCell::new(3, 5);
		let position = grid.grid_to_position(cell, None);
		assert_eq!(Vec2::new(3.5, 5.5), position);
		assert_eq!(cell, grid.position_to_grid(position, None));
		let index = grid.grid_to_index(cell);
		assert_eq!(43, index);
		assert_eq!(cell, grid.index_to_grid(index));
	}
	#[test]
	fn brush_position_conversions() {
		let grid = NavGrid::new(&open_map(), 1.0);
		let even = PathBrush::rectangle(2, 2);
		// the centre of a 2x2 footprint anchored on (3, 5) is a cell corner
		let position = grid.grid_to_position(GridCell::new(3, 5), Some(&even));
		assert_eq!(Vec2::new(4.0, 6.0), position);
		assert_eq!(GridCell::new(3, 5), grid.position_to_grid(position, Some(&even)));
		let odd = PathBrush::rectangle(3, 3);
		let position = grid.grid_to_position(GridCell::new(3, 5), Some(&odd));
		assert_eq!(Vec2::new(4.5, 6.5), position);
		assert_eq!(GridCell::new(3, 5), grid.position_to_grid(position, Some(&odd)));
	}
	#[test]
	fn brush_obstruction_matches_cells() {
		let mut grid = NavGrid::new(&open_map(), 1.0);
		grid.mark(GridCell::new(4, 4));
		let brush = PathBrush::rectangle(2, 2);
		for x in 0..16 {
			for y in 0..16 {
				let position = Vec2::new(x as f32 * 0.5, y as f32 * 0.5);
				let any = grid
					.cells_in_brush(position, Some(&brush))
					.iter()
					.any(|cell| grid.is_grid_obstructed(*cell, true));
				assert_eq!(any, grid.is_brush_obstructed(position, Some(&brush), true));
			}
		}
	}
	#[test]
	fn edges_on_open_grid() {
		let grid = NavGrid::new(&open_map(), 1.0);
		let node = grid.grid_to_index(GridCell::new(3, 3));
		let edges: Vec<(usize, f32)> = grid.edges_of(node).collect();
		assert_eq!(8, edges.len());
		let diagonal = grid.grid_to_index(GridCell::new(4, 4));
		assert!(edges.contains(&(diagonal, DIAGONAL_COST)));
		let east = grid.grid_to_index(GridCell::new(4, 3));
		assert!(edges.contains(&(east, AXIS_COST)));
	}
	#[test]
	fn edges_in_corner() {
		let grid = NavGrid::new(&open_map(), 1.0);
		let node = grid.grid_to_index(GridCell::new(0, 0));
		assert_eq!(3, grid.edges_of(node).count());
	}
	#[test]
	fn edges_respect_dynamic_flag() {
		let mut grid = NavGrid::new(&open_map(), 1.0);
		grid.mark_dynamic(GridCell::new(4, 3));
		let node = grid.grid_to_index(GridCell::new(3, 3));
		assert_eq!(7, grid.edges_of(node).count());
		grid.set_ignore_dynamic_obstacles(true);
		assert_eq!(8, grid.edges_of(node).count());
	}
	#[test]
	fn edges_with_brush() {
		let mut grid = NavGrid::new(&open_map(), 1.0);
		grid.mark(GridCell::new(5, 4));
		grid.set_brush(Some(Arc::new(PathBrush::rectangle(2, 2))));
		// anchored on (3, 3) the footprint covers (3..5, 3..5), stepping east
		// would cover (5, 4)
		let node = grid.grid_to_index(GridCell::new(3, 3));
		let east = grid.grid_to_index(GridCell::new(4, 3));
		let edges: Vec<(usize, f32)> = grid.edges_of(node).collect();
		assert!(!edges.iter().any(|(n, _)| *n == east));
		let north = grid.grid_to_index(GridCell::new(3, 2));
		assert!(edges.iter().any(|(n, _)| *n == north));
	}
	#[test]
	fn heuristic_never_overestimates_a_step() {
		let grid = NavGrid::new(&open_map(), 1.0);
		let node = grid.grid_to_index(GridCell::new(3, 3));
		for (next, cost) in grid.edges_of(node) {
			assert!(grid.heuristic(node, next) <= cost);
		}
	}
}
