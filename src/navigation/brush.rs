//! A [PathBrush] describes the footprint of an agent as a set of cell offsets.
//!
//! The offsets are normalised so the smallest column and row are both `0`,
//! the cell at offset `(0, 0)` is called the anchor. When an agent steps one
//! cell in any direction only a handful of cells become newly covered by its
//! footprint, these are precomputed for each [Ordinal] as the leading edge of
//! the brush so that adjacency tests only need to look at them.
//!
//! ```text
//! A 2x2 brush stepping East tests only the column marked `x`
//!  _____ _____ _____
//! |  b  |  b  |  x  |
//! |_____|_____|_____|
//! |  b  |  b  |  x  |
//! |_____|_____|_____|
//! ```
//!

use crate::prelude::*;

/// Footprint of an agent measured in grid cells
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PathBrush {
	/// Normalised `(column, row)` offsets covered by the brush
	cells: Vec<(i32, i32)>,
	/// Number of columns spanned by the brush
	size_x: i32,
	/// Number of rows spanned by the brush
	size_y: i32,
	/// Offsets newly covered after stepping once in each direction, indexed
	/// by [Ordinal::get_index]
	leading_edges: [Vec<(i32, i32)>; 8],
}

impl PathBrush {
	/// Create a new instance of [PathBrush] from a list of `(column, row)`
	/// offsets. The offsets may use any origin, they are shifted so the
	/// smallest of each axis becomes `0`. Panics if no offsets are given or if
	/// the footprint spans more than [MAX_BRUSH_SIZE] cells along an axis
	pub fn new(offsets: &[(i32, i32)]) -> Self {
		if offsets.is_empty() {
			panic!("A PathBrush requires at least one cell offset");
		}
		let mut min = (i32::MAX, i32::MAX);
		let mut max = (i32::MIN, i32::MIN);
		for (x, y) in offsets.iter() {
			min.0 = min.0.min(*x);
			min.1 = min.1.min(*y);
			max.0 = max.0.max(*x);
			max.1 = max.1.max(*y);
		}
		let size_x = 1 + max.0 - min.0;
		let size_y = 1 + max.1 - min.1;
		if size_x > MAX_BRUSH_SIZE || size_y > MAX_BRUSH_SIZE {
			panic!(
				"PathBrush of size `({}, {})` is too large, each axis must be within 1..={}",
				size_x, size_y, MAX_BRUSH_SIZE
			);
		}
		let mut cells: Vec<(i32, i32)> = offsets
			.iter()
			.map(|(x, y)| (x - min.0, y - min.1))
			.collect();
		cells.sort();
		cells.dedup();
		// occupancy lookup of the bounding box
		let mut covered = vec![false; (size_x * size_y) as usize];
		for (x, y) in cells.iter() {
			covered[(y * size_x + x) as usize] = true;
		}
		let is_covered = |x: i32, y: i32| -> bool {
			x >= 0 && x < size_x && y >= 0 && y < size_y && covered[(y * size_x + x) as usize]
		};
		let leading_edges = Ordinal::ALL.map(|ordinal| {
			let (dx, dy) = ordinal.get_offset();
			cells
				.iter()
				.map(|(x, y)| (x + dx, y + dy))
				.filter(|(x, y)| !is_covered(*x, *y))
				.collect()
		});
		PathBrush {
			cells,
			size_x,
			size_y,
			leading_edges,
		}
	}
	/// A brush of a single cell
	pub fn single() -> Self {
		PathBrush::new(&[(0, 0)])
	}
	/// A solid rectangle of `columns` by `rows` cells
	pub fn rectangle(columns: i32, rows: i32) -> Self {
		let mut offsets = Vec::new();
		for x in 0..columns {
			for y in 0..rows {
				offsets.push((x, y));
			}
		}
		PathBrush::new(&offsets)
	}
	/// Rasterise a circle of world space `radius` onto cells of `cell_size`.
	/// An even number of cells across places the circle centre on a cell
	/// corner, an odd number places it on a cell centre
	pub fn from_radius(radius: f32, cell_size: f32) -> Self {
		if radius < 0.0 || cell_size <= 0.0 {
			panic!(
				"Cannot create a PathBrush from radius {} and cell size {}",
				radius, cell_size
			);
		}
		let size = ((2.0 * radius / cell_size) as i32).max(1);
		let half_size = size / 2;
		let radius = half_size as f32 * cell_size;
		let half_cell = cell_size / 2.0;
		let mut offsets = Vec::new();
		if size % 2 == 0 {
			for x in -half_size..half_size {
				for y in -half_size..half_size {
					let xx = x as f32 * cell_size + half_cell;
					let yy = y as f32 * cell_size + half_cell;
					if xx * xx + yy * yy <= radius * radius {
						offsets.push((x, y));
					}
				}
			}
		} else {
			for x in -half_size..=half_size {
				for y in -half_size..=half_size {
					let xx = x as f32 * cell_size;
					let yy = y as f32 * cell_size;
					if xx * xx + yy * yy <= radius * radius {
						offsets.push((x, y));
					}
				}
			}
		}
		PathBrush::new(&offsets)
	}
	/// Get the normalised offsets covered by the brush
	pub fn get_cells(&self) -> &[(i32, i32)] {
		&self.cells
	}
	/// Get the number of columns spanned
	pub fn get_size_x(&self) -> i32 {
		self.size_x
	}
	/// Get the number of rows spanned
	pub fn get_size_y(&self) -> i32 {
		self.size_y
	}
	/// Offsets that become newly covered after stepping in the direction of `ordinal`
	pub fn get_leading_edge(&self, ordinal: Ordinal) -> &[(i32, i32)] {
		&self.leading_edges[ordinal.get_index()]
	}
	/// Absolute cells covered when the brush anchor sits on `anchor`
	pub fn cells_at(&self, anchor: GridCell) -> impl Iterator<Item = GridCell> + '_ {
		self.cells.iter().map(move |(x, y)| anchor.offset(*x, *y))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn normalises_offsets() {
		let brush = PathBrush::new(&[(-2, -1), (-1, -1), (-2, 0)]);
		let actual = vec![(0, 0), (0, 1), (1, 0)];
		assert_eq!(actual, brush.get_cells().to_vec());
		assert_eq!(2, brush.get_size_x());
		assert_eq!(2, brush.get_size_y());
	}
	#[test]
	#[should_panic]
	fn empty_brush() {
		PathBrush::new(&[]);
	}
	#[test]
	#[should_panic]
	fn oversized_brush() {
		PathBrush::new(&[(0, 0), (128, 0)]);
	}
	#[test]
	fn largest_brush() {
		let brush = PathBrush::new(&[(0, 0), (127, 127)]);
		assert_eq!(128, brush.get_size_x());
	}
	#[test]
	fn single_cell_leading_edges() {
		let brush = PathBrush::single();
		for ordinal in Ordinal::ALL {
			let actual = vec![ordinal.get_offset()];
			assert_eq!(actual, brush.get_leading_edge(ordinal).to_vec());
		}
	}
	#[test]
	fn square_leading_edge_east() {
		let brush = PathBrush::rectangle(2, 2);
		let mut result = brush.get_leading_edge(Ordinal::East).to_vec();
		result.sort();
		let actual = vec![(2, 0), (2, 1)];
		assert_eq!(actual, result);
	}
	#[test]
	fn square_leading_edge_north_west() {
		let brush = PathBrush::rectangle(2, 2);
		let mut result = brush.get_leading_edge(Ordinal::NorthWest).to_vec();
		result.sort();
		let actual = vec![(-1, -1), (-1, 0), (0, -1)];
		assert_eq!(actual, result);
	}
	#[test]
	fn leading_edge_covers_the_moved_footprint() {
		// the moved footprint is always the old footprint plus its leading edge
		let brush = PathBrush::from_radius(3.0, 1.0);
		for ordinal in Ordinal::ALL {
			let (dx, dy) = ordinal.get_offset();
			for (x, y) in brush.get_cells() {
				let moved = (x + dx, y + dy);
				let in_old = brush.get_cells().contains(&moved);
				let in_edge = brush.get_leading_edge(ordinal).contains(&moved);
				assert!(in_old != in_edge);
			}
		}
	}
	#[test]
	fn circle_of_one_cell() {
		let brush = PathBrush::from_radius(0.1, 1.0);
		assert_eq!(vec![(0, 0)], brush.get_cells().to_vec());
	}
	#[test]
	fn circle_even_size() {
		// 4 cells across, corners of the bounding square fall outside
		let brush = PathBrush::from_radius(2.0, 1.0);
		assert_eq!(4, brush.get_size_x());
		assert_eq!(4, brush.get_size_y());
		assert_eq!(12, brush.get_cells().len());
		assert!(!brush.get_cells().contains(&(0, 0)));
	}
	#[test]
	fn circle_odd_size() {
		// 3 cells across with a radius of one cell gives a plus shape
		let brush = PathBrush::from_radius(1.5, 1.0);
		let actual = vec![(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)];
		assert_eq!(actual, brush.get_cells().to_vec());
	}
	#[test]
	fn cells_at_anchor() {
		let brush = PathBrush::rectangle(2, 1);
		let result: Vec<GridCell> = brush.cells_at(GridCell::new(5, 6)).collect();
		let actual = vec![GridCell::new(5, 6), GridCell::new(6, 6)];
		assert_eq!(actual, result);
	}
}
