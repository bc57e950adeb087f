//! The terrain a [crate::prelude::NavGrid] is seeded from.
//!
//! A [Landscape] only needs to describe its world size, how many terrain
//! grids it is made of and whether a point is occluded (water, cliffs,
//! trees...). It is consulted once when a grid is built.
//!

use bevy::prelude::*;

use crate::prelude::*;

/// Terrain surface consumed while building a [NavGrid]
pub trait Landscape {
	/// Size of the terrain in world units along `x` and `y` (or `z` in 3d)
	fn get_size(&self) -> Vec2;
	/// Number of terrain grids along each axis, each must be a power of two
	/// no larger than [MAX_TERRAIN_GRID_COUNT]
	fn get_grid_count(&self) -> UVec2;
	/// Is the world space point `(x, y)` impassable
	fn is_point_occluded(&self, x: f32, y: f32) -> bool;
}

/// The world size and terrain resolution of a map
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct MapDimensions {
	/// World units covered along each axis
	size: (f32, f32),
	/// Terrain grids along each axis
	grid_count: (u32, u32),
}

impl MapDimensions {
	/// Create a new instance of [MapDimensions]. The `grid_count` must be a
	/// power of two between 1 and [MAX_TERRAIN_GRID_COUNT] along each axis
	/// and `size` must be positive
	pub fn new(size: Vec2, grid_count: UVec2) -> Self {
		if size.x <= 0.0 || size.y <= 0.0 {
			panic!("Map dimensions `{:?}` must be positive", size);
		}
		for count in [grid_count.x, grid_count.y] {
			if !count.is_power_of_two() || count > MAX_TERRAIN_GRID_COUNT {
				panic!(
					"Terrain grid count `{:?}` is invalid, each axis must be a power of two no larger than {}",
					grid_count, MAX_TERRAIN_GRID_COUNT
				);
			}
		}
		MapDimensions {
			size: (size.x, size.y),
			grid_count: (grid_count.x, grid_count.y),
		}
	}
	/// Get the world size
	pub fn get_size(&self) -> Vec2 {
		Vec2::new(self.size.0, self.size.1)
	}
	/// Get the number of terrain grids
	pub fn get_grid_count(&self) -> UVec2 {
		UVec2::new(self.grid_count.0, self.grid_count.1)
	}
	/// World units covered by a single terrain grid
	pub fn get_terrain_grid_size(&self) -> Vec2 {
		self.get_size() / self.get_grid_count().as_vec2()
	}
}

/// A [Landscape] described by a flag per terrain grid, `true` meaning the
/// terrain grid cannot be walked across
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct OcclusionMap {
	/// Size and resolution of the map
	dimensions: MapDimensions,
	/// Row-major occlusion flags, `grid_count.x * grid_count.y` long
	occluded: Vec<bool>,
}

impl OcclusionMap {
	/// Create a new instance of [OcclusionMap] where nothing is occluded
	pub fn new(dimensions: MapDimensions) -> Self {
		let count = dimensions.get_grid_count();
		OcclusionMap {
			dimensions,
			occluded: vec![false; (count.x * count.y) as usize],
		}
	}
	/// Get the size and resolution
	pub fn get_dimensions(&self) -> &MapDimensions {
		&self.dimensions
	}
	/// Flag the terrain grid at `(column, row)`
	pub fn set_occluded(&mut self, column: u32, row: u32, occluded: bool) {
		let count = self.dimensions.get_grid_count();
		if column >= count.x || row >= count.y {
			panic!(
				"Terrain grid `({}, {})` is outside of the map `{:?}`",
				column, row, count
			);
		}
		self.occluded[(row * count.x + column) as usize] = occluded;
	}
	/// Is the terrain grid at `(column, row)` flagged
	pub fn is_occluded(&self, column: u32, row: u32) -> bool {
		let count = self.dimensions.get_grid_count();
		if column >= count.x || row >= count.y {
			return false;
		}
		self.occluded[(row * count.x + column) as usize]
	}
	/// Read an [OcclusionMap] from a `.ron` file
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Self {
		let file = std::fs::File::open(path).expect("Failed opening OcclusionMap file");
		let map: OcclusionMap = match ron::de::from_reader(file) {
			Ok(map) => map,
			Err(e) => panic!("Failed deserializing OcclusionMap: {}", e),
		};
		let count = map.dimensions.get_grid_count();
		if map.occluded.len() != (count.x * count.y) as usize {
			panic!(
				"OcclusionMap holds {} flags but its dimensions require {}",
				map.occluded.len(),
				count.x * count.y
			);
		}
		map
	}
	/// Read an [OcclusionMap] from a CSV file without headers where each row
	/// of the file is a row of terrain grids and any non-zero value marks an
	/// occluded grid
	#[cfg(feature = "csv")]
	pub fn from_csv(dimensions: MapDimensions, path: String) -> Self {
		let mut map = OcclusionMap::new(dimensions);
		let count = dimensions.get_grid_count();
		let mut reader = csv::ReaderBuilder::new()
			.has_headers(false)
			.from_path(path)
			.expect("Failed opening OcclusionMap CSV file");
		let mut rows = 0u32;
		for (row, record) in reader.records().enumerate() {
			let record = record.expect("Failed reading row of OcclusionMap CSV");
			if record.len() != count.x as usize || row >= count.y as usize {
				panic!(
					"OcclusionMap CSV does not match the terrain grid count `{:?}`",
					count
				);
			}
			for (column, value) in record.iter().enumerate() {
				let value = value
					.trim()
					.parse::<u8>()
					.expect("Failed to parse OcclusionMap CSV value");
				map.set_occluded(column as u32, row as u32, value > 0);
			}
			rows += 1;
		}
		if rows != count.y {
			panic!(
				"OcclusionMap CSV has {} rows, expected {}",
				rows, count.y
			);
		}
		map
	}
	/// Derive an [OcclusionMap] from an image where each pixel is a terrain
	/// grid. Dark pixels (average channel value below `128`) are occluded
	#[cfg(feature = "heightmap")]
	pub fn from_heightmap(dimensions: MapDimensions, path: String) -> Self {
		use photon_rs::native::open_image;
		let img = open_image(&path).expect("Failed to open heightmap");
		let img_width = img.get_width();
		let img_height = img.get_height();
		let count = dimensions.get_grid_count();
		if img_width != count.x || img_height != count.y {
			panic!(
				"Heightmap has incorrect size, expected {}x{} pixels, found {}x{}",
				count.x, count.y, img_width, img_height
			);
		}
		let raw_pixels = img.get_raw_pixels();
		// raw pixels are arranged from the top left of the image and come in
		// sets of either 3 or 4 (if alpha channel is included)
		let len_if_alpha = img_width * img_height * 4;
		let chunk_size = if len_if_alpha as usize == raw_pixels.len() {
			4
		} else {
			3
		};
		let mut map = OcclusionMap::new(dimensions);
		for (i, px) in raw_pixels.chunks(chunk_size).enumerate() {
			let column = i as u32 % img_width;
			let row = i as u32 / img_width;
			// careful of u8 overflow
			let colour_avg = (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0;
			map.set_occluded(column, row, colour_avg < 128.0);
		}
		map
	}
}

impl Landscape for OcclusionMap {
	fn get_size(&self) -> Vec2 {
		self.dimensions.get_size()
	}
	fn get_grid_count(&self) -> UVec2 {
		self.dimensions.get_grid_count()
	}
	fn is_point_occluded(&self, x: f32, y: f32) -> bool {
		if x < 0.0 || y < 0.0 {
			return false;
		}
		let grid_size = self.dimensions.get_terrain_grid_size();
		let column = (x / grid_size.x) as u32;
		let row = (y / grid_size.y) as u32;
		self.is_occluded(column, row)
	}
}
