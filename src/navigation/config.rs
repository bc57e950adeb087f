//! Tunables of the [crate::prelude::PathManager]
//!

/// Fine grid cells per terrain grid along each axis
pub const DEFAULT_FINE_RESOLUTION: f32 = 4.0;
/// Coarse grid cells per terrain grid along each axis
pub const DEFAULT_COARSE_RESOLUTION: f32 = 0.25;
/// Node expansions shared by every queued request during one update
pub const DEFAULT_MAX_SEARCH_STEPS_PER_UPDATE: usize = 2000;
/// Side length in fine cells of the window a queued search is confined to
pub const DEFAULT_SEARCH_AREA_SIZE: i32 = 16 * DEFAULT_FINE_RESOLUTION as i32;
/// How far, as a fraction of the window size, the window origin sits before
/// the midpoint of a request
pub const DEFAULT_SEARCH_AREA_START_FACTOR: f32 = 0.55;
/// Largest spiral ring searched when looking for a free position
pub const DEFAULT_VALID_POSITION_SEARCH_RADIUS: i32 = 512;
/// Most cells visited when substituting a blocked coarse destination
pub const DEFAULT_COARSE_SPIRAL_LIMIT: usize = 512;

/// How densely a straight line is sampled when testing whether a footprint
/// can travel along it
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineOfSightSampling {
	/// Distance between samples as a fraction of the cell size
	step_fraction: f32,
	/// Number of samples the first step is split into
	first_step_subdivisions: u32,
}

impl Default for LineOfSightSampling {
	fn default() -> Self {
		LineOfSightSampling {
			step_fraction: 0.5,
			first_step_subdivisions: 5,
		}
	}
}

impl LineOfSightSampling {
	/// Create a new instance of [LineOfSightSampling]
	pub fn new(step_fraction: f32, first_step_subdivisions: u32) -> Self {
		LineOfSightSampling {
			step_fraction,
			first_step_subdivisions,
		}
	}
	/// Get the distance between samples as a fraction of the cell size
	pub fn get_step_fraction(&self) -> f32 {
		self.step_fraction
	}
	/// Get the number of samples the first step is split into
	pub fn get_first_step_subdivisions(&self) -> u32 {
		self.first_step_subdivisions
	}
}

/// Configuration of the grids, budgets and post processing of a [crate::prelude::PathManager]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathfindingConfig {
	/// Fine grid cells per terrain grid
	fine_resolution: f32,
	/// Coarse grid cells per terrain grid
	coarse_resolution: f32,
	/// Node expansions per call to [crate::prelude::PathManager::update]
	max_search_steps_per_update: usize,
	/// Side length in fine cells of the window a queued search is confined to
	search_area_size: i32,
	/// Offset of the window origin from the request midpoint as a fraction of its size
	search_area_start_factor: f32,
	/// Sampling used by smoothing and [crate::prelude::PathManager::can_move_between]
	line_of_sight: LineOfSightSampling,
	/// Largest ring searched by [crate::prelude::PathManager::find_valid_position]
	valid_position_search_radius: i32,
	/// Most cells visited when substituting a blocked coarse destination
	coarse_spiral_limit: usize,
}

impl Default for PathfindingConfig {
	fn default() -> Self {
		PathfindingConfig {
			fine_resolution: DEFAULT_FINE_RESOLUTION,
			coarse_resolution: DEFAULT_COARSE_RESOLUTION,
			max_search_steps_per_update: DEFAULT_MAX_SEARCH_STEPS_PER_UPDATE,
			search_area_size: DEFAULT_SEARCH_AREA_SIZE,
			search_area_start_factor: DEFAULT_SEARCH_AREA_START_FACTOR,
			line_of_sight: LineOfSightSampling::default(),
			valid_position_search_radius: DEFAULT_VALID_POSITION_SEARCH_RADIUS,
			coarse_spiral_limit: DEFAULT_COARSE_SPIRAL_LIMIT,
		}
	}
}

impl PathfindingConfig {
	/// Read a [PathfindingConfig] from a `.ron` file, any missing field takes
	/// its default value
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Self {
		let file = std::fs::File::open(path).expect("Failed opening PathfindingConfig file");
		let config: PathfindingConfig = match ron::de::from_reader(file) {
			Ok(config) => config,
			Err(e) => panic!("Failed deserializing PathfindingConfig: {}", e),
		};
		config.validate();
		config
	}
	/// Panics if any value is unusable
	pub fn validate(&self) {
		if self.fine_resolution <= 0.0 || self.coarse_resolution <= 0.0 {
			panic!(
				"Grid resolutions must be positive, found fine {} and coarse {}",
				self.fine_resolution, self.coarse_resolution
			);
		}
		if self.max_search_steps_per_update == 0 {
			panic!("At least one search step per update is required");
		}
		if self.search_area_size < 1 {
			panic!(
				"Search area size must be at least one cell, found {}",
				self.search_area_size
			);
		}
		if !(0.0..=1.0).contains(&self.search_area_start_factor) {
			panic!(
				"Search area start factor must be within 0..=1, found {}",
				self.search_area_start_factor
			);
		}
		if self.line_of_sight.get_step_fraction() <= 0.0
			|| self.line_of_sight.get_first_step_subdivisions() == 0
		{
			panic!(
				"Line of sight sampling must move forward, found {:?}",
				self.line_of_sight
			);
		}
	}
	/// Get the fine grid resolution
	pub fn get_fine_resolution(&self) -> f32 {
		self.fine_resolution
	}
	/// Set the fine grid resolution
	pub fn with_fine_resolution(mut self, resolution: f32) -> Self {
		self.fine_resolution = resolution;
		self
	}
	/// Get the coarse grid resolution
	pub fn get_coarse_resolution(&self) -> f32 {
		self.coarse_resolution
	}
	/// Set the coarse grid resolution
	pub fn with_coarse_resolution(mut self, resolution: f32) -> Self {
		self.coarse_resolution = resolution;
		self
	}
	/// Get the node expansion budget of an update
	pub fn get_max_search_steps_per_update(&self) -> usize {
		self.max_search_steps_per_update
	}
	/// Set the node expansion budget of an update
	pub fn with_max_search_steps_per_update(mut self, steps: usize) -> Self {
		self.max_search_steps_per_update = steps;
		self
	}
	/// Get the side length of the search window
	pub fn get_search_area_size(&self) -> i32 {
		self.search_area_size
	}
	/// Set the side length of the search window
	pub fn with_search_area_size(mut self, size: i32) -> Self {
		self.search_area_size = size;
		self
	}
	/// Get the window origin offset factor
	pub fn get_search_area_start_factor(&self) -> f32 {
		self.search_area_start_factor
	}
	/// Set the window origin offset factor
	pub fn with_search_area_start_factor(mut self, factor: f32) -> Self {
		self.search_area_start_factor = factor;
		self
	}
	/// Get the line of sight sampling
	pub fn get_line_of_sight(&self) -> LineOfSightSampling {
		self.line_of_sight
	}
	/// Set the line of sight sampling
	pub fn with_line_of_sight(mut self, sampling: LineOfSightSampling) -> Self {
		self.line_of_sight = sampling;
		self
	}
	/// Get the largest ring searched for a free position
	pub fn get_valid_position_search_radius(&self) -> i32 {
		self.valid_position_search_radius
	}
	/// Set the largest ring searched for a free position
	pub fn with_valid_position_search_radius(mut self, radius: i32) -> Self {
		self.valid_position_search_radius = radius;
		self
	}
	/// Get the cell limit of the coarse destination substitution
	pub fn get_coarse_spiral_limit(&self) -> usize {
		self.coarse_spiral_limit
	}
	/// Set the cell limit of the coarse destination substitution
	pub fn with_coarse_spiral_limit(mut self, limit: usize) -> Self {
		self.coarse_spiral_limit = limit;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn defaults_are_valid() {
		let config = PathfindingConfig::default();
		config.validate();
		assert_eq!(64, config.get_search_area_size());
		assert_eq!(2000, config.get_max_search_steps_per_update());
	}
	#[test]
	#[should_panic]
	fn zero_budget() {
		PathfindingConfig::default()
			.with_max_search_steps_per_update(0)
			.validate();
	}
	#[test]
	#[should_panic]
	fn bad_sampling() {
		PathfindingConfig::default()
			.with_line_of_sight(LineOfSightSampling::new(0.0, 5))
			.validate();
	}
	#[test]
	#[should_panic]
	fn bad_start_factor() {
		PathfindingConfig::default()
			.with_search_area_start_factor(1.5)
			.validate();
	}
	#[test]
	#[cfg(feature = "ron")]
	fn config_file_ron() {
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/pathfinding_config.ron";
		let config = PathfindingConfig::from_ron(path);
		assert_eq!(500, config.get_max_search_steps_per_update());
		// missing fields fall back to defaults
		assert_eq!(DEFAULT_FINE_RESOLUTION, config.get_fine_resolution());
	}
}
