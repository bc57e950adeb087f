//! Spawn a [PathGridBundle] to give the world a [PathManager]
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Everything the [crate::prelude::PathGridPlugin] needs to find paths over a landscape
#[derive(Bundle)]
pub struct PathGridBundle {
	/// Grids, movables and the request queue
	path_manager: PathManager,
}

impl PathGridBundle {
	/// Create a new instance of [PathGridBundle] over a [Landscape]
	pub fn new(landscape: &impl Landscape, config: PathfindingConfig) -> Self {
		PathGridBundle {
			path_manager: PathManager::new(landscape, config),
		}
	}
	/// Create a new instance of [PathGridBundle] where the [OcclusionMap] and
	/// the [PathfindingConfig] are read from disk
	#[cfg(feature = "ron")]
	pub fn new_from_disk(occlusion_path: &str, config_path: &str) -> Self {
		let map = OcclusionMap::from_ron(occlusion_path.to_string());
		let config = PathfindingConfig::from_ron(config_path.to_string());
		PathGridBundle::new(&map, config)
	}
	/// Get the [PathManager]
	pub fn get_path_manager(&self) -> &PathManager {
		&self.path_manager
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn grids_from_landscape() {
		let map = OcclusionMap::new(MapDimensions::new(Vec2::new(64.0, 64.0), UVec2::new(16, 16)));
		let bundle = PathGridBundle::new(&map, PathfindingConfig::default());
		let manager = bundle.get_path_manager();
		assert_eq!(64, manager.get_grid().get_width());
		assert_eq!(1.0, manager.get_grid().get_cell_size());
		assert_eq!(4, manager.get_coarse_grid().get_width());
		assert_eq!(16.0, manager.get_coarse_grid().get_cell_size());
	}
	#[test]
	#[should_panic]
	fn invalid_config() {
		let map = OcclusionMap::new(MapDimensions::new(Vec2::new(64.0, 64.0), UVec2::new(16, 16)));
		PathGridBundle::new(&map, PathfindingConfig::default().with_search_area_size(0));
	}
	#[test]
	#[cfg(feature = "ron")]
	fn bundle_from_disk() {
		let occlusion_path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/occlusion_map.ron";
		let config_path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/pathfinding_config.ron";
		let bundle = PathGridBundle::new_from_disk(&occlusion_path, &config_path);
		let manager = bundle.get_path_manager();
		assert_eq!(500, manager.get_config().get_max_search_steps_per_update());
		assert_eq!(32, manager.get_grid().get_width());
	}
}
