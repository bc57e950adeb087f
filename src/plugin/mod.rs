//! Defines the Bevy [Plugin] for grid pathfinding
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod obstacle_layer;
pub mod path_layer;

/// Systems of the plugin run in [Update] in this order
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Bring agent and building footprints up to date
	Obstacles,
	/// Queue, cancel and advance path searches
	Search,
}

/// Adds the events and systems which keep every [PathManager] in step with
/// the world and drive its searches
pub struct PathGridPlugin;

impl Plugin for PathGridPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<Ordinal>()
			.register_type::<GridCell>()
			.register_type::<GridBoundary>()
			.register_type::<MapDimensions>()
			.add_event::<path_layer::EventPathRequest>()
			.add_event::<path_layer::EventCancelPathRequest>()
			.add_event::<path_layer::EventPathFound>()
			.add_event::<path_layer::EventPathNotFound>()
			.configure_sets(Update, (OrderingSet::Obstacles, OrderingSet::Search).chain())
			.add_systems(
				Update,
				(
					(
						obstacle_layer::unregister_path_agents,
						obstacle_layer::register_path_agents,
						obstacle_layer::sync_path_agents,
						obstacle_layer::unregister_static_obstacles,
						obstacle_layer::register_static_obstacles,
					)
						.chain()
						.in_set(OrderingSet::Obstacles),
					(
						path_layer::event_cancel_path_queue,
						path_layer::event_insert_path_queue,
						path_layer::process_path_queue,
					)
						.chain()
						.in_set(OrderingSet::Search),
				),
			);
	}
}

/// Position of a [Transform] on the plane of the grid, `x` and `y` in 2d
#[cfg(not(feature = "3d"))]
pub fn planar_position(transform: &Transform) -> Vec2 {
	transform.translation.truncate()
}

/// Position of a [Transform] on the plane of the grid, `x` and `z` in 3d
#[cfg(feature = "3d")]
pub fn planar_position(transform: &Transform) -> Vec2 {
	Vec2::new(transform.translation.x, transform.translation.z)
}

/// Rotation of a [Transform] on the plane of the grid in radians, the turn
/// about `z` in 2d
#[cfg(not(feature = "3d"))]
pub fn planar_rotation(transform: &Transform) -> f32 {
	transform.rotation.to_euler(EulerRot::ZYX).0
}

/// Rotation of a [Transform] on the plane of the grid in radians. A positive
/// turn about `y` swings `x` towards `-z` so the sign is flipped
#[cfg(feature = "3d")]
pub fn planar_rotation(transform: &Transform) -> f32 {
	-transform.rotation.to_euler(EulerRot::YXZ).0
}
