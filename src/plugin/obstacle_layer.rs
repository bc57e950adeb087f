//! Keeps the footprints of agents and buildings marked on every
//! [PathManager] as entities are spawned, moved and despawned
//!

use std::sync::Arc;

use crate::prelude::*;
use bevy::prelude::*;

/// Marks an entity as an agent which blocks others while it moves and which
/// can ask for paths
#[derive(Component, Clone, Debug)]
pub struct PathAgent {
	/// Footprint of the agent on the fine grid
	brush: Arc<PathBrush>,
	/// Does the agent path straight through other agents
	ignore_dynamic_obstacles: bool,
}

impl PathAgent {
	/// Create a new instance of [PathAgent]
	pub fn new(brush: PathBrush, ignore_dynamic_obstacles: bool) -> Self {
		PathAgent {
			brush: Arc::new(brush),
			ignore_dynamic_obstacles,
		}
	}
	/// Get the footprint
	pub fn get_brush(&self) -> Arc<PathBrush> {
		self.brush.clone()
	}
	/// Does the agent path straight through other agents
	pub fn is_ignoring_dynamic_obstacles(&self) -> bool {
		self.ignore_dynamic_obstacles
	}
}

/// Marks an entity as a building whose [ObstacleOutline] permanently blocks the
/// fine grid until the component is removed
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Clone, Debug, PartialEq)]
pub struct StaticObstacle {
	/// Shape relative to the [Transform] of the entity
	outline: ObstacleOutline,
}

impl StaticObstacle {
	/// Create a new instance of [StaticObstacle]
	pub fn new(outline: ObstacleOutline) -> Self {
		StaticObstacle { outline }
	}
	/// Get the outline
	pub fn get_outline(&self) -> &ObstacleOutline {
		&self.outline
	}
}

/// Register new or re-inserted [PathAgent]s as movables, a changed footprint
/// replaces the old one
#[cfg(not(tarpaulin_include))]
pub fn register_path_agents(
	q_agents: Query<(Entity, &PathAgent, &Transform), Changed<PathAgent>>,
	mut q_manager: Query<&mut PathManager>,
) {
	for (entity, agent, transform) in &q_agents {
		for mut manager in q_manager.iter_mut() {
			manager.add_movable(
				entity,
				planar_position(transform),
				agent.get_brush(),
				agent.is_ignoring_dynamic_obstacles(),
			);
		}
	}
}

/// Lift the marks of agents which have been despawned or lost their [PathAgent]
#[cfg(not(tarpaulin_include))]
pub fn unregister_path_agents(
	mut removed: RemovedComponents<PathAgent>,
	mut q_manager: Query<&mut PathManager>,
) {
	for entity in removed.read() {
		for mut manager in q_manager.iter_mut() {
			manager.remove_movable(entity);
		}
	}
}

/// Move the marks of agents whose [Transform] changed
#[cfg(not(tarpaulin_include))]
pub fn sync_path_agents(
	q_agents: Query<(Entity, &Transform), (With<PathAgent>, Changed<Transform>)>,
	mut q_manager: Query<&mut PathManager>,
) {
	for mut manager in q_manager.iter_mut() {
		for (entity, transform) in &q_agents {
			manager.sync_movable(entity, planar_position(transform));
		}
	}
}

/// Mark the outline of new, altered or moved [StaticObstacle]s, lifting the
/// cells they covered before
#[cfg(not(tarpaulin_include))]
pub fn register_static_obstacles(
	q_obstacles: Query<
		(Entity, &StaticObstacle, &Transform),
		Or<(Changed<StaticObstacle>, Changed<Transform>)>,
	>,
	mut q_manager: Query<&mut PathManager>,
) {
	for (entity, obstacle, transform) in &q_obstacles {
		for mut manager in q_manager.iter_mut() {
			let cells = manager.cells_in_outline(
				planar_position(transform),
				planar_rotation(transform),
				obstacle.get_outline(),
			);
			manager.add_static_obstacle(entity, cells);
		}
	}
}

/// Lift the outline of buildings which have been despawned or lost their [StaticObstacle]
#[cfg(not(tarpaulin_include))]
pub fn unregister_static_obstacles(
	mut removed: RemovedComponents<StaticObstacle>,
	mut q_manager: Query<&mut PathManager>,
) {
	for entity in removed.read() {
		for mut manager in q_manager.iter_mut() {
			manager.remove_static_obstacle(entity);
		}
	}
}
