//! Instantaneous occupancy queries used when placing buildings and steering
//! agents, along with the static footprints of buildings.
//!
//! Footprints of buildings are described by an [ObstacleOutline] which is
//! rasterised onto the fine grid. The covered cells have their static
//! counter incremented for as long as the building stands.
//!

use bevy::prelude::*;

use crate::prelude::*;

/// Candidates tried by [PathManager::find_next_valid_position] before giving up
const STEERING_ATTEMPTS: usize = 300;
/// Distance between the rings of the steering search in cells
const STEERING_STEP: f32 = 1.2;
/// Angle swept between candidates of the steering search
const STEERING_TURN: f32 = std::f32::consts::PI / 15.0;

/// Shape of a static footprint, measured in world units relative to the
/// position of its owner
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ObstacleOutline {
	/// Every cell whose centre lies within `radius` of the owner
	Circle {
		/// Radius in world units
		radius: f32,
	},
	/// Every cell whose centre lies within a rectangle spanning `min` to
	/// `max` in the local space of the owner, turned by `rotation` radians
	Rectangle {
		/// Local `(x, y)` of the smallest corner
		min: (f32, f32),
		/// Local `(x, y)` of the largest corner
		max: (f32, f32),
		/// Turn applied on top of the rotation of the owner
		rotation: f32,
	},
	/// Explicit `(column, row)` offsets from the cell under the owner
	Cells(Vec<(i32, i32)>),
}

impl PathManager {
	/// Can the movable `agent` stand at `position`, its own marks are not
	/// considered. An unregistered entity is tested as a single cell
	pub fn can_be_placed_at(&mut self, position: Vec2, agent: Entity) -> bool {
		let brush = self.get_movable_brush(agent);
		self.unmark_movable(agent);
		let placeable = !self
			.get_grid()
			.is_brush_obstructed(position, brush.as_deref(), true);
		self.mark_movable(agent);
		placeable
	}
	/// Can a footprint stand at `position`
	pub fn can_brush_be_placed_at(
		&self,
		position: Vec2,
		brush: Option<&PathBrush>,
		include_dynamic: bool,
	) -> bool {
		!self
			.get_grid()
			.is_brush_obstructed(position, brush, include_dynamic)
	}
	/// Are all `cells` free
	pub fn can_cells_be_placed(&self, cells: &[GridCell], include_dynamic: bool) -> bool {
		!cells
			.iter()
			.any(|cell| self.get_grid().is_grid_obstructed(*cell, include_dynamic))
	}
	/// Can the movable `agent` walk in a straight line from `start` to `end`,
	/// its own marks are not considered. An unregistered entity is tested as
	/// a single cell
	pub fn can_move_between(
		&mut self,
		start: Vec2,
		end: Vec2,
		agent: Entity,
		include_dynamic: bool,
	) -> bool {
		let brush = self.get_movable_brush(agent);
		let sampling = self.get_config().get_line_of_sight();
		self.unmark_movable(agent);
		let clear = has_line_of_sight(
			self.get_grid(),
			start,
			end,
			brush.as_deref(),
			include_dynamic,
			sampling,
		);
		self.mark_movable(agent);
		clear
	}
	/// Find the closest position to `position` where `brush` can stand.
	/// Candidate anchors are walked in rings outwards up to
	/// [PathfindingConfig::get_valid_position_search_radius], [None] if every
	/// one of them is obstructed
	pub fn find_valid_position(&self, position: Vec2, brush: Option<&PathBrush>) -> Option<Vec2> {
		let grid = self.get_grid();
		if !grid.is_brush_obstructed(position, brush, true) {
			return Some(position);
		}
		let anchor = grid.position_to_grid(position, brush);
		cells_inner_out(anchor, self.valid_position_search_radius())
			.filter(|cell| grid.is_in_grid(*cell))
			.map(|cell| grid.grid_to_position(cell, brush))
			.find(|candidate| !grid.is_brush_obstructed(*candidate, brush, true))
	}
	/// Rings walked by [PathManager::find_valid_position], never more than it
	/// takes to cover the whole grid
	pub(crate) fn valid_position_search_radius(&self) -> i32 {
		let grid = self.get_grid();
		self.get_config()
			.get_valid_position_search_radius()
			.min(grid.get_width().max(grid.get_height()))
	}
	/// Steer the movable `agent` towards a free spot near `target` while it
	/// travels from `start`, its own marks are not considered.
	///
	/// The first candidate sits a short step before `target` on the line from
	/// `start`. Each following candidate swings a little further around
	/// `target` and once a half turn has been swept the swing restarts a step
	/// further out.
	/// `last_position` resumes the fan from a previously rejected candidate.
	/// A `start` of [None] is treated as the origin. Falls back to
	/// [PathManager::find_valid_position] when `target` and `start` coincide,
	/// [None] if no candidate is free
	pub fn find_next_valid_position(
		&mut self,
		target: Vec2,
		start: Option<Vec2>,
		last_position: Option<Vec2>,
		agent: Entity,
	) -> Option<Vec2> {
		let brush = self.get_movable_brush(agent);
		self.unmark_movable(agent);
		let found = self.steer(
			target,
			start.unwrap_or(Vec2::ZERO),
			last_position.filter(|last| *last != target),
			brush.as_deref(),
		);
		self.mark_movable(agent);
		found
	}
	/// Free spot for the movable `agent` closest to `position` as seen from
	/// `start`, see [PathManager::find_next_valid_position]
	pub fn find_valid_agent_position(
		&mut self,
		position: Vec2,
		start: Option<Vec2>,
		agent: Entity,
	) -> Option<Vec2> {
		self.find_next_valid_position(position, start, start, agent)
	}
	/// Fan search behind `target`
	fn steer(
		&self,
		target: Vec2,
		start: Vec2,
		last_position: Option<Vec2>,
		brush: Option<&PathBrush>,
	) -> Option<Vec2> {
		let grid = self.get_grid();
		let is_free = |position: Vec2| !grid.is_brush_obstructed(position, brush, true);
		if is_free(target) {
			return Some(target);
		}
		let travel = target - start;
		if travel == Vec2::ZERO {
			return self.find_valid_position(target, brush);
		}
		let step = STEERING_STEP * grid.get_cell_size();
		let mut last = match last_position {
			Some(last) => last,
			None => {
				let behind = target - travel.normalize() * step;
				if is_free(behind) {
					return Some(behind);
				}
				behind
			}
		};
		let side = travel.perp();
		let mut distance = 0.0;
		for _ in 0..STEERING_ATTEMPTS {
			let mut offset = target - last;
			if offset == Vec2::ZERO {
				offset = travel.normalize() * (distance + step);
			}
			distance = offset.length();
			let angle = travel.angle_to(offset).abs() + STEERING_TURN;
			let direction = if angle > std::f32::consts::PI {
				distance += step;
				travel
			} else if offset.dot(side) > 0.0 {
				rotate_vec2(travel, angle)
			} else {
				rotate_vec2(travel, -angle)
			};
			let candidate = target - direction.normalize() * distance;
			if is_free(candidate) {
				return Some(candidate);
			}
			last = candidate;
		}
		None
	}
	/// Increment the static counter of each cell
	pub fn mark_static(&mut self, cells: &[GridCell]) {
		for cell in cells {
			self.get_grid_mut().mark(*cell);
		}
	}
	/// Decrement the static counter of each cell
	pub fn unmark_static(&mut self, cells: &[GridCell]) {
		for cell in cells {
			self.get_grid_mut().unmark(*cell);
		}
	}
	/// Mark `cells` as a static footprint owned by `entity`, replacing any
	/// footprint it already has
	pub fn add_static_obstacle(&mut self, entity: Entity, cells: Vec<GridCell>) {
		self.remove_static_obstacle(entity);
		self.mark_static(&cells);
		trace!("Static obstacle {:?} covers {} cells", entity, cells.len());
		self.get_static_obstacles_mut().insert(entity, cells);
	}
	/// Lift the static footprint of `entity`, returns `false` if it had none
	pub fn remove_static_obstacle(&mut self, entity: Entity) -> bool {
		match self.get_static_obstacles_mut().remove(&entity) {
			Some(cells) => {
				self.unmark_static(&cells);
				true
			}
			None => false,
		}
	}
	/// Cells of the fine grid whose centre lies within `radius` of
	/// `position`. When the circle is too small to contain a cell centre the
	/// cell under `position` is used
	pub fn cells_in_circle(&self, position: Vec2, radius: f32) -> Vec<GridCell> {
		let grid = self.get_grid();
		let cell_size = grid.get_cell_size();
		let min = ((position - radius) / cell_size).floor();
		let max = ((position + radius) / cell_size).floor();
		let mut cells = Vec::new();
		for column in min.x as i32..=max.x as i32 {
			for row in min.y as i32..=max.y as i32 {
				let cell = GridCell::new(column, row);
				if !grid.is_in_grid(cell) {
					continue;
				}
				let centre = grid.grid_to_position(cell, None);
				if centre.distance_squared(position) <= radius * radius {
					cells.push(cell);
				}
			}
		}
		if cells.is_empty() {
			let cell = grid.position_to_grid(position, None);
			if grid.is_in_grid(cell) {
				cells.push(cell);
			}
		}
		cells
	}
	/// Cells of the fine grid whose centre lies inside the rectangle from
	/// `min` to `max`, expressed in a local space which is rotated by
	/// `rotation` radians and then moved by `translation`
	pub fn cells_in_rectangle(
		&self,
		min: Vec2,
		max: Vec2,
		translation: Vec2,
		rotation: f32,
	) -> Vec<GridCell> {
		let grid = self.get_grid();
		let cell_size = grid.get_cell_size();
		let middle = rotate_vec2((min + max) / 2.0, rotation) + translation;
		let middle_cell = grid.position_to_grid(middle, None);
		let radius = 1 + ((max - min).length() / cell_size / 2.0) as i32;
		let mut cells = Vec::new();
		for column in middle_cell.get_column() - radius..=middle_cell.get_column() + radius {
			for row in middle_cell.get_row() - radius..=middle_cell.get_row() + radius {
				let cell = GridCell::new(column, row);
				if !grid.is_in_grid(cell) {
					continue;
				}
				let local = rotate_vec2(grid.grid_to_position(cell, None) - translation, -rotation);
				if local.x >= min.x && local.x <= max.x && local.y >= min.y && local.y <= max.y {
					cells.push(cell);
				}
			}
		}
		cells
	}
	/// Rasterise an [ObstacleOutline] owned by something at `position` turned by
	/// `rotation` radians
	pub fn cells_in_outline(
		&self,
		position: Vec2,
		rotation: f32,
		outline: &ObstacleOutline,
	) -> Vec<GridCell> {
		match outline {
			ObstacleOutline::Circle { radius } => self.cells_in_circle(position, *radius),
			ObstacleOutline::Rectangle { min, max, rotation: turn } => self.cells_in_rectangle(
				Vec2::new(min.0, min.1),
				Vec2::new(max.0, max.1),
				position,
				rotation + turn,
			),
			ObstacleOutline::Cells(offsets) => {
				let grid = self.get_grid();
				let origin = grid.position_to_grid(position, None);
				offsets
					.iter()
					.map(|(x, y)| origin.offset(*x, *y))
					.filter(|cell| grid.is_in_grid(*cell))
					.collect()
			}
		}
	}
}
