//! The [PathManager] owns the navigation grids and shares a bounded amount
//! of search work between every agent asking for a path.
//!
//! Requests are queued with a priority (lower values are served first). Each
//! call to [PathManager::update] spends at most
//! [PathfindingConfig::get_max_search_steps_per_update] node expansions
//! across the queue. A single [AStarSearch] engine is shared so when a more
//! urgent request arrives the interrupted search is dropped and starts again
//! from scratch the next time it is selected. Completed searches are turned
//! into smoothed [GraphPath]s and left in an outbox of [PathOutcome]s for the
//! caller to collect with [PathManager::take_outcomes].
//!
//! Queued searches are confined to a square window of
//! [PathfindingConfig::get_search_area_size] cells around the midpoint of the
//! request, destinations beyond it are reported as not found. Long journeys
//! are expected to be planned with [PathManager::query_path_immediate] on the
//! coarse grid and then followed leg by leg.
//!
//! Moving agents are registered as dynamic obstacles, the cells under their
//! footprint are marked in the dynamic counters of the fine grid and kept in
//! step with their position. While an agent's own path is being searched its
//! marks are lifted so it does not block itself.
//!

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;

use crate::prelude::*;

/// Identifies the search held by the shared engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchKey {
	/// Subscriber that queued the search
	owner: Entity,
	/// Movable whose footprint and marks shaped the search
	obstacle: Entity,
	/// Start node
	start: usize,
	/// End node
	end: usize,
}

impl SearchKey {
	/// Get the subscriber that queued the search
	pub fn get_owner(&self) -> Entity {
		self.owner
	}
	/// Get the movable whose footprint is searched with
	pub fn get_obstacle(&self) -> Entity {
		self.obstacle
	}
	/// Get the start node
	pub fn get_start(&self) -> usize {
		self.start
	}
	/// Get the end node
	pub fn get_end(&self) -> usize {
		self.end
	}
}

/// What the shared engine is currently working on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InFlightSearch {
	/// No search is paused
	#[default]
	Idle,
	/// A search has been started and may be resumed
	Active(SearchKey),
}

/// A queued request for a path
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathRequest {
	/// Entity notified of the outcome, at most one request per subscriber is queued
	subscriber: Entity,
	/// Registered movable whose footprint is used and whose own marks are ignored
	obstacle: Entity,
	/// Anchor node of the footprint at the start
	start: usize,
	/// Anchor node of the footprint at the destination
	end: usize,
	/// Exact world position appended to the end of a found path
	destination: Vec2,
	/// Lower values are served first
	priority: f32,
	/// Window the search is confined to
	boundary: GridBoundary,
}

impl PathRequest {
	/// Get the subscriber
	pub fn get_subscriber(&self) -> Entity {
		self.subscriber
	}
	/// Get the movable obstacle
	pub fn get_obstacle(&self) -> Entity {
		self.obstacle
	}
	/// Get the start node
	pub fn get_start(&self) -> usize {
		self.start
	}
	/// Get the end node
	pub fn get_end(&self) -> usize {
		self.end
	}
	/// Get the destination
	pub fn get_destination(&self) -> Vec2 {
		self.destination
	}
	/// Get the priority
	pub fn get_priority(&self) -> f32 {
		self.priority
	}
	/// Get the search window
	pub fn get_boundary(&self) -> GridBoundary {
		self.boundary
	}
}

/// Result of a queued request
#[derive(Clone, Debug, PartialEq)]
pub enum PathOutcome {
	/// A path from the start to the destination
	Found {
		/// Entity that queued the request
		subscriber: Entity,
		/// Smoothed path ending on the exact destination
		path: GraphPath,
	},
	/// No path exists within the search window
	NotFound {
		/// Entity that queued the request
		subscriber: Entity,
	},
}

impl PathOutcome {
	/// Get the entity that queued the request
	pub fn get_subscriber(&self) -> Entity {
		match self {
			PathOutcome::Found { subscriber, .. } => *subscriber,
			PathOutcome::NotFound { subscriber } => *subscriber,
		}
	}
}

/// Bookkeeping of a registered movable, written and read only by the [PathManager]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MovementTag {
	/// Position the marks were made at
	position: Vec2,
	/// Cells whose dynamic counter was incremented
	marks: Vec<GridCell>,
}

impl MovementTag {
	/// Get the position the marks were made at
	pub fn get_position(&self) -> Vec2 {
		self.position
	}
	/// Get the marked cells
	pub fn get_marks(&self) -> &[GridCell] {
		&self.marks
	}
}

/// A registered dynamic obstacle
#[derive(Clone, Debug)]
struct Movable {
	/// Footprint
	brush: Arc<PathBrush>,
	/// Does the movable path through other movables
	ignore_dynamic_obstacles: bool,
	/// Current marks
	tag: MovementTag,
}

/// Navigation grids, dynamic obstacles and the queue of path requests
#[derive(Component)]
pub struct PathManager {
	/// Tunables
	config: PathfindingConfig,
	/// Detailed grid used by queued searches and placement tests
	grid: NavGrid,
	/// Low detail grid used by immediate queries
	coarse_grid: NavGrid,
	/// Engine shared by queued searches
	search: AStarSearch,
	/// Engine used by immediate queries
	coarse_search: AStarSearch,
	/// What the shared engine is working on
	in_flight: InFlightSearch,
	/// Registered dynamic obstacles
	movables: BTreeMap<Entity, Movable>,
	/// Static footprints registered by entity
	static_obstacles: BTreeMap<Entity, Vec<GridCell>>,
	/// Queued requests in arrival order
	pending: Vec<PathRequest>,
	/// Outcomes waiting to be collected
	outcomes: Vec<PathOutcome>,
}

impl PathManager {
	/// Create a new instance of [PathManager] building a fine and a coarse
	/// [NavGrid] over the `landscape`. Panics if the configuration is invalid
	pub fn new(landscape: &impl Landscape, config: PathfindingConfig) -> Self {
		config.validate();
		let grid = NavGrid::new(landscape, config.get_fine_resolution());
		let coarse_grid = NavGrid::new(landscape, config.get_coarse_resolution());
		let search = AStarSearch::new(grid.node_count());
		let coarse_search = AStarSearch::new(coarse_grid.node_count());
		PathManager {
			config,
			grid,
			coarse_grid,
			search,
			coarse_search,
			in_flight: InFlightSearch::Idle,
			movables: BTreeMap::new(),
			static_obstacles: BTreeMap::new(),
			pending: Vec::new(),
			outcomes: Vec::new(),
		}
	}
	/// Get the configuration
	pub fn get_config(&self) -> &PathfindingConfig {
		&self.config
	}
	/// Get the fine grid
	pub fn get_grid(&self) -> &NavGrid {
		&self.grid
	}
	/// Get the fine grid mutably, for example to seed extra static obstructions
	pub fn get_grid_mut(&mut self) -> &mut NavGrid {
		&mut self.grid
	}
	/// Get the coarse grid
	pub fn get_coarse_grid(&self) -> &NavGrid {
		&self.coarse_grid
	}
	/// Get what the shared engine is working on
	pub fn get_in_flight(&self) -> InFlightSearch {
		self.in_flight
	}
	/// Get the queued requests in arrival order
	pub fn get_pending(&self) -> &[PathRequest] {
		&self.pending
	}
	/// Is a request from `subscriber` queued
	pub fn is_pending(&self, subscriber: Entity) -> bool {
		self.pending.iter().any(|r| r.subscriber == subscriber)
	}
	/// Static footprints registered by entity
	pub(crate) fn get_static_obstacles_mut(&mut self) -> &mut BTreeMap<Entity, Vec<GridCell>> {
		&mut self.static_obstacles
	}
	/// Get the cells marked for a static obstacle
	pub fn get_static_obstacle(&self, entity: Entity) -> Option<&[GridCell]> {
		self.static_obstacles.get(&entity).map(|cells| cells.as_slice())
	}
	/// Collect every outcome produced since the last call
	pub fn take_outcomes(&mut self) -> Vec<PathOutcome> {
		std::mem::take(&mut self.outcomes)
	}
	/// Register a movable as a dynamic obstacle at `position`. Registering an
	/// entity again replaces its footprint
	pub fn add_movable(
		&mut self,
		entity: Entity,
		position: Vec2,
		brush: Arc<PathBrush>,
		ignore_dynamic_obstacles: bool,
	) {
		self.remove_movable(entity);
		let marks = self.grid.cells_in_brush(position, Some(&*brush));
		for cell in marks.iter() {
			self.grid.mark_dynamic(*cell);
		}
		trace!("Registered movable {:?} covering {} cells", entity, marks.len());
		self.movables.insert(
			entity,
			Movable {
				brush,
				ignore_dynamic_obstacles,
				tag: MovementTag { position, marks },
			},
		);
	}
	/// Forget a movable and lift its marks, returns `false` if it was not
	/// registered. A paused search using its footprint is dropped
	pub fn remove_movable(&mut self, entity: Entity) -> bool {
		if let InFlightSearch::Active(key) = self.in_flight {
			if key.obstacle == entity {
				self.search.abandon();
				self.in_flight = InFlightSearch::Idle;
			}
		}
		self.unmark_movable(entity);
		self.movables.remove(&entity).is_some()
	}
	/// Is `entity` registered as a movable
	pub fn is_movable(&self, entity: Entity) -> bool {
		self.movables.contains_key(&entity)
	}
	/// Get the bookkeeping of a movable
	pub fn get_movement_tag(&self, entity: Entity) -> Option<&MovementTag> {
		self.movables.get(&entity).map(|m| &m.tag)
	}
	/// Get the footprint of a movable
	pub fn get_movable_brush(&self, entity: Entity) -> Option<Arc<PathBrush>> {
		self.movables.get(&entity).map(|m| m.brush.clone())
	}
	/// Move the marks of a movable to `position`, returns `false` if it was
	/// not registered
	pub fn update_movable(&mut self, entity: Entity, position: Vec2) -> bool {
		if !self.unmark_movable(entity) {
			return false;
		}
		let Some(movable) = self.movables.get_mut(&entity) else {
			return false;
		};
		movable.tag.marks = self.grid.cells_in_brush(position, Some(&*movable.brush));
		movable.tag.position = position;
		for cell in movable.tag.marks.iter() {
			self.grid.mark_dynamic(*cell);
		}
		true
	}
	/// Move the marks of a movable only if `position` differs from the
	/// position they were made at, returns `true` if the marks moved
	pub fn sync_movable(&mut self, entity: Entity, position: Vec2) -> bool {
		match self.movables.get(&entity) {
			Some(movable) if movable.tag.position != position => {
				self.update_movable(entity, position)
			}
			_ => false,
		}
	}
	/// Lift the marks of a movable, returns `false` if it is not registered
	pub(crate) fn unmark_movable(&mut self, entity: Entity) -> bool {
		match self.movables.get(&entity) {
			Some(movable) => {
				for cell in movable.tag.marks.iter() {
					self.grid.unmark_dynamic(*cell);
				}
				true
			}
			None => false,
		}
	}
	/// Restore the marks of a movable, returns `false` if it is not registered
	pub(crate) fn mark_movable(&mut self, entity: Entity) -> bool {
		match self.movables.get(&entity) {
			Some(movable) => {
				for cell in movable.tag.marks.iter() {
					self.grid.mark_dynamic(*cell);
				}
				true
			}
			None => false,
		}
	}
	/// Queue a search for a path from `start` to `end` using the footprint of
	/// the movable `obstacle`. A queued request from the same `subscriber` is
	/// replaced in place. A start or end outside of the grid is reported as
	/// [PathOutcome::NotFound] straight away. Panics if `obstacle` is not a
	/// registered movable
	pub fn query_path(
		&mut self,
		subscriber: Entity,
		start: Vec2,
		end: Vec2,
		priority: f32,
		obstacle: Entity,
	) {
		let Some(movable) = self.movables.get(&obstacle) else {
			panic!(
				"Path requested with {:?} as the obstacle but it is not a registered movable",
				obstacle
			);
		};
		let brush = movable.brush.clone();
		let start_cell = self.grid.position_to_grid(start, Some(&*brush));
		let end_cell = self.grid.position_to_grid(end, Some(&*brush));
		if !self.grid.is_in_grid(start_cell) || !self.grid.is_in_grid(end_cell) {
			warn!(
				"Path request from {:?} between {} and {} leaves the grid",
				subscriber, start, end
			);
			self.cancel_query(subscriber);
			self.outcomes.push(PathOutcome::NotFound { subscriber });
			return;
		}
		let request = PathRequest {
			subscriber,
			obstacle,
			start: self.grid.grid_to_index(start_cell),
			end: self.grid.grid_to_index(end_cell),
			destination: end,
			priority,
			boundary: GridBoundary::around(
				start_cell,
				end_cell,
				self.config.get_search_area_size(),
				self.config.get_search_area_start_factor(),
			),
		};
		match self.pending.iter_mut().find(|r| r.subscriber == subscriber) {
			Some(existing) => *existing = request,
			None => self.pending.push(request),
		}
	}
	/// Drop the queued request of `subscriber`, returns `false` if there was none
	pub fn cancel_query(&mut self, subscriber: Entity) -> bool {
		if let InFlightSearch::Active(key) = self.in_flight {
			if key.owner == subscriber {
				self.search.abandon();
				self.in_flight = InFlightSearch::Idle;
			}
		}
		let before = self.pending.len();
		self.pending.retain(|r| r.subscriber != subscriber);
		before != self.pending.len()
	}
	/// Position in the queue of the most urgent request, the earliest wins a tie
	fn select_next(&self) -> Option<usize> {
		let mut best: Option<usize> = None;
		for (i, request) in self.pending.iter().enumerate() {
			match best {
				Some(b) if self.pending[b].priority <= request.priority => {}
				_ => best = Some(i),
			}
		}
		best
	}
	/// Spend up to the configured number of node expansions on queued
	/// requests, most urgent first. Finished requests leave the queue and
	/// their [PathOutcome] is added to the outbox. Returns the number of node
	/// expansions used
	pub fn update(&mut self) -> usize {
		let budget = self.config.get_max_search_steps_per_update();
		let mut total = 0;
		while total < budget {
			let Some(index) = self.select_next() else {
				break;
			};
			let request = self.pending[index];
			let Some(movable) = self.movables.get(&request.obstacle) else {
				warn!(
					"Path request from {:?} dropped, obstacle {:?} is no longer registered",
					request.subscriber, request.obstacle
				);
				self.cancel_query(request.subscriber);
				self.outcomes.push(PathOutcome::NotFound {
					subscriber: request.subscriber,
				});
				continue;
			};
			let brush = movable.brush.clone();
			let ignore_dynamic_obstacles = movable.ignore_dynamic_obstacles;
			self.grid.set_boundary(Some(request.boundary));
			self.grid.set_ignore_dynamic_obstacles(ignore_dynamic_obstacles);
			self.grid.set_brush(Some(brush.clone()));
			let key = SearchKey {
				owner: request.subscriber,
				obstacle: request.obstacle,
				start: request.start,
				end: request.end,
			};
			if self.in_flight != InFlightSearch::Active(key) {
				self.search.abandon();
				self.in_flight = InFlightSearch::Active(key);
			}
			self.unmark_movable(request.obstacle);
			let status = self
				.search
				.search(&self.grid, request.start, request.end, budget - total);
			total += self.search.steps_used();
			match status {
				SearchStatus::InProgress => {}
				SearchStatus::Found => {
					self.grid.set_boundary(None);
					let mut path =
						GraphPath::from_nodes(&self.search.path(), &self.grid, Some(&*brush), true);
					path.push(request.destination);
					let grid = &self.grid;
					let sampling = self.config.get_line_of_sight();
					let include_dynamic = !ignore_dynamic_obstacles;
					path.smooth(|a, b| {
						has_line_of_sight(grid, a, b, Some(&*brush), include_dynamic, sampling)
					});
					debug!(
						"Path found for {:?} with {} waypoints",
						request.subscriber,
						path.len()
					);
					self.pending.remove(index);
					self.in_flight = InFlightSearch::Idle;
					self.outcomes.push(PathOutcome::Found {
						subscriber: request.subscriber,
						path,
					});
				}
				SearchStatus::NotFound => {
					debug!("No path found for {:?}", request.subscriber);
					self.pending.remove(index);
					self.in_flight = InFlightSearch::Idle;
					self.outcomes.push(PathOutcome::NotFound {
						subscriber: request.subscriber,
					});
				}
			}
			self.mark_movable(request.obstacle);
		}
		self.grid.set_boundary(None);
		if total > 0 {
			trace!(
				"Path search used {} of {} steps, {} requests queued",
				total,
				budget,
				self.pending.len()
			);
		}
		total
	}
	/// Search the coarse grid for a path from `start` to `end` straight away.
	/// If the cell under `end` is obstructed the nearest free cell is searched
	/// for instead. The exact `end` is appended to the path. [None] if either
	/// position cannot be reached
	pub fn query_path_immediate(&mut self, start: Vec2, end: Vec2) -> Option<GraphPath> {
		let start_index = self.coarse_grid.position_to_index(start, None)?;
		let mut end_cell = self.coarse_grid.position_to_grid(end, None);
		if self.coarse_grid.is_grid_obstructed(end_cell, true) {
			let limit = self.config.get_coarse_spiral_limit();
			let grid = &self.coarse_grid;
			end_cell = cells_inner_out(end_cell, limit as i32)
				.take(limit)
				.find(|cell| grid.is_in_grid(*cell) && !grid.is_grid_obstructed(*cell, true))?;
		}
		let end_index = self.coarse_grid.grid_to_index(end_cell);
		if !self
			.coarse_search
			.search_to_completion(&self.coarse_grid, start_index, end_index)
		{
			return None;
		}
		let mut path =
			GraphPath::from_nodes(&self.coarse_search.path(), &self.coarse_grid, None, true);
		if !path.is_empty() {
			path.push(end);
		}
		Some(path)
	}
}
