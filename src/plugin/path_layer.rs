//! Events for asking for paths and the systems which drive the searches of
//! each [PathManager]
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Ask for a path from `start` to `destination`. At most one request per
/// subscriber is queued, sending another replaces it
#[derive(Event, Clone, Copy, Debug)]
pub struct EventPathRequest {
	/// Entity notified with [EventPathFound] or [EventPathNotFound]
	subscriber: Entity,
	/// Registered [PathAgent] whose footprint is moved along the path
	obstacle: Entity,
	/// World position of the start
	start: Vec2,
	/// World position to reach
	destination: Vec2,
	/// Lower values are searched first
	priority: f32,
}

impl EventPathRequest {
	/// Create a new instance of [EventPathRequest] where the `subscriber` is
	/// also the agent travelling along the path
	pub fn new(subscriber: Entity, start: Vec2, destination: Vec2, priority: f32) -> Self {
		EventPathRequest {
			subscriber,
			obstacle: subscriber,
			start,
			destination,
			priority,
		}
	}
	/// Use the footprint of another agent, e.g a squad leader asking on
	/// behalf of its unit
	pub fn with_obstacle(mut self, obstacle: Entity) -> Self {
		self.obstacle = obstacle;
		self
	}
	/// Get the subscriber
	pub fn get_subscriber(&self) -> Entity {
		self.subscriber
	}
	/// Get the agent travelling along the path
	pub fn get_obstacle(&self) -> Entity {
		self.obstacle
	}
	/// Get the start
	pub fn get_start(&self) -> Vec2 {
		self.start
	}
	/// Get the destination
	pub fn get_destination(&self) -> Vec2 {
		self.destination
	}
	/// Get the priority
	pub fn get_priority(&self) -> f32 {
		self.priority
	}
}

/// Drop the queued request of a subscriber
#[derive(Event, Clone, Copy, Debug)]
pub struct EventCancelPathRequest(Entity);

impl EventCancelPathRequest {
	/// Create a new instance of [EventCancelPathRequest]
	pub fn new(subscriber: Entity) -> Self {
		EventCancelPathRequest(subscriber)
	}
	/// Get the subscriber
	pub fn get_subscriber(&self) -> Entity {
		self.0
	}
}

/// A path was found for a subscriber
#[derive(Event, Clone, Debug)]
pub struct EventPathFound {
	/// Entity that asked
	subscriber: Entity,
	/// Smoothed path ending on the requested destination
	path: GraphPath,
}

impl EventPathFound {
	/// Get the subscriber
	pub fn get_subscriber(&self) -> Entity {
		self.subscriber
	}
	/// Get the path
	pub fn get_path(&self) -> &GraphPath {
		&self.path
	}
}

/// No path could be found for a subscriber
#[derive(Event, Clone, Copy, Debug)]
pub struct EventPathNotFound {
	/// Entity that asked
	subscriber: Entity,
}

impl EventPathNotFound {
	/// Get the subscriber
	pub fn get_subscriber(&self) -> Entity {
		self.subscriber
	}
}

/// Read [EventCancelPathRequest] and drop the matching queued requests
#[cfg(not(tarpaulin_include))]
pub fn event_cancel_path_queue(
	mut events: EventReader<EventCancelPathRequest>,
	mut q_manager: Query<&mut PathManager>,
) {
	for event in events.read() {
		for mut manager in q_manager.iter_mut() {
			if manager.cancel_query(event.get_subscriber()) {
				trace!("Cancelled path request of {:?}", event.get_subscriber());
			}
		}
	}
}

/// Read [EventPathRequest] and queue them. Requests naming an entity which
/// is not a registered [PathAgent] are answered with [EventPathNotFound]
#[cfg(not(tarpaulin_include))]
pub fn event_insert_path_queue(
	mut events: EventReader<EventPathRequest>,
	mut q_manager: Query<&mut PathManager>,
	mut event_not_found: EventWriter<EventPathNotFound>,
) {
	for event in events.read() {
		for mut manager in q_manager.iter_mut() {
			if !manager.is_movable(event.get_obstacle()) {
				error!(
					"Path request from {:?} uses {:?} which is not a registered PathAgent",
					event.get_subscriber(),
					event.get_obstacle()
				);
				event_not_found.write(EventPathNotFound {
					subscriber: event.get_subscriber(),
				});
				continue;
			}
			manager.query_path(
				event.get_subscriber(),
				event.get_start(),
				event.get_destination(),
				event.get_priority(),
				event.get_obstacle(),
			);
		}
	}
}

/// Spend the search budget of each [PathManager] and announce the outcomes
#[cfg(not(tarpaulin_include))]
pub fn process_path_queue(
	mut q_manager: Query<&mut PathManager>,
	mut event_found: EventWriter<EventPathFound>,
	mut event_not_found: EventWriter<EventPathNotFound>,
) {
	for mut manager in q_manager.iter_mut() {
		manager.update();
		for outcome in manager.take_outcomes() {
			match outcome {
				PathOutcome::Found { subscriber, path } => {
					event_found.write(EventPathFound { subscriber, path });
				}
				PathOutcome::NotFound { subscriber } => {
					event_not_found.write(EventPathNotFound { subscriber });
				}
			}
		}
	}
}
