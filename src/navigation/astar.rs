//! A* search which can be paused after a number of node expansions and
//! resumed on a later tick.
//!
//! The engine works over anything implementing [Graph], nodes are plain
//! indices in `0..node_count`. All search state (costs, predecessors and the
//! open/closed sets) lives inside [AStarSearch] so a search started with a
//! small step budget picks up exactly where it left off the next time it is
//! called with the same start and end nodes. Splitting a search across many
//! calls therefore produces the same result as running it in one go.
//!

use crate::prelude::*;

/// Capabilities a search needs from a graph
pub trait Graph {
	/// Number of nodes, valid node indices are `0..node_count`
	fn node_count(&self) -> usize;
	/// Outgoing edges of a node as `(target, cost)` pairs
	fn edges_of(&self, node: usize) -> impl Iterator<Item = (usize, f32)> + '_;
	/// Estimated cost from `from` to `to`, must never overestimate
	fn heuristic(&self, from: usize, to: usize) -> f32;
}

/// Outcome of a call to [AStarSearch::search]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
	/// The end node was reached, [AStarSearch::path] is available
	Found,
	/// Every reachable node was explored without reaching the end node
	NotFound,
	/// The step budget ran out, call again with the same start and end to continue
	InProgress,
}

/// Resumable A* search state
#[derive(Clone, Debug)]
pub struct AStarSearch {
	/// Start node of the current or last search
	start: usize,
	/// End node of the current or last search
	end: usize,
	/// `false` while a search is paused mid-way
	finished: bool,
	/// Cost of the cheapest known route from the start to each node
	cost_so_far: Vec<f32>,
	/// Predecessor of each node along its cheapest known route
	came_from: Vec<Option<usize>>,
	/// Open and closed sets
	queue: IndexedPriorityQueue,
	/// Nodes expanded during the last call to [AStarSearch::search]
	steps_used: usize,
	/// Result of the last finished search
	status: Option<SearchStatus>,
}

impl Default for AStarSearch {
	fn default() -> Self {
		AStarSearch {
			start: 0,
			end: 0,
			finished: true,
			cost_so_far: Vec::new(),
			came_from: Vec::new(),
			queue: IndexedPriorityQueue::default(),
			steps_used: 0,
			status: None,
		}
	}
}

impl AStarSearch {
	/// Create a new instance of [AStarSearch] with room for `node_count` nodes
	pub fn new(node_count: usize) -> Self {
		AStarSearch {
			cost_so_far: vec![0.0; node_count],
			came_from: vec![None; node_count],
			queue: IndexedPriorityQueue::new(node_count),
			..Default::default()
		}
	}
	/// Is the engine free to start a new search
	pub fn is_finished(&self) -> bool {
		self.finished
	}
	/// Nodes expanded during the last call to [AStarSearch::search]
	pub fn steps_used(&self) -> usize {
		self.steps_used
	}
	/// Discard a paused search, the next call to [AStarSearch::search] starts afresh
	pub fn abandon(&mut self) {
		self.finished = true;
		self.status = None;
	}
	/// Size the state for `node_count` nodes and clear it
	fn reset(&mut self, node_count: usize) {
		if self.cost_so_far.len() < node_count {
			self.cost_so_far.resize(node_count, 0.0);
			self.came_from.resize(node_count, None);
		}
		self.cost_so_far.fill(0.0);
		self.came_from.fill(None);
		self.queue.clear(node_count);
	}
	/// Search from `start` to `end` expanding at most `step_budget` nodes
	/// (and always at least one). If the engine is finished a new search is
	/// started, otherwise the paused search continues and must have been
	/// started with the same `start` and `end`, anything else panics, use
	/// [AStarSearch::abandon] to switch searches. Panics if either node is
	/// outside of the graph
	pub fn search<G: Graph>(
		&mut self,
		graph: &G,
		start: usize,
		end: usize,
		step_budget: usize,
	) -> SearchStatus {
		let node_count = graph.node_count();
		if self.finished {
			if start >= node_count || end >= node_count {
				panic!(
					"Search from {} to {} is outside of a graph of {} nodes",
					start, end, node_count
				);
			}
			self.start = start;
			self.end = end;
			self.finished = false;
			self.status = None;
			self.reset(node_count);
			self.queue.push(start, 0.0);
		} else if self.start != start || self.end != end {
			panic!(
				"Paused search from {} to {} cannot be resumed as a search from {} to {}",
				self.start, self.end, start, end
			);
		}
		self.steps_used = 0;
		let budget = step_budget.max(1);
		while let Some(top) = self.queue.pop() {
			if top == end {
				self.finished = true;
				self.status = Some(SearchStatus::Found);
				return SearchStatus::Found;
			}
			for (to, cost) in graph.edges_of(top) {
				let g = self.cost_so_far[top] + cost;
				match self.queue.get_state(to) {
					NodeState::Unseen => {
						self.came_from[to] = Some(top);
						self.cost_so_far[to] = g;
						let h = graph.heuristic(to, end);
						self.queue.push(to, g + h);
					}
					NodeState::Open(_) if g < self.cost_so_far[to] => {
						self.came_from[to] = Some(top);
						self.cost_so_far[to] = g;
						let h = graph.heuristic(to, end);
						self.queue.decrease_priority(to, g + h);
					}
					_ => {}
				}
			}
			self.steps_used += 1;
			if self.steps_used >= budget {
				return SearchStatus::InProgress;
			}
		}
		self.finished = true;
		self.status = Some(SearchStatus::NotFound);
		SearchStatus::NotFound
	}
	/// Run a search from `start` to `end` without a step budget, returns
	/// `true` if the end node was reached
	pub fn search_to_completion<G: Graph>(&mut self, graph: &G, start: usize, end: usize) -> bool {
		self.abandon();
		self.search(graph, start, end, usize::MAX) == SearchStatus::Found
	}
	/// Nodes of the last found path ordered from the end node back to the
	/// start node, empty unless the last search returned [SearchStatus::Found]
	pub fn path(&self) -> Vec<usize> {
		if self.status != Some(SearchStatus::Found) {
			return Vec::new();
		}
		let mut nodes = vec![self.end];
		let mut current = self.end;
		while current != self.start {
			match self.came_from[current] {
				Some(previous) => {
					nodes.push(previous);
					current = previous;
				}
				None => break,
			}
		}
		nodes
	}
	/// Total cost of the last found path
	pub fn path_cost(&self) -> Option<f32> {
		if self.status == Some(SearchStatus::Found) {
			Some(self.cost_so_far[self.end])
		} else {
			None
		}
	}
}

/// A directed graph stored as adjacency lists. The heuristic is always zero
/// so searching it behaves like Dijkstra's algorithm
#[derive(Clone, Debug, Default)]
pub struct SparseGraph {
	/// Outgoing `(target, cost)` edges of each node
	edges: Vec<Vec<(usize, f32)>>,
}

impl SparseGraph {
	/// Create a new instance of [SparseGraph] of `node_count` unconnected nodes
	pub fn new(node_count: usize) -> Self {
		SparseGraph {
			edges: vec![Vec::new(); node_count],
		}
	}
	/// Add a directed edge. Panics if either node is outside of the graph
	pub fn add_edge(&mut self, from: usize, to: usize, cost: f32) {
		if from >= self.edges.len() || to >= self.edges.len() {
			panic!(
				"Edge {} -> {} is outside of a graph of {} nodes",
				from,
				to,
				self.edges.len()
			);
		}
		self.edges[from].push((to, cost));
	}
	/// Add an edge in both directions
	pub fn add_edge_pair(&mut self, a: usize, b: usize, cost: f32) {
		self.add_edge(a, b, cost);
		self.add_edge(b, a, cost);
	}
}

impl Graph for SparseGraph {
	fn node_count(&self) -> usize {
		self.edges.len()
	}
	fn edges_of(&self, node: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
		self.edges[node].iter().copied()
	}
	fn heuristic(&self, _from: usize, _to: usize) -> f32 {
		0.0
	}
}
