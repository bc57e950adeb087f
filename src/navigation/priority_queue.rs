//! An indexed binary min-heap of graph nodes.
//!
//! Alongside the heap a slot per node records whether the node has never been
//! seen, is waiting in the heap (and where) or has already been popped. This
//! gives `O(1)` membership tests and allows the priority of a queued node to
//! be lowered in place, which is what A* needs when it finds a cheaper way to
//! reach a node it has already discovered.
//!
//! Nodes with equal priority are popped in the order they were first added.
//!

/// Membership of a node in an [IndexedPriorityQueue]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
	/// Never added since the last clear
	Unseen,
	/// Waiting in the heap at the given heap position
	Open(usize),
	/// Added and then popped
	Closed,
}

/// A queued node
#[derive(Clone, Copy, Debug)]
struct HeapEntry {
	/// Node index
	node: usize,
	/// Priority, smallest is popped first
	priority: f32,
	/// Order of insertion, breaks ties between equal priorities
	sequence: u64,
}

impl HeapEntry {
	/// Should `self` be popped before `other`
	fn precedes(&self, other: &HeapEntry) -> bool {
		self.priority < other.priority
			|| (self.priority == other.priority && self.sequence < other.sequence)
	}
}

/// Binary min-heap over node indices in `0..capacity`
#[derive(Clone, Debug, Default)]
pub struct IndexedPriorityQueue {
	/// Heap ordered by [HeapEntry::precedes]
	heap: Vec<HeapEntry>,
	/// Per node membership
	states: Vec<NodeState>,
	/// Next insertion sequence number
	next_sequence: u64,
}

impl IndexedPriorityQueue {
	/// Create a new instance of [IndexedPriorityQueue] able to hold nodes `0..capacity`
	pub fn new(capacity: usize) -> Self {
		IndexedPriorityQueue {
			heap: Vec::with_capacity(capacity),
			states: vec![NodeState::Unseen; capacity],
			next_sequence: 0,
		}
	}
	/// Empty the queue and forget every node, growing it to hold `capacity` nodes if needed
	pub fn clear(&mut self, capacity: usize) {
		self.heap.clear();
		if self.states.len() < capacity {
			self.states.resize(capacity, NodeState::Unseen);
		}
		self.states.fill(NodeState::Unseen);
		self.next_sequence = 0;
	}
	/// Number of nodes the queue can index
	pub fn get_capacity(&self) -> usize {
		self.states.len()
	}
	/// Number of queued nodes
	pub fn len(&self) -> usize {
		self.heap.len()
	}
	/// Is nothing queued
	pub fn is_empty(&self) -> bool {
		self.heap.is_empty()
	}
	/// Membership of `node`
	pub fn get_state(&self, node: usize) -> NodeState {
		self.states[node]
	}
	/// The node that would be popped next
	pub fn peek(&self) -> Option<usize> {
		self.heap.first().map(|entry| entry.node)
	}
	/// Queue an unseen node. Panics if the node has already been added
	pub fn push(&mut self, node: usize, priority: f32) {
		if self.states[node] != NodeState::Unseen {
			panic!("Node {} has already been added to the queue", node);
		}
		let entry = HeapEntry {
			node,
			priority,
			sequence: self.next_sequence,
		};
		self.next_sequence += 1;
		self.heap.push(entry);
		let position = self.heap.len() - 1;
		self.states[node] = NodeState::Open(position);
		self.sift_up(position);
	}
	/// Remove and return the node with the smallest priority, it becomes [NodeState::Closed]
	pub fn pop(&mut self) -> Option<usize> {
		if self.heap.is_empty() {
			return None;
		}
		let last = self.heap.len() - 1;
		self.swap(0, last);
		let top = self.heap.pop()?;
		self.states[top.node] = NodeState::Closed;
		if !self.heap.is_empty() {
			self.sift_down(0);
		}
		Some(top.node)
	}
	/// Lower the priority of an open node. Panics if the node is not open or
	/// if the new priority is larger than the current one
	pub fn decrease_priority(&mut self, node: usize, priority: f32) {
		let NodeState::Open(position) = self.states[node] else {
			panic!("Node {} is not waiting in the queue", node);
		};
		if priority > self.heap[position].priority {
			panic!(
				"Node {} priority can only decrease, {} is larger than {}",
				node, priority, self.heap[position].priority
			);
		}
		self.heap[position].priority = priority;
		self.sift_up(position);
	}
	/// Swap two heap positions and keep the node states in step
	fn swap(&mut self, a: usize, b: usize) {
		self.heap.swap(a, b);
		self.states[self.heap[a].node] = NodeState::Open(a);
		self.states[self.heap[b].node] = NodeState::Open(b);
	}
	/// Move an entry towards the root until its parent precedes it
	fn sift_up(&mut self, mut position: usize) {
		while position > 0 {
			let parent = (position - 1) / 2;
			if self.heap[position].precedes(&self.heap[parent]) {
				self.swap(position, parent);
				position = parent;
			} else {
				break;
			}
		}
	}
	/// Move an entry towards the leaves until it precedes both children
	fn sift_down(&mut self, mut position: usize) {
		let len = self.heap.len();
		loop {
			let left = 2 * position + 1;
			let right = left + 1;
			let mut smallest = position;
			if left < len && self.heap[left].precedes(&self.heap[smallest]) {
				smallest = left;
			}
			if right < len && self.heap[right].precedes(&self.heap[smallest]) {
				smallest = right;
			}
			if smallest == position {
				break;
			}
			self.swap(position, smallest);
			position = smallest;
		}
	}
}
