//! Measure building and smoothing a long zig-zagging path
//!
//! Grid is 128 cells by 128 cells
//!

use bevy::prelude::*;
use bevy_pathgrid_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Search a path across a grid with scattered pillars and keep the nodes
fn prepare_path() -> (NavGrid, Vec<usize>) {
	let map = OcclusionMap::new(MapDimensions::new(Vec2::new(128.0, 128.0), UVec2::new(128, 128)));
	let mut grid = NavGrid::new(&map, 1.0);
	for column in (3..128).step_by(6) {
		for row in (3..128).step_by(6) {
			grid.mark(GridCell::new(column, row));
		}
	}
	let mut search = AStarSearch::new(grid.node_count());
	let start = grid.grid_to_index(GridCell::new(0, 0));
	let end = grid.grid_to_index(GridCell::new(127, 100));
	let _ = search.search_to_completion(&grid, start, end);
	let nodes = search.path();
	(grid, nodes)
}

/// Build a simplified path and smooth it
fn smooth_path(grid: &NavGrid, nodes: &[usize]) {
	let mut path = GraphPath::from_nodes(nodes, grid, None, true);
	let sampling = LineOfSightSampling::default();
	path.smooth(|a, b| has_line_of_sight(grid, a, b, None, true, sampling));
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let (grid, nodes) = prepare_path();
	group.bench_function("smooth_path", |b| {
		b.iter(|| smooth_path(black_box(&grid), black_box(&nodes)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
