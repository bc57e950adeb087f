//! Measure an A* search across an open grid which is paused every 100 node
//! expansions, showing the overhead of resuming a search
//!
//! Grid is 256 cells by 256 cells
//!

use bevy::prelude::*;
use bevy_pathgrid_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Create an unobstructed grid
fn prepare_grid() -> NavGrid {
	let map = OcclusionMap::new(MapDimensions::new(Vec2::new(256.0, 256.0), UVec2::new(256, 256)));
	NavGrid::new(&map, 1.0)
}

/// Search corner to corner in slices
fn search_resumed(grid: &NavGrid, search: &mut AStarSearch, step_budget: usize) {
	let start = grid.grid_to_index(GridCell::new(0, 0));
	let end = grid.grid_to_index(GridCell::new(255, 255));
	search.abandon();
	while search.search(grid, start, end, step_budget) == SearchStatus::InProgress {}
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let grid = prepare_grid();
	let mut search = AStarSearch::new(grid.node_count());
	group.bench_function("search_resumed", |b| {
		b.iter(|| search_resumed(black_box(&grid), black_box(&mut search), black_box(100)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
