//! Measure a complete A* search across an open grid from the top-left corner
//! to the bottom-right corner
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

/// Search corner to corner
fn search_open(grid: &NavGrid, search: &mut AStarSearch) {
	let start = grid.grid_to_index(GridCell::new(0, 0));
	let end = grid.grid_to_index(GridCell::new(255, 255));
	let _ = search.search_to_completion(grid, start, end);
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let grid = prepare_grid();
	let mut search = AStarSearch::new(grid.node_count());
	group.bench_function("search_open", |b| {
		b.iter(|| search_open(black_box(&grid), black_box(&mut search)))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
