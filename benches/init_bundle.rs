//! Measure initialising the PathGridBundle - this means the fine and coarse
//! NavGrids are seeded from the landscape
//!

use bevy::prelude::*;
use bevy_pathgrid_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Create a landscape with a scattering of occluded terrain
fn prepare_landscape() -> OcclusionMap {
	let mut map = OcclusionMap::new(MapDimensions::new(Vec2::new(1024.0, 1024.0), UVec2::new(256, 256)));
	for column in (0..256).step_by(7) {
		for row in (0..256).step_by(5) {
			map.set_occluded(column, row, true);
		}
	}
	map
}

/// Create the bundle
fn init_bundle(map: &OcclusionMap, config: PathfindingConfig) {
	let _ = PathGridBundle::new(map, config);
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("data_initialisation");
	group.significance_level(0.1).sample_size(10);
	let map = prepare_landscape();
	group.bench_function("init_bundle", |b| {
		b.iter(|| init_bundle(black_box(&map), black_box(PathfindingConfig::default())))
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
