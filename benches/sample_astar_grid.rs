use std::time::Duration;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use hrsw::Stopwatch;
use human_duration::human_duration;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use waypath::algorithms::astar::PathCallbacks;
use waypath::algorithms::astar::SearchConfig;
use waypath::algorithms::astar::find_path;
use waypath::graph::Graph;
use waypath::graph::NodeId;
use waypath::graphs::grid::Grid;
use waypath::graphs::grid::GridCell;

const SIDES: [usize; 3] = [64, 256, 1024];
const WALL_PROBABILITY: f64 = 0.25;
/// Maximum time willing to wait for a single benchmark instance.
/// Experiments are carried out at least 5s and at least 100 times, so running a
/// 1s instance takes 1m40s.
const MAX_INSTANCE_TIME: Duration = Duration::from_secs(1);

fn random_grid(side: usize, rng: &mut ChaCha8Rng) -> Grid {
    let mut grid = Grid::new(side, side).unwrap();
    for y in 0..side {
        for x in 0..side {
            if rng.random_bool(WALL_PROBABILITY) {
                grid.set(x, y, GridCell::Wall);
            }
        }
    }
    grid
}

fn search(grid: &Grid, origin: NodeId, destination: NodeId, config: &SearchConfig) -> usize {
    let mut path = Vec::new();
    let _found = find_path(
        grid,
        origin,
        destination,
        &mut path,
        config,
        PathCallbacks::new(),
    )
    .unwrap();
    path.len()
}

fn sample_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Grid A*");

    for side in SIDES {
        for i in 0..3u64 {
            let instance_name = format!("random[{side}x{side}]:{i}");
            let mut rng = ChaCha8Rng::seed_from_u64(i);
            let grid = random_grid(side, &mut rng);
            let (Some(origin), Some(destination)) = (
                grid.random_open_cell(&mut rng),
                grid.random_open_cell(&mut rng),
            ) else {
                log::warn!("Skipping {instance_name} as it has no open cells");
                continue;
            };
            let config = SearchConfig::default().with_expected_graph_size(grid.node_count());

            let mut stopwatch = Stopwatch::new_started();
            let nodes = search(&grid, origin, destination, &config);
            stopwatch.stop();
            let elapsed = stopwatch.elapsed();
            println!("A* path: {nodes} nodes in {}", human_duration(&elapsed));
            if elapsed > MAX_INSTANCE_TIME {
                log::warn!(
                    "Skipping {instance_name} as it takes too long with A* ({})",
                    human_duration(&elapsed)
                );
                continue;
            }

            group.bench_with_input(
                BenchmarkId::new("A*", &instance_name),
                &(origin, destination),
                |b, (o, d)| b.iter(|| search(&grid, *o, *d, &config)),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, sample_search);
criterion_main!(benches);
