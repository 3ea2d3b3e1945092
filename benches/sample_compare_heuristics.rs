use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use waypath::algorithms::astar::AStarSearch;
use waypath::algorithms::astar::DEFAULT_DEPTH_BUDGET;
use waypath::graph::Euclidean;
use waypath::graph::Graph;
use waypath::graph::Heuristic;
use waypath::graph::NodeId;
use waypath::graph::SquaredDistance;
use waypath::graphs::grid::Connectivity;
use waypath::graphs::grid::Grid;
use waypath::graphs::grid::GridCell;
use waypath::graphs::grid::GridPosition;

const SIDE: usize = 256;
const WALL_PROBABILITY: f64 = 0.2;

/// Expanded nodes until the destination is reached.
fn expansions<H: Heuristic<GridPosition>>(grid: &Grid, origin: NodeId, destination: NodeId) -> usize {
    let mut search =
        AStarSearch::<Grid, H>::new(grid, origin, destination, grid.node_count()).unwrap();
    search.run(DEFAULT_DEPTH_BUDGET);
    search.expanded()
}

fn compare_heuristics(c: &mut Criterion) {
    let mut group = c.benchmark_group("Grid heuristics");

    for connectivity in [Connectivity::Four, Connectivity::Eight] {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut grid = Grid::new(SIDE, SIDE).unwrap().with_connectivity(connectivity);
        for y in 0..SIDE {
            for x in 0..SIDE {
                if rng.random_bool(WALL_PROBABILITY) {
                    grid.set(x, y, GridCell::Wall);
                }
            }
        }
        let (Some(origin), Some(destination)) =
            (grid.random_open_cell(&mut rng), grid.random_open_cell(&mut rng))
        else {
            log::warn!("Skipping {connectivity:?} as it has no open cells");
            continue;
        };

        println!(
            "{connectivity:?}: squared expands {}, euclidean expands {}",
            expansions::<SquaredDistance>(&grid, origin, destination),
            expansions::<Euclidean>(&grid, origin, destination),
        );

        let name = format!("{connectivity:?}");
        group.bench_with_input(BenchmarkId::new("SquaredDistance", &name), &grid, |b, g| {
            b.iter(|| expansions::<SquaredDistance>(g, origin, destination))
        });
        group.bench_with_input(BenchmarkId::new("Euclidean", &name), &grid, |b, g| {
            b.iter(|| expansions::<Euclidean>(g, origin, destination))
        });
    }
    group.finish();
}

criterion_group!(benches, compare_heuristics);
criterion_main!(benches);
