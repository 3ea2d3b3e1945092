use std::cell::RefCell;
use std::path::PathBuf;

use anstream::println;
use clap::Parser;
use clap::ValueEnum;
use indoc::indoc;
use owo_colors::OwoColorize;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use tracing_subscriber::EnvFilter;

use waypath::algorithms::astar::AStarSearch;
use waypath::algorithms::astar::DEFAULT_DEPTH_BUDGET;
use waypath::algorithms::astar::PathCallbacks;
use waypath::algorithms::astar::SearchConfig;
use waypath::algorithms::astar::astar;
use waypath::error::SearchError;
use waypath::graph::Euclidean;
use waypath::graph::Graph;
use waypath::graph::Heuristic;
use waypath::graph::NodeId;
use waypath::graph::SquaredDistance;
use waypath::graphs::grid::Connectivity;
use waypath::graphs::grid::Grid;
use waypath::graphs::grid::GridCell;
use waypath::graphs::grid::GridPosition;
use waypath::graphs::grid::GridProblem;
use waypath::register::PathQueue;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Largest grid side that still gets drawn.
const MAX_DRAWN_SIDE: usize = 40;
/// Share of cells turned into walls on random grids.
const RANDOM_WALL_PROBABILITY: f64 = 0.2;

const BUILTIN_MAZE: &str = indoc! {"
    S....#......
    .###.#.####.
    .#...#....#.
    .#.######.#.
    .#......#.#.
    .######.#.#.
    ........#..G
"};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum HeuristicKind {
    /// Squared distance to the destination. Greedy, fast.
    Squared,
    /// Straight-line distance. Shortest paths on grids.
    Euclidean,
}

/// Finds paths on text mazes with A*.
///
/// Mazes use `.` for open cells, `#` for walls, and `S`/`G` for the origin and
/// destination.
#[derive(Parser, Debug)]
#[clap(long_version = waypath::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Maze files. The built-in maze and random grids are used without them.
    #[arg()]
    pub mazes: Vec<PathBuf>,

    /// Maximum number of node expansions per search.
    #[arg(long, env = "WAYPATH_DEPTH", default_value_t = DEFAULT_DEPTH_BUDGET)]
    pub depth: u32,

    #[arg(long, value_enum, env = "WAYPATH_HEURISTIC", default_value_t = HeuristicKind::Squared)]
    heuristic: HeuristicKind,

    /// Log how long searches take.
    #[arg(long, env = "WAYPATH_DIAGNOSTICS")]
    pub diagnostics: bool,

    /// Allow diagonal moves.
    #[arg(long)]
    pub diagonal: bool,

    /// Print the memory used by each search.
    #[arg(long)]
    pub stats: bool,

    /// Random origin/destination pairs to solve on a generated grid.
    #[arg(long, default_value_t = 3usize)]
    pub random: usize,
    /// Side of the generated grid.
    #[arg(long, default_value_t = 32usize)]
    pub size: usize,
    #[arg(long, env = "WAYPATH_SEED", default_value_t = 0u64)]
    pub seed: u64,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

impl Args {
    fn config(&self, grid: &Grid) -> SearchConfig {
        SearchConfig::default()
            .with_depth_budget(self.depth)
            .with_expected_graph_size(grid.node_count())
            .with_diagnostics(self.diagnostics)
    }
    fn connectivity(&self) -> Connectivity {
        if self.diagonal {
            Connectivity::Eight
        } else {
            Connectivity::Four
        }
    }
}

/// Solves a single problem, returns the path (or the partial path) found.
fn solve<H: Heuristic<GridPosition>>(
    problem: &GridProblem,
    args: &Args,
) -> std::io::Result<(bool, Vec<NodeId>)> {
    let grid = &problem.grid;
    let config = args.config(grid);

    if args.stats {
        return solve_with_stats::<H>(problem, &config);
    }

    let mut path = vec![];
    let mut partial = vec![];
    let found = astar::<Grid, H>(
        grid,
        problem.origin,
        problem.destination,
        &mut path,
        &config,
        PathCallbacks::new().on_path_failed(|p| partial = p.to_vec()),
    )
    .map_err(std::io::Error::other)?;

    Ok(if found { (true, path) } else { (false, partial) })
}

/// Like [`solve`], printing the memory held by the search once it is done.
fn solve_with_stats<H: Heuristic<GridPosition>>(
    problem: &GridProblem,
    config: &SearchConfig,
) -> std::io::Result<(bool, Vec<NodeId>)> {
    if config.depth_budget == 0 {
        return Err(std::io::Error::other(SearchError::ZeroDepthBudget));
    }

    let mut search = AStarSearch::<Grid, H>::new(
        &problem.grid,
        problem.origin,
        problem.destination,
        config.expected_graph_size,
    )
    .map_err(std::io::Error::other)?;
    let outcome = search.run(config.depth_budget);
    log::debug!("{outcome} after {} expansions", search.expanded());
    search.print_memory_stats()?;

    if outcome.is_found() {
        let mut path = vec![];
        search.append_path(&mut path);
        Ok((true, path))
    } else {
        Ok((false, search.partial_path()))
    }
}

fn report(name: &str, problem: &GridProblem, found: bool, path: &[NodeId]) {
    let grid = &problem.grid;
    let (w, h) = grid.dimensions();
    println!("{} {name} ({w}x{h})", "*".bold());

    let coords: Vec<String> = path
        .iter()
        .map(|n| {
            let (x, y) = grid.coords(*n);
            format!("({x},{y})")
        })
        .collect();
    if found {
        println!(
            "  {} {} nodes: {}",
            "found".green(),
            path.len(),
            coords.join(" ")
        );
    } else {
        println!(
            "  {} closest approach ({} nodes): {}",
            "not found".red(),
            path.len(),
            coords.join(" ")
        );
    }

    if w <= MAX_DRAWN_SIDE && h <= MAX_DRAWN_SIDE {
        draw(problem, path);
    }
}

fn draw(problem: &GridProblem, path: &[NodeId]) {
    let grid = &problem.grid;
    let (w, h) = grid.dimensions();
    for y in 0..h {
        let mut row = String::with_capacity(w);
        for x in 0..w {
            let Some(node) = grid.node(x, y) else {
                continue;
            };
            let ch = if node == problem.origin {
                "S".blue().to_string()
            } else if node == problem.destination {
                "G".green().to_string()
            } else if path.contains(&node) {
                "•".yellow().to_string()
            } else {
                match grid.cell(node) {
                    Some(GridCell::Wall) => "#".dimmed().to_string(),
                    _ => ".".to_string(),
                }
            };
            row.push_str(&ch);
        }
        println!("  {row}");
    }
}

fn solve_and_report(name: &str, problem: &GridProblem, args: &Args) -> std::io::Result<()> {
    let (found, path) = match args.heuristic {
        HeuristicKind::Squared => solve::<SquaredDistance>(problem, args)?,
        HeuristicKind::Euclidean => solve::<Euclidean>(problem, args)?,
    };
    report(name, problem, found, &path);
    Ok(())
}

fn random_grid(args: &Args, rng: &mut ChaCha8Rng) -> std::io::Result<Grid> {
    let mut grid = Grid::new(args.size, args.size)
        .map_err(std::io::Error::other)?
        .with_connectivity(args.connectivity());
    for y in 0..args.size {
        for x in 0..args.size {
            if rng.random_bool(RANDOM_WALL_PROBABILITY) {
                grid.set(x, y, GridCell::Wall);
            }
        }
    }
    Ok(grid)
}

/// Queues random requests on a generated grid and drains them in one batch.
fn solve_random(args: &Args) -> std::io::Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let grid = random_grid(args, &mut rng)?;

    let mut problems = vec![];
    for _ in 0..args.random {
        match (grid.random_open_cell(&mut rng), grid.random_open_cell(&mut rng)) {
            (Some(origin), Some(destination)) => problems.push(GridProblem {
                grid: grid.clone(),
                origin,
                destination,
            }),
            _ => log::warn!("No open cells left on the random grid (seed {})", args.seed),
        }
    }

    let results = RefCell::new(vec![None; problems.len()]);
    let mut queue = PathQueue::new(args.config(&grid));
    for (i, p) in problems.iter().enumerate() {
        let results = &results;
        queue.request_path(
            p.origin,
            p.destination,
            PathCallbacks::new()
                .on_path_found(move |path| results.borrow_mut()[i] = Some((true, path.to_vec())))
                .on_path_failed(move |path| results.borrow_mut()[i] = Some((false, path.to_vec()))),
        );
    }

    let computed = match args.heuristic {
        HeuristicKind::Squared => queue.compute_batch::<Grid, SquaredDistance>(&grid, problems.len()),
        HeuristicKind::Euclidean => queue.compute_batch::<Grid, Euclidean>(&grid, problems.len()),
    }
    .map_err(std::io::Error::other)?;
    log::debug!("Computed {computed} random requests");
    drop(queue);

    for (i, (problem, result)) in problems.iter().zip(results.into_inner()).enumerate() {
        if let Some((found, path)) = result {
            report(&format!("random #{i} (seed {})", args.seed), problem, found, &path);
        }
    }
    Ok(())
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    args.color.write_global();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if args.mazes.is_empty() {
        let mut problem = GridProblem::try_from(BUILTIN_MAZE).map_err(std::io::Error::other)?;
        problem.grid = problem.grid.with_connectivity(args.connectivity());
        solve_and_report("built-in maze", &problem, &args)?;
        solve_random(&args)?;
        return Ok(());
    }

    for path in &args.mazes {
        let text = std::fs::read_to_string(path)?;
        let mut problem = GridProblem::try_from(text.as_str()).map_err(std::io::Error::other)?;
        problem.grid = problem.grid.with_connectivity(args.connectivity());
        solve_and_report(&path.display().to_string(), &problem, &args)?;
    }

    Ok(())
}
