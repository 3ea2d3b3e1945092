use derive_more::Display;
use thiserror::Error;

use crate::graph::Graph;
use crate::graph::NodeId;
use crate::graph::Position;

const MAX_ELEMENTS_DISPLAYED: usize = 20;
const RANDOM_CELL_MAX_TRIES: usize = 10_000;

#[derive(Copy, Clone, Debug, Display, PartialEq)]
#[display("({x},{y})")]
pub struct GridPosition {
    pub x: f32,
    pub y: f32,
}

impl Position for GridPosition {
    #[inline(always)]
    fn sqr_distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum GridCell {
    #[display("░")]
    Empty,
    #[display("█")]
    Wall,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridCellParseError {
    #[error("Invalid character '{0}' found.")]
    InvalidCharacter(char),
}

impl std::convert::TryFrom<char> for GridCell {
    type Error = GridCellParseError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            ' ' | '.' => Ok(GridCell::Empty),
            '#' | '█' => Ok(GridCell::Wall),
            ch => Err(GridCellParseError::InvalidCharacter(ch)),
        }
    }
}

/// Which cells count as adjacent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// Orthogonal moves only.
    #[default]
    Four,
    /// Orthogonal and diagonal moves.
    Eight,
}

impl Connectivity {
    #[inline(always)]
    pub fn directions(&self) -> usize {
        match self {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        }
    }
}

/// Neighbour slots as `(dx, dy)`. The first 4 are orthogonal.
#[rustfmt::skip]
const OFFSETS: [(isize, isize); 8] = [
    ( 0, -1), // ↑
    ( 1,  0), // →
    ( 0,  1), // ↓
    (-1,  0), // ←
    ( 1, -1), // ↗
    ( 1,  1), // ↘
    (-1,  1), // ↙
    (-1, -1), // ↖
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("A {width}x{height} grid has more cells than nodes can address")]
    TooLarge { width: usize, height: usize },
    #[error("Row {y} has {found} cells, expected {expected}")]
    RaggedRow {
        y: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid cell {e} found at ({x},{y})")]
    InvalidCell {
        e: GridCellParseError,
        x: usize,
        y: usize,
    },
    #[error("Missing '{0}' marker")]
    MissingMarker(char),
    #[error("Marker '{marker}' found again at ({x},{y})")]
    DuplicateMarker { marker: char, x: usize, y: usize },
}

/// A rectangular grid of cells, row major.
///
/// Node ids are `y * width + x`.
#[derive(Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<GridCell>,
    connectivity: Connectivity,
}

impl Grid {
    /// An open 4-connected grid.
    pub fn new(width: usize, height: usize) -> Result<Self, GridParseError> {
        let too_large = GridParseError::TooLarge { width, height };
        let len = width.checked_mul(height).ok_or(too_large.clone())?;
        if len > 0 && NodeId::new(len - 1).is_none() {
            return Err(too_large);
        }

        Ok(Self {
            width,
            height,
            cells: vec![GridCell::Empty; len],
            connectivity: Connectivity::default(),
        })
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// The node at `(x, y)`, if it's on the grid.
    #[inline(always)]
    pub fn node(&self, x: usize, y: usize) -> Option<NodeId> {
        if x < self.width && y < self.height {
            NodeId::new(y * self.width + x)
        } else {
            None
        }
    }

    /// The `(x, y)` coordinates of `node`.
    #[inline(always)]
    pub fn coords(&self, node: NodeId) -> (usize, usize) {
        debug_assert!(self.width > 0);
        (node.index() % self.width, node.index() / self.width)
    }

    pub fn cell(&self, node: NodeId) -> Option<GridCell> {
        self.cells.get(node.index()).copied()
    }

    /// Sets the cell at `(x, y)`. Returns whether it was on the grid.
    pub fn set(&mut self, x: usize, y: usize, cell: GridCell) -> bool {
        match self.node(x, y) {
            Some(node) => {
                self.cells[node.index()] = cell;
                true
            }
            None => false,
        }
    }

    /// A random empty cell, if one turns up in a bounded number of tries.
    pub fn random_open_cell<R: rand::Rng>(&self, r: &mut R) -> Option<NodeId> {
        if self.cells.is_empty() {
            return None;
        }

        for _tries in 0..RANDOM_CELL_MAX_TRIES {
            let i = r.random_range(0..self.cells.len());
            if self.cells[i] == GridCell::Empty {
                return NodeId::new(i);
            }
        }

        None
    }
}

impl Graph for Grid {
    type Position = GridPosition;

    fn node_count(&self) -> usize {
        self.cells.len()
    }

    #[inline(always)]
    fn position(&self, node: NodeId) -> GridPosition {
        let (x, y) = self.coords(node);
        GridPosition {
            x: x as f32,
            y: y as f32,
        }
    }

    #[inline(always)]
    fn directions(&self, _node: NodeId) -> usize {
        self.connectivity.directions()
    }

    #[inline(always)]
    fn neighbour(&self, node: NodeId, slot: usize) -> Option<NodeId> {
        let (dx, dy) = OFFSETS[slot];
        let (x, y) = self.coords(node);
        self.node(x.checked_add_signed(dx)?, y.checked_add_signed(dy)?)
    }

    #[inline(always)]
    fn is_traversable(&self, node: NodeId) -> bool {
        self.cell(node) == Some(GridCell::Empty)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Grid({}x{}):", self.width, self.height)?;
        for row in self
            .cells
            .chunks(self.width.max(1))
            .take(MAX_ELEMENTS_DISPLAYED)
        {
            for cell in row.iter().take(MAX_ELEMENTS_DISPLAYED) {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Grid{:?}", self.dimensions())
    }
}

/// Parses rows of cells, handing `S`/`G` markers to `on_marker`.
fn parse_grid<F>(s: &str, mut on_marker: F) -> Result<Grid, GridParseError>
where
    F: FnMut(char, NodeId, usize, usize) -> Result<(), GridParseError>,
{
    let lines: Vec<&str> = s.lines().collect();
    let width = lines.first().map_or(0, |l| l.chars().count());
    if width == 0 {
        return Err(GridParseError::EmptyInput);
    }

    let mut grid = Grid::new(width, lines.len())?;
    for (y, line) in lines.iter().enumerate() {
        let found = line.chars().count();
        if found != width {
            return Err(GridParseError::RaggedRow {
                y,
                expected: width,
                found,
            });
        }

        for (x, ch) in line.chars().enumerate() {
            let node = grid.node(x, y).ok_or(GridParseError::TooLarge {
                width,
                height: lines.len(),
            })?;
            match ch {
                'S' | 'G' => on_marker(ch, node, x, y)?,
                ch => {
                    grid.cells[node.index()] = GridCell::try_from(ch)
                        .map_err(|e| GridParseError::InvalidCell { e, x, y })?;
                }
            }
        }
    }

    Ok(grid)
}

impl std::convert::TryFrom<&str> for Grid {
    type Error = GridParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        parse_grid(s, |ch, _node, x, y| {
            Err(GridParseError::InvalidCell {
                e: GridCellParseError::InvalidCharacter(ch),
                x,
                y,
            })
        })
    }
}

/// A grid with an origin (`S`) and a destination (`G`) marked on it.
#[derive(Clone, Debug)]
pub struct GridProblem {
    pub grid: Grid,
    pub origin: NodeId,
    pub destination: NodeId,
}

impl std::convert::TryFrom<&str> for GridProblem {
    type Error = GridParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut origin = None;
        let mut destination = None;

        let grid = parse_grid(s, |marker, node, x, y| {
            let slot = if marker == 'S' {
                &mut origin
            } else {
                &mut destination
            };
            if slot.replace(node).is_some() {
                return Err(GridParseError::DuplicateMarker { marker, x, y });
            }
            Ok(())
        })?;

        Ok(GridProblem {
            grid,
            origin: origin.ok_or(GridParseError::MissingMarker('S'))?,
            destination: destination.ok_or(GridParseError::MissingMarker('G'))?,
        })
    }
}

impl std::fmt::Display for GridProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (width, height) = self.grid.dimensions();
        let origin = self.grid.coords(self.origin);
        let destination = self.grid.coords(self.destination);
        writeln!(
            f,
            "GridProblem({width}x{height}) (s:{origin:?}, g:{destination:?}):"
        )?;
        for y in 0..height.min(MAX_ELEMENTS_DISPLAYED) {
            for x in 0..width.min(MAX_ELEMENTS_DISPLAYED) {
                let node = self.grid.node(x, y);
                if node == Some(self.origin) {
                    write!(f, "S")?;
                } else if node == Some(self.destination) {
                    write!(f, "G")?;
                } else if let Some(cell) = node.and_then(|n| self.grid.cell(n)) {
                    write!(f, "{cell}")?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn parse_cells() {
        assert_eq!(GridCell::try_from('.'), Ok(GridCell::Empty));
        assert_eq!(GridCell::try_from(' '), Ok(GridCell::Empty));
        assert_eq!(GridCell::try_from('#'), Ok(GridCell::Wall));
        assert_eq!(
            GridCell::try_from('x'),
            Err(GridCellParseError::InvalidCharacter('x'))
        );
    }

    #[test]
    fn parse_plain_grid() {
        let grid = Grid::try_from(indoc! {"
            ..#
            #..
        "})
        .unwrap();
        assert_eq!(grid.dimensions(), (3, 2));
        assert_eq!(grid.node_count(), 6);
        assert!(grid.is_traversable(grid.node(0, 0).unwrap()));
        assert!(!grid.is_traversable(grid.node(2, 0).unwrap()));
        assert!(!grid.is_traversable(grid.node(0, 1).unwrap()));
        assert_eq!(grid.node(3, 0), None);
        assert_eq!(grid.node(0, 2), None);
    }

    #[test]
    fn parse_problem() {
        let problem = GridProblem::try_from(indoc! {"
            S.#
            #.G
        "})
        .unwrap();
        assert_eq!(problem.grid.coords(problem.origin), (0, 0));
        assert_eq!(problem.grid.coords(problem.destination), (2, 1));
        assert!(problem.grid.is_traversable(problem.origin));
        assert!(problem.grid.is_traversable(problem.destination));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Grid::try_from(""), Err(GridParseError::EmptyInput));
        assert_eq!(
            Grid::try_from("...\n.."),
            Err(GridParseError::RaggedRow {
                y: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            Grid::try_from(".x."),
            Err(GridParseError::InvalidCell {
                e: GridCellParseError::InvalidCharacter('x'),
                x: 1,
                y: 0
            })
        );
        // Plain grids don't take markers.
        assert!(matches!(
            Grid::try_from("S.G"),
            Err(GridParseError::InvalidCell { x: 0, y: 0, .. })
        ));

        assert_eq!(
            GridProblem::try_from("S..").unwrap_err(),
            GridParseError::MissingMarker('G')
        );
        assert_eq!(
            GridProblem::try_from("..G").unwrap_err(),
            GridParseError::MissingMarker('S')
        );
        assert_eq!(
            GridProblem::try_from("S.G\nS..").unwrap_err(),
            GridParseError::DuplicateMarker {
                marker: 'S',
                x: 0,
                y: 1
            }
        );
    }

    #[test]
    fn neighbours_stay_on_the_grid() {
        let grid = Grid::new(3, 3).unwrap();
        let corner = grid.node(0, 0).unwrap();
        let centre = grid.node(1, 1).unwrap();

        let slots = |g: &Grid, n: NodeId| -> Vec<NodeId> {
            (0..g.directions(n))
                .filter_map(|slot| g.neighbour(n, slot))
                .collect()
        };

        assert_eq!(grid.directions(corner), 4);
        assert_eq!(
            slots(&grid, corner),
            vec![grid.node(1, 0).unwrap(), grid.node(0, 1).unwrap()]
        );
        assert_eq!(slots(&grid, centre).len(), 4);

        let grid = grid.with_connectivity(Connectivity::Eight);
        assert_eq!(grid.directions(corner), 8);
        assert_eq!(slots(&grid, corner).len(), 3);
        assert_eq!(slots(&grid, centre).len(), 8);
    }

    #[test]
    fn positions() {
        let grid = Grid::new(4, 2).unwrap();
        let node = grid.node(3, 1).unwrap();
        assert_eq!(node.index(), 7);
        assert_eq!(grid.coords(node), (3, 1));
        assert_eq!(grid.position(node), GridPosition { x: 3.0, y: 1.0 });
        let origin = grid.position(grid.node(0, 0).unwrap());
        assert_eq!(origin.sqr_distance(&grid.position(node)), 10.0);
    }

    #[test]
    fn random_cells_are_open() {
        let mut grid = Grid::new(8, 8).unwrap();
        for x in 0..8 {
            assert!(grid.set(x, 3, GridCell::Wall));
        }
        assert!(!grid.set(8, 0, GridCell::Wall));

        let mut r = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let node = grid.random_open_cell(&mut r).unwrap();
            assert!(grid.is_traversable(node));
        }

        let walls = Grid::try_from("##\n##").unwrap();
        assert_eq!(walls.random_open_cell(&mut r), None);
    }

    #[test]
    fn display() {
        let problem = GridProblem::try_from("S#G").unwrap();
        assert_eq!(problem.grid.to_string(), "Grid(3x1):\n░█░\n");
        assert_eq!(
            problem.to_string(),
            "GridProblem(3x1) (s:(0, 0), g:(2, 0)):\nS█G\n"
        );
        assert_eq!(format!("{:?}", problem.grid), "Grid(3, 1)");
    }
}
