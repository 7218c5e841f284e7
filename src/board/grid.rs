//! Match-3 grid, generation and match detection

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::{GRID_SIZE, MAX_GENERATION_ATTEMPTS};
use crate::error::BoardError;
use crate::rng::RandomSource;

/// Cell type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    React,
    Python,
    Docker,
    Bug,
    /// Consumed by a match, waiting for gravity/refill
    Empty,
}

impl CellKind {
    /// Kinds that can be generated
    pub const ACTIVE: [CellKind; 4] = [
        CellKind::React,
        CellKind::Python,
        CellKind::Docker,
        CellKind::Bug,
    ];

    pub fn is_empty(self) -> bool {
        self == CellKind::Empty
    }

    /// Uniformly random active kind
    pub fn random(rng: &mut impl RandomSource) -> Self {
        Self::ACTIVE[rng.below(Self::ACTIVE.len())]
    }

    pub fn icon(self) -> &'static str {
        match self {
            CellKind::React => "⚛️",
            CellKind::Python => "🐍",
            CellKind::Docker => "🐋",
            CellKind::Bug => "🐛",
            CellKind::Empty => "",
        }
    }

    /// Short corner label
    pub fn label(self) -> &'static str {
        match self {
            CellKind::React => "REACT",
            CellKind::Python => "PY",
            CellKind::Docker => "SHIP",
            CellKind::Bug => "FIX",
            CellKind::Empty => "",
        }
    }
}

/// Opaque cell identity, stable while a cell falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub kind: CellKind,
    pub level: u8,
}

/// Board coordinate (row 0 is the top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }
}

/// Union of matched coordinates, ordered so scan order never matters
pub type MatchSet = BTreeSet<Coord>;

/// Square grid, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
    next_id: u32,
}

impl Grid {
    /// Generate a match-free board by rejection sampling
    pub fn generate(rng: &mut impl RandomSource) -> Self {
        let size = GRID_SIZE;
        let mut grid = Self {
            size,
            cells: Vec::with_capacity(size * size),
            next_id: 1,
        };

        for row in 0..size {
            for col in 0..size {
                let kind = grid.pick_non_matching(row, col, rng);
                let cell = grid.new_cell(kind);
                grid.cells.push(cell);
            }
        }

        grid
    }

    /// Build a grid from explicit kinds (rows top to bottom)
    pub fn from_kinds(rows: &[Vec<CellKind>]) -> Result<Self, BoardError> {
        let size = GRID_SIZE;
        if rows.len() != size {
            return Err(BoardError::DimensionMismatch {
                expected: size,
                rows: rows.len(),
                cols: rows.first().map_or(0, Vec::len),
            });
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != size) {
            return Err(BoardError::DimensionMismatch {
                expected: size,
                rows: rows.len(),
                cols: bad.len(),
            });
        }

        let mut grid = Self {
            size,
            cells: Vec::with_capacity(size * size),
            next_id: 1,
        };
        for kind in rows.iter().flatten() {
            let cell = grid.new_cell(*kind);
            grid.cells.push(cell);
        }
        Ok(grid)
    }

    /// Choose a kind for (row, col) that doesn't complete a run with the two
    /// already-placed cells to its left or above.
    fn pick_non_matching(&self, row: usize, col: usize, rng: &mut impl RandomSource) -> CellKind {
        let forbidden = |kind: CellKind| {
            let vertical = row >= 2
                && self.cells[(row - 1) * self.size + col].kind == kind
                && self.cells[(row - 2) * self.size + col].kind == kind;
            let horizontal = col >= 2
                && self.cells[row * self.size + col - 1].kind == kind
                && self.cells[row * self.size + col - 2].kind == kind;
            vertical || horizontal
        };

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let kind = CellKind::random(rng);
            if !forbidden(kind) {
                return kind;
            }
        }

        // At most two kinds can be forbidden, so one of four is always free
        CellKind::ACTIVE
            .into_iter()
            .find(|k| !forbidden(*k))
            .unwrap_or(CellKind::React)
    }

    /// Allocate a fresh cell
    pub fn new_cell(&mut self, kind: CellKind) -> Cell {
        let id = CellId(self.next_id);
        self.next_id += 1;
        Cell { id, kind, level: 1 }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.size && at.col < self.size
    }

    fn index(&self, at: Coord) -> usize {
        at.row * self.size + at.col
    }

    pub fn get(&self, at: Coord) -> Option<&Cell> {
        self.contains(at).then(|| &self.cells[self.index(at)])
    }

    /// Kind at `at`; panics outside the board
    pub fn kind(&self, at: Coord) -> CellKind {
        self.cells[self.index(at)].kind
    }

    pub fn set_kind(&mut self, at: Coord, kind: CellKind) {
        let idx = self.index(at);
        self.cells[idx].kind = kind;
    }

    pub fn replace(&mut self, at: Coord, cell: Cell) {
        let idx = self.index(at);
        self.cells[idx] = cell;
    }

    pub fn swap(&mut self, a: Coord, b: Coord) {
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
    }

    /// Swap two cells by index along a column (used by gravity)
    pub(crate) fn swap_in_column(&mut self, col: usize, row_a: usize, row_b: usize) {
        self.swap(Coord::new(row_a, col), Coord::new(row_b, col));
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let size = self.size;
        (0..size * size).map(move |i| Coord::new(i / size, i % size))
    }

    pub fn non_empty_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.kind.is_empty()).count()
    }

    /// Kinds row by row (top to bottom)
    pub fn kinds(&self) -> Vec<Vec<CellKind>> {
        self.cells
            .chunks(self.size)
            .map(|row| row.iter().map(|c| c.kind).collect())
            .collect()
    }
}

/// Every coordinate that is part of a horizontal or vertical run of three or
/// more identical non-empty kinds.
pub fn find_matches(grid: &Grid) -> MatchSet {
    let mut matches = MatchSet::new();
    let n = grid.size();

    for row in 0..n {
        collect_runs(&mut matches, (0..n).map(|col| Coord::new(row, col)), grid);
    }
    for col in 0..n {
        collect_runs(&mut matches, (0..n).map(|row| Coord::new(row, col)), grid);
    }

    matches
}

/// Scan one line of coordinates and add every run of 3+ to `out`
fn collect_runs(out: &mut MatchSet, line: impl Iterator<Item = Coord>, grid: &Grid) {
    let line: Vec<Coord> = line.collect();
    let mut start = 0;
    while start < line.len() {
        let kind = grid.kind(line[start]);
        let mut end = start + 1;
        while end < line.len() && grid.kind(line[end]) == kind {
            end += 1;
        }
        if !kind.is_empty() && end - start >= 3 {
            out.extend(&line[start..end]);
        }
        start = end;
    }
}

pub fn has_matches(grid: &Grid) -> bool {
    !find_matches(grid).is_empty()
}
