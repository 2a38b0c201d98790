//! Perfect maze generation with a randomized depth-first backtracker.
//!
//! Cells live in a flat row-major `Vec` and the backtracker keeps an explicit
//! stack of cell indices, so large grids never recurse.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{GameError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }

    /// Maps a unit step to its direction; diagonals and zero or long steps give `None`.
    pub fn from_delta(d_col: i32, d_row: i32) -> Option<Dir> {
        match (d_col, d_row) {
            (0, -1) => Some(Dir::Up),
            (1, 0) => Some(Dir::Right),
            (0, 1) => Some(Dir::Down),
            (-1, 0) => Some(Dir::Left),
            _ => None,
        }
    }

    fn wall_index(self) -> usize {
        match self {
            Dir::Up => 0,
            Dir::Right => 1,
            Dir::Down => 2,
            Dir::Left => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub pos: Position,
    /// top, right, bottom, left
    walls: [bool; 4],
    visited: bool,
}

impl Cell {
    fn new(col: usize, row: usize) -> Self {
        Self {
            pos: Position::new(col, row),
            walls: [true; 4],
            visited: false,
        }
    }

    pub fn has_wall(&self, dir: Dir) -> bool {
        self.walls[dir.wall_index()]
    }

    pub fn walls(&self) -> [bool; 4] {
        self.walls
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub(crate) fn filled(cols: usize, rows: usize) -> Self {
        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell::new(col, row));
            }
        }
        Self { cols, rows, cells }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.col < self.cols && pos.row < self.rows
    }

    fn index(&self, pos: Position) -> usize {
        pos.col + pos.row * self.cols
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if self.contains(pos) {
            Some(&self.cells[self.index(pos)])
        } else {
            None
        }
    }

    pub fn neighbor(&self, pos: Position, dir: Dir) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let nc = pos.col as isize + dx;
        let nr = pos.row as isize + dy;
        if nc < 0 || nr < 0 {
            return None;
        }
        let next = Position::new(nc as usize, nr as usize);
        if self.contains(next) {
            Some(next)
        } else {
            None
        }
    }

    pub fn is_open(&self, pos: Position, dir: Dir) -> bool {
        match self.cell(pos) {
            Some(cell) => !cell.has_wall(dir) && self.neighbor(pos, dir).is_some(),
            None => false,
        }
    }

    /// Number of carved wall pairs; a perfect maze has `cols * rows - 1`.
    pub fn passage_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| {
                [Dir::Right, Dir::Down]
                    .iter()
                    .filter(|&&dir| self.is_open(cell.pos, dir))
                    .count()
            })
            .sum()
    }

    /// BFS step counts from `start` through open passages.
    pub fn distances_from(&self, start: Position) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.cells.len()];
        if !self.contains(start) {
            return dist;
        }
        let mut q = VecDeque::new();
        dist[self.index(start)] = Some(0);
        q.push_back(start);

        while let Some(pos) = q.pop_front() {
            let base = dist[self.index(pos)].unwrap_or(0);
            for dir in Dir::ALL {
                if !self.is_open(pos, dir) {
                    continue;
                }
                if let Some(next) = self.neighbor(pos, dir) {
                    let idx = self.index(next);
                    if dist[idx].is_none() {
                        dist[idx] = Some(base + 1);
                        q.push_back(next);
                    }
                }
            }
        }
        dist
    }

    fn unvisited_neighbors(&self, pos: Position) -> Vec<(Dir, usize)> {
        let mut out = Vec::with_capacity(4);
        for dir in Dir::ALL {
            if let Some(next) = self.neighbor(pos, dir) {
                let idx = self.index(next);
                if !self.cells[idx].visited {
                    out.push((dir, idx));
                }
            }
        }
        out
    }

    // Walls always come down in pairs so both cells agree.
    fn carve(&mut self, from: usize, dir: Dir, to: usize) {
        self.cells[from].walls[dir.wall_index()] = false;
        self.cells[to].walls[dir.opposite().wall_index()] = false;
    }
}

/// Builds a perfect maze; `seed` makes the layout reproducible.
pub fn generate(cols: usize, rows: usize, seed: Option<u64>) -> Result<Grid> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_with(cols, rows, &mut rng)
}

pub fn generate_with(cols: usize, rows: usize, rng: &mut impl Rng) -> Result<Grid> {
    if cols < 1 || rows < 1 {
        return Err(GameError::InvalidDimensions { cols, rows });
    }

    let mut grid = Grid::filled(cols, rows);
    let mut stack: Vec<usize> = Vec::new();
    let mut current = 0;
    grid.cells[current].visited = true;

    loop {
        let pos = grid.cells[current].pos;
        let candidates = grid.unvisited_neighbors(pos);
        if let Some(&(dir, next)) = candidates.choose(rng) {
            grid.carve(current, dir, next);
            stack.push(current);
            grid.cells[next].visited = true;
            current = next;
        } else if let Some(prev) = stack.pop() {
            current = prev;
        } else {
            break;
        }
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_perfect(grid: &Grid) {
        let (cols, rows) = (grid.cols(), grid.rows());
        assert_eq!(grid.passage_count(), cols * rows - 1);

        let dist = grid.distances_from(Position::new(0, 0));
        assert!(dist.iter().all(|d| d.is_some()), "unreachable cell in {cols}x{rows}");

        for cell in grid.cells() {
            for dir in Dir::ALL {
                match grid.neighbor(cell.pos, dir) {
                    Some(next) => {
                        let other = grid.cell(next).unwrap();
                        assert_eq!(cell.has_wall(dir), other.has_wall(dir.opposite()));
                    }
                    None => assert!(cell.has_wall(dir), "outer wall removed at {:?}", cell.pos),
                }
            }
        }
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert!(matches!(
            generate(0, 5, Some(1)),
            Err(GameError::InvalidDimensions { cols: 0, rows: 5 })
        ));
        assert!(generate(3, 0, Some(1)).is_err());
    }

    #[test]
    fn single_cell_keeps_all_walls() {
        let grid = generate(1, 1, Some(7)).unwrap();
        assert_eq!(grid.passage_count(), 0);
        assert_eq!(grid.cells()[0].walls(), [true; 4]);
    }

    #[test]
    fn corridors_are_perfect() {
        assert_perfect(&generate(1, 12, Some(3)).unwrap());
        assert_perfect(&generate(12, 1, Some(3)).unwrap());
    }

    #[test]
    fn generated_mazes_are_spanning_trees() {
        for seed in 0..20u64 {
            for &(cols, rows) in &[(2, 2), (5, 3), (9, 9), (17, 11)] {
                assert_perfect(&generate(cols, rows, Some(seed)).unwrap());
            }
        }
    }

    #[test]
    fn large_grid_does_not_overflow_stack() {
        assert_perfect(&generate(120, 120, Some(11)).unwrap());
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generate(10, 8, Some(42)).unwrap();
        let b = generate(10, 8, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn backtracker_visits_every_cell() {
        let grid = generate(6, 6, Some(5)).unwrap();
        assert!(grid.cells().iter().all(|c| c.visited));
    }

    #[test]
    fn from_delta_accepts_only_unit_steps() {
        assert_eq!(Dir::from_delta(1, 0), Some(Dir::Right));
        assert_eq!(Dir::from_delta(0, -1), Some(Dir::Up));
        assert_eq!(Dir::from_delta(1, 1), None);
        assert_eq!(Dir::from_delta(0, 0), None);
        assert_eq!(Dir::from_delta(2, 0), None);
    }
}
