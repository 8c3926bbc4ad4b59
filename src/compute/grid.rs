//! Binary cell grids and the bounded generation history.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::schema::InitialCondition;

/// Number of generations retained by [`GridState`].
pub const HISTORY_CAPACITY: usize = 20;

/// Rectangular matrix of 0/1 cells.
///
/// Data is stored row-major: `cells[y * width + x]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// All-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Build from row-major cells. Any non-zero value counts as live; the
    /// buffer is truncated or dead-padded to `width * height`.
    pub fn from_cells(width: usize, height: usize, mut cells: Vec<u8>) -> Self {
        cells.resize(width * height, 0);
        for cell in &mut cells {
            *cell = u8::from(*cell != 0);
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Single-row grid, the shape used for elementary automaton generations.
    pub fn from_row(row: &[u8]) -> Self {
        Self::from_cells(row.len(), 1, row.to_vec())
    }

    /// Build from nested rows. Short rows are dead-padded to the widest.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let width = rows.iter().map(|r| r.as_ref().len()).max().unwrap_or(0);
        let mut cells = Vec::with_capacity(width * rows.len());
        for row in rows {
            let row = row.as_ref();
            cells.extend_from_slice(row);
            cells.extend(std::iter::repeat_n(0, width - row.len()));
        }
        Self::from_cells(width, rows.len(), cells)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// A grid with a single row holds one elementary automaton generation.
    #[inline]
    pub fn is_row(&self) -> bool {
        self.height == 1
    }

    /// Row-major cell buffer.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Cell at signed coordinates; anything outside the grid reads as dead.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> u8 {
        if x < 0 || y < 0 {
            return 0;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.cells[y * self.width + x]
    }

    /// Set a cell; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = u8::from(alive);
        }
    }

    /// Row `y`, or an empty slice when out of range.
    pub fn row(&self, y: usize) -> &[u8] {
        if y >= self.height {
            return &[];
        }
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Coordinates of every live cell, row by row.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == 1)
            .map(move |(i, _)| (i % self.width, i / self.width))
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == 1).count()
    }

    /// Fraction of live cells, 0.0 for an empty grid.
    pub fn density(&self) -> f32 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.live_count() as f32 / self.cells.len() as f32
        }
    }

    /// Number of cells whose state differs from `other`, compared over the
    /// overlapping region.
    pub fn diff_count(&self, other: &Grid) -> usize {
        if self.width == other.width {
            return self
                .cells
                .iter()
                .zip(&other.cells)
                .filter(|(a, b)| a != b)
                .count();
        }
        let width = self.width.min(other.width);
        let height = self.height.min(other.height);
        (0..height)
            .map(|y| {
                self.row(y)[..width]
                    .iter()
                    .zip(&other.row(y)[..width])
                    .filter(|(a, b)| a != b)
                    .count()
            })
            .sum()
    }

    /// Copy translated by (dx, dy) with wraparound at the edges.
    pub fn shifted(&self, dx: isize, dy: isize) -> Grid {
        let mut out = Grid::new(self.width, self.height);
        if self.cells.is_empty() {
            return out;
        }
        let (w, h) = (self.width as isize, self.height as isize);
        for (x, y) in self.live_cells() {
            let nx = (x as isize + dx).rem_euclid(w) as usize;
            let ny = (y as isize + dy).rem_euclid(h) as usize;
            out.cells[ny * self.width + nx] = 1;
        }
        out
    }
}

/// Current grid plus a sliding window of the most recent generations.
///
/// The history is oldest first and always ends with the current grid.
/// Committing past [`HISTORY_CAPACITY`] evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct GridState {
    current: Grid,
    history: VecDeque<Grid>,
    step: u64,
}

impl GridState {
    /// State holding an all-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        let mut state = Self {
            current: Grid::new(width, height),
            history: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
            step: 0,
        };
        state.reset(Grid::new(width, height));
        state
    }

    /// Seed a `width * height` grid and restart the history from it.
    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        width: usize,
        height: usize,
        condition: &InitialCondition,
        rng: &mut R,
    ) -> &Grid {
        let cells = condition.generate(width, height, rng);
        self.reset(Grid::from_cells(width, height, cells));
        &self.current
    }

    /// Seed a single row and restart the history from it.
    pub fn initialize_1d<R: Rng + ?Sized>(
        &mut self,
        width: usize,
        condition: &InitialCondition,
        rng: &mut R,
    ) -> Vec<u8> {
        let row = condition.generate_row(width, rng);
        self.reset(Grid::from_row(&row));
        row
    }

    /// Make `grid` current and append it to the history.
    pub fn commit(&mut self, grid: Grid) {
        self.history.push_back(grid.clone());
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.current = grid;
        self.step += 1;
    }

    /// Cell of the current grid; out of bounds reads as dead.
    #[inline]
    pub fn cell_at(&self, x: isize, y: isize) -> u8 {
        self.current.get(x, y)
    }

    #[inline]
    pub fn current(&self) -> &Grid {
        &self.current
    }

    /// Retained generations, oldest first.
    pub fn history(&self) -> &VecDeque<Grid> {
        &self.history
    }

    /// Number of commits since the last initialization.
    #[inline]
    pub fn step(&self) -> u64 {
        self.step
    }

    fn reset(&mut self, grid: Grid) {
        self.history.clear();
        self.history.push_back(grid.clone());
        self.current = grid;
        self.step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_out_of_bounds_reads_dead() {
        let mut grid = Grid::new(3, 3);
        grid.set(0, 0, true);
        assert_eq!(grid.get(0, 0), 1);
        assert_eq!(grid.get(-1, 0), 0);
        assert_eq!(grid.get(0, -1), 0);
        assert_eq!(grid.get(3, 0), 0);
        assert_eq!(grid.get(0, 3), 0);
    }

    #[test]
    fn test_from_cells_normalizes() {
        let grid = Grid::from_cells(2, 2, vec![0, 5, 1]);
        assert_eq!(grid.cells(), &[0, 1, 1, 0]);
    }

    #[test]
    fn test_from_rows_pads() {
        let grid = Grid::from_rows(&[vec![1u8], vec![0, 1, 1]]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.row(0), &[1, 0, 0]);
        assert_eq!(grid.row(1), &[0, 1, 1]);
    }

    #[test]
    fn test_shift_wraps() {
        let mut grid = Grid::new(4, 3);
        grid.set(3, 2, true);
        let shifted = grid.shifted(1, 1);
        assert_eq!(shifted.get(0, 0), 1);
        assert_eq!(shifted.live_count(), 1);
    }

    #[test]
    fn test_diff_count() {
        let a = Grid::from_row(&[1, 0, 1, 0]);
        let b = Grid::from_row(&[1, 1, 0, 0]);
        assert_eq!(a.diff_count(&b), 2);
        assert_eq!(a.diff_count(&a), 0);
    }

    #[test]
    fn test_initialize_resets_history() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = GridState::new(4, 4);
        state.commit(Grid::new(4, 4));
        state.commit(Grid::new(4, 4));
        assert_eq!(state.step(), 2);

        state.initialize(8, 8, &InitialCondition::Center, &mut rng);
        assert_eq!(state.step(), 0);
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.cell_at(4, 4), 1);
        assert_eq!(state.history().back(), Some(state.current()));
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut state = GridState::new(2, 1);
        for i in 0..50 {
            let mut grid = Grid::new(2, 1);
            grid.set(i % 2, 0, true);
            state.commit(grid);
        }
        assert_eq!(state.history().len(), HISTORY_CAPACITY);
        assert_eq!(state.step(), 50);
        assert_eq!(state.history().back(), Some(state.current()));
        // Commit 49 set x = 1; insertion order is preserved.
        assert_eq!(state.history().back().unwrap().get(1, 0), 1);
        assert_eq!(state.history().front().unwrap().get(0, 0), 1);
    }

    #[test]
    fn test_initialize_1d() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = GridState::new(0, 0);
        let row = state.initialize_1d(7, &InitialCondition::Center, &mut rng);
        assert_eq!(row, vec![0, 0, 0, 1, 0, 0, 0]);
        assert!(state.current().is_row());
        assert_eq!(state.history().len(), 1);
    }
}
