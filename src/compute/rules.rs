//! Evolution rules for the two automaton families.
//!
//! Elementary (1-D) automata use Wolfram's rule numbering: the states of
//! (left, self, right) form a 3-bit index, most significant bit on the left,
//! and bit `index` of the rule number is the next state. Cells beyond either
//! end of the row are treated as dead.
//!
//! The 2-D family is Conway's life (B3/S23) over the Moore neighbourhood,
//! again with dead edges.

use serde::{Deserialize, Serialize};

use super::{Grid, GridState};

/// An elementary automaton rule (0-255).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementaryRule(u8);

impl ElementaryRule {
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    /// `None` for numbers outside 0-255.
    pub fn from_number(number: i64) -> Option<Self> {
        u8::try_from(number).ok().map(Self)
    }

    #[inline]
    pub fn number(self) -> u8 {
        self.0
    }

    /// Next state of a cell given its neighbourhood. Any non-zero state
    /// counts as live.
    #[inline]
    pub fn next_state(self, left: u8, center: u8, right: u8) -> u8 {
        let index =
            (u8::from(left != 0) << 2) | (u8::from(center != 0) << 1) | u8::from(right != 0);
        (self.0 >> index) & 1
    }

    /// One generation. Non-zero cells in `row` count as live.
    pub fn step(self, row: &[u8]) -> Vec<u8> {
        let width = row.len();
        (0..width)
            .map(|i| {
                let left = if i == 0 { 0 } else { row[i - 1] };
                let right = if i + 1 == width { 0 } else { row[i + 1] };
                self.next_state(left, row[i], right)
            })
            .collect()
    }

    /// `generations` rows starting with `initial` as generation 0.
    pub fn run(self, initial: &[u8], generations: usize) -> Vec<Vec<u8>> {
        let mut rows = Vec::with_capacity(generations);
        if generations == 0 {
            return rows;
        }
        let mut row: Vec<u8> = initial.iter().map(|&c| u8::from(c != 0)).collect();
        for _ in 1..generations {
            let next = self.step(&row);
            rows.push(row);
            row = next;
        }
        rows.push(row);
        rows
    }
}

/// Evolve an elementary automaton from untrusted parameters.
///
/// Returns no rows when `rule_number` is outside 0-255 or
/// `generation_count` is negative.
pub fn evolve_1d(initial_row: &[u8], rule_number: i64, generation_count: i64) -> Vec<Vec<u8>> {
    let Some(rule) = ElementaryRule::from_number(rule_number) else {
        log::debug!("rejecting elementary rule {rule_number}");
        return Vec::new();
    };
    let Ok(generations) = usize::try_from(generation_count) else {
        log::debug!("rejecting generation count {generation_count}");
        return Vec::new();
    };
    rule.run(initial_row, generations)
}

/// Whether a cell was born or died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Birth,
    Death,
}

/// A single cell flipping state during one life iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellChange {
    pub x: usize,
    pub y: usize,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Zero-based iteration that produced the change.
    pub iteration: usize,
}

/// Live Moore neighbours of (x, y); edges count as dead.
#[inline]
pub fn live_neighbors(grid: &Grid, x: usize, y: usize) -> u8 {
    let (x, y) = (x as isize, y as isize);
    let mut count = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx != 0 || dy != 0 {
                count += grid.get(x + dx, y + dy);
            }
        }
    }
    count
}

/// Apply B3/S23 once, appending a record for every flipped cell.
pub fn life_step(grid: &Grid, iteration: usize, changes: &mut Vec<CellChange>) -> Grid {
    let mut next = Grid::new(grid.width(), grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let alive = grid.get(x as isize, y as isize) == 1;
            let neighbors = live_neighbors(grid, x, y);
            let next_alive = matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3));
            next.set(x, y, next_alive);

            if alive != next_alive {
                changes.push(CellChange {
                    x,
                    y,
                    kind: if next_alive {
                        ChangeKind::Birth
                    } else {
                        ChangeKind::Death
                    },
                    iteration,
                });
            }
        }
    }
    next
}

/// Run `iteration_count` life iterations on the current grid of `state`,
/// committing each new generation.
///
/// Returns the change records of every iteration, in order. A negative
/// count runs nothing and returns no records.
pub fn evolve_grid(state: &mut GridState, iteration_count: i64) -> Vec<CellChange> {
    let mut changes = Vec::new();
    let Ok(iterations) = usize::try_from(iteration_count) else {
        log::debug!("rejecting iteration count {iteration_count}");
        return changes;
    };

    for iteration in 0..iterations {
        let before = changes.len();
        let next = life_step(state.current(), iteration, &mut changes);
        log::trace!(
            "life iteration {iteration}: {} changes, {} live",
            changes.len() - before,
            next.live_count()
        );
        state.commit(next);
    }

    changes
}
