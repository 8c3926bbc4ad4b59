//! Translation from cell state to timed note events.
//!
//! The mapper only reads grids; it never touches the [`GridState`] that
//! produced them.
//!
//! [`GridState`]: super::GridState

use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::{CellChange, ChangeKind, Grid};
use crate::schema::{MappingParams, VelocityMap};

/// Velocity given to cells that were just born when births are emphasized.
pub const BIRTH_VELOCITY: u8 = 110;

/// A single note. Pitch is a MIDI note number, velocity is 1-127.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub pitch: u8,
    pub velocity: u8,
    /// Length in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Source cell column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Source cell row (2-D) or generation (1-D).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Source cell state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<u8>,
}

/// All notes sounding at one step. An empty `notes` list is a rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteStep {
    #[serde(rename = "step")]
    pub step_index: usize,
    #[serde(rename = "time")]
    pub timestamp_ms: f64,
    pub notes: Vec<NoteEvent>,
}

impl NoteStep {
    pub fn new(step_index: usize, timestamp_ms: f64) -> Self {
        Self {
            step_index,
            timestamp_ms,
            notes: Vec::new(),
        }
    }

    #[inline]
    pub fn is_rest(&self) -> bool {
        self.notes.is_empty()
    }

    #[inline]
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }
}

/// Total notes across a sequence.
pub fn total_notes(steps: &[NoteStep]) -> usize {
    steps.iter().map(NoteStep::note_count).sum()
}

/// Maps rows and grids to note steps under a fixed [`MappingParams`].
#[derive(Debug, Clone)]
pub struct NoteMapper {
    params: MappingParams,
    rng: StdRng,
}

impl NoteMapper {
    /// Mapper whose `random` velocities are drawn from `seed`, or from
    /// entropy when no seed is given.
    pub fn new(params: MappingParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { params, rng }
    }

    pub fn params(&self) -> &MappingParams {
        &self.params
    }

    /// Map one elementary generation to a step.
    ///
    /// Live cell `i` sounds `base + scale[i % len] + 12 * (i / len)`.
    pub fn map_row(&mut self, row: &[u8], step_index: usize) -> NoteStep {
        let mut step = NoteStep::new(step_index, self.timestamp(step_index));
        let degrees = self.params.scale.degree_count();

        let live = |i: usize| row.get(i).is_some_and(|&c| c != 0);
        for i in (0..row.len()).filter(|&i| live(i)) {
            let pitch = self.pitch(i, i / degrees);
            let velocity = match self.params.velocity_map {
                VelocityMap::Linear => linear_velocity(i, row.len()),
                VelocityMap::Distance => {
                    let center = (row.len() as f32 - 1.0) / 2.0;
                    distance_velocity((i as f32 - center).abs(), center)
                }
                VelocityMap::Random => self.random_velocity(),
                VelocityMap::Cellular => {
                    let left = i > 0 && live(i - 1);
                    cellular_velocity(u8::from(left) + u8::from(live(i + 1)))
                }
            };
            step.notes.push(self.note(pitch, velocity, i, step_index));
        }

        step
    }

    /// Map a 2-D grid to one step per row, skipping rows with no notes.
    ///
    /// Column `x` picks the scale degree and every four rows raise the
    /// octave. With `emphasize_births`, each cell's most recent change
    /// record decides: `birth` sounds at [`BIRTH_VELOCITY`] and `death`
    /// skips the cell. Cells without records keep the normal velocity.
    pub fn map_grid(&mut self, grid: &Grid, changes: &[CellChange]) -> Vec<NoteStep> {
        let emphasis = if self.params.emphasize_births {
            change_index(changes)
        } else {
            HashMap::new()
        };

        let cx = (grid.width() as f32 - 1.0) / 2.0;
        let cy = (grid.height() as f32 - 1.0) / 2.0;
        let max_distance = (cx.max(0.0).powi(2) + cy.max(0.0).powi(2)).sqrt();

        let mut steps = Vec::new();
        for y in 0..grid.height() {
            let mut step = NoteStep::new(y, self.timestamp(y));

            for (x, _) in grid.row(y).iter().enumerate().filter(|&(_, &c)| c == 1) {
                let velocity = match emphasis.get(&(x, y)) {
                    Some(ChangeKind::Death) => continue,
                    Some(ChangeKind::Birth) => BIRTH_VELOCITY,
                    None => match self.params.velocity_map {
                        VelocityMap::Linear => linear_velocity(x, grid.width()),
                        VelocityMap::Distance => {
                            let dx = x as f32 - cx;
                            let dy = y as f32 - cy;
                            distance_velocity((dx * dx + dy * dy).sqrt(), max_distance)
                        }
                        VelocityMap::Random => self.random_velocity(),
                        VelocityMap::Cellular => {
                            let (xi, yi) = (x as isize, y as isize);
                            cellular_velocity(grid.get(xi - 1, yi) + grid.get(xi + 1, yi))
                        }
                    },
                };
                let pitch = self.pitch(x, y / 4);
                step.notes.push(self.note(pitch, velocity, x, y));
            }

            if !step.is_rest() {
                steps.push(step);
            }
        }

        steps
    }

    /// Map a run of generations: each single-row generation becomes its own
    /// step; otherwise only the final grid is mapped.
    pub fn map_generations<'a, I>(&mut self, generations: I, changes: &[CellChange]) -> Vec<NoteStep>
    where
        I: IntoIterator<Item = &'a Grid>,
    {
        let generations: Vec<&Grid> = generations.into_iter().collect();
        if generations.iter().all(|g| g.is_row()) {
            return generations
                .iter()
                .enumerate()
                .map(|(i, g)| self.map_row(g.row(0), i))
                .collect();
        }
        match generations.last() {
            Some(last) => self.map_grid(last, changes),
            None => Vec::new(),
        }
    }

    fn timestamp(&self, step_index: usize) -> f64 {
        step_index as f64 * self.params.step_duration_ms
    }

    fn pitch(&self, degree_index: usize, octave: usize) -> u8 {
        let base = self.params.note_range.base_note() as usize;
        let degree = self.params.scale.degree(degree_index) as usize;
        (base + degree + octave * 12).min(127) as u8
    }

    fn random_velocity(&mut self) -> u8 {
        self.rng.gen_range(60..=127)
    }

    fn note(&self, pitch: u8, velocity: u8, column: usize, row: usize) -> NoteEvent {
        NoteEvent {
            pitch,
            velocity: velocity.clamp(1, 127),
            duration: Some(self.params.step_duration_ms),
            column: Some(column),
            row: Some(row),
            state: Some(1),
        }
    }
}

/// Latest change per cell. Ties on iteration go to the later record.
fn change_index(changes: &[CellChange]) -> HashMap<(usize, usize), ChangeKind> {
    let mut latest: HashMap<(usize, usize), (usize, ChangeKind)> =
        HashMap::with_capacity(changes.len());
    for change in changes {
        latest
            .entry((change.x, change.y))
            .and_modify(|entry| {
                if change.iteration >= entry.0 {
                    *entry = (change.iteration, change.kind);
                }
            })
            .or_insert((change.iteration, change.kind));
    }
    latest
        .into_iter()
        .map(|(cell, (_, kind))| (cell, kind))
        .collect()
}

fn to_velocity(value: f32) -> u8 {
    if value.is_nan() {
        return 1;
    }
    value.round().clamp(1.0, 127.0) as u8
}

/// 70 at the first column rising to 127 at the last.
fn linear_velocity(position: usize, length: usize) -> u8 {
    if length <= 1 {
        return 127;
    }
    to_velocity(70.0 + 57.0 * position as f32 / (length - 1) as f32)
}

/// 127 at the center falling to 47 at `max_distance`.
fn distance_velocity(distance: f32, max_distance: f32) -> u8 {
    if max_distance <= 0.0 {
        return 127;
    }
    to_velocity(127.0 - 80.0 * (distance / max_distance).min(1.0))
}

/// 80 plus 20 per live horizontal neighbour.
fn cellular_velocity(live_neighbors: u8) -> u8 {
    to_velocity(80.0 + 20.0 * live_neighbors as f32)
}
