//! Rhythmic post-filter driven by pattern analysis.
//!
//! Complexity picks how densely steps are kept (the pulse division) and
//! entropy picks how often the surviving steps are accented.

use serde::{Deserialize, Serialize};

use super::{NoteStep, PatternAnalysis};

/// Pulse divisions, indexed by complexity.
pub const PULSE_DIVISIONS: [usize; 4] = [1, 2, 3, 4];

/// Accent intervals, indexed by entropy.
pub const ACCENT_INTERVALS: [usize; 5] = [8, 6, 4, 3, 2];

/// Velocity multiplier on accented steps.
pub const ACCENT_BOOST: f32 = 1.3;

/// Pulse and accent spacing chosen for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RhythmParams {
    pub pulse_division: usize,
    pub accent_interval: usize,
}

impl RhythmParams {
    pub fn from_analysis(analysis: &PatternAnalysis) -> Self {
        Self {
            pulse_division: select(&PULSE_DIVISIONS, analysis.complexity),
            accent_interval: select(&ACCENT_INTERVALS, analysis.entropy),
        }
    }

    #[inline]
    pub fn is_pulse(&self, step_index: usize) -> bool {
        step_index % self.pulse_division == 0
    }

    #[inline]
    pub fn is_accent(&self, step_index: usize) -> bool {
        step_index % self.accent_interval == 0
    }

    /// Silence off-pulse steps, boost accented ones, then drop every step
    /// left without notes.
    pub fn apply(&self, steps: Vec<NoteStep>) -> Vec<NoteStep> {
        steps
            .into_iter()
            .filter_map(|mut step| {
                if !self.is_pulse(step.step_index) {
                    return None;
                }
                if self.is_accent(step.step_index) {
                    for note in &mut step.notes {
                        note.velocity = accent(note.velocity);
                    }
                }
                (!step.is_rest()).then_some(step)
            })
            .collect()
    }
}

/// Apply the filter parameterized by `analysis`.
pub fn apply_rhythmic_filter(steps: Vec<NoteStep>, analysis: &PatternAnalysis) -> Vec<NoteStep> {
    let params = RhythmParams::from_analysis(analysis);
    log::debug!(
        "rhythmic filter: pulse every {} steps, accent every {}",
        params.pulse_division,
        params.accent_interval
    );
    params.apply(steps)
}

/// `floor(value * len)` clamped to the table. Non-finite values pick the
/// first entry.
fn select(table: &[usize], value: f32) -> usize {
    let index = if value.is_finite() {
        (value.max(0.0) * table.len() as f32) as usize
    } else {
        0
    };
    table[index.min(table.len() - 1)]
}

fn accent(velocity: u8) -> u8 {
    (velocity as f32 * ACCENT_BOOST).round().clamp(1.0, 127.0) as u8
}
