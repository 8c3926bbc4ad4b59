//! Named lookup tables and closed option sets used by the note mapper.
//!
//! Every option that arrives as a free-form string in [`GeneratorConfig`]
//! is resolved into one of these enums exactly once, before any cell is
//! visited.
//!
//! [`GeneratorConfig`]: super::GeneratorConfig

use serde::{Deserialize, Serialize};

/// Which automaton family drives a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationMode {
    /// Elementary 1-D automaton, one row per generation.
    #[default]
    OneD,
    /// Conway's life rule on a 2-D grid.
    LifeLike,
}

impl GenerationMode {
    /// Look up a mode by its configuration name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "oned" | "1d" => Some(Self::OneD),
            "lifelike" | "2d" => Some(Self::LifeLike),
            _ => None,
        }
    }
}

/// Velocity assignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VelocityMap {
    /// Scales 70-127 across the row by position.
    #[default]
    Linear,
    /// Louder towards the center, 47-127.
    Distance,
    /// Uniform in 60-127.
    Random,
    /// Boosted by the live horizontal neighbours.
    Cellular,
}

impl VelocityMap {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "distance" => Some(Self::Distance),
            "random" => Some(Self::Random),
            "cellular" => Some(Self::Cellular),
            _ => None,
        }
    }
}

/// Named scales, each a set of semitone offsets from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scale {
    #[default]
    Pentatonic,
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Blues,
    Chromatic,
}

impl Scale {
    /// All scales in table order.
    pub const ALL: [Scale; 9] = [
        Scale::Pentatonic,
        Scale::Major,
        Scale::Minor,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Lydian,
        Scale::Mixolydian,
        Scale::Blues,
        Scale::Chromatic,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pentatonic" => Some(Self::Pentatonic),
            "major" => Some(Self::Major),
            "minor" => Some(Self::Minor),
            "dorian" => Some(Self::Dorian),
            "phrygian" => Some(Self::Phrygian),
            "lydian" => Some(Self::Lydian),
            "mixolydian" => Some(Self::Mixolydian),
            "blues" => Some(Self::Blues),
            "chromatic" => Some(Self::Chromatic),
            _ => None,
        }
    }

    /// Semitone intervals from the root, ascending, always starting at 0.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Scale::Pentatonic => &[0, 2, 4, 7, 9],
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Scale::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    /// Number of degrees per octave.
    #[inline]
    pub fn degree_count(self) -> usize {
        self.intervals().len()
    }

    /// Scale degree for a column index, wrapping per octave.
    #[inline]
    pub fn degree(self, index: usize) -> u8 {
        let intervals = self.intervals();
        intervals[index % intervals.len()]
    }
}

/// Register the generated pitches are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteRange {
    Low,
    #[default]
    Mid,
    High,
}

impl NoteRange {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "mid" => Some(Self::Mid),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Root notes (MIDI numbers) of each octave in this range, lowest first.
    pub fn base_notes(self) -> &'static [u8] {
        match self {
            NoteRange::Low => &[36, 48],
            NoteRange::Mid => &[48, 60, 72],
            NoteRange::High => &[72, 84],
        }
    }

    /// Root that pitch offsets are added to.
    #[inline]
    pub fn base_note(self) -> u8 {
        self.base_notes()[0]
    }
}
