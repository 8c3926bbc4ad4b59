//! Configuration types for sequence generation.
//!
//! [`GeneratorConfig`] is the wire form: every field is optional on input,
//! names are free strings and numbers are signed so that bad values survive
//! deserialization and can be reported. [`GeneratorConfig::resolve`] turns
//! it into an immutable [`ResolvedConfig`], substituting the documented
//! default for anything invalid instead of failing.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_DENSITY, GenerationMode, InitialCondition, NoteRange, Scale, VelocityMap};

/// Default elementary rule.
pub const DEFAULT_RULE: u8 = 30;
/// Default grid width and height.
pub const DEFAULT_DIMENSION: usize = 16;
/// Largest accepted grid width or height.
pub const MAX_DIMENSION: usize = 256;
/// Default number of iterations / generations.
pub const DEFAULT_STEPS: usize = 32;
/// Largest accepted number of iterations / generations.
pub const MAX_STEPS: usize = 4096;
/// Default tempo; each step is one sixteenth note.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;
/// Largest accepted tempo.
pub const MAX_TEMPO_BPM: f64 = 999.0;

/// Raw generator configuration as read from JSON or the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// `oneD` or `lifeLike`.
    pub mode: String,
    /// Elementary rule number (0-255).
    pub rule: i64,
    /// Grid width in cells.
    pub width: i64,
    /// Grid height in cells (2-D only).
    pub height: i64,
    /// `center`, `single`, `random`, `glider` or `custom`.
    pub initial_condition: String,
    /// Live probability for the `random` initial condition.
    pub density: f64,
    /// Live cells as (x, y) for the `custom` initial condition.
    pub custom_cells: Vec<(i64, i64)>,
    /// Evolution steps for the 2-D automaton.
    pub iterations: i64,
    /// Rows produced by the 1-D automaton, including the seed row.
    pub generations: i64,
    /// `linear`, `distance`, `random` or `cellular`.
    pub velocity_map: String,
    /// Scale name, see [`Scale`].
    pub scale: String,
    /// `low`, `mid` or `high`.
    pub note_range: String,
    /// Apply pulse gating and accents after mapping.
    pub rhythmic_filter_enabled: bool,
    /// Let cell births and deaths override velocity in 2-D mode.
    pub emphasize_births: bool,
    /// Tempo used to derive step timestamps.
    pub tempo_bpm: f64,
    /// Seed for every random decision; entropy when absent.
    pub random_seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: "oneD".to_string(),
            rule: DEFAULT_RULE as i64,
            width: DEFAULT_DIMENSION as i64,
            height: DEFAULT_DIMENSION as i64,
            initial_condition: "center".to_string(),
            density: DEFAULT_DENSITY,
            custom_cells: Vec::new(),
            iterations: DEFAULT_STEPS as i64,
            generations: DEFAULT_STEPS as i64,
            velocity_map: "linear".to_string(),
            scale: "pentatonic".to_string(),
            note_range: "mid".to_string(),
            rhythmic_filter_enabled: false,
            emphasize_births: false,
            tempo_bpm: DEFAULT_TEMPO_BPM,
            random_seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Report the first invalid field, if any.
    ///
    /// Generation never requires this to pass; it exists for callers that
    /// want to surface configuration mistakes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.issues().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every invalid field, in declaration order.
    pub fn issues(&self) -> Vec<ConfigError> {
        [
            self.parse_mode().err(),
            self.parse_rule().err(),
            self.parse_dimension("width", self.width).err(),
            self.parse_dimension("height", self.height).err(),
            self.parse_density().err(),
            self.parse_initial_condition(self.density_fallback()).err(),
            self.parse_count("iterations", self.iterations).err(),
            self.parse_count("generations", self.generations).err(),
            self.parse_velocity_map().err(),
            self.parse_scale().err(),
            self.parse_note_range().err(),
            self.parse_tempo().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Resolve into closed option types, falling back to defaults for any
    /// invalid field.
    pub fn resolve(&self) -> ResolvedConfig {
        let density = or_fallback(self.parse_density(), self.density_fallback());
        let initial_condition = or_fallback(
            self.parse_initial_condition(density),
            InitialCondition::default(),
        );

        ResolvedConfig {
            mode: or_fallback(self.parse_mode(), GenerationMode::default()),
            rule: or_fallback(self.parse_rule(), DEFAULT_RULE),
            width: or_fallback(self.parse_dimension("width", self.width), DEFAULT_DIMENSION),
            height: or_fallback(
                self.parse_dimension("height", self.height),
                DEFAULT_DIMENSION,
            ),
            initial_condition,
            iterations: or_fallback(
                self.parse_count("iterations", self.iterations),
                DEFAULT_STEPS,
            ),
            generations: or_fallback(
                self.parse_count("generations", self.generations),
                DEFAULT_STEPS,
            ),
            velocity_map: or_fallback(self.parse_velocity_map(), VelocityMap::default()),
            scale: or_fallback(self.parse_scale(), Scale::default()),
            note_range: or_fallback(self.parse_note_range(), NoteRange::default()),
            rhythmic_filter_enabled: self.rhythmic_filter_enabled,
            emphasize_births: self.emphasize_births,
            tempo_bpm: or_fallback(self.parse_tempo(), self.tempo_fallback()),
            random_seed: self.random_seed,
        }
    }

    fn parse_mode(&self) -> Result<GenerationMode, ConfigError> {
        GenerationMode::from_name(&self.mode)
            .ok_or_else(|| ConfigError::UnknownMode(self.mode.clone()))
    }

    fn parse_rule(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.rule).map_err(|_| ConfigError::RuleOutOfRange(self.rule))
    }

    fn parse_dimension(&self, field: &'static str, value: i64) -> Result<usize, ConfigError> {
        let size =
            usize::try_from(value).map_err(|_| ConfigError::InvalidDimension { field, value })?;
        if size > MAX_DIMENSION {
            log::debug!("{field} = {size} clamped to {MAX_DIMENSION}");
        }
        Ok(size.min(MAX_DIMENSION))
    }

    fn parse_count(&self, field: &'static str, value: i64) -> Result<usize, ConfigError> {
        let count = usize::try_from(value).map_err(|_| ConfigError::InvalidCount { field, value })?;
        if count > MAX_STEPS {
            log::debug!("{field} = {count} clamped to {MAX_STEPS}");
        }
        Ok(count.min(MAX_STEPS))
    }

    fn parse_density(&self) -> Result<f64, ConfigError> {
        if (0.0..=1.0).contains(&self.density) {
            Ok(self.density)
        } else {
            Err(ConfigError::InvalidDensity(self.density))
        }
    }

    fn density_fallback(&self) -> f64 {
        if self.density.is_finite() {
            self.density.clamp(0.0, 1.0)
        } else {
            DEFAULT_DENSITY
        }
    }

    fn parse_initial_condition(&self, density: f64) -> Result<InitialCondition, ConfigError> {
        let cells: Vec<(usize, usize)> = self
            .custom_cells
            .iter()
            .filter_map(|&(x, y)| Some((usize::try_from(x).ok()?, usize::try_from(y).ok()?)))
            .collect();
        InitialCondition::from_name(&self.initial_condition, density, &cells)
            .ok_or_else(|| ConfigError::UnknownInitialCondition(self.initial_condition.clone()))
    }

    fn parse_velocity_map(&self) -> Result<VelocityMap, ConfigError> {
        VelocityMap::from_name(&self.velocity_map)
            .ok_or_else(|| ConfigError::UnknownVelocityMap(self.velocity_map.clone()))
    }

    fn parse_scale(&self) -> Result<Scale, ConfigError> {
        Scale::from_name(&self.scale).ok_or_else(|| ConfigError::UnknownScale(self.scale.clone()))
    }

    fn parse_note_range(&self) -> Result<NoteRange, ConfigError> {
        NoteRange::from_name(&self.note_range)
            .ok_or_else(|| ConfigError::UnknownNoteRange(self.note_range.clone()))
    }

    fn parse_tempo(&self) -> Result<f64, ConfigError> {
        if self.tempo_bpm >= 1.0 && self.tempo_bpm <= MAX_TEMPO_BPM {
            Ok(self.tempo_bpm)
        } else {
            Err(ConfigError::InvalidTempo(self.tempo_bpm))
        }
    }

    fn tempo_fallback(&self) -> f64 {
        if self.tempo_bpm.is_finite() && self.tempo_bpm > 0.0 {
            self.tempo_bpm.clamp(1.0, MAX_TEMPO_BPM)
        } else {
            DEFAULT_TEMPO_BPM
        }
    }
}

fn or_fallback<T: fmt::Debug>(result: Result<T, ConfigError>, fallback: T) -> T {
    result.unwrap_or_else(|err| {
        log::warn!("{err}; using {fallback:?}");
        fallback
    })
}

/// Validated configuration. Immutable once built; returned with every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub mode: GenerationMode,
    pub rule: u8,
    pub width: usize,
    pub height: usize,
    pub initial_condition: InitialCondition,
    pub iterations: usize,
    pub generations: usize,
    pub velocity_map: VelocityMap,
    pub scale: Scale,
    pub note_range: NoteRange,
    pub rhythmic_filter_enabled: bool,
    pub emphasize_births: bool,
    pub tempo_bpm: f64,
    pub random_seed: Option<u64>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        GeneratorConfig::default().resolve()
    }
}

impl ResolvedConfig {
    /// Duration of one sixteenth-note step in milliseconds.
    #[inline]
    pub fn step_duration_ms(&self) -> f64 {
        60_000.0 / (self.tempo_bpm * 4.0)
    }

    /// Parameters consumed by the note mapper.
    pub fn mapping(&self) -> MappingParams {
        MappingParams {
            scale: self.scale,
            note_range: self.note_range,
            velocity_map: self.velocity_map,
            emphasize_births: self.emphasize_births,
            step_duration_ms: self.step_duration_ms(),
        }
    }
}

/// Pitch, velocity and timing policy for the note mapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingParams {
    pub scale: Scale,
    pub note_range: NoteRange,
    pub velocity_map: VelocityMap,
    pub emphasize_births: bool,
    /// Step length; also the duration given to each note.
    pub step_duration_ms: f64,
}

impl Default for MappingParams {
    fn default() -> Self {
        ResolvedConfig::default().mapping()
    }
}

/// Configuration problems. Resolution replaces the offending value with
/// its default; these are only ever surfaced as warnings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown mode `{0}`")]
    UnknownMode(String),
    #[error("Rule {0} is outside 0-255")]
    RuleOutOfRange(i64),
    #[error("Grid {field} must not be negative (got {value})")]
    InvalidDimension { field: &'static str, value: i64 },
    #[error("{field} must not be negative (got {value})")]
    InvalidCount { field: &'static str, value: i64 },
    #[error("Density {0} must be within 0.0-1.0")]
    InvalidDensity(f64),
    #[error("Unknown initial condition `{0}`")]
    UnknownInitialCondition(String),
    #[error("Unknown velocity map `{0}`")]
    UnknownVelocityMap(String),
    #[error("Unknown scale `{0}`")]
    UnknownScale(String),
    #[error("Unknown note range `{0}`")]
    UnknownNoteRange(String),
    #[error("Tempo {0} must be within 1-999 BPM")]
    InvalidTempo(f64),
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve_cleanly() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());

        let resolved = config.resolve();
        assert_eq!(resolved.mode, GenerationMode::OneD);
        assert_eq!(resolved.rule, 30);
        assert_eq!(resolved.width, 16);
        assert_eq!(resolved.height, 16);
        assert_eq!(resolved.iterations, 32);
        assert_eq!(resolved.generations, 32);
        assert_eq!(resolved.scale, Scale::Pentatonic);
        assert_eq!(resolved.note_range, NoteRange::Mid);
        assert_eq!(resolved.velocity_map, VelocityMap::Linear);
        assert_eq!(resolved.initial_condition, InitialCondition::Center);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GeneratorConfig::from_json(
            r#"{"mode": "lifeLike", "width": 10, "initialCondition": "glider"}"#,
        )
        .unwrap();
        let resolved = config.resolve();
        assert_eq!(resolved.mode, GenerationMode::LifeLike);
        assert_eq!(resolved.width, 10);
        assert_eq!(resolved.height, 16);
        assert_eq!(resolved.initial_condition, InitialCondition::Glider);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = GeneratorConfig {
            mode: "hexagonal".to_string(),
            rule: 300,
            width: -4,
            iterations: -1,
            generations: 1_000_000,
            scale: "klingon".to_string(),
            note_range: "subsonic".to_string(),
            velocity_map: "psychic".to_string(),
            initial_condition: "spiral".to_string(),
            density: 7.0,
            tempo_bpm: f64::NAN,
            ..Default::default()
        };

        assert!(config.validate().is_err());
        assert_eq!(config.issues().len(), 10);

        let resolved = config.resolve();
        assert_eq!(resolved.mode, GenerationMode::OneD);
        assert_eq!(resolved.rule, DEFAULT_RULE);
        assert_eq!(resolved.width, DEFAULT_DIMENSION);
        assert_eq!(resolved.iterations, DEFAULT_STEPS);
        assert_eq!(resolved.generations, MAX_STEPS);
        assert_eq!(resolved.scale, Scale::Pentatonic);
        assert_eq!(resolved.note_range, NoteRange::Mid);
        assert_eq!(resolved.velocity_map, VelocityMap::Linear);
        assert_eq!(resolved.initial_condition, InitialCondition::Center);
        assert_eq!(resolved.tempo_bpm, DEFAULT_TEMPO_BPM);
    }

    #[test]
    fn test_oversized_dimensions_clamp() {
        let config = GeneratorConfig {
            width: 10_000,
            height: 257,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let resolved = config.resolve();
        assert_eq!(resolved.width, MAX_DIMENSION);
        assert_eq!(resolved.height, MAX_DIMENSION);

        let negative = GeneratorConfig {
            height: -1,
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ConfigError::InvalidDimension { field: "height", value: -1 })
        ));
        assert_eq!(negative.resolve().height, DEFAULT_DIMENSION);
    }

    #[test]
    fn test_random_condition_carries_clamped_density() {
        let config = GeneratorConfig {
            initial_condition: "random".to_string(),
            density: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.resolve().initial_condition,
            InitialCondition::Random { density: 1.0 }
        );
    }

    #[test]
    fn test_custom_cells_drop_negative_coordinates() {
        let config = GeneratorConfig {
            initial_condition: "custom".to_string(),
            custom_cells: vec![(1, 2), (-1, 0), (3, -3)],
            ..Default::default()
        };
        assert_eq!(
            config.resolve().initial_condition,
            InitialCondition::Custom {
                cells: vec![(1, 2)]
            }
        );
    }

    #[test]
    fn test_step_duration() {
        let resolved = GeneratorConfig {
            tempo_bpm: 60.0,
            ..Default::default()
        }
        .resolve();
        assert!((resolved.step_duration_ms() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let err = GeneratorConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_resolved_config_round_trips() {
        let resolved = GeneratorConfig::default().resolve();
        let json = serde_json::to_string(&resolved).unwrap();
        let back: ResolvedConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resolved);
    }
}
