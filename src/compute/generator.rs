//! Sequence generation driver.
//!
//! Runs the full pipeline for one configuration: seed the grid, evolve it,
//! analyze the retained history, map cells to notes and optionally apply
//! the rhythmic filter.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::schema::{GenerationMode, GeneratorConfig, ResolvedConfig};

use super::{
    CellChange, Grid, GridState, NoteMapper, NoteStep, PatternAnalysis, PatternAnalyzer,
    apply_rhythmic_filter, evolve_1d, evolve_grid, total_notes,
};

/// Offset mixed into the configured seed for the mapper's stream, so the
/// initial grid does not depend on how many velocities are drawn.
const MAPPER_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Common contract of every note-sequence generator.
pub trait SequenceGenerator {
    /// Stable identifier, e.g. for UI labels.
    fn name(&self) -> &'static str;

    /// Produce a complete sequence. Each call is independent.
    fn generate(&mut self) -> Vec<NoteStep>;
}

/// Everything produced by one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSequence {
    pub steps: Vec<NoteStep>,
    /// Birth/death records of a life-like run, in iteration order.
    pub cell_changes: Vec<CellChange>,
    pub analysis: PatternAnalysis,
    /// Retained generations, oldest first.
    pub history: Vec<Grid>,
    /// The configuration actually used.
    pub config: ResolvedConfig,
}

impl GeneratedSequence {
    #[inline]
    pub fn total_notes(&self) -> usize {
        total_notes(&self.steps)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Cellular automaton sequence generator.
///
/// Owns its grid state, analyzer and mapper. Not meant to be shared
/// between concurrent runs; use one instance per thread.
#[derive(Debug, Clone)]
pub struct CellularGenerator {
    config: ResolvedConfig,
    state: GridState,
    analyzer: PatternAnalyzer,
    mapper: NoteMapper,
    rng: StdRng,
}

impl CellularGenerator {
    pub fn new(config: ResolvedConfig) -> Self {
        let (rng, mapper_seed) = match config.random_seed {
            Some(seed) => (StdRng::seed_from_u64(seed), Some(seed ^ MAPPER_STREAM)),
            None => (StdRng::from_entropy(), None),
        };

        Self {
            state: GridState::new(config.width, config.height),
            analyzer: PatternAnalyzer::default(),
            mapper: NoteMapper::new(config.mapping(), mapper_seed),
            rng,
            config,
        }
    }

    /// Resolve `config`, falling back to defaults for invalid fields.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.resolve())
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Grid state left behind by the last run.
    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// Run the pipeline to completion.
    ///
    /// With a configured seed every call returns the same sequence.
    pub fn run(&mut self) -> GeneratedSequence {
        if self.config.random_seed.is_some() {
            *self = Self::new(self.config.clone());
        }

        let (steps, cell_changes, analysis) = match self.config.mode {
            GenerationMode::OneD => self.run_1d(),
            GenerationMode::LifeLike => self.run_life(),
        };

        let steps = if self.config.rhythmic_filter_enabled {
            apply_rhythmic_filter(steps, &analysis)
        } else {
            steps
        };

        log::debug!(
            "generated {} steps with {} notes (complexity {:.3}, entropy {:.3})",
            steps.len(),
            total_notes(&steps),
            analysis.complexity,
            analysis.entropy
        );

        GeneratedSequence {
            steps,
            cell_changes,
            analysis,
            history: self.state.history().iter().cloned().collect(),
            config: self.config.clone(),
        }
    }

    fn run_1d(&mut self) -> (Vec<NoteStep>, Vec<CellChange>, PatternAnalysis) {
        let initial = self.state.initialize_1d(
            self.config.width,
            &self.config.initial_condition,
            &mut self.rng,
        );
        let rows = evolve_1d(
            &initial,
            i64::from(self.config.rule),
            self.config.generations as i64,
        );
        log::debug!(
            "rule {} over {} cells: {} generations",
            self.config.rule,
            initial.len(),
            rows.len()
        );

        let generations: Vec<Grid> = rows.iter().map(|row| Grid::from_row(row)).collect();
        for generation in generations.iter().skip(1) {
            self.state.commit(generation.clone());
        }

        let analysis = self.analyzer.analyze(self.state.history());
        let steps = self.mapper.map_generations(&generations, &[]);
        (steps, Vec::new(), analysis)
    }

    fn run_life(&mut self) -> (Vec<NoteStep>, Vec<CellChange>, PatternAnalysis) {
        let seeded = self.state.initialize(
            self.config.width,
            self.config.height,
            &self.config.initial_condition,
            &mut self.rng,
        );
        log::debug!(
            "life grid {}x{} seeded with {} live cells (density {:.3})",
            seeded.width(),
            seeded.height(),
            seeded.live_count(),
            seeded.density()
        );

        let changes = evolve_grid(&mut self.state, self.config.iterations as i64);
        let analysis = self.analyzer.analyze(self.state.history());
        let steps = self.mapper.map_grid(self.state.current(), &changes);
        (steps, changes, analysis)
    }
}

impl SequenceGenerator for CellularGenerator {
    fn name(&self) -> &'static str {
        "cellularAutomaton"
    }

    fn generate(&mut self) -> Vec<NoteStep> {
        self.run().steps
    }
}

/// Generate one sequence from a raw configuration.
pub fn generate(config: &GeneratorConfig) -> GeneratedSequence {
    CellularGenerator::from_config(config).run()
}

/// Generate independent sequences, one per configuration, in order.
#[cfg(not(target_arch = "wasm32"))]
pub fn generate_batch(configs: &[GeneratorConfig]) -> Vec<GeneratedSequence> {
    configs.par_iter().map(generate).collect()
}

/// Sequential batch generation for WASM.
#[cfg(target_arch = "wasm32")]
pub fn generate_batch(configs: &[GeneratorConfig]) -> Vec<GeneratedSequence> {
    configs.iter().map(generate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{BIRTH_VELOCITY, ChangeKind, HISTORY_CAPACITY};
    use proptest::prelude::*;

    fn life_glider() -> GeneratorConfig {
        GeneratorConfig {
            mode: "lifeLike".into(),
            width: 10,
            height: 10,
            initial_condition: "glider".into(),
            iterations: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_glider_sequence_is_exact() {
        let sequence = generate(&life_glider());

        // After four iterations the glider has moved one cell diagonally.
        let rows: Vec<usize> = sequence.steps.iter().map(|s| s.step_index).collect();
        assert_eq!(rows, vec![3, 4, 5]);
        let counts: Vec<usize> = sequence.steps.iter().map(NoteStep::note_count).collect();
        assert_eq!(counts, vec![1, 1, 3]);
        assert_eq!(sequence.total_notes(), 5);
        assert_eq!(sequence.history.len(), 5);
        assert_eq!(sequence.cell_changes.len(), 16);
        assert!(sequence.analysis.complexity > 0.0);
    }

    #[test]
    fn test_one_d_defaults() {
        let sequence = generate(&GeneratorConfig::default());
        assert_eq!(sequence.steps.len(), 32);
        assert_eq!(sequence.history.len(), HISTORY_CAPACITY);
        assert!(sequence.cell_changes.is_empty());
        // Generation 0 is the single center cell.
        assert_eq!(sequence.steps[0].note_count(), 1);
        assert_eq!(sequence.steps[0].timestamp_ms, 0.0);
        assert_eq!(sequence.steps[1].timestamp_ms, 125.0);
    }

    #[test]
    fn test_history_capped_for_long_runs() {
        let sequence = generate(&GeneratorConfig {
            iterations: 50,
            ..life_glider()
        });
        assert_eq!(sequence.history.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = GeneratorConfig {
            initial_condition: "random".into(),
            velocity_map: "random".into(),
            random_seed: Some(7),
            ..life_glider()
        };
        let mut generator = CellularGenerator::from_config(&config);
        let first = generator.run();
        let second = generator.run();
        assert_eq!(first, second);
        assert_eq!(first, generate(&config));
    }

    #[test]
    fn test_velocity_strategy_does_not_change_the_grid() {
        let base = GeneratorConfig {
            initial_condition: "random".into(),
            random_seed: Some(11),
            ..life_glider()
        };
        let random = GeneratorConfig {
            velocity_map: "random".into(),
            ..base.clone()
        };
        assert_eq!(generate(&base).history, generate(&random).history);
    }

    #[test]
    fn test_emphasized_births_keep_live_cells_sounding() {
        let base = GeneratorConfig {
            mode: "lifeLike".into(),
            width: 16,
            height: 16,
            initial_condition: "random".into(),
            iterations: 32,
            random_seed: Some(3),
            ..Default::default()
        };
        let plain = generate(&base);
        let emphasized = generate(&GeneratorConfig {
            emphasize_births: true,
            ..base
        });

        let final_grid = emphasized.history.last().unwrap();
        assert_eq!(emphasized.total_notes(), final_grid.live_count());
        assert_eq!(emphasized.total_notes(), plain.total_notes());

        for note in emphasized.steps.iter().flat_map(|s| &s.notes) {
            let (x, y) = (note.column.unwrap(), note.row.unwrap());
            let born = emphasized
                .cell_changes
                .iter()
                .any(|c| c.x == x && c.y == y && c.kind == ChangeKind::Birth);
            if born {
                assert_eq!(note.velocity, BIRTH_VELOCITY);
            }
        }
    }

    #[test]
    fn test_invalid_config_still_generates() {
        let sequence = generate(&GeneratorConfig {
            mode: "hexagonal".into(),
            rule: 999,
            width: -4,
            generations: -1,
            scale: "klingon".into(),
            ..Default::default()
        });
        assert_eq!(sequence.config, ResolvedConfig::default());
        assert_eq!(sequence.steps.len(), 32);
    }

    #[test]
    fn test_zero_size_grid_is_empty() {
        let sequence = generate(&GeneratorConfig {
            width: 0,
            height: 0,
            ..life_glider()
        });
        assert!(sequence.is_empty());
        assert_eq!(sequence.analysis, PatternAnalysis::default());
    }

    #[test]
    fn test_rhythmic_filter_thins_sequence() {
        let plain = generate(&GeneratorConfig::default());
        let filtered = generate(&GeneratorConfig {
            rhythmic_filter_enabled: true,
            ..Default::default()
        });
        assert!(filtered.steps.len() <= plain.steps.len());
        assert!(filtered.steps.iter().all(|s| !s.is_rest()));
    }

    #[test]
    fn test_trait_object() {
        let mut generators: Vec<Box<dyn SequenceGenerator>> =
            vec![Box::new(CellularGenerator::from_config(&life_glider()))];
        assert_eq!(generators[0].name(), "cellularAutomaton");
        assert_eq!(generators[0].generate().len(), 3);
    }

    #[test]
    fn test_batch_preserves_order() {
        let configs = vec![life_glider(), GeneratorConfig::default()];
        let batch = generate_batch(&configs);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], generate(&configs[0]));
        assert_eq!(batch[1], generate(&configs[1]));
    }

    proptest! {
        #[test]
        fn prop_one_d_shape(rule in 0i64..=255, width in 0i64..40, generations in 0i64..40) {
            let sequence = generate(&GeneratorConfig {
                rule,
                width,
                generations,
                ..Default::default()
            });
            prop_assert_eq!(sequence.steps.len(), generations as usize);
            prop_assert!(sequence.history.len() <= HISTORY_CAPACITY);
            for grid in &sequence.history {
                prop_assert_eq!(grid.width(), width as usize);
            }
        }

        #[test]
        fn prop_velocities_in_range(
            seed in any::<u64>(),
            map in prop::sample::select(vec!["linear", "distance", "random", "cellular"]),
            mode in prop::sample::select(vec!["oneD", "lifeLike"]),
            emphasize in any::<bool>(),
            filter in any::<bool>(),
        ) {
            let sequence = generate(&GeneratorConfig {
                mode: mode.into(),
                width: 12,
                height: 12,
                initial_condition: "random".into(),
                iterations: 6,
                generations: 6,
                velocity_map: map.into(),
                emphasize_births: emphasize,
                rhythmic_filter_enabled: filter,
                random_seed: Some(seed),
                ..Default::default()
            });
            for step in &sequence.steps {
                for note in &step.notes {
                    prop_assert!((1..=127).contains(&note.velocity));
                    prop_assert!(note.pitch <= 127);
                }
            }
        }
    }
}
