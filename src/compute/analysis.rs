//! Complexity and entropy metrics over a generation history.
//!
//! Both metrics depend only on per-generation change counts and live-cell
//! densities, never on coordinates, so they are unaffected by translating
//! or rotating every generation alike.

use serde::{Deserialize, Serialize};

use super::Grid;

/// Default number of density bins for the entropy estimate.
pub const DENSITY_BINS: usize = 10;

/// Summary metrics for one run, both in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternAnalysis {
    /// Mean fraction of cells flipping between consecutive generations.
    pub complexity: f32,
    /// Normalized Shannon entropy of the binned live-cell densities.
    pub entropy: f32,
}

/// Computes [`PatternAnalysis`] from a history of grids.
#[derive(Debug, Clone, Copy)]
pub struct PatternAnalyzer {
    bins: usize,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self { bins: DENSITY_BINS }
    }
}

impl PatternAnalyzer {
    /// Analyzer with a custom bin count (at least 2).
    pub fn with_bins(bins: usize) -> Self {
        Self { bins: bins.max(2) }
    }

    /// Analyze generations ordered oldest first. Fewer than two
    /// generations yield zero for both metrics.
    pub fn analyze<'a, I>(&self, history: I) -> PatternAnalysis
    where
        I: IntoIterator<Item = &'a Grid>,
    {
        let generations: Vec<&Grid> = history.into_iter().collect();
        if generations.len() < 2 {
            return PatternAnalysis::default();
        }

        PatternAnalysis {
            complexity: change_rate(&generations),
            entropy: self.density_entropy(&generations),
        }
    }

    fn density_entropy(&self, generations: &[&Grid]) -> f32 {
        let mut histogram = vec![0usize; self.bins];
        for grid in generations {
            let bin = match grid.cell_count() {
                0 => 0,
                cells => grid.live_count() * self.bins / cells,
            };
            histogram[bin.min(self.bins - 1)] += 1;
        }

        let total = generations.len() as f32;
        let entropy: f32 = histogram
            .iter()
            .filter(|&&count| count > 0)
            .map(|&count| {
                let p = count as f32 / total;
                -p * p.log2()
            })
            .sum();

        (entropy / (self.bins as f32).log2()).clamp(0.0, 1.0)
    }
}

/// Convenience wrapper using the default bin count.
pub fn analyze_complexity<'a, I>(history: I) -> PatternAnalysis
where
    I: IntoIterator<Item = &'a Grid>,
{
    PatternAnalyzer::default().analyze(history)
}

fn change_rate(generations: &[&Grid]) -> f32 {
    let pairs = generations.len() - 1;
    let sum: f32 = generations
        .windows(2)
        .map(|pair| {
            let cells = pair[0].cell_count().max(pair[1].cell_count());
            if cells == 0 {
                0.0
            } else {
                pair[0].diff_count(pair[1]) as f32 / cells as f32
            }
        })
        .sum();
    (sum / pairs as f32).clamp(0.0, 1.0)
}
