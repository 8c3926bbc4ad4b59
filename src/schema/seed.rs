//! Initial conditions for seeding automaton runs.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Live probability used by `random` when no density is configured.
pub const DEFAULT_DENSITY: f64 = 0.3;

/// Glider cells relative to its anchor, south-east heading.
pub const GLIDER: [(usize, usize); 5] = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];

/// How the first generation is populated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InitialCondition {
    /// Single live cell in the middle.
    #[default]
    Center,
    /// Single live cell at the origin (1-D only; 2-D treats it as `Center`).
    Single,
    /// Each cell independently live with probability `density`.
    Random {
        /// Live probability in [0, 1].
        density: f64,
    },
    /// Glider anchored at a quarter of each dimension (2-D only; 1-D treats it as `Center`).
    Glider,
    /// Explicit live cells as (x, y); out-of-bounds entries are ignored.
    Custom {
        cells: Vec<(usize, usize)>,
    },
}

impl InitialCondition {
    /// Look up a condition by its configuration name.
    ///
    /// `density` and `cells` parameterize the variants that need them.
    pub fn from_name(name: &str, density: f64, cells: &[(usize, usize)]) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "center" | "centre" => Some(Self::Center),
            "single" => Some(Self::Single),
            "random" => Some(Self::Random { density }),
            "glider" => Some(Self::Glider),
            "custom" => Some(Self::Custom {
                cells: cells.to_vec(),
            }),
            _ => None,
        }
    }

    /// Generate a flat row-major `width * height` grid of 0/1 cells.
    pub fn generate<R: Rng + ?Sized>(&self, width: usize, height: usize, rng: &mut R) -> Vec<u8> {
        let mut cells = vec![0u8; width * height];
        if cells.is_empty() {
            return cells;
        }

        match self {
            InitialCondition::Random { density } => {
                apply_noise(&mut cells, *density, rng);
            }
            InitialCondition::Glider => {
                apply_glider(&mut cells, width, height);
            }
            InitialCondition::Custom { cells: live } => {
                for &(x, y) in live {
                    if x < width && y < height {
                        cells[y * width + x] = 1;
                    }
                }
            }
            InitialCondition::Center | InitialCondition::Single => {
                cells[(height / 2) * width + width / 2] = 1;
            }
        }

        cells
    }

    /// Generate a single row of `width` cells for elementary automata.
    pub fn generate_row<R: Rng + ?Sized>(&self, width: usize, rng: &mut R) -> Vec<u8> {
        let mut row = vec![0u8; width];
        if row.is_empty() {
            return row;
        }

        match self {
            InitialCondition::Single => row[0] = 1,
            InitialCondition::Random { density } => apply_noise(&mut row, *density, rng),
            InitialCondition::Custom { cells } => {
                for &(x, _) in cells {
                    if x < width {
                        row[x] = 1;
                    }
                }
            }
            InitialCondition::Center | InitialCondition::Glider => row[width / 2] = 1,
        }

        row
    }
}

fn apply_noise<R: Rng + ?Sized>(cells: &mut [u8], density: f64, rng: &mut R) {
    let density = if density.is_finite() {
        density.clamp(0.0, 1.0)
    } else {
        DEFAULT_DENSITY
    };
    for cell in cells.iter_mut() {
        *cell = u8::from(rng.gen_bool(density));
    }
}

/// Places the glider, or leaves the grid dead if it would not fit.
fn apply_glider(cells: &mut [u8], width: usize, height: usize) {
    let ax = width / 4;
    let ay = height / 4;
    if ax + 3 > width || ay + 3 > height {
        return;
    }
    for &(dx, dy) in &GLIDER {
        cells[(ay + dy) * width + ax + dx] = 1;
    }
}
