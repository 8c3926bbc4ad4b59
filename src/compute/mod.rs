//! Compute module - Automaton evolution, analysis and note mapping.

mod analysis;
mod generator;
mod grid;
mod mapper;
mod rhythm;
mod rules;

pub use analysis::*;
pub use generator::*;
pub use grid::*;
pub use mapper::*;
pub use rhythm::*;
pub use rules::*;
