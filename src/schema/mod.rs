//! Schema module - Configuration, seeding and lookup tables for sequence generation.

mod config;
mod scale;
mod seed;

pub use config::*;
pub use scale::*;
pub use seed::*;
