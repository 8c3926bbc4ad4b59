//! Cellular Sequencer - Note sequences from cellular automata.
//!
//! This crate evolves elementary (1-D) and life-like (2-D) cellular
//! automata and turns the resulting cell patterns into timed,
//! velocity-scaled note events for an audio/visual front end.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration types, seeding and musical lookup tables
//! - `compute`: Grid state, evolution rules, analysis, note mapping and
//!   the generation pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use cellular_sequencer::{
//!     compute::{CellularGenerator, SequenceGenerator},
//!     schema::GeneratorConfig,
//! };
//!
//! let config = GeneratorConfig {
//!     mode: "lifeLike".into(),
//!     width: 10,
//!     height: 10,
//!     initial_condition: "glider".into(),
//!     iterations: 4,
//!     ..Default::default()
//! };
//!
//! let mut generator = CellularGenerator::from_config(&config);
//! let sequence = generator.run();
//!
//! for step in &sequence.steps {
//!     println!("step {} at {}ms: {} notes", step.step_index, step.timestamp_ms, step.note_count());
//! }
//!
//! // Every call is independent.
//! let again = generator.generate();
//! println!("{} steps", again.len());
//! ```

pub mod compute;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{CellularGenerator, GeneratedSequence, NoteEvent, NoteStep, SequenceGenerator};
pub use schema::{GeneratorConfig, ResolvedConfig};
