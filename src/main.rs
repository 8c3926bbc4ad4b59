//! Cellular Sequencer CLI - Generate note sequences from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::time::Instant;

use cellular_sequencer::{compute::CellularGenerator, schema::GeneratorConfig};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [seed]", args[0]);
        eprintln!();
        eprintln!("Generate a note sequence from a cellular automaton configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to generator configuration file");
        eprintln!("  seed         Random seed, overrides `randomSeed` in the file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let mut config = GeneratorConfig::load(&args[1]).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });

    if let Some(seed) = args.get(2) {
        match seed.parse() {
            Ok(seed) => config.random_seed = Some(seed),
            Err(e) => {
                eprintln!("Invalid seed `{}`: {}", seed, e);
                std::process::exit(1);
            }
        }
    }

    for issue in config.issues() {
        eprintln!("Warning: {}", issue);
    }

    let start = Instant::now();
    let mut generator = CellularGenerator::from_config(&config);
    let sequence = generator.run();
    let elapsed = start.elapsed();

    eprintln!(
        "{:?} {}x{}: {} steps, {} notes, complexity {:.3}, entropy {:.3} ({:.2}ms)",
        sequence.config.mode,
        sequence.config.width,
        sequence.config.height,
        sequence.steps.len(),
        sequence.total_notes(),
        sequence.analysis.complexity,
        sequence.analysis.entropy,
        elapsed.as_secs_f64() * 1000.0
    );

    match serde_json::to_string_pretty(&sequence) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing sequence: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_example_config() {
    let config = GeneratorConfig::default();

    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
