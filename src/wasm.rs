//! WebAssembly bindings for Cellular Sequencer.
//!
//! Provides thin wrappers around `CellularGenerator` for browser environments.

use wasm_bindgen::prelude::*;

use crate::{
    compute::{CellularGenerator, SequenceGenerator, generate},
    schema::GeneratorConfig,
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

fn parse_config(config_json: &str) -> Result<GeneratorConfig, JsValue> {
    GeneratorConfig::from_json(config_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Generate a complete sequence from a JSON configuration.
///
/// Returns `{ steps, cellChanges, analysis, history, config }`.
#[wasm_bindgen(js_name = generateSequence)]
pub fn generate_sequence(config_json: &str) -> Result<JsValue, JsValue> {
    let config = parse_config(config_json)?;
    to_js(&generate(&config))
}

/// Check a JSON configuration, returning every problem found.
///
/// Invalid fields never stop generation; this is for surfacing mistakes in
/// the UI.
#[wasm_bindgen(js_name = validateConfig)]
pub fn validate_config(config_json: &str) -> Result<Vec<String>, JsValue> {
    let config = parse_config(config_json)?;
    Ok(config.issues().iter().map(ToString::to_string).collect())
}

/// Get the default configuration as JSON.
#[wasm_bindgen(js_name = defaultConfig)]
pub fn default_config() -> Result<JsValue, JsValue> {
    to_js(&GeneratorConfig::default())
}

/// WebAssembly wrapper holding a generator between calls.
#[wasm_bindgen]
pub struct WasmSequencer {
    generator: CellularGenerator,
}

#[wasm_bindgen]
impl WasmSequencer {
    /// Create a sequencer from JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmSequencer, JsValue> {
        let config = parse_config(config_json)?;
        Ok(WasmSequencer {
            generator: CellularGenerator::from_config(&config),
        })
    }

    /// Run the full pipeline and return the sequence with its analysis.
    #[wasm_bindgen]
    pub fn run(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.generator.run())
    }

    /// Run the pipeline and return only the note steps.
    #[wasm_bindgen(js_name = generateSteps)]
    pub fn generate_steps(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.generator.generate())
    }

    /// Replace the configuration.
    #[wasm_bindgen]
    pub fn reconfigure(&mut self, config_json: &str) -> Result<(), JsValue> {
        let config = parse_config(config_json)?;
        self.generator = CellularGenerator::from_config(&config);
        Ok(())
    }

    /// Get the resolved configuration in use.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsValue> {
        to_js(self.generator.config())
    }

    /// Get the retained generation history of the last run.
    #[wasm_bindgen(js_name = getHistory)]
    pub fn get_history(&self) -> Result<JsValue, JsValue> {
        to_js(self.generator.state().history())
    }

    /// Get the number of generations committed in the last run.
    #[wasm_bindgen(js_name = getStep)]
    pub fn get_step(&self) -> u64 {
        self.generator.state().step()
    }

    #[wasm_bindgen]
    pub fn name(&self) -> String {
        self.generator.name().to_string()
    }
}
