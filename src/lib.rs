pub mod analysis;
pub mod config;
pub mod detect;
pub mod keys;
pub mod measure;
pub mod model;
pub mod normalizer;
pub mod report;
pub mod sql;
pub mod structure;
pub mod vocabulary;

use wasm_bindgen::prelude::*;

pub use config::{ConfigError, NormalizerConfig};
pub use normalizer::{NormalizationResult, NormalizeError, Normalizer, Stage};

/// Normalize CSV text with the default configuration.
pub fn normalize(csv: &str) -> Result<NormalizationResult, NormalizeError> {
    normalize_with(csv, &NormalizerConfig::default())
}

pub fn normalize_with(
    csv: &str,
    config: &NormalizerConfig,
) -> Result<NormalizationResult, NormalizeError> {
    Normalizer::new(config).normalize(csv)
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Normalize CSV text and return the result as JSON.
///
/// `config` is an optional JSON object; missing fields keep their defaults.
#[wasm_bindgen(js_name = "normalizeCsv")]
pub fn normalize_csv(csv: &str, config: Option<String>) -> Result<String, JsValue> {
    let config = match config.as_deref() {
        Some(json) => NormalizerConfig::from_json(json).map_err(js_error)?,
        None => NormalizerConfig::default(),
    };
    let result = normalize_with(csv, &config).map_err(js_error)?;
    serde_json::to_string(&result).map_err(js_error)
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
