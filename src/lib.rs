pub mod builder;
pub mod config;
pub mod generator;
pub mod mapping;
pub mod normalizer;
pub mod parser;
pub mod payload;
pub mod render;
pub mod schema;

use wasm_bindgen::prelude::*;

use builder::SchemaFactory;
use parser::decode_payload;
use render::{PackagedTemplates, render_artifacts};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render models and migrations for a parsed schema.
///
/// Accepts either a raw `@dbml/core` export or a normalized payload and
/// returns a JSON array with one entry per table.
#[wasm_bindgen(js_name = "renderLaravel")]
pub fn render_laravel(payload_json: &str) -> Result<String, String> {
    let payload = decode_payload(payload_json).map_err(|e| e.to_string())?;
    let schema = SchemaFactory::from_payload(&payload);
    let artifacts = render_artifacts(&schema, &PackagedTemplates);

    serde_json::to_string(&artifacts).map_err(|e| e.to_string())
}
