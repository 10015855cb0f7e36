//! WebAssembly bindings for inspecting merge-mined block headers.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Decoding headers (with or without AuxPoW) from hex
//! - Computing identity and proof-of-work hashes
//! - Measuring the header prefix of a larger raw buffer

use wasm_bindgen::prelude::*;

pub mod inspect;

// Re-export main types for JS access
pub use inspect::HeaderInspector;

/// Module start hook: routes Rust panics to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version of the header inspector bindings.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
