//! WebAssembly bindings for Imprint.
//!
//! The browser performs the upload itself; these bindings give the page the
//! same media-type rule and the same signal fusion as the native pipeline, so
//! a verdict computed in the browser matches one computed by the CLI.

use imprint_core::{fuse, is_image_media_type, parse_analysis_body, VerificationVerdict};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Failure payload returned to JavaScript.
#[derive(Serialize)]
struct FusionError {
    /// Message to show the user
    error: String,
    /// Error category, for diagnostics
    kind: &'static str,
}

/// Whether a `File.type` value may be staged for analysis.
#[wasm_bindgen]
pub fn is_image_media_type_wasm(media_type: &str) -> bool {
    is_image_media_type(media_type)
}

/// Turn the analysis service's HTTP status and body into a verdict.
///
/// # Arguments
/// * `status` - HTTP status of the analysis response
/// * `body` - Raw response body
///
/// # Returns
/// A JSON string: the verdict, or `{"error": ..., "kind": ...}`
#[wasm_bindgen]
pub fn fuse_response_wasm(status: u16, body: &str) -> String {
    match fuse_internal(status, body) {
        Ok(verdict) => serde_json::to_string(&verdict).unwrap_or_else(|e| {
            format!(r#"{{"error":"Serialization error: {}","kind":"internal"}}"#, e)
        }),
        Err(failure) => serde_json::to_string(&failure).unwrap_or_else(|_| {
            r#"{"error":"Unknown error","kind":"internal"}"#.to_string()
        }),
    }
}

fn fuse_internal(status: u16, body: &str) -> Result<VerificationVerdict, FusionError> {
    parse_analysis_body(status, body.as_bytes())
        .map(|signals| fuse(&signals))
        .map_err(|e| FusionError {
            error: e.user_message(),
            kind: e.kind().as_str(),
        })
}

/// Get the library version.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
