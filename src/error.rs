//! Error types
//!
//! The simulation itself never fails; errors only come from configuration
//! parsing and host mounting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JellyError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("host error: {0}")]
    Host(String),
}

impl JellyError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<JellyError> for wasm_bindgen::JsValue {
    fn from(err: JellyError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
