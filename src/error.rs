//! Error types for the edges of the crate: configuration loading and the
//! browser host. The round controller itself never fails.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Rejected `RoundConfig` values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("round duration must be positive, got {0}s")]
    NonPositiveDuration(f64),
    #[error("target size range invalid: start {start}px, end {end}px")]
    SizeRange { start: f64, end: f64 },
    #[error("margin must be non-negative, got {0}px")]
    NegativeMargin(f64),
    #[error("tick interval must be at least 1ms")]
    ZeroInterval,
    #[error("tick interval of {0}ms exceeds the browser timer limit")]
    IntervalTooLong(u32),
}

/// Failures while wiring the game into the page.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("missing element #{0}")]
    MissingElement(&'static str),
    #[error("element #{0} is not an HtmlElement")]
    NotHtmlElement(&'static str),
    #[error("javascript error: {0}")]
    Js(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<JsValue> for HostError {
    fn from(value: JsValue) -> Self {
        HostError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<HostError> for JsValue {
    fn from(err: HostError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_render_readable_messages() {
        let err = ConfigError::SizeRange { start: 40.0, end: 80.0 };
        assert_eq!(err.to_string(), "target size range invalid: start 40px, end 80px");
        let host: HostError = err.into();
        assert!(host.to_string().contains("start 40px"));
    }

    #[test]
    fn missing_element_names_the_id() {
        assert_eq!(HostError::MissingElement("stage").to_string(), "missing element #stage");
    }
}
