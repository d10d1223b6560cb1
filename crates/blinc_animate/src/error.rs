//! Error types for blinc_animate

use thiserror::Error;

/// Errors produced while interpreting property names, values and styles
///
/// The runtime surface never returns these to callers; they are logged and
/// replaced by a documented fallback. Parsing entry points return them so
/// callers that want strictness can have it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimateError {
    /// A property name outside the animatable vocabulary
    #[error("unsupported property: {0}")]
    UnsupportedProperty(String),

    /// A scalar given for a vector property, or the other way round
    #[error("property {property} expects {expected}, got {found}")]
    KindMismatch {
        property: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A style fragment that could not be decoded
    #[error("malformed style {key}: {value:?}")]
    MalformedStyle { key: String, value: String },
}

/// Result type for blinc_animate operations
pub type Result<T> = std::result::Result<T, AnimateError>;
