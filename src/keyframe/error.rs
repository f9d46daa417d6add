// src/keyframe/error.rs
use thiserror::Error;

/// Load-time configuration errors. None of these are recoverable once a model
/// has been spawned; the plugin that hit one installs nothing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("XML error: {0}")]
    Xml(String),

    #[error("missing required element <{element}> in {context}")]
    MissingElement {
        element: &'static str,
        context: String,
    },

    /// A keyframe node lacks one of `t`, `x`, `y`, `z`, `o`.
    #[error("keyframe #{index} <{node}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        index: usize,
        node: String,
        attribute: &'static str,
    },

    /// Only raised under [`NumericPolicy::Strict`](super::parser::NumericPolicy).
    #[error("attribute '{attribute}' on <{node}> is not a number: {value:?}")]
    InvalidNumber {
        node: String,
        attribute: String,
        value: String,
    },

    #[error("unknown numeric policy {0:?} (expected \"lenient\" or \"strict\")")]
    InvalidPolicy(String),

    #[error("invalid value for '{attribute}' on <{element}>: {message}")]
    InvalidValue {
        attribute: &'static str,
        element: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for ConfigError {
    fn from(err: quick_xml::Error) -> Self {
        ConfigError::Xml(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
