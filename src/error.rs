//! All error types for the locale-link crate.
//!
//! These are returned from configuration resolution and from the render-time
//! link glue. Link rewriting itself is infallible.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid language `{0}`")]
    InvalidLanguage(String),

    #[error("malformed href: {0}")]
    MalformedHref(String),

    #[error("invalid prop: {0}")]
    InvalidProp(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates a new malformed href error.
    pub fn malformed_href(message: impl Into<String>) -> Self {
        Error::MalformedHref(message.into())
    }
}
