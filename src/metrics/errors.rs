//! Error types for `metrics` module

/// Errors for turning raw input into an [`crate::metrics::EventMetrics`]
#[derive(Debug, thiserror::Error, Clone, Copy, Eq, PartialEq)]
pub enum ParseError {
    /// Parse failure given in text
    #[error("parse failure: {0}")]
    Raw(&'static str),
}
