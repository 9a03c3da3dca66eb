//! Error types for the PDF sanitization engine.
//! Author: kartik6717

use thiserror::Error;

/// Internal result type used by the components that can fail in a way the
/// orchestrator needs to distinguish. The public `sanitize` entry point
/// never returns this type — it recovers every variant into a
/// [`crate::report::SanitizeReport`] warning instead.
pub type Result<T> = std::result::Result<T, SanitizeError>;

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("PDF structure error: {0}")]
    Structure(#[from] lopdf::Error),

    #[error("rewrite span exceeds target length ({got} > {max})")]
    SpanTooLong { got: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}
