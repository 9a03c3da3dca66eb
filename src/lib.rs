//! PDF sanitization engine: neutralizes active content in PDF documents —
//! external hyperlinks, form widgets (including XFA), embedded
//! JavaScript, automatic actions, and URLs embedded in XML payloads —
//! while keeping the output a valid, near-same-size PDF.
//!
//! The engine is a dual-strategy mutator: [`structural_sanitizer`] edits
//! a parsed PDF object graph; [`byte_sanitizer`] applies length-preserving
//! rewrites directly on the raw buffer, both as the fallback when the
//! structural parser fails and as a final URL sweep afterward, since URLs
//! inside content streams and XFA XML bodies are opaque to the object
//! model. [`orchestrator::sanitize`] is the single entry point.

pub mod byte_sanitizer;
pub mod config;
pub mod error;
pub mod options;
pub mod orchestrator;
pub mod regions;
pub mod report;
pub mod rewriter;
pub mod structural_sanitizer;

pub use error::{Result, SanitizeError};
pub use options::SanitizeOptions;
pub use orchestrator::sanitize;
pub use report::SanitizeReport;
