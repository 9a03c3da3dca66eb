//! Sanitization options recognized by the engine.

use serde::{Deserialize, Serialize};

/// The three options the sanitizer understands. All default to `true`,
/// matching the posture of user-facing flows described for this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeOptions {
    /// Strip external-link annotations; neutralize URI/Launch/GoToR/GoToE/
    /// SubmitForm/ImportData actions; rewrite embedded URLs to
    /// `about:blank`; remove embedded UNC paths.
    pub remove_links: bool,
    /// Strip the AcroForm dictionary, XFA references, widget annotations,
    /// and XFA submit tags.
    pub remove_forms: bool,
    /// Strip an OpenAction that invokes JavaScript; delete the
    /// `Names/JavaScript` name tree; empty `/JS(...)` literal bodies;
    /// neutralize JavaScript actions.
    pub remove_javascript: bool,
}

impl SanitizeOptions {
    /// `true` if either option that targets `/AA` dictionaries is set.
    /// Additional Actions are stripped whenever links or JavaScript are
    /// being removed, at both the document and page level.
    pub fn strips_additional_actions(&self) -> bool {
        self.remove_links || self.remove_javascript
    }

    /// `true` if every option is off — nothing this engine understands is
    /// requested, so sanitizing is a no-op on the input bytes.
    pub fn is_noop(&self) -> bool {
        !self.remove_links && !self.remove_forms && !self.remove_javascript
    }

    pub const fn all() -> Self {
        Self {
            remove_links: true,
            remove_forms: true,
            remove_javascript: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            remove_links: false,
            remove_forms: false,
            remove_javascript: false,
        }
    }
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self::all()
    }
}
