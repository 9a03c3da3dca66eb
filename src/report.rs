//! The removal/neutralization report returned alongside sanitized bytes.

/// Ordered sequence of human-readable removal descriptors, plus an
/// optional warning string present iff a component degraded.
///
/// Order reflects the order of application: stream-region scan results
/// never appear here directly, byte-level rules fire in catalog order
/// (see [`crate::byte_sanitizer`]), and structural removals are appended
/// as each page/annotation is visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub items: Vec<String>,
    pub warning: Option<String>,
}

impl SanitizeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a singleton removal, e.g. `"Removed OpenAction"`.
    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Records an aggregate removal, e.g. `"Removed 7 external URLs"`.
    /// Skips the entry entirely when `count` is zero so the empty report
    /// stays faithful to "nothing happened".
    pub fn push_counted(&mut self, verb: &str, count: usize, singular: &str, plural_noun: &str) {
        if count > 0 {
            let noun = if count == 1 { singular } else { plural_noun };
            self.items.push(format!("{verb} {count} {noun}"));
        }
    }

    pub fn set_warning(&mut self, warning: impl Into<String>) {
        self.warning = Some(warning.into());
    }

    pub fn merge(&mut self, other: SanitizeReport) {
        self.items.extend(other.items);
        if let Some(w) = other.warning {
            self.warning = Some(match &self.warning {
                Some(existing) => format!("{existing}; {w}"),
                None => w,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
