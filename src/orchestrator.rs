//! Orchestrator: selects a sanitization strategy per document, runs the
//! byte-level final URL sweep after a successful structural save, and
//! implements the total-failure fallback.

use tracing::{info, warn};

use crate::byte_sanitizer;
use crate::options::SanitizeOptions;
use crate::report::SanitizeReport;
use crate::structural_sanitizer;

/// The single entry point of the sanitization engine. Total: never
/// panics across this boundary, and never loses the original bytes — on
/// total failure the output equals the input and `report.warning`
/// explains why.
pub fn sanitize(bytes: &[u8], options: &SanitizeOptions) -> (Vec<u8>, SanitizeReport) {
    if options.is_noop() {
        return (bytes.to_vec(), SanitizeReport::new());
    }

    match std::panic::catch_unwind(|| structural_sanitizer::sanitize_structural(bytes, options)) {
        Ok(Ok((mut out, mut report))) => {
            info!("structural sanitization succeeded");
            let sweep = byte_sanitizer::url_sweep(&mut out, options);
            report.merge(sweep);
            (out, report)
        }
        Ok(Err(structural_err)) => {
            warn!(error = %structural_err, "structural sanitizer failed, falling back to byte-level");
            byte_level_fallback(bytes, options, &structural_err.to_string())
        }
        Err(panic) => {
            let cause = panic_message(&panic);
            warn!(cause = %cause, "structural sanitizer panicked, falling back to byte-level");
            byte_level_fallback(bytes, options, &cause)
        }
    }
}

fn byte_level_fallback(bytes: &[u8], options: &SanitizeOptions, cause: &str) -> (Vec<u8>, SanitizeReport) {
    match std::panic::catch_unwind(|| {
        let mut buf = bytes.to_vec();
        let report = byte_sanitizer::apply_full_catalog(&mut buf, options);
        (buf, report)
    }) {
        Ok((buf, mut report)) => {
            report.set_warning(format!("Structural sanitizer unavailable: {cause}"));
            (buf, report)
        }
        Err(panic) => {
            // Unreachable in practice — the byte-level path is pure
            // pattern matching — but the core must never lose the
            // original bytes even here.
            let fallback_cause = panic_message(&panic);
            let mut report = SanitizeReport::new();
            report.set_warning(format!(
                "Could not clean PDF: {cause}; byte-level fallback also failed: {fallback_cause}"
            ));
            (bytes.to_vec(), report)
        }
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_input_falls_back_to_byte_level_and_preserves_length() {
        let input = b"not a pdf at all, just /OpenAction << /S /URI /URI (http://evil.example) >>".to_vec();
        let (out, report) = sanitize(&input, &SanitizeOptions::all());
        assert_eq!(out.len(), input.len());
        assert!(report.warning.is_some());
        assert!(!out.windows(b"/OpenAction".len()).any(|w| w == b"/OpenAction"));
    }

    #[test]
    fn all_false_options_is_a_no_op_on_malformed_input() {
        let input = b"/OpenAction << /S /URI /URI (http://evil.example) >>".to_vec();
        let (out, report) = sanitize(&input, &SanitizeOptions::none());
        assert_eq!(out, input);
        assert!(report.items.is_empty());
    }

    #[test]
    fn all_false_options_is_a_no_op_on_a_valid_pdf() {
        use lopdf::dictionary;
        let mut doc = lopdf::Document::with_version("1.5");
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "AA" => dictionary! { "WC" => dictionary! { "S" => "JavaScript" } },
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let (out, report) = sanitize(&bytes, &SanitizeOptions::none());
        assert_eq!(out, bytes, "no structural reserialization should occur when every option is off");
        assert!(report.items.is_empty());
        assert!(report.warning.is_none());
    }

    #[test]
    fn valid_pdf_runs_structural_path_without_warning() {
        let mut doc = lopdf::Document::with_version("1.5");
        let catalog_id = doc.add_object(lopdf::dictionary! { "Type" => "Catalog" });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let (out, report) = sanitize(&bytes, &SanitizeOptions::all());
        assert!(report.warning.is_none());
        lopdf::Document::load_mem(&out).expect("output must remain a valid PDF");
    }
}
