//! Byte-Level Sanitizer: the length-preserving rule catalog, applied
//! directly against the raw buffer. Used both as the primary path when
//! the structural parser fails and as the final URL sweep after a
//! successful structural save.
//! Author: kartik6717

use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::options::SanitizeOptions;
use crate::regions::StreamRegionIndex;
use crate::report::SanitizeReport;
use crate::rewriter::{self, DEFAULT_URL_SENTINEL};

const NAMESPACE_LOOKBACK: usize = 30;

static OPEN_ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/OpenAction\s*(<<.*?>>|\d+\s+\d+\s+R)").unwrap());
static ADDITIONAL_ACTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/AA\s*<<.*?>>").unwrap());
static NAMES_JAVASCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/Names\s*<<.*?/JavaScript\s*<<.*?>>").unwrap());
static XFA_REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/XFA\s+\d+\s+\d+\s+R").unwrap());
static SUBMIT_URL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:target|href)\s*=\s*"(https?://[^"]*)""#).unwrap()
});
static SUBMIT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</?(?:xdp:)?submit\b[^>]*>").unwrap());
static XML_STYLESHEET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\?xml-stylesheet.*?\?>").unwrap());
static JS_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/JS\s*\(.*?\)").unwrap());
static UNC_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\+https?://[^\s"'>]+"#).unwrap());
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'>]+"#).unwrap());
static ACRO_FORM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/AcroForm\s*<<.*?>>").unwrap());

fn action_type_regex(action: &str) -> Regex {
    Regex::new(&format!(r"/S\s*/{action}\b")).unwrap()
}

/// Runs the full twelve-rule catalog in spec order.
pub fn apply_full_catalog(buf: &mut [u8], options: &SanitizeOptions) -> SanitizeReport {
    let index = StreamRegionIndex::scan(buf);
    let mut report = SanitizeReport::new();

    if options.strips_additional_actions() {
        rule_open_action(buf, &index, &mut report);
    }

    if options.strips_additional_actions() {
        rule_additional_actions(buf, &index, &mut report);
    }

    if options.remove_javascript {
        rule_names_javascript(buf, &index, &mut report);
    }

    if options.remove_forms {
        rule_xfa_reference(buf, &index, &mut report);
        rule_xfa_submit_urls(buf, &index, &mut report);
        rule_xfa_submit_tags(buf, &index, &mut report);
        rule_xml_stylesheet(buf, &index, &mut report);
    }

    rule_action_neutralization(buf, &index, options, &mut report);

    if options.remove_javascript {
        rule_js_literal(buf, &index, &mut report);
    }

    if options.remove_links {
        rule_unc_url(buf, &index, &mut report);
        rule_bare_url(buf, &index, &mut report);
    }

    if options.remove_forms {
        rule_acro_form(buf, &index, &mut report);
    }

    report
}

/// Runs only the URL sweep (rules 10-11), used as the final pass after a
/// successful structural save — URLs inside content streams and XFA XML
/// bodies are opaque to the object model.
pub fn url_sweep(buf: &mut [u8], options: &SanitizeOptions) -> SanitizeReport {
    let mut report = SanitizeReport::new();
    if !options.remove_links {
        return report;
    }
    let index = StreamRegionIndex::scan(buf);
    rule_unc_url(buf, &index, &mut report);
    rule_bare_url(buf, &index, &mut report);
    report
}

/// Applies every match of `pattern` that isn't inside a protected region,
/// blanking the whole match. Returns the number of matches applied.
fn blank_all(buf: &mut [u8], index: &StreamRegionIndex, pattern: &Regex) -> usize {
    let spans: Vec<(usize, usize)> = pattern
        .find_iter(buf)
        .map(|m| (m.start(), m.end()))
        .filter(|(lo, hi)| !index.span_is_protected(*lo, *hi))
        .collect();
    for (lo, hi) in &spans {
        rewriter::blank(buf, *lo, *hi);
    }
    spans.len()
}

fn rule_open_action(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    if blank_all(buf, index, &OPEN_ACTION) > 0 {
        report.push("Removed OpenAction");
    }
}

fn rule_additional_actions(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    let n = blank_all(buf, index, &ADDITIONAL_ACTIONS);
    report.push_counted("Removed", n, "Additional Actions dictionary", "Additional Actions dictionaries");
}

fn rule_names_javascript(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    let spans: Vec<(usize, usize)> = NAMES_JAVASCRIPT
        .find_iter(buf)
        .map(|m| (m.start(), m.end()))
        .filter(|(lo, hi)| !index.span_is_protected(*lo, *hi))
        .collect();
    for (lo, hi) in &spans {
        // substitute() already rejects an oversized replacement; the
        // template is far shorter than any real match so this cannot fail.
        let _ = rewriter::substitute(buf, *lo, *hi, b"/Names<<>>");
    }
    if !spans.is_empty() {
        report.push("Removed Names/JavaScript name tree");
    }
}

fn rule_xfa_reference(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    if blank_all(buf, index, &XFA_REFERENCE) > 0 {
        report.push("Removed XFA form reference");
    }
}

/// Finds `<submit>`/`<xdp:submit>` tags inside XML-classified stream
/// regions carrying a `target=`/`href=` attribute pointing at `http(s)`,
/// and rewrites only the URL portion to the padded sentinel.
fn rule_xfa_submit_urls(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    let mut count = 0usize;
    let xml_spans: Vec<(usize, usize)> = index
        .regions()
        .iter()
        .filter(|r| r.class == crate::regions::RegionClass::Xml)
        .map(|r| (r.start, r.end))
        .collect();

    for (region_lo, region_hi) in xml_spans {
        let mut url_spans = Vec::new();
        for tag in SUBMIT_TAG.find_iter(&buf[region_lo..region_hi]) {
            let tag_bytes = &buf[region_lo + tag.start()..region_lo + tag.end()];
            if let Some(caps) = SUBMIT_URL_ATTR.captures(tag_bytes) {
                let url = caps.get(1).unwrap();
                url_spans.push((region_lo + tag.start() + url.start(), region_lo + tag.start() + url.end()));
            }
        }
        for (lo, hi) in url_spans {
            if !index.span_is_protected(lo, hi) {
                let _ = rewriter::pad_url(buf, lo, hi, DEFAULT_URL_SENTINEL);
                count += 1;
            }
        }
    }
    report.push_counted("Neutralized", count, "XFA submit URL", "XFA submit URLs");
}

fn rule_xfa_submit_tags(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    if blank_all(buf, index, &SUBMIT_TAG) > 0 {
        report.push("Removed XFA submit tags");
    }
}

fn rule_xml_stylesheet(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    if blank_all(buf, index, &XML_STYLESHEET) > 0 {
        report.push("Removed XML stylesheet processing instruction");
    }
}

fn rule_action_neutralization(
    buf: &mut [u8],
    index: &StreamRegionIndex,
    options: &SanitizeOptions,
    report: &mut SanitizeReport,
) {
    let active: &[&str] = if options.remove_links {
        &["URI", "Launch", "GoToR", "GoToE", "SubmitForm", "ImportData", "JavaScript"]
    } else if options.remove_javascript {
        &["JavaScript"]
    } else {
        &[]
    };

    let mut count = 0usize;
    for action in active {
        let pattern = action_type_regex(action);
        let spans: Vec<(usize, usize)> = pattern
            .find_iter(buf)
            .map(|m| (m.start(), m.end()))
            .filter(|(lo, hi)| !index.span_is_protected(*lo, *hi))
            .collect();
        for (lo, hi) in &spans {
            // "/S/NOP" is 6 bytes, the length of the shortest possible
            // match (`/S/URI` with no intervening whitespace) — any
            // longer neutral type name would make `/URI` itself
            // unreachable through `substitute`'s length check.
            if rewriter::substitute(buf, *lo, *hi, b"/S/NOP").is_ok() {
                count += 1;
            }
        }
    }
    report.push_counted("Neutralized", count, "action", "actions");
}

fn rule_js_literal(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    let spans: Vec<(usize, usize)> = JS_LITERAL
        .find_iter(buf)
        .map(|m| (m.start(), m.end()))
        .filter(|(lo, hi)| !index.span_is_protected(*lo, *hi))
        .collect();
    for (lo, hi) in &spans {
        let _ = rewriter::substitute(buf, *lo, *hi, b"/JS()");
    }
    if !spans.is_empty() {
        report.push("Emptied JavaScript literal");
    }
}

fn rule_unc_url(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    let n = blank_all(buf, index, &UNC_URL);
    report.push_counted("Removed", n, "embedded UNC URL", "embedded UNC URLs");
}

fn rule_bare_url(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    let spans: Vec<(usize, usize)> = BARE_URL
        .find_iter(buf)
        .map(|m| (m.start(), m.end()))
        .filter(|(lo, hi)| !index.span_is_protected(*lo, *hi))
        .filter(|(lo, _)| !preceded_by_namespace_marker(buf, *lo))
        .collect();
    for (lo, hi) in &spans {
        let _ = rewriter::pad_url(buf, *lo, *hi, DEFAULT_URL_SENTINEL);
    }
    report.push_counted("Removed", spans.len(), "external URL", "external URLs");
}

fn rule_acro_form(buf: &mut [u8], index: &StreamRegionIndex, report: &mut SanitizeReport) {
    if blank_all(buf, index, &ACRO_FORM) > 0 {
        report.push("Removed AcroForm dictionary");
    }
}

/// True iff `xmlns=` or `xmlns:` occurs within [`NAMESPACE_LOOKBACK`]
/// bytes before `lo` — such a URL is an XML namespace identifier, not a
/// dereferenceable link.
fn preceded_by_namespace_marker(buf: &[u8], lo: usize) -> bool {
    let window_lo = lo.saturating_sub(NAMESPACE_LOOKBACK);
    let window = &buf[window_lo..lo];
    contains(window, b"xmlns=") || contains(window, b"xmlns:")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &[u8], options: SanitizeOptions) -> (Vec<u8>, SanitizeReport) {
        let mut buf = input.to_vec();
        let report = apply_full_catalog(&mut buf, &options);
        (buf, report)
    }

    #[test]
    fn open_action_uri_removed() {
        let input = b"/OpenAction << /S /URI /URI (http://evil.example) >>".to_vec();
        let (out, report) = run(&input, SanitizeOptions::all());
        assert_eq!(out.len(), input.len());
        assert!(!contains(&out, b"/OpenAction"));
        assert!(report.items.iter().any(|i| i.contains("OpenAction")));
    }

    #[test]
    fn open_action_indirect_reference_removed() {
        let input = b"/OpenAction 12 0 R /Other true".to_vec();
        let (out, _) = run(&input, SanitizeOptions::all());
        assert_eq!(out.len(), input.len());
        assert!(!contains(&out, b"/OpenAction"));
    }

    #[test]
    fn unc_url_blanked_length_preserved() {
        let input = br"\\http://evil.example\a.xslt".to_vec();
        let (out, report) = run(&input, SanitizeOptions::all());
        assert_eq!(out.len(), input.len());
        assert!(out.iter().all(|&b| b == b' '));
        assert!(report.items.iter().any(|i| i.contains("UNC")));
    }

    #[test]
    fn namespace_url_preserved() {
        let input = br#"xmlns:x="http://www.w3.org/1999/XSL/Transform""#.to_vec();
        let (out, _) = run(&input, SanitizeOptions::all());
        assert_eq!(out, input);
    }

    #[test]
    fn bare_url_padded_with_sentinel() {
        let input = b"See https://evil.example/x for details".to_vec();
        let (out, report) = run(&input, SanitizeOptions::all());
        assert_eq!(out.len(), input.len());
        assert!(contains(&out, b"about:blank"));
        assert!(report.items.iter().any(|i| i.contains("external URL")));
    }

    #[test]
    fn xfa_submit_url_neutralized_in_xml_region() {
        let xml = br#"<?xml version="1.0"?><xdp:submit target="http://evil.example/collect"/>"#;
        let mut input = b"/Subtype /XML\nstream\n".to_vec();
        input.extend_from_slice(xml);
        input.extend_from_slice(b"\nendstream");
        let (out, _) = run(&input, SanitizeOptions::all());
        assert_eq!(out.len(), input.len());
        assert!(!contains(&out, b"http://evil.example"));
        assert!(!contains(&out, b"<xdp:submit"));
    }

    #[test]
    fn all_false_options_are_no_op() {
        let input = b"/OpenAction << /S /URI /URI (http://evil.example) >>".to_vec();
        let (out, report) = run(&input, SanitizeOptions::none());
        assert_eq!(out, input);
        assert!(report.is_empty());
    }

    #[test]
    fn binary_region_is_never_touched() {
        let mut input = b"/Length 20\nstream\n".to_vec();
        input.extend_from_slice(b"http://evil.example");
        input.extend_from_slice(b"\nendstream");
        let (out, _) = run(&input, SanitizeOptions::all());
        assert_eq!(out, input, "binary stream bytes must be byte-identical");
    }

    #[test]
    fn js_literal_emptied() {
        let input = b"/JS (app.alert('hi'))".to_vec();
        let (out, report) = run(&input, SanitizeOptions::all());
        assert_eq!(out.len(), input.len());
        assert!(contains(&out, b"/JS()"));
        assert!(report.items.iter().any(|i| i.contains("JavaScript literal")));
    }

    #[test]
    fn url_sweep_only_runs_rules_ten_and_eleven() {
        let input = b"/OpenAction << /S /URI /URI (http://evil.example) >> see https://x.example".to_vec();
        let mut buf = input.clone();
        let report = url_sweep(&mut buf, &SanitizeOptions::all());
        assert_eq!(buf.len(), input.len());
        assert!(contains(&buf, b"/OpenAction"), "url_sweep must not touch OpenAction");
        assert!(!contains(&buf, b"https://x.example"));
        assert_eq!(report.items.len(), 1);
    }
}
