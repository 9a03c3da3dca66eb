//! Structural Sanitizer: operates on a parsed PDF object graph via
//! `lopdf`. Removes or rewrites catalog keys, page annotations, and form
//! trees, then serializes through `lopdf`'s writer.
//! Author: kartik6717
//!
//! Every catalog mutation, page, and annotation is attempted
//! independently: a failure on one annotation does not abort its page,
//! and a failure on one page does not abort the document. Only a failure
//! to load or save the whole document aborts to the byte-level path.

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::options::SanitizeOptions;
use crate::report::SanitizeReport;

const LINK_ACTION_TYPES: &[&str] = &["URI", "Launch", "GoToR", "GoToE", "SubmitForm", "ImportData"];
const URL_SCHEMES: &[&str] = &["http://", "https://", "ftp://"];

/// Runs the structural pass. Returns the re-serialized bytes and a
/// partial report, or a [`crate::error::SanitizeError`] if the document
/// could not be loaded or saved — either of which sends the orchestrator
/// to the byte-level path instead.
#[instrument(skip(bytes), err(Display))]
pub fn sanitize_structural(bytes: &[u8], options: &SanitizeOptions) -> Result<(Vec<u8>, SanitizeReport)> {
    let mut doc = Document::load_mem(bytes)?;
    let mut report = SanitizeReport::new();

    clean_catalog(&mut doc, options, &mut report);

    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in page_ids {
        clean_page(&mut doc, page_id, options, &mut report);
    }

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    debug!(len = out.len(), "structural save complete");
    Ok((out, report))
}

fn clean_catalog(doc: &mut Document, options: &SanitizeOptions, report: &mut SanitizeReport) {
    if let Ok(catalog) = doc.catalog_mut() {
        if let Some(open_action) = catalog.get(b"OpenAction").ok().cloned() {
            if should_remove_open_action(doc, &open_action, options) {
                if let Ok(catalog) = doc.catalog_mut() {
                    catalog.remove(b"OpenAction");
                }
                report.push("Removed OpenAction");
            }
        }
    }

    if options.strips_additional_actions() {
        if let Ok(catalog) = doc.catalog_mut() {
            if catalog.remove(b"AA").is_some() {
                report.push("Removed document Additional Actions dictionary");
            }
        }
    }

    if options.remove_javascript {
        remove_names_javascript(doc, report);
    }

    if options.remove_forms {
        if let Ok(catalog) = doc.catalog_mut() {
            if catalog.remove(b"AcroForm").is_some() {
                report.push("Removed AcroForm dictionary");
            }
        }
    }
}

/// (a) JavaScript OpenAction when `remove_javascript`; (b) a link/launch/
/// form OpenAction when `remove_links`; (c) an indirect reference we
/// can't classify without a full graph walk — removed whenever either
/// option is set, the conservative choice.
fn should_remove_open_action(doc: &Document, open_action: &Object, options: &SanitizeOptions) -> bool {
    match open_action {
        Object::Reference(_) => options.remove_links || options.remove_javascript,
        Object::Dictionary(dict) => {
            let action_type = dict.get(b"S").and_then(Object::as_name_str).unwrap_or("");
            if action_type == "JavaScript" {
                options.remove_javascript
            } else if LINK_ACTION_TYPES.contains(&action_type) {
                options.remove_links
            } else {
                false
            }
        }
        _ => {
            let _ = doc;
            false
        }
    }
}

fn remove_names_javascript(doc: &mut Document, report: &mut SanitizeReport) {
    let Ok(catalog) = doc.catalog_mut() else { return };
    let Ok(names) = catalog.get_mut(b"Names").and_then(Object::as_dict_mut) else {
        return;
    };
    if names.remove(b"JavaScript").is_some() {
        report.push("Removed Names/JavaScript name tree");
    }
}

fn clean_page(doc: &mut Document, page_id: ObjectId, options: &SanitizeOptions, report: &mut SanitizeReport) {
    if options.strips_additional_actions() {
        if let Ok(page) = doc.get_dictionary_mut(page_id) {
            if page.remove(b"AA").is_some() {
                report.push("Removed page Additional Actions dictionary");
            }
        }
    }

    let Some((location, entries)) = read_annotations(doc, page_id) else {
        return;
    };

    let mut kept = Vec::with_capacity(entries.len());
    let mut removed_links = 0usize;
    let mut removed_widgets = 0usize;

    for entry in entries {
        match classify_annotation(doc, &entry, options) {
            AnnotationDecision::Keep => kept.push(entry),
            AnnotationDecision::DropLink => removed_links += 1,
            AnnotationDecision::DropWidget => removed_widgets += 1,
        }
    }

    if removed_links == 0 && removed_widgets == 0 {
        return;
    }

    write_annotations(doc, page_id, location, kept);
    report.push_counted("Removed", removed_links, "external link annotation", "external link annotations");
    report.push_counted("Removed", removed_widgets, "widget annotation", "widget annotations");
}

/// Where a page's `/Annots` array physically lives: inline in the page
/// dictionary, or as a separate indirect object the page references.
enum AnnotsLocation {
    Inline,
    Indirect(ObjectId),
}

fn read_annotations(doc: &Document, page_id: ObjectId) -> Option<(AnnotsLocation, Vec<Object>)> {
    let page = doc.get_dictionary(page_id).ok()?;
    match page.get(b"Annots").ok()? {
        Object::Array(arr) => Some((AnnotsLocation::Inline, arr.clone())),
        Object::Reference(id) => {
            let entries = doc.get_object(*id).ok()?.as_array().ok()?.clone();
            Some((AnnotsLocation::Indirect(*id), entries))
        }
        _ => None,
    }
}

fn write_annotations(doc: &mut Document, page_id: ObjectId, location: AnnotsLocation, kept: Vec<Object>) {
    match location {
        AnnotsLocation::Inline => {
            if let Ok(page) = doc.get_dictionary_mut(page_id) {
                page.set("Annots", kept);
            }
        }
        AnnotsLocation::Indirect(id) => {
            if let Ok(obj) = doc.get_object_mut(id) {
                *obj = Object::Array(kept);
            }
        }
    }
}

enum AnnotationDecision {
    Keep,
    DropLink,
    DropWidget,
}

fn classify_annotation(doc: &Document, entry: &Object, options: &SanitizeOptions) -> AnnotationDecision {
    let Some(dict) = resolve_dict(doc, entry) else {
        // Unreadable entry: tolerant failure, preserve the reference untouched.
        return AnnotationDecision::Keep;
    };

    let subtype = dict.get(b"Subtype").and_then(Object::as_name_str).unwrap_or("");

    if subtype == "Link" && options.remove_links {
        if let Ok(action) = dict.get(b"A").and_then(Object::as_dict) {
            let action_type = action.get(b"S").and_then(Object::as_name_str).unwrap_or("");
            if LINK_ACTION_TYPES.contains(&action_type) {
                return AnnotationDecision::DropLink;
            }
            if action_type == "GoTo" {
                if let Ok(dest) = action.get(b"D") {
                    if destination_targets_url(dest) {
                        return AnnotationDecision::DropLink;
                    }
                }
            }
        }
    }

    if subtype == "Widget" && options.remove_forms {
        return AnnotationDecision::DropWidget;
    }

    AnnotationDecision::Keep
}

fn resolve_dict<'a>(doc: &'a Document, entry: &'a Object) -> Option<&'a lopdf::Dictionary> {
    match entry {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

/// Internal `/GoTo` destinations stay byte-identical; only destinations
/// that stringify to an external scheme are treated as link-like.
fn destination_targets_url(dest: &Object) -> bool {
    let text = stringify(dest);
    URL_SCHEMES.iter().any(|scheme| text.contains(scheme))
}

fn stringify(obj: &Object) -> String {
    match obj {
        Object::String(bytes, _) | Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Object::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(" "),
        _ => String::new(),
    }
}
