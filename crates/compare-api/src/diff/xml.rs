//! XML body normalization.
//!
//! Documents are parsed with `sxd_document` and re-serialized canonically:
//! attributes sorted by name, text trimmed, whitespace-only text, comments
//! and processing instructions dropped.

use sxd_document::dom::{ChildOfElement, ChildOfRoot, Element};
use sxd_document::parser;
use sxd_document::QName;

/// Cheap pre-check: trimmed content starts with `<` and ends with `>`.
pub fn looks_like_xml(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('<') && trimmed.ends_with('>')
}

/// Canonical serialization of an XML document, or `None` if it does not
/// parse.
pub fn normalize_xml(text: &str) -> Option<String> {
    let package = parser::parse(text.trim()).ok()?;
    let document = package.as_document();

    let mut out = String::new();
    for child in document.root().children() {
        if let ChildOfRoot::Element(element) = child {
            write_element(element, &mut out);
        }
    }
    Some(out)
}

/// Clark notation (`{uri}local`) keeps namespaces distinct without
/// depending on prefixes.
fn qualified(name: QName<'_>) -> String {
    match name.namespace_uri() {
        Some(uri) => format!("{{{uri}}}{}", name.local_part()),
        None => name.local_part().to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn write_element(element: Element<'_>, out: &mut String) {
    let name = qualified(element.name());
    out.push('<');
    out.push_str(&name);

    let mut attributes: Vec<(String, String)> = element
        .attributes()
        .into_iter()
        .map(|a| (qualified(a.name()), a.value().to_string()))
        .collect();
    attributes.sort();
    for (key, value) in attributes {
        out.push_str(&format!(" {key}=\"{}\"", escape(&value)));
    }

    let mut body = String::new();
    // Adjacent text nodes (e.g. around CDATA) coalesce before trimming.
    let mut pending_text = String::new();
    let flush = |pending: &mut String, body: &mut String| {
        let trimmed = pending.trim();
        if !trimmed.is_empty() {
            body.push_str(&escape(trimmed));
        }
        pending.clear();
    };

    for child in element.children() {
        match child {
            ChildOfElement::Text(text) => pending_text.push_str(text.text()),
            ChildOfElement::Element(nested) => {
                flush(&mut pending_text, &mut body);
                write_element(nested, &mut body);
            }
            _ => {}
        }
    }
    flush(&mut pending_text, &mut body);

    if body.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        out.push_str(&body);
        out.push_str(&format!("</{name}>"));
    }
}
