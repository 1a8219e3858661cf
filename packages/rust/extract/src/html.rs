//! HTML → plain text.
//!
//! Walks the parsed document, drops non-content elements, and puts line
//! breaks around block-level elements. A small cleanup pipeline then
//! normalizes whitespace.

use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose content is never text.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "head",
];

/// Elements that start a new line of text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Extract readable text from an HTML document.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    let mut raw = String::new();
    match Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
    {
        Some(body) => collect_text(body, &mut raw),
        None => collect_text(doc.root_element(), &mut raw),
    }

    run_pipeline(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Cleanup passes
// ---------------------------------------------------------------------------

/// Run the whitespace cleanup passes in order.
fn run_pipeline(text: &str) -> String {
    let mut result = collapse_inline_whitespace(text);
    result = clean_blank_lines(&result);
    result = ensure_trailing_newline(result.trim());
    result
}

/// Collapse runs of spaces/tabs (including non-breaking spaces) and trim each line.
fn collapse_inline_whitespace(text: &str) -> String {
    static INLINE_WS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[ \t\u{a0}\r]+").expect("valid regex"));

    text.lines()
        .map(|line| INLINE_WS_RE.replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of blank lines into a single blank line.
fn clean_blank_lines(text: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(text, "\n\n").to_string()
}

fn ensure_trailing_newline(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{text}\n")
    }
}
