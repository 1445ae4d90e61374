#[cfg(test)]
mod tests;

use scraper::{Html, Selector};
use tracing::debug;

/// Structural and boilerplate regions removed before text extraction and
/// before link discovery.
const UNWANTED_SELECTOR: &str =
    "script, style, nav, header, footer, aside, noscript, .sidebar, .menu, .navigation, \
     .advertisement, .ads";

/// Ordered preference list for the main content region; first match wins.
const MAIN_CONTENT_SELECTOR: &str = "main, article, [role=main], .content, .main-content, #content, #main";

const RENDER_WIDTH: usize = 120;

/// Select the page's content region with boilerplate removed.
///
/// Prefers the first matching semantic content container, falls back to the
/// whole body, and finally to the document itself. The returned fragment is
/// what both text extraction and link discovery operate on, so navigation
/// links never reach the crawl frontier.
#[inline]
pub fn content_fragment(html: &str) -> Html {
    let document = Html::parse_document(html);

    let unwanted = Selector::parse(UNWANTED_SELECTOR).expect("valid selector");
    let main_content = Selector::parse(MAIN_CONTENT_SELECTOR).expect("valid selector");
    let body = Selector::parse("body").expect("valid selector");

    if let Some(main_element) = document.select(&main_content).next() {
        let mut fragment = Html::parse_fragment(&main_element.html());
        remove_unwanted_elements(&mut fragment, &unwanted);
        return fragment;
    }

    if let Some(body_element) = document.select(&body).next() {
        let mut fragment = Html::parse_fragment(&body_element.html());
        remove_unwanted_elements(&mut fragment, &unwanted);
        return fragment;
    }

    let mut fragment = document;
    remove_unwanted_elements(&mut fragment, &unwanted);
    fragment
}

/// Convert a page's markup into clean plain text.
///
/// Region selection and whitespace cleanup are owned here; the markup-to-text
/// rendering itself is delegated to `html2text`. A page with no matching
/// content region yields an empty string, which is not an error.
#[inline]
pub fn normalize(html: &str) -> String {
    let fragment = content_fragment(html);
    let rendered =
        html2text::from_read(fragment.html().as_bytes(), RENDER_WIDTH).unwrap_or_default();
    let cleaned = cleanup_whitespace(&rendered);

    debug!(
        "Normalized {} bytes of markup into {} chars of text",
        html.len(),
        cleaned.chars().count()
    );
    cleaned
}

/// Collapse runs of spaces and tabs to a single space, collapse three or more
/// consecutive newlines to exactly two, and trim the result.
#[inline]
pub fn cleanup_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_newlines = 0usize;
    let mut pending_space = false;

    for c in text.chars() {
        match c {
            '\n' => {
                pending_newlines += 1;
                pending_space = false;
            }
            c if c.is_whitespace() => {
                if pending_newlines == 0 {
                    pending_space = true;
                }
            }
            c => {
                if pending_newlines > 0 {
                    if !out.is_empty() {
                        out.push('\n');
                        if pending_newlines > 1 {
                            out.push('\n');
                        }
                    }
                    pending_newlines = 0;
                } else if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    out.trim().to_string()
}

fn remove_unwanted_elements(document: &mut Html, unwanted: &Selector) {
    // Collect node IDs first; detaching while iterating would alias the tree.
    let unwanted_node_ids: Vec<_> = document
        .select(unwanted)
        .map(|element| element.id())
        .collect();

    for node_id in unwanted_node_ids {
        if let Some(mut node) = document.tree.get_mut(node_id) {
            node.detach();
        }
    }
}
