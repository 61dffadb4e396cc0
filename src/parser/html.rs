//! HTML extraction of links and plain text
//!
//! Both extractors are fail-soft: html5ever repairs whatever markup it is
//! given, so malformed input produces partial output rather than an error.

use scraper::{Html, Node, Selector};

/// Elements whose text content is never indexed
const IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// A hyperlink found in a document, before resolution against the page URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    /// The `href` attribute exactly as written
    pub href: String,

    /// Visible text enclosed by the anchor, whitespace-collapsed
    pub anchor_text: String,
}

/// Both extraction results for one document
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Anchors in document order
    pub links: Vec<RawLink>,

    /// Linearized text with a newline at every tag boundary
    pub text: String,
}

/// Parses `html` once and runs both extractors over the same tree
///
/// # Example
///
/// ```
/// use ripple_search::parser::parse_document;
///
/// let doc = parse_document(r#"<p>Hello <a href="/b">shop now</a></p>"#);
/// assert_eq!(doc.links[0].href, "/b");
/// assert_eq!(doc.links[0].anchor_text, "shop now");
/// assert!(doc.text.contains("Hello"));
/// ```
pub fn parse_document(html: &str) -> ParsedDocument {
    let document = Html::parse_document(html);
    ParsedDocument {
        links: links_in(&document),
        text: text_in(&document),
    }
}

/// Extracts `(href, anchor_text)` pairs in document order
pub fn extract_links(html: &str) -> Vec<RawLink> {
    links_in(&Html::parse_document(html))
}

/// Extracts the plain text of a document
pub fn extract_text(html: &str) -> String {
    text_in(&Html::parse_document(html))
}

fn links_in(document: &Html) -> Vec<RawLink> {
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                let anchor_text = element
                    .text()
                    .flat_map(str::split_whitespace)
                    .collect::<Vec<_>>()
                    .join(" ");
                links.push(RawLink {
                    href: href.to_string(),
                    anchor_text,
                });
            }
        }
    }

    links
}

/// Walks the tree depth-first, emitting text nodes and a newline on every
/// element open and close. Subtrees of ignored elements contribute only
/// their boundary newline.
fn text_in(document: &Html) -> String {
    let mut text = String::new();
    // (node, closing) pairs; a closing entry marks the end of an element
    let mut stack = vec![(document.tree.root(), false)];

    while let Some((node, closing)) = stack.pop() {
        if closing {
            text.push('\n');
            continue;
        }

        match node.value() {
            Node::Text(fragment) => text.push_str(fragment),
            Node::Element(element) => {
                text.push('\n');
                if IGNORED_TAGS.contains(&element.name()) {
                    continue;
                }
                stack.push((node, true));
                let children: Vec<_> = node.children().collect();
                for child in children.into_iter().rev() {
                    stack.push((child, false));
                }
            }
            Node::Document | Node::Fragment => {
                let children: Vec<_> = node.children().collect();
                for child in children.into_iter().rev() {
                    stack.push((child, false));
                }
            }
            _ => {}
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_in_order() {
        let html = r#"
            <html><body>
                <a href="/one">First</a>
                <p>between</p>
                <a href="https://other.com/two">Second   link</a>
            </body></html>
        "#;
        let links = extract_links(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href, "/one");
        assert_eq!(links[0].anchor_text, "First");
        assert_eq!(links[1].href, "https://other.com/two");
        assert_eq!(links[1].anchor_text, "Second link");
    }

    #[test]
    fn test_anchor_text_includes_nested_markup() {
        let links = extract_links(r#"<a href="/b">shop <b>now</b></a>"#);
        assert_eq!(links[0].anchor_text, "shop now");
    }

    #[test]
    fn test_anchor_without_href_is_skipped() {
        let links = extract_links(r#"<a name="top">Top</a><a href="/x">X</a>"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "/x");
    }

    #[test]
    fn test_unclosed_anchor_is_best_effort() {
        let links = extract_links(r#"<p><a href="/open">dangling text"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].anchor_text, "dangling text");
    }

    #[test]
    fn test_extract_text_skips_script_and_style() {
        let html = r#"<html><head><style>body { color: red }</style>
            <script>var hidden = 1;</script></head>
            <body><p>Visible words</p></body></html>"#;
        let text = extract_text(html);
        assert!(text.contains("Visible words"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_tag_boundaries_break_words() {
        let text = extract_text("<p>foo<b>bar</b>baz</p>");
        assert!(!text.contains("foobar"));
        assert!(!text.contains("barbaz"));
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(words, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_malformed_markup_degrades() {
        let doc = parse_document("<div><p>unterminated <a href='/z'>link<<<>");
        assert!(doc.text.contains("unterminated"));
        assert_eq!(doc.links.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let doc = parse_document("");
        assert!(doc.links.is_empty());
        assert!(doc.text.trim().is_empty());
    }
}
