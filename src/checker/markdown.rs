// src/checker/markdown.rs
// =============================================================================
// This module extracts link targets from Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Resolves reference-style links ([text][ref]) for us
//
// Raw HTML blocks are opaque to the parser, so `[text](dest)` written inside
// one (a centered badge row in a <div>, say) is found with a textual pattern
// over the HTML chunk instead.
//
// Unlike a plain HTTP-only filter, every destination is kept:
// - http:// and https:// links pass through untouched
// - "#section" anchors pass through as literal strings
// - anything else is treated as relative and joined onto the base URL
// =============================================================================

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use url::Url;

// [text](dest) or [text](dest "title"); group 1 is the destination
static INLINE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[[^\]]+\]\(\s*([^)\s]+)(?:\s+[^)]*)?\)"#).expect("static pattern is valid")
});

// Extracts every link and image destination from Markdown text
//
// Parameters:
//   markdown: the markdown text to parse (borrowed as &str)
//   base: the URL relative destinations are resolved against
//
// Example:
//   markdown = "[x](./foo.md)", base = "https://example.com/docs/"
//   result   = ["https://example.com/docs/foo.md"]
pub fn extract_markdown_links(markdown: &str, base: &Url) -> Vec<String> {
    let mut links = Vec::new();

    for event in Parser::new(markdown) {
        // In pulldown-cmark 0.9, Link and Image are Tag::X(link_type, dest_url, title).
        // Images count too: ![alt](img.png) points at a file that must exist.
        match event {
            Event::Start(Tag::Link(_, dest, _)) | Event::Start(Tag::Image(_, dest, _)) => {
                push_target(&mut links, &dest, base);
            }
            Event::Html(chunk) => {
                for caps in INLINE_LINK.captures_iter(&chunk) {
                    push_target(&mut links, &caps[1], base);
                }
            }
            _ => {}
        }
    }

    links
}

fn push_target(links: &mut Vec<String>, dest: &str, base: &Url) {
    let dest = dest.trim();
    if !dest.is_empty() {
        links.push(normalize_target(dest, base));
    }
}

// Turns a markdown destination into a link target
//
// Absolute http(s) URLs and anchors are returned as-is. Everything else goes
// through Url::join, which follows the standard URL-join rules:
//   base = "https://example.com/docs/"
//   "./foo.md"     -> "https://example.com/docs/foo.md"
//   "../about"     -> "https://example.com/about"
//   "/root.md"     -> "https://example.com/root.md"
//   "mailto:a@b.c" -> "mailto:a@b.c" (already has a scheme)
pub fn normalize_target(dest: &str, base: &Url) -> String {
    if is_passthrough(dest) {
        return dest.to_string();
    }

    match base.join(dest) {
        Ok(url) => url.to_string(),
        Err(e) => {
            // Keep the raw value; the validator will report why it's broken
            tracing::debug!("could not join '{}' onto {}: {}", dest, base, e);
            dest.to_string()
        }
    }
}

fn is_passthrough(dest: &str) -> bool {
    dest.starts_with("http://") || dest.starts_with("https://") || dest.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/").unwrap()
    }

    #[test]
    fn test_relative_link_joined_onto_base() {
        let links = extract_markdown_links("See [x](./foo.md) for details", &base());
        assert_eq!(links, vec!["https://example.com/docs/foo.md"]);
    }

    #[test]
    fn test_absolute_link_untouched() {
        // No trailing slash is added: the target stays exactly as written
        let links = extract_markdown_links("Check out [Rust](https://www.rust-lang.org)!", &base());
        assert_eq!(links, vec!["https://www.rust-lang.org"]);
    }

    #[test]
    fn test_anchor_kept_literally() {
        let links = extract_markdown_links("Jump to [setup](#setup)", &base());
        assert_eq!(links, vec!["#setup"]);
    }

    #[test]
    fn test_parent_and_root_relative() {
        let markdown = "[up](../about.md) and [root](/index.md)";
        let links = extract_markdown_links(markdown, &base());
        assert_eq!(
            links,
            vec!["https://example.com/about.md", "https://example.com/index.md"]
        );
    }

    #[test]
    fn test_images_and_reference_links() {
        let markdown = r#"
![diagram](img/flow.png)

Read the [guide][g].

[g]: https://guide.example.org/start
        "#;
        let links = extract_markdown_links(markdown, &base());
        assert_eq!(links.len(), 2);
        assert!(links.contains(&"https://example.com/docs/img/flow.png".to_string()));
        assert!(links.contains(&"https://guide.example.org/start".to_string()));
    }

    #[test]
    fn test_mailto_keeps_its_scheme() {
        let links = extract_markdown_links("Email [me](mailto:test@example.com)", &base());
        assert_eq!(links, vec!["mailto:test@example.com"]);
    }

    #[test]
    fn test_empty_destination_ignored() {
        let links = extract_markdown_links("[nothing]()", &base());
        assert!(links.is_empty());
    }

    #[test]
    fn test_links_inside_html_block() {
        let markdown = "<div align=\"center\">\n[Guide](./guide.md) | [Site](https://site.example.org \"home\")\n</div>\n";
        let links = extract_markdown_links(markdown, &base());
        assert_eq!(
            links,
            vec!["https://example.com/docs/guide.md", "https://site.example.org"]
        );
    }

    #[test]
    fn test_html_block_without_links() {
        let links = extract_markdown_links("<div>\nno links [here] (either)\n</div>\n", &base());
        assert!(links.is_empty());
    }

    #[test]
    fn test_base_without_trailing_slash_replaces_last_segment() {
        let base = Url::parse("https://example.com/docs").unwrap();
        assert_eq!(normalize_target("foo.md", &base), "https://example.com/foo.md");
    }
}
