// src/checker/html.rs
// =============================================================================
// This module finds links written as raw HTML inside markdown files, e.g.
//
//   <a href="https://example.com">Example</a>
//   <link rel="stylesheet" href="https://cdn.example.com/site.css">
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, which tolerates the surrounding markdown text
//
// This pass is independent of the markdown parser: the whole file is fed to
// html5ever, so a tag is found wherever it appears in the text.
// Only absolute http(s) URLs are kept; relative hrefs are dropped.
// =============================================================================

use scraper::{Html, Selector};

// Extracts absolute http(s) URLs from every href attribute in the text
//
// Example:
//   text   = "intro <a href='https://rust-lang.org'>Rust</a> <a href='/local'>x</a>"
//   result = ["https://rust-lang.org"]
pub fn extract_html_links(text: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(text);

    // Any element with an href attribute, not just <a>
    // The selector is a constant, so parsing can only fail on a typo here
    let selector = Selector::parse("[href]").expect("static selector is valid");

    fragment
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| is_absolute_http(href))
        .map(str::to_string)
        .collect()
}

fn is_absolute_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
