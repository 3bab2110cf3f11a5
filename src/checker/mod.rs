// src/checker/mod.rs
// =============================================================================
// This module contains all link finding and link validation logic.
//
// Submodules:
// - markdown: Extracts [text](url) destinations from markdown text
// - html: Extracts href attributes written as raw HTML
// - extract: Walks the docs tree and combines both patterns per file
// - http: Probes a URL (HEAD, GET fallback) behind the Prober trait
// - retry: Backoff policy used by the HTTP prober
// - validate: Turns one target into one ValidationOutcome
//
// This file (mod.rs) is the module root - it re-exports the public API so
// the rest of the crate can write `checker::Validator` etc.
// =============================================================================

mod extract;
mod html;
mod http;
mod markdown;
mod retry;
pub(crate) mod validate;

pub use extract::{LinkExtractor, MarkupFiles, ScanStats};
pub use html::extract_html_links;
pub use http::{build_prober, HttpProber, ProbeError, ProbeResponse, Prober, UnavailableProber};
pub use markdown::{extract_markdown_links, normalize_target};
pub use retry::RetryPolicy;
pub use validate::{ProbeSettings, ValidationOutcome, Validator, SKIPPED};
