// src/checker/extract.rs
// =============================================================================
// This module turns a documentation tree into a set of link targets.
//
// How it works:
// 1. Walk the docs directory and yield every markup file (by extension)
// 2. Read each file and run both link patterns over it
//    (markdown links via markdown.rs, raw href attributes via html.rs)
// 3. Union everything into one deduplicated set
//
// A file we can't read is logged and skipped - one bad file never stops
// the scan.
// =============================================================================

use super::html::extract_html_links;
use super::markdown::extract_markdown_links;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;
use walkdir::WalkDir;

/// All markup files below a root directory.
///
/// Nothing is read until `iter()` is called, and every call walks the tree
/// again, so the sequence can be restarted.
#[derive(Debug, Clone)]
pub struct MarkupFiles {
    root: PathBuf,
    extension: String,
}

impl MarkupFiles {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable entry under {}: {}", self.root.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| self.matches(entry.path()))
            .map(|entry| entry.into_path())
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

/// Counters from one pass over the docs tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_failed: usize,
}

/// Pulls link targets out of markup files.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    base: Url,
}

impl LinkExtractor {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Both patterns over one piece of text, deduplicated.
    pub fn extract_from_str(&self, content: &str) -> BTreeSet<String> {
        let mut targets: BTreeSet<String> =
            extract_markdown_links(content, &self.base).into_iter().collect();
        targets.extend(extract_html_links(content));
        targets
    }

    /// Reads one file. `None` means the file couldn't be read; the error has
    /// already been logged.
    pub fn extract_file(&self, path: &Path) -> Option<BTreeSet<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Some(self.extract_from_str(&content)),
            Err(e) => {
                tracing::error!("error reading {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Every distinct target found in every file.
    pub fn collect(&self, files: &MarkupFiles) -> (BTreeSet<String>, ScanStats) {
        let mut all = BTreeSet::new();
        let mut stats = ScanStats::default();

        for path in files.iter() {
            stats.files_scanned += 1;
            match self.extract_file(&path) {
                Some(targets) => {
                    tracing::debug!("{} link(s) in {}", targets.len(), path.display());
                    all.extend(targets);
                }
                None => stats.files_failed += 1,
            }
        }

        (all, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> LinkExtractor {
        LinkExtractor::new(Url::parse("https://example.com/docs/").unwrap())
    }

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_only_markup_files_are_walked() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", b"# hi");
        write(dir.path(), "guide/setup.MD", b"# setup");
        write(dir.path(), "guide/notes.txt", b"[x](y)");
        write(dir.path(), "img/logo.png", b"\x89PNG");

        let files = MarkupFiles::new(dir.path(), ".md");
        let found: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(found, vec![PathBuf::from("guide/setup.MD"), PathBuf::from("index.md")]);

        // Walking again gives the same sequence
        assert_eq!(files.iter().count(), 2);
    }

    #[test]
    fn test_both_patterns_deduplicated() {
        let content = r#"
[site](https://example.org)
[again](https://example.org)
<a href="https://example.org">same one</a>
<a href="https://other.example.org/x">other</a>
[local](./foo.md)
        "#;
        let targets = extractor().extract_from_str(content);
        let expected: BTreeSet<String> = [
            "https://example.org",
            "https://other.example.org/x",
            "https://example.com/docs/foo.md",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(targets, expected);
    }

    #[test]
    fn test_markdown_links_in_html_header_block() {
        let content = "<div align=\"center\">\n[Guide](./guide.md) | [Site](https://site.example.org)\n</div>\n\n# Title\n";
        let targets = extractor().extract_from_str(content);
        assert!(targets.contains("https://example.com/docs/guide.md"));
        assert!(targets.contains("https://site.example.org"));
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_unreadable_file_does_not_stop_the_scan() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", b"[a](https://a.example.com)");
        // Not valid UTF-8, so read_to_string fails
        write(dir.path(), "b.md", &[0xff, 0xfe, 0x00, 0x9f]);
        write(dir.path(), "c.md", b"[c](https://c.example.com)");

        let (targets, stats) = extractor().collect(&MarkupFiles::new(dir.path(), "md"));
        assert_eq!(stats, ScanStats { files_scanned: 3, files_failed: 1 });
        assert_eq!(targets.len(), 2);
        assert!(targets.contains("https://a.example.com"));
        assert!(targets.contains("https://c.example.com"));
    }

    #[test]
    fn test_missing_file_yields_none() {
        assert!(extractor().extract_file(Path::new("/no/such/file.md")).is_none());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.md", b"[x](./foo.md) [y](https://y.example.com)");
        write(dir.path(), "sub/two.md", b"<a href='https://z.example.com'>z</a> [x](../foo.md)");

        let files = MarkupFiles::new(dir.path(), "md");
        let (first, _) = extractor().collect(&files);
        let (second, _) = extractor().collect(&files);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}
