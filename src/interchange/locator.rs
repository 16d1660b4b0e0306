//! Blob discovery in shared documents
//!
//! Shared settings travel as plain text pasted into Markdown documents, so
//! candidates live in fenced code blocks and inline code spans. The locator
//! only finds text fragments; validation stays in the validator, and a
//! fingerprint cache keeps repeated scans from re-parsing fragments that
//! already failed.

use crate::interchange::serializer::SettingsBlob;
use crate::interchange::validator::{self, BlobRejection};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::{HashSet, VecDeque};
use std::str::Lines;
use tracing::{debug, warn};

/// Yields candidate blob texts found in a document. Each call rescans; the
/// returned iterator is lazy and finite.
pub trait BlobLocator {
    fn locate<'a>(&'a self, root: &'a str) -> Box<dyn Iterator<Item = String> + 'a>;
}

/// Finds candidates in fenced code blocks and inline code spans
pub struct CodeBlockLocator {
    inline: Regex,
}

impl CodeBlockLocator {
    pub fn new() -> Self {
        Self {
            // single-backtick spans on one line
            inline: Regex::new(r"`([^`\n]+)`").expect("inline code pattern is valid"),
        }
    }
}

impl Default for CodeBlockLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobLocator for CodeBlockLocator {
    fn locate<'a>(&'a self, root: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(CodeCandidates {
            lines: root.lines(),
            inline: &self.inline,
            fence: None,
            pending: VecDeque::new(),
        })
    }
}

/// Lazy walk over a document's code fragments
struct CodeCandidates<'a> {
    lines: Lines<'a>,
    inline: &'a Regex,
    /// Accumulated lines of the open fenced block, if any
    fence: Option<Vec<&'a str>>,
    pending: VecDeque<String>,
}

impl Iterator for CodeCandidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(candidate) = self.pending.pop_front() {
                return Some(candidate);
            }
            // running out of lines inside a fence drops the unterminated block
            let line = self.lines.next()?;
            if self.fence.is_some() {
                if line.trim_start().starts_with("```") {
                    let body = self.fence.take().unwrap_or_default().join("\n");
                    if !body.trim().is_empty() {
                        return Some(body);
                    }
                } else if let Some(block) = self.fence.as_mut() {
                    block.push(line);
                }
            } else if line.trim_start().starts_with("```") {
                self.fence = Some(Vec::new());
            } else {
                for capture in self.inline.captures_iter(line) {
                    self.pending.push_back(capture[1].to_string());
                }
            }
        }
    }
}

/// Remembers fragments that already failed validation so a rescan of the
/// same document skips them without re-parsing
#[derive(Debug, Default)]
pub struct ScanCache {
    rejected: HashSet<String>,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rejected(&self, fragment: &str) -> bool {
        self.rejected.contains(&fingerprint(fragment))
    }

    pub fn mark_rejected(&mut self, fragment: &str) {
        self.rejected.insert(fingerprint(fragment));
    }

    pub fn len(&self) -> usize {
        self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rejected.is_empty()
    }
}

fn fingerprint(fragment: &str) -> String {
    hex::encode(Sha256::digest(fragment.as_bytes()))
}

/// Outcome of scanning one document
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Valid blobs, in document order
    pub found: Vec<SettingsBlob>,
    /// Fragments newly rejected by this scan
    pub rejections: Vec<BlobRejection>,
    /// Fragments skipped because a previous scan already rejected them
    pub cached_skips: usize,
}

/// Drives a locator over a document and validates what it finds
pub struct Scanner<L: BlobLocator> {
    locator: L,
    cache: ScanCache,
}

impl<L: BlobLocator> Scanner<L> {
    pub fn new(locator: L) -> Self {
        Self {
            locator,
            cache: ScanCache::new(),
        }
    }

    pub fn scan(&mut self, root: &str) -> ScanReport {
        let mut report = ScanReport::default();
        for candidate in self.locator.locate(root) {
            if self.cache.is_rejected(&candidate) {
                report.cached_skips += 1;
                continue;
            }
            match validator::validate(&candidate) {
                Ok(blob) => {
                    debug!(username = %blob.manifest.username, "found settings blob");
                    report.found.push(blob);
                }
                Err(rejection) => {
                    if let BlobRejection::VersionMismatch { .. } = &rejection {
                        warn!(%rejection, "found settings blob from another release");
                    }
                    self.cache.mark_rejected(&candidate);
                    report.rejections.push(rejection);
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate_all(text: &str) -> Vec<String> {
        CodeBlockLocator::new().locate(text).collect()
    }

    #[test]
    fn test_finds_fenced_blocks() {
        let doc = "intro\n```\n{\"a\": 1}\n```\nafter\n```json\n{\"b\": 2}\n```\n";
        assert_eq!(locate_all(doc), vec!["{\"a\": 1}", "{\"b\": 2}"]);
    }

    #[test]
    fn test_finds_inline_spans() {
        let doc = "see `{\"a\":1}` and `{\"b\":2}` here";
        assert_eq!(locate_all(doc), vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn test_multiline_block_preserved() {
        let doc = "```\n{\n  \"a\": 1\n}\n```\n";
        assert_eq!(locate_all(doc), vec!["{\n  \"a\": 1\n}"]);
    }

    #[test]
    fn test_unterminated_fence_yields_nothing() {
        assert!(locate_all("```\n{\"a\": 1}\n").is_empty());
        assert!(locate_all("```\n\n```\n").is_empty());
    }

    #[test]
    fn test_locate_is_restartable() {
        let locator = CodeBlockLocator::new();
        let doc = "`{\"x\":1}`";
        assert_eq!(locator.locate(doc).count(), 1);
        assert_eq!(locator.locate(doc).count(), 1);
    }

    #[test]
    fn test_scan_caches_rejected_fragments() {
        let doc = "junk `not a blob` junk";
        let mut scanner = Scanner::new(CodeBlockLocator::new());

        let first = scanner.scan(doc);
        assert!(first.found.is_empty());
        assert_eq!(first.rejections.len(), 1);
        assert_eq!(first.cached_skips, 0);

        let second = scanner.scan(doc);
        assert!(second.rejections.is_empty());
        assert_eq!(second.cached_skips, 1);
    }

    #[test]
    fn test_scan_finds_valid_blob() {
        let version = crate::version::current_version();
        let doc = format!(
            "a friend shared:\n```\n{{\"manifest\":{{\"username\":\"alice\",\"exported\":\"now\",\"version\":\"{version}\"}},\"options\":[]}}\n```\n"
        );
        let mut scanner = Scanner::new(CodeBlockLocator::new());
        let report = scanner.scan(&doc);
        assert_eq!(report.found.len(), 1);
        assert_eq!(report.found[0].manifest.username, "alice");
    }

    #[test]
    fn test_scan_reports_version_mismatch() {
        let doc = "```\n{\"manifest\":{\"version\":\"0.0.1\"},\"options\":[]}\n```\n";
        let mut scanner = Scanner::new(CodeBlockLocator::new());
        let report = scanner.scan(doc);
        assert!(report.found.is_empty());
        assert!(matches!(
            report.rejections[0],
            BlobRejection::VersionMismatch { .. }
        ));
    }
}
