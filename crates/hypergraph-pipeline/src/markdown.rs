//! Markdown discovery and front matter parsing

use std::path::{Path, PathBuf};

use hypergraph_core::Record;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{PipelineError, PipelineResult};

/// A markdown file split into front matter and body
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownDocument {
    pub path: PathBuf,
    /// Front matter mapping, empty when absent or malformed
    pub metadata: Record,
    /// Text after the front matter block
    pub body: String,
    /// Full file text
    pub text: String,
}

impl MarkdownDocument {
    /// Split `text` into optional YAML front matter and body
    ///
    /// Front matter must open the file with a `---` line and end at the next
    /// `---` line. Anything else is body.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();

        let (metadata, body) = match split_front_matter(&text) {
            Some((header, body)) => (parse_header(&path, header), body.to_string()),
            None => (Record::new(), text.clone()),
        };

        Self {
            path,
            metadata,
            body,
            text,
        }
    }

    /// Read and parse a file
    pub async fn load(path: &Path) -> PipelineResult<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        let doc = Self::parse(path, text);
        debug!(path = %path.display(), has_metadata = !doc.metadata.is_empty(), "Markdown loaded");
        Ok(doc)
    }

    /// File name without extension
    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    /// Front matter string value, trimmed and non-empty
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// `(header, body)` when `text` opens with a closed front matter block
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let header = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\r', '\n']);
            return Some((header, body));
        }
        offset += line.len();
    }
    None
}

fn parse_header(path: &Path, header: &str) -> Record {
    if header.trim().is_empty() {
        return Record::new();
    }
    match serde_yaml::from_str::<Record>(header) {
        Ok(record) => record,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring malformed front matter");
            Record::new()
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Every `*.md` file under `root`, sorted by path, skipping hidden entries
///
/// A missing root is not an error and yields no files.
pub fn discover_markdown(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        info!(root = %root.display(), "Markdown root missing");
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();

    files.sort();
    info!(root = %root.display(), count = files.len(), "Markdown documents found");
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_front_matter_is_split() {
        let doc = MarkdownDocument::parse(
            "alice.md",
            "---\nid: p-1\ntype: Person\nname: Alice\ntags: [rust, sql]\n---\n\n# Alice\n",
        );

        assert_eq!(doc.metadata.get("id"), Some(&json!("p-1")));
        assert_eq!(doc.metadata.get("tags"), Some(&json!(["rust", "sql"])));
        assert_eq!(doc.body, "# Alice\n");
        assert_eq!(doc.meta_str("type"), Some("Person"));
    }

    #[test]
    fn test_no_front_matter() {
        let doc = MarkdownDocument::parse("plain.md", "# Title\n---\nnot: metadata\n");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, doc.text);
    }

    #[test]
    fn test_unclosed_front_matter_is_body() {
        let doc = MarkdownDocument::parse("open.md", "---\nname: Alice\nno closing line\n");
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, doc.text);
    }

    #[test]
    fn test_malformed_or_non_mapping_header_is_empty() {
        let bad = MarkdownDocument::parse("bad.md", "---\nname: [unclosed\n---\nbody\n");
        assert!(bad.metadata.is_empty());
        assert_eq!(bad.body, "body\n");

        let list = MarkdownDocument::parse("list.md", "---\n- a\n- b\n---\nbody\n");
        assert!(list.metadata.is_empty());
    }

    #[test]
    fn test_empty_header_and_crlf() {
        let empty = MarkdownDocument::parse("e.md", "---\n---\nbody");
        assert!(empty.metadata.is_empty());
        assert_eq!(empty.body, "body");

        let crlf = MarkdownDocument::parse("c.md", "---\r\nname: Bob\r\n---\r\nbody\r\n");
        assert_eq!(crlf.meta_str("name"), Some("Bob"));
        assert_eq!(crlf.body, "body\r\n");
    }

    #[test]
    fn test_discover_skips_hidden_and_sorts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("b")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("b/two.md"), "two").unwrap();
        std::fs::write(root.join("a.md"), "one").unwrap();
        std::fs::write(root.join(".hidden.md"), "hidden").unwrap();
        std::fs::write(root.join(".git/skip.md"), "skip").unwrap();
        std::fs::write(root.join("notes.txt"), "text").unwrap();

        let files = discover_markdown(root);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.md", "b/two.md"]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(discover_markdown(&dir.path().join("absent")).is_empty());
    }
}
