//! Resolution of `itemAttachments.path` values to files on disk.
use std::path::{Path, PathBuf};

const STORAGE_PREFIX: &str = "storage:";
const FILE_URI_PREFIX: &str = "file:";
const DOCUMENT_EXTENSION: &str = "pdf";

/// The encodings Zotero uses for an attachment's stored path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredPath<'a> {
    /// `storage:<name>`, relative to the attachment's storage directory.
    Storage(&'a str),
    /// `file:` or `file://` URI, percent-encoded.
    FileUri(&'a str),
    /// Anything else that is not blank: a plain (linked) path.
    Bare(&'a str),
    /// No path recorded.
    Empty,
}

impl<'a> StoredPath<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix(STORAGE_PREFIX) {
            Self::Storage(rest.trim_start_matches('/'))
        } else if let Some(rest) = raw.strip_prefix(FILE_URI_PREFIX) {
            Self::FileUri(rest.strip_prefix("//").unwrap_or(rest))
        } else if raw.is_empty() {
            Self::Empty
        } else {
            Self::Bare(raw)
        }
    }
}

/// Maps stored paths to files under a Zotero storage root.
///
/// Resolution never fails; `None` means no candidate file was found.
#[derive(Debug, Clone)]
pub struct PathResolver {
    storage_dir: PathBuf,
}

impl PathResolver {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self { storage_dir: storage_dir.into() }
    }

    pub fn resolve(&self, raw_path: &str, attachment_key: &str) -> Option<PathBuf> {
        match StoredPath::parse(raw_path) {
            StoredPath::Storage(rel) => self.resolve_storage(rel, attachment_key),
            StoredPath::FileUri(rest) => resolve_file_uri(rest),
            StoredPath::Bare(path) => Some(PathBuf::from(path)),
            StoredPath::Empty => self.first_document_in(attachment_key),
        }
    }

    fn resolve_storage(&self, rel: &str, attachment_key: &str) -> Option<PathBuf> {
        let attachment_dir = self.attachment_dir(attachment_key)?;
        if !rel.is_empty() {
            let candidate = attachment_dir.join(rel);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        first_document(&attachment_dir)
    }

    fn first_document_in(&self, attachment_key: &str) -> Option<PathBuf> {
        first_document(&self.attachment_dir(attachment_key)?)
    }

    fn attachment_dir(&self, attachment_key: &str) -> Option<PathBuf> {
        let key = attachment_key.trim();
        // a blank or path-like key would escape the per-attachment directory
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return None;
        }
        Some(self.storage_dir.join(key))
    }
}

/// Existence is not checked here; callers verify before opening.
fn resolve_file_uri(rest: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(rest).map(|s| s.into_owned()).unwrap_or_else(|_| rest.to_string());
    if decoded.is_empty() {
        return None;
    }
    if decoded.starts_with('/') { Some(PathBuf::from(decoded)) } else { Some(PathBuf::from(format!("/{decoded}"))) }
}

/// First `*.pdf` file directly inside `dir`, in file-name order.
fn first_document(dir: &Path) -> Option<PathBuf> {
    let mut documents: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION)))
        .collect();
    documents.sort();
    documents.into_iter().next()
}
