//! Metadata header of the Markdown conversion that sits next to an indexed PDF.
//!
//! ```text
//! - Attachment Key: ABCD1234
//! - Source PDF: /Users/j/Zotero/storage/ABCD1234/paper.pdf
//! - Zotero Link: zotero://select/library/items/ABCD1234
//! ```
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use zotseek_core::types::SidecarMeta;

/// Only the header is scanned.
pub const SCAN_LINES: usize = 40;

const ATTACHMENT_KEY_LABEL: &str = "- Attachment Key:";
const SOURCE_PDF_LABEL: &str = "- Source PDF:";
const ZOTERO_LINK_LABEL: &str = "- Zotero Link:";

const TEXT_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// The sidecar for a hit: the source itself when it is a text file, otherwise
/// the `.md` file with the same stem in the same directory.
pub fn sidecar_path(source_path: &Path) -> PathBuf {
    let is_text = source_path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t)));
    if is_text { source_path.to_path_buf() } else { source_path.with_extension("md") }
}

/// Read the sidecar for `source_path`; a missing or unreadable file yields empty metadata.
pub fn read_sidecar(source_path: &Path) -> SidecarMeta {
    match File::open(sidecar_path(source_path)) {
        Ok(file) => parse_sidecar(BufReader::new(file)),
        Err(_) => SidecarMeta::default(),
    }
}

pub fn parse_sidecar<R: BufRead>(reader: R) -> SidecarMeta {
    let mut meta = SidecarMeta::default();
    for line in reader.lines().take(SCAN_LINES).map_while(Result::ok) {
        let line = line.trim();
        if let Some(v) = labeled_value(line, ATTACHMENT_KEY_LABEL) {
            meta.attachment_key = Some(v);
        } else if let Some(v) = labeled_value(line, SOURCE_PDF_LABEL) {
            meta.source_pdf = Some(v);
        } else if let Some(v) = labeled_value(line, ZOTERO_LINK_LABEL) {
            meta.external_link = Some(v);
        }
        if meta.is_complete() {
            break;
        }
    }
    meta
}

fn labeled_value(line: &str, label: &str) -> Option<String> {
    let value = line.strip_prefix(label)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}
