//! zotseek-zotero
//!
//! Read-only access to a live Zotero library: a private snapshot of
//! `zotero.sqlite`, resolution of the stored attachment paths, and the batched
//! metadata join used to enrich search hits.
pub mod library;
pub mod paths;
pub mod snapshot;

pub use library::ZoteroLibrary;
pub use paths::{PathResolver, StoredPath};
pub use snapshot::Snapshot;

/// Deep link that opens an attachment in the Zotero PDF reader.
pub fn open_pdf_url(attachment_key: &str) -> String {
    format!("zotero://open-pdf/library/items/{attachment_key}")
}
