//! Primary search with degradation to keyword search.
//!
//! A failed semantic query falls back to the keyword helper only when embeddings are
//! computed locally. Remote failures are usually credential or network problems and are
//! reported as-is.
use tracing::warn;

use zotseek_core::error::Error;
use zotseek_core::traits::{KeywordSearch, MetadataSource, SimilaritySearch};
use zotseek_core::types::{BackendKind, ResponseItem};
use zotseek_fusion::FusionEngine;

pub const DEGRADED_TITLE: &str = "Local semantic search is unavailable; using local keyword search instead.";
pub const SEARCH_FAILED_TITLE: &str = "Search failed";
pub const KEYWORD_FAILED_TITLE: &str = "Keyword search failed";

pub struct SearchService<S, M, K> where S: SimilaritySearch, M: MetadataSource, K: KeywordSearch {
    engine: FusionEngine<S, M>,
    keyword: K,
    backend: BackendKind,
}

impl<S, M, K> SearchService<S, M, K> where S: SimilaritySearch, M: MetadataSource, K: KeywordSearch {
    pub fn new(engine: FusionEngine<S, M>, keyword: K, backend: BackendKind) -> Self { Self { engine, keyword, backend } }

    /// Never fails: every outcome is a non-empty item list.
    pub fn search(&self, query: &str) -> Vec<ResponseItem> {
        match self.engine.fuse(query) {
            Ok(items) => items,
            Err(err) => self.degrade(query, err),
        }
    }

    fn degrade(&self, query: &str, err: Error) -> Vec<ResponseItem> {
        match self.backend {
            BackendKind::Remote => {
                warn!(error = %err, "semantic search failed");
                vec![ResponseItem::error(SEARCH_FAILED_TITLE, err.to_string())]
            }
            BackendKind::Local => {
                warn!(error = %err, "semantic search failed, falling back to keyword search");
                match self.keyword.search(query) {
                    Ok(mut items) => {
                        if !items.iter().any(ResponseItem::is_error) {
                            items.insert(0, ResponseItem::info(DEGRADED_TITLE, err.root_cause()));
                        }
                        items
                    }
                    Err(keyword_err) => vec![keyword_error_item(&keyword_err)],
                }
            }
        }
    }
}

pub fn keyword_error_item(err: &Error) -> ResponseItem {
    match err {
        Error::KeywordSearch(detail) => ResponseItem::error(KEYWORD_FAILED_TITLE, detail.as_str()),
        other => ResponseItem::error(KEYWORD_FAILED_TITLE, other.to_string()),
    }
}
