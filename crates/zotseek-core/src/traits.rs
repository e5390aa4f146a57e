use std::collections::{BTreeSet, HashMap};

use crate::types::{AttachmentRecord, ResponseItem, SimilarityHit};

/// Primary semantic search: query in, ranked raw hits out.
pub trait SimilaritySearch {
    fn search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<SimilarityHit>>;
}

/// Batched metadata lookup keyed by attachment identifier.
///
/// Identifiers with no matching record are simply absent from the map.
pub trait MetadataSource {
    fn load_metadata(&self, keys: &BTreeSet<String>) -> crate::error::Result<HashMap<String, AttachmentRecord>>;
}

/// Alternate keyword search that returns display items ready for output.
pub trait KeywordSearch {
    fn search(&self, query: &str) -> crate::error::Result<Vec<ResponseItem>>;
}

impl<T: SimilaritySearch + ?Sized> SimilaritySearch for &T {
    fn search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<SimilarityHit>> { (**self).search(query, top_k) }
}

impl<T: MetadataSource + ?Sized> MetadataSource for &T {
    fn load_metadata(&self, keys: &BTreeSet<String>) -> crate::error::Result<HashMap<String, AttachmentRecord>> { (**self).load_metadata(keys) }
}

impl<T: KeywordSearch + ?Sized> KeywordSearch for &T {
    fn search(&self, query: &str) -> crate::error::Result<Vec<ResponseItem>> { (**self).search(query) }
}
