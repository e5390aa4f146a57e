use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use zotseek_core::error::{Error, Result};
use zotseek_core::traits::{MetadataSource, SimilaritySearch};
use zotseek_core::types::{ResponseItem, SidecarMeta, SimilarityHit};

use crate::items::{DocumentView, NO_RESULTS_SUBTITLE, NO_RESULTS_TITLE};
use crate::rank::dedupe_and_rank;
use crate::sidecar::read_sidecar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionSettings {
    /// Raw hits requested from the similarity backend.
    pub top_k: usize,
    /// Distinct documents kept after deduplication.
    pub result_cap: usize,
}

/// Semantic search fused with library metadata.
pub struct FusionEngine<S, M> where S: SimilaritySearch, M: MetadataSource {
    search: S,
    metadata: M,
    settings: FusionSettings,
}

impl<S, M> FusionEngine<S, M> where S: SimilaritySearch, M: MetadataSource {
    pub fn new(search: S, metadata: M, settings: FusionSettings) -> Self { Self { search, metadata, settings } }

    /// Run the query and return two items per distinct document, best first.
    ///
    /// Collaborator failures surface as `Error::PrimarySearch`; metadata failures keep
    /// their own variant. An empty result is an informational item, not an error.
    pub fn fuse(&self, query: &str) -> Result<Vec<ResponseItem>> {
        let hits = self
            .search
            .search(query, self.settings.top_k)
            .map_err(|e| Error::PrimarySearch(format!("{e:#}")))?;
        let raw = hits.len();
        let ranked = dedupe_and_rank(hits, self.settings.result_cap);
        debug!(raw, kept = ranked.len(), cap = self.settings.result_cap, "hits ranked");
        if ranked.is_empty() {
            return Ok(vec![ResponseItem::info(NO_RESULTS_TITLE, NO_RESULTS_SUBTITLE)]);
        }

        let mut candidates: Vec<Candidate> = ranked.into_iter().map(Candidate::new).collect();
        let keys: BTreeSet<String> = candidates.iter().filter_map(|c| c.attachment_key.clone()).collect();
        let metadata = self.metadata.load_metadata(&keys)?;

        let mut items = Vec::with_capacity(candidates.len() * 2);
        for (index, candidate) in candidates.iter_mut().enumerate() {
            let record = candidate.attachment_key.as_ref().and_then(|k| metadata.get(k));
            if record.and_then(|r| r.resolved_pdf_path.as_ref()).is_none() {
                candidate.load_sidecar();
            }
            let view = DocumentView {
                rank: index + 1,
                hit: &candidate.hit,
                attachment_key: candidate.attachment_key.as_deref(),
                record,
                sidecar: candidate.sidecar.as_ref(),
            };
            items.extend(view.items());
        }
        Ok(items)
    }
}

/// A ranked hit plus the identifier it will be looked up under.
struct Candidate {
    hit: SimilarityHit,
    attachment_key: Option<String>,
    sidecar: Option<SidecarMeta>,
}

impl Candidate {
    /// Identifier preference: `doc_id`, then the source file stem, then the sidecar key.
    fn new(hit: SimilarityHit) -> Self {
        let from_hit = Some(hit.doc_id.clone())
            .filter(|k| !k.is_empty())
            .or_else(|| file_stem(&hit.source_path));
        let mut candidate = Self { hit, attachment_key: from_hit, sidecar: None };
        if candidate.attachment_key.is_none() {
            candidate.load_sidecar();
            candidate.attachment_key = candidate
                .sidecar
                .as_ref()
                .and_then(|s| s.attachment_key.clone())
                .filter(|k| !k.trim().is_empty());
        }
        candidate
    }

    fn load_sidecar(&mut self) {
        if self.sidecar.is_none() {
            self.sidecar = Some(read_sidecar(Path::new(&self.hit.source_path)));
        }
    }
}

fn file_stem(path: &str) -> Option<String> {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .filter(|s| !s.is_empty())
}
