use std::collections::HashMap;

use zotseek_core::types::SimilarityHit;

/// Keep the best hit per `source_path`, sort by score descending and truncate to `cap`.
///
/// Hits with a blank source path are dropped. On equal scores the earlier hit wins,
/// both when choosing a survivor and when ordering survivors.
pub fn dedupe_and_rank(hits: Vec<SimilarityHit>, cap: usize) -> Vec<SimilarityHit> {
    let mut slot_by_path: HashMap<String, usize> = HashMap::new();
    let mut survivors: Vec<SimilarityHit> = Vec::new();
    for hit in hits.into_iter().map(SimilarityHit::normalized) {
        if hit.source_path.is_empty() {
            continue;
        }
        match slot_by_path.get(&hit.source_path) {
            Some(&slot) => {
                if hit.fusion_score > survivors[slot].fusion_score {
                    survivors[slot] = hit;
                }
            }
            None => {
                slot_by_path.insert(hit.source_path.clone(), survivors.len());
                survivors.push(hit);
            }
        }
    }
    // sort_by is stable, so ties keep first-seen order
    survivors.sort_by(|a, b| b.fusion_score.total_cmp(&a.fusion_score));
    survivors.truncate(cap);
    survivors
}
