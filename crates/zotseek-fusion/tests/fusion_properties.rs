use proptest::prelude::*;
use std::collections::HashSet;

use zotseek_core::types::SimilarityHit;
use zotseek_fusion::dedupe_and_rank;

fn hits() -> impl Strategy<Value = Vec<SimilarityHit>> {
    prop::collection::vec(("[a-d]{0,2}", -10.0f64..10.0), 0..40)
        .prop_map(|v| v.into_iter().map(|(p, s)| SimilarityHit::new(p, "", "", s)).collect())
}

proptest! {
    #[test]
    fn survivors_have_distinct_paths(input in hits(), cap in 1usize..12) {
        let out = dedupe_and_rank(input, cap);
        let paths: HashSet<_> = out.iter().map(|h| h.source_path.clone()).collect();
        prop_assert_eq!(paths.len(), out.len());
        prop_assert!(out.iter().all(|h| !h.source_path.is_empty()));
    }

    #[test]
    fn survivor_holds_the_max_score_for_its_path(input in hits()) {
        let out = dedupe_and_rank(input.clone(), usize::MAX);
        for survivor in &out {
            let best = input
                .iter()
                .filter(|h| h.source_path == survivor.source_path)
                .map(|h| h.fusion_score)
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(survivor.fusion_score >= best);
        }
    }

    #[test]
    fn output_is_capped_and_non_increasing(input in hits(), cap in 0usize..12) {
        let out = dedupe_and_rank(input, cap);
        prop_assert!(out.len() <= cap);
        prop_assert!(out.windows(2).all(|w| w[0].fusion_score >= w[1].fusion_score));
    }
}
