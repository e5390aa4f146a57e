//! zotseek-fusion
//!
//! Turns raw similarity hits into launcher items: one survivor per source
//! document, ranked and capped, enriched with Zotero metadata or, failing that,
//! with the fields recorded in the document's sidecar file.
pub mod engine;
pub mod items;
pub mod rank;
pub mod sidecar;

pub use engine::{FusionEngine, FusionSettings};
pub use rank::dedupe_and_rank;
