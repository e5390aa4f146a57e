//! zotseek-backends
//!
//! Subprocess adapters for the two search collaborators: the semantic index
//! (JSON hits on stdout) and the fzf keyword helper (launcher items on stdout).
pub mod keyword;
pub mod process;
pub mod semantic;

pub use keyword::HelperKeywordSearch;
pub use semantic::CommandSimilaritySearch;
