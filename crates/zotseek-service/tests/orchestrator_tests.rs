use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use zotseek_core::error::{Error, Result};
use zotseek_core::traits::{KeywordSearch, MetadataSource, SimilaritySearch};
use zotseek_core::types::{AttachmentRecord, BackendKind, ResponseItem, SimilarityHit};
use zotseek_fusion::{FusionEngine, FusionSettings};
use zotseek_service::orchestrator::{DEGRADED_TITLE, KEYWORD_FAILED_TITLE, SEARCH_FAILED_TITLE};
use zotseek_service::SearchService;

const SETTINGS: FusionSettings = FusionSettings { top_k: 10, result_cap: 5 };

struct Failing(&'static str);

impl SimilaritySearch for Failing {
    fn search(&self, _query: &str, _top_k: usize) -> anyhow::Result<Vec<SimilarityHit>> {
        Err(anyhow::anyhow!(self.0))
    }
}

struct Hits(Vec<SimilarityHit>);

impl SimilaritySearch for Hits {
    fn search(&self, _query: &str, _top_k: usize) -> anyhow::Result<Vec<SimilarityHit>> {
        Ok(self.0.clone())
    }
}

struct Records(HashMap<String, AttachmentRecord>);

impl MetadataSource for Records {
    fn load_metadata(&self, keys: &BTreeSet<String>) -> Result<HashMap<String, AttachmentRecord>> {
        Ok(keys.iter().filter_map(|k| self.0.get(k).map(|r| (k.clone(), r.clone()))).collect())
    }
}

struct BrokenDb;

impl MetadataSource for BrokenDb {
    fn load_metadata(&self, _keys: &BTreeSet<String>) -> Result<HashMap<String, AttachmentRecord>> {
        Err(Error::MetadataLookup("no such table: items".into()))
    }
}

#[derive(Default)]
struct Keyword {
    reply: Option<std::result::Result<Vec<ResponseItem>, String>>,
    queries: RefCell<Vec<String>>,
}

impl Keyword {
    fn replying(items: Vec<ResponseItem>) -> Self {
        Self { reply: Some(Ok(items)), ..Self::default() }
    }

    fn failing(msg: &str) -> Self {
        Self { reply: Some(Err(msg.to_string())), ..Self::default() }
    }
}

impl KeywordSearch for Keyword {
    fn search(&self, query: &str) -> Result<Vec<ResponseItem>> {
        self.queries.borrow_mut().push(query.to_string());
        match &self.reply {
            Some(Ok(items)) => Ok(items.clone()),
            Some(Err(msg)) => Err(Error::KeywordSearch(msg.clone())),
            None => Ok(Vec::new()),
        }
    }
}

fn empty_records() -> Records {
    Records(HashMap::new())
}

#[test]
fn success_passes_fused_items_through() {
    let mut records = HashMap::new();
    records.insert(
        "K1".to_string(),
        AttachmentRecord { parent_title: "Paper One".into(), resolved_pdf_path: Some("/a/x.pdf".into()), ..Default::default() },
    );
    let engine = FusionEngine::new(Hits(vec![SimilarityHit::new("/a/x.pdf", "K1", "T", 0.91)]), Records(records), SETTINGS);
    let keyword = Keyword::default();
    let items = SearchService::new(engine, &keyword, BackendKind::Local).search("q");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title(), "x.pdf");
    assert!(keyword.queries.borrow().is_empty());
}

#[test]
fn local_failure_falls_back_with_disclosure() {
    let engine = FusionEngine::new(Failing("connection refused"), empty_records(), SETTINGS);
    let keyword = Keyword::replying(vec![ResponseItem::info("Attention Is All You Need", "Vaswani 2017")]);
    let items = SearchService::new(engine, &keyword, BackendKind::Local).search("attention");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title(), DEGRADED_TITLE);
    assert_eq!(items[0].subtitle(), "connection refused");
    assert!(!items[0].is_error());
    assert_eq!(items[1].title(), "Attention Is All You Need");
    assert_eq!(*keyword.queries.borrow(), vec!["attention".to_string()]);
}

#[test]
fn local_failure_with_failing_alternate_shows_alternate_error_only() {
    let engine = FusionEngine::new(Failing("model server down"), empty_records(), SETTINGS);
    let keyword = Keyword::failing("helper script not found: /x/helper.sh");
    let items = SearchService::new(engine, &keyword, BackendKind::Local).search("q");

    assert_eq!(items.len(), 1);
    assert!(items[0].is_error());
    assert_eq!(items[0].title(), KEYWORD_FAILED_TITLE);
    assert_eq!(items[0].subtitle(), "helper script not found: /x/helper.sh");
}

#[test]
fn local_failure_with_error_items_gets_no_disclosure() {
    let engine = FusionEngine::new(Failing("boom"), empty_records(), SETTINGS);
    let keyword = Keyword::replying(vec![ResponseItem::error("fzf failed", "exit code 2")]);
    let items = SearchService::new(engine, &keyword, BackendKind::Local).search("q");

    assert_eq!(items, vec![ResponseItem::error("fzf failed", "exit code 2")]);
}

#[test]
fn local_metadata_failure_also_degrades() {
    let engine = FusionEngine::new(Hits(vec![SimilarityHit::new("/idx/K1.md", "", "T", 1.0)]), BrokenDb, SETTINGS);
    let keyword = Keyword::replying(vec![ResponseItem::info("hit", "")]);
    let items = SearchService::new(engine, &keyword, BackendKind::Local).search("q");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title(), DEGRADED_TITLE);
    assert_eq!(items[0].subtitle(), "no such table: items");
}

#[test]
fn remote_failure_is_surfaced_without_fallback() {
    let engine = FusionEngine::new(Failing("401 Unauthorized"), empty_records(), SETTINGS);
    let keyword = Keyword::replying(vec![ResponseItem::info("unused", "")]);
    let items = SearchService::new(engine, &keyword, BackendKind::Remote).search("q");

    assert_eq!(items.len(), 1);
    assert!(items[0].is_error());
    assert_eq!(items[0].title(), SEARCH_FAILED_TITLE);
    assert!(items[0].subtitle().contains("401 Unauthorized"));
    assert!(keyword.queries.borrow().is_empty());
}
