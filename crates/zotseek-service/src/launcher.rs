//! Query-mode dispatch for the launcher entry point.
use tracing::info;

use zotseek_backends::CommandSimilaritySearch;
use zotseek_core::config::Settings;
use zotseek_core::error::Error;
use zotseek_core::traits::KeywordSearch;
use zotseek_core::types::{BackendKind, ResponseItem};
use zotseek_fusion::{FusionEngine, FusionSettings};
use zotseek_zotero::ZoteroLibrary;

use crate::credentials::{ApiKeyLookup, API_KEY_VAR};
use crate::orchestrator::{keyword_error_item, SearchService};

pub const CONFIG_ERROR_TITLE: &str = "Configuration error";
pub const INDEX_CONFIG_ERROR_TITLE: &str = "Index configuration error";

pub struct Launcher<K> where K: KeywordSearch {
    settings: Settings,
    keyword: K,
    api_key: ApiKeyLookup,
}

impl<K> Launcher<K> where K: KeywordSearch {
    pub fn new(settings: Settings, keyword: K) -> Self {
        Self { settings, keyword, api_key: ApiKeyLookup::from_env() }
    }

    pub fn with_api_key_lookup(mut self, lookup: ApiKeyLookup) -> Self {
        self.api_key = lookup;
        self
    }

    /// Plain text goes to keyword search; text behind the semantic prefix goes to semantic search.
    pub fn run<I, S>(&self, args: I) -> Vec<ResponseItem>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let query = join_query(args);
        let prefix = self.settings.search.semantic_prefix.as_str();
        if query.is_empty() {
            return vec![ResponseItem::info(
                "Enter search keywords",
                format!("Plain text runs the Zotero keyword search (fzf); prefix with {prefix} for semantic search."),
            )];
        }
        match query.strip_prefix(prefix).map(str::trim) {
            Some("") => vec![ResponseItem::info(
                "Enter a semantic query",
                format!("Type your query after the {prefix} prefix."),
            )],
            Some(semantic) => self.semantic(semantic),
            None => self.keyword(&query),
        }
    }

    fn keyword(&self, query: &str) -> Vec<ResponseItem> {
        info!(mode = "keyword", "running query");
        self.keyword.search(query).unwrap_or_else(|e| vec![keyword_error_item(&e)])
    }

    fn semantic(&self, query: &str) -> Vec<ResponseItem> {
        let settings = &self.settings;
        let backend = settings.backend();
        info!(mode = "semantic", ?backend, "running query");
        if let Err(e) = settings.validate_semantic_paths() {
            let detail = match e {
                Error::Configuration(msg) => msg,
                other => other.to_string(),
            };
            return vec![ResponseItem::error(INDEX_CONFIG_ERROR_TITLE, detail)];
        }

        let api_key = match backend {
            BackendKind::Local => None,
            BackendKind::Remote => match self.api_key.resolve() {
                Some(key) => Some(key),
                None => {
                    return vec![ResponseItem::error(
                        format!("{API_KEY_VAR} not found"),
                        "Set the API key, then search again.",
                    )]
                }
            },
        };

        let engine = FusionEngine::new(
            CommandSimilaritySearch::from_settings(settings, api_key.as_deref()),
            ZoteroLibrary::new(&settings.paths.zotero_db_path, &settings.paths.zotero_storage_dir),
            FusionSettings { top_k: settings.search.top_k, result_cap: settings.search.semantic_max_docs },
        );
        SearchService::new(engine, &self.keyword, backend).search(query)
    }
}

/// Non-blank arguments, trimmed and joined with single spaces.
pub fn join_query<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .filter_map(|a| {
            let a = a.as_ref().trim();
            (!a.is_empty()).then(|| a.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}
