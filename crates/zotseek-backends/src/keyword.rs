//! fzf keyword helper adapter.
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use zotseek_core::config::Settings;
use zotseek_core::error::{Error, Result};
use zotseek_core::traits::KeywordSearch;
use zotseek_core::types::ResponseItem;

use crate::process;

const EXTRA_PATH: &str = "/opt/homebrew/bin";
const FZF_CANDIDATES: [&str; 4] = ["/usr/local/bin/fzf", "/opt/homebrew/bin/fzf", "/bin/fzf", "/usr/bin/fzf"];

pub const NO_MATCHES_TITLE: &str = "No matches";

/// Runs the helper script that searches the Zotero library by keyword and
/// prints launcher items.
#[derive(Debug, Clone)]
pub struct HelperKeywordSearch {
    helper: PathBuf,
    enable_fzf: bool,
    storage_dir: PathBuf,
    db_path: PathBuf,
    max_results: usize,
    max_candidates: usize,
}

impl HelperKeywordSearch {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            helper: settings.fzf.helper.clone(),
            enable_fzf: settings.fzf.enable,
            storage_dir: settings.paths.zotero_storage_dir.clone(),
            db_path: settings.paths.zotero_db_path.clone(),
            max_results: settings.fzf.max_results,
            max_candidates: settings.fzf.max_candidates,
        }
    }

    fn command(&self, query: &str) -> Command {
        let fzf_available = self.enable_fzf && find_fzf().is_some();
        let mut path = OsString::from(EXTRA_PATH);
        if let Some(existing) = env::var_os("PATH") {
            path.push(":");
            path.push(existing);
        }

        let mut cmd = Command::new(&self.helper);
        if !query.is_empty() {
            cmd.arg(query);
        }
        cmd.env("PATH", path)
            .env("ENABLE_FZF", if fzf_available { "1" } else { "0" })
            .env("LB_ZOTERO_STORAGE_DIR", &self.storage_dir)
            .env("LB_ZOTERO_DB_PATH", &self.db_path)
            .env("LB_FZF_MAX_RESULTS", self.max_results.to_string())
            .env("LB_FZF_MAX_CANDIDATES", self.max_candidates.to_string());
        cmd
    }
}

impl KeywordSearch for HelperKeywordSearch {
    fn search(&self, query: &str) -> Result<Vec<ResponseItem>> {
        if !self.helper.exists() {
            return Err(Error::KeywordSearch(format!("helper script not found: {}", self.helper.display())));
        }
        let out = process::run(&mut self.command(query))
            .map_err(|e| Error::KeywordSearch(format!("failed to start {}: {e}", self.helper.display())))?;
        if !out.success() {
            return Err(Error::KeywordSearch(out.failure_detail()));
        }

        let stdout = out.stdout.trim();
        if stdout.is_empty() {
            return Ok(vec![ResponseItem::info(NO_MATCHES_TITLE, query)]);
        }
        let parsed: serde_json::Value = serde_json::from_str(stdout)
            .map_err(|_| Error::KeywordSearch("helper output is not valid JSON".to_string()))?;
        if !parsed.is_array() {
            return Err(Error::KeywordSearch("helper output is not a JSON array".to_string()));
        }
        let items: Vec<ResponseItem> = serde_json::from_value(parsed)
            .map_err(|e| Error::KeywordSearch(format!("helper output has a malformed item: {e}")))?;
        debug!(items = items.len(), "keyword helper finished");
        Ok(items)
    }
}

/// `fzf` on PATH, else one of the usual install locations.
pub fn find_fzf() -> Option<PathBuf> {
    env::var_os("PATH")
        .into_iter()
        .flat_map(|paths| env::split_paths(&paths).collect::<Vec<_>>())
        .map(|dir| dir.join("fzf"))
        .chain(FZF_CANDIDATES.iter().map(PathBuf::from))
        .find(|p| p.is_file())
}
