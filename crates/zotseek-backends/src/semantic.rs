//! Semantic index adapter.
//!
//! The index is driven through an external command that prints a JSON array of
//! `{source_path, doc_id, title, fusion_score}` objects. Index location and the
//! embedding backend are passed through `SEMSEARCH_*` environment variables.
use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::process::Command;

use zotseek_core::config::Settings;
use zotseek_core::traits::SimilaritySearch;
use zotseek_core::types::SimilarityHit;

use crate::process;

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

pub struct CommandSimilaritySearch {
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CommandSimilaritySearch {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self { program: program.into(), args, envs: Vec::new() }
    }

    /// Adapter for the configured index. `api_key` is only forwarded for the remote backend.
    pub fn from_settings(settings: &Settings, api_key: Option<&str>) -> Self {
        let paths = &settings.paths;
        let mut search = Self::new(&settings.semantic.program, settings.semantic.args.clone())
            .env("SEMSEARCH_PROJECT", paths.semsearch_project.to_string_lossy())
            .env("SEMSEARCH_DB_PATH", paths.db_path.to_string_lossy())
            .env("SEMSEARCH_INDEX_PATH", paths.faiss_path.to_string_lossy())
            .env("SEMSEARCH_MODEL", &settings.embedding.model)
            .env("SEMSEARCH_USE_LOCAL", if settings.embedding.use_local { "1" } else { "0" });
        if let (false, Some(key)) = (settings.embedding.use_local, api_key) {
            search = search.env(API_KEY_VAR, key);
        }
        search
    }

    pub fn env(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.envs.push((key.into(), value.as_ref().to_string()));
        self
    }

    fn command(&self, query: &str, top_k: usize) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(query)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .env("SEMSEARCH_TOP_K", top_k.to_string());
        cmd
    }
}

impl SimilaritySearch for CommandSimilaritySearch {
    fn search(&self, query: &str, top_k: usize) -> Result<Vec<SimilarityHit>> {
        let out = process::run(&mut self.command(query, top_k))
            .with_context(|| format!("failed to start {}", self.program.display()))?;
        if !out.success() {
            bail!("{}", out.failure_detail());
        }
        let stdout = out.stdout.trim();
        if stdout.is_empty() {
            return Err(anyhow!("semantic search produced no output"));
        }
        let hits: Vec<SimilarityHit> = serde_json::from_str(stdout).context("semantic search output is not a JSON array of hits")?;
        Ok(hits.into_iter().map(SimilarityHit::normalized).collect())
    }
}
