//! Settings loader and path helpers.
//!
//! Uses Figment to merge a base TOML file + `config.<env>.toml` + `APP_*` env vars
//! and extracts the result once into an immutable [`Settings`] value. Path fields
//! are expanded for `~` and `${VAR}` before validation.
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::BackendKind;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub action: ActionSettings,
    pub paths: PathSettings,
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
    pub semantic: SemanticSettings,
    pub fzf: FzfSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSettings {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    pub semsearch_project: PathBuf,
    pub db_path: PathBuf,
    pub faiss_path: PathBuf,
    pub zotero_db_path: PathBuf,
    pub zotero_storage_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub use_local: bool,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub semantic_prefix: String,
    /// Raw hits requested from the similarity backend.
    pub top_k: usize,
    /// Distinct documents kept after fusion.
    pub semantic_max_docs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticSettings {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FzfSettings {
    pub enable: bool,
    pub max_results: usize,
    pub max_candidates: usize,
    pub helper: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Settings {
    /// Load `config.toml` from the working directory plus env overlays.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load the given base file, then `config.<RUST_ENV>.toml` next to it, then `APP_*` vars.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Configuration(format!("config file not found: {}", path.display())));
        }
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut figment = Figment::new().merge(Toml::file(path));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Self::from_figment(&figment, base_dir)
    }

    /// Extract, expand and validate settings from an already-assembled figment.
    /// Relative paths are resolved against `base_dir`.
    pub fn from_figment(figment: &Figment, base_dir: &Path) -> Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        let settings = settings.expanded(base_dir);
        settings.validate()?;
        Ok(settings)
    }

    pub fn backend(&self) -> BackendKind {
        BackendKind::from_use_local(self.embedding.use_local)
    }

    fn expanded(mut self, base_dir: &Path) -> Self {
        let paths = &mut self.paths;
        for p in [
            &mut paths.semsearch_project,
            &mut paths.db_path,
            &mut paths.faiss_path,
            &mut paths.zotero_db_path,
            &mut paths.zotero_storage_dir,
            &mut self.semantic.program,
            &mut self.fzf.helper,
        ] {
            let raw = p.to_string_lossy().trim().to_string();
            *p = if raw.is_empty() { PathBuf::new() } else { resolve_with_base(base_dir, raw) };
        }
        self
    }

    fn validate(&self) -> Result<()> {
        require_str("action.title", &self.action.title)?;
        require_str("embedding.model", &self.embedding.model)?;
        require_str("search.semantic_prefix", &self.search.semantic_prefix)?;
        require_positive("search.top_k", self.search.top_k)?;
        require_positive("search.semantic_max_docs", self.search.semantic_max_docs)?;
        require_positive("fzf.max_results", self.fzf.max_results)?;
        require_positive("fzf.max_candidates", self.fzf.max_candidates)?;
        for (key, p) in [
            ("paths.semsearch_project", &self.paths.semsearch_project),
            ("paths.db_path", &self.paths.db_path),
            ("paths.faiss_path", &self.paths.faiss_path),
            ("paths.zotero_db_path", &self.paths.zotero_db_path),
            ("paths.zotero_storage_dir", &self.paths.zotero_storage_dir),
            ("semantic.program", &self.semantic.program),
            ("fzf.helper", &self.fzf.helper),
        ] {
            require_str(key, &p.to_string_lossy())?;
        }
        Ok(())
    }

    /// Check that everything semantic mode reads from disk is present.
    pub fn validate_semantic_paths(&self) -> Result<()> {
        let checks = [
            (&self.paths.semsearch_project, "semsearch project directory"),
            (&self.paths.db_path, "semantic index database"),
            (&self.paths.faiss_path, "semantic vector index"),
            (&self.paths.zotero_db_path, "Zotero database"),
        ];
        for (path, what) in checks {
            if !path.exists() {
                return Err(Error::Configuration(format!("{what} not found: {}", path.display())));
            }
        }
        Ok(())
    }
}

/// `config.toml` in the first of `dirs` that has one; the first candidate when none does.
pub fn find_config_file<I, P>(dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let candidates: Vec<PathBuf> = dirs.into_iter().map(|d| d.as_ref().join(DEFAULT_CONFIG_FILE)).collect();
    candidates.iter().find(|p| p.is_file()).or_else(|| candidates.first()).cloned()
}

fn require_str(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Configuration(format!("{key} must be a non-empty string")));
    }
    Ok(())
}

fn require_positive(key: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::Configuration(format!("{key} must be greater than zero")));
    }
    Ok(())
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref().trim();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
