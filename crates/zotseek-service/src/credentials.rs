//! OpenRouter API key discovery.
//!
//! Launchers rarely inherit the login shell's environment, so when the variable is not
//! set the key is read from the `export` lines of the usual zsh startup files.
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use zotseek_backends::semantic::API_KEY_VAR;

const SHELL_FILES: [&str; 3] = [".zshrc", ".zprofile", ".zshenv"];

#[derive(Debug, Clone, Default)]
pub struct ApiKeyLookup {
    env_value: Option<String>,
    home: Option<PathBuf>,
}

impl ApiKeyLookup {
    pub fn new(env_value: Option<String>, home: Option<PathBuf>) -> Self {
        Self { env_value, home }
    }

    /// Lookup over the current process environment and `$HOME`.
    pub fn from_env() -> Self {
        Self::new(env::var(API_KEY_VAR).ok(), env::var_os("HOME").map(PathBuf::from))
    }

    pub fn resolve(&self) -> Option<String> {
        let from_env = self.env_value.as_deref().map(str::trim).filter(|v| !v.is_empty());
        if let Some(key) = from_env {
            return Some(key.to_string());
        }
        let home = self.home.as_deref()?;
        SHELL_FILES.iter().find_map(|name| key_from_shell_file(&home.join(name)))
    }
}

fn key_from_shell_file(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    text.lines().filter_map(parse_export_line).find(|v| !v.is_empty() && !v.starts_with('$')).map(str::to_string)
}

/// Value of an `export OPENROUTER_API_KEY=...` line, with matching quotes removed.
pub fn parse_export_line(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("export")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let value = rest.trim_start().strip_prefix(API_KEY_VAR)?.trim_start().strip_prefix('=')?.trim();
    Some(strip_quotes(value))
}

fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    match bytes {
        [first @ (b'"' | b'\''), .., last] if first == last => &value[1..value.len() - 1],
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_lines() {
        assert_eq!(parse_export_line("export OPENROUTER_API_KEY=sk-1"), Some("sk-1"));
        assert_eq!(parse_export_line("  export   OPENROUTER_API_KEY = \"sk-2\"  "), Some("sk-2"));
        assert_eq!(parse_export_line("export OPENROUTER_API_KEY='sk-3'"), Some("sk-3"));
        assert_eq!(parse_export_line("export OPENROUTER_API_KEY=\"sk-4'"), Some("\"sk-4'"));
        assert_eq!(parse_export_line("exportOPENROUTER_API_KEY=x"), None);
        assert_eq!(parse_export_line("OPENROUTER_API_KEY=x"), None);
        assert_eq!(parse_export_line("export OTHER_KEY=x"), None);
        assert_eq!(parse_export_line("# export OPENROUTER_API_KEY=x"), None);
    }

    #[test]
    fn env_value_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".zshrc"), "export OPENROUTER_API_KEY=from-file\n").unwrap();
        let lookup = ApiKeyLookup::new(Some(" from-env ".into()), Some(dir.path().to_path_buf()));
        assert_eq!(lookup.resolve().as_deref(), Some("from-env"));
    }

    #[test]
    fn shell_files_in_order_skipping_references() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".zshrc"), "export OPENROUTER_API_KEY=$SECRET\nexport OPENROUTER_API_KEY=\"\"\n").unwrap();
        fs::write(dir.path().join(".zprofile"), "alias ll='ls -l'\nexport OPENROUTER_API_KEY='sk-profile'\n").unwrap();
        fs::write(dir.path().join(".zshenv"), "export OPENROUTER_API_KEY=sk-env\n").unwrap();
        let lookup = ApiKeyLookup::new(Some("   ".into()), Some(dir.path().to_path_buf()));
        assert_eq!(lookup.resolve().as_deref(), Some("sk-profile"));
    }

    #[test]
    fn nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ApiKeyLookup::new(None, Some(dir.path().to_path_buf())).resolve(), None);
        assert_eq!(ApiKeyLookup::new(None, None).resolve(), None);
    }
}
