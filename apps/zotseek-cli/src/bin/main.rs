//! Launcher script-filter entry point: query words in, a JSON array of items on stdout.
//!
//! Logs go to stderr so they never mix with the item protocol.
use anyhow::Result;
use clap::Parser;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::EnvFilter;

use zotseek_backends::HelperKeywordSearch;
use zotseek_core::config::{find_config_file, Settings};
use zotseek_core::error::Error;
use zotseek_core::types::ResponseItem;
use zotseek_service::launcher::CONFIG_ERROR_TITLE;
use zotseek_service::Launcher;

#[derive(Parser, Debug)]
#[command(name = "zotseek", version, about = "Zotero keyword and semantic search for launcher script filters")]
struct Args {
    /// Config file (default: config.toml in the working directory, next to the binary, or one level up)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Query words; start with the semantic prefix for semantic search
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    query: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = match args.config.or_else(default_config) {
        Some(path) => Settings::load_from(&path),
        None => Settings::load(),
    };

    let items = match loaded {
        Ok(settings) => {
            init_tracing(&settings.log.level);
            let keyword = HelperKeywordSearch::from_settings(&settings);
            Launcher::new(settings, keyword).run(&args.query)
        }
        Err(e) => {
            init_tracing("info");
            error!(error = %e, "failed to load configuration");
            let detail = match e {
                Error::Configuration(msg) => msg,
                other => other.to_string(),
            };
            vec![ResponseItem::error(CONFIG_ERROR_TITLE, detail)]
        }
    };

    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, &items)?;
    out.flush()?;
    Ok(())
}

/// Launchers start scripts from their own working directory, so the config is also
/// looked up beside the binary and in its parent (the action bundle's `Contents`).
fn default_config() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()?.parent()?.to_path_buf();
    let mut dirs = vec![PathBuf::from("."), exe_dir.clone()];
    dirs.extend(exe_dir.parent().map(Path::to_path_buf));
    find_config_file(dirs)
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}
