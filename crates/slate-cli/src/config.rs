//! Store-file resolution: `--file` flag, then the `SLATE_FILE` environment
//! variable, then an optional `slate.toml` in the working directory, then
//! the default `slate.csv`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "slate.toml";
pub const STORE_ENV: &str = "SLATE_FILE";
const DEFAULT_STORE: &str = "slate.csv";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    pub path: Option<PathBuf>,
}

/// Resolve the store file path for this invocation.
///
/// # Errors
///
/// Fails when `slate.toml` exists but cannot be read or parsed.
pub fn resolve_store_path(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Ok(value) = std::env::var(STORE_ENV) {
        if !value.is_empty() {
            return Ok(PathBuf::from(value));
        }
    }

    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        let text = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {CONFIG_FILE}"))?;
        let config: CliConfig =
            toml::from_str(&text).with_context(|| format!("failed to parse {CONFIG_FILE}"))?;
        if let Some(path) = config.store.path {
            return Ok(path);
        }
    }

    Ok(PathBuf::from(DEFAULT_STORE))
}

#[cfg(test)]
mod tests {
    use super::CliConfig;
    use std::path::PathBuf;

    #[test]
    fn flag_wins_over_everything() {
        let path = super::resolve_store_path(Some(std::path::Path::new("/tmp/x.csv")))
            .expect("resolve");
        assert_eq!(path, PathBuf::from("/tmp/x.csv"));
    }

    #[test]
    fn config_parses_the_store_section() {
        let config: CliConfig =
            toml::from_str("[store]\npath = \"data/items.csv\"\n").expect("parse");
        assert_eq!(config.store.path, Some(PathBuf::from("data/items.csv")));
    }

    #[test]
    fn empty_config_is_valid() {
        let config: CliConfig = toml::from_str("").expect("parse");
        assert!(config.store.path.is_none());
    }
}
