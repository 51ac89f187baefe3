use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

pub const DB_PATH_KEY: &str = "IMAGE_VAULT_DB";
pub const ROOT_DIR_KEY: &str = "IMAGE_VAULT_ROOT";
pub const DEFAULT_DB_PATH: &str = "image_vault.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    /// Vault root. When absent the catalog's `root_dir` setting is used.
    pub root_dir: Option<PathBuf>,
}

/// Explicit values, typically from command line flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub root_dir: Option<PathBuf>,
}

impl Config {
    /// Main entry point: flags, then process environment, then `env_file`.
    pub fn resolve(overrides: Overrides, env_file: &Path) -> Result<Self> {
        Self::resolve_with(overrides, env_file, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        overrides: Overrides,
        env_file: &Path,
        process_env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file_values = if env_file.exists() {
            debug!("Reading configuration from {:?}", env_file);
            load_from_env(env_file)?
        } else {
            HashMap::new()
        };

        let lookup = |key: &str| -> Option<PathBuf> {
            process_env(key)
                .or_else(|| file_values.get(key).cloned())
                .filter(|v| !v.trim().is_empty())
                .map(|v| PathBuf::from(v.trim()))
        };

        let db_path = overrides
            .db_path
            .or_else(|| lookup(DB_PATH_KEY))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        let root_dir = overrides.root_dir.or_else(|| lookup(ROOT_DIR_KEY));

        Ok(Self { db_path, root_dir })
    }

    pub fn save_to_env(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path).context("Failed to create .env file")?;
        writeln!(file, "{}={}", DB_PATH_KEY, self.db_path.display())?;
        if let Some(root) = &self.root_dir {
            writeln!(file, "{}={}", ROOT_DIR_KEY, root.display())?;
        }
        info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

fn load_from_env(path: &Path) -> Result<HashMap<String, String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let reader = BufReader::new(file);

    let mut values = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(values)
}
