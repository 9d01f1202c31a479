use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::provider::{DatabaseConfig, JournalMode, SyncMode};

/// On-disk settings for `ctxstore`, read from `ctxstore.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database file; an in-memory database is used when unset
    pub database: Option<String>,
    pub busy_timeout_ms: Option<u64>,
    pub journal_mode: Option<JournalMode>,
    pub sync_mode: Option<SyncMode>,
}

impl StoreConfig {
    /// Resolve connection settings. `database_override` (e.g. a CLI flag) wins
    /// over the configured path.
    pub fn database_config(&self, database_override: Option<&Path>) -> DatabaseConfig {
        let mut config = match database_override {
            Some(path) => DatabaseConfig::file(path),
            None => match &self.database {
                Some(path) => DatabaseConfig::file(path),
                None => DatabaseConfig::in_memory(),
            },
        };
        if let Some(timeout) = self.busy_timeout_ms {
            config.busy_timeout_ms = timeout;
        }
        if let Some(mode) = self.journal_mode {
            config.journal_mode = mode;
        }
        if let Some(mode) = self.sync_mode {
            config.sync_mode = mode;
        }
        config
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("ctxstore.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("contexts.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<StoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: StoreConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StoreConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DEFAULT_BUSY_TIMEOUT_MS;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_parses_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctxstore.toml");
        std::fs::write(
            &path,
            "database = \"data/contexts.db\"\nbusy_timeout_ms = 250\njournal_mode = \"delete\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.database.as_deref(), Some("data/contexts.db"));

        let db = config.database_config(None);
        assert_eq!(db.path, Some(PathBuf::from("data/contexts.db")));
        assert_eq!(db.busy_timeout_ms, 250);
        assert_eq!(db.journal_mode, JournalMode::Delete);
        assert_eq!(db.sync_mode, SyncMode::Full);
    }

    #[test]
    fn test_override_wins_and_defaults_apply() {
        let config = StoreConfig::default();
        assert_eq!(config.database_config(None), DatabaseConfig::in_memory());

        let db = config.database_config(Some(Path::new("cli.db")));
        assert_eq!(db.path, Some(PathBuf::from("cli.db")));
        assert_eq!(db.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn test_write_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctxstore.toml");
        let config = StoreConfig {
            database: Some("contexts.db".to_string()),
            ..StoreConfig::default()
        };

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), Some(config));
    }

    #[test]
    fn test_rejects_unknown_journal_mode() {
        assert!(toml::from_str::<StoreConfig>("journal_mode = \"truncate\"").is_err());
    }
}
