use crate::auth::approval::GatePolicy;
use crate::memo::seed;
use crate::storage::{KvBackend, MemoStore, SqliteKv, StoreResult};
use directories::BaseDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not write config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no config directory available")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricSettings {
    pub enabled: bool,
    pub bypass_when_unavailable: bool,
}

impl Default for BiometricSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bypass_when_unavailable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the database location in the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    pub seed_sample_data: bool,
    pub biometric: BiometricSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            seed_sample_data: true,
            biometric: BiometricSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("memo-desk.toml"))
    }

    /// Loads the user config, falling back to defaults when it is missing or unreadable.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("Failed to read {}: {e}, using defaults", path.display());
                return Self::default();
            }
        };
        match toml::from_str::<AppConfig>(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn gate_policy(&self) -> GatePolicy {
        match (self.biometric.enabled, self.biometric.bypass_when_unavailable) {
            (false, _) => GatePolicy::Disabled,
            (true, true) => GatePolicy::BypassWhenUnavailable,
            (true, false) => GatePolicy::Required,
        }
    }

    pub fn open_store(&self) -> StoreResult<MemoStore<SqliteKv>> {
        let kv = match &self.database_path {
            Some(path) => SqliteKv::open(path)?,
            None => SqliteKv::open_default()?,
        };
        Ok(MemoStore::new(kv))
    }
}

/// One line of the launch summary: a routing target and its pending memos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxLine {
    pub id: String,
    pub name: String,
    pub pending: u32,
}

/// First-launch work: seed an empty store, then tally pending memos per target.
pub fn launch<B: KvBackend>(store: &MemoStore<B>, config: &AppConfig) -> Vec<InboxLine> {
    if seed::bootstrap(store, config.seed_sample_data) {
        info!("Empty store seeded with sample data");
    }

    let contacts = store.contact_inbox().into_iter().map(|c| InboxLine {
        id: c.id,
        name: c.name,
        pending: c.unread_count,
    });
    let ministries = store.ministry_inbox().into_iter().map(|m| InboxLine {
        id: m.id,
        name: m.name,
        pending: m.unread_count,
    });
    contacts.chain(ministries).collect()
}
