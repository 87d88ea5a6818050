use crate::memo::models::{Contact, Memo, MemoAction, Ministry, Prayer};
use directories::ProjectDirs;
use log::{debug, error};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("no data directory available")]
    NoDataDir,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fixed keys the collections are stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Contacts,
    Ministries,
    Memos,
    Actions,
    Prayers,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Contacts,
        Collection::Ministries,
        Collection::Memos,
        Collection::Actions,
        Collection::Prayers,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Collection::Contacts => "contacts",
            Collection::Ministries => "ministries",
            Collection::Memos => "memos",
            Collection::Actions => "actions",
            Collection::Prayers => "prayers",
        }
    }
}

/// String key-value storage the collections are serialized into.
pub trait KvBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Writes several keys. Backends that can should apply them all or none.
    fn set_many(&self, entries: &[(&str, String)]) -> StoreResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn clear(&self) -> StoreResult<()>;
}

pub fn default_db_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "example", "MemoDesk")?;
    let dir = proj.data_dir().to_path_buf();
    Some(dir.join("memos.sqlite"))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// SQLite-backed key-value table.
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    pub fn open(path: &Path) -> StoreResult<Self> {
        ensure_dir(path)?;
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Opens the database in the platform data directory.
    pub fn open_default() -> StoreResult<Self> {
        let path = default_db_path().ok_or(StoreError::NoDataDir)?;
        Self::open(&path)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    pub fn last_updated_at(&self, key: &str) -> StoreResult<Option<i64>> {
        let ts = self
            .conn
            .query_row("SELECT updated_at FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(ts)
    }

    fn upsert(conn: &Connection, key: &str, value: &str, now: i64) -> StoreResult<()> {
        conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value=excluded.value,
                updated_at=excluded.updated_at
            "#,
            params![key, value, now],
        )?;
        Ok(())
    }
}

impl KvBackend for SqliteKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        Self::upsert(&self.conn, key, value, unix_now())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> StoreResult<()> {
        let now = unix_now();
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            Self::upsert(&tx, key, value, now)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }
}

/// In-process backend, mostly for tests.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KvBackend for MemoryKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.entries().clear();
        Ok(())
    }
}

/// Typed access to the stored collections.
///
/// Reads never fail: a missing key, a backend error or a blob that no longer
/// parses all come back as an empty list, with the error logged. Writes replace
/// the whole collection and log failures instead of returning them.
pub struct MemoStore<B> {
    backend: B,
}

impl<B: KvBackend> MemoStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub(crate) fn read<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        let raw = match self.backend.get(collection.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Error getting {}: {e}", collection.key());
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            error!("Error parsing {}: {e}", collection.key());
            Vec::new()
        })
    }

    pub(crate) fn write<T: Serialize>(&self, collection: Collection, items: &[T]) {
        let result = serde_json::to_string(items)
            .map_err(StoreError::from)
            .and_then(|json| self.backend.set(collection.key(), &json));
        match result {
            Ok(()) => debug!("Saved {} {}", items.len(), collection.key()),
            Err(e) => error!("Error saving {}: {e}", collection.key()),
        }
    }

    /// Serializes every entry first, then hands them to the backend in one call.
    pub(crate) fn write_together(&self, entries: &[(Collection, serde_json::Value)]) -> bool {
        let mut encoded = Vec::with_capacity(entries.len());
        for (collection, value) in entries {
            match serde_json::to_string(value) {
                Ok(json) => encoded.push((collection.key(), json)),
                Err(e) => {
                    error!("Error encoding {}: {e}", collection.key());
                    return false;
                }
            }
        }
        match self.backend.set_many(&encoded) {
            Ok(()) => true,
            Err(e) => {
                let keys: Vec<&str> = encoded.iter().map(|(k, _)| *k).collect();
                error!("Error saving {}: {e}", keys.join(" + "));
                false
            }
        }
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.read(Collection::Contacts)
    }

    pub fn save_contacts(&self, contacts: &[Contact]) {
        self.write(Collection::Contacts, contacts);
    }

    pub fn ministries(&self) -> Vec<Ministry> {
        self.read(Collection::Ministries)
    }

    pub fn save_ministries(&self, ministries: &[Ministry]) {
        self.write(Collection::Ministries, ministries);
    }

    /// All memos, or only those routed to `target_id` when given.
    /// An empty id counts as no filter.
    pub fn memos(&self, target_id: Option<&str>) -> Vec<Memo> {
        let memos: Vec<Memo> = self.read(Collection::Memos);
        match target_id.filter(|id| !id.is_empty()) {
            Some(id) => memos.into_iter().filter(|m| m.contact_id == id).collect(),
            None => memos,
        }
    }

    pub fn save_memos(&self, memos: &[Memo]) {
        self.write(Collection::Memos, memos);
    }

    /// Replaces the memo with the same id, or appends it.
    pub fn save_memo(&self, memo: Memo) {
        let mut memos = self.memos(None);
        match memos.iter_mut().find(|m| m.id == memo.id) {
            Some(existing) => *existing = memo,
            None => memos.push(memo),
        }
        self.save_memos(&memos);
    }

    pub fn actions(&self) -> Vec<MemoAction> {
        self.read(Collection::Actions)
    }

    pub fn save_action(&self, action: MemoAction) {
        let mut actions = self.actions();
        actions.push(action);
        self.write(Collection::Actions, &actions);
    }

    /// All prayers, or only those attached to `memo_id` when given.
    /// An empty id counts as no filter.
    pub fn prayers(&self, memo_id: Option<&str>) -> Vec<Prayer> {
        let prayers: Vec<Prayer> = self.read(Collection::Prayers);
        match memo_id.filter(|id| !id.is_empty()) {
            Some(id) => prayers.into_iter().filter(|p| p.memo_id == id).collect(),
            None => prayers,
        }
    }

    pub fn save_prayers(&self, prayers: &[Prayer]) {
        self.write(Collection::Prayers, prayers);
    }

    /// Drops every collection, action log included.
    pub fn reset(&self) {
        match self.backend.clear() {
            Ok(()) => log::info!("All collections cleared"),
            Err(e) => error!("Error resetting data: {e}"),
        }
    }
}
