//! Local schema table
//!
//! In-memory schema table with optional persistence to a directory:
//! - One file per entry: `<dir>/schema_<id>.json`
//! - Entries are immutable once written
//! - IDs are assigned in registration order, starting at 0
//! - A malformed or inconsistent entry file fails `open`
//!
//! Lookups by ID or hash return the first handle registered for that
//! content, so schemas read back from the table share one identity. Only
//! that handle is kept on the identity fast path; other handles with equal
//! content are resolved by hash.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::observability::{log_event, Event};
use crate::schema::{Schema, SchemaIdentity};

use super::errors::{SchemaTableError, SchemaTableResult};
use super::{SchemaHash, SchemaTable};

/// One registered schema.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub id: u64,
    pub hash: SchemaHash,
    pub schema: Schema,
    /// RFC 3339 UTC registration time
    pub registered_at: String,
}

/// On-disk form of an entry
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    id: u64,
    hash: String,
    schema: serde_json::Value,
    #[serde(default)]
    registered_at: String,
}

fn registration_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[derive(Debug, Default)]
struct TableState {
    by_id: HashMap<u64, SchemaEntry>,
    by_hash: HashMap<SchemaHash, u64>,
    /// Identity fast path; holds a clone so the identity stays valid
    by_identity: HashMap<SchemaIdentity, (Schema, u64)>,
    next_id: u64,
}

impl TableState {
    fn insert(&mut self, entry: SchemaEntry) {
        self.next_id = self.next_id.max(entry.id + 1);
        self.by_hash.insert(entry.hash, entry.id);
        self.by_identity
            .insert(entry.schema.identity(), (entry.schema.clone(), entry.id));
        self.by_id.insert(entry.id, entry);
    }

    fn entry_for_identity(&self, identity: SchemaIdentity) -> Option<&SchemaEntry> {
        self.by_identity
            .get(&identity)
            .and_then(|(_, id)| self.by_id.get(id))
    }
}

/// Schema table kept in memory, optionally backed by a directory.
#[derive(Debug)]
pub struct LocalSchemaTable {
    dir: Option<PathBuf>,
    state: RwLock<TableState>,
    log_events: bool,
}

impl LocalSchemaTable {
    /// Creates an empty table that is never persisted.
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            state: RwLock::new(TableState::default()),
            log_events: true,
        }
    }

    /// Opens a table persisted under `dir`, loading every existing entry.
    ///
    /// The directory is created if missing.
    pub fn open(dir: impl AsRef<Path>) -> SchemaTableResult<Self> {
        Self::open_with_log_events(dir, true)
    }

    /// Like [`open`](Self::open), with table events logged only when
    /// `log_events` is set.
    pub fn open_with_log_events(dir: impl AsRef<Path>, log_events: bool) -> SchemaTableResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|e| SchemaTableError::io(dir.display().to_string(), e))?;
        }

        let mut state = TableState::default();
        let entries =
            fs::read_dir(&dir).map_err(|e| SchemaTableError::io(dir.display().to_string(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| SchemaTableError::io(dir.display().to_string(), e))?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let loaded = load_entry_file(&path)?;
            if state.by_id.contains_key(&loaded.id) {
                return Err(SchemaTableError::corrupt(
                    path.display().to_string(),
                    format!("duplicate schema ID {}", loaded.id),
                ));
            }
            if state.by_hash.contains_key(&loaded.hash) {
                return Err(SchemaTableError::corrupt(
                    path.display().to_string(),
                    format!("duplicate schema hash {}", loaded.hash),
                ));
            }
            state.insert(loaded);
        }

        if log_events {
            let count = state.by_id.len().to_string();
            log_event(
                Event::SchemaTableLoaded,
                &[("dir", &dir.display().to_string()), ("schemas", &count)],
            );
        }

        Ok(Self {
            dir: Some(dir),
            state: RwLock::new(state),
            log_events,
        })
    }

    pub fn with_log_events(mut self, log_events: bool) -> Self {
        self.log_events = log_events;
        self
    }

    pub fn logs_events(&self) -> bool {
        self.log_events
    }

    /// Backing directory, if persisted.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries, ordered by ID.
    pub fn entries(&self) -> Vec<SchemaEntry> {
        let mut entries: Vec<_> = self.read().by_id.values().cloned().collect();
        entries.sort_by_key(|e| e.id);
        entries
    }

    /// Returns the entry for `schema`, creating and persisting it if new.
    pub fn get_or_create_entry(&self, schema: &Schema) -> SchemaTableResult<SchemaEntry> {
        if let Some(entry) = self.read().entry_for_identity(schema.identity()) {
            return Ok(entry.clone());
        }

        let hash = SchemaHash::of(schema);
        let mut state = self.write();

        if let Some(entry) = state.by_hash.get(&hash).and_then(|id| state.by_id.get(id)) {
            return Ok(entry.clone());
        }

        let entry = SchemaEntry {
            id: state.next_id,
            hash,
            schema: schema.clone(),
            registered_at: registration_timestamp(),
        };
        self.persist(&entry)?;
        state.insert(entry.clone());

        if self.log_events {
            log_event(
                Event::SchemaRegistered,
                &[
                    ("hash", &entry.hash.to_hex()),
                    ("id", &entry.id.to_string()),
                    ("schema", &entry.schema.to_canonical_json()),
                ],
            );
        }
        Ok(entry)
    }

    fn persist(&self, entry: &SchemaEntry) -> SchemaTableResult<()> {
        let dir = match &self.dir {
            Some(dir) => dir,
            None => return Ok(()),
        };

        let path = dir.join(format!("schema_{}.json", entry.id));
        if path.exists() {
            return Err(SchemaTableError::corrupt(
                path.display().to_string(),
                "entry file already exists",
            ));
        }

        let stored = StoredEntry {
            id: entry.id,
            hash: entry.hash.to_hex(),
            schema: entry.schema.to_json(),
            registered_at: entry.registered_at.clone(),
        };
        let content = serde_json::to_string_pretty(&stored)
            .map_err(|e| SchemaTableError::io(path.display().to_string(), e))?;

        // Write then rename so a crash never leaves a truncated entry file.
        let tmp = dir.join(format!("schema_{}.json.tmp", entry.id));
        fs::write(&tmp, content).map_err(|e| SchemaTableError::io(tmp.display().to_string(), e))?;
        fs::rename(&tmp, &path).map_err(|e| SchemaTableError::io(path.display().to_string(), e))?;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, TableState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LocalSchemaTable {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SchemaTable for LocalSchemaTable {
    fn get_or_create_schema_hash(&self, schema: &Schema) -> SchemaTableResult<SchemaHash> {
        Ok(self.get_or_create_entry(schema)?.hash)
    }

    fn get_or_create_schema_id(&self, schema: &Schema) -> SchemaTableResult<u64> {
        Ok(self.get_or_create_entry(schema)?.id)
    }

    fn get_schema_by_id(&self, id: u64) -> SchemaTableResult<Schema> {
        self.read()
            .by_id
            .get(&id)
            .map(|e| e.schema.clone())
            .ok_or(SchemaTableError::SchemaIdNotFound(id))
    }

    fn get_schema_by_hash(&self, hash: &SchemaHash) -> SchemaTableResult<Schema> {
        let state = self.read();
        state
            .by_hash
            .get(hash)
            .and_then(|id| state.by_id.get(id))
            .map(|e| e.schema.clone())
            .ok_or(SchemaTableError::SchemaHashNotFound(*hash))
    }
}

fn load_entry_file(path: &Path) -> SchemaTableResult<SchemaEntry> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| SchemaTableError::io(&display, e))?;
    let stored: StoredEntry = serde_json::from_str(&content)
        .map_err(|e| SchemaTableError::corrupt(&display, format!("invalid JSON: {}", e)))?;
    let schema = Schema::from_json_value(&stored.schema)
        .map_err(|e| SchemaTableError::corrupt(&display, e.to_string()))?;
    let hash = SchemaHash::from_hex(&stored.hash)
        .ok_or_else(|| SchemaTableError::corrupt(&display, "invalid hash"))?;
    if hash != SchemaHash::of(&schema) {
        return Err(SchemaTableError::corrupt(&display, "hash does not match schema"));
    }
    Ok(SchemaEntry {
        id: stored.id,
        hash,
        schema,
        registered_at: stored.registered_at,
    })
}
