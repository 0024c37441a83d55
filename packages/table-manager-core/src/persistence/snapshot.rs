use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::config::ManagerConfig;
use crate::error::DbError;
use crate::store::{MemoryStore, StoredTable};

use super::io_utils::{classify_io_error, with_retries};

pub const SNAPSHOT_FILE: &str = "tables.json";
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk layout of a store snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Format version
    pub version: u32,
    /// CRC32 of the JSON-serialized `tables`
    pub checksum: u32,
    /// Tables keyed by storage name
    pub tables: BTreeMap<String, StoredTable>,
}

impl SnapshotFile {
    pub fn new(tables: BTreeMap<String, StoredTable>) -> Result<Self, DbError> {
        let checksum = checksum(&tables)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            checksum,
            tables,
        })
    }

    /// Checks version and checksum.
    pub fn verify(&self) -> Result<(), DbError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(DbError::DataCorruption(format!(
                "Unsupported snapshot version: {}",
                self.version
            )));
        }
        let actual = checksum(&self.tables)?;
        if actual != self.checksum {
            return Err(DbError::DataCorruption(format!(
                "Snapshot checksum mismatch: expected {:08x}, found {:08x}",
                self.checksum, actual
            )));
        }
        Ok(())
    }
}

fn checksum(tables: &BTreeMap<String, StoredTable>) -> Result<u32, DbError> {
    let bytes =
        serde_json::to_vec(tables).map_err(|e| DbError::SerializationError(e.to_string()))?;
    Ok(crc32fast::hash(&bytes))
}

/// Saves and loads store snapshots.
#[derive(Debug)]
pub struct PersistenceManager {
    /// Data directory path
    data_dir: PathBuf,
    /// Maximum retry attempts for transient I/O errors
    max_retries: u32,
    /// Delay between retry attempts in milliseconds
    retry_delay_ms: u64,
    /// Store generation covered by the last save or load
    flushed_generation: AtomicU64,
}

impl PersistenceManager {
    pub fn new(config: &ManagerConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            max_retries: config.persistence_max_retries,
            retry_delay_ms: config.persistence_retry_delay_ms,
            flushed_generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    /// Writes the whole store to disk.
    pub fn save(&self, store: &MemoryStore) -> Result<(), DbError> {
        let generation = store.generation();
        let snapshot = SnapshotFile::new(store.snapshot()?)?;
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| DbError::SerializationError(e.to_string()))?;

        with_retries("save_snapshot", self.max_retries, self.retry_delay_ms, || {
            self.write_atomically(&json)
        })?;

        self.flushed_generation.store(generation, Ordering::SeqCst);
        tracing::debug!(
            "Saved {} tables to {}",
            snapshot.tables.len(),
            self.snapshot_path().display()
        );
        Ok(())
    }

    /// Saves only when the store changed since the last save or load.
    ///
    /// Returns whether a snapshot was written.
    pub fn flush_if_dirty(&self, store: &MemoryStore) -> Result<bool, DbError> {
        if store.generation() == self.flushed_generation.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.save(store)?;
        Ok(true)
    }

    /// Loads the snapshot, or an empty store when none exists yet.
    pub fn load(&self) -> Result<MemoryStore, DbError> {
        let path = self.snapshot_path();
        if !path.exists() {
            tracing::info!("No snapshot at {}, starting empty", path.display());
            self.flushed_generation.store(0, Ordering::SeqCst);
            return Ok(MemoryStore::new());
        }

        let contents = with_retries("load_snapshot", self.max_retries, self.retry_delay_ms, || {
            fs::read(&path).map_err(|e| classify_io_error(e, "Failed to read snapshot"))
        })?;
        let snapshot: SnapshotFile = serde_json::from_slice(&contents)
            .map_err(|e| DbError::SerializationError(format!("Failed to parse snapshot: {e}")))?;
        snapshot.verify()?;

        tracing::info!(
            "Loaded {} tables from {}",
            snapshot.tables.len(),
            path.display()
        );
        let store = MemoryStore::from_tables(snapshot.tables);
        self.flushed_generation
            .store(store.generation(), Ordering::SeqCst);
        Ok(store)
    }

    fn write_atomically(&self, bytes: &[u8]) -> Result<(), DbError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| classify_io_error(e, "Failed to create data directory"))?;

        let temp_path = self.data_dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        let mut file = File::create(&temp_path)
            .map_err(|e| classify_io_error(e, "Failed to create temp file"))?;
        file.write_all(bytes)
            .map_err(|e| classify_io_error(e, "Failed to write snapshot"))?;
        file.sync_all()
            .map_err(|e| classify_io_error(e, "Failed to sync snapshot"))?;

        fs::rename(&temp_path, self.snapshot_path())
            .map_err(|e| classify_io_error(e, "Failed to rename snapshot file"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ColumnDefinition, CreateTable, SchemaStore};
    use crate::value::{Row, Value};
    use ntest::timeout;
    use tempfile::tempdir;

    fn people_store() -> MemoryStore {
        let store = MemoryStore::new();
        let id = ColumnDefinition {
            name: "id".into(),
            declared_type: "integer".into(),
            nullable: false,
            default: None,
            primary_key: true,
            auto_increment: true,
        };
        let name = ColumnDefinition {
            name: "name".into(),
            declared_type: "varchar(255)".into(),
            nullable: false,
            default: None,
            primary_key: false,
            auto_increment: false,
        };
        store
            .create_table(
                "_people",
                CreateTable {
                    columns: vec![id, name],
                    indexes: Vec::new(),
                },
            )
            .unwrap();
        store
            .insert("_people", Row::from([("name".to_string(), Value::from("Ann"))]))
            .unwrap();
        store
    }

    fn manager(dir: &std::path::Path) -> PersistenceManager {
        PersistenceManager::new(&ManagerConfig {
            data_dir: dir.to_path_buf(),
            ..Default::default()
        })
    }

    #[timeout(1000)]
    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let persistence = manager(dir.path());
        let store = people_store();

        persistence.save(&store).unwrap();
        assert!(dir.path().join(SNAPSHOT_FILE).exists());
        assert!(!dir.path().join("tables.json.tmp").exists());

        let loaded = manager(dir.path()).load().unwrap();
        assert_eq!(loaded.snapshot().unwrap(), store.snapshot().unwrap());

        let id = loaded
            .insert("_people", Row::from([("name".to_string(), Value::from("Bob"))]))
            .unwrap();
        assert_eq!(id, 2);
    }

    #[timeout(1000)]
    #[test]
    fn load_without_snapshot_is_empty() {
        let dir = tempdir().unwrap();
        let store = manager(dir.path()).load().unwrap();
        assert!(store.list_table_names().unwrap().is_empty());
    }

    #[timeout(1000)]
    #[test]
    fn detects_corruption() {
        let dir = tempdir().unwrap();
        let persistence = manager(dir.path());
        persistence.save(&people_store()).unwrap();

        let path = dir.path().join(SNAPSHOT_FILE);
        let tampered = fs::read_to_string(&path).unwrap().replace("Ann", "Eve");
        fs::write(&path, tampered).unwrap();

        let err = persistence.load().unwrap_err();
        assert!(matches!(err, DbError::DataCorruption(_)));
    }

    #[timeout(1000)]
    #[test]
    fn rejects_unknown_version() {
        let dir = tempdir().unwrap();
        let mut snapshot = SnapshotFile::new(BTreeMap::new()).unwrap();
        snapshot.version = 7;
        fs::write(
            dir.path().join(SNAPSHOT_FILE),
            serde_json::to_vec(&snapshot).unwrap(),
        )
        .unwrap();

        let err = manager(dir.path()).load().unwrap_err();
        assert!(matches!(err, DbError::DataCorruption(ref msg) if msg.contains("version")));
    }

    #[timeout(1000)]
    #[test]
    fn flush_if_dirty_tracks_generation() {
        let dir = tempdir().unwrap();
        let persistence = manager(dir.path());
        let store = MemoryStore::new();

        assert!(!persistence.flush_if_dirty(&store).unwrap());
        assert!(!dir.path().join(SNAPSHOT_FILE).exists());

        store
            .create_table("_empty", CreateTable::default())
            .unwrap();
        assert!(persistence.flush_if_dirty(&store).unwrap());
        assert!(!persistence.flush_if_dirty(&store).unwrap());

        store.drop_table("_empty").unwrap();
        assert!(persistence.flush_if_dirty(&store).unwrap());
    }
}
