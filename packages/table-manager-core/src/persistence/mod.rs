//! Snapshot persistence for [`MemoryStore`](crate::store::MemoryStore).
//!
//! The whole store is written to `tables.json` under the data directory:
//! - Written to a temp file, synced, then atomically renamed
//! - Guarded by a CRC32 over the serialized tables
//! - Transient I/O errors are retried

mod io_utils;
mod snapshot;

pub use io_utils::{classify_io_error, with_retries};
pub use snapshot::{PersistenceManager, SnapshotFile, SNAPSHOT_FILE, SNAPSHOT_VERSION};
