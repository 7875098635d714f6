//! Local caching module for offline data access.
//!
//! The local cache is a synchronous string-keyed store holding the last
//! known good JSON serialization of each collection. It is a read-through
//! cache while a remote store is configured and the only store otherwise.
//!
//! Two implementations are provided:
//! - `FileCache`: one JSON file per key under a cache directory
//! - `MemoryCache`: process-local map

pub mod file;
pub mod memory;

use anyhow::Result;

pub use file::FileCache;
pub use memory::MemoryCache;

pub trait LocalCache: Send + Sync {
    /// Raw JSON text stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key.
    fn clear(&self) -> Result<()>;
}
