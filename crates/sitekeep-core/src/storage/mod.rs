//! Storage adapter module.
//!
//! `StorageAdapter` puts the local cache and the optional remote document
//! store behind one asynchronous get/save-by-key interface. Whether a remote
//! store is active is decided once, when the adapter is built.

pub mod adapter;
pub mod sync;

pub use adapter::{
    Loaded, ReadSource, StorageAdapter, DEFAULT_COLLECTION_PATH, DEFAULT_REQUEST_TIMEOUT,
};
pub use sync::SyncStatus;
