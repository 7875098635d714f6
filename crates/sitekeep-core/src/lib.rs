//! Core library for sitekeep.
//!
//! sitekeep stores the structured content of a marketing site (services,
//! portfolio, testimonials, pricing, process timeline, site text and
//! portfolio categories) in a local cache, a remote document store, or both.
//!
//! - `cache`: synchronous local key/value cache
//! - `remote`: remote document store client
//! - `storage`: `StorageAdapter`, the cache-first get/save layer
//! - `registry`: the fixed collection set and default seeds
//! - `models`: typed records
//! - `store`: `ContentStore`, collection CRUD used by admin and public callers

pub mod cache;
pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod registry;
pub mod remote;
pub mod storage;
pub mod store;

pub use config::{Config, RemoteConfig};
pub use error::{Result, StoreError, ValidationError};
pub use registry::{Collection, Shape};
pub use storage::{Loaded, ReadSource, StorageAdapter, SyncStatus};
pub use store::{ContentStore, PortfolioOutcome};
