//! Error types shared by the storage adapter and the content store.

use thiserror::Error;

use crate::remote::RemoteError;

/// Rejections raised before anything is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    #[error("Cannot delete the last item. Delete the whole project instead.")]
    LastGalleryItem,

    #[error("Gallery index {index} out of range (gallery has {len} items)")]
    GalleryIndex { index: usize, len: usize },

    #[error("Invalid media: {0}")]
    InvalidMedia(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("{0} does not hold records with ids")]
    NotRecordCollection(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to save {key} to the remote store: {source}")]
    RemoteWrite {
        key: String,
        #[source]
        source: RemoteError,
    },

    #[error("Failed to read {key} from the remote store: {source}")]
    RemoteRead {
        key: String,
        #[source]
        source: RemoteError,
    },

    #[error("Remote store is not configured (offline mode)")]
    Offline,

    #[error("Local cache error: {0:#}")]
    LocalCache(anyhow::Error),

    #[error("Failed to decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
