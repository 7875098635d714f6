//! Collection CRUD over the storage adapter.
//!
//! Every mutation is a read-modify-write of a whole collection: the list is
//! read into an owned working copy, changed in memory, and saved back as a
//! full overwrite. With a remote store the working copy is read from the
//! remote, never from the cache. Within one `ContentStore` mutations of the
//! same collection are serialized. Between processes the contract is **last
//! write wins, no merge**: two editors saving the same collection can
//! silently drop each other's changes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::defaults;
use crate::error::{Result, StoreError, ValidationError};
use crate::models::{
    require, Category, Comment, CommentStatus, Media, NewComment, PortfolioItem, PricingPlan,
    ProcessStep, Record, SiteContent,
};
use crate::registry::{Collection, Shape};
use crate::storage::{Loaded, StorageAdapter, SyncStatus};

/// What a mutation closure decided.
enum Mutation<R> {
    /// Save the working copy, then return the value.
    Write(R),
    /// Nothing changed; return the value without saving.
    Skip(R),
}

/// Result of adding media to the portfolio.
#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioOutcome {
    /// A new project was created with a one-entry gallery.
    Created(PortfolioItem),
    /// A project with the same title and category already existed and the
    /// media was appended to its gallery.
    AddedToGallery(PortfolioItem),
}

impl PortfolioOutcome {
    pub fn item(&self) -> &PortfolioItem {
        match self {
            PortfolioOutcome::Created(item) | PortfolioOutcome::AddedToGallery(item) => item,
        }
    }
}

/// New record id: the current time in milliseconds, bumped past the
/// largest existing id when needed so it is never reused.
fn next_id(existing: impl Iterator<Item = i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    match existing.max() {
        Some(max) if max >= now => max + 1,
        _ => now,
    }
}

fn decode_list<T: DeserializeOwned>(collection: Collection, value: Value) -> Result<Vec<T>> {
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(|source| StoreError::Decode {
            key: collection.key().to_string(),
            source,
        }),
        Value::Null => Ok(Vec::new()),
        _ => {
            warn!(collection = %collection, "Stored value is not a list, reading as empty");
            Ok(Vec::new())
        }
    }
}

fn record_id(value: &Value) -> Option<i64> {
    value.get("id").and_then(Value::as_i64)
}

/// Content store used by both the admin tools and the public site.
/// Clone is cheap; clones share storage and collection locks.
#[derive(Clone)]
pub struct ContentStore {
    storage: StorageAdapter,
    locks: Arc<[Mutex<()>; Collection::ALL.len()]>,
}

impl ContentStore {
    pub fn new(storage: StorageAdapter) -> Self {
        Self {
            storage,
            locks: Arc::new(std::array::from_fn(|_| Mutex::new(()))),
        }
    }

    pub fn storage(&self) -> &StorageAdapter {
        &self.storage
    }

    pub fn is_connected(&self) -> bool {
        self.storage.is_connected()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.storage.sync_status()
    }

    async fn lock(&self, collection: Collection) -> MutexGuard<'_, ()> {
        self.locks[collection as usize].lock().await
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Write default data to every collection that is empty.
    ///
    /// Collections are independent keys and are checked concurrently.
    /// Populated collections are never touched. Returns the collections that
    /// were seeded.
    pub async fn ensure_seeded(&self) -> Result<Vec<Collection>> {
        let seeded = try_join_all(
            Collection::ALL
                .iter()
                .map(|&collection| self.seed_collection(collection)),
        )
        .await?;
        Ok(seeded.into_iter().flatten().collect())
    }

    async fn seed_collection(&self, collection: Collection) -> Result<Option<Collection>> {
        let _guard = self.lock(collection).await;

        let current = match self.storage.load_latest(collection.key()).await {
            Ok(current) => current,
            Err(e) => {
                // Never seed over data that could not be read.
                warn!(collection = %collection, error = %e, "Skipping seed check");
                return Ok(None);
            }
        };
        if !Collection::needs_seed(&current) {
            return Ok(None);
        }

        info!(collection = %collection, "Seeding default data");
        let payload = collection.default_payload().map_err(StoreError::Encode)?;
        self.storage.save(collection.key(), &payload).await?;
        Ok(Some(collection))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Raw collection value, one call per page section.
    pub async fn get_collection(&self, collection: Collection) -> Value {
        self.storage.get(collection.key()).await
    }

    /// Raw collection value with its provenance and any read notice.
    pub async fn load_collection(&self, collection: Collection) -> Loaded {
        self.storage.load(collection.key()).await
    }

    async fn read_list<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let value = self.storage.get(collection.key()).await;
        decode_list(collection, value)
    }

    pub async fn list<T: Record>(&self) -> Result<Vec<T>> {
        self.read_list(T::COLLECTION).await
    }

    /// Record with the given id, if present.
    pub async fn find<T: Record>(&self, id: i64) -> Result<Option<T>> {
        Ok(self.list::<T>().await?.into_iter().find(|r| r.id() == id))
    }

    /// Comments shown on the public site.
    pub async fn approved_testimonials(&self) -> Result<Vec<Comment>> {
        let comments = self.list::<Comment>().await?;
        Ok(comments.into_iter().filter(Comment::is_approved).collect())
    }

    /// Process steps in timeline order.
    pub async fn process_timeline(&self) -> Result<Vec<ProcessStep>> {
        let mut steps = self.list::<ProcessStep>().await?;
        steps.sort_by_key(|s| s.step);
        Ok(steps)
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.read_list(Collection::PortfolioCategories).await
    }

    /// Site text. Falls back to the defaults while nothing usable is stored.
    pub async fn site_content(&self) -> Result<SiteContent> {
        let value = self.storage.get(Collection::Content.key()).await;
        if !value.is_object() {
            debug!("No stored site content, using defaults");
            return Ok(defaults::content());
        }
        serde_json::from_value(value).map_err(|source| StoreError::Decode {
            key: Collection::Content.key().to_string(),
            source,
        })
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    async fn write_list<T: Serialize>(&self, collection: Collection, items: &[T]) -> Result<()> {
        let value = serde_json::to_value(items).map_err(StoreError::Encode)?;
        self.storage.save(collection.key(), &value).await
    }

    /// Run one read-modify-write on an owned copy of a list collection.
    async fn mutate<T, R, F>(&self, collection: Collection, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<Mutation<R>>,
    {
        let _guard = self.lock(collection).await;

        let latest = self.storage.load_latest(collection.key()).await?;
        let mut working = decode_list::<T>(collection, latest)?;
        match f(&mut working)? {
            Mutation::Write(result) => {
                self.write_list(collection, &working).await?;
                Ok(result)
            }
            Mutation::Skip(result) => Ok(result),
        }
    }

    /// Append a record under a fresh id.
    pub async fn create<T: Record>(&self, mut record: T) -> Result<T> {
        record.normalize();
        record.validate()?;

        self.mutate(T::COLLECTION, move |list: &mut Vec<T>| {
            record.set_id(next_id(list.iter().map(Record::id)));
            list.push(record.clone());
            info!(collection = %T::COLLECTION, id = record.id(), "Created record");
            Ok(Mutation::Write(record))
        })
        .await
    }

    /// Replace the record with `id`, keeping the fields the record type
    /// preserves across edits. An absent id is a no-op returning `None`.
    pub async fn update<T: Record>(&self, id: i64, mut record: T) -> Result<Option<T>> {
        record.set_id(id);
        record.normalize();
        record.validate()?;

        self.mutate(T::COLLECTION, move |list: &mut Vec<T>| {
            let slot = match list.iter_mut().find(|r| r.id() == id) {
                Some(slot) => slot,
                None => {
                    debug!(collection = %T::COLLECTION, id, "Update target not found");
                    return Ok(Mutation::Skip(None));
                }
            };
            record.preserve_from(slot);
            *slot = record.clone();
            info!(collection = %T::COLLECTION, id, "Updated record");
            Ok(Mutation::Write(Some(record)))
        })
        .await
    }

    /// Remove the record with `id`. Returns whether anything was removed;
    /// deleting an absent id succeeds without writing.
    pub async fn delete<T: Record>(&self, id: i64) -> Result<bool> {
        self.delete_record(T::COLLECTION, id).await
    }

    /// Untyped delete for callers that only know the collection name.
    pub async fn delete_record(&self, collection: Collection, id: i64) -> Result<bool> {
        if collection.shape() == Shape::Singleton || collection == Collection::PortfolioCategories
        {
            return Err(ValidationError::NotRecordCollection(collection.to_string()).into());
        }

        self.mutate(collection, move |list: &mut Vec<Value>| {
            let before = list.len();
            list.retain(|r| record_id(r) != Some(id));
            if list.len() == before {
                debug!(collection = %collection, id, "Delete target already absent");
                return Ok(Mutation::Skip(false));
            }
            info!(collection = %collection, id, "Deleted record");
            Ok(Mutation::Write(true))
        })
        .await
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Public testimonial submission. Always stored as pending.
    pub async fn submit_public_comment(&self, comment: NewComment) -> Result<Comment> {
        self.create(comment.into_pending()).await
    }

    /// Move a pending comment to approved. Approving twice is a no-op.
    pub async fn approve_comment(&self, id: i64) -> Result<Option<Comment>> {
        self.mutate(Collection::Comments, move |list: &mut Vec<Comment>| {
            let comment = match list.iter_mut().find(|c| c.id == id) {
                Some(comment) => comment,
                None => return Ok(Mutation::Skip(None)),
            };
            if comment.is_approved() {
                return Ok(Mutation::Skip(Some(comment.clone())));
            }
            comment.status = CommentStatus::Approved;
            info!(id, "Approved comment");
            Ok(Mutation::Write(Some(comment.clone())))
        })
        .await
    }

    pub async fn edit_comment_text(&self, id: i64, text: &str) -> Result<Option<Comment>> {
        require(text, "text")?;
        let text = text.trim().to_string();

        self.mutate(Collection::Comments, move |list: &mut Vec<Comment>| {
            match list.iter_mut().find(|c| c.id == id) {
                Some(comment) => {
                    comment.text = text;
                    Ok(Mutation::Write(Some(comment.clone())))
                }
                None => Ok(Mutation::Skip(None)),
            }
        })
        .await
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    pub async fn set_popular(&self, id: i64, popular: bool) -> Result<Option<PricingPlan>> {
        self.mutate(Collection::Pricing, move |list: &mut Vec<PricingPlan>| {
            match list.iter_mut().find(|p| p.id == id) {
                Some(plan) if plan.is_popular == popular => Ok(Mutation::Skip(Some(plan.clone()))),
                Some(plan) => {
                    plan.is_popular = popular;
                    Ok(Mutation::Write(Some(plan.clone())))
                }
                None => Ok(Mutation::Skip(None)),
            }
        })
        .await
    }

    // =========================================================================
    // Portfolio
    // =========================================================================

    /// Add media to the portfolio.
    ///
    /// When a project with the same title (ignoring case) and category
    /// exists, the media joins its gallery instead of creating a new project.
    pub async fn add_portfolio_media(
        &self,
        title: &str,
        category: &str,
        media: Media,
    ) -> Result<PortfolioOutcome> {
        require(title, "title")?;
        require(category, "category")?;
        let title = title.trim().to_string();
        let category = category.trim().to_string();
        let media = media.normalized()?;

        self.mutate(Collection::Portfolio, move |list: &mut Vec<PortfolioItem>| {
            if let Some(existing) = list.iter_mut().find(|i| i.matches(&title, &category)) {
                existing.push_media(media);
                info!(id = existing.id, gallery = existing.gallery.len(), "Added media to existing project");
                return Ok(Mutation::Write(PortfolioOutcome::AddedToGallery(existing.clone())));
            }

            let mut item = PortfolioItem::new(title, category, media);
            item.id = next_id(list.iter().map(|i| i.id));
            list.push(item.clone());
            info!(id = item.id, "Created portfolio project");
            Ok(Mutation::Write(PortfolioOutcome::Created(item)))
        })
        .await
    }

    /// Edit a project's title and category, and optionally replace its lead
    /// media. Other gallery entries are kept.
    pub async fn update_portfolio(
        &self,
        id: i64,
        title: &str,
        category: &str,
        media: Option<Media>,
    ) -> Result<Option<PortfolioItem>> {
        require(title, "title")?;
        require(category, "category")?;
        let title = title.trim().to_string();
        let category = category.trim().to_string();
        let media = media.map(Media::normalized).transpose()?;

        self.mutate(Collection::Portfolio, move |list: &mut Vec<PortfolioItem>| {
            let item = match list.iter_mut().find(|i| i.id == id) {
                Some(item) => item,
                None => return Ok(Mutation::Skip(None)),
            };
            item.title = title;
            item.category = category;
            if let Some(media) = media {
                item.replace_lead_media(media);
            }
            Ok(Mutation::Write(Some(item.clone())))
        })
        .await
    }

    /// Remove one media entry from a project's gallery.
    ///
    /// Refuses to remove the only entry; delete the project instead.
    /// Returns `false` when the project does not exist.
    pub async fn delete_gallery_item(&self, id: i64, index: usize) -> Result<bool> {
        self.mutate(Collection::Portfolio, move |list: &mut Vec<PortfolioItem>| {
            let item = match list.iter_mut().find(|i| i.id == id) {
                Some(item) => item,
                None => return Ok(Mutation::Skip(false)),
            };
            item.remove_media(index)?;
            info!(id, index, remaining = item.gallery.len(), "Removed gallery item");
            Ok(Mutation::Write(true))
        })
        .await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn add_category(&self, label: &str) -> Result<Category> {
        require(label, "label")?;
        let category = Category::from_label(label);

        self.mutate(Collection::PortfolioCategories, move |list: &mut Vec<Category>| {
            if list.iter().any(|c| c.value == category.value) {
                return Err(ValidationError::DuplicateCategory(category.value).into());
            }
            list.push(category.clone());
            info!(value = %category.value, "Added category");
            Ok(Mutation::Write(category))
        })
        .await
    }

    /// Rename a category, recomputing its slug. A slug held by another
    /// category is rejected.
    pub async fn rename_category(&self, value: &str, new_label: &str) -> Result<Option<Category>> {
        require(new_label, "label")?;
        let renamed = Category::from_label(new_label);
        let value = value.to_string();

        self.mutate(Collection::PortfolioCategories, move |list: &mut Vec<Category>| {
            let position = match list.iter().position(|c| c.value == value) {
                Some(position) => position,
                None => return Ok(Mutation::Skip(None)),
            };
            let taken = list
                .iter()
                .enumerate()
                .any(|(i, c)| i != position && c.value == renamed.value);
            if taken {
                return Err(ValidationError::DuplicateCategory(renamed.value).into());
            }
            list[position] = renamed.clone();
            info!(from = %value, to = %renamed.value, "Renamed category");
            Ok(Mutation::Write(Some(renamed)))
        })
        .await
    }

    pub async fn delete_category(&self, value: &str) -> Result<bool> {
        let value = value.to_string();
        self.mutate(Collection::PortfolioCategories, move |list: &mut Vec<Category>| {
            let before = list.len();
            list.retain(|c| c.value != value);
            if list.len() == before {
                return Ok(Mutation::Skip(false));
            }
            info!(value = %value, "Deleted category");
            Ok(Mutation::Write(true))
        })
        .await
    }

    // =========================================================================
    // Site content
    // =========================================================================

    pub async fn save_site_content(&self, content: &SiteContent) -> Result<()> {
        let _guard = self.lock(Collection::Content).await;
        let value = serde_json::to_value(content).map_err(StoreError::Encode)?;
        self.storage.save(Collection::Content.key(), &value).await?;
        info!("Site content updated");
        Ok(())
    }

    // =========================================================================
    // Sync
    // =========================================================================

    /// Re-read every collection from the remote store, bypassing the cache.
    pub async fn force_sync(&self) -> Result<DateTime<Utc>> {
        self.storage.force_sync(&Collection::all_keys()).await
    }

    /// Give background cache refreshes up to `limit` to finish. Call before
    /// a short-lived process exits.
    pub async fn settle(&self, limit: Duration) {
        self.storage.wait_for_refreshes(limit).await;
    }

    /// Drop the local cache, including keys owned by other tools.
    pub fn clear_local(&self) -> Result<()> {
        self.storage.clear_local()
    }
}

// ============================================================================
// Tests
// ============================================================================
